//! Panel-of-normals location store
//!
//! Counts how often each SV breakpoint or single breakend location recurs across a panel of
//! normal samples. Locations are indexed in two levels: a hash map from the chromosome and
//! orientation signature of the event to a sorted position counter for that signature.
//!

use std::collections::HashMap;
use std::fmt;

use itertools::Itertools;
use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use unwrap::unwrap;

use crate::genome_position::{Orientation, within_distance};
use crate::position_counter::{LocationCounter, PositionCounter};

/// Chromosome and orientation signature of a paired SV breakpoint
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct SvPanelKey {
    pub chrom_a: String,
    pub chrom_b: String,
    pub orient_a: Orientation,
    pub orient_b: Orientation,
}

impl SvPanelKey {
    pub fn new(chrom_a: &str, chrom_b: &str, orient_a: Orientation, orient_b: Orientation) -> Self {
        Self {
            chrom_a: chrom_a.to_string(),
            chrom_b: chrom_b.to_string(),
            orient_a,
            orient_b,
        }
    }
}

/// Chromosome and orientation signature of a single breakend
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct SglPanelKey {
    pub chrom: String,
    pub orient: Orientation,
}

impl SglPanelKey {
    pub fn new(chrom: &str, orient: Orientation) -> Self {
        Self {
            chrom: chrom.to_string(),
            orient,
        }
    }
}

/// A single event location observed in one panel sample, or queried against the panel
///
#[derive(Clone, Eq, PartialEq)]
pub enum PonObservation {
    Sv {
        key: SvPanelKey,
        pos_a: i64,
        pos_b: i64,
    },
    Sgl {
        key: SglPanelKey,
        pos: i64,
    },
}

impl PonObservation {
    /// Chromosome used to partition observations into independent construction shards
    ///
    /// All observations sharing a panel key share a shard.
    ///
    pub fn shard_chrom(&self) -> &str {
        match self {
            PonObservation::Sv { key, .. } => &key.chrom_a,
            PonObservation::Sgl { key, .. } => &key.chrom,
        }
    }
}

impl fmt::Debug for PonObservation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PonObservation::Sv { key, pos_a, pos_b } => write!(
                f,
                "SV: {}:{}:{} {}:{}:{}",
                key.chrom_a, pos_a, key.orient_a, key.chrom_b, pos_b, key.orient_b
            ),
            PonObservation::Sgl { key, pos } => {
                write!(f, "SGL: {}:{}:{}", key.chrom, pos, key.orient)
            }
        }
    }
}

/// Summary of the panel contents
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PonStoreStats {
    /// Number of distinct SV chromosome/orientation signatures
    pub sv_key_count: usize,

    /// Number of distinct SV position pairs summed over all signatures
    pub sv_entry_count: usize,

    pub sv_observation_count: u64,

    /// Number of distinct single breakend chromosome/orientation signatures
    pub sgl_key_count: usize,

    pub sgl_entry_count: usize,
    pub sgl_observation_count: u64,
}

#[derive(Clone, Default)]
pub struct PonStore {
    sv_counters: HashMap<SvPanelKey, PositionCounter<(i64, i64)>>,
    sgl_counters: HashMap<SglPanelKey, PositionCounter<i64>>,
}

impl PonStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one observation of a paired SV breakpoint
    ///
    /// The position pair is counted as a unit.
    ///
    pub fn add_sv(
        &mut self,
        chrom_a: &str,
        chrom_b: &str,
        orient_a: Orientation,
        orient_b: Orientation,
        pos_a: i64,
        pos_b: i64,
    ) {
        let key = SvPanelKey::new(chrom_a, chrom_b, orient_a, orient_b);
        self.add_sv_key(key, pos_a, pos_b);
    }

    fn add_sv_key(&mut self, key: SvPanelKey, pos_a: i64, pos_b: i64) {
        self.sv_counters
            .entry(key)
            .or_default()
            .add_position((pos_a, pos_b));
    }

    /// Add one observation of a single breakend
    pub fn add_sgl(&mut self, chrom: &str, orient: Orientation, pos: i64) {
        self.add_sgl_key(SglPanelKey::new(chrom, orient), pos);
    }

    fn add_sgl_key(&mut self, key: SglPanelKey, pos: i64) {
        self.sgl_counters.entry(key).or_default().add_position(pos);
    }

    pub fn add_observation(&mut self, observation: &PonObservation) {
        match observation {
            PonObservation::Sv { key, pos_a, pos_b } => {
                self.add_sv_key(key.clone(), *pos_a, *pos_b);
            }
            PonObservation::Sgl { key, pos } => {
                self.add_sgl_key(key.clone(), *pos);
            }
        }
    }

    /// Find the panel entry for exactly this SV signature and position pair
    ///
    pub fn get_sv_location_counter(
        &self,
        chrom_a: &str,
        chrom_b: &str,
        orient_a: Orientation,
        orient_b: Orientation,
        pos_a: i64,
        pos_b: i64,
    ) -> Option<LocationCounter<'_, (i64, i64)>> {
        let key = SvPanelKey::new(chrom_a, chrom_b, orient_a, orient_b);
        self.sv_counters.get(&key)?.get((pos_a, pos_b))
    }

    /// Find the panel entry for exactly this single breakend signature and position
    ///
    pub fn get_sgl_location_counter(
        &self,
        chrom: &str,
        orient: Orientation,
        pos: i64,
    ) -> Option<LocationCounter<'_, i64>> {
        let key = SglPanelKey::new(chrom, orient);
        self.sgl_counters.get(&key)?.get(pos)
    }

    /// Number of distinct SV chromosome/orientation signatures in the panel
    ///
    /// This does not count the distinct positions within each signature.
    ///
    pub fn sv_location_count(&self) -> usize {
        self.sv_counters.len()
    }

    /// Number of distinct single breakend chromosome/orientation signatures in the panel
    pub fn sgl_location_count(&self) -> usize {
        self.sgl_counters.len()
    }

    /// Get the panel count for an observation allowing each breakend position to differ from the
    /// panel entry by up to `margin` bases
    ///
    /// When several panel entries fall within the margin, the highest count is returned. Returns
    /// None if no entry is found.
    ///
    pub fn find_pon_count(&self, observation: &PonObservation, margin: i64) -> Option<u32> {
        match observation {
            PonObservation::Sv { key, pos_a, pos_b } => {
                let counter = self.sv_counters.get(key)?;
                counter
                    .entries_within(
                        (pos_a - margin, pos_b - margin),
                        (pos_a + margin, pos_b + margin),
                    )
                    .filter(|x| within_distance(x.position().1, *pos_b, margin))
                    .map(|x| x.count())
                    .max()
            }
            PonObservation::Sgl { key, pos } => {
                let counter = self.sgl_counters.get(key)?;
                counter
                    .entries_within(pos - margin, pos + margin)
                    .map(|x| x.count())
                    .max()
            }
        }
    }

    /// Add all panel counts from `other` into this store
    ///
    pub fn merge(&mut self, other: PonStore) {
        for (key, counter) in other.sv_counters {
            if let Some(this_counter) = self.sv_counters.get_mut(&key) {
                this_counter.merge(&counter);
            } else {
                self.sv_counters.insert(key, counter);
            }
        }
        for (key, counter) in other.sgl_counters {
            if let Some(this_counter) = self.sgl_counters.get_mut(&key) {
                this_counter.merge(&counter);
            } else {
                self.sgl_counters.insert(key, counter);
            }
        }
    }

    /// Check the order invariant of every position counter in the store
    pub fn is_valid(&self) -> bool {
        self.sv_counters.values().all(|x| x.is_valid())
            && self.sgl_counters.values().all(|x| x.is_valid())
    }

    pub fn stats(&self) -> PonStoreStats {
        PonStoreStats {
            sv_key_count: self.sv_location_count(),
            sv_entry_count: self.sv_counters.values().map(|x| x.location_count()).sum(),
            sv_observation_count: self.sv_counters.values().map(|x| x.total_count()).sum(),
            sgl_key_count: self.sgl_location_count(),
            sgl_entry_count: self.sgl_counters.values().map(|x| x.location_count()).sum(),
            sgl_observation_count: self.sgl_counters.values().map(|x| x.total_count()).sum(),
        }
    }
}

/// Build a panel store from all observations, sharded by chromosome over a worker pool
///
/// Each shard builds an independent store which is merged into the final result. Observations
/// keep their input order within each shard.
///
pub fn build_pon_store_sharded(observations: &[PonObservation], thread_count: usize) -> PonStore {
    let shards = observations
        .iter()
        .into_group_map_by(|x| x.shard_chrom().to_string());

    info!(
        "Building panel of normals from {} observations in {} chromosome shards",
        observations.len(),
        shards.len()
    );

    let worker_pool = unwrap!(
        rayon::ThreadPoolBuilder::new()
            .num_threads(thread_count)
            .build(),
        "Unable to create panel of normals worker pool"
    );

    worker_pool.install(|| {
        shards
            .into_par_iter()
            .map(|(_, shard_observations)| {
                let mut store = PonStore::new();
                for observation in shard_observations {
                    store.add_observation(observation);
                }
                store
            })
            .reduce(PonStore::new, |mut a, b| {
                a.merge(b);
                a
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::genome_position::Orientation::{Forward as FWD, Reverse as REV};

    fn sv(
        chrom_a: &str,
        chrom_b: &str,
        o_a: Orientation,
        o_b: Orientation,
        a: i64,
        b: i64,
    ) -> PonObservation {
        PonObservation::Sv {
            key: SvPanelKey::new(chrom_a, chrom_b, o_a, o_b),
            pos_a: a,
            pos_b: b,
        }
    }

    fn sgl(chrom: &str, o: Orientation, pos: i64) -> PonObservation {
        PonObservation::Sgl {
            key: SglPanelKey::new(chrom, o),
            pos,
        }
    }

    fn get_test_sv_store() -> PonStore {
        let mut store = PonStore::new();
        store.add_sv("chr1", "chr1", FWD, REV, 100, 200);
        store.add_sv("chr1", "chr1", FWD, REV, 100, 300);
        store.add_sv("chr1", "chr1", FWD, REV, 100, 200);
        store.add_sv("chr1", "chr2", FWD, FWD, 100, 200);
        store.add_sv("chr2", "chr2", FWD, FWD, 100, 200);
        store.add_sv("chr2", "chr2", REV, REV, 100, 200);
        store.add_sv("chr2", "chr2", REV, REV, 300, 400);
        store.add_sv("chr2", "chr2", REV, REV, 100, 200);
        store.add_sv("chr2", "chr2", REV, REV, 50, 150);
        store
    }

    #[test]
    fn test_sv_location_count() {
        let store = get_test_sv_store();
        assert!(store.is_valid());
        assert_eq!(store.sv_location_count(), 4);
        assert_eq!(store.sgl_location_count(), 0);

        let counter = store
            .get_sv_location_counter("chr1", "chr1", FWD, REV, 100, 200)
            .unwrap();
        assert_eq!(counter.count(), 2);
        assert_eq!(counter.position(), (100, 200));

        let counter = store
            .get_sv_location_counter("chr1", "chr1", FWD, REV, 100, 300)
            .unwrap();
        assert_eq!(counter.count(), 1);

        let counter = store
            .get_sv_location_counter("chr2", "chr2", REV, REV, 100, 200)
            .unwrap();
        assert_eq!(counter.count(), 2);

        let stats = store.stats();
        assert_eq!(stats.sv_key_count, 4);
        assert_eq!(stats.sv_entry_count, 7);
        assert_eq!(stats.sv_observation_count, 9);
    }

    #[test]
    fn test_sv_not_found() {
        let store = get_test_sv_store();

        // Unknown signature
        assert!(
            store
                .get_sv_location_counter("chr1", "chr1", REV, FWD, 100, 200)
                .is_none()
        );
        assert!(
            store
                .get_sv_location_counter("chr3", "chr3", FWD, REV, 100, 200)
                .is_none()
        );

        // Known signature, unknown position pair
        assert!(
            store
                .get_sv_location_counter("chr1", "chr1", FWD, REV, 101, 200)
                .is_none()
        );
        assert!(
            store
                .get_sv_location_counter("chr1", "chr1", FWD, REV, 200, 100)
                .is_none()
        );
    }

    #[test]
    fn test_sgl_location_count() {
        let mut store = PonStore::new();
        store.add_sgl("chr1", FWD, 100);
        store.add_sgl("chr1", FWD, 100);
        store.add_sgl("chr1", FWD, 50);
        store.add_sgl("chr1", REV, 100);
        store.add_sgl("chrX", REV, 1000);

        assert_eq!(store.sgl_location_count(), 3);
        assert_eq!(store.sv_location_count(), 0);
        assert_eq!(
            store.get_sgl_location_counter("chr1", FWD, 100).unwrap().count(),
            2
        );
        assert_eq!(
            store.get_sgl_location_counter("chr1", REV, 100).unwrap().count(),
            1
        );
        assert!(store.get_sgl_location_counter("chr1", FWD, 101).is_none());
        assert!(store.get_sgl_location_counter("chr2", FWD, 100).is_none());
    }

    #[test]
    fn test_add_observation() {
        let mut store = PonStore::new();
        store.add_observation(&sv("chr1", "chr1", FWD, REV, 100, 200));
        store.add_observation(&sv("chr1", "chr1", FWD, REV, 100, 200));
        store.add_observation(&sgl("chr1", FWD, 100));

        // Direct adds land in the same counters as observations
        store.add_sv("chr1", "chr1", FWD, REV, 100, 200);
        store.add_sgl("chr1", FWD, 100);

        assert!(store.is_valid());
        assert_eq!(store.sv_location_count(), 1);
        assert_eq!(store.sgl_location_count(), 1);
        assert_eq!(
            store
                .get_sv_location_counter("chr1", "chr1", FWD, REV, 100, 200)
                .unwrap()
                .count(),
            3
        );
        assert_eq!(
            store.get_sgl_location_counter("chr1", FWD, 100).unwrap().count(),
            2
        );
    }

    #[test]
    fn test_find_pon_count() {
        let mut store = get_test_sv_store();
        store.add_sgl("chr1", FWD, 1000);
        store.add_sgl("chr1", FWD, 1000);
        store.add_sgl("chr1", FWD, 1008);

        let query = sv("chr1", "chr1", FWD, REV, 103, 198);
        assert_eq!(store.find_pon_count(&query, 0), None);
        assert_eq!(store.find_pon_count(&query, 5), Some(2));

        // Position A is in range for both entries, but position B is only in range for one
        let query = sv("chr1", "chr1", FWD, REV, 100, 295);
        assert_eq!(store.find_pon_count(&query, 5), Some(1));
        assert_eq!(store.find_pon_count(&query, 4), None);

        let query = sv("chr1", "chr1", REV, REV, 100, 200);
        assert_eq!(store.find_pon_count(&query, 100), None);

        let query = sgl("chr1", FWD, 1004);
        assert_eq!(store.find_pon_count(&query, 3), None);
        assert_eq!(store.find_pon_count(&query, 4), Some(2));

        let query = sgl("chr1", FWD, 1008);
        assert_eq!(store.find_pon_count(&query, 0), Some(1));
    }

    #[test]
    fn test_merge() {
        let mut store1 = PonStore::new();
        store1.add_sv("chr1", "chr1", FWD, REV, 100, 200);
        store1.add_sgl("chr1", FWD, 100);

        let mut store2 = PonStore::new();
        store2.add_sv("chr1", "chr1", FWD, REV, 100, 200);
        store2.add_sv("chr2", "chr3", FWD, REV, 100, 200);
        store2.add_sgl("chr1", FWD, 50);

        store1.merge(store2);
        assert!(store1.is_valid());
        assert_eq!(store1.sv_location_count(), 2);
        assert_eq!(store1.sgl_location_count(), 1);
        assert_eq!(
            store1
                .get_sv_location_counter("chr1", "chr1", FWD, REV, 100, 200)
                .unwrap()
                .count(),
            2
        );
        assert_eq!(
            store1.get_sgl_location_counter("chr1", FWD, 50).unwrap().count(),
            1
        );
    }

    #[test]
    fn test_build_pon_store_sharded() {
        let observations = vec![
            sv("chr1", "chr1", FWD, REV, 100, 200),
            sv("chr2", "chr2", REV, REV, 300, 400),
            sgl("chr1", FWD, 100),
            sv("chr1", "chr1", FWD, REV, 100, 200),
            sv("chr1", "chr1", FWD, REV, 50, 200),
            sgl("chr3", REV, 10),
            sv("chr2", "chr5", FWD, FWD, 1, 2),
            sgl("chr1", FWD, 100),
        ];

        let mut expected = PonStore::new();
        for observation in observations.iter() {
            expected.add_observation(observation);
        }

        let store = build_pon_store_sharded(&observations, 2);
        assert!(store.is_valid());
        assert_eq!(store.stats(), expected.stats());
        assert_eq!(store.sv_location_count(), 3);
        assert_eq!(store.sgl_location_count(), 2);
        assert_eq!(
            store
                .get_sv_location_counter("chr1", "chr1", FWD, REV, 100, 200)
                .unwrap()
                .count(),
            2
        );
        assert_eq!(
            store.get_sgl_location_counter("chr1", FWD, 100).unwrap().count(),
            2
        );
    }
}
