//! Forward-scanning lookup of hotspots and regions for position-sorted query streams
//!
//! Each index holds a position-sorted entry list and a cursor which only moves forward as
//! queries are made. Total lookup cost over a sorted query stream is linear in the size of the
//! entry list plus the number of queries. The trade-off is that once the cursor has moved past an
//! entry, no later query can match it until the search is reset. Queries must be provided in
//! ascending position order; a query behind the cursor is reported as a non-match.
//!
//! The cursor is mutable state of the index object itself, so a separate index should be used
//! for each thread or chromosome scan.
//!

use std::collections::HashMap;
use std::fmt;

use itertools::Itertools;

use crate::int_range::IntRange;

/// An entry which can be stored in a sequential index
pub trait SequentialEntry {
    fn chrom(&self) -> &str;

    /// The last position (inclusive) at which this entry can match a query
    fn last_pos(&self) -> i64;

    /// Return true if `next` is allowed to follow this entry in a sorted index
    fn precedes(&self, next: &Self) -> bool;
}

/// A catalogued small variant of known significance
#[derive(Clone, Eq, PartialEq)]
pub struct Hotspot {
    pub chrom: String,
    pub pos: i64,
    pub ref_allele: Vec<u8>,
    pub alt_allele: Vec<u8>,
}

impl Hotspot {
    pub fn new(chrom: &str, pos: i64, ref_allele: &[u8], alt_allele: &[u8]) -> Self {
        Self {
            chrom: chrom.to_string(),
            pos,
            ref_allele: ref_allele.to_vec(),
            alt_allele: alt_allele.to_vec(),
        }
    }
}

impl SequentialEntry for Hotspot {
    fn chrom(&self) -> &str {
        &self.chrom
    }

    fn last_pos(&self) -> i64 {
        self.pos
    }

    /// Multiple alleles may be catalogued at the same position
    fn precedes(&self, next: &Self) -> bool {
        self.pos <= next.pos
    }
}

impl fmt::Debug for Hotspot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Hotspot: {}:{} {}>{}",
            self.chrom,
            self.pos,
            String::from_utf8_lossy(&self.ref_allele),
            String::from_utf8_lossy(&self.alt_allele)
        )
    }
}

/// An exonic region on one chromosome
#[derive(Clone, Eq, PartialEq)]
pub struct ExonicRegion {
    pub chrom: String,
    pub range: IntRange,
}

impl ExonicRegion {
    /// Create a region from closed interval coordinates [start,end]
    pub fn from_closed(chrom: &str, start: i64, end: i64) -> Self {
        Self {
            chrom: chrom.to_string(),
            range: IntRange::from_closed(start, end),
        }
    }
}

impl SequentialEntry for ExonicRegion {
    fn chrom(&self) -> &str {
        &self.chrom
    }

    fn last_pos(&self) -> i64 {
        self.range.last_pos()
    }

    /// Regions must be disjoint
    fn precedes(&self, next: &Self) -> bool {
        self.range.end <= next.range.start
    }
}

impl fmt::Debug for ExonicRegion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ExonicRegion: {}:{:?}", self.chrom, self.range)
    }
}

/// Sorted entry list on a single chromosome with a forward-only search cursor
///
#[derive(Clone)]
pub struct SequentialIndex<T> {
    entries: Vec<T>,
    cursor: usize,

    /// Distance by which each entry is widened for "near" matching
    margin: i64,
}

pub type HotspotIndex = SequentialIndex<Hotspot>;
pub type ExonicRegionIndex = SequentialIndex<ExonicRegion>;

impl<T: SequentialEntry> SequentialIndex<T> {
    /// Create an index from entries already sorted in ascending position order
    ///
    pub fn new(entries: Vec<T>) -> Self {
        Self {
            entries,
            cursor: 0,
            margin: 0,
        }
    }

    /// Widen every entry by `margin` bases on each side for matching
    ///
    /// Only region matching is affected, hotspot matching always requires an exact position.
    /// A negative margin is treated as zero.
    ///
    pub fn with_margin(mut self, margin: i64) -> Self {
        self.margin = margin.max(0);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    /// Index of the first entry which has not been passed by the cursor
    pub fn current_index(&self) -> usize {
        self.cursor
    }

    /// Rewind the cursor to the first entry
    pub fn reset_search(&mut self) {
        self.cursor = 0;
    }

    /// Return true if entries are sorted, and disjoint where the entry type requires it
    ///
    pub fn is_sorted(&self) -> bool {
        self.entries.windows(2).all(|x| x[0].precedes(&x[1]))
    }

    /// Move the cursor forward past all entries which end more than `margin` bases before `pos`
    ///
    fn advance_to(&mut self, pos: i64, margin: i64) {
        while self.cursor < self.entries.len()
            && self.entries[self.cursor].last_pos() + margin < pos
        {
            self.cursor += 1;
        }
    }
}

impl SequentialIndex<Hotspot> {
    /// Return true if a hotspot with exactly this position and alleles is found at or after the
    /// cursor
    ///
    /// Entries at `pos` are not consumed, so further alleles at the same position can still be
    /// matched by the next query.
    ///
    pub fn matches_hotspot(&mut self, pos: i64, ref_allele: &[u8], alt_allele: &[u8]) -> bool {
        self.advance_to(pos, 0);
        self.entries[self.cursor..]
            .iter()
            .take_while(|x| x.pos <= pos)
            .any(|x| {
                x.pos == pos && x.ref_allele == ref_allele && x.alt_allele == alt_allele
            })
    }
}

impl SequentialIndex<ExonicRegion> {
    /// Return true if `pos` falls within the current region, widened by the index margin
    ///
    pub fn in_or_near_exonic_region(&mut self, pos: i64) -> bool {
        self.advance_to(pos, self.margin);
        match self.entries.get(self.cursor) {
            Some(region) => region.range.expand_by(self.margin).intersect_pos(pos),
            None => false,
        }
    }
}

/// Sequential indexes for every chromosome of a genome-sorted entry list
///
/// Each chromosome keeps its own cursor, so the ascending query order is only required within
/// each chromosome.
///
pub struct GenomeSequentialIndex<T> {
    chroms: HashMap<String, SequentialIndex<T>>,
}

pub type GenomeHotspotIndex = GenomeSequentialIndex<Hotspot>;
pub type GenomeExonicRegionIndex = GenomeSequentialIndex<ExonicRegion>;

impl<T: SequentialEntry> GenomeSequentialIndex<T> {
    /// Create from entries sorted by position within each chromosome
    ///
    pub fn new(entries: Vec<T>, margin: i64) -> Self {
        let chroms = entries
            .into_iter()
            .into_group_map_by(|x| x.chrom().to_string())
            .into_iter()
            .map(|(chrom, chrom_entries)| {
                (chrom, SequentialIndex::new(chrom_entries).with_margin(margin))
            })
            .collect();
        Self { chroms }
    }

    pub fn chrom_count(&self) -> usize {
        self.chroms.len()
    }

    pub fn len(&self) -> usize {
        self.chroms.values().map(|x| x.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the chromosome label of any chromosome index which is not sorted
    ///
    pub fn find_unsorted_chrom(&self) -> Option<&str> {
        self.chroms
            .iter()
            .find(|(_, x)| !x.is_sorted())
            .map(|(chrom, _)| chrom.as_str())
    }

    pub fn get_chrom_index(&mut self, chrom: &str) -> Option<&mut SequentialIndex<T>> {
        self.chroms.get_mut(chrom)
    }

    pub fn reset_search(&mut self) {
        for chrom_index in self.chroms.values_mut() {
            chrom_index.reset_search();
        }
    }
}

impl GenomeSequentialIndex<Hotspot> {
    pub fn matches_hotspot(
        &mut self,
        chrom: &str,
        pos: i64,
        ref_allele: &[u8],
        alt_allele: &[u8],
    ) -> bool {
        match self.chroms.get_mut(chrom) {
            Some(x) => x.matches_hotspot(pos, ref_allele, alt_allele),
            None => false,
        }
    }
}

impl GenomeSequentialIndex<ExonicRegion> {
    pub fn in_or_near_exonic_region(&mut self, chrom: &str, pos: i64) -> bool {
        match self.chroms.get_mut(chrom) {
            Some(x) => x.in_or_near_exonic_region(pos),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_test_hotspots() -> Vec<Hotspot> {
        vec![
            Hotspot::new("chr1", 50, b"C", b"T"),
            Hotspot::new("chr1", 100, b"A", b"G"),
            Hotspot::new("chr1", 100, b"A", b"AA"),
            Hotspot::new("chr1", 150, b"G", b"C"),
            Hotspot::new("chr1", 200, b"T", b"A"),
        ]
    }

    fn get_test_regions() -> Vec<ExonicRegion> {
        vec![
            ExonicRegion::from_closed("chr1", 100, 200),
            ExonicRegion::from_closed("chr1", 500, 1000),
            ExonicRegion::from_closed("chr1", 2000, 2200),
        ]
    }

    #[test]
    fn test_matches_hotspot() {
        let mut index = HotspotIndex::new(get_test_hotspots());
        assert!(index.is_sorted());

        assert!(!index.matches_hotspot(40, b"C", b"T"));
        assert_eq!(index.current_index(), 0);

        assert!(index.matches_hotspot(100, b"A", b"G"));
        assert_eq!(index.current_index(), 1);
        assert!(index.matches_hotspot(100, b"A", b"AA"));
        assert!(!index.matches_hotspot(100, b"A", b"C"));
        assert_eq!(index.current_index(), 1);

        // Alleles must match the hotspot at the same position
        assert!(!index.matches_hotspot(150, b"G", b"T"));
        assert!(index.matches_hotspot(200, b"T", b"A"));
        assert_eq!(index.current_index(), 4);

        assert!(!index.matches_hotspot(300, b"T", b"A"));
        assert_eq!(index.current_index(), 5);
    }

    #[test]
    fn test_hotspot_passed_entries() {
        let mut index = HotspotIndex::new(get_test_hotspots());

        assert!(index.matches_hotspot(150, b"G", b"C"));

        // Hotspots behind the cursor can't be matched again until the search is reset
        assert!(!index.matches_hotspot(100, b"A", b"G"));
        assert!(!index.matches_hotspot(50, b"C", b"T"));

        index.reset_search();
        assert_eq!(index.current_index(), 0);
        assert!(index.matches_hotspot(50, b"C", b"T"));
        assert!(index.matches_hotspot(100, b"A", b"G"));
    }

    #[test]
    fn test_in_or_near_exonic_region() {
        let mut index = ExonicRegionIndex::new(get_test_regions());
        assert!(index.is_sorted());

        assert!(!index.in_or_near_exonic_region(95));
        assert!(index.in_or_near_exonic_region(100));
        assert!(index.in_or_near_exonic_region(200));
        assert!(!index.in_or_near_exonic_region(250));
        assert!(index.in_or_near_exonic_region(750));
        assert_eq!(index.current_index(), 1);

        // Query order violation
        assert!(!index.in_or_near_exonic_region(150));

        assert!(index.in_or_near_exonic_region(2200));
        assert!(!index.in_or_near_exonic_region(2201));
        assert_eq!(index.current_index(), 3);
    }

    #[test]
    fn test_exonic_region_margin() {
        let mut index = ExonicRegionIndex::new(get_test_regions()).with_margin(10);

        assert!(!index.in_or_near_exonic_region(89));
        assert!(index.in_or_near_exonic_region(90));
        assert!(index.in_or_near_exonic_region(210));
        assert!(!index.in_or_near_exonic_region(211));
        assert!(index.in_or_near_exonic_region(490));
        assert!(index.in_or_near_exonic_region(1010));
        assert!(!index.in_or_near_exonic_region(1011));
    }

    #[test]
    fn test_negative_margin() {
        let mut index = ExonicRegionIndex::new(get_test_regions()).with_margin(-5);
        assert!(index.in_or_near_exonic_region(100));
        assert!(index.in_or_near_exonic_region(200));
        assert!(!index.in_or_near_exonic_region(201));
    }

    #[test]
    fn test_hotspot_index_ignores_margin() {
        let mut index = HotspotIndex::new(get_test_hotspots()).with_margin(10);
        assert!(index.matches_hotspot(150, b"G", b"C"));
        assert_eq!(index.current_index(), 3);
        assert!(!index.matches_hotspot(100, b"A", b"G"));

        let hotspots = vec![
            Hotspot::new("chr1", 100, b"A", b"G"),
            Hotspot::new("chr1", 105, b"C", b"T"),
        ];
        let mut index = GenomeHotspotIndex::new(hotspots, 10);
        assert!(index.matches_hotspot("chr1", 105, b"C", b"T"));
        assert_eq!(index.get_chrom_index("chr1").unwrap().current_index(), 1);
        assert!(!index.matches_hotspot("chr1", 100, b"A", b"G"));
    }

    #[test]
    fn test_sorted_queries_match_linear_scan() {
        let regions = get_test_regions();
        let hotspots = get_test_hotspots();
        let mut region_index = ExonicRegionIndex::new(regions.clone());
        let mut hotspot_index = HotspotIndex::new(hotspots.clone());

        for pos in (0..2400).step_by(7).chain([100, 150, 200, 2200]).sorted() {
            let expected = regions.iter().any(|x| x.range.intersect_pos(pos));
            assert_eq!(region_index.in_or_near_exonic_region(pos), expected);

            let expected = hotspots
                .iter()
                .any(|x| x.pos == pos && x.ref_allele == b"G" && x.alt_allele == b"C");
            assert_eq!(hotspot_index.matches_hotspot(pos, b"G", b"C"), expected);
        }
    }

    #[test]
    fn test_is_sorted() {
        let regions = vec![
            ExonicRegion::from_closed("chr1", 100, 200),
            ExonicRegion::from_closed("chr1", 200, 300),
        ];
        assert!(!ExonicRegionIndex::new(regions).is_sorted());

        let hotspots = vec![
            Hotspot::new("chr1", 100, b"A", b"G"),
            Hotspot::new("chr1", 90, b"A", b"G"),
        ];
        assert!(!HotspotIndex::new(hotspots).is_sorted());
    }

    #[test]
    fn test_genome_index() {
        let mut regions = get_test_regions();
        regions.push(ExonicRegion::from_closed("chr2", 10, 20));
        let mut index = GenomeExonicRegionIndex::new(regions, 0);

        assert_eq!(index.chrom_count(), 2);
        assert_eq!(index.len(), 4);
        assert!(index.find_unsorted_chrom().is_none());

        assert!(index.in_or_near_exonic_region("chr1", 750));
        assert!(index.in_or_near_exonic_region("chr2", 15));
        assert!(!index.in_or_near_exonic_region("chr3", 15));

        // Each chromosome keeps its own cursor
        assert!(!index.in_or_near_exonic_region("chr1", 150));
        assert!(index.in_or_near_exonic_region("chr2", 20));

        index.reset_search();
        assert!(index.in_or_near_exonic_region("chr1", 150));

        let mut hotspots = GenomeHotspotIndex::new(get_test_hotspots(), 0);
        assert!(hotspots.matches_hotspot("chr1", 100, b"A", b"AA"));
        assert!(!hotspots.matches_hotspot("chr2", 100, b"A", b"AA"));
        assert_eq!(
            hotspots.get_chrom_index("chr1").unwrap().current_index(),
            1
        );
    }
}
