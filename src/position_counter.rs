//! Sorted occurrence counts over genomic positions
//!

use std::fmt;

use itertools::{EitherOrBoth, Itertools};
use log::warn;

/// One distinct position and the number of times it has been observed
///
#[derive(Clone, Eq, PartialEq)]
pub struct PositionEntry<P> {
    pub position: P,
    pub count: u32,
}

impl<P: fmt::Debug> fmt::Debug for PositionEntry<P> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}x{}", self.position, self.count)
    }
}

/// Read-only view of a single position entry returned by counter lookups
///
#[derive(Clone, Copy, Debug)]
pub struct LocationCounter<'a, P> {
    entry: &'a PositionEntry<P>,
}

impl<P: Copy> LocationCounter<'_, P> {
    pub fn count(&self) -> u32 {
        self.entry.count
    }

    pub fn position(&self) -> P {
        self.entry.position
    }
}

/// Table of distinct positions with an occurrence count for each
///
/// Entries are kept in strictly ascending position order. Positions can be scalar or any other
/// totally ordered value, such as the (posA,posB) pair of an SV breakpoint, in which case the pair
/// is counted as a single unit.
///
/// Input is expected to arrive mostly in ascending order, so the end of the table is checked
/// before falling back to a binary search for the insertion point.
///
#[derive(Clone)]
pub struct PositionCounter<P> {
    entries: Vec<PositionEntry<P>>,
    last_insert_index: usize,
}

impl<P> Default for PositionCounter<P> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            last_insert_index: 0,
        }
    }
}

impl<P: Copy + Ord + fmt::Debug> PositionCounter<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one observation of `position`
    ///
    pub fn add_position(&mut self, position: P) {
        self.add_position_count(position, 1);
    }

    fn add_position_count(&mut self, position: P, count: u32) {
        if let Some(last) = self.entries.last_mut() {
            if last.position == position {
                last.count += count;
                self.last_insert_index = self.entries.len() - 1;
                return;
            } else if last.position < position {
                self.push_entry(position, count);
                return;
            }
        } else {
            self.push_entry(position, count);
            return;
        }

        match self
            .entries
            .binary_search_by(|x| x.position.cmp(&position))
        {
            Ok(index) => {
                self.entries[index].count += count;
                self.last_insert_index = index;
            }
            Err(index) => {
                warn!(
                    "Position {position:?} received out of order, inserting at index {index} of {}",
                    self.entries.len()
                );
                self.entries
                    .insert(index, PositionEntry { position, count });
                self.last_insert_index = index;
            }
        }
    }

    fn push_entry(&mut self, position: P, count: u32) {
        self.entries.push(PositionEntry { position, count });
        self.last_insert_index = self.entries.len() - 1;
    }

    /// Number of distinct positions
    pub fn location_count(&self) -> usize {
        self.entries.len()
    }

    /// Sum of counts over all positions
    pub fn total_count(&self) -> u64 {
        self.entries.iter().map(|x| x.count as u64).sum()
    }

    /// Index of the entry touched by the most recent add operation
    pub fn last_insert_index(&self) -> usize {
        self.last_insert_index
    }

    /// Check that entries are in strictly ascending position order
    ///
    pub fn is_valid(&self) -> bool {
        self.entries
            .windows(2)
            .all(|x| x[0].position < x[1].position)
    }

    /// Find the entry for exactly `position`
    ///
    pub fn get(&self, position: P) -> Option<LocationCounter<'_, P>> {
        let index = self
            .entries
            .binary_search_by(|x| x.position.cmp(&position))
            .ok()?;
        Some(LocationCounter {
            entry: &self.entries[index],
        })
    }

    /// Iterate over all entries with position in the closed range [lo,hi]
    ///
    pub fn entries_within(&self, lo: P, hi: P) -> impl Iterator<Item = LocationCounter<'_, P>> {
        let start = self.entries.partition_point(|x| x.position < lo);
        self.entries[start..]
            .iter()
            .take_while(move |x| x.position <= hi)
            .map(|entry| LocationCounter { entry })
    }

    pub fn iter(&self) -> impl Iterator<Item = LocationCounter<'_, P>> {
        self.entries.iter().map(|entry| LocationCounter { entry })
    }

    /// Add all counts from `other` into this table
    ///
    /// Counts are summed for positions present in both tables.
    ///
    pub fn merge(&mut self, other: &Self) {
        let entries = std::mem::take(&mut self.entries);
        self.entries = entries
            .into_iter()
            .merge_join_by(other.entries.iter().cloned(), |a, b| {
                a.position.cmp(&b.position)
            })
            .map(|x| match x {
                EitherOrBoth::Both(a, b) => PositionEntry {
                    position: a.position,
                    count: a.count + b.count,
                },
                EitherOrBoth::Left(a) | EitherOrBoth::Right(a) => a,
            })
            .collect();
    }
}

impl<P: fmt::Debug> fmt::Debug for PositionCounter<P> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PositionCounter: {:?}", self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_positions() {
        let mut counter = PositionCounter::new();

        for pos in [10, 20, 1, 5, 30, 25, 25, 2, 40, 10, 10, 5, 40] {
            counter.add_position(pos);
            assert!(counter.is_valid());
        }

        assert_eq!(counter.location_count(), 8);
        assert_eq!(counter.total_count(), 13);
        assert_eq!(counter.get(10).unwrap().count(), 3);
        assert_eq!(counter.get(5).unwrap().count(), 2);
        assert_eq!(counter.get(40).unwrap().count(), 2);
        assert_eq!(counter.get(1).unwrap().count(), 1);
        assert!(counter.get(3).is_none());

        let positions = counter.iter().map(|x| x.position()).collect::<Vec<_>>();
        assert_eq!(positions, vec![1, 2, 5, 10, 20, 25, 30, 40]);
    }

    #[test]
    fn test_last_insert_index() {
        let mut counter = PositionCounter::new();

        counter.add_position(10);
        assert_eq!(counter.last_insert_index(), 0);
        counter.add_position(20);
        assert_eq!(counter.last_insert_index(), 1);
        counter.add_position(5);
        assert_eq!(counter.last_insert_index(), 0);
        counter.add_position(20);
        assert_eq!(counter.last_insert_index(), 2);
        counter.add_position(10);
        assert_eq!(counter.last_insert_index(), 1);
    }

    #[test]
    fn test_reverse_order_input() {
        let mut counter = PositionCounter::new();
        for pos in (0..1000).rev() {
            counter.add_position(pos);
            assert_eq!(counter.last_insert_index(), 0);
        }
        assert!(counter.is_valid());
        assert_eq!(counter.location_count(), 1000);
    }

    #[test]
    fn test_interleaved_repeat_counts() {
        let mut counter = PositionCounter::new();
        let input = [7, 3, 7, 9, 3, 7, 1, 9];
        for pos in input {
            counter.add_position(pos);
        }
        for pos in [1, 3, 7, 9] {
            let expected = input.iter().filter(|&&x| x == pos).count() as u32;
            assert_eq!(counter.get(pos).unwrap().count(), expected);
        }
        assert_eq!(counter.location_count(), 4);
    }

    #[test]
    fn test_pair_positions() {
        let mut counter = PositionCounter::new();
        counter.add_position((100, 200));
        counter.add_position((100, 300));
        counter.add_position((100, 200));
        counter.add_position((50, 400));

        assert!(counter.is_valid());
        assert_eq!(counter.location_count(), 3);
        assert_eq!(counter.get((100, 200)).unwrap().count(), 2);
        assert_eq!(counter.get((50, 400)).unwrap().count(), 1);
        assert!(counter.get((200, 100)).is_none());
    }

    #[test]
    fn test_entries_within() {
        let mut counter = PositionCounter::new();
        for pos in [10, 20, 30, 40] {
            counter.add_position(pos);
        }
        let found = counter
            .entries_within(15, 30)
            .map(|x| x.position())
            .collect::<Vec<_>>();
        assert_eq!(found, vec![20, 30]);
        assert_eq!(counter.entries_within(41, 50).count(), 0);
    }

    #[test]
    fn test_merge() {
        let mut counter1 = PositionCounter::new();
        let mut counter2 = PositionCounter::new();
        let mut expected = PositionCounter::new();
        for pos in [1, 5, 5, 9] {
            counter1.add_position(pos);
            expected.add_position(pos);
        }
        for pos in [2, 5, 9, 12] {
            counter2.add_position(pos);
            expected.add_position(pos);
        }

        counter1.merge(&counter2);
        assert!(counter1.is_valid());
        assert_eq!(counter1.location_count(), expected.location_count());
        for x in expected.iter() {
            assert_eq!(counter1.get(x.position()).unwrap().count(), x.count());
        }
        assert_eq!(counter1.get(5).unwrap().count(), 3);
    }
}
