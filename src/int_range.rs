use std::fmt;

/// A simple type for integer ranges
///
/// All ranges follow the bed file range convention: 0-indexed, half-closed, [start,end)
///
/// This struct is used instead of the native rust Range type just to focus on the specific goals of
/// primarily genomic region intervals.
///
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct IntRange {
    pub start: i64,
    pub end: i64,
}

impl IntRange {
    pub fn from_int(start: i64) -> Self {
        Self {
            start,
            end: start + 1,
        }
    }

    pub fn from_pair(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Convert from a closed interval [start,end], as used for exon boundaries in most annotation
    /// sources, to the half-closed representation.
    ///
    pub fn from_closed(start: i64, end: i64) -> Self {
        Self {
            start,
            end: end + 1,
        }
    }

    pub fn size(&self) -> i64 {
        self.end - self.start
    }

    /// The last position included in the range
    pub fn last_pos(&self) -> i64 {
        self.end - 1
    }

    /// Return true if pos intersects range (adjacency does not count)
    ///
    pub fn intersect_pos(&self, pos: i64) -> bool {
        pos >= self.start && pos < self.end
    }

    /// Return true if the ranges intersect (adjacency does not count)
    ///
    pub fn intersect_range(&self, other: &IntRange) -> bool {
        other.end > self.start && other.start < self.end
    }

    /// Return a copy of this range widened by `margin` on each side
    ///
    pub fn expand_by(&self, margin: i64) -> Self {
        Self {
            start: self.start - margin,
            end: self.end + margin,
        }
    }
}

impl fmt::Debug for IntRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}-{})", self.start, self.end)
    }
}
