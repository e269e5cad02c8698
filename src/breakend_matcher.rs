//! Classify whether two SV breakend calls describe the same event
//!
//! Three strategies are provided with progressively looser equivalence, for instance to compare
//! the calls of two pipeline versions: exact matching for regression checks, coordinate-only
//! matching when sequence annotation may have changed, and approximate matching when breakend
//! placement may have shifted slightly.
//!

use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::genome_position::{Orientation, within_distance};

/// Default distance allowed between breakend positions by approximate matching
pub const DEFAULT_APPROXIMATE_MATCH_WINDOW: i64 = 10;

/// SV classification of a breakend record
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum SvType {
    Bnd,
    Del,
    Dup,
    Ins,
    Inv,
    Sgl,
}

/// Location and orientation of one side of a breakpoint
#[derive(Clone, Eq, PartialEq)]
pub struct BreakendSide {
    pub chrom: String,
    pub pos: i64,
    pub orient: Orientation,
}

impl BreakendSide {
    pub fn new(chrom: &str, pos: i64, orient: Orientation) -> Self {
        Self {
            chrom: chrom.to_string(),
            pos,
            orient,
        }
    }
}

impl fmt::Debug for BreakendSide {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}:{}", self.chrom, self.pos, self.orient)
    }
}

/// One breakend call, together with the partner side of its breakpoint if it has one
///
#[derive(Clone, Eq, PartialEq)]
pub struct BreakendRecord {
    pub side: BreakendSide,

    /// Partner breakend, this is None for a single breakend
    pub other: Option<BreakendSide>,

    pub insert_sequence: Vec<u8>,
    pub homology_sequence: Vec<u8>,
    pub sv_type: SvType,
}

impl BreakendRecord {
    /// Lowest and highest position over both sides of the breakpoint
    ///
    /// This is independent of which breakpoint endpoint is recorded as the primary side.
    ///
    pub fn position_bounds(&self) -> (i64, i64) {
        let pos = self.side.pos;
        match &self.other {
            Some(other) => (
                std::cmp::min(pos, other.pos),
                std::cmp::max(pos, other.pos),
            ),
            None => (pos, pos),
        }
    }
}

impl fmt::Debug for BreakendRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Breakend: {:?} other: {:?} type: {} insert: {} homology: {}",
            self.side,
            self.other,
            self.sv_type,
            String::from_utf8_lossy(&self.insert_sequence),
            String::from_utf8_lossy(&self.homology_sequence)
        )
    }
}

/// Infer the SV type from the chromosome and orientation pattern of a breakpoint
///
/// An insertion is distinguished from a deletion when the inserted sequence is longer than the
/// span between the breakends.
///
pub fn infer_sv_type(
    side: &BreakendSide,
    other: Option<&BreakendSide>,
    insert_len: usize,
) -> SvType {
    use SvType::*;
    let Some(other) = other else {
        return Sgl;
    };
    if side.chrom != other.chrom {
        return Bnd;
    }
    if side.orient == other.orient {
        return Inv;
    }
    let (lower, upper) = if side.pos <= other.pos {
        (side, other)
    } else {
        (other, side)
    };
    if lower.orient == Orientation::Reverse {
        Dup
    } else {
        let del_size = (upper.pos - lower.pos).max(0) as usize;
        if insert_len > del_size {
            Ins
        } else {
            Del
        }
    }
}

/// Breakend matching strategy
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BreakendMatchType {
    /// Identical coordinates, orientation, sequence content and SV type
    Exact,

    /// Identical coordinates and orientation
    CoordsOnly,

    /// Identical orientation and chromosome, positions within `window` bases
    Approximate { window: i64 },
}

impl BreakendMatchType {
    pub fn approximate() -> Self {
        BreakendMatchType::Approximate {
            window: DEFAULT_APPROXIMATE_MATCH_WINDOW,
        }
    }

    /// Return true if `b1` and `b2` describe the same breakend under this strategy
    ///
    /// # Arguments
    /// * `check_other_side` - if true the partner breakends are also required to match
    ///
    pub fn match_breakends(
        &self,
        b1: &BreakendRecord,
        b2: &BreakendRecord,
        check_other_side: bool,
    ) -> bool {
        match self {
            BreakendMatchType::Exact => exact_match(b1, b2, check_other_side),
            BreakendMatchType::CoordsOnly => window_match(b1, b2, check_other_side, 0),
            BreakendMatchType::Approximate { window } => {
                window_match(b1, b2, check_other_side, *window)
            }
        }
    }
}

impl fmt::Display for BreakendMatchType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BreakendMatchType::Exact => write!(f, "exact"),
            BreakendMatchType::CoordsOnly => write!(f, "coords-only"),
            BreakendMatchType::Approximate { window } => write!(f, "approximate({window})"),
        }
    }
}

fn side_match(s1: &BreakendSide, s2: &BreakendSide, window: i64) -> bool {
    s1.orient == s2.orient && s1.chrom == s2.chrom && within_distance(s2.pos, s1.pos, window)
}

fn other_side_match(b1: &BreakendRecord, b2: &BreakendRecord, window: i64) -> bool {
    match (&b1.other, &b2.other) {
        (Some(o1), Some(o2)) => side_match(o1, o2, window),
        (None, None) => true,
        _ => false,
    }
}

/// Exact matching requires the same primary side position in addition to the same position
/// bounds over both sides
///
/// The bounds comparison does not depend on which endpoint is recorded as the primary side, but
/// the primary side check does, so that every exact match is also a coords-only match. The same
/// breakpoint recorded with its endpoints in the opposite order is not an exact match.
///
fn exact_match(b1: &BreakendRecord, b2: &BreakendRecord, check_other_side: bool) -> bool {
    if !(side_match(&b1.side, &b2.side, 0)
        && b1.position_bounds() == b2.position_bounds()
        && b1.insert_sequence == b2.insert_sequence
        && b1.homology_sequence == b2.homology_sequence
        && b1.sv_type == b2.sv_type)
    {
        return false;
    }

    // Sequence and type fields are shared by both sides so are not checked again
    !check_other_side || other_side_match(b1, b2, 0)
}

fn window_match(
    b1: &BreakendRecord,
    b2: &BreakendRecord,
    check_other_side: bool,
    window: i64,
) -> bool {
    side_match(&b1.side, &b2.side, window)
        && (!check_other_side || other_side_match(b1, b2, window))
}

/// Result of pairing records between two breakend call sets
///
/// All values are indexes into the input record lists.
///
#[derive(Debug, Default)]
pub struct BreakendComparison {
    pub matched: Vec<(usize, usize)>,
    pub old_only: Vec<usize>,
    pub new_only: Vec<usize>,
}

/// Pair each record from the `old` call set with at most one record from the `new` call set
///
/// Each old record is paired with the first unpaired new record which matches under `match_type`,
/// in input order.
///
pub fn compare_breakend_sets(
    old: &[BreakendRecord],
    new: &[BreakendRecord],
    match_type: BreakendMatchType,
    check_other_side: bool,
) -> BreakendComparison {
    let mut new_by_chrom: HashMap<&str, Vec<usize>> = HashMap::new();
    for (new_index, record) in new.iter().enumerate() {
        new_by_chrom
            .entry(record.side.chrom.as_str())
            .or_default()
            .push(new_index);
    }

    let mut is_new_matched = vec![false; new.len()];
    let mut comparison = BreakendComparison::default();
    for (old_index, old_record) in old.iter().enumerate() {
        let new_match = new_by_chrom
            .get(old_record.side.chrom.as_str())
            .and_then(|x| {
                x.iter().copied().find(|&new_index| {
                    !is_new_matched[new_index]
                        && match_type.match_breakends(
                            old_record,
                            &new[new_index],
                            check_other_side,
                        )
                })
            });
        match new_match {
            Some(new_index) => {
                is_new_matched[new_index] = true;
                comparison.matched.push((old_index, new_index));
            }
            None => {
                debug!("No {match_type} match for old record {old_record:?}");
                comparison.old_only.push(old_index);
            }
        }
    }

    comparison.new_only = is_new_matched
        .iter()
        .enumerate()
        .filter(|(_, x)| !**x)
        .map(|(i, _)| i)
        .collect();

    comparison
}
