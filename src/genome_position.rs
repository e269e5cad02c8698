//! Coordinate primitives shared by the panel, index and matcher components
//!

use std::fmt;
use std::str::FromStr;

use simple_error::{SimpleError, bail};
pub use strum::EnumCount;

/// Orientation of a breakend
///
/// 'Forward' means the sequence to the left of the breakend is retained, as on the left side of a
/// simple deletion. 'Reverse' means the sequence to the right of the breakend is retained.
///
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, strum::EnumCount)]
pub enum Orientation {
    Forward,
    Reverse,
}

impl Orientation {
    /// Conventional +1/-1 orientation value used in SV call files
    pub fn as_sign(&self) -> i8 {
        match self {
            Orientation::Forward => 1,
            Orientation::Reverse => -1,
        }
    }
}

impl FromStr for Orientation {
    type Err = SimpleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" | "+1" | "+" => Ok(Orientation::Forward),
            "-1" | "-" => Ok(Orientation::Reverse),
            _ => {
                bail!("Unrecognized breakend orientation: '{}'", s);
            }
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_sign())
    }
}

/// Return true if `pos` lies within the closed window [lo,hi]
///
pub fn within_window(pos: i64, lo: i64, hi: i64) -> bool {
    pos >= lo && pos <= hi
}

/// Return true if `pos` is no more than `distance` bases from `target`
///
pub fn within_distance(pos: i64, target: i64, distance: i64) -> bool {
    within_window(pos, target - distance, target + distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_orientation() {
        assert_eq!("1".parse::<Orientation>().unwrap(), Orientation::Forward);
        assert_eq!("+1".parse::<Orientation>().unwrap(), Orientation::Forward);
        assert_eq!("-1".parse::<Orientation>().unwrap(), Orientation::Reverse);
        assert_eq!("-".parse::<Orientation>().unwrap(), Orientation::Reverse);
        assert!("0".parse::<Orientation>().is_err());

        assert_eq!(Orientation::Reverse.to_string(), "-1");
        assert_eq!(Orientation::COUNT, 2);
    }

    #[test]
    fn test_within_window() {
        assert!(within_window(10, 10, 20));
        assert!(within_window(20, 10, 20));
        assert!(!within_window(9, 10, 20));
        assert!(!within_window(21, 10, 20));

        assert!(within_distance(110, 100, 10));
        assert!(within_distance(90, 100, 10));
        assert!(!within_distance(111, 100, 10));
        assert!(within_distance(100, 100, 0));
        assert!(!within_distance(101, 100, 0));
    }
}
