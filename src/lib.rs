//! > **Genomic coordinate matching for structural variant calls**
//!
//! Components to count breakpoint recurrence in a panel of normals, annotate position-sorted
//! variant streams against hotspot and exonic region lists in a single pass, and compare
//! breakend calls between call sets.
//!

pub use crate::breakend_matcher::*;
pub use crate::genome_position::*;
pub use crate::int_range::*;
pub use crate::pon_store::*;
pub use crate::position_counter::*;
pub use crate::sequential_index::*;

pub mod breakend_matcher;
pub mod genome_position;
pub mod input_tables;
pub mod int_range;
pub mod pon_store;
pub mod position_counter;
pub mod sequential_index;
