use camino::Utf8PathBuf;
use clap::{Args, ValueEnum};
use const_format::concatcp;
use simple_error::SimpleResult;
use sv_locus::{BreakendMatchType, DEFAULT_APPROXIMATE_MATCH_WINDOW};

use super::utils::{check_nonnegative_distance, check_required_filename};

#[derive(Clone, Copy, ValueEnum)]
pub enum MatchTypeOption {
    /// Require identical coordinates, sequence content and SV type
    Exact,

    /// Require identical coordinates and orientation only
    CoordsOnly,

    /// Allow breakend positions to differ by up to the match window
    Approximate,
}

#[derive(Args)]
pub struct CompareSettings {
    /// Directory for all compare command output (must not already exist)
    #[arg(long, value_name = "DIR", default_value = concatcp!(env!("CARGO_PKG_NAME"), "_compare_output"))]
    pub output_dir: Utf8PathBuf,

    /// Reference breakend call set
    ///
    /// Each line is tab-delimited 'chrom pos orient otherChrom otherPos otherOrient insertSeq
    /// homologySeq svType'. Partner fields and empty sequences are written as '.'.
    ///
    #[arg(long = "old", value_name = "FILE")]
    pub old_filename: Utf8PathBuf,

    /// Breakend call set to compare against the reference, in the same format
    #[arg(long = "new", value_name = "FILE")]
    pub new_filename: Utf8PathBuf,

    /// Breakend matching strategy
    #[arg(long, value_enum, default_value_t = MatchTypeOption::Exact)]
    pub match_type: MatchTypeOption,

    /// Maximum breakend position difference for approximate matching
    #[arg(long, default_value_t = DEFAULT_APPROXIMATE_MATCH_WINDOW)]
    pub window: i64,

    /// Also require the partner breakends to match
    #[arg(long)]
    pub check_other_side: bool,
}

impl CompareSettings {
    pub fn get_match_type(&self) -> BreakendMatchType {
        match self.match_type {
            MatchTypeOption::Exact => BreakendMatchType::Exact,
            MatchTypeOption::CoordsOnly => BreakendMatchType::CoordsOnly,
            MatchTypeOption::Approximate => BreakendMatchType::Approximate {
                window: self.window,
            },
        }
    }
}

pub fn validate_and_fix_compare_settings(
    settings: CompareSettings,
) -> SimpleResult<CompareSettings> {
    check_required_filename(&settings.old_filename, "old breakend")?;
    check_required_filename(&settings.new_filename, "new breakend")?;
    check_nonnegative_distance(settings.window, "window")?;
    Ok(settings)
}
