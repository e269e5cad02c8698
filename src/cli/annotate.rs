use camino::Utf8PathBuf;
use clap::Args;
use const_format::concatcp;
use simple_error::SimpleResult;

use super::utils::{check_nonnegative_distance, check_required_filename};

#[derive(Args)]
pub struct AnnotateSettings {
    /// Directory for all annotate command output (must not already exist)
    #[arg(long, value_name = "DIR", default_value = concatcp!(env!("CARGO_PKG_NAME"), "_annotate_output"))]
    pub output_dir: Utf8PathBuf,

    /// Known hotspot variants, tab-delimited 'chrom pos ref alt', sorted by position within each
    /// chromosome
    #[arg(long = "hotspots", value_name = "FILE")]
    pub hotspots_filename: Utf8PathBuf,

    /// Exonic regions, tab-delimited 'chrom start end' with both start and end included in the
    /// region. Regions must be sorted and non-overlapping within each chromosome.
    #[arg(long = "regions", value_name = "FILE")]
    pub regions_filename: Utf8PathBuf,

    /// Variants to annotate, tab-delimited 'chrom pos ref alt', sorted by position within each
    /// chromosome
    #[arg(long = "variants", value_name = "FILE")]
    pub variants_filename: Utf8PathBuf,

    /// Variants within this distance of an exonic region are annotated as exonic
    #[arg(long, default_value_t = 0)]
    pub exonic_margin: i64,
}

pub fn validate_and_fix_annotate_settings(
    settings: AnnotateSettings,
) -> SimpleResult<AnnotateSettings> {
    check_required_filename(&settings.hotspots_filename, "hotspot")?;
    check_required_filename(&settings.regions_filename, "exonic region")?;
    check_required_filename(&settings.variants_filename, "variant")?;
    check_nonnegative_distance(settings.exonic_margin, "exonic-margin")?;
    Ok(settings)
}
