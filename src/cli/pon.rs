use camino::Utf8PathBuf;
use clap::Args;
use const_format::concatcp;
use simple_error::{SimpleResult, bail};

use super::utils::{check_nonnegative_distance, check_required_filename};

#[derive(Args)]
pub struct PonSettings {
    /// Directory for all pon command output (must not already exist)
    #[arg(long, value_name = "DIR", default_value = concatcp!(env!("CARGO_PKG_NAME"), "_pon_output"))]
    pub output_dir: Utf8PathBuf,

    /// SV observations from one or more panel samples (required). Can be specified multiple times,
    /// typically once per panel sample.
    ///
    /// Each line is either a single breakend 'chrom pos orient' or a breakpoint 'chromA posA orientA
    /// chromB posB orientB', tab-delimited, with orientation given as 1 or -1.
    ///
    #[arg(long = "panel", value_name = "FILE")]
    pub panel_filenames: Vec<Utf8PathBuf>,

    /// Candidate SVs to look up in the panel, in the same format as the panel observations
    #[arg(long = "candidates", value_name = "FILE")]
    pub candidates_filename: Utf8PathBuf,

    /// Maximum distance between each candidate breakend and the matching panel breakend
    #[arg(long, default_value_t = 0)]
    pub margin: i64,
}

pub fn validate_and_fix_pon_settings(settings: PonSettings) -> SimpleResult<PonSettings> {
    if settings.panel_filenames.is_empty() {
        bail!("Must specify at least one --panel file");
    }
    for filename in settings.panel_filenames.iter() {
        check_required_filename(filename, "panel observation")?;
    }
    check_required_filename(&settings.candidates_filename, "candidate SV")?;
    check_nonnegative_distance(settings.margin, "margin")?;
    Ok(settings)
}
