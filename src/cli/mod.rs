mod annotate;
mod compare;
mod pon;
mod shared;
mod utils;

use camino::Utf8Path;
use chrono::Datelike;
use clap::{Parser, Subcommand};
use simple_error::{SimpleResult, bail};

pub use self::annotate::AnnotateSettings;
use self::annotate::validate_and_fix_annotate_settings;
pub use self::compare::CompareSettings;
use self::compare::validate_and_fix_compare_settings;
pub use self::pon::PonSettings;
use self::pon::validate_and_fix_pon_settings;
pub use self::shared::SharedSettings;
use self::shared::validate_and_fix_shared_settings;

#[derive(Subcommand)]
pub enum Commands {
    /// Build a panel of normals from SV observations across many samples, and report the panel
    /// recurrence count of each candidate SV
    Pon(PonSettings),

    /// Annotate a position-sorted small variant list with hotspot and exonic region status
    Annotate(AnnotateSettings),

    /// Compare two SV breakend call sets
    Compare(CompareSettings),
}

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    after_help = format!("Copyright (C) 2004-{}     Pacific Biosciences of California, Inc.
This program comes with ABSOLUTELY NO WARRANTY; it is intended for
Research Use Only and not for use in diagnostic procedures.", chrono::Utc::now().year()),
    help_template = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}"
)]
#[clap(propagate_version = true, rename_all = "kebab_case")]
pub struct Settings {
    #[command(flatten)]
    pub shared: SharedSettings,

    #[command(subcommand)]
    pub command: Commands,
}

impl Settings {
    pub fn get_output_dir(&self) -> &Utf8Path {
        match &self.command {
            Commands::Pon(x) => &x.output_dir,
            Commands::Annotate(x) => &x.output_dir,
            Commands::Compare(x) => &x.output_dir,
        }
    }
}

/// Checks if a directory does not exist
///
pub fn check_novel_dirname(dirname: &Utf8Path, label: &str) -> SimpleResult<()> {
    if dirname.exists() {
        bail!("{} already exists: \"{}\"", label, dirname);
    }
    Ok(())
}

/// Validate settings and update parameters that can't be processed by clap
///
fn validate_and_fix_settings_impl(mut settings: Settings) -> SimpleResult<Settings> {
    settings.shared = validate_and_fix_shared_settings(settings.shared)?;

    settings.command = match settings.command {
        Commands::Pon(x) => Commands::Pon(validate_and_fix_pon_settings(x)?),
        Commands::Annotate(x) => Commands::Annotate(validate_and_fix_annotate_settings(x)?),
        Commands::Compare(x) => Commands::Compare(validate_and_fix_compare_settings(x)?),
    };

    Ok(settings)
}

/// Validate settings and update to parameters that can't be processed automatically by clap.
///
/// This is run before the logger is setup, so all errors are written directly to stderr.
///
pub fn validate_and_fix_settings(settings: Settings) -> Settings {
    match validate_and_fix_settings_impl(settings) {
        Ok(x) => x,
        Err(msg) => {
            eprintln!("Invalid command-line setting: {msg}");
            std::process::exit(exitcode::USAGE);
        }
    }
}

pub fn parse_settings() -> Settings {
    Settings::parse()
}
