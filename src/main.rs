mod annotate;
mod cli;
mod compare;
mod globals;
mod logger;
mod os_utils;
mod pon;
mod run_stats;

use std::{error, process};

use hhmmss::Hhmmss;
use log::info;

use crate::annotate::run_annotate;
use crate::cli::Commands;
use crate::compare::run_compare;
use crate::globals::{PROGRAM_NAME, PROGRAM_VERSION};
use crate::logger::setup_output_dir_and_logger;
use crate::pon::run_pon;

fn run(settings: &cli::Settings) -> Result<(), Box<dyn error::Error>> {
    info!("Starting {PROGRAM_NAME} {PROGRAM_VERSION}");
    info!(
        "cmdline: {}",
        std::env::args().collect::<Vec<_>>().join(" ")
    );
    info!("Running on {} threads", settings.shared.thread_count);

    let start = std::time::Instant::now();

    match &settings.command {
        Commands::Pon(x) => {
            run_pon(&settings.shared, x)?;
        }
        Commands::Annotate(x) => {
            run_annotate(x)?;
        }
        Commands::Compare(x) => {
            run_compare(x)?;
        }
    }

    info!(
        "{PROGRAM_NAME} completed. Total Runtime: {}",
        start.elapsed().hhmmssxxx()
    );
    Ok(())
}

fn main() {
    let settings = cli::validate_and_fix_settings(cli::parse_settings());

    // Setup logger, including creation of the output directory for the log file:
    setup_output_dir_and_logger(
        settings.get_output_dir(),
        settings.shared.clobber,
        settings.shared.debug,
    );

    if let Err(err) = run(&settings) {
        log::error!("{err}");
        process::exit(2);
    }
}
