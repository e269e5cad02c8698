use std::error;
use std::fs::File;
use std::io::{BufWriter, Write};

use camino::Utf8Path;
use log::info;
use sv_locus::input_tables::read_pon_observations;
use sv_locus::{PonObservation, PonStore, build_pon_store_sharded};

use crate::cli;
use crate::run_stats::{PonRunStats, write_run_stats};

pub const PON_COUNTS_FILENAME: &str = "pon.counts.tsv";

/// Write each candidate with its panel count
///
/// Candidates without a panel entry within the margin are given a count of zero.
///
fn write_pon_counts(
    filename: &Utf8Path,
    pon_store: &PonStore,
    candidates: &[PonObservation],
    margin: i64,
) -> Result<usize, Box<dyn error::Error>> {
    info!("Writing candidate panel counts to file: '{filename}'");

    let mut f = BufWriter::new(File::create(filename)?);
    writeln!(f, "#chromA\tposA\torientA\tchromB\tposB\torientB\tpon_count")?;

    let mut candidates_in_panel = 0;
    for candidate in candidates {
        let pon_count = pon_store.find_pon_count(candidate, margin).unwrap_or(0);
        if pon_count > 0 {
            candidates_in_panel += 1;
        }
        match candidate {
            PonObservation::Sv { key, pos_a, pos_b } => {
                writeln!(
                    f,
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    key.chrom_a, pos_a, key.orient_a, key.chrom_b, pos_b, key.orient_b, pon_count
                )?;
            }
            PonObservation::Sgl { key, pos } => {
                writeln!(
                    f,
                    "{}\t{}\t{}\t.\t.\t.\t{}",
                    key.chrom, pos, key.orient, pon_count
                )?;
            }
        }
    }
    f.flush()?;
    Ok(candidates_in_panel)
}

pub fn run_pon(
    shared_settings: &cli::SharedSettings,
    settings: &cli::PonSettings,
) -> Result<(), Box<dyn error::Error>> {
    let start = std::time::Instant::now();

    let mut observations = Vec::new();
    for filename in settings.panel_filenames.iter() {
        observations.extend(read_pon_observations(filename, "panel observation")?);
    }

    let pon_store = build_pon_store_sharded(&observations, shared_settings.thread_count);
    let panel_stats = pon_store.stats();
    info!(
        "Panel of normals contains {} SV and {} single breakend location signatures",
        panel_stats.sv_key_count, panel_stats.sgl_key_count
    );

    let candidates = read_pon_observations(&settings.candidates_filename, "candidate SV")?;
    let candidates_in_panel = write_pon_counts(
        &settings.output_dir.join(PON_COUNTS_FILENAME),
        &pon_store,
        &candidates,
        settings.margin,
    )?;
    info!(
        "Found {candidates_in_panel} of {} candidates in the panel of normals",
        candidates.len()
    );

    let run_stats = PonRunStats {
        panel_sample_count: settings.panel_filenames.len(),
        panel: panel_stats,
        candidate_count: candidates.len(),
        candidates_in_panel,
        total_time_secs: start.elapsed().as_secs_f64(),
    };
    write_run_stats(&settings.output_dir, &run_stats);

    Ok(())
}
