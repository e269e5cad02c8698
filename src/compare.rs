use std::error;
use std::fs::File;
use std::io::{BufWriter, Write};

use camino::Utf8Path;
use log::info;
use sv_locus::input_tables::{format_breakend_record, read_breakend_records};
use sv_locus::{BreakendComparison, BreakendRecord, compare_breakend_sets};

use crate::cli;
use crate::run_stats::{CompareRunStats, write_run_stats};

pub const UNMATCHED_BREAKENDS_FILENAME: &str = "unmatched.breakends.tsv";

/// Write all records without a match in the other call set, labeled by source call set
///
fn write_unmatched_breakends(
    filename: &Utf8Path,
    old_records: &[BreakendRecord],
    new_records: &[BreakendRecord],
    comparison: &BreakendComparison,
) -> Result<(), Box<dyn error::Error>> {
    info!("Writing unmatched breakend records to file: '{filename}'");

    let mut f = BufWriter::new(File::create(filename)?);
    writeln!(
        f,
        "#source\tchrom\tpos\torient\totherChrom\totherPos\totherOrient\tinsert\thomology\tsvType"
    )?;
    for &index in comparison.old_only.iter() {
        writeln!(f, "old\t{}", format_breakend_record(&old_records[index]))?;
    }
    for &index in comparison.new_only.iter() {
        writeln!(f, "new\t{}", format_breakend_record(&new_records[index]))?;
    }
    f.flush()?;
    Ok(())
}

pub fn run_compare(settings: &cli::CompareSettings) -> Result<(), Box<dyn error::Error>> {
    let start = std::time::Instant::now();

    let old_records = read_breakend_records(&settings.old_filename, "old breakend")?;
    let new_records = read_breakend_records(&settings.new_filename, "new breakend")?;

    let match_type = settings.get_match_type();
    info!(
        "Comparing {} old and {} new breakend records with {match_type} matching",
        old_records.len(),
        new_records.len()
    );

    let comparison = compare_breakend_sets(
        &old_records,
        &new_records,
        match_type,
        settings.check_other_side,
    );

    info!(
        "Matched: {} old only: {} new only: {}",
        comparison.matched.len(),
        comparison.old_only.len(),
        comparison.new_only.len()
    );

    write_unmatched_breakends(
        &settings.output_dir.join(UNMATCHED_BREAKENDS_FILENAME),
        &old_records,
        &new_records,
        &comparison,
    )?;

    let run_stats = CompareRunStats {
        match_type: match_type.to_string(),
        check_other_side: settings.check_other_side,
        old_record_count: old_records.len(),
        new_record_count: new_records.len(),
        matched_count: comparison.matched.len(),
        old_only_count: comparison.old_only.len(),
        new_only_count: comparison.new_only.len(),
        total_time_secs: start.elapsed().as_secs_f64(),
    };
    write_run_stats(&settings.output_dir, &run_stats);

    Ok(())
}
