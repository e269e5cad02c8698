//! Track stats for each command run
//!

use std::fs::File;

use camino::Utf8Path;
use log::info;
use serde::{Deserialize, Serialize};
use sv_locus::PonStoreStats;
use unwrap::unwrap;

pub const RUN_STATS_FILENAME: &str = "run.stats.json";

#[derive(Default, Deserialize, Serialize)]
pub struct PonRunStats {
    pub panel_sample_count: usize,
    pub panel: PonStoreStats,
    pub candidate_count: usize,

    /// Candidates with at least one panel entry within the match margin
    pub candidates_in_panel: usize,

    pub total_time_secs: f64,
}

#[derive(Default, Deserialize, Serialize)]
pub struct AnnotateRunStats {
    pub hotspot_count: usize,
    pub exonic_region_count: usize,
    pub variant_count: usize,
    pub hotspot_variant_count: usize,
    pub exonic_variant_count: usize,

    /// Variants found at a lower position than the previous variant on the same chromosome
    ///
    /// Annotation of these variants may be incomplete
    pub out_of_order_variant_count: usize,

    pub total_time_secs: f64,
}

#[derive(Default, Deserialize, Serialize)]
pub struct CompareRunStats {
    pub match_type: String,
    pub check_other_side: bool,
    pub old_record_count: usize,
    pub new_record_count: usize,
    pub matched_count: usize,
    pub old_only_count: usize,
    pub new_only_count: usize,
    pub total_time_secs: f64,
}

/// Write run_stats structure out in json format
pub fn write_run_stats<T: Serialize>(output_dir: &Utf8Path, run_stats: &T) {
    let filename = output_dir.join(RUN_STATS_FILENAME);

    info!("Writing run statistics to file: '{filename}'");

    let f = unwrap!(
        File::create(&filename),
        "Unable to create run statistics json file: '{}'",
        filename
    );

    unwrap!(
        serde_json::to_writer_pretty(&f, run_stats),
        "Unable to write run statistics json file: '{}'",
        filename
    );
}
