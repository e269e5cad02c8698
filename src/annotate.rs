use std::collections::HashMap;
use std::error;
use std::fs::File;
use std::io::{BufWriter, Write};

use log::{info, warn};
use simple_error::bail;
use sv_locus::input_tables::{read_exonic_regions, read_hotspots, read_small_variants};
use sv_locus::{GenomeExonicRegionIndex, GenomeHotspotIndex};

use crate::cli;
use crate::run_stats::{AnnotateRunStats, write_run_stats};

pub const ANNOTATED_VARIANTS_FILENAME: &str = "annotated.variants.tsv";

pub fn run_annotate(settings: &cli::AnnotateSettings) -> Result<(), Box<dyn error::Error>> {
    let start = std::time::Instant::now();

    let mut hotspot_index = GenomeHotspotIndex::new(read_hotspots(&settings.hotspots_filename)?, 0);
    if let Some(chrom) = hotspot_index.find_unsorted_chrom() {
        bail!(
            "Hotspots are not sorted by position on chromosome '{}' in file: '{}'",
            chrom,
            settings.hotspots_filename
        );
    }

    let mut region_index = GenomeExonicRegionIndex::new(
        read_exonic_regions(&settings.regions_filename)?,
        settings.exonic_margin,
    );
    if let Some(chrom) = region_index.find_unsorted_chrom() {
        bail!(
            "Exonic regions are not sorted and non-overlapping on chromosome '{}' in file: '{}'",
            chrom,
            settings.regions_filename
        );
    }

    let variants = read_small_variants(&settings.variants_filename)?;

    let mut run_stats = AnnotateRunStats {
        hotspot_count: hotspot_index.len(),
        exonic_region_count: region_index.len(),
        variant_count: variants.len(),
        ..Default::default()
    };

    let filename = settings.output_dir.join(ANNOTATED_VARIANTS_FILENAME);
    info!("Writing annotated variants to file: '{filename}'");
    let mut f = BufWriter::new(File::create(&filename)?);
    writeln!(f, "#chrom\tpos\tref\talt\thotspot\texonic")?;

    let mut last_chrom_pos: HashMap<&str, i64> = HashMap::new();
    for variant in variants.iter() {
        let last_pos = last_chrom_pos.entry(variant.chrom.as_str()).or_insert(i64::MIN);
        if variant.pos < *last_pos {
            run_stats.out_of_order_variant_count += 1;
        }
        *last_pos = variant.pos;

        let is_hotspot = hotspot_index.matches_hotspot(
            &variant.chrom,
            variant.pos,
            &variant.ref_allele,
            &variant.alt_allele,
        );
        let is_exonic = region_index.in_or_near_exonic_region(&variant.chrom, variant.pos);
        if is_hotspot {
            run_stats.hotspot_variant_count += 1;
        }
        if is_exonic {
            run_stats.exonic_variant_count += 1;
        }

        writeln!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}",
            variant.chrom,
            variant.pos,
            String::from_utf8_lossy(&variant.ref_allele),
            String::from_utf8_lossy(&variant.alt_allele),
            is_hotspot as u8,
            is_exonic as u8
        )?;
    }
    f.flush()?;

    if run_stats.out_of_order_variant_count > 0 {
        warn!(
            "{} variants were not sorted by position, annotation of these variants may be incomplete",
            run_stats.out_of_order_variant_count
        );
    }
    info!(
        "Annotated {} variants: {} hotspot, {} exonic",
        run_stats.variant_count, run_stats.hotspot_variant_count, run_stats.exonic_variant_count
    );

    run_stats.total_time_secs = start.elapsed().as_secs_f64();
    write_run_stats(&settings.output_dir, &run_stats);

    Ok(())
}
