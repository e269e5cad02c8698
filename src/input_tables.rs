//! Readers for the tab-delimited input tables handed to the matching components, and the matching
//! record formatter for breakend output
//!
//! All tables may be plain text or bgzip-compressed. Empty lines and lines starting with '#'
//! are skipped.
//!

use camino::Utf8Path;
use log::info;
use simple_error::{SimpleResult, bail, try_with};

use crate::breakend_matcher::{BreakendRecord, BreakendSide, SvType, infer_sv_type};
use crate::genome_position::Orientation;
use crate::pon_store::{PonObservation, SglPanelKey, SvPanelKey};
use crate::sequential_index::{ExonicRegion, Hotspot};

/// Marker used for empty fields in breakend tables
const MISSING_FIELD: &str = ".";

fn read_table_content(filename: &Utf8Path, label: &str) -> SimpleResult<String> {
    use rust_htslib::bgzf;
    use std::io::Read;

    let mut reader = try_with!(
        bgzf::Reader::from_path(filename),
        "Unable to open {} file: '{}'",
        label,
        filename
    );

    let mut content = String::new();
    try_with!(
        reader.read_to_string(&mut content),
        "Can't parse text from {} file: '{}'",
        label,
        filename
    );
    Ok(content)
}

/// Parse every data line of a table with `parse_words`
///
/// # Arguments
/// * `label` - Used in error messages to describe what type of table this is
/// * `min_word_count` - Minimum number of tab-separated fields required on each line
///
fn read_table<T>(
    filename: &Utf8Path,
    label: &str,
    min_word_count: usize,
    parse_words: impl Fn(&[&str]) -> SimpleResult<T>,
) -> SimpleResult<Vec<T>> {
    info!("Reading {label} table from file: '{filename}'");

    let content = read_table_content(filename, label)?;
    let mut records = Vec::new();
    for (line_index, line) in content.lines().enumerate() {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let words = line.split('\t').collect::<Vec<_>>();
        if words.len() < min_word_count {
            bail!(
                "Expected at least {} fields on line {} of {} file '{}'",
                min_word_count,
                line_index + 1,
                label,
                filename
            );
        }
        let record = try_with!(
            parse_words(&words),
            "Can't parse line {} of {} file '{}'",
            line_index + 1,
            label,
            filename
        );
        records.push(record);
    }
    Ok(records)
}

fn parse_pos(word: &str) -> SimpleResult<i64> {
    Ok(try_with!(word.parse::<i64>(), "Invalid position: '{}'", word))
}

fn parse_seq(word: &str) -> Vec<u8> {
    if word == MISSING_FIELD {
        Vec::new()
    } else {
        word.as_bytes().to_vec()
    }
}

/// Parse hotspot line fields: chrom, pos, ref, alt
///
pub fn parse_hotspot(words: &[&str]) -> SimpleResult<Hotspot> {
    Ok(Hotspot::new(
        words[0],
        parse_pos(words[1])?,
        words[2].as_bytes(),
        words[3].as_bytes(),
    ))
}

/// Parse region line fields: chrom, start, end
///
/// start and end are both included in the region.
///
pub fn parse_exonic_region(words: &[&str]) -> SimpleResult<ExonicRegion> {
    let start = parse_pos(words[1])?;
    let end = parse_pos(words[2])?;
    if end < start {
        bail!("Region end {} is less than start {}", end, start);
    }
    Ok(ExonicRegion::from_closed(words[0], start, end))
}

/// Parse panel observation line fields
///
/// Single breakends have 3 fields: chrom, pos, orient. SV breakpoints have 6 fields: chromA,
/// posA, orientA, chromB, posB, orientB. Lines with 4 or 5 fields are rejected as truncated
/// breakpoints.
///
pub fn parse_pon_observation(words: &[&str]) -> SimpleResult<PonObservation> {
    if words.len() == 4 || words.len() == 5 {
        bail!(
            "Expected 3 fields for a single breakend or 6 for a breakpoint, found {}",
            words.len()
        );
    }
    let orient_a = words[2].parse::<Orientation>()?;
    let pos_a = parse_pos(words[1])?;
    if words.len() >= 6 {
        let orient_b = words[5].parse::<Orientation>()?;
        Ok(PonObservation::Sv {
            key: SvPanelKey::new(words[0], words[3], orient_a, orient_b),
            pos_a,
            pos_b: parse_pos(words[4])?,
        })
    } else {
        Ok(PonObservation::Sgl {
            key: SglPanelKey::new(words[0], orient_a),
            pos: pos_a,
        })
    }
}

/// Parse breakend line fields: chrom, pos, orient, otherChrom, otherPos, otherOrient, insert,
/// homology, svType
///
/// The partner fields are '.' for a single breakend. Empty sequences are written as '.'. If the
/// SV type is '.' it is inferred from the breakend pattern.
///
pub fn parse_breakend_record(words: &[&str]) -> SimpleResult<BreakendRecord> {
    let side = BreakendSide::new(
        words[0],
        parse_pos(words[1])?,
        words[2].parse::<Orientation>()?,
    );
    let other = if words[3] == MISSING_FIELD {
        None
    } else {
        Some(BreakendSide::new(
            words[3],
            parse_pos(words[4])?,
            words[5].parse::<Orientation>()?,
        ))
    };
    let insert_sequence = parse_seq(words[6]);
    let sv_type = if words[8] == MISSING_FIELD {
        infer_sv_type(&side, other.as_ref(), insert_sequence.len())
    } else {
        try_with!(
            words[8].parse::<SvType>(),
            "Unrecognized SV type: '{}'",
            words[8]
        )
    };
    Ok(BreakendRecord {
        side,
        other,
        insert_sequence,
        homology_sequence: parse_seq(words[7]),
        sv_type,
    })
}

fn format_seq(seq: &[u8]) -> String {
    if seq.is_empty() {
        MISSING_FIELD.to_string()
    } else {
        String::from_utf8_lossy(seq).to_string()
    }
}

/// Format a breakend record as tab-delimited fields in the same layout read by
/// [parse_breakend_record]
///
pub fn format_breakend_record(record: &BreakendRecord) -> String {
    let other = match &record.other {
        Some(x) => format!("{}\t{}\t{}", x.chrom, x.pos, x.orient),
        None => [MISSING_FIELD; 3].join("\t"),
    };
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}",
        record.side.chrom,
        record.side.pos,
        record.side.orient,
        other,
        format_seq(&record.insert_sequence),
        format_seq(&record.homology_sequence),
        record.sv_type
    )
}

pub fn read_hotspots(filename: &Utf8Path) -> SimpleResult<Vec<Hotspot>> {
    read_table(filename, "hotspot", 4, parse_hotspot)
}

/// Read small variants to be annotated
///
/// Variant lines use the same 'chrom pos ref alt' layout as the hotspot table.
///
pub fn read_small_variants(filename: &Utf8Path) -> SimpleResult<Vec<Hotspot>> {
    read_table(filename, "variant", 4, parse_hotspot)
}

pub fn read_exonic_regions(filename: &Utf8Path) -> SimpleResult<Vec<ExonicRegion>> {
    read_table(filename, "exonic region", 3, parse_exonic_region)
}

pub fn read_pon_observations(
    filename: &Utf8Path,
    label: &str,
) -> SimpleResult<Vec<PonObservation>> {
    read_table(filename, label, 3, parse_pon_observation)
}

pub fn read_breakend_records(
    filename: &Utf8Path,
    label: &str,
) -> SimpleResult<Vec<BreakendRecord>> {
    read_table(filename, label, 9, parse_breakend_record)
}
