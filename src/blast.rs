//! BLAST record parser and best-hit selection.
//!
//! Each locus has one comma-delimited file with 11 fields per line:
//!
//! ```text
//! sseqid,qstart,qend,sstart,send,<num>/<frame>,qseq,sseq,qseqid,bitscore,pident
//! ```
//!
//! Only exact matches (`pident` of 100) are kept, and of those only the
//! highest-scoring hit of each query.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::model::{Frame, Hit, SelectedHitSet};

/// Number of comma-separated fields in a BLAST record.
pub const FIELD_COUNT: usize = 11;

/// Hits below this identity are dropped.
pub const MIN_PERCENT_IDENTITY: f64 = 100.0;

/// Errors that can occur while reading BLAST records.
#[derive(Error, Debug)]
pub enum BlastError {
    #[error("Failed to read BLAST file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Line {line}: expected {} comma-separated fields, found {found}", FIELD_COUNT)]
    MissingFields { line: usize, found: usize },

    #[error("Line {line}: invalid {field} '{value}'")]
    InvalidField {
        line: usize,
        field: &'static str,
        value: String,
    },
}

/// Result type for BLAST operations.
pub type BlastResult<T> = Result<T, BlastError>;

/// Parses one BLAST record. `line_number` is only used in error messages.
pub fn parse_hit(line: &str, line_number: usize) -> BlastResult<Hit> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < FIELD_COUNT {
        return Err(BlastError::MissingFields {
            line: line_number,
            found: fields.len(),
        });
    }

    let invalid = |field: &'static str, value: &str| BlastError::InvalidField {
        line: line_number,
        field,
        value: value.to_string(),
    };

    let parse_coord = |idx: usize, field: &'static str| -> BlastResult<usize> {
        fields[idx]
            .trim()
            .parse::<usize>()
            .map_err(|_| invalid(field, fields[idx]))
    };

    let parse_score = |idx: usize, field: &'static str| -> BlastResult<f64> {
        parse_float(fields[idx]).ok_or_else(|| invalid(field, fields[idx]))
    };

    // The frame is the part after '/' in e.g. "1/-2"
    let frame = fields[5]
        .split('/')
        .nth(1)
        .and_then(|frame| frame.trim().parse::<i32>().ok())
        .ok_or_else(|| invalid("frame", fields[5]))?;

    Ok(Hit {
        subject_id: fields[0].to_string(),
        query_start: parse_coord(1, "query start")?,
        query_end: parse_coord(2, "query end")?,
        subject_start: parse_coord(3, "subject start")?,
        subject_end: parse_coord(4, "subject end")?,
        frame: Frame(frame),
        aligned_query: fields[6].to_string(),
        aligned_subject_translation: fields[7].to_string(),
        query_id: fields[8].to_string(),
        bitscore: parse_score(9, "bitscore")?,
        percent_identity: parse_score(10, "percent identity")?,
    })
}

/// Parses a score. Integer text such as `42` is a valid float as well.
fn parse_float(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok()
}

/// Parses the lines of a BLAST file and keeps the best hit of each query.
///
/// Empty lines are skipped and hits below 100% identity are dropped. The
/// survivors are stably sorted by query group (in order of first appearance)
/// and then by descending bitscore, so the first hit of each group is its
/// best one and wins ties.
pub fn select_best_hits<'a, I>(lines: I) -> BlastResult<SelectedHitSet>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut hits = Vec::new();
    let mut parsed = 0usize;

    for (idx, line) in lines.into_iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let hit = parse_hit(line, idx + 1)?;
        parsed += 1;
        if hit.percent_identity < MIN_PERCENT_IDENTITY {
            continue;
        }
        hits.push(hit);
    }

    let selected = reduce_to_best(hits);
    debug!(parsed, selected = selected.len(), "selected best hits");
    Ok(selected)
}

/// Keeps the first, highest-scoring hit of every query id.
fn reduce_to_best(mut hits: Vec<Hit>) -> SelectedHitSet {
    let mut group_order: HashMap<String, usize> = HashMap::new();
    for hit in &hits {
        let next = group_order.len();
        group_order.entry(hit.query_id.clone()).or_insert(next);
    }

    // sort_by is stable: equal bitscores keep their file order
    hits.sort_by(|a, b| {
        group_order[&a.query_id]
            .cmp(&group_order[&b.query_id])
            .then_with(|| b.bitscore.total_cmp(&a.bitscore))
    });
    hits.dedup_by(|later, earlier| later.query_id == earlier.query_id);

    SelectedHitSet::from_unique(hits)
}

/// Reads a BLAST file and selects its best hits.
///
/// Lines are split on raw bytes; bytes that are not valid UTF-8 are replaced
/// instead of failing the whole file.
pub fn read_blast_file<P: AsRef<Path>>(path: P) -> BlastResult<SelectedHitSet> {
    let reader = BufReader::new(File::open(path)?);
    let mut lines = Vec::new();
    for line in reader.split(b'\n') {
        let line = line?;
        let line = line.strip_suffix(b"\r").unwrap_or(&line);
        lines.push(String::from_utf8_lossy(line).into_owned());
    }
    select_best_hits(lines.iter().map(String::as_str))
}
