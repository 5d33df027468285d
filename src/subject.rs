//! Subject sequence lookup in a locus DNA database.
//!
//! The database is a plain FASTA file. It is streamed once and only the
//! sequences referenced by the selected hits are kept in memory.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{SelectedHitSet, SubjectSequences};

/// Delay between two attempts at opening a database file.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Errors that can occur while resolving subject sequences.
#[derive(Error, Debug)]
pub enum SubjectError {
    #[error("Failed to read DNA database: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Missing subject '{0}' in DNA database")]
    MissingSubject(String),
}

/// Result type for subject operations.
pub type SubjectResult<T> = Result<T, SubjectError>;

/// How to retry opening a database file that cannot be opened yet.
///
/// There is no attempt limit: the file is expected to show up eventually
/// (slow network mounts, files still being written by another job).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Fixed pause between attempts
    pub delay: Duration,
    /// Log every failed attempt
    pub log_failures: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: DEFAULT_RETRY_DELAY,
            log_failures: true,
        }
    }
}

/// Opens a file, retrying with a fixed delay until it succeeds.
pub fn open_with_retry(path: &Path, policy: &RetryPolicy) -> File {
    loop {
        match File::open(path) {
            Ok(file) => return file,
            Err(e) => {
                if policy.log_failures {
                    warn!(
                        "error opening {}, retrying in {:?}: {}",
                        path.display(),
                        policy.delay,
                        e
                    );
                }
                thread::sleep(policy.delay);
            }
        }
    }
}

/// Extracts the sequences of the required subjects from a FASTA stream.
///
/// Header lines start with '>' and the rest of the line is the subject id.
/// Sequence lines are trimmed and concatenated. The first record of a
/// repeated id wins. Reading stops once every required id has been found.
///
/// Lines are handled as raw bytes. A header that is not valid UTF-8 cannot
/// name a required subject and its record is skipped.
pub fn resolve<R: BufRead>(
    mut reader: R,
    required: &HashSet<&str>,
) -> SubjectResult<SubjectSequences> {
    let mut subjects = SubjectSequences::new();
    if required.is_empty() {
        return Ok(subjects);
    }

    let mut current_id: Option<String> = None;
    let mut current_seq: Vec<u8> = Vec::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = buf.trim_ascii();

        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix(b">") {
            if let Some(id) = current_id.take() {
                subjects.insert_first(id, std::mem::take(&mut current_seq));
                if subjects.len() == required.len() {
                    return Ok(subjects);
                }
            }

            // Unwanted records are scanned past without buffering their bases
            current_seq.clear();
            current_id = std::str::from_utf8(header)
                .ok()
                .filter(|id| required.contains(id) && !subjects.contains(id))
                .map(str::to_string);
        } else if current_id.is_some() {
            current_seq.extend_from_slice(line);
        }
    }

    if let Some(id) = current_id {
        subjects.insert_first(id, current_seq);
    }

    Ok(subjects)
}

/// Checks that every selected hit has its subject sequence.
pub fn ensure_subjects(
    hits: &SelectedHitSet,
    subjects: &SubjectSequences,
) -> SubjectResult<()> {
    match hits.iter().find(|hit| !subjects.contains(&hit.subject_id)) {
        Some(hit) => Err(SubjectError::MissingSubject(hit.subject_id.clone())),
        None => Ok(()),
    }
}

/// Opens a locus database and resolves the subjects of its selected hits.
pub fn resolve_locus(
    path: &Path,
    hits: &SelectedHitSet,
    policy: &RetryPolicy,
) -> SubjectResult<SubjectSequences> {
    let file = open_with_retry(path, policy);
    let subjects = resolve(BufReader::new(file), &hits.subject_ids())?;
    debug!(
        "resolved {} subject sequences from {}",
        subjects.len(),
        path.display()
    );

    ensure_subjects(hits, &subjects)?;
    Ok(subjects)
}
