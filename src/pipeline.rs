//! Run orchestration.
//!
//! This module drives one back-translation run:
//! - Load the query alignment
//! - Discover the loci of the working directory (`*.out` files)
//! - For every locus, in name order: select hits, resolve subjects,
//!   back-translate and stream the rows to the output
//!
//! Rows are written as soon as they are produced, so a fatal error in a
//! later locus leaves the rows of earlier loci in the output.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::blast::{read_blast_file, BlastError};
use crate::config::{Config, BLAST_SUFFIX};
use crate::fasta::{parse_query_file, QueryError};
use crate::genetic_code::GeneticCodes;
use crate::reconstruct::{ReconstructError, Reconstructor};
use crate::subject::{resolve_locus, SubjectError};

/// Errors that abort a run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Unknown genetic code {code} (supported: {supported:?})")]
    UnknownGeneticCode { code: u8, supported: Vec<u8> },

    #[error("Cannot load query alignment {}: {source}", .path.display())]
    Query { path: PathBuf, source: QueryError },

    #[error("Cannot list directory {}: {source}", .path.display())]
    ListDir { path: PathBuf, source: io::Error },

    #[error("Locus '{locus}': {source}")]
    Blast { locus: String, source: BlastError },

    #[error("Locus '{locus}': {source}")]
    Subject { locus: String, source: SubjectError },

    #[error(transparent)]
    Reconstruct(#[from] ReconstructError),

    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// Counters of a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Loci found in the working directory
    pub loci: usize,
    /// Rows written
    pub records: usize,
    /// Rows with at least one codon that does not encode its residue
    pub inconsistent_records: usize,
}

/// Lists the loci of a directory, sorted by name.
///
/// A locus is any entry whose name ends in `.out`; its name is the part
/// before the suffix.
pub fn discover_loci(dir: &Path) -> io::Result<Vec<String>> {
    let mut loci = Vec::new();
    for entry in fs::read_dir(dir)? {
        let name = entry?.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if let Some(locus) = name.strip_suffix(BLAST_SUFFIX) {
            loci.push(locus.to_string());
        }
    }
    loci.sort();
    Ok(loci)
}

/// Runs the whole back-translation and writes the rows to `out`.
pub fn run<W: Write>(config: &Config, out: &mut W) -> Result<RunSummary, PipelineError> {
    let codes = GeneticCodes::new();
    let supported = codes.ids();
    let code = codes
        .take(config.genetic_code)
        .ok_or(PipelineError::UnknownGeneticCode {
            code: config.genetic_code,
            supported,
        })?;

    let queries = parse_query_file(&config.query).map_err(|source| PipelineError::Query {
        path: config.query.clone(),
        source,
    })?;
    info!("loaded {} query rows from {}", queries.len(), config.query.display());

    let loci = discover_loci(&config.outdir).map_err(|source| PipelineError::ListDir {
        path: config.outdir.clone(),
        source,
    })?;
    info!("found {} loci in {}", loci.len(), config.outdir.display());

    let mut reconstructor = Reconstructor::new(&queries).with_genetic_code(code);
    let mut summary = RunSummary {
        loci: loci.len(),
        ..RunSummary::default()
    };

    for locus in &loci {
        let hits = read_blast_file(config.locus_blast_path(locus)).map_err(|source| {
            PipelineError::Blast {
                locus: locus.clone(),
                source,
            }
        })?;
        if hits.is_empty() {
            debug!("locus {}: no hit at 100% identity", locus);
            continue;
        }

        let subjects = resolve_locus(&config.locus_fasta_path(locus), &hits, &config.retry)
            .map_err(|source| PipelineError::Subject {
                locus: locus.clone(),
                source,
            })?;

        let before = summary.records;
        for record in reconstructor.rows(locus, &hits, &subjects) {
            let record = record?;
            record.write_to(out)?;
            summary.records += 1;
            if record.mismatches > 0 {
                summary.inconsistent_records += 1;
            }
        }
        info!(
            "locus {}: {} selected hits, {} rows written",
            locus,
            hits.len(),
            summary.records - before
        );
    }

    out.flush()?;
    info!(
        loci = summary.loci,
        records = summary.records,
        inconsistent = summary.inconsistent_records,
        "back-translation finished"
    );
    Ok(summary)
}
