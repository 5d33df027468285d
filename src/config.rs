//! Run configuration.
//!
//! Everything the pipeline needs to know about its environment is carried
//! by a [`Config`] value built once by the binary (or by tests).

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::subject::RetryPolicy;

/// Suffix of the BLAST result file of a locus.
pub const BLAST_SUFFIX: &str = ".out";

/// Suffix of the DNA database of a locus.
pub const FASTA_SUFFIX: &str = ".fa";

/// Settings of one back-translation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Amino-acid alignment to back-translate
    pub query: PathBuf,
    /// Directory holding the `<locus>.out` and `<locus>.fa` files
    pub outdir: PathBuf,
    /// How to wait for DNA databases that cannot be opened yet
    pub retry: RetryPolicy,
    /// NCBI genetic code used to check codons against residues
    pub genetic_code: u8,
}

impl Config {
    /// Creates a configuration reading loci from the current directory.
    pub fn new(query: impl Into<PathBuf>) -> Self {
        Self {
            query: query.into(),
            outdir: PathBuf::from("."),
            retry: RetryPolicy::default(),
            genetic_code: 1,
        }
    }

    pub fn with_outdir(mut self, outdir: impl Into<PathBuf>) -> Self {
        self.outdir = outdir.into();
        self
    }

    /// Enables or disables logging of failed open attempts.
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.retry.log_failures = enabled;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry.delay = delay;
        self
    }

    pub fn with_genetic_code(mut self, id: u8) -> Self {
        self.genetic_code = id;
        self
    }

    /// Path of the BLAST results of a locus.
    pub fn locus_blast_path(&self, locus: &str) -> PathBuf {
        locus_path(&self.outdir, locus, BLAST_SUFFIX)
    }

    /// Path of the DNA database of a locus.
    pub fn locus_fasta_path(&self, locus: &str) -> PathBuf {
        locus_path(&self.outdir, locus, FASTA_SUFFIX)
    }
}

fn locus_path(dir: &Path, locus: &str, suffix: &str) -> PathBuf {
    dir.join(format!("{locus}{suffix}"))
}
