//! # backtodna - protein alignment to DNA alignment
//!
//! Rebuilds a codon alignment from an amino-acid alignment and the BLAST
//! hits of its rows against per-locus DNA databases.
//!
//! ## Architecture
//!
//! The pipeline runs leaf-first through these modules:
//! - `blast`: BLAST record parsing and best-hit selection
//! - `subject`: streaming lookup of subject sequences in a locus database
//! - `codon`: extraction of a hit region as codons, on either strand
//! - `reconstruct`: interleaving of codons with the query gap pattern
//! - `pipeline`: locus discovery and orchestration of a run
//!
//! Supporting modules:
//! - `model`: shared data structures
//! - `fasta`: query alignment parsing
//! - `genetic_code`: NCBI tables for the codon consistency check
//! - `config`: run settings
//!
//! ## Example
//!
//! ```no_run
//! use backtodna::config::Config;
//! use backtodna::pipeline::run;
//!
//! let config = Config::new("alignment.faa").with_outdir("blast_results");
//! let summary = run(&config, &mut std::io::stdout()).unwrap();
//! eprintln!("{} rows written", summary.records);
//! ```

pub mod blast;
pub mod codon;
pub mod config;
pub mod fasta;
pub mod genetic_code;
pub mod model;
pub mod pipeline;
pub mod reconstruct;
pub mod subject;
