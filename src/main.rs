//! backtodna - back-translate an amino-acid alignment into a DNA alignment.
//!
//! ## Usage
//!
//! ```bash
//! backtodna --query alignment.faa --outdir blast_results > alignment.fna
//! backtodna -q alignment.faa -d blast_results -o alignment.fna --nolog
//! ```
//!
//! The working directory holds one `<locus>.out` BLAST result file and one
//! `<locus>.fa` DNA database per locus.

// Use jemalloc for better memory management (returns memory to OS)
#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use backtodna::config::Config;
use backtodna::pipeline::run;

/// backtodna - rebuild a codon alignment from a protein alignment and BLAST hits
///
/// Rows are written as `>query|subject` followed by the gapped DNA sequence.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Amino-acid alignment (FASTA, '-' for gaps)
    #[arg(short = 'q', long = "query")]
    query: PathBuf,

    /// Directory holding the <locus>.out BLAST results and <locus>.fa DNA databases
    #[arg(short = 'd', long = "outdir", default_value = ".")]
    outdir: PathBuf,

    /// Output file. Use "-" for stdout.
    #[arg(short = 'o', long = "output", default_value = "-")]
    output: String,

    /// Disable log output
    #[arg(long = "nolog", conflicts_with = "verbose")]
    nolog: bool,

    /// Enable debug log output
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Genetic code used to check codons against the alignment (NCBI id)
    #[arg(short = 'g', long = "genetic-code", default_value = "1")]
    genetic_code: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr, stdout may carry the alignment
    if !args.nolog {
        let filter = if args.verbose {
            EnvFilter::new("backtodna=debug")
        } else {
            EnvFilter::new("backtodna=info")
        };

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_target(false)
            .without_time()
            .init();
    }

    let config = Config::new(args.query)
        .with_outdir(args.outdir)
        .with_logging(!args.nolog)
        .with_genetic_code(args.genetic_code);

    if args.output == "-" {
        let stdout = io::stdout();
        let mut handle = BufWriter::new(stdout.lock());
        run(&config, &mut handle)?;
    } else {
        let file = File::create(&args.output)
            .with_context(|| format!("Cannot create output file {}", args.output))?;
        let mut writer = BufWriter::new(file);
        run(&config, &mut writer)?;
    }

    Ok(())
}
