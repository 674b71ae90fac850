//! genome-toolbox: converters and aggregators for genome assembly,
//! annotation and comparative genomics files.
//!
//! Every tool is a subcommand that reads one or more flat files (FASTA,
//! FASTQ, GFF3, GenBank, VCF, BED, antiSMASH JSON, OrthoFinder tables),
//! keeps a small aggregate in memory and writes a table.

mod bio;
mod cli;
mod config;
mod error;
mod groups;
mod io;
mod stats;
mod tools;
mod utils;

use clap::Parser;
use cli::Cli;
use log::error;
use std::process;

fn main() {
    let cli = Cli::parse();
    cli.global.init_logging();

    if let Err(e) = cli.run() {
        error!("{:#}", e);
        process::exit(1);
    }
}
