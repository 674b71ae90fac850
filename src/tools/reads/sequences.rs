//! Per-read summaries: `read-lengths`, `interleave` and `seq-cov`.

use super::parse_genome_size;
use crate::error::ToolError;
use crate::io::fastx::{for_each_record, open_fastx, OwnedRecord};
use crate::io::{create_output, STDIO};
use crate::stats::Histogram;
use anyhow::{Context, Result};
use clap::Args;
use log::{debug, info};
use std::io::Write;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ReadLengthsCmd {
    /// FASTA or FASTQ reads [stdin]
    #[arg(short, long, default_value = STDIO)]
    pub reads: PathBuf,

    /// Print a histogram of read lengths instead of every length
    #[arg(long)]
    pub hist: bool,

    /// Histogram bin width
    #[arg(short, long, default_value_t = 1000)]
    pub bin_width: u64,

    /// Output file [stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ReadLengthsCmd {
    pub fn run(&self) -> Result<()> {
        let mut out = create_output(self.output.as_deref())?;
        if self.hist {
            let mut lengths = Vec::new();
            for_each_record(&self.reads, |record| {
                lengths.push(record.num_bases() as i64);
                Ok(())
            })
            .with_context(|| format!("Failed to read {}", self.reads.display()))?;
            let hist = Histogram::from_values(&lengths, self.bin_width)?;
            writeln!(out, "length\tcount")?;
            hist.write_tsv(&mut *out)?;
        } else {
            writeln!(out, "length")?;
            let n = for_each_record(&self.reads, |record| {
                writeln!(out, "{}", record.num_bases())?;
                Ok(())
            })
            .with_context(|| format!("Failed to read {}", self.reads.display()))?;
            debug!("{} reads", n);
        }
        out.flush()?;
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct InterleaveCmd {
    /// Read 1 file
    pub r1: PathBuf,

    /// Read 2 file
    pub r2: PathBuf,

    /// Output file [stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl InterleaveCmd {
    pub fn run(&self) -> Result<()> {
        let mut r1 = open_fastx(&self.r1)
            .with_context(|| format!("Failed to open {}", self.r1.display()))?;
        let mut r2 = open_fastx(&self.r2)
            .with_context(|| format!("Failed to open {}", self.r2.display()))?;
        let mut out = create_output(self.output.as_deref())?;

        let mut pairs = 0u64;
        loop {
            match (r1.next(), r2.next()) {
                (None, None) => break,
                (Some(mate1), Some(mate2)) => {
                    OwnedRecord::from_record(&mate1.map_err(ToolError::from)?).write(&mut *out)?;
                    OwnedRecord::from_record(&mate2.map_err(ToolError::from)?).write(&mut *out)?;
                    pairs += 1;
                }
                (Some(_), None) | (None, Some(_)) => {
                    anyhow::bail!(
                        "{} and {} have different numbers of reads (after {} pairs)",
                        self.r1.display(),
                        self.r2.display(),
                        pairs
                    );
                }
            }
        }
        out.flush()?;
        info!("Interleaved {} read pairs", pairs);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct SeqCovCmd {
    /// FASTA or FASTQ reads [stdin]
    #[arg(short, long, default_value = STDIO)]
    pub reads: PathBuf,

    /// Genome size in base pairs (e.g. 3e9)
    #[arg(short, long)]
    pub genome_size: String,

    /// Output file [stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl SeqCovCmd {
    pub fn run(&self) -> Result<()> {
        let genome_size = parse_genome_size(&self.genome_size)?;
        let mut bases = 0u64;
        let n = for_each_record(&self.reads, |record| {
            bases += record.num_bases() as u64;
            Ok(())
        })
        .with_context(|| format!("Failed to read {}", self.reads.display()))?;
        debug!("{} bases in {} reads", bases, n);

        let mut out = create_output(self.output.as_deref())?;
        writeln!(out, "{}", bases as f64 / genome_size as f64)?;
        out.flush()?;
        Ok(())
    }
}
