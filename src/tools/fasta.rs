//! FASTA/FASTQ tools: GC content, k-mer coverage and protein filters.

use crate::bio::{gc_content, KmerCounter};
use crate::error::{ToolError, ToolResult};
use crate::io::fastx::{for_each_record, split_header};
use crate::io::{create_output, STDIO};
use anyhow::{Context, Result};
use bio::io::fasta;
use clap::{Args, ValueEnum};
use log::{debug, info};
use std::io::Write;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct GcContentCmd {
    /// FASTA or FASTQ file, optionally gzipped ('-' for stdin)
    pub input: PathBuf,

    /// Print `id<TAB>gc` for every record instead of the overall value
    #[arg(short, long)]
    pub per_seq: bool,

    /// Output file [stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl GcContentCmd {
    pub fn run(&self) -> Result<()> {
        let mut out = create_output(self.output.as_deref())?;
        if self.per_seq {
            for_each_record(&self.input, |record| {
                let (id, _) = split_header(record.id());
                let gc = gc_content(&record.seq())
                    .map_err(|_| ToolError::InvalidArgument(format!("sequence {} is empty", id)))?;
                writeln!(out, "{}\t{}", id, gc)?;
                Ok(())
            })
            .with_context(|| format!("Failed to read {}", self.input.display()))?;
        } else {
            let mut entire = Vec::new();
            let n = for_each_record(&self.input, |record| {
                entire.extend_from_slice(&record.seq());
                Ok(())
            })
            .with_context(|| format!("Failed to read {}", self.input.display()))?;
            debug!("Concatenated {} sequences ({} bp)", n, entire.len());
            writeln!(out, "{}", gc_content(&entire)?)?;
        }
        out.flush()?;
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct KmerCovCmd {
    /// FASTA or FASTQ file ('-' for stdin)
    pub input: PathBuf,

    /// K-mer length
    #[arg(short = 'k', long = "kmer-length", default_value_t = 80)]
    pub k: usize,

    /// Output file [stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl KmerCovCmd {
    pub fn run(&self) -> Result<()> {
        let mut counter = KmerCounter::new(self.k)?;
        for_each_record(&self.input, |record| {
            counter.add_sequence(&record.seq());
            Ok(())
        })
        .with_context(|| format!("Failed to read {}", self.input.display()))?;
        info!("Counted {} distinct {}-mers", counter.distinct(), self.k);

        let mut out = create_output(self.output.as_deref())?;
        for (coverage, gc) in counter.coverage_gc()? {
            writeln!(out, "{}\t{}", coverage, gc)?;
        }
        out.flush()?;
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct FilterEaedCmd {
    /// MAKER FASTA file
    #[arg(default_value = STDIO)]
    pub input: PathBuf,

    /// Drop sequences with an eAED equal to or greater than this value
    #[arg(short, long, default_value_t = 1.0)]
    pub filter: f64,

    /// Output file [stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// The `eAED:` score of a MAKER header, e.g.
/// `gene-0.3-mRNA-1 protein AED:1.00 eAED:0.85 QI:0|0|0|0|1|1|5|0|1308`.
pub fn eaed_score(header: &str) -> ToolResult<f64> {
    let value = header
        .split_whitespace()
        .find_map(|token| token.strip_prefix("eAED:"))
        .ok_or_else(|| ToolError::missing("eAED", format!("header '{}'", header)))?;
    value
        .parse::<f64>()
        .map_err(|_| ToolError::InvalidArgument(format!("invalid eAED '{}' in '{}'", value, header)))
}

impl FilterEaedCmd {
    pub fn run(&self) -> Result<()> {
        let mut writer = fasta::Writer::new(create_output(self.output.as_deref())?);
        let mut kept = 0usize;
        let total = for_each_record(&self.input, |record| {
            let header = String::from_utf8_lossy(record.id());
            if eaed_score(&header)? < self.filter {
                let (id, desc) = split_header(record.id());
                writer.write(&id, desc.as_deref(), &record.seq())?;
                kept += 1;
            }
            Ok(())
        })
        .with_context(|| format!("Failed to filter {}", self.input.display()))?;
        writer.flush()?;
        info!("Kept {} of {} sequences with eAED < {}", kept, total, self.filter);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CdsOutput {
    Fasta,
    Id,
}

#[derive(Args, Debug)]
pub struct CompleteCdsCmd {
    /// Protein FASTA (e.g. GAG genome.proteins.fasta)
    pub fasta: PathBuf,

    /// Print complete sequences or only their identifiers
    #[arg(short, long, value_enum, default_value_t = CdsOutput::Fasta)]
    pub mode: CdsOutput,

    /// Output file [stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// A protein starting with `M` and ending with a single, final stop codon.
pub fn is_complete_protein(seq: &[u8]) -> bool {
    match seq {
        [b'M', middle @ .., b'*'] => !middle.contains(&b'*'),
        _ => false,
    }
}

impl CompleteCdsCmd {
    /// Calls `f` with the header and sequence of every complete protein.
    fn for_each_complete<F>(&self, mut f: F) -> Result<usize>
    where
        F: FnMut(String, Option<String>, &[u8]) -> ToolResult<()>,
    {
        let mut complete = 0usize;
        for_each_record(&self.fasta, |record| {
            let seq = record.seq();
            if is_complete_protein(&seq) {
                let (id, desc) = split_header(record.id());
                f(id, desc, &seq)?;
                complete += 1;
            }
            Ok(())
        })
        .with_context(|| format!("Failed to read {}", self.fasta.display()))?;
        Ok(complete)
    }

    pub fn run(&self) -> Result<()> {
        let out = create_output(self.output.as_deref())?;
        let complete = match self.mode {
            CdsOutput::Fasta => {
                let mut writer = fasta::Writer::new(out);
                let n = self.for_each_complete(|id, desc, seq| {
                    writer.write(&id, desc.as_deref(), seq)?;
                    Ok(())
                })?;
                writer.flush()?;
                n
            }
            CdsOutput::Id => {
                let mut out = out;
                let n = self.for_each_complete(|id, _, _| {
                    writeln!(out, "{}", id.strip_prefix("protein|").unwrap_or(&id))?;
                    Ok(())
                })?;
                out.flush()?;
                n
            }
        };
        debug!("{} complete proteins", complete);
        Ok(())
    }
}
