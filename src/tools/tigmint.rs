//! Tigmint output summaries: molecule extents and breaktig cuts.

use crate::error::{ToolError, ToolResult};
use crate::io::{create_output, open_piped_input, tsv_reader_builder, STDIO};
use crate::stats::Histogram;
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use log::debug;
use std::io::Write;
use std::path::{Path, PathBuf};

fn bed_records(path: &Path) -> ToolResult<csv::Reader<Box<dyn std::io::BufRead>>> {
    let input = open_piped_input(path, "BED records")?;
    Ok(tsv_reader_builder(false, true).from_reader(input))
}

fn bed_coordinate(record: &csv::StringRecord, index: usize, line: u64) -> ToolResult<i64> {
    let field = record
        .get(index)
        .ok_or_else(|| ToolError::malformed("BED", line, "expected at least 3 columns"))?;
    field
        .trim()
        .parse()
        .map_err(|_| ToolError::malformed("BED", line, format!("invalid coordinate '{}'", field)))
}

/// `|end - start|` of every BED line.
pub fn molecule_lengths(path: &Path) -> ToolResult<Vec<i64>> {
    let mut lengths = Vec::new();
    for (i, result) in bed_records(path)?.records().enumerate() {
        let record = result?;
        let line = record.position().map_or(i as u64 + 1, |p| p.line());
        let start = bed_coordinate(&record, 1, line)?;
        let end = bed_coordinate(&record, 2, line)?;
        lengths.push((end - start).abs());
    }
    Ok(lengths)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MoleculeOutput {
    /// One length per line
    Lengths,
    /// `length count` histogram
    Histogram,
}

#[derive(Args, Debug)]
pub struct MoleculesCmd {
    #[arg(value_enum)]
    pub data: MoleculeOutput,

    /// tigmint-molecule BED file [stdin]
    #[arg(default_value = STDIO)]
    pub bed: PathBuf,

    /// Histogram bin width
    #[arg(short = 'w', long, default_value_t = 1000)]
    pub bin_width: u64,

    /// Output file [stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl MoleculesCmd {
    pub fn run(&self) -> Result<()> {
        let lengths = molecule_lengths(&self.bed)
            .with_context(|| format!("Failed to read {}", self.bed.display()))?;
        debug!("{} molecules", lengths.len());

        let mut out = create_output(self.output.as_deref())?;
        match self.data {
            MoleculeOutput::Lengths => {
                for length in &lengths {
                    writeln!(out, "{}", length)?;
                }
            }
            MoleculeOutput::Histogram => {
                let hist = Histogram::from_values(&lengths, self.bin_width)?;
                writeln!(out, "length\tcount")?;
                hist.write_tsv(&mut *out)?;
            }
        }
        out.flush()?;
        Ok(())
    }
}

/// Counts cuts in a breaktig BED file. Breaktigs are named `<contig>-<n>`:
/// `n = 1` starts a contig and every further piece adds a cut. Names
/// without a numeric suffix are ignored.
pub fn count_cuts(path: &Path) -> ToolResult<u64> {
    let mut cuts = 0u64;
    for (i, result) in bed_records(path)?.records().enumerate() {
        let record = result?;
        let line = record.position().map_or(i as u64 + 1, |p| p.line());
        let name = record
            .get(3)
            .ok_or_else(|| ToolError::malformed("BED", line, "breaktig name column missing"))?;
        let piece = name
            .trim()
            .rsplit_once('-')
            .and_then(|(_, n)| n.parse::<u64>().ok());
        match piece {
            Some(1) | None => {}
            Some(_) => cuts += 1,
        }
    }
    Ok(cuts)
}

#[derive(Args, Debug)]
pub struct NumCutsCmd {
    /// Breaktigs BED file
    pub bed: PathBuf,
}

impl NumCutsCmd {
    pub fn run(&self) -> Result<()> {
        let cuts = count_cuts(&self.bed)
            .with_context(|| format!("Failed to read {}", self.bed.display()))?;
        println!("{}", cuts);
        Ok(())
    }
}
