//! `mash-mega`: Mash all-vs-all distances as a MEGA lower-left matrix.

use crate::error::{ToolError, ToolResult};
use crate::io::{create_output, open_input};
use anyhow::{Context, Result};
use clap::Args;
use itertools::Itertools;
use ndarray::Array2;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// A square distance table.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    pub samples: Vec<String>,
    pub distances: Array2<f64>,
}

impl DistanceMatrix {
    /// Parses `mash dist -t` output: a `#query` header naming every sample,
    /// then one row per sample.
    pub fn parse<R: BufRead>(reader: R) -> ToolResult<Self> {
        let mut lines = reader.lines();
        let header = lines
            .next()
            .transpose()?
            .ok_or_else(|| ToolError::malformed("Mash table", 1, "empty table"))?;
        let mut columns = header.trim_end().split('\t');
        if columns.next() != Some("#query") {
            return Err(ToolError::malformed(
                "Mash table",
                1,
                "expected a '#query' header; run mash dist with -t",
            ));
        }
        let n = columns.count();

        let mut samples = Vec::with_capacity(n);
        let mut distances = Array2::zeros((n, n));
        for (i, line) in lines.enumerate() {
            let line = line?;
            let line_no = i as u64 + 2;
            if line.trim().is_empty() {
                continue;
            }
            if samples.len() == n {
                return Err(ToolError::malformed(
                    "Mash table",
                    line_no,
                    "number of columns and rows do not match",
                ));
            }
            let mut fields = line.trim_end().split('\t');
            let sample = fields.next().unwrap_or_default().to_string();
            let values: Vec<&str> = fields.collect();
            if values.len() != n {
                return Err(ToolError::malformed(
                    "Mash table",
                    line_no,
                    format!("expected {} distances, found {}", n, values.len()),
                ));
            }
            let row = samples.len();
            for (j, value) in values.iter().enumerate() {
                distances[[row, j]] = value.parse::<f64>().map_err(|_| {
                    ToolError::malformed("Mash table", line_no, format!("invalid distance '{}'", value))
                })?;
            }
            samples.push(sample);
        }
        if samples.len() != n {
            return Err(ToolError::malformed(
                "Mash table",
                samples.len() as u64 + 2,
                "number of columns and rows do not match",
            ));
        }
        Ok(DistanceMatrix { samples, distances })
    }

    /// Writes the MEGA header, sample list and the lower triangle as
    /// percentages.
    pub fn write_mega(&self, out: &mut dyn Write) -> ToolResult<()> {
        writeln!(out, "#mega\n!Title;\n!Description;")?;
        for sample in &self.samples {
            writeln!(out, "#{}", sample)?;
        }
        writeln!(out)?;
        for (i, row) in self.distances.outer_iter().enumerate() {
            writeln!(out, "{}", row.iter().take(i).map(|d| d * 100.0).join(" "))?;
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct MashMegaCmd {
    /// Mash dist table (`mash dist -t`)
    pub tsv: PathBuf,

    /// Output file [stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl MashMegaCmd {
    pub fn run(&self) -> Result<()> {
        let matrix = DistanceMatrix::parse(open_input(&self.tsv)?)
            .with_context(|| format!("Mash output {} not in table format", self.tsv.display()))?;
        let mut out = create_output(self.output.as_deref())?;
        matrix.write_mega(&mut *out)?;
        out.flush()?;
        Ok(())
    }
}
