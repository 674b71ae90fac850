//! `gene-info`: adds MAKER gene names and AED scores to a snpEff genes
//! table.

use crate::error::{ToolError, ToolResult};
use crate::io::fastx::{for_each_record, split_header};
use crate::io::{create_output, open_input};
use anyhow::{Context, Result};
use clap::Args;
use lazy_static::lazy_static;
use log::{info, warn};
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

lazy_static! {
    static ref NAME_RE: Regex = Regex::new(r#"Name:"([^"]+)""#).expect("valid name regex");
    static ref AED_RE: Regex = Regex::new(r"(?:^|\s)AED:(\d*\.\d*)").expect("valid AED regex");
    static ref EAED_RE: Regex = Regex::new(r"eAED:(\d*\.\d*)").expect("valid eAED regex");
}

/// Transcript ID column of the snpEff genes table.
const TRANSCRIPT_COLUMN: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MakerGene {
    pub name: String,
    pub aed: String,
    pub eaed: String,
}

impl MakerGene {
    /// Parses the description of a MAKER header, e.g.
    /// `protein Name:"Similar to ABC1" AED:0.12 eAED:0.13 QI:0|0|0|1|1|1|2|0|278`.
    pub fn from_description(description: &str) -> Option<Self> {
        let capture = |re: &Regex| re.captures(description).map(|c| c[1].to_string());
        Some(MakerGene {
            name: capture(&NAME_RE)?,
            aed: capture(&AED_RE)?,
            eaed: capture(&EAED_RE)?,
        })
    }
}

/// MAKER gene information keyed by record ID.
pub fn load_maker_genes(fasta: &Path) -> ToolResult<HashMap<String, MakerGene>> {
    let mut genes = HashMap::new();
    for_each_record(fasta, |record| {
        let (id, description) = split_header(record.id());
        let gene = description
            .as_deref()
            .and_then(MakerGene::from_description)
            .ok_or_else(|| {
                ToolError::missing("Name, AED or eAED", format!("MAKER header of {}", id))
            })?;
        genes.insert(id, gene);
        Ok(())
    })?;
    Ok(genes)
}

/// Copies the first line, extends the header and appends the gene
/// columns to every row.
fn annotate_table(
    table: &Path,
    genes: &HashMap<String, MakerGene>,
    out: &mut dyn Write,
) -> ToolResult<usize> {
    let mut lines = open_input(table)?.lines();
    if let Some(comment) = lines.next().transpose()? {
        writeln!(out, "{}", comment)?;
    }
    if let Some(header) = lines.next().transpose()? {
        writeln!(out, "{}\tmaker_gene_name\tAED\teAED", header.trim_end())?;
    }
    let mut rows = 0;
    for (i, line) in lines.enumerate() {
        let line = line?;
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        let id = line.split('\t').nth(TRANSCRIPT_COLUMN).ok_or_else(|| {
            ToolError::malformed("snpEff genes", i as u64 + 3, "transcript ID column missing")
        })?;
        let gene = genes
            .get(id)
            .ok_or_else(|| ToolError::not_found(id, "the reference FASTA"))?;
        writeln!(out, "{}\t{}\t{}\t{}", line, gene.name, gene.aed, gene.eaed)?;
        rows += 1;
    }
    Ok(rows)
}

#[derive(Args, Debug)]
pub struct GeneInfoCmd {
    /// snpEff genes summary (`snpEff_genes.txt`)
    pub genes: PathBuf,

    /// MAKER FASTA of the variant-calling reference
    pub fasta: PathBuf,

    /// Output file [stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl GeneInfoCmd {
    pub fn run(&self) -> Result<()> {
        let genes = load_maker_genes(&self.fasta)
            .with_context(|| format!("Failed to read {}", self.fasta.display()))?;

        let mut out = create_output(self.output.as_deref())?;
        let result = annotate_table(&self.genes, &genes, &mut *out).and_then(|rows| {
            out.flush()?;
            Ok(rows)
        });
        match result {
            Ok(rows) => {
                info!("Annotated {} genes", rows);
                Ok(())
            }
            Err(e) => {
                drop(out);
                if let Some(path) = &self.output {
                    if let Err(remove_err) = fs::remove_file(path) {
                        warn!("Could not remove {}: {}", path.display(), remove_err);
                    }
                }
                Err(e).with_context(|| format!("Failed to annotate {}", self.genes.display()))
            }
        }
    }
}
