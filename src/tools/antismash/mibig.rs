//! MIBiG GenBank helpers: `mibig-seqs` and `mibig-genes`.

use crate::error::{ToolError, ToolResult};
use crate::io::genbank::{bounds, find_record, qualifier, read_genbank, GenBankRecord};
use crate::io::{create_output, tsv_writer};
use anyhow::{Context, Result};
use bio::io::fasta;
use clap::{Args, ValueEnum};
use gb_io::seq::Feature;
use indexmap::IndexMap;
use log::info;
use std::io::Write;
use std::path::PathBuf;

const NA: &str = "NA";

#[derive(Args, Debug)]
pub struct SeqsCmd {
    /// MIBiG GenBank file (single or concatenated records)
    pub genbank: PathBuf,

    /// Cluster ID (LOCUS name) to extract
    pub id: String,

    /// Output FASTA file [stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// FASTA header of a CDS: `record|start-end|locus_tag|product|protein_id`.
fn cds_header(record: &GenBankRecord, cds: &Feature) -> ToolResult<String> {
    let (start, end) = bounds(cds)?;
    let product = qualifier(cds, "product")
        .map(|p| p.replace(' ', "_"))
        .unwrap_or_else(|| NA.to_string());
    Ok(format!(
        "{}|{}-{}|{}|{}|{}",
        record.name,
        start,
        end,
        qualifier(cds, "locus_tag").unwrap_or(NA),
        product,
        qualifier(cds, "protein_id").unwrap_or(NA)
    ))
}

/// Writes every CDS of `record` as FASTA.
pub fn write_cds_sequences<W: Write>(
    record: &GenBankRecord,
    writer: &mut fasta::Writer<W>,
) -> ToolResult<usize> {
    let mut written = 0;
    for cds in record.features_of_kind("CDS") {
        let seq = record.extract(cds)?;
        writer.write(&cds_header(record, cds)?, None, &seq)?;
        written += 1;
    }
    Ok(written)
}

impl SeqsCmd {
    pub fn run(&self) -> Result<()> {
        let record = find_record(&self.genbank, &self.id)
            .with_context(|| format!("Failed to find record {}", self.id))?;
        let mut writer = fasta::Writer::new(create_output(self.output.as_deref())?);
        let written = write_cds_sequences(&record, &mut writer)?;
        writer.flush()?;
        info!("Wrote {} CDS sequences for {}", written, record.name);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IdField {
    LocusTag,
    ProteinId,
}

impl IdField {
    fn qualifier(self) -> &'static str {
        match self {
            IdField::LocusTag => "locus_tag",
            IdField::ProteinId => "protein_id",
        }
    }
}

#[derive(Args, Debug)]
pub struct GenesCmd {
    /// MIBiG cluster GenBank file; only the first record is read
    pub genbank: PathBuf,

    /// Identifier qualifier
    #[arg(short, long, value_enum, default_value_t = IdField::LocusTag)]
    pub field: IdField,

    /// Output file [stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Maps each CDS identifier to its product, in file order.
pub fn cluster_products(
    record: &GenBankRecord,
    field: IdField,
) -> ToolResult<IndexMap<String, String>> {
    let mut products = IndexMap::new();
    for cds in record.features_of_kind("CDS") {
        let Some(id) = qualifier(cds, field.qualifier()) else {
            let (start, end) = bounds(cds)?;
            return Err(ToolError::missing(
                field.qualifier(),
                format!("CDS {}..{} of {}", start, end, record.name),
            ));
        };
        products.insert(
            id.to_string(),
            qualifier(cds, "product").unwrap_or(NA).to_string(),
        );
    }
    Ok(products)
}

impl GenesCmd {
    pub fn run(&self) -> Result<()> {
        let record = read_genbank(&self.genbank)
            .with_context(|| format!("Failed to read {}", self.genbank.display()))?
            .into_iter()
            .next()
            .ok_or_else(|| {
                ToolError::InvalidArgument(format!("no GenBank record in {}", self.genbank.display()))
            })?;
        let products = cluster_products(&record, self.field)?;

        let mut writer = tsv_writer(create_output(self.output.as_deref())?);
        writer.write_record([self.field.qualifier(), "product"])?;
        for (id, product) in &products {
            writer.write_record([id, product])?;
        }
        writer.flush()?;
        Ok(())
    }
}
