//! `group-specific`: orthogroups found in every species of a group and in
//! none of the others.

use super::func::{FunctionTable, GO_COLUMN, PFAM_COLUMN};
use crate::error::{ToolError, ToolResult};
use crate::io::orthogroups::{split_genes, OrthogroupTable};
use crate::io::{create_output, tsv_writer};
use crate::tools::gff::feature_notes;
use anyhow::{Context, Result};
use clap::Args;
use indexmap::IndexMap;
use log::info;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct GroupSpecificCmd {
    /// N0.tsv or Orthogroups.tsv
    pub tsv: PathBuf,

    /// Functional annotation table written by og-func
    pub func: PathBuf,

    /// Group name, used as the output file prefix
    pub group: String,

    /// Species of the group (column names of the table)
    #[arg(short, long, num_args = 1.., required = true)]
    pub species: Vec<String>,

    /// MAKER GFF files of the group species, in the same order
    #[arg(short, long, num_args = 1..)]
    pub gff: Vec<PathBuf>,

    /// Output directory
    #[arg(short = 'd', long, default_value = ".")]
    pub outdir: PathBuf,
}

/// Rows present in every species of `group` and absent from all others.
pub fn group_specific_rows(table: &OrthogroupTable, group: &[usize]) -> Vec<usize> {
    (0..table.len())
        .filter(|&row| {
            let counts = table.counts(row);
            counts
                .iter()
                .enumerate()
                .all(|(species, &count)| (count > 0) == group.contains(&species))
        })
        .collect()
}

/// Column indices of the group species.
fn species_columns(table: &OrthogroupTable, species: &[String]) -> ToolResult<Vec<usize>> {
    species
        .iter()
        .map(|name| {
            table
                .species_index(name)
                .ok_or_else(|| ToolError::not_found(name, "the orthogroup table header"))
        })
        .collect()
}

impl GroupSpecificCmd {
    pub fn run(&self) -> Result<()> {
        if !self.gff.is_empty() && self.gff.len() != self.species.len() {
            return Err(ToolError::InvalidArgument(format!(
                "{} GFF files given for {} species",
                self.gff.len(),
                self.species.len()
            ))
            .into());
        }
        let table = OrthogroupTable::read(&self.tsv)
            .with_context(|| format!("Failed to read {}", self.tsv.display()))?;
        let columns = species_columns(&table, &self.species)?;
        let func = FunctionTable::read(&self.func)
            .with_context(|| format!("Failed to read {}", self.func.display()))?;
        let go = func.column(GO_COLUMN)?;
        let pfam = func.column(PFAM_COLUMN)?;

        let rows = group_specific_rows(&table, &columns);
        info!("{} orthogroups specific to {}", rows.len(), self.group);

        let core_path = self.outdir.join(format!("{}_core_orthogroups.tsv", self.group));
        let mut writer = tsv_writer(create_output(Some(core_path.as_path()))?);
        let mut header = table.key_columns();
        header.extend(self.species.iter().map(String::as_str));
        header.extend([GO_COLUMN, PFAM_COLUMN]);
        writer.write_record(&header)?;
        for &row in &rows {
            let mut fields = table.key_values(row);
            fields.extend(columns.iter().map(|&c| table.cells[row][c].as_str()));
            fields.push(func.value(table.id(row), go));
            fields.push(func.value(table.id(row), pfam));
            writer.write_record(&fields)?;
        }
        writer.flush()?;

        if self.gff.is_empty() {
            return Ok(());
        }
        let mut notes: Vec<IndexMap<String, String>> = Vec::with_capacity(self.gff.len());
        for gff in &self.gff {
            notes.push(
                feature_notes(gff, "mRNA")
                    .with_context(|| format!("Failed to read {}", gff.display()))?,
            );
        }

        let func_path = self
            .outdir
            .join(format!("{}_core_orthogroups.func.tsv", self.group));
        let mut writer = tsv_writer(create_output(Some(func_path.as_path()))?);
        let mut header: Vec<String> = table.key_columns().into_iter().map(String::from).collect();
        for name in &self.species {
            header.push(name.clone());
            header.push(format!("{}_gene_notes", name));
        }
        header.extend([GO_COLUMN.to_string(), PFAM_COLUMN.to_string()]);
        writer.write_record(&header)?;
        for &row in &rows {
            let mut fields: Vec<String> =
                table.key_values(row).into_iter().map(String::from).collect();
            for (i, &column) in columns.iter().enumerate() {
                let cell = &table.cells[row][column];
                let gene_notes: Vec<&str> = split_genes(cell)
                    .filter_map(|gene| notes[i].get(gene).map(String::as_str))
                    .collect();
                fields.push(cell.clone());
                fields.push(gene_notes.join(","));
            }
            fields.push(func.value(table.id(row), go).to_string());
            fields.push(func.value(table.id(row), pfam).to_string());
            writer.write_record(&fields)?;
        }
        writer.flush()?;
        Ok(())
    }
}
