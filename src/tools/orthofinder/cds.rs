//! `og-cds`: one FASTA of member coding sequences per orthogroup.

use crate::error::{ToolError, ToolResult};
use crate::io::fastx::read_sequence_map;
use crate::io::orthogroups::{Category, OrthogroupTable};
use anyhow::{Context, Result};
use bio::io::fasta;
use clap::Args;
use indexmap::IndexMap;
use log::info;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct CdsCmd {
    /// N0.tsv or Orthogroups.tsv
    pub tsv: PathBuf,

    /// Coding sequences of each species, in the table's column order
    #[arg(required = true)]
    pub fastas: Vec<PathBuf>,

    /// Output directory for the `<id>.cds.fa` files
    #[arg(short = 'd', long, default_value = ".")]
    pub outdir: PathBuf,

    /// Write every orthogroup instead of only the single-copy core ones
    #[arg(long)]
    pub all_groups: bool,
}

/// Writes the member sequences of one orthogroup.
fn write_orthogroup(
    table: &OrthogroupTable,
    row: usize,
    sequences: &[IndexMap<String, Vec<u8>>],
    fastas: &[PathBuf],
    path: &Path,
) -> ToolResult<usize> {
    let mut writer = fasta::Writer::new(BufWriter::new(File::create(path)?));
    let mut written = 0;
    for (species, seqs) in sequences.iter().enumerate() {
        for gene in table.genes(row, species) {
            let seq = seqs
                .get(gene)
                .ok_or_else(|| ToolError::not_found(gene, fastas[species].display().to_string()))?;
            writer.write(gene, None, seq)?;
            written += 1;
        }
    }
    writer.flush()?;
    Ok(written)
}

impl CdsCmd {
    pub fn run(&self) -> Result<()> {
        let table = OrthogroupTable::read(&self.tsv)
            .with_context(|| format!("Failed to read {}", self.tsv.display()))?;
        if table.species.len() != self.fastas.len() {
            return Err(ToolError::InvalidArgument(format!(
                "{} species in {} but {} FASTA files given",
                table.species.len(),
                self.tsv.display(),
                self.fastas.len()
            ))
            .into());
        }

        let mut sequences = Vec::with_capacity(self.fastas.len());
        for fasta in &self.fastas {
            sequences.push(
                read_sequence_map(fasta)
                    .with_context(|| format!("Failed to read {}", fasta.display()))?,
            );
        }

        fs::create_dir_all(&self.outdir)
            .with_context(|| format!("Failed to create {}", self.outdir.display()))?;
        let rows: Vec<usize> = if self.all_groups {
            (0..table.len()).collect()
        } else {
            table.rows_in(Category::CoreSingle).collect()
        };
        for &row in &rows {
            let path = self.outdir.join(format!("{}.cds.fa", table.id(row)));
            write_orthogroup(&table, row, &sequences, &self.fastas, &path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        info!("Wrote {} orthogroup FASTA files", rows.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::orthogroups::tests::write_n0;
    use tempfile::tempdir;

    fn write_fastas(dir: &Path, missing: &str) -> Vec<PathBuf> {
        let genes = [
            vec!["a1", "a2", "a3", "a4", "a5"],
            vec!["b1", "b2", "b3"],
            vec!["c1", "c2", "c3"],
        ];
        genes
            .iter()
            .enumerate()
            .map(|(i, ids)| {
                let content: String = ids
                    .iter()
                    .filter(|id| **id != missing)
                    .map(|id| format!(">{} cds\nATG{}\n", id, "A".repeat(i + 1)))
                    .collect();
                let path = dir.join(format!("sp{}.cds.fa", i));
                fs::write(&path, content).unwrap();
                path
            })
            .collect()
    }

    #[test]
    fn test_writes_single_copy_core_groups() {
        let dir = tempdir().unwrap();
        let outdir = dir.path().join("cds");
        CdsCmd {
            tsv: write_n0(dir.path()),
            fastas: write_fastas(dir.path(), ""),
            outdir: outdir.clone(),
            all_groups: false,
        }
        .run()
        .unwrap();

        let entries = fs::read_dir(&outdir).unwrap().count();
        assert_eq!(entries, 1);
        assert_eq!(
            fs::read_to_string(outdir.join("N0.HOG0000000.cds.fa")).unwrap(),
            ">a1\nATGA\n>b1\nATGAA\n>c1\nATGAAA\n"
        );
    }

    #[test]
    fn test_all_groups() {
        let dir = tempdir().unwrap();
        let outdir = dir.path().join("cds");
        CdsCmd {
            tsv: write_n0(dir.path()),
            fastas: write_fastas(dir.path(), ""),
            outdir: outdir.clone(),
            all_groups: true,
        }
        .run()
        .unwrap();
        assert_eq!(fs::read_dir(&outdir).unwrap().count(), 5);
        let hog1 = fs::read_to_string(outdir.join("N0.HOG0000001.cds.fa")).unwrap();
        assert_eq!(hog1.matches('>').count(), 4);
    }

    #[test]
    fn test_unknown_gene_is_an_error() {
        let dir = tempdir().unwrap();
        let cmd = CdsCmd {
            tsv: write_n0(dir.path()),
            fastas: write_fastas(dir.path(), "b1"),
            outdir: dir.path().join("cds"),
            all_groups: false,
        };
        let err = cmd.run().unwrap_err();
        assert!(format!("{:#}", err).contains("'b1' not found"));
    }
}
