//! `concat-aln`: concatenates FASTA alignments into relaxed PHYLIP with a
//! partition file.

use crate::error::{ToolError, ToolResult};
use crate::io::fastx::{for_each_record, record_id};
use crate::io::{create_output, read_list};
use anyhow::{Context, Result};
use clap::Args;
use log::{debug, info};
use std::io::Write;
use std::path::{Path, PathBuf};

/// One multiple sequence alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    pub ids: Vec<String>,
    pub rows: Vec<Vec<u8>>,
}

impl Alignment {
    /// Reads a FASTA alignment. Every row must have the same length.
    pub fn read(path: &Path) -> ToolResult<Self> {
        let mut ids = Vec::new();
        let mut rows: Vec<Vec<u8>> = Vec::new();
        for_each_record(path, |record| {
            let seq = record.seq().into_owned();
            if let Some(first) = rows.first() {
                if first.len() != seq.len() {
                    return Err(ToolError::InvalidArgument(format!(
                        "sequences in {} are not aligned ({} has length {}, expected {})",
                        path.display(),
                        record_id(record),
                        seq.len(),
                        first.len()
                    )));
                }
            }
            ids.push(record_id(record));
            rows.push(seq);
            Ok(())
        })?;
        Ok(Alignment { ids, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }
}

/// A concatenated alignment and the 1-based column range of each part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Concatenation {
    pub alignment: Alignment,
    pub partitions: Vec<(String, u64, u64)>,
}

/// Concatenates `parts` row by row and renames the rows to `ids`.
///
/// # Arguments
///
/// * `parts` - `(name, alignment)` pairs in output order.
/// * `ids` - Row names; must match the row count of every alignment.
pub fn concatenate(parts: Vec<(String, Alignment)>, ids: &[String]) -> ToolResult<Concatenation> {
    let mut rows = vec![Vec::new(); ids.len()];
    let mut partitions = Vec::with_capacity(parts.len());
    let mut end = 0u64;
    for (name, alignment) in parts {
        if alignment.num_rows() != ids.len() {
            return Err(ToolError::InvalidArgument(format!(
                "number of IDs ({}) and sequences in {} ({}) do not match",
                ids.len(),
                name,
                alignment.num_rows()
            )));
        }
        let start = end + 1;
        end += alignment.len() as u64;
        for (row, seq) in rows.iter_mut().zip(alignment.rows) {
            row.extend_from_slice(&seq);
        }
        partitions.push((name, start, end));
    }
    Ok(Concatenation {
        alignment: Alignment {
            ids: ids.to_vec(),
            rows,
        },
        partitions,
    })
}

/// Writes relaxed sequential PHYLIP: a ` <rows> <columns>` line, then one
/// name-padded row per line.
pub fn write_phylip(alignment: &Alignment, out: &mut dyn Write) -> ToolResult<()> {
    let width = alignment.ids.iter().map(String::len).max().unwrap_or(0) + 1;
    writeln!(out, " {} {}", alignment.num_rows(), alignment.len())?;
    for (id, row) in alignment.ids.iter().zip(&alignment.rows) {
        write!(out, "{:<width$}", id, width = width)?;
        out.write_all(row)?;
        writeln!(out)?;
    }
    Ok(())
}

#[derive(Args, Debug)]
pub struct ConcatAlnCmd {
    /// Newline-separated list of FASTA alignments
    pub list: PathBuf,

    /// Output PHYLIP file
    pub phylip: PathBuf,

    /// Output partition file
    pub partition: PathBuf,

    /// Row names for the output, in alignment order
    #[arg(short, long, num_args = 1.., required = true)]
    pub ids: Vec<String>,
}

impl ConcatAlnCmd {
    pub fn run(&self) -> Result<()> {
        if let Some(id) = self.ids.iter().find(|id| id.contains(char::is_whitespace)) {
            anyhow::bail!("PHYLIP names cannot contain whitespace: '{}'", id);
        }
        let files = read_list(&self.list)
            .with_context(|| format!("Failed to read {}", self.list.display()))?;

        let mut parts = Vec::with_capacity(files.len());
        for file in files {
            let alignment = Alignment::read(Path::new(&file))
                .with_context(|| format!("Failed to read alignment {}", file))?;
            debug!("{}: {} rows, {} columns", file, alignment.num_rows(), alignment.len());
            parts.push((file, alignment));
        }
        let concatenation = concatenate(parts, &self.ids)?;

        let mut phylip = create_output(Some(self.phylip.as_path()))?;
        write_phylip(&concatenation.alignment, &mut *phylip)?;
        phylip.flush()?;

        let mut partition = create_output(Some(self.partition.as_path()))?;
        for (name, start, end) in &concatenation.partitions {
            writeln!(partition, "DNA, {}={}-{}", name, start, end)?;
        }
        partition.flush()?;

        info!(
            "Concatenated {} alignments into {} columns",
            concatenation.partitions.len(),
            concatenation.alignment.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_concat_alignments() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.fa");
        let b = dir.path().join("b.fa");
        fs::write(&a, ">x1\nACGT\n>x2\nAC-T\n").unwrap();
        fs::write(&b, ">y1\nGG\nG\n>y2\nT-T\n").unwrap();
        let list = dir.path().join("alns.txt");
        fs::write(&list, format!("{}\n{}\n", a.display(), b.display())).unwrap();
        let phylip = dir.path().join("out.phy");
        let partition = dir.path().join("out.part");

        ConcatAlnCmd {
            list,
            phylip: phylip.clone(),
            partition: partition.clone(),
            ids: vec!["sp1".to_string(), "species2".to_string()],
        }
        .run()
        .unwrap();

        assert_eq!(
            fs::read_to_string(&phylip).unwrap(),
            " 2 7\nsp1      ACGTGGG\nspecies2 AC-TT-T\n"
        );
        assert_eq!(
            fs::read_to_string(&partition).unwrap(),
            format!("DNA, {}=1-4\nDNA, {}=5-7\n", a.display(), b.display())
        );
    }

    #[test]
    fn test_id_count_must_match_rows() {
        let aln = Alignment {
            ids: vec!["a".to_string(), "b".to_string()],
            rows: vec![b"AC".to_vec(), b"AG".to_vec()],
        };
        let err = concatenate(vec![("a.fa".to_string(), aln)], &["x".to_string()]).unwrap_err();
        assert!(err.to_string().contains("do not match"));
    }

    #[test]
    fn test_unaligned_rows_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.fa");
        fs::write(&path, ">a\nACGT\n>b\nAC\n").unwrap();
        assert!(Alignment::read(&path).is_err());
    }
}
