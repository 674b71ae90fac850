//! OrthoFinder orthogroup tables.
//!
//! Reads either `Phylogenetic_Hierarchical_Orthogroups/N0.tsv` (leading
//! columns `HOG`, `OG`, `Gene Tree Parent Clade`) or `Orthogroups.tsv`
//! (leading column `Orthogroup`). Every remaining column is a species whose
//! cells hold `, `-separated gene lists. Rows are kept in file order together
//! with an orthogroup x species copy-number matrix.

use super::tsv_reader;
use crate::error::{ToolError, ToolResult};
use clap::ValueEnum;
use log::debug;
use ndarray::{Array2, ArrayView1};
use std::path::Path;

/// Layout of the table, detected from its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// `N0.tsv`: HOG, OG, Gene Tree Parent Clade, species...
    Hierarchical,
    /// `Orthogroups.tsv`: Orthogroup, species...
    Flat,
}

impl TableKind {
    fn detect(header: &csv::StringRecord) -> ToolResult<Self> {
        match header.get(0).map(str::trim) {
            Some("HOG") if header.get(1).map(str::trim) == Some("OG") => {
                Ok(TableKind::Hierarchical)
            }
            Some("Orthogroup") => Ok(TableKind::Flat),
            other => Err(ToolError::malformed(
                "orthogroup table",
                1,
                format!(
                    "expected a 'HOG' or 'Orthogroup' first column, found '{}'",
                    other.unwrap_or("")
                ),
            )),
        }
    }

    /// Number of non-species columns.
    pub fn leading_columns(self) -> usize {
        match self {
            TableKind::Hierarchical => 3,
            TableKind::Flat => 1,
        }
    }
}

/// Orthogroup categories by species presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Category {
    /// Exactly one gene in every species.
    CoreSingle,
    /// At least one gene in every species.
    CoreAll,
    /// Present in two or more species, but not all.
    Accessory,
    /// Present in exactly one species.
    Singleton,
}

impl Category {
    pub fn matches(self, counts: ArrayView1<'_, u32>) -> bool {
        let present = counts.iter().filter(|&&c| c > 0).count();
        let core = present == counts.len() && !counts.is_empty();
        match self {
            Category::CoreSingle => core && counts.iter().all(|&c| c == 1),
            Category::CoreAll => core,
            Category::Accessory => !core && present >= 2,
            Category::Singleton => present == 1 && !core,
        }
    }
}

/// Splits a species cell into its gene identifiers.
pub fn split_genes(cell: &str) -> impl Iterator<Item = &str> {
    cell.split(", ").map(str::trim).filter(|g| !g.is_empty())
}

#[derive(Debug, Clone)]
pub struct OrthogroupTable {
    pub kind: TableKind,
    /// Full header, leading columns included.
    pub header: Vec<String>,
    pub species: Vec<String>,
    /// Leading cells of each row (HOG, OG, clade or just the orthogroup).
    pub leading: Vec<Vec<String>>,
    /// Raw species cells, padded to the species count.
    pub cells: Vec<Vec<String>>,
    /// Gene copy numbers (orthogroups x species).
    pub copy_numbers: Array2<u32>,
}

impl OrthogroupTable {
    /// Loads an orthogroup table.
    ///
    /// # Arguments
    ///
    /// * `path` - `N0.tsv` or `Orthogroups.tsv` (or `-`).
    ///
    /// # Returns
    ///
    /// * `ToolResult<OrthogroupTable>` - The table, or an error for an unknown
    ///   layout or a row with more columns than the header.
    pub fn read(path: &Path) -> ToolResult<Self> {
        let mut reader = tsv_reader(path, true, false)?;
        let headers = reader.headers()?.clone();
        let kind = TableKind::detect(&headers)?;
        let lead = kind.leading_columns();
        let header: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
        let species: Vec<String> = header[lead.min(header.len())..].to_vec();

        let mut leading = Vec::new();
        let mut cells = Vec::new();
        for result in reader.records() {
            let record = result?;
            let line = record.position().map_or(0, |p| p.line());
            if record.len() == 1 && record[0].trim().is_empty() {
                continue;
            }
            if record.len() > header.len() {
                return Err(ToolError::malformed(
                    "orthogroup table",
                    line,
                    format!(
                        "{} columns but the header has {}",
                        record.len(),
                        header.len()
                    ),
                ));
            }
            let fields: Vec<String> = record.iter().map(|f| f.trim().to_string()).collect();
            let mut row_lead: Vec<String> = fields.iter().take(lead).cloned().collect();
            row_lead.resize(lead, String::new());
            let mut row_cells: Vec<String> = fields.into_iter().skip(lead).collect();
            row_cells.resize(species.len(), String::new());

            leading.push(row_lead);
            cells.push(row_cells);
        }

        let mut copy_numbers = Array2::zeros((cells.len(), species.len()));
        for (i, row) in cells.iter().enumerate() {
            for (j, cell) in row.iter().enumerate() {
                copy_numbers[[i, j]] = split_genes(cell).count() as u32;
            }
        }
        debug!(
            "Loaded {} orthogroups across {} species from {}",
            cells.len(),
            species.len(),
            path.display()
        );

        Ok(OrthogroupTable {
            kind,
            header,
            species,
            leading,
            cells,
            copy_numbers,
        })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Header of the identifier column (`HOG` or `Orthogroup`).
    pub fn id_column(&self) -> &str {
        &self.header[0]
    }

    /// Row identifier: the HOG or the orthogroup.
    pub fn id(&self, row: usize) -> &str {
        &self.leading[row][0]
    }

    /// OG column of hierarchical tables.
    pub fn og(&self, row: usize) -> Option<&str> {
        match self.kind {
            TableKind::Hierarchical => Some(self.leading[row][1].as_str()),
            TableKind::Flat => None,
        }
    }

    /// Identifier columns written by the selection tools: the id, plus OG
    /// for hierarchical tables.
    pub fn key_columns(&self) -> Vec<&str> {
        match self.kind {
            TableKind::Hierarchical => vec![self.header[0].as_str(), self.header[1].as_str()],
            TableKind::Flat => vec![self.header[0].as_str()],
        }
    }

    /// Values of [`key_columns`](Self::key_columns) for a row.
    pub fn key_values(&self, row: usize) -> Vec<&str> {
        let mut keys = vec![self.id(row)];
        keys.extend(self.og(row));
        keys
    }

    pub fn species_index(&self, name: &str) -> Option<usize> {
        self.species.iter().position(|s| s == name)
    }

    pub fn counts(&self, row: usize) -> ArrayView1<'_, u32> {
        self.copy_numbers.row(row)
    }

    /// Genes of one species in a row.
    pub fn genes(&self, row: usize, species: usize) -> impl Iterator<Item = &str> {
        split_genes(&self.cells[row][species])
    }

    /// Rows belonging to a category, in file order.
    pub fn rows_in(&self, category: Category) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).filter(move |&row| category.matches(self.counts(row)))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    pub(crate) const N0_TSV: &str = "HOG\tOG\tGene Tree Parent Clade\tspA\tspB\tspC\n\
N0.HOG0000000\tOG0000000\tn0\ta1\tb1\tc1\n\
N0.HOG0000001\tOG0000001\tn0\ta2, a3\tb2\tc2\n\
N0.HOG0000002\tOG0000002\tn1\ta4\tb3\t\n\
N0.HOG0000003\tOG0000003\tn1\t\t\tc3\n\
N0.HOG0000004\tOG0000004\tn1\ta5\n";

    pub(crate) fn write_n0(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("N0.tsv");
        fs::write(&path, N0_TSV).unwrap();
        path
    }

    #[test]
    fn test_read_hierarchical_table() {
        let dir = tempdir().unwrap();
        let table = OrthogroupTable::read(&write_n0(dir.path())).unwrap();
        assert_eq!(table.kind, TableKind::Hierarchical);
        assert_eq!(table.species, vec!["spA", "spB", "spC"]);
        assert_eq!(table.len(), 5);
        assert_eq!(table.id(1), "N0.HOG0000001");
        assert_eq!(table.og(1), Some("OG0000001"));
        assert_eq!(table.counts(1).to_vec(), vec![2, 1, 1]);
        // short row padded with empty cells
        assert_eq!(table.cells[4], vec!["a5", "", ""]);
        assert_eq!(table.counts(4).to_vec(), vec![1, 0, 0]);
        assert_eq!(table.genes(1, 0).collect::<Vec<_>>(), vec!["a2", "a3"]);
        assert_eq!(table.genes(1, 2).collect::<Vec<_>>(), vec!["c2"]);
    }

    #[test]
    fn test_read_flat_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Orthogroups.tsv");
        fs::write(&path, "Orthogroup\tspA\tspB\nOG0000000\ta1, a2\tb1\n").unwrap();
        let table = OrthogroupTable::read(&path).unwrap();
        assert_eq!(table.kind, TableKind::Flat);
        assert_eq!(table.og(0), None);
        assert_eq!(table.key_columns(), vec!["Orthogroup"]);
        assert_eq!(table.genes(0, 0).collect::<Vec<_>>(), vec!["a1", "a2"]);
    }

    #[test]
    fn test_categories() {
        let dir = tempdir().unwrap();
        let table = OrthogroupTable::read(&write_n0(dir.path())).unwrap();
        let rows = |c| table.rows_in(c).collect::<Vec<_>>();
        assert_eq!(rows(Category::CoreSingle), vec![0]);
        assert_eq!(rows(Category::CoreAll), vec![0, 1]);
        assert_eq!(rows(Category::Accessory), vec![2]);
        assert_eq!(rows(Category::Singleton), vec![3, 4]);
    }

    #[test]
    fn test_unknown_layout_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.tsv");
        fs::write(&path, "Gene\tspA\n").unwrap();
        assert!(OrthogroupTable::read(&path).is_err());
    }
}
