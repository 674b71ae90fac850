//! Functional annotation of orthogroups: `og-func`, `og-gmt` and
//! `og-gene-gmt`.

use crate::error::{ToolError, ToolResult};
use crate::io::orthogroups::OrthogroupTable;
use crate::io::{create_output, tsv_reader, tsv_writer};
use crate::tools::gff::{functional_info, FunctionalInfo};
use anyhow::{Context, Result};
use clap::Args;
use indexmap::IndexMap;
use log::{debug, info};
use std::path::{Path, PathBuf};

pub const GO_COLUMN: &str = "go_terms";
pub const PFAM_COLUMN: &str = "pfam_domains";

/// Occurrences of annotation terms, in first-seen order.
#[derive(Debug, Default)]
struct TermCounts(IndexMap<String, usize>);

impl TermCounts {
    fn add(&mut self, terms: &[String]) {
        for term in terms {
            *self.0.entry(term.clone()).or_insert(0) += 1;
        }
    }

    /// Every term, or only those with the highest count.
    fn terms(&self, most_common: bool) -> Vec<&str> {
        let max = self.0.values().copied().max().unwrap_or(0);
        self.0
            .iter()
            .filter(|(_, count)| !most_common || **count == max)
            .map(|(term, _)| term.as_str())
            .collect()
    }
}

/// GO terms and Pfam domains of an orthogroup's member genes.
///
/// Each species column is looked up in its own annotation, so `annotations`
/// must hold one map per species of `table`.
pub fn orthogroup_function(
    table: &OrthogroupTable,
    row: usize,
    annotations: &[IndexMap<String, FunctionalInfo>],
    most_common: bool,
) -> (String, String) {
    let mut go = TermCounts::default();
    let mut pfam = TermCounts::default();
    for (species, info) in annotations.iter().enumerate() {
        for gene in table.genes(row, species) {
            if let Some(func) = info.get(gene) {
                go.add(&func.go_terms);
                pfam.add(&func.pfam_domains);
            }
        }
    }
    (
        go.terms(most_common).join(","),
        pfam.terms(most_common).join(","),
    )
}

#[derive(Args, Debug)]
pub struct FuncCmd {
    /// N0.tsv or Orthogroups.tsv
    pub tsv: PathBuf,

    /// MAKER GFF files, one per species column and in the same order
    #[arg(required = true)]
    pub gff: Vec<PathBuf>,

    /// Keep only the most frequent GO terms and Pfam domains of each group
    #[arg(long)]
    pub most_common: bool,

    /// Output file [stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl FuncCmd {
    pub fn run(&self) -> Result<()> {
        let table = OrthogroupTable::read(&self.tsv)
            .with_context(|| format!("Failed to read {}", self.tsv.display()))?;
        if table.species.len() != self.gff.len() {
            return Err(ToolError::InvalidArgument(format!(
                "{} species in {} but {} GFF files given",
                table.species.len(),
                self.tsv.display(),
                self.gff.len()
            ))
            .into());
        }

        let mut annotations = Vec::with_capacity(self.gff.len());
        for (species, gff) in table.species.iter().zip(&self.gff) {
            let info = functional_info(gff, "mRNA")
                .with_context(|| format!("Failed to read {}", gff.display()))?;
            debug!("{}: {} annotated mRNAs", species, info.len());
            annotations.push(info);
        }

        let mut writer = tsv_writer(create_output(self.output.as_deref())?);
        writer.write_record([table.id_column(), GO_COLUMN, PFAM_COLUMN])?;
        for row in 0..table.len() {
            let (go, pfam) = orthogroup_function(&table, row, &annotations, self.most_common);
            writer.write_record([table.id(row), go.as_str(), pfam.as_str()])?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Annotation table written by `og-func`: id → column → value.
#[derive(Debug, Default)]
pub struct FunctionTable {
    pub header: Vec<String>,
    pub rows: IndexMap<String, Vec<String>>,
}

impl FunctionTable {
    pub fn read(path: &Path) -> ToolResult<Self> {
        let mut reader = tsv_reader(path, true, false)?;
        let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = IndexMap::new();
        for result in reader.records() {
            let record = result?;
            let mut fields: Vec<String> = record.iter().map(str::to_string).collect();
            if fields.iter().all(|f| f.is_empty()) {
                continue;
            }
            fields.resize(header.len(), String::new());
            rows.insert(fields[0].clone(), fields);
        }
        Ok(FunctionTable { header, rows })
    }

    pub fn column(&self, name: &str) -> ToolResult<usize> {
        self.header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ToolError::missing(name, "functional annotation header"))
    }

    /// Value of `column` for `id`, empty when the id is absent.
    pub fn value(&self, id: &str, column: usize) -> &str {
        self.rows
            .get(id)
            .and_then(|fields| fields.get(column))
            .map_or("", String::as_str)
    }
}

/// Inverts a term column into term → ids, both in first-seen order.
pub fn term_sets(table: &FunctionTable, column: usize) -> IndexMap<String, Vec<String>> {
    let mut sets: IndexMap<String, Vec<String>> = IndexMap::new();
    for (id, fields) in &table.rows {
        let terms = fields[column].split(',').filter(|t| !t.is_empty());
        for term in terms {
            sets.entry(term.to_string()).or_default().push(id.clone());
        }
    }
    sets
}

#[derive(Args, Debug)]
pub struct GmtCmd {
    /// Output of og-func
    pub func: PathBuf,

    /// Term column to convert
    #[arg(short, long, default_value = GO_COLUMN)]
    pub column: String,

    /// Output file [stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl GmtCmd {
    pub fn run(&self) -> Result<()> {
        let table = FunctionTable::read(&self.func)
            .with_context(|| format!("Failed to read {}", self.func.display()))?;
        let column = table.column(&self.column)?;
        let sets = term_sets(&table, column);

        let mut writer = tsv_writer(create_output(self.output.as_deref())?);
        for (term, ids) in &sets {
            let mut fields = vec![term.as_str(), "NA"];
            fields.extend(ids.iter().map(String::as_str));
            writer.write_record(&fields)?;
        }
        writer.flush()?;
        info!("Wrote {} gene sets", sets.len());
        Ok(())
    }
}

/// Species → GFF pairs from a two-column `species<TAB>gff` map file.
pub fn read_species_map(path: &Path) -> ToolResult<IndexMap<String, PathBuf>> {
    let mut reader = tsv_reader(path, false, false)?;
    let mut map = IndexMap::new();
    for result in reader.records() {
        let record = result?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let line = record.position().map_or(0, |p| p.line());
        if record.len() != 2 {
            return Err(ToolError::malformed(
                "species map",
                line,
                "expected one GFF file per species name in two tab-separated columns",
            ));
        }
        map.insert(record[0].trim().to_string(), PathBuf::from(record[1].trim()));
    }
    Ok(map)
}

/// GO term → member mRNAs of every orthogroup, both in first-seen order.
///
/// `annotations` holds one map per species column of `table`.
pub fn gene_term_sets(
    table: &OrthogroupTable,
    annotations: &[IndexMap<String, FunctionalInfo>],
) -> IndexMap<String, Vec<String>> {
    let mut sets: IndexMap<String, Vec<String>> = IndexMap::new();
    for row in 0..table.len() {
        for (species, info) in annotations.iter().enumerate() {
            for gene in table.genes(row, species) {
                let Some(func) = info.get(gene) else {
                    continue;
                };
                for term in &func.go_terms {
                    sets.entry(term.clone()).or_default().push(gene.to_string());
                }
            }
        }
    }
    sets
}

#[derive(Args, Debug)]
pub struct GeneGmtCmd {
    /// N0.tsv or Orthogroups.tsv
    pub tsv: PathBuf,

    /// Two-column file mapping each species column to its MAKER GFF
    pub map: PathBuf,

    /// Output file [stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl GeneGmtCmd {
    pub fn run(&self) -> Result<()> {
        let table = OrthogroupTable::read(&self.tsv)
            .with_context(|| format!("Failed to read {}", self.tsv.display()))?;
        let map = read_species_map(&self.map)
            .with_context(|| format!("Failed to read {}", self.map.display()))?;

        let mut annotations = Vec::with_capacity(table.species.len());
        for species in &table.species {
            let gff = map.get(species).ok_or_else(|| {
                ToolError::not_found(species, format!("map file {}", self.map.display()))
            })?;
            let info = functional_info(gff, "mRNA")
                .with_context(|| format!("Failed to read {}", gff.display()))?;
            debug!("{}: {} annotated mRNAs", species, info.len());
            annotations.push(info);
        }

        let sets = gene_term_sets(&table, &annotations);
        let mut writer = tsv_writer(create_output(self.output.as_deref())?);
        for (term, genes) in &sets {
            let mut fields = vec![term.as_str(), "NA"];
            fields.extend(genes.iter().map(String::as_str));
            writer.write_record(&fields)?;
        }
        writer.flush()?;
        info!("Wrote {} gene sets", sets.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::orthogroups::tests::write_n0;
    use std::fs;
    use tempfile::tempdir;

    fn gff_line(id: &str, attrs: &str) -> String {
        format!("scaf1\tmaker\tmRNA\t1\t100\t.\t+\t.\tID={};{}\n", id, attrs)
    }

    /// One GFF per species of the N0 fixture.
    fn write_gffs(dir: &Path) -> Vec<PathBuf> {
        let species = [
            gff_line("a2", "Ontology_term=GO:0000001,GO:0000002;Dbxref=Pfam:PF00001")
                + &gff_line("a3", "Ontology_term=GO:0000002"),
            gff_line("b2", "Ontology_term=GO:0000002;Dbxref=Pfam:PF00002"),
            gff_line("c2", "Note=hypothetical protein"),
        ];
        species
            .iter()
            .enumerate()
            .map(|(i, content)| {
                let path = dir.join(format!("sp{}.gff", i));
                fs::write(&path, content).unwrap();
                path
            })
            .collect()
    }

    #[test]
    fn test_orthogroup_function_all_and_most_common() {
        let dir = tempdir().unwrap();
        let table = OrthogroupTable::read(&write_n0(dir.path())).unwrap();
        let annotations: Vec<_> = write_gffs(dir.path())
            .iter()
            .map(|p| functional_info(p, "mRNA").unwrap())
            .collect();

        let (go, pfam) = orthogroup_function(&table, 1, &annotations, false);
        assert_eq!(go, "GO:0000001,GO:0000002");
        assert_eq!(pfam, "PF00001,PF00002");

        let (go, pfam) = orthogroup_function(&table, 1, &annotations, true);
        assert_eq!(go, "GO:0000002");
        // tie: both domains seen once
        assert_eq!(pfam, "PF00001,PF00002");

        let (go, pfam) = orthogroup_function(&table, 0, &annotations, true);
        assert!(go.is_empty() && pfam.is_empty());
    }

    #[test]
    fn test_func_requires_one_gff_per_species() {
        let dir = tempdir().unwrap();
        let gffs = write_gffs(dir.path());
        let cmd = FuncCmd {
            tsv: write_n0(dir.path()),
            gff: gffs[..2].to_vec(),
            most_common: false,
            output: None,
        };
        assert!(cmd.run().is_err());
    }

    #[test]
    fn test_func_then_gmt() {
        let dir = tempdir().unwrap();
        let func = dir.path().join("func.tsv");
        FuncCmd {
            tsv: write_n0(dir.path()),
            gff: write_gffs(dir.path()),
            most_common: false,
            output: Some(func.clone()),
        }
        .run()
        .unwrap();
        let content = fs::read_to_string(&func).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "HOG\tgo_terms\tpfam_domains");
        assert_eq!(lines[1], "N0.HOG0000000\t\t");
        assert_eq!(
            lines[2],
            "N0.HOG0000001\tGO:0000001,GO:0000002\tPF00001,PF00002"
        );
        assert_eq!(lines.len(), 6);

        let gmt = dir.path().join("func.gmt");
        GmtCmd {
            func,
            column: PFAM_COLUMN.to_string(),
            output: Some(gmt.clone()),
        }
        .run()
        .unwrap();
        assert_eq!(
            fs::read_to_string(&gmt).unwrap(),
            "PF00001\tNA\tN0.HOG0000001\nPF00002\tNA\tN0.HOG0000001\n"
        );
    }

    #[test]
    fn test_term_sets_collect_ids() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("func.tsv");
        fs::write(
            &path,
            "HOG\tgo_terms\tpfam_domains\nH1\tGO:1,GO:2\t\nH2\tGO:2\tPF1\nH3\t\t\n",
        )
        .unwrap();
        let table = FunctionTable::read(&path).unwrap();
        let sets = term_sets(&table, table.column("go_terms").unwrap());
        assert_eq!(sets["GO:1"], vec!["H1"]);
        assert_eq!(sets["GO:2"], vec!["H1", "H2"]);
        assert!(table.column("labels").is_err());
        assert_eq!(table.value("H2", 2), "PF1");
        assert_eq!(table.value("H9", 2), "");
    }

    fn write_map(dir: &Path, gffs: &[PathBuf], species: &[&str]) -> PathBuf {
        let path = dir.join("map.tsv");
        let content: String = species
            .iter()
            .zip(gffs)
            .map(|(name, gff)| format!("{}\t{}\n", name, gff.display()))
            .collect();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_gene_gmt_lists_member_mrnas() {
        let dir = tempdir().unwrap();
        let gffs = write_gffs(dir.path());
        let map = write_map(dir.path(), &gffs, &["spA", "spB", "spC"]);
        let out = dir.path().join("genes.gmt");
        GeneGmtCmd {
            tsv: write_n0(dir.path()),
            map,
            output: Some(out.clone()),
        }
        .run()
        .unwrap();
        assert_eq!(
            fs::read_to_string(&out).unwrap(),
            "GO:0000001\tNA\ta2\nGO:0000002\tNA\ta2\ta3\tb2\n"
        );
    }

    #[test]
    fn test_gene_gmt_species_missing_from_map() {
        let dir = tempdir().unwrap();
        let gffs = write_gffs(dir.path());
        let map = write_map(dir.path(), &gffs, &["spA", "spB"]);
        let err = GeneGmtCmd {
            tsv: write_n0(dir.path()),
            map,
            output: Some(dir.path().join("genes.gmt")),
        }
        .run()
        .unwrap_err();
        assert!(err.to_string().contains("'spC' not found in map file"), "{}", err);
    }

    #[test]
    fn test_species_map_needs_two_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("map.tsv");
        fs::write(&path, "spA\ta.gff\nspB\n").unwrap();
        assert!(read_species_map(&path).is_err());
        fs::write(&path, "spA\ta.gff\n\nspB\tb.gff\n").unwrap();
        let map = read_species_map(&path).unwrap();
        assert_eq!(map["spB"], PathBuf::from("b.gff"));
    }
}
