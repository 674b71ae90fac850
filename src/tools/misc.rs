//! Small converters: Jira tables, GeneValidator summaries and GAG output
//! filtering.

use crate::error::{ToolError, ToolResult};
use crate::io::fastx::{for_each_record, split_header};
use crate::io::gff::GffReader;
use crate::io::{basename, create_output, open_input, open_piped_input, read_id_list, tsv_writer, STDIO};
use anyhow::{bail, Context, Result};
use bio::io::fasta;
use clap::Args;
use indexmap::IndexSet;
use itertools::Itertools;
use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

lazy_static! {
    static ref MRNA_RE: Regex = Regex::new(r"^(.+)-mRNA-\d+").expect("valid mRNA regex");
}

/// Formats one tab-separated line as a Jira table row.
pub fn jira_row(line: &str, separator: &str) -> String {
    format!("{sep}{}{sep}", line.split('\t').join(separator), sep = separator)
}

#[derive(Args, Debug)]
pub struct ToJiraCmd {
    /// TSV file to convert [stdin]
    #[arg(short, long, default_value = STDIO)]
    pub input: PathBuf,

    /// Output file [stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Start every data row with a header cell
    #[arg(short = 'c', long)]
    pub column_headers: bool,

    /// Format the first row as a data row
    #[arg(short, long)]
    pub no_header: bool,
}

impl ToJiraCmd {
    pub fn run(&self) -> Result<()> {
        let input = open_piped_input(&self.input, "the TSV table")?;
        let mut out = create_output(self.output.as_deref())?;
        let mut lines = input.lines();

        if let Some(header) = lines.next().transpose()? {
            let separator = if self.no_header { "|" } else { "||" };
            writeln!(out, "{}", jira_row(header.trim(), separator))?;
        }
        for line in lines {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if self.column_headers {
                write!(out, "|")?;
            }
            writeln!(out, "{}", jira_row(line, "|"))?;
        }
        out.flush()?;
        Ok(())
    }
}

/// Prediction problems counted from a GeneValidator `results.csv`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationSummary {
    pub too_few_hits: u64,
    pub too_long: u64,
    pub too_short: u64,
    pub gene_merge: u64,
    pub duplication: u64,
    pub total: u64,
}

const HITS_COLUMN: usize = 3;
const LENGTH_RANK_COLUMN: usize = 5;
const GENE_MERGE_COLUMN: usize = 6;
const DUPLICATION_COLUMN: usize = 7;

impl ValidationSummary {
    /// Reads `AnalysisNumber,GVScore,Identifier,NumberOfHits,LengthCluster,
    /// LengthRank,GeneMerge,Duplication,MissingExtraSequences` rows.
    /// Predictions with fewer than 5 hits are only counted as such; a
    /// non-numeric gene merge or duplication value flags nothing.
    pub fn from_reader<R: std::io::Read>(reader: R) -> ToolResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        let mut summary = ValidationSummary::default();
        for result in reader.records() {
            let record = result?;
            let line = record.position().map_or(0, |p| p.line());
            summary.total += 1;

            let field = |i: usize| {
                record.get(i).map(str::trim).ok_or_else(|| {
                    ToolError::malformed("GeneValidator", line, format!("column {} missing", i + 1))
                })
            };
            let hits: u64 = field(HITS_COLUMN)?.parse().map_err(|_| {
                ToolError::malformed("GeneValidator", line, "invalid NumberOfHits")
            })?;
            if hits < 5 {
                summary.too_few_hits += 1;
                continue;
            }

            let length_rank = field(LENGTH_RANK_COLUMN)?;
            if length_rank.contains("too long") {
                summary.too_long += 1;
            } else if length_rank.contains("too short") {
                summary.too_short += 1;
            }
            match field(GENE_MERGE_COLUMN)?.parse::<f64>() {
                Ok(score) if score > 0.4 && score < 1.2 => summary.gene_merge += 1,
                Ok(_) => {}
                Err(_) => debug!("line {}: no gene merge score", line),
            }
            match field(DUPLICATION_COLUMN)?.parse::<f64>() {
                Ok(p) if p <= 0.05 => summary.duplication += 1,
                Ok(_) => {}
                Err(_) => debug!("line {}: no duplication p-value", line),
            }
        }
        Ok(summary)
    }
}

#[derive(Args, Debug)]
pub struct GeneValidatorCmd {
    /// GeneValidator results.csv
    pub csv: PathBuf,

    /// Name of the run [csv file name]
    #[arg(short, long)]
    pub name: Option<String>,

    /// Output file [stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl GeneValidatorCmd {
    pub fn run(&self) -> Result<()> {
        let summary = ValidationSummary::from_reader(open_input(&self.csv)?)
            .with_context(|| format!("Failed to parse {}", self.csv.display()))?;
        let name = self
            .name
            .clone()
            .unwrap_or_else(|| self.csv.display().to_string());

        let mut writer = tsv_writer(create_output(self.output.as_deref())?);
        writer.write_record([
            "name",
            "too_few_hits",
            "too_long",
            "too_short",
            "gene_merge",
            "duplication",
            "total",
        ])?;
        writer.write_record([
            name,
            summary.too_few_hits.to_string(),
            summary.too_long.to_string(),
            summary.too_short.to_string(),
            summary.gene_merge.to_string(),
            summary.duplication.to_string(),
            summary.total.to_string(),
        ])?;
        writer.flush()?;
        Ok(())
    }
}

/// IDs to keep and the gene names derived from them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeepList {
    pub ids: IndexSet<String>,
    pub genes: IndexSet<String>,
}

impl KeepList {
    /// Gene names are the part of an ID before `-mRNA-<n>`.
    pub fn new(ids: IndexSet<String>) -> Self {
        let genes = ids
            .iter()
            .filter_map(|id| MRNA_RE.captures(id).map(|c| c[1].to_string()))
            .collect();
        KeepList { ids, genes }
    }
}

fn filter_gag_fasta(input: &Path, keep: &KeepList, out: Box<dyn Write>) -> ToolResult<(usize, usize)> {
    let mut writer = fasta::Writer::new(out);
    let mut kept = 0;
    let total = for_each_record(input, |record| {
        let (id, _) = split_header(record.id());
        if keep.ids.contains(&id) {
            writer.write(&id, None, &record.seq())?;
            kept += 1;
        }
        Ok(())
    })?;
    writer.flush()?;
    Ok((kept, total))
}

fn filter_gag_gff(input: &Path, keep: &KeepList, out: Box<dyn Write>) -> ToolResult<(usize, usize)> {
    let mut writer = tsv_writer(out);
    writer.write_record(["##gff-version 3"])?;
    let (mut kept, mut total) = (0, 0);
    for record in GffReader::from_path(input)? {
        let record = record?;
        total += 1;
        let Some(id) = record.id() else {
            continue;
        };
        let wanted = if record.feature_type == "gene" {
            keep.genes.contains(id)
        } else {
            keep.ids.contains(id)
        };
        if wanted {
            writer.write_record(record.to_fields())?;
            kept += 1;
        }
    }
    writer.flush()?;
    Ok((kept, total))
}

#[derive(Args, Debug)]
pub struct FilterGagCmd {
    /// IDs to keep, one per line [stdin]
    #[arg(default_value = STDIO)]
    pub ids: PathBuf,

    /// GAG output to filter (.fasta or .gff)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file [stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl FilterGagCmd {
    pub fn run(&self) -> Result<()> {
        let name = basename(&self.input);
        let is_fasta = name.ends_with(".fasta");
        if !is_fasta && !name.ends_with(".gff") {
            bail!("GAG files for filtering must be .gff or .fasta, got {}", name);
        }
        let keep = KeepList::new(
            read_id_list(&self.ids).with_context(|| format!("Failed to read {}", self.ids.display()))?,
        );
        debug!("{} IDs, {} genes to keep", keep.ids.len(), keep.genes.len());

        let out = create_output(self.output.as_deref())?;
        let (kept, total) = if is_fasta {
            filter_gag_fasta(&self.input, &keep, out)
        } else {
            filter_gag_gff(&self.input, &keep, out)
        }
        .with_context(|| format!("Failed to filter {}", self.input.display()))?;
        info!("Kept {} of {} entries", kept, total);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::tempdir;

    #[test]
    fn test_to_jira() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("table.tsv");
        fs::write(&input, "sample\treads\na\t10\nb\t20\n").unwrap();
        let out = dir.path().join("table.jira");

        let mut cmd = ToJiraCmd {
            input,
            output: Some(out.clone()),
            column_headers: false,
            no_header: false,
        };
        cmd.run().unwrap();
        assert_eq!(
            fs::read_to_string(&out).unwrap(),
            "||sample||reads||\n|a|10|\n|b|20|\n"
        );

        cmd.column_headers = true;
        cmd.no_header = true;
        cmd.run().unwrap();
        assert_eq!(
            fs::read_to_string(&out).unwrap(),
            "|sample|reads|\n||a|10|\n||b|20|\n"
        );
    }

    #[test]
    fn test_genevalidator_summary() {
        let csv = "AnalysisNumber,GVScore,Identifier,NumberOfHits,LengthCluster,LengthRank,GeneMerge,Duplication,MissingExtraSequences
1,0,protein|gene-0.15-mRNA-1,2,Not enough evidence,Not enough evidence,Not enough evidence,Not enough evidence,Not enough evidence
2,64,protein|gene-0.21-mRNA-1,18,382 [202 - 243],22%,0.0,1.0,77% conserved; 39% extra; 7% missing.
3,40,protein|gene-0.22-mRNA-1,30,200 [300 - 400],too short (5%),0.8,0.01,50% conserved
4,55,protein|gene-0.23-mRNA-1,12,900 [300 - 400],too long (95%),1.2,Not enough evidence,50% conserved
";
        let summary = ValidationSummary::from_reader(Cursor::new(csv)).unwrap();
        assert_eq!(
            summary,
            ValidationSummary {
                too_few_hits: 1,
                too_long: 1,
                too_short: 1,
                gene_merge: 1,
                duplication: 1,
                total: 4,
            }
        );
    }

    #[test]
    fn test_keep_list_genes() {
        let ids: IndexSet<String> = ["g1-mRNA-1", "g1-mRNA-2", "other"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let keep = KeepList::new(ids);
        assert_eq!(keep.genes.iter().collect::<Vec<_>>(), vec!["g1"]);
    }

    #[test]
    fn test_filter_gag_gff_and_fasta() {
        let dir = tempdir().unwrap();
        let ids = dir.path().join("ids.txt");
        fs::write(&ids, "g1-mRNA-1\n").unwrap();
        let gff = dir.path().join("genome.gff");
        fs::write(
            &gff,
            "##gff-version 3
scaf1\tmaker\tgene\t1\t90\t.\t+\t.\tID=g1;Name=g1
scaf1\tmaker\tmRNA\t1\t90\t.\t+\t.\tID=g1-mRNA-1;Parent=g1
scaf1\tmaker\tgene\t100\t200\t.\t+\t.\tID=g2
scaf1\tmaker\tmRNA\t100\t200\t.\t+\t.\tID=g2-mRNA-1;Parent=g2
",
        )
        .unwrap();
        let out = dir.path().join("filtered.gff");
        FilterGagCmd {
            ids: ids.clone(),
            input: gff,
            output: Some(out.clone()),
        }
        .run()
        .unwrap();
        assert_eq!(
            fs::read_to_string(&out).unwrap(),
            "##gff-version 3
scaf1\tmaker\tgene\t1\t90\t.\t+\t.\tID=g1;Name=g1
scaf1\tmaker\tmRNA\t1\t90\t.\t+\t.\tID=g1-mRNA-1;Parent=g1
"
        );

        let fasta = dir.path().join("genome.proteins.fasta");
        fs::write(&fasta, ">g1-mRNA-1 protein\nMKV\n>g2-mRNA-1 protein\nMAA\n").unwrap();
        FilterGagCmd {
            ids,
            input: fasta,
            output: Some(out.clone()),
        }
        .run()
        .unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), ">g1-mRNA-1\nMKV\n");
    }

    #[test]
    fn test_filter_gag_rejects_other_extensions() {
        let cmd = FilterGagCmd {
            ids: PathBuf::from("ids.txt"),
            input: PathBuf::from("genome.gff3"),
            output: None,
        };
        assert!(cmd.run().is_err());
    }
}
