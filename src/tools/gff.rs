//! GFF3 tools: gene length histograms and functional annotation tables.

use crate::error::{ToolError, ToolResult};
use crate::io::gff::{GffReader, GffRecord};
use crate::io::{create_output, tsv_writer};
use crate::stats::histogram::Histogram;
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use indexmap::IndexMap;
use log::info;
use std::path::{Path, PathBuf};

/// GO terms and Pfam domains of one feature.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionalInfo {
    pub go_terms: Vec<String>,
    pub pfam_domains: Vec<String>,
}

fn required_id(record: &GffRecord) -> ToolResult<&str> {
    record.id().ok_or_else(|| {
        ToolError::missing(
            "ID",
            format!(
                "{} feature at {}:{}-{}",
                record.feature_type, record.seqid, record.start, record.end
            ),
        )
    })
}

/// Calls `f` for every feature of type `feature` in a GFF file.
pub fn for_each_feature<F>(path: &Path, feature: &str, mut f: F) -> ToolResult<()>
where
    F: FnMut(GffRecord) -> ToolResult<()>,
{
    for record in GffReader::from_path(path)? {
        let record = record?;
        if record.feature_type == feature {
            f(record)?;
        }
    }
    Ok(())
}

/// GO terms and Pfam domains of every `feature` (usually mRNA), keyed by ID.
pub fn functional_info(path: &Path, feature: &str) -> ToolResult<IndexMap<String, FunctionalInfo>> {
    let mut info = IndexMap::new();
    for_each_feature(path, feature, |record| {
        let id = required_id(&record)?.to_string();
        info.insert(
            id,
            FunctionalInfo {
                go_terms: record.go_terms(),
                pfam_domains: record.pfam_domains(),
            },
        );
        Ok(())
    })?;
    Ok(info)
}

/// The `Note` attribute of every `feature` that has one, keyed by ID.
pub fn feature_notes(path: &Path, feature: &str) -> ToolResult<IndexMap<String, String>> {
    let mut notes = IndexMap::new();
    for_each_feature(path, feature, |record| {
        if let Some(note) = record.note() {
            notes.insert(required_id(&record)?.to_string(), note.to_string());
        }
        Ok(())
    })?;
    Ok(notes)
}

#[derive(Args, Debug)]
pub struct GeneLengthHistCmd {
    /// GFF3 file
    pub gff: PathBuf,

    /// Name written in the third column
    pub name: String,

    /// Bin width
    #[arg(short = 'w', long, default_value_t = 100)]
    pub bin_width: u64,

    /// Output file [stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl GeneLengthHistCmd {
    pub fn run(&self) -> Result<()> {
        let mut lengths = Vec::new();
        for_each_feature(&self.gff, "gene", |record| {
            lengths.push(record.span() as i64);
            Ok(())
        })
        .with_context(|| format!("Failed to read {}", self.gff.display()))?;
        info!("{} genes in {}", lengths.len(), self.gff.display());

        let hist = Histogram::from_values(&lengths, self.bin_width)
            .with_context(|| format!("No gene lengths in {}", self.gff.display()))?;
        let mut writer = tsv_writer(create_output(self.output.as_deref())?);
        for (edge, count) in hist.rows() {
            writer.write_record([edge.to_string(), count.to_string(), self.name.clone()])?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Element {
    Note,
    Parent,
    Pfam,
    Go,
}

impl Element {
    fn name(self) -> &'static str {
        match self {
            Element::Note => "note",
            Element::Parent => "parent",
            Element::Pfam => "pfam",
            Element::Go => "go",
        }
    }

    /// Values of this element in one feature.
    fn values(self, record: &GffRecord) -> Vec<String> {
        match self {
            Element::Note => record.note().map(str::to_string).into_iter().collect(),
            Element::Parent => record.parent().map(str::to_string).into_iter().collect(),
            Element::Pfam => record.pfam_domains(),
            Element::Go => record.go_terms(),
        }
    }
}

#[derive(Args, Debug)]
pub struct FunctionalInfoCmd {
    /// GFF3 file
    pub gff: PathBuf,

    /// Feature type to report
    #[arg(short, long, default_value = "mRNA")]
    pub feature: String,

    /// Attribute element to extract
    #[arg(short, long, value_enum, default_value_t = Element::Note)]
    pub element: Element,

    /// Output file [stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl FunctionalInfoCmd {
    pub fn run(&self) -> Result<()> {
        let mut writer = tsv_writer(create_output(self.output.as_deref())?);
        writer.write_record([self.feature.as_str(), self.element.name()])?;
        let mut rows = 0usize;
        for_each_feature(&self.gff, &self.feature, |record| {
            let values = self.element.values(&record);
            if values.is_empty() {
                return Ok(());
            }
            let id = required_id(&record)?;
            for value in &values {
                writer.write_record([id, value.as_str()])?;
                rows += 1;
            }
            Ok(())
        })
        .with_context(|| format!("Failed to read {}", self.gff.display()))?;
        writer.flush()?;
        info!("Wrote {} {} rows", rows, self.element.name());
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    /// A small MAKER annotation: two genes with one mRNA each.
    pub(crate) const MAKER_GFF: &str = "##gff-version 3
scaf1\tmaker\tgene\t1\t250\t.\t+\t.\tID=g1;Name=g1
scaf1\tmaker\tmRNA\t1\t250\t.\t+\t.\tID=g1-mRNA-1;Parent=g1;Note=Similar to polyketide synthase;Dbxref=Pfam:PF00109,Pfam:PF02801;Ontology_term=GO:0016740,GO:0009058
scaf1\tmaker\texon\t1\t250\t.\t+\t.\tID=g1-mRNA-1:exon:1;Parent=g1-mRNA-1
scaf1\tmaker\tgene\t400\t1450\t.\t-\t.\tID=g2;Name=g2
scaf1\tmaker\tmRNA\t400\t1450\t.\t-\t.\tID=g2-mRNA-1;Parent=g2;Dbxref=Pfam:PF00109
##FASTA
>scaf1
ACGT
";

    #[test]
    fn test_functional_info_per_mrna() {
        let dir = tempdir().unwrap();
        let gff = dir.path().join("maker.gff");
        fs::write(&gff, MAKER_GFF).unwrap();

        let info = functional_info(&gff, "mRNA").unwrap();
        assert_eq!(info.len(), 2);
        assert_eq!(info["g1-mRNA-1"].go_terms, vec!["GO:0016740", "GO:0009058"]);
        assert_eq!(info["g1-mRNA-1"].pfam_domains, vec!["PF00109", "PF02801"]);
        assert!(info["g2-mRNA-1"].go_terms.is_empty());

        let notes = feature_notes(&gff, "mRNA").unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes["g1-mRNA-1"], "Similar to polyketide synthase");
    }

    #[test]
    fn test_gene_length_histogram() {
        let dir = tempdir().unwrap();
        let gff = dir.path().join("maker.gff");
        fs::write(&gff, MAKER_GFF).unwrap();
        let out = dir.path().join("hist.tsv");

        GeneLengthHistCmd {
            gff,
            name: "JB-39".to_string(),
            bin_width: 500,
            output: Some(out.clone()),
        }
        .run()
        .unwrap();
        // lengths 249 and 1050 -> upper limit 1500
        assert_eq!(
            fs::read_to_string(&out).unwrap(),
            "500\t1\tJB-39\n1000\t0\tJB-39\n1500\t1\tJB-39\n"
        );
    }

    #[test]
    fn test_functional_info_elements() {
        let dir = tempdir().unwrap();
        let gff = dir.path().join("maker.gff");
        fs::write(&gff, MAKER_GFF).unwrap();
        let out = dir.path().join("pfam.tsv");

        FunctionalInfoCmd {
            gff: gff.clone(),
            feature: "mRNA".to_string(),
            element: Element::Pfam,
            output: Some(out.clone()),
        }
        .run()
        .unwrap();
        assert_eq!(
            fs::read_to_string(&out).unwrap(),
            "mRNA\tpfam\ng1-mRNA-1\tPF00109\ng1-mRNA-1\tPF02801\ng2-mRNA-1\tPF00109\n"
        );

        FunctionalInfoCmd {
            gff,
            feature: "mRNA".to_string(),
            element: Element::Parent,
            output: Some(out.clone()),
        }
        .run()
        .unwrap();
        assert_eq!(
            fs::read_to_string(&out).unwrap(),
            "mRNA\tparent\ng1-mRNA-1\tg1\ng2-mRNA-1\tg2\n"
        );
    }
}
