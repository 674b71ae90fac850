//! `antismash-cluster`: which genes of a MIBiG reference cluster were
//! matched by antiSMASH's KnownClusterBlast.

use super::json::{value_to_string, AntismashOutput, Pairing};
use crate::error::{ToolError, ToolResult};
use crate::io::genbank::{bounds, qualifier, qualifier_values, read_genbank, GenBankRecord};
use crate::io::{create_output, read_id_list, tsv_writer};
use anyhow::{Context, Result};
use clap::{ArgGroup, Args};
use indexmap::{IndexMap, IndexSet};
use log::warn;
use std::io::Write;
use std::path::{Path, PathBuf};

const NA: &str = "NA";

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("input").required(true).args(["json", "fof"])))]
pub struct ClusterCmd {
    /// MIBiG reference cluster GenBank file
    pub genbank: PathBuf,

    /// Accession of the reference cluster (e.g. BGC0000001)
    pub cluster: String,

    /// A single antiSMASH JSON output
    #[arg(short, long)]
    pub json: Option<PathBuf>,

    /// File listing antiSMASH JSON outputs, one per line
    #[arg(short, long)]
    pub fof: Option<PathBuf>,

    /// Output file [stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// A CDS of the reference cluster.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceGene {
    pub product: Option<String>,
    pub gene_kind: Option<String>,
    pub gene_functions: Vec<String>,
}

impl ReferenceGene {
    fn columns(&self) -> [String; 3] {
        [
            self.product.clone().unwrap_or_else(|| NA.to_string()),
            self.gene_kind.clone().unwrap_or_else(|| NA.to_string()),
            if self.gene_functions.is_empty() {
                NA.to_string()
            } else {
                self.gene_functions.join(",")
            },
        ]
    }
}

/// Reference genes keyed by `protein_id`, else `locus_tag`, else `gene`.
pub fn reference_genes(record: &GenBankRecord) -> IndexMap<String, ReferenceGene> {
    let mut genes = IndexMap::new();
    for cds in record.features_of_kind("CDS") {
        let id = qualifier(cds, "protein_id")
            .or_else(|| qualifier(cds, "locus_tag"))
            .or_else(|| qualifier(cds, "gene"));
        let Some(id) = id else {
            let (start, end) = bounds(cds).unwrap_or_default();
            warn!("CDS at {}..{} in {} has no identifier", start, end, record.name);
            continue;
        };
        genes.insert(
            id.to_string(),
            ReferenceGene {
                product: qualifier(cds, "product").map(str::to_string),
                gene_kind: qualifier(cds, "gene_kind").map(str::to_string),
                gene_functions: qualifier_values(cds, "gene_functions")
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            },
        );
    }
    genes
}

/// Pairings of the first region whose best KnownClusterBlast hit is
/// `cluster`, or `None` when no region hits it.
pub fn find_cluster_pairings(
    output: &AntismashOutput,
    cluster: &str,
) -> ToolResult<Option<Vec<Pairing>>> {
    for record in &output.records {
        let blast = record.clusterblast()?;
        for region in record.regions() {
            let region_no = region.region_number()?;
            let best = blast
                .known(region_no)
                .filter(|r| r.total_hits > 0)
                .and_then(|r| r.best());
            if let Some((reference, score)) = best {
                if reference.accession == cluster {
                    return Ok(Some(score.pairings.clone()));
                }
            }
        }
    }
    Ok(None)
}

/// Writes matched reference genes followed by the unmatched ones.
pub fn write_cluster_report(
    reference: &IndexMap<String, ReferenceGene>,
    pairings: &[Pairing],
    name: Option<&str>,
    writer: &mut csv::Writer<impl Write>,
) -> ToolResult<()> {
    let mut matched = IndexSet::new();
    for pairing in pairings {
        let protein_id = pairing.subject.locus_tag.as_str();
        let gene = reference
            .get(protein_id)
            .ok_or_else(|| ToolError::not_found(protein_id, "the reference cluster"))?;
        matched.insert(protein_id.to_string());
        let mut row = vec![protein_id.to_string(), pairing.query_name()];
        row.extend(gene.columns());
        row.push("1".to_string());
        row.push(value_to_string(&pairing.subject.perc_coverage));
        row.push(value_to_string(&pairing.subject.perc_ident));
        row.extend(name.map(str::to_string));
        writer.write_record(&row)?;
    }
    for (protein_id, gene) in reference {
        if matched.contains(protein_id) {
            continue;
        }
        let mut row = vec![protein_id.clone(), NA.to_string()];
        row.extend(gene.columns());
        row.extend(["0", NA, NA].map(str::to_string));
        row.extend(name.map(str::to_string));
        writer.write_record(&row)?;
    }
    Ok(())
}

impl ClusterCmd {
    fn report_file(
        &self,
        json: &Path,
        reference: &IndexMap<String, ReferenceGene>,
        name: Option<&str>,
        writer: &mut csv::Writer<impl Write>,
    ) -> Result<()> {
        let output = AntismashOutput::read(json)
            .with_context(|| format!("Failed to read antiSMASH output {}", json.display()))?;
        let pairings = find_cluster_pairings(&output, &self.cluster)?.unwrap_or_else(|| {
            warn!("Cluster {} not found in {}", self.cluster, json.display());
            Vec::new()
        });
        write_cluster_report(reference, &pairings, name, writer)
            .with_context(|| format!("Failed to compare {} with the reference", json.display()))?;
        Ok(())
    }

    pub fn run(&self) -> Result<()> {
        let record = read_genbank(&self.genbank)
            .with_context(|| format!("Failed to read {}", self.genbank.display()))?
            .into_iter()
            .next()
            .ok_or_else(|| {
                ToolError::InvalidArgument(format!("no GenBank record in {}", self.genbank.display()))
            })?;
        let reference = reference_genes(&record);

        let mut header = vec![
            "protein_id",
            "match_id",
            "product",
            "gene_kind",
            "gene_fn",
            "hit",
            "perc_cov",
            "perc_identity",
        ];
        let mut writer = tsv_writer(create_output(self.output.as_deref())?);
        if let Some(json) = &self.json {
            writer.write_record(&header)?;
            self.report_file(json, &reference, None, &mut writer)?;
        } else if let Some(fof) = &self.fof {
            header.push("name");
            writer.write_record(&header)?;
            for file in read_id_list(fof)? {
                self.report_file(Path::new(&file), &reference, Some(file.as_str()), &mut writer)?;
            }
        }
        writer.flush()?;
        Ok(())
    }
}
