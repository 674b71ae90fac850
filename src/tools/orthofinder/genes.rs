//! Gene-level follow-ups on orthogroup results: `dup-length` and
//! `repeat-distance`.

use crate::error::{ToolError, ToolResult};
use crate::io::gff::GffReader;
use crate::io::{create_output, read_id_list, tsv_writer, STDIO};
use crate::tools::gff::for_each_feature;
use anyhow::{Context, Result};
use clap::Args;
use indexmap::{IndexMap, IndexSet};
use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

lazy_static! {
    static ref QUOTED_RE: Regex = Regex::new(r#""([^"]*)""#).expect("valid quote regex");
}

#[derive(Args, Debug)]
pub struct DupLengthCmd {
    /// Species tree node the duplications belong to
    pub node: String,

    /// Annotation of the node's species
    pub gff: PathBuf,

    /// Duplicated gene IDs, one per line
    #[arg(default_value = STDIO)]
    pub dups: PathBuf,

    /// Output file [stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// `end - start` of every gene feature, keyed by ID.
pub fn gene_lengths(gff: &Path) -> ToolResult<HashMap<String, u64>> {
    let mut lengths = HashMap::new();
    for_each_feature(gff, "gene", |record| {
        if let Some(id) = record.id() {
            lengths.insert(id.to_string(), record.span());
        }
        Ok(())
    })?;
    Ok(lengths)
}

/// Total length of the listed genes.
pub fn duplication_length<'a>(
    genes: impl IntoIterator<Item = &'a String>,
    lengths: &HashMap<String, u64>,
    source_name: &str,
) -> ToolResult<u64> {
    genes.into_iter().try_fold(0, |total, gene| {
        lengths
            .get(gene)
            .map(|length| total + length)
            .ok_or_else(|| ToolError::not_found(gene.as_str(), source_name))
    })
}

impl DupLengthCmd {
    pub fn run(&self) -> Result<()> {
        let genes = read_id_list(&self.dups)
            .with_context(|| format!("Failed to read {}", self.dups.display()))?;
        let lengths = gene_lengths(&self.gff)
            .with_context(|| format!("Failed to read {}", self.gff.display()))?;
        let total = duplication_length(&genes, &lengths, &self.gff.display().to_string())?;
        info!("{}: {} duplicated genes", self.node, genes.len());

        let mut out = create_output(self.output.as_deref())?;
        writeln!(out, "{}", total)?;
        out.flush()?;
        Ok(())
    }
}

/// A labelled span on a scaffold.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub label: String,
    pub start: u64,
    pub end: u64,
}

/// Label of a repeat: the first double-quoted string of its attributes
/// (RepeatMasker's `Target "Motif:..."`), else the whole column.
pub fn repeat_label(attributes: &str) -> String {
    QUOTED_RE
        .captures(attributes)
        .and_then(|c| c.get(1))
        .map_or_else(|| attributes.to_string(), |m| m.as_str().to_string())
}

/// Every feature of a repeat annotation, per scaffold, sorted by start.
pub fn load_repeats(path: &Path) -> ToolResult<HashMap<String, Vec<Span>>> {
    let mut repeats: HashMap<String, Vec<Span>> = HashMap::new();
    for record in GffReader::from_path(path)? {
        let record = record?;
        repeats.entry(record.seqid.clone()).or_default().push(Span {
            label: repeat_label(&record.attributes),
            start: record.start,
            end: record.end,
        });
    }
    for spans in repeats.values_mut() {
        spans.sort_by_key(|s| s.start);
    }
    Ok(repeats)
}

/// Listed mRNAs per scaffold (in order of first appearance), sorted by start.
pub fn load_genes(path: &Path, wanted: &IndexSet<String>) -> ToolResult<IndexMap<String, Vec<Span>>> {
    let mut genes: IndexMap<String, Vec<Span>> = IndexMap::new();
    for_each_feature(path, "mRNA", |record| {
        if let Some(id) = record.id().filter(|id| wanted.contains(*id)) {
            genes.entry(record.seqid.clone()).or_default().push(Span {
                label: id.to_string(),
                start: record.start,
                end: record.end,
            });
        }
        Ok(())
    })?;
    for spans in genes.values_mut() {
        spans.sort_by_key(|s| s.start);
    }
    Ok(genes)
}

/// Nearest repeat to a gene.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosestRepeat<'a> {
    /// Signed distance; negative when the repeat overlaps the gene.
    pub distance: i64,
    pub repeat: &'a Span,
}

impl ClosestRepeat<'_> {
    pub fn overlaps(&self) -> bool {
        self.distance < 0
    }
}

/// Finds the repeat nearest to `gene` among `repeats` sorted by start.
///
/// The right neighbour is the first repeat starting at or after the gene
/// end, the left neighbour the one before it. Distances are
/// `gene.start - left.end` and `right.start - gene.end`; the smaller
/// absolute value wins and ties go right.
pub fn closest_repeat<'a>(gene: &Span, repeats: &'a [Span]) -> Option<ClosestRepeat<'a>> {
    let i = repeats.partition_point(|r| r.start < gene.end);
    let left = i.checked_sub(1).map(|j| ClosestRepeat {
        distance: gene.start as i64 - repeats[j].end as i64,
        repeat: &repeats[j],
    });
    let right = repeats.get(i).map(|r| ClosestRepeat {
        distance: r.start as i64 - gene.end as i64,
        repeat: r,
    });
    match (left, right) {
        (Some(l), Some(r)) if l.distance.abs() < r.distance.abs() => Some(l),
        (_, Some(r)) => Some(r),
        (l, None) => l,
    }
}

#[derive(Args, Debug)]
pub struct RepeatDistanceCmd {
    /// Repeat annotation GFF (e.g. RepeatMasker)
    pub repeats: PathBuf,

    /// Gene annotation GFF
    pub annotation: PathBuf,

    /// mRNA IDs to measure, one per line
    #[arg(default_value = STDIO)]
    pub genes: PathBuf,

    /// Output file [stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl RepeatDistanceCmd {
    pub fn run(&self) -> Result<()> {
        let wanted = read_id_list(&self.genes)
            .with_context(|| format!("Failed to read {}", self.genes.display()))?;
        let genes = load_genes(&self.annotation, &wanted)
            .with_context(|| format!("Failed to read {}", self.annotation.display()))?;
        let repeats = load_repeats(&self.repeats)
            .with_context(|| format!("Failed to read {}", self.repeats.display()))?;
        debug!("Loaded repeats on {} scaffolds", repeats.len());

        let mut writer = tsv_writer(create_output(self.output.as_deref())?);
        writer.write_record(["scaffold", "gene", "closest_dist", "closest_rep", "overlap"])?;
        for (scaffold, spans) in &genes {
            let Some(scaffold_repeats) = repeats.get(scaffold) else {
                debug!("No repeats on {}", scaffold);
                continue;
            };
            for gene in spans {
                if let Some(closest) = closest_repeat(gene, scaffold_repeats) {
                    writer.write_record([
                        scaffold.as_str(),
                        gene.label.as_str(),
                        closest.distance.abs().to_string().as_str(),
                        closest.repeat.label.as_str(),
                        closest.overlaps().to_string().as_str(),
                    ])?;
                }
            }
        }
        writer.flush()?;
        Ok(())
    }
}
