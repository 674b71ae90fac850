//! `antismash-regions`: one row per antiSMASH region with its best
//! KnownClusterBlast (or ClusterBlast) hit.

use super::json::AntismashOutput;
use crate::error::{ToolError, ToolResult};
use crate::io::{basename, create_output, tsv_writer};
use anyhow::{Context, Result};
use clap::Args;
use log::info;
use std::path::PathBuf;

pub const REGION_HEADER: [&str; 11] = [
    "sample",
    "scaffold",
    "region_no",
    "start",
    "end",
    "known_cluster",
    "accession",
    "description",
    "cluster_type",
    "hits",
    "similarity",
];

#[derive(Args, Debug)]
pub struct RegionsCmd {
    /// antiSMASH JSON files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Sample names matching the files (defaults to file names)
    #[arg(short, long, num_args = 1..)]
    pub names: Vec<String>,

    /// Output file [stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Summary of one region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionRow {
    pub sample: String,
    pub scaffold: String,
    pub region_no: usize,
    pub start: String,
    pub end: String,
    pub known_cluster: bool,
    pub accession: String,
    pub description: String,
    pub cluster_type: String,
    pub hits: Option<u64>,
    pub similarity: Option<u64>,
}

impl RegionRow {
    fn fields(&self) -> [String; 11] {
        [
            self.sample.clone(),
            self.scaffold.clone(),
            self.region_no.to_string(),
            self.start.clone(),
            self.end.clone(),
            if self.known_cluster { "1" } else { "0" }.to_string(),
            self.accession.clone(),
            self.description.clone(),
            self.cluster_type.clone(),
            self.hits.map(|h| h.to_string()).unwrap_or_default(),
            self.similarity.map(|s| s.to_string()).unwrap_or_default(),
        ]
    }
}

/// Summarizes every region of every record of one antiSMASH output.
pub fn summarize_regions(sample: &str, output: &AntismashOutput) -> ToolResult<Vec<RegionRow>> {
    let mut rows = Vec::new();
    for record in &output.records {
        let blast = record.clusterblast()?;
        for region in record.regions() {
            let region_no = region.region_number()?;
            let (start, end) = region.bounds()?;
            let mut row = RegionRow {
                sample: sample.to_string(),
                scaffold: record.id.clone(),
                region_no,
                start,
                end,
                known_cluster: false,
                accession: String::new(),
                description: String::new(),
                cluster_type: region.qualifier("product").join(";"),
                hits: None,
                similarity: None,
            };

            let known = blast
                .known(region_no)
                .filter(|r| r.total_hits > 0)
                .and_then(|r| r.best());
            if let Some((reference, score)) = known {
                row.known_cluster = true;
                row.accession = reference.accession.clone();
                row.description = reference.description.clone();
                row.hits = Some(score.hits);
                row.similarity = Some(score.similarity(reference));
            } else if let Some((reference, score)) =
                blast.general(region_no).and_then(|r| r.best())
            {
                row.accession = format!("{}_{}", reference.accession, reference.cluster_label);
                row.description = reference.description.clone();
                row.hits = Some(score.hits);
                row.similarity = Some(score.similarity(reference));
            }
            rows.push(row);
        }
    }
    Ok(rows)
}

impl RegionsCmd {
    pub fn run(&self) -> Result<()> {
        if !self.names.is_empty() && self.names.len() != self.files.len() {
            return Err(ToolError::InvalidArgument(format!(
                "{} names given for {} files",
                self.names.len(),
                self.files.len()
            ))
            .into());
        }

        let mut writer = tsv_writer(create_output(self.output.as_deref())?);
        writer.write_record(REGION_HEADER)?;
        for (i, file) in self.files.iter().enumerate() {
            let sample = self
                .names
                .get(i)
                .cloned()
                .unwrap_or_else(|| basename(file));
            let output = AntismashOutput::read(file)
                .with_context(|| format!("Failed to read antiSMASH output {}", file.display()))?;
            let rows = summarize_regions(&sample, &output)
                .with_context(|| format!("Failed to summarize {}", file.display()))?;
            info!("{}: {} regions", sample, rows.len());
            for row in &rows {
                writer.write_record(row.fields())?;
            }
        }
        writer.flush()?;
        Ok(())
    }
}
