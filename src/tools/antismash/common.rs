//! `antismash-common`: clusters shared by every sample, and clusters
//! specific to sample groups.

use crate::error::ToolError;
use crate::groups::{load_groups, SampleGroups};
use crate::io::{create_output, tsv_reader, tsv_writer};
use anyhow::{Context, Result};
use clap::Args;
use log::{info, warn};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// `(accession, description, knownclusterblast flag)`
pub type Cluster = (String, String, String);

pub type SampleClusters = HashMap<String, BTreeSet<Cluster>>;

#[derive(Args, Debug)]
pub struct CommonCmd {
    /// Region summary written by antismash-regions
    pub summary: PathBuf,

    /// Group file(s) with `group<TAB>sample` lines
    #[arg(short, long)]
    pub groups: Vec<PathBuf>,

    /// Output file prefix
    #[arg(short, long)]
    pub prefix: Option<String>,
}

/// Loads the clusters found in each sample. Rows without an accession are
/// skipped; spaces in descriptions become underscores.
pub fn load_sample_clusters(path: &Path) -> Result<SampleClusters> {
    let mut reader = tsv_reader(path, true, false)?;
    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| ToolError::missing(name, format!("header of {}", path.display())))
    };
    let (known_col, acc_col, desc_col) = (
        column("known_cluster")?,
        column("accession")?,
        column("description")?,
    );

    let mut clusters: SampleClusters = HashMap::new();
    for result in reader.records() {
        let record = result?;
        let (Some(known), Some(accession), Some(description)) =
            (record.get(known_col), record.get(acc_col), record.get(desc_col))
        else {
            continue;
        };
        let accession = accession.trim();
        if accession.is_empty() {
            continue;
        }
        clusters
            .entry(record[0].trim().to_string())
            .or_default()
            .insert((
                accession.to_string(),
                description.trim().replace(' ', "_"),
                known.trim().to_string(),
            ));
    }
    Ok(clusters)
}

/// Clusters present in every sample.
pub fn common_clusters(clusters: &SampleClusters) -> BTreeSet<Cluster> {
    let mut sets = clusters.values();
    let first = match sets.next() {
        Some(first) => first.clone(),
        None => return BTreeSet::new(),
    };
    sets.fold(first, |acc, set| acc.intersection(set).cloned().collect())
}

/// Clusters found in every sample of `group` and in no sample of any other
/// group. A group sample without clusters leaves nothing specific.
pub fn group_specific_clusters(
    clusters: &SampleClusters,
    groups: &SampleGroups,
    group: &str,
) -> BTreeSet<Cluster> {
    let elsewhere: BTreeSet<&Cluster> = groups
        .samples_outside(group)
        .filter_map(|sample| clusters.get(sample))
        .flatten()
        .collect();

    let mut specific: Option<BTreeSet<Cluster>> = None;
    for sample in groups.samples(group) {
        let own: BTreeSet<Cluster> = clusters
            .get(sample)
            .map(|set| {
                set.iter()
                    .filter(|c| !elsewhere.contains(c))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        specific = Some(match specific {
            None => own,
            Some(acc) => acc.intersection(&own).cloned().collect(),
        });
    }
    specific.unwrap_or_default()
}

impl CommonCmd {
    fn prefix(&self) -> String {
        self.prefix
            .as_ref()
            .map(|p| format!("{}.", p))
            .unwrap_or_default()
    }

    pub fn run(&self) -> Result<()> {
        let clusters = load_sample_clusters(&self.summary)
            .with_context(|| format!("Failed to read {}", self.summary.display()))?;
        info!("Loaded clusters for {} samples", clusters.len());
        let prefix = self.prefix();

        let common_path = PathBuf::from(format!("{}common_clusters.tsv", prefix));
        let mut writer = tsv_writer(create_output(Some(&common_path))?);
        writer.write_record(["accession", "description", "knownclusterblast"])?;
        for (acc, desc, known) in common_clusters(&clusters) {
            writer.write_record([acc, desc, known])?;
        }
        writer.flush()?;

        for group_file in &self.groups {
            let groups = load_groups(group_file)
                .with_context(|| format!("Failed to read groups from {}", group_file.display()))?;
            for sample in groups.groups.values().flatten() {
                if !clusters.contains_key(sample) {
                    warn!("Sample {} has no clusters in the summary", sample);
                }
            }
            let stem = group_file
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "group".to_string());
            let path = PathBuf::from(format!("{}{}_specific_clusters.tsv", prefix, stem));
            let mut writer = tsv_writer(create_output(Some(&path))?);
            writer.write_record(["group", "accession", "description", "knownclusterblast"])?;
            for group in groups.group_names() {
                for (acc, desc, known) in group_specific_clusters(&clusters, &groups, group) {
                    writer.write_record([group.to_string(), acc, desc, known])?;
                }
            }
            writer.flush()?;
            info!("Wrote {}", path.display());
        }
        Ok(())
    }
}
