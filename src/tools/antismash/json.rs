//! Typed view of the antiSMASH JSON output.
//!
//! Only the parts read by the toolbox are modelled: records with their
//! features, and the per-region ClusterBlast results (KnownClusterBlast and
//! the general ClusterBlast). Everything else in the document is ignored.

use crate::error::{ToolError, ToolResult};
use serde::de::IgnoredAny;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

const CLUSTERBLAST_MODULE: &str = "antismash.modules.clusterblast";

#[derive(Debug, Deserialize)]
pub struct AntismashOutput {
    pub records: Vec<Record>,
}

impl AntismashOutput {
    pub fn read(path: &Path) -> ToolResult<Self> {
        let reader = crate::io::open_input(path)?;
        Ok(serde_json::from_reader(reader)?)
    }
}

#[derive(Debug, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default)]
    pub modules: HashMap<String, Value>,
}

impl Record {
    pub fn regions(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter().filter(|f| f.kind == "region")
    }

    /// ClusterBlast results of this record. A record without the module
    /// (or with it switched off) has no results.
    pub fn clusterblast(&self) -> ToolResult<ClusterBlast> {
        match self.modules.get(CLUSTERBLAST_MODULE) {
            None | Some(Value::Null) => Ok(ClusterBlast::default()),
            Some(value) => Ok(ClusterBlast::deserialize(value)?),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    pub location: String,
    #[serde(default)]
    pub qualifiers: HashMap<String, Value>,
}

impl Feature {
    /// Every value of a qualifier as strings.
    pub fn qualifier(&self, key: &str) -> Vec<String> {
        match self.qualifiers.get(key) {
            Some(Value::Array(values)) => values.iter().map(value_to_string).collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(other) => vec![value_to_string(other)],
        }
    }

    pub fn region_number(&self) -> ToolResult<usize> {
        let value = self
            .qualifier("region_number")
            .into_iter()
            .next()
            .ok_or_else(|| ToolError::missing("region_number", "region qualifiers"))?;
        value.parse::<usize>().map_err(|_| {
            ToolError::InvalidArgument(format!("invalid region number '{}'", value))
        })
    }

    /// Start and end from a location string such as `[1000:25000](+)`.
    pub fn bounds(&self) -> ToolResult<(String, String)> {
        let inner = self
            .location
            .split(']')
            .next()
            .unwrap_or("")
            .trim_start_matches('[');
        match inner.split_once(':') {
            Some((start, end)) => Ok((
                start.trim_start_matches('<').to_string(),
                end.trim_start_matches('>').to_string(),
            )),
            None => Err(ToolError::InvalidArgument(format!(
                "unexpected feature location '{}'",
                self.location
            ))),
        }
    }
}

pub(crate) fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ClusterBlast {
    #[serde(default)]
    pub knowncluster: Option<ClusterBlastSection>,
    #[serde(default)]
    pub general: Option<ClusterBlastSection>,
}

impl ClusterBlast {
    /// KnownClusterBlast result of a region (1-based region number).
    pub fn known(&self, region_number: usize) -> Option<&RegionResult> {
        self.knowncluster.as_ref()?.region(region_number)
    }

    /// General ClusterBlast result of a region (1-based region number).
    pub fn general(&self, region_number: usize) -> Option<&RegionResult> {
        self.general.as_ref()?.region(region_number)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ClusterBlastSection {
    #[serde(default)]
    pub results: Vec<RegionResult>,
}

impl ClusterBlastSection {
    fn region(&self, region_number: usize) -> Option<&RegionResult> {
        region_number
            .checked_sub(1)
            .and_then(|i| self.results.get(i))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RegionResult {
    #[serde(default)]
    pub total_hits: u64,
    #[serde(default)]
    pub ranking: Vec<(ReferenceCluster, HitScore)>,
}

impl RegionResult {
    pub fn best(&self) -> Option<&(ReferenceCluster, HitScore)> {
        self.ranking.first()
    }
}

#[derive(Debug, Deserialize)]
pub struct ReferenceCluster {
    pub accession: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cluster_label: String,
    #[serde(default)]
    pub proteins: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct HitScore {
    #[serde(default)]
    pub hits: u64,
    #[serde(default)]
    pub pairings: Vec<Pairing>,
}

impl HitScore {
    /// `floor(hits / reference proteins * 100)`, or 0 without proteins.
    pub fn similarity(&self, reference: &ReferenceCluster) -> u64 {
        if reference.proteins.is_empty() {
            return 0;
        }
        self.hits * 100 / reference.proteins.len() as u64
    }
}

/// A query/subject gene pairing, stored as `[query, index, subject]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "(Value, IgnoredAny, Subject)")]
pub struct Pairing {
    pub query: Value,
    pub subject: Subject,
}

impl From<(Value, IgnoredAny, Subject)> for Pairing {
    fn from((query, _, subject): (Value, IgnoredAny, Subject)) -> Self {
        Pairing { query, subject }
    }
}

impl Pairing {
    /// Name of the query gene in the antiSMASH region.
    pub fn query_name(&self) -> String {
        match &self.query {
            Value::Object(map) => map
                .get("id")
                .or_else(|| map.get("name"))
                .map(value_to_string)
                .unwrap_or_else(|| self.query.to_string()),
            other => value_to_string(other),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Subject {
    pub locus_tag: String,
    #[serde(default)]
    pub perc_coverage: Value,
    #[serde(default)]
    pub perc_ident: Value,
}
