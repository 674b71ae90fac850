//! Sample group assignments.
//!
//! A group file is a two-column TSV with one `group<TAB>sample` pair per
//! line. Groups keep the order they first appear in, and so do the samples
//! within a group.

use crate::error::{ToolError, ToolResult};
use crate::io::tsv_reader;
use indexmap::IndexMap;
use log::warn;
use std::path::Path;

/// Groups of samples, e.g. clades or strains.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleGroups {
    /// Maps group names to their samples.
    pub groups: IndexMap<String, Vec<String>>,
}

impl SampleGroups {
    pub fn new() -> Self {
        SampleGroups::default()
    }

    /// Adds a sample to a group, ignoring repeated assignments.
    pub fn add_sample(&mut self, group: &str, sample: &str) {
        let samples = self.groups.entry(group.to_string()).or_default();
        if !samples.iter().any(|s| s == sample) {
            samples.push(sample.to_string());
        }
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn samples(&self, group: &str) -> &[String] {
        self.groups.get(group).map_or(&[], Vec::as_slice)
    }

    /// Samples of every group except `group`.
    pub fn samples_outside(&self, group: &str) -> impl Iterator<Item = &str> {
        let group = group.to_string();
        self.groups
            .iter()
            .filter(move |(name, _)| **name != group)
            .flat_map(|(_, samples)| samples.iter().map(String::as_str))
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Loads group assignments from a `group<TAB>sample` file.
///
/// # Arguments
///
/// * `path` - Path to the group file. `#` lines are comments.
///
/// # Returns
///
/// * `ToolResult<SampleGroups>` - The groups, or an error for a row without
///   two columns.
pub fn load_groups(path: &Path) -> ToolResult<SampleGroups> {
    let mut reader = tsv_reader(path, false, true)?;
    let mut groups = SampleGroups::new();

    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());
        if record.len() == 1 && record[0].trim().is_empty() {
            continue;
        }
        if record.len() != 2 {
            return Err(ToolError::malformed(
                "group",
                line,
                format!("expected 'group<TAB>sample', found {} columns", record.len()),
            ));
        }
        let group = record[0].trim();
        let sample = record[1].trim();
        if group.is_empty() || sample.is_empty() {
            warn!("Skipping group row with an empty field at line {}", line);
            continue;
        }
        groups.add_sample(group, sample);
    }

    if groups.is_empty() {
        warn!("No groups defined in {}", path.display());
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn create_group_file(path: &Path, content: &str) {
        let mut file = File::create(path).unwrap();
        write!(file, "{}", content).unwrap();
    }

    #[test]
    fn test_load_groups_ok() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clades.tsv");
        create_group_file(&path, "# clade\tsample\nI\tJB-39\nI\tJB-40\nII\tJB-41\nI\tJB-39\n");

        let groups = load_groups(&path).unwrap();
        assert_eq!(groups.group_names().count(), 2);
        assert_eq!(groups.group_names().collect::<Vec<_>>(), vec!["I", "II"]);
        assert_eq!(groups.samples("I"), &["JB-39".to_string(), "JB-40".to_string()]);
        assert_eq!(groups.samples_outside("I").collect::<Vec<_>>(), vec!["JB-41"]);
        assert!(groups.samples("III").is_empty());
    }

    #[test]
    fn test_load_groups_rejects_wrong_width() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.tsv");
        create_group_file(&path, "I\tJB-39\textra\n");
        assert!(load_groups(&path).is_err());
    }
}
