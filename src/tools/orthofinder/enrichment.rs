//! `pfam-enrichment`: hypergeometric over-representation of Pfam domains in
//! a selection of genes against the whole annotation.

use crate::error::ToolResult;
use crate::io::{create_output, read_list, tsv_writer};
use crate::stats::{adjust_pvalues, hypergeometric_upper_tail, Correction};
use anyhow::{Context, Result};
use clap::Args;
use indexmap::IndexMap;
use log::info;
use std::cmp::Ordering;
use std::path::PathBuf;

/// Occurrences of each item, in first-seen order.
pub fn count_occurrences<I, S>(items: I) -> IndexMap<String, u64>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut counts = IndexMap::new();
    for item in items {
        *counts.entry(item.into()).or_insert(0) += 1;
    }
    counts
}

/// Test result for one domain.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainEnrichment {
    pub domain: String,
    pub all: u64,
    pub selected: u64,
    pub p_value: f64,
    pub adjusted: f64,
}

/// Tests every domain seen in either list, sorted by adjusted p-value.
///
/// # Arguments
///
/// * `all` - Domain occurrences in the whole annotation.
/// * `selection` - Domain occurrences in the selection.
/// * `method` - Multiple-testing correction.
pub fn pfam_enrichment(
    all: &IndexMap<String, u64>,
    selection: &IndexMap<String, u64>,
    method: Correction,
) -> ToolResult<Vec<DomainEnrichment>> {
    let population: u64 = all.values().sum();
    let draws: u64 = selection.values().sum();

    let mut domains: Vec<&String> = all.keys().collect();
    domains.extend(selection.keys().filter(|d| !all.contains_key(*d)));

    let mut results = Vec::with_capacity(domains.len());
    for domain in domains {
        let successes = all.get(domain).copied().unwrap_or(0);
        let observed = selection.get(domain).copied().unwrap_or(0);
        results.push(DomainEnrichment {
            domain: domain.clone(),
            all: successes,
            selected: observed,
            p_value: hypergeometric_upper_tail(population, successes, draws, observed)?,
            adjusted: 1.0,
        });
    }

    let p_values: Vec<f64> = results.iter().map(|r| r.p_value).collect();
    for (result, adjusted) in results.iter_mut().zip(adjust_pvalues(&p_values, method)) {
        result.adjusted = adjusted;
    }
    results.sort_by(|a, b| {
        a.adjusted
            .partial_cmp(&b.adjusted)
            .unwrap_or(Ordering::Equal)
    });
    Ok(results)
}

#[derive(Args, Debug)]
pub struct PfamEnrichmentCmd {
    /// Pfam domains of the whole annotation, one occurrence per line
    pub all: PathBuf,

    /// Pfam domains of the selected genes, one occurrence per line
    pub selection: PathBuf,

    /// Column name for the selection counts
    #[arg(short, long, default_value = "selection")]
    pub name: String,

    /// Multiple-testing correction
    #[arg(short, long, value_enum, default_value_t = Correction::Bh)]
    pub method: Correction,

    /// Adjusted p-value cutoff for significance
    #[arg(short, long, default_value_t = 0.05)]
    pub cutoff: f64,

    /// Print every domain, not only the significant ones
    #[arg(short, long)]
    pub print_all: bool,

    /// Output file [stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl PfamEnrichmentCmd {
    pub fn run(&self) -> Result<()> {
        let all = count_occurrences(
            read_list(&self.all).with_context(|| format!("Failed to read {}", self.all.display()))?,
        );
        let selection = count_occurrences(
            read_list(&self.selection)
                .with_context(|| format!("Failed to read {}", self.selection.display()))?,
        );
        let results = pfam_enrichment(&all, &selection, self.method)
            .context("Failed to test domain enrichment")?;

        let mut writer = tsv_writer(create_output(self.output.as_deref())?);
        let method = self.method.to_string();
        writer.write_record([
            "pfam_domain",
            "all",
            self.name.as_str(),
            "p_value",
            method.as_str(),
            "significant",
        ])?;
        let mut significant = 0usize;
        for result in &results {
            let is_significant = result.adjusted <= self.cutoff;
            significant += usize::from(is_significant);
            if !is_significant && !self.print_all {
                continue;
            }
            writer.write_record([
                result.domain.clone(),
                result.all.to_string(),
                result.selected.to_string(),
                result.p_value.to_string(),
                result.adjusted.to_string(),
                is_significant.to_string(),
            ])?;
        }
        writer.flush()?;
        info!(
            "{} of {} domains significant at {} <= {}",
            significant,
            results.len(),
            method,
            self.cutoff
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::fs;
    use tempfile::tempdir;

    fn counts(items: &[&str]) -> IndexMap<String, u64> {
        count_occurrences(items.iter().copied())
    }

    #[test]
    fn test_count_occurrences_in_order() {
        let c = counts(&["PF2", "PF1", "PF2"]);
        assert_eq!(c.into_iter().collect::<Vec<_>>(), vec![
            ("PF2".to_string(), 2),
            ("PF1".to_string(), 1)
        ]);
    }

    #[test]
    fn test_enrichment_matches_reference() {
        // population 10 (PF1 x4, PF2 x6), selection 3 (PF1 x3)
        let all = counts(&["PF1", "PF1", "PF1", "PF1", "PF2", "PF2", "PF2", "PF2", "PF2", "PF2"]);
        let selection = counts(&["PF1", "PF1", "PF1"]);
        let results = pfam_enrichment(&all, &selection, Correction::Bonferroni).unwrap();

        assert_eq!(results[0].domain, "PF1");
        // P(X >= 3) = C(4,3) C(6,0) / C(10,3) = 4 / 120
        assert_relative_eq!(results[0].p_value, 4.0 / 120.0, epsilon = 1e-10);
        assert_relative_eq!(results[0].adjusted, 8.0 / 120.0, epsilon = 1e-10);
        // PF2 not selected at all
        assert_eq!(results[1].domain, "PF2");
        assert_eq!(results[1].p_value, 1.0);
        assert_eq!(results[1].adjusted, 1.0);
    }

    #[test]
    fn test_command_filters_significant_rows() {
        let dir = tempdir().unwrap();
        let all = dir.path().join("all.txt");
        let mut content = "PF00001\n".repeat(5);
        content.push_str(&"PF00002\n".repeat(95));
        fs::write(&all, content).unwrap();
        let selection = dir.path().join("sel.txt");
        fs::write(&selection, "PF00001\n".repeat(5)).unwrap();
        let out = dir.path().join("enriched.tsv");

        PfamEnrichmentCmd {
            all: all.clone(),
            selection: selection.clone(),
            name: "dups".to_string(),
            method: Correction::Bh,
            cutoff: 0.05,
            print_all: false,
            output: Some(out.clone()),
        }
        .run()
        .unwrap();
        let content = fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "pfam_domain\tall\tdups\tp_value\tfdr_bh\tsignificant");
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("PF00001\t5\t5\t"));
        assert!(lines[1].ends_with("\ttrue"));

        PfamEnrichmentCmd {
            all,
            selection,
            name: "dups".to_string(),
            method: Correction::Bh,
            cutoff: 0.05,
            print_all: true,
            output: Some(out.clone()),
        }
        .run()
        .unwrap();
        let content = fs::read_to_string(&out).unwrap();
        assert_eq!(content.lines().last().unwrap(), "PF00002\t95\t0\t1\t1\tfalse");
    }
}
