//! Follow-ups to g:Profiler enrichment runs.

use crate::error::{ToolError, ToolResult};
use crate::io::{create_output, read_list, tsv_reader, tsv_writer, STDIO};
use crate::tools::orthofinder::enrichment::count_occurrences;
use crate::tools::orthofinder::func::FunctionTable;
use anyhow::{Context, Result};
use clap::Args;
use indexmap::IndexMap;
use log::info;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// `-log10(p)` of every enriched term.
pub fn term_significance(path: &Path) -> ToolResult<IndexMap<String, f64>> {
    let mut reader = tsv_reader(path, true, false)?;
    let header = reader.headers()?.clone();
    let column = |name: &str| {
        header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ToolError::missing(name, "enrichment header"))
    };
    let (term_col, p_col) = (column("term_id")?, column("p_value")?);

    let mut significance = IndexMap::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());
        let (Some(term), Some(p)) = (record.get(term_col), record.get(p_col)) else {
            return Err(ToolError::malformed("enrichment", line, "missing term_id or p_value"));
        };
        let p: f64 = p
            .trim()
            .parse()
            .map_err(|_| ToolError::malformed("enrichment", line, format!("invalid p-value '{}'", p)))?;
        significance.insert(term.to_string(), -p.log10());
    }
    Ok(significance)
}

/// Sum of the significance of each term. Terms that were not enriched add
/// nothing.
pub fn enrichment_score<'a>(terms: impl IntoIterator<Item = &'a str>, significance: &IndexMap<String, f64>) -> f64 {
    terms
        .into_iter()
        .filter_map(|term| significance.get(term.trim()))
        .sum()
}

#[derive(Args, Debug)]
pub struct ScoreEnrichedCmd {
    /// Functional annotation table with a `go_terms` column
    pub func: PathBuf,

    /// g:Profiler results with `term_id` and `p_value` columns
    pub enrichment: PathBuf,

    /// Output file [stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ScoreEnrichedCmd {
    pub fn run(&self) -> Result<()> {
        let table = FunctionTable::read(&self.func)
            .with_context(|| format!("Failed to read {}", self.func.display()))?;
        let go_column = table.column("go_terms")?;
        let significance = term_significance(&self.enrichment)
            .with_context(|| format!("Failed to read {}", self.enrichment.display()))?;

        let mut scored: Vec<(&Vec<String>, f64)> = table
            .rows
            .values()
            .filter(|fields| !fields[go_column].is_empty())
            .map(|fields| {
                let score = enrichment_score(fields[go_column].split(','), &significance);
                (fields, score)
            })
            .filter(|(_, score)| *score > 0.0)
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        let mut writer = tsv_writer(create_output(self.output.as_deref())?);
        let mut header = table.header.clone();
        header.push("score".to_string());
        writer.write_record(&header)?;
        for (fields, score) in &scored {
            let mut row = (*fields).clone();
            row.push(score.to_string());
            writer.write_record(&row)?;
        }
        writer.flush()?;
        info!("{} of {} genes have enriched terms", scored.len(), table.rows.len());
        Ok(())
    }
}

/// Occurrences sorted by decreasing count; ties keep first-seen order.
pub fn sorted_occurrences(items: Vec<String>) -> Vec<(String, u64)> {
    let mut counts: Vec<(String, u64)> = count_occurrences(items).into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

#[derive(Args, Debug)]
pub struct PfamCountsCmd {
    /// Line-separated Pfam domains [stdin]
    #[arg(default_value = STDIO)]
    pub pfam: PathBuf,

    /// Output file
    #[arg(short, long, default_value = "pfam_counts.tsv")]
    pub output: PathBuf,
}

impl PfamCountsCmd {
    pub fn run(&self) -> Result<()> {
        let domains = read_list(&self.pfam)
            .with_context(|| format!("Failed to read {}", self.pfam.display()))?;
        let counts = sorted_occurrences(domains);

        let mut writer = tsv_writer(create_output(Some(self.output.as_path()))?);
        writer.write_record(["pfam_id", "count"])?;
        for (domain, count) in &counts {
            writer.write_record([domain.as_str(), count.to_string().as_str()])?;
        }
        writer.flush()?;
        info!("{} distinct domains written to {}", counts.len(), self.output.display());
        Ok(())
    }
}
