//! codeml `mlc` results and `branch-site-lrt`.

use crate::error::{ToolError, ToolResult};
use crate::io::{create_output, tsv_writer};
use crate::stats::{benjamini_hochberg, likelihood_ratio_test};
use anyhow::{Context, Result};
use clap::Args;
use indexmap::IndexMap;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Values read from a codeml `mlc` report.
#[derive(Debug, Clone, PartialEq)]
pub struct Mlc {
    /// Log-likelihood of the last model in the report.
    pub lnl: f64,
    /// Site-class proportions (`0`, `1`, `2a`, `2b`) of the last
    /// "site class" table, empty for models without one.
    pub site_classes: IndexMap<String, f64>,
}

fn parse_float(token: &str, line: u64) -> ToolResult<f64> {
    token
        .parse::<f64>()
        .map_err(|_| ToolError::malformed("mlc", line, format!("invalid number '{}'", token)))
}

impl Mlc {
    /// Parses an `mlc` report.
    ///
    /// The log-likelihood line looks like
    /// `lnL(ntime: 11  np: 16):  -2934.123456   +0.000000`; the site-class
    /// table is a `site class` header followed by a `proportion` row.
    pub fn parse(text: &str) -> ToolResult<Self> {
        let mut lnl = None;
        let mut site_classes = IndexMap::new();
        let mut classes: Option<Vec<String>> = None;

        for (i, line) in text.lines().enumerate() {
            let line_no = i as u64 + 1;
            let trimmed = line.trim_start();
            if trimmed.starts_with("lnL(") {
                let value = trimmed
                    .split_once("):")
                    .and_then(|(_, rest)| rest.split_whitespace().next())
                    .ok_or_else(|| ToolError::malformed("mlc", line_no, "lnL line without a value"))?;
                lnl = Some(parse_float(value, line_no)?);
            } else if let Some(rest) = trimmed.strip_prefix("site class") {
                classes = Some(rest.split_whitespace().map(str::to_string).collect());
            } else if let Some(rest) = trimmed.strip_prefix("proportion") {
                if let Some(names) = classes.take() {
                    site_classes.clear();
                    for (name, value) in names.into_iter().zip(rest.split_whitespace()) {
                        site_classes.insert(name, parse_float(value, line_no)?);
                    }
                }
            }
        }

        let lnl = lnl.ok_or_else(|| ToolError::missing("lnL", "mlc report"))?;
        Ok(Mlc { lnl, site_classes })
    }

    pub fn read(path: &Path) -> ToolResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            ToolError::Io(std::io::Error::new(
                e.kind(),
                format!("cannot read {}: {}", path.display(), e),
            ))
        })?;
        Mlc::parse(&text)
    }

    pub fn site_class(&self, name: &str) -> ToolResult<f64> {
        self.site_classes
            .get(name)
            .copied()
            .ok_or_else(|| ToolError::missing(format!("site class {}", name), "mlc report"))
    }
}

/// One branch-site comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchSiteRun {
    pub run: String,
    pub lnl0: f64,
    pub lnl1: f64,
    pub p_value: f64,
    pub site_class_2a: f64,
    pub site_class_2b: f64,
}

impl BranchSiteRun {
    /// Compares the null and alternative reports of one run (1 df).
    pub fn compare(run: &str, null: &Path, alt: &Path) -> ToolResult<Self> {
        let null = Mlc::read(null)?;
        let alt = Mlc::read(alt)?;
        Ok(BranchSiteRun {
            run: run.to_string(),
            lnl0: null.lnl,
            lnl1: alt.lnl,
            p_value: likelihood_ratio_test(null.lnl, alt.lnl, 1.0)?,
            site_class_2a: alt.site_class("2a")?,
            site_class_2b: alt.site_class("2b")?,
        })
    }
}

/// `*.cds` run directories of `dir`, sorted by name.
pub fn run_directories(dir: &Path) -> ToolResult<Vec<String>> {
    let mut runs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".cds") && entry.path().is_dir() {
            runs.push(name);
        }
    }
    runs.sort();
    Ok(runs)
}

#[derive(Args, Debug)]
pub struct BranchSiteLrtCmd {
    /// Directory of null-model runs (`<name>.cds/mlc`)
    pub null_dir: PathBuf,

    /// Directory of alternative-model runs with the same names
    pub alt_dir: PathBuf,

    /// Output file [stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl BranchSiteLrtCmd {
    pub fn run(&self) -> Result<()> {
        let names = run_directories(&self.null_dir)
            .with_context(|| format!("Failed to list {}", self.null_dir.display()))?;
        debug!("{} runs in {}", names.len(), self.null_dir.display());

        let mut runs = Vec::new();
        for name in &names {
            let null = self.null_dir.join(name).join("mlc");
            let alt = self.alt_dir.join(name).join("mlc");
            match BranchSiteRun::compare(name, &null, &alt) {
                Ok(run) => runs.push(run),
                Err(e) => warn!("Error parsing {}: {}", name, e),
            }
        }
        let p_values: Vec<f64> = runs.iter().map(|r| r.p_value).collect();
        let fdr = benjamini_hochberg(&p_values);

        let mut writer = tsv_writer(create_output(self.output.as_deref())?);
        writer.write_record([
            "run",
            "lnL0",
            "lnL1",
            "p_value",
            "fdr",
            "site_class_2a",
            "site_class_2b",
        ])?;
        for (run, fdr) in runs.iter().zip(&fdr) {
            writer.write_record([
                run.run.clone(),
                run.lnl0.to_string(),
                run.lnl1.to_string(),
                run.p_value.to_string(),
                fdr.to_string(),
                run.site_class_2a.to_string(),
                run.site_class_2b.to_string(),
            ])?;
        }
        writer.flush()?;
        info!("Compared {} of {} runs", runs.len(), names.len());
        Ok(())
    }
}
