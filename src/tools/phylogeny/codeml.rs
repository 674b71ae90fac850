//! `codeml`: runs PAML codeml over many alignments in parallel.

use crate::error::{ToolError, ToolResult};
use crate::io::read_list;
use crate::utils::{find_executable, ParallelConfig, ParallelExecutor};
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use log::{debug, error, info};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Supported codeml models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CodemlModel {
    /// Site models M0, M1a and M2a
    #[value(name = "site")]
    Site,
    /// Branch-site model A with omega fixed to 1
    #[value(name = "branch_site_null")]
    BranchSiteNull,
    /// Branch-site model A
    #[value(name = "branch_site_M2a")]
    BranchSiteM2a,
}

impl CodemlModel {
    fn options(self) -> Vec<(&'static str, &'static str)> {
        match self {
            CodemlModel::Site => vec![("model", "0"), ("NSsites", "0 1 2")],
            CodemlModel::BranchSiteNull => vec![
                ("model", "2"),
                ("NSsites", "2"),
                ("fix_omega", "1"),
                ("omega", "1"),
            ],
            CodemlModel::BranchSiteM2a => vec![("model", "2"), ("NSsites", "2")],
        }
    }
}

impl fmt::Display for CodemlModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CodemlModel::Site => "site",
            CodemlModel::BranchSiteNull => "branch_site_null",
            CodemlModel::BranchSiteM2a => "branch_site_M2a",
        };
        write!(f, "{}", name)
    }
}

const SHARED_OPTIONS: &[(&str, &str)] = &[
    ("noisy", "9"),
    ("verbose", "0"),
    ("runmode", "0"),
    ("seqtype", "1"),
    ("CodonFreq", "2"),
    ("clock", "0"),
    ("aaDist", "0"),
    ("aaRatefile", "dat/jones.dat"),
    ("icode", "0"),
    ("fix_kappa", "0"),
    ("kappa", "2"),
    ("fix_alpha", "1"),
    ("alpha", "0.0"),
    ("Malpha", "0"),
    ("ncatG", "8"),
    ("getSE", "0"),
    ("RateAncestor", "1"),
    ("Small_Diff", ".5e-6"),
    ("cleandata", "1"),
];

/// One codeml run: an alignment, its working directory and control file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodemlJob {
    pub alignment: PathBuf,
    pub workdir: PathBuf,
}

impl CodemlJob {
    /// The working directory is named after the alignment with its
    /// `.paml` extension removed.
    pub fn new(alignment: &Path) -> ToolResult<Self> {
        let name = alignment
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = name
            .strip_suffix(".paml")
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| {
                ToolError::InvalidArgument(format!(
                    "alignment {} does not end with .paml",
                    alignment.display()
                ))
            })?;
        Ok(CodemlJob {
            alignment: alignment.to_path_buf(),
            workdir: PathBuf::from(stem),
        })
    }

    /// Renders `codeml.ctl`. Paths must be usable from inside the working
    /// directory.
    pub fn control_file(seqfile: &Path, treefile: &Path, outfile: &str, model: CodemlModel) -> String {
        let mut ctl = format!(
            "seqfile = {}\ntreefile = {}\noutfile = {}\n",
            seqfile.display(),
            treefile.display(),
            outfile
        );
        for (option, value) in SHARED_OPTIONS.iter().chain(model.options().iter()) {
            ctl.push_str(&format!("{} = {}\n", option, value));
        }
        ctl
    }

    /// Writes the control file and runs codeml inside the working directory.
    /// Codeml's console output goes to `codeml.log` next to the results.
    pub fn run(&self, codeml: &Path, tree: &Path, outfile: &str, model: CodemlModel) -> ToolResult<()> {
        let alignment = fs::canonicalize(&self.alignment).map_err(|e| {
            ToolError::Io(std::io::Error::new(
                e.kind(),
                format!("cannot open {}: {}", self.alignment.display(), e),
            ))
        })?;
        fs::create_dir_all(&self.workdir)?;
        fs::write(
            self.workdir.join("codeml.ctl"),
            Self::control_file(&alignment, tree, outfile, model),
        )?;

        debug!("Running codeml in {}", self.workdir.display());
        let output = Command::new(codeml)
            .arg("codeml.ctl")
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .output()?;
        fs::write(self.workdir.join("codeml.log"), &output.stdout)?;

        if !output.status.success() {
            return Err(ToolError::CommandFailed {
                program: format!("{} on {}", codeml.display(), self.alignment.display()),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct CodemlCmd {
    /// Newline-separated list of `<name>.paml` alignments
    pub alignments: PathBuf,

    /// Tree file
    pub tree: PathBuf,

    /// Codeml model
    #[arg(value_enum)]
    pub model: CodemlModel,

    /// Name of the results file inside each run directory
    #[arg(short, long, default_value = "mlc")]
    pub output: String,
}

impl CodemlCmd {
    pub fn run(&self, threads: usize) -> Result<()> {
        let codeml = find_executable("codeml").context("Cannot locate codeml")?;
        info!("Found codeml executable: {}", codeml.display());

        let tree = fs::canonicalize(&self.tree)
            .with_context(|| format!("Failed to open tree {}", self.tree.display()))?;
        let jobs = read_list(&self.alignments)
            .with_context(|| format!("Failed to read {}", self.alignments.display()))?
            .iter()
            .map(|path| CodemlJob::new(Path::new(path)))
            .collect::<ToolResult<Vec<_>>>()?;

        let executor = ParallelExecutor::new(Some(ParallelConfig::capped(threads)))?;
        info!(
            "Running {} {} codeml jobs on {} workers",
            jobs.len(),
            self.model,
            executor.threads()
        );
        let results = executor.execute(&jobs, |job| job.run(&codeml, &tree, &self.output, self.model));

        let failed: Vec<&CodemlJob> = jobs
            .iter()
            .zip(&results)
            .filter(|(_, result)| result.is_err())
            .map(|(job, _)| job)
            .collect();
        for job in &failed {
            error!("codeml run failed: {}", job.alignment.display());
        }
        if !failed.is_empty() {
            anyhow::bail!("{} of {} codeml runs failed", failed.len(), jobs.len());
        }
        info!("Finished {} codeml runs", jobs.len());
        Ok(())
    }
}
