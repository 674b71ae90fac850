//! `count-effects`: summaries of SnpSift `extractFields` output.
//!
//! Expected columns:
//! `CHROM POS ID REF ALT INDEL ANN[*].EFFECT ANN[*].IMPACT GEN[*].GT`.

use crate::error::{ToolError, ToolResult};
use crate::io::{create_output, tsv_reader, tsv_writer};
use anyhow::{Context, Result};
use clap::Args;
use indexmap::{IndexMap, IndexSet};
use log::info;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const INDEL_COLUMN: usize = 5;
const EFFECT_COLUMN: usize = 6;
const GENOTYPE_COLUMN: usize = 8;

/// Distinct effects of one variant. Annotations are separated by `,` and
/// combined effects within one annotation by `&`.
pub fn split_effects(field: &str) -> IndexSet<&str> {
    field
        .split(',')
        .flat_map(|effect| effect.split('&'))
        .map(str::trim)
        .filter(|effect| !effect.is_empty())
        .collect()
}

/// Effect counts of one extractFields file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectSummary {
    /// `SNP`/`INDEL` → effect → count.
    pub by_type: IndexMap<&'static str, IndexMap<String, u64>>,
    /// Genotype → effect → count.
    pub by_genotype: IndexMap<String, IndexMap<String, u64>>,
    /// Variants per genotype and per type, sorted by key.
    pub totals: BTreeMap<String, u64>,
}

impl EffectSummary {
    pub fn read(path: &Path) -> ToolResult<Self> {
        let mut summary = EffectSummary::default();
        summary.by_type.insert("SNP", IndexMap::new());
        summary.by_type.insert("INDEL", IndexMap::new());

        let mut reader = tsv_reader(path, true, false)?;
        for result in reader.records() {
            let record = result?;
            let line = record.position().map_or(0, |p| p.line());
            if record.len() <= GENOTYPE_COLUMN {
                return Err(ToolError::malformed(
                    "extractFields",
                    line,
                    format!("expected {} columns, found {}", GENOTYPE_COLUMN + 1, record.len()),
                ));
            }
            let var_type = if &record[INDEL_COLUMN] == "true" {
                "INDEL"
            } else {
                "SNP"
            };
            let genotype = record[GENOTYPE_COLUMN].to_string();

            let type_counts = summary.by_type.entry(var_type).or_default();
            let genotype_counts = summary.by_genotype.entry(genotype.clone()).or_default();
            for effect in split_effects(&record[EFFECT_COLUMN]) {
                *type_counts.entry(effect.to_string()).or_insert(0) += 1;
                *genotype_counts.entry(effect.to_string()).or_insert(0) += 1;
            }
            *summary.totals.entry(genotype).or_insert(0) += 1;
            *summary.totals.entry(var_type.to_string()).or_insert(0) += 1;
        }
        Ok(summary)
    }
}

#[derive(Args, Debug)]
pub struct CountEffectsCmd {
    /// SnpSift extractFields TSV file(s)
    #[arg(required = true)]
    pub tsv: Vec<PathBuf>,

    /// Output file prefix
    #[arg(short = 'p', long, default_value = "summary")]
    pub prefix: String,
}

impl CountEffectsCmd {
    pub fn run(&self) -> Result<()> {
        let path = |kind: &str| PathBuf::from(format!("{}.{}.summary.tsv", self.prefix, kind));
        let mut types = tsv_writer(create_output(Some(path("types").as_path()))?);
        let mut genotypes = tsv_writer(create_output(Some(path("genotypes").as_path()))?);
        let mut totals = tsv_writer(create_output(Some(path("total_counts").as_path()))?);
        types.write_record(["var_type", "var_effect", "count", "assembly"])?;
        genotypes.write_record(["var_gt", "var_effect", "count", "assembly"])?;
        totals.write_record(["var", "count", "assembly"])?;

        for file in &self.tsv {
            let summary = EffectSummary::read(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let assembly = file.display().to_string();
            for (var_type, effects) in &summary.by_type {
                for (effect, count) in effects {
                    types.write_record([
                        *var_type,
                        effect.as_str(),
                        count.to_string().as_str(),
                        assembly.as_str(),
                    ])?;
                }
            }
            for (genotype, effects) in &summary.by_genotype {
                for (effect, count) in effects {
                    genotypes.write_record([
                        genotype.as_str(),
                        effect.as_str(),
                        count.to_string().as_str(),
                        assembly.as_str(),
                    ])?;
                }
            }
            for (key, count) in &summary.totals {
                totals.write_record([key.as_str(), count.to_string().as_str(), assembly.as_str()])?;
            }
        }
        for writer in [&mut types, &mut genotypes, &mut totals] {
            writer.flush()?;
        }
        info!("Summarized {} files into {}.*.summary.tsv", self.tsv.len(), self.prefix);
        Ok(())
    }
}
