//! Variant calling follow-ups: genomic context, overlaps between call
//! sets and snpEff/SnpSift summaries.

pub mod effects;
pub mod genes;
pub mod regions;

pub use effects::CountEffectsCmd;
pub use genes::GeneInfoCmd;
pub use regions::GenomicRegionsCmd;

use crate::error::ToolResult;
use crate::io::vcf::read_vcf;
use crate::io::{create_output, tsv_writer};
use anyhow::{Context, Result};
use clap::Args;
use indexmap::IndexMap;
use log::info;
use std::path::{Path, PathBuf};

/// Presence of every `chrom_pos_ref_alt` variant in each file, in order of
/// first appearance.
pub fn variant_presence(files: &[&Path]) -> ToolResult<IndexMap<String, Vec<bool>>> {
    let mut presence: IndexMap<String, Vec<bool>> = IndexMap::new();
    for (i, file) in files.iter().enumerate() {
        for variant in read_vcf(file)? {
            presence
                .entry(variant.key())
                .or_insert_with(|| vec![false; files.len()])[i] = true;
        }
    }
    Ok(presence)
}

#[derive(Args, Debug)]
pub struct VariantOverlapsCmd {
    /// VCF files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output file [stdout]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl VariantOverlapsCmd {
    pub fn run(&self) -> Result<()> {
        let files: Vec<&Path> = self.files.iter().map(PathBuf::as_path).collect();
        let presence = variant_presence(&files).context("Failed to read variants")?;

        let mut writer = tsv_writer(create_output(self.output.as_deref())?);
        let mut header = vec!["variant".to_string()];
        header.extend(self.files.iter().map(|f| f.display().to_string()));
        writer.write_record(&header)?;
        for (variant, present) in &presence {
            let mut row = vec![variant.clone()];
            row.extend(present.iter().map(|&p| u8::from(p).to_string()));
            writer.write_record(&row)?;
        }
        writer.flush()?;
        info!("{} distinct variants in {} files", presence.len(), files.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_variant_overlaps() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.vcf");
        let b = dir.path().join("b.vcf");
        fs::write(
            &a,
            "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n\
scaf1\t10\t.\tA\tG\t50\tPASS\tDP=3\n\
scaf1\t20\t.\tC\tT\t50\tPASS\tDP=3\n",
        )
        .unwrap();
        fs::write(
            &b,
            "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n\
scaf1\t20\t.\tC\tT\t50\tPASS\tDP=3\n\
scaf2\t5\t.\tG\tGA\t50\tPASS\tINDEL\n",
        )
        .unwrap();
        let out = dir.path().join("overlaps.tsv");
        VariantOverlapsCmd {
            files: vec![a.clone(), b.clone()],
            output: Some(out.clone()),
        }
        .run()
        .unwrap();

        assert_eq!(
            fs::read_to_string(&out).unwrap(),
            format!(
                "variant\t{}\t{}\nscaf1_10_A_G\t1\t0\nscaf1_20_C_T\t1\t1\nscaf2_5_G_GA\t0\t1\n",
                a.display(),
                b.display()
            )
        );
    }
}
