//! Minimal VCF body reader: the columns the variant tools need.

use super::tsv_reader;
use crate::error::{ToolError, ToolResult};
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct VcfRecord {
    pub chrom: String,
    pub pos: u64,
    pub reference: String,
    pub alternate: String,
    pub info: String,
}

impl VcfRecord {
    /// True when the INFO column carries the `INDEL` flag (bcftools style).
    pub fn is_indel(&self) -> bool {
        self.info.split(';').any(|key| key == "INDEL")
    }

    /// Variant key used for set comparisons: `chrom_pos_ref_alt`.
    pub fn key(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.chrom, self.pos, self.reference, self.alternate
        )
    }
}

/// Reads every data line of a VCF file.
pub fn read_vcf(path: &Path) -> ToolResult<Vec<VcfRecord>> {
    let mut reader = tsv_reader(path, false, true)?;
    let mut variants = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());
        if record.len() < 8 {
            return Err(ToolError::malformed(
                "VCF",
                line,
                format!("expected at least 8 columns, found {}", record.len()),
            ));
        }
        let pos = record[1]
            .parse::<u64>()
            .map_err(|_| ToolError::malformed("VCF", line, format!("invalid POS '{}'", &record[1])))?;
        variants.push(VcfRecord {
            chrom: record[0].to_string(),
            pos,
            reference: record[3].to_string(),
            alternate: record[4].to_string(),
            info: record[7].to_string(),
        });
    }
    Ok(variants)
}
