//! Sequencing read tools.

pub mod barcodes;
pub mod sequences;

pub use barcodes::{BxHistCmd, FilterBxCmd};
pub use sequences::{InterleaveCmd, ReadLengthsCmd, SeqCovCmd};

use crate::error::{ToolError, ToolResult};

/// Parses a size given as an integer or in scientific notation (`3e9`).
pub fn parse_genome_size(size: &str) -> ToolResult<u64> {
    let value: f64 = size.trim().parse().map_err(|_| {
        ToolError::InvalidArgument(format!(
            "size '{}' must be an integer or in scientific notation (e.g. 3e9)",
            size
        ))
    })?;
    if !value.is_finite() || value < 1.0 {
        return Err(ToolError::InvalidArgument(format!(
            "size '{}' must be at least 1",
            size
        )));
    }
    Ok(value as u64)
}
