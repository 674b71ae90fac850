//! Sequence-level helpers shared by the tools.
//!
//! Groups the small pieces of biology every tool family leans on:
//! base composition, k-mer coverage and interval lookups over scaffold
//! coordinates.

pub mod interval;
pub mod kmers;

pub use interval::IntervalIndex;
pub use kmers::KmerCounter;

use crate::error::{ToolError, ToolResult};

/// Fraction of G and C bases over the full sequence length.
///
/// Every character counts towards the length, so `N`s and gaps lower the
/// value.
///
/// # Arguments
///
/// * `seq` - Sequence bytes in any case.
///
/// # Returns
///
/// * `ToolResult<f64>` - GC fraction in `[0, 1]`, or an error for an empty sequence.
pub fn gc_content(seq: &[u8]) -> ToolResult<f64> {
    if seq.is_empty() {
        return Err(ToolError::InvalidArgument(
            "cannot compute GC content of an empty sequence".to_string(),
        ));
    }
    let gc = seq
        .iter()
        .filter(|b| matches!(b.to_ascii_uppercase(), b'G' | b'C'))
        .count();
    Ok(gc as f64 / seq.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gc_content() {
        assert_relative_eq!(gc_content(b"GGCC").unwrap(), 1.0);
        assert_relative_eq!(gc_content(b"ATgc").unwrap(), 0.5);
        assert_relative_eq!(gc_content(b"GCNN").unwrap(), 0.5);
        assert_relative_eq!(gc_content(b"ATAT").unwrap(), 0.0);
    }

    #[test]
    fn test_gc_content_empty_is_error() {
        assert!(gc_content(b"").is_err());
    }
}
