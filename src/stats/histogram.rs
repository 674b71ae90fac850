//! Fixed-width histograms printed as two tab-separated columns.

use crate::error::{ToolError, ToolResult};
use std::io::Write;

/// Counts per bin of width `w` over `[0, u)`, where `u` is the first
/// multiple of `w` strictly above the largest value.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub bin_width: u64,
    pub counts: Vec<u64>,
}

impl Histogram {
    /// Builds a histogram. Negative values are ignored.
    ///
    /// # Arguments
    ///
    /// * `values` - Observations (lengths, read counts).
    /// * `bin_width` - Width of every bin, must be positive.
    ///
    /// # Returns
    ///
    /// * `ToolResult<Histogram>` - The histogram, or an error for empty input.
    pub fn from_values(values: &[i64], bin_width: u64) -> ToolResult<Self> {
        if bin_width == 0 {
            return Err(ToolError::InvalidArgument(
                "bin width must be positive".to_string(),
            ));
        }
        let max = values.iter().copied().max().ok_or_else(|| {
            ToolError::InvalidArgument("cannot build a histogram of no values".to_string())
        })?;
        let max = max.max(0) as u64;
        let upper = max + (bin_width - max % bin_width);
        let mut counts = vec![0u64; (upper / bin_width) as usize];
        for &value in values.iter().filter(|&&v| v >= 0) {
            counts[(value as u64 / bin_width) as usize] += 1;
        }
        Ok(Histogram { bin_width, counts })
    }

    /// `(upper bin edge, count)` rows.
    pub fn rows(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .map(move |(i, &count)| ((i as u64 + 1) * self.bin_width, count))
    }

    /// Writes `edge<TAB>count` lines.
    pub fn write_tsv(&self, out: &mut dyn Write) -> ToolResult<()> {
        for (edge, count) in self.rows() {
            writeln!(out, "{}\t{}", edge, count)?;
        }
        Ok(())
    }
}
