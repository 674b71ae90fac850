//! Statistical helpers.
//!
//! Multiple-testing corrections, the chi-squared likelihood-ratio test used
//! for codeml model comparisons and the hypergeometric over-representation
//! test used for domain enrichment.

pub mod histogram;

pub use histogram::Histogram;

use crate::error::{ToolError, ToolResult};
use clap::ValueEnum;
use statrs::distribution::{ChiSquared, ContinuousCDF, DiscreteCDF, Hypergeometric};
use std::cmp::Ordering;
use std::fmt;

/// Multiple-testing correction method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Correction {
    /// Benjamini-Hochberg false discovery rate.
    Bh,
    Bonferroni,
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Correction::Bh => write!(f, "fdr_bh"),
            Correction::Bonferroni => write!(f, "bonferroni"),
        }
    }
}

/// Adjusts p-values with the chosen method. Output is in input order.
pub fn adjust_pvalues(p_values: &[f64], method: Correction) -> Vec<f64> {
    match method {
        Correction::Bh => benjamini_hochberg(p_values),
        Correction::Bonferroni => bonferroni(p_values),
    }
}

/// Adjusts p-values for multiple testing using Benjamini-Hochberg method.
///
/// # Arguments
/// * `p_values` - Raw p-values in any order.
///
/// # Returns
/// * `Vec<f64>` - Adjusted p-values, capped at 1, in input order.
pub fn benjamini_hochberg(p_values: &[f64]) -> Vec<f64> {
    let m = p_values.len();
    let mut order: Vec<usize> = (0..m).collect();
    order.sort_unstable_by(|&a, &b| {
        p_values[a]
            .partial_cmp(&p_values[b])
            .unwrap_or(Ordering::Equal)
    });

    let mut adjusted = vec![1.0; m];
    let mut last_padj: f64 = 1.0;
    // Walk from the largest p-value down so adjusted values stay monotone.
    for (rank, &index) in order.iter().enumerate().rev() {
        let padj = p_values[index] * m as f64 / (rank + 1) as f64;
        let current = padj.min(last_padj).min(1.0);
        adjusted[index] = current;
        last_padj = current;
    }
    adjusted
}

pub fn bonferroni(p_values: &[f64]) -> Vec<f64> {
    let m = p_values.len() as f64;
    p_values.iter().map(|p| (p * m).min(1.0)).collect()
}

/// P-value of a likelihood-ratio test between nested models.
///
/// The statistic `2 (lnL1 - lnL0)` is clamped at zero, since a negative
/// value only reflects optimizer noise in the alternative model.
pub fn likelihood_ratio_test(lnl0: f64, lnl1: f64, df: f64) -> ToolResult<f64> {
    let dist = ChiSquared::new(df).map_err(|e| ToolError::Statistics(e.to_string()))?;
    let delta = (2.0 * (lnl1 - lnl0)).max(0.0);
    Ok(dist.sf(delta))
}

/// Upper-tail hypergeometric probability `P(X >= observed)`.
///
/// # Arguments
/// * `population` - Total number of items.
/// * `successes` - Items of the tested kind in the population.
/// * `draws` - Size of the selection.
/// * `observed` - Items of the tested kind in the selection.
pub fn hypergeometric_upper_tail(
    population: u64,
    successes: u64,
    draws: u64,
    observed: u64,
) -> ToolResult<f64> {
    if observed == 0 {
        return Ok(1.0);
    }
    let dist = Hypergeometric::new(population, successes, draws).map_err(|e| {
        ToolError::Statistics(format!(
            "invalid hypergeometric parameters (N={}, K={}, n={}): {}",
            population, successes, draws, e
        ))
    })?;
    Ok(dist.sf(observed - 1))
}
