//! K-mer coverage counting.
//!
//! Counts every window of length k across a set of sequences, keeping
//! k-mers in the order they were first seen. K-mers are taken as written
//! (no canonicalization) so that the GC content reported per k-mer matches
//! the sequence it came from.

use crate::bio::gc_content;
use crate::error::{ToolError, ToolResult};
use indexmap::IndexMap;

/// Accumulates k-mer occurrence counts over many sequences.
#[derive(Debug, Clone)]
pub struct KmerCounter {
    k: usize,
    counts: IndexMap<Vec<u8>, u64>,
}

impl KmerCounter {
    /// Creates a counter for k-mers of length `k`. `k` must be positive.
    pub fn new(k: usize) -> ToolResult<Self> {
        if k == 0 {
            return Err(ToolError::InvalidArgument(
                "k-mer length must be positive".to_string(),
            ));
        }
        Ok(KmerCounter {
            k,
            counts: IndexMap::new(),
        })
    }

    /// Counts all `len - k + 1` windows of `seq`. Sequences shorter than k
    /// contribute nothing.
    pub fn add_sequence(&mut self, seq: &[u8]) {
        if seq.len() < self.k {
            return;
        }
        for kmer in seq.windows(self.k) {
            *self.counts.entry(kmer.to_vec()).or_insert(0) += 1;
        }
    }

    /// Number of distinct k-mers seen so far.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Coverage and GC content of each distinct k-mer, in first-seen order.
    ///
    /// # Returns
    ///
    /// * `ToolResult<Vec<(u64, f64)>>` - `(coverage, gc)` pairs.
    pub fn coverage_gc(&self) -> ToolResult<Vec<(u64, f64)>> {
        self.counts
            .iter()
            .map(|(kmer, &count)| Ok((count, gc_content(kmer)?)))
            .collect()
    }
}
