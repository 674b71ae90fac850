//! Per-contig interval lookups.
//!
//! Intervals are closed (`[start, end]`) and sorted by start. A running
//! maximum of end coordinates lets a point query stop scanning as soon as no
//! earlier interval can reach the position.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval<T> {
    pub start: u64,
    pub end: u64,
    pub label: T,
}

/// Sorted intervals of a single contig.
#[derive(Debug, Clone)]
struct SortedIntervals<T> {
    intervals: Vec<Interval<T>>,
    // max_end[i] = max(end) over intervals[..=i]
    max_end: Vec<u64>,
}

impl<T> SortedIntervals<T> {
    fn build(mut intervals: Vec<Interval<T>>) -> Self {
        intervals.sort_by_key(|iv| (iv.start, iv.end));
        let mut max_end = Vec::with_capacity(intervals.len());
        let mut running = 0;
        for iv in &intervals {
            running = running.max(iv.end);
            max_end.push(running);
        }
        SortedIntervals { intervals, max_end }
    }

    fn covering(&self, pos: u64) -> impl Iterator<Item = &Interval<T>> {
        // Intervals starting after pos cannot cover it.
        let upper = self.intervals.partition_point(|iv| iv.start <= pos);
        // Everything before `lower` ends before pos.
        let lower = self.max_end[..upper].partition_point(|&end| end < pos);
        self.intervals[lower..upper]
            .iter()
            .filter(move |iv| iv.end >= pos)
    }
}

/// Interval index keyed by contig name.
#[derive(Debug, Clone)]
pub struct IntervalIndex<T> {
    contigs: HashMap<String, SortedIntervals<T>>,
}

impl<T> IntervalIndex<T> {
    /// Builds the index from `(contig, interval)` pairs in any order.
    pub fn new(entries: impl IntoIterator<Item = (String, Interval<T>)>) -> Self {
        let mut grouped: HashMap<String, Vec<Interval<T>>> = HashMap::new();
        for (contig, interval) in entries {
            grouped.entry(contig).or_default().push(interval);
        }
        IntervalIndex {
            contigs: grouped
                .into_iter()
                .map(|(contig, ivs)| (contig, SortedIntervals::build(ivs)))
                .collect(),
        }
    }

    /// Labels of every interval on `contig` that contains `pos`.
    pub fn covering<'a>(&'a self, contig: &str, pos: u64) -> Vec<&'a T> {
        self.contigs
            .get(contig)
            .map(|ivs| ivs.covering(pos).map(|iv| &iv.label).collect())
            .unwrap_or_default()
    }

}

/// Merges overlapping or touching closed intervals. Input need not be sorted.
pub fn merge_ranges(mut ranges: Vec<(u64, u64)>) -> Vec<(u64, u64)> {
    ranges.sort_unstable();
    let mut merged: Vec<(u64, u64)> = Vec::with_capacity(ranges.len());
    for (start, end) in ranges {
        match merged.last_mut() {
            Some(last) if start <= last.1.saturating_add(1) => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(start: u64, end: u64, label: &'static str) -> Interval<&'static str> {
        Interval { start, end, label }
    }

    #[test]
    fn test_covering_with_nested_intervals() {
        let index = IntervalIndex::new(vec![
            ("c1".to_string(), iv(1, 1000, "long")),
            ("c1".to_string(), iv(10, 20, "short")),
            ("c1".to_string(), iv(500, 600, "mid")),
            ("c2".to_string(), iv(5, 8, "other")),
        ]);
        assert_eq!(index.covering("c1", 15), vec![&"long", &"short"]);
        assert_eq!(index.covering("c1", 700), vec![&"long"]);
        assert_eq!(index.covering("c1", 1001), Vec::<&&str>::new());
        assert_eq!(index.covering("c2", 8), vec![&"other"]);
        assert!(index.covering("c2", 9).is_empty());
        assert!(index.covering("c3", 1).is_empty());
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let index = IntervalIndex::new(vec![("c".to_string(), iv(10, 20, "a"))]);
        assert_eq!(index.covering("c", 10).len(), 1);
        assert_eq!(index.covering("c", 20).len(), 1);
        assert!(index.covering("c", 9).is_empty());
    }

    #[test]
    fn test_merge_ranges() {
        assert_eq!(
            merge_ranges(vec![(50, 60), (1, 10), (5, 20), (21, 30)]),
            vec![(1, 30), (50, 60)]
        );
        assert!(merge_ranges(Vec::new()).is_empty());
    }
}
