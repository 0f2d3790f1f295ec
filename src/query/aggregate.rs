//! Accumulators and the partial/global aggregate they live in
//!
//! Every combine operation here is plain addition, so merging is associative
//! and commutative for counts. Float sums are only bit-identical across merge
//! orders when the addends are exactly representable; the scheduler folds
//! partials in chunk order so real runs stay reproducible regardless.

use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Grouping key of one accumulator
///
/// Ordering is derived, so keys of one query (all the same variant) sort
/// numerically or lexically as expected.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKey {
    /// The single group of an ungrouped query
    All,
    Int(i64),
    Text(String),
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::All => f.write_str("all"),
            GroupKey::Int(n) => write!(f, "{}", n),
            GroupKey::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for GroupKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            GroupKey::All => serializer.serialize_str("all"),
            GroupKey::Int(n) => serializer.serialize_i64(*n),
            GroupKey::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// Running count and sums for one group
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Accumulator {
    pub count: u64,
    pub sums: Vec<f64>,
}

impl Accumulator {
    pub fn with_width(width: usize) -> Self {
        Self {
            count: 0,
            sums: vec![0.0; width],
        }
    }

    /// Add one contributing record
    pub fn add(&mut self, values: &[f64]) {
        self.count += 1;
        self.widen(values.len());
        for (sum, value) in self.sums.iter_mut().zip(values) {
            *sum += value;
        }
    }

    /// Fold another accumulator of the same group into this one
    pub fn merge(&mut self, other: &Accumulator) {
        self.count = self.count.saturating_add(other.count);
        self.widen(other.sums.len());
        for (sum, value) in self.sums.iter_mut().zip(&other.sums) {
            *sum += value;
        }
    }

    pub fn combine(mut self, other: Accumulator) -> Self {
        self.merge(&other);
        self
    }

    /// `sums[index] / count`, or zero for an empty group
    pub fn average(&self, index: usize) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum(index) / self.count as f64
    }

    pub fn sum(&self, index: usize) -> f64 {
        self.sums.get(index).copied().unwrap_or(0.0)
    }

    fn widen(&mut self, width: usize) {
        if self.sums.len() < width {
            self.sums.resize(width, 0.0);
        }
    }
}

/// Per-line outcome counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LineStats {
    /// Every line handed to a worker
    pub lines: u64,
    pub blank: u64,
    /// Passed the filter and counted toward a group
    pub matched: u64,
    /// Rejected by the filter
    pub filtered: u64,
    /// Dropped because a field could not be read as the required type
    pub skipped: u64,
}

impl LineStats {
    pub fn merge(&mut self, other: &LineStats) {
        self.lines += other.lines;
        self.blank += other.blank;
        self.matched += other.matched;
        self.filtered += other.filtered;
        self.skipped += other.skipped;
    }
}

/// Group key to accumulator map
///
/// A worker's partial aggregate and the merger's global aggregate share this
/// shape; the global one is just the fold of every partial.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregate {
    groups: HashMap<GroupKey, Accumulator>,
    pub stats: LineStats,
}

impl Aggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one record with `values` toward `key`
    pub fn record(&mut self, key: GroupKey, values: &[f64]) {
        self.groups
            .entry(key)
            .or_insert_with(|| Accumulator::with_width(values.len()))
            .add(values);
    }

    /// Key-wise accumulation of `other` into `self`
    pub fn merge(&mut self, other: Aggregate) {
        for (key, acc) in other.groups {
            match self.groups.get_mut(&key) {
                Some(existing) => existing.merge(&acc),
                None => {
                    self.groups.insert(key, acc);
                }
            }
        }
        self.stats.merge(&other.stats);
    }

    pub fn combine(mut self, other: Aggregate) -> Self {
        self.merge(other);
        self
    }

    pub fn get(&self, key: &GroupKey) -> Option<&Accumulator> {
        self.groups.get(key)
    }

    pub fn ensure_group(&mut self, key: GroupKey, width: usize) {
        self.groups
            .entry(key)
            .or_insert_with(|| Accumulator::with_width(width));
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Consume into groups sorted by key ascending
    pub fn into_sorted(self) -> Vec<(GroupKey, Accumulator)> {
        let mut groups: Vec<_> = self.groups.into_iter().collect();
        groups.sort_by(|a, b| a.0.cmp(&b.0));
        groups
    }
}
