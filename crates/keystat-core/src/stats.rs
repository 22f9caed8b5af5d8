//! Extracted index statistics.
//!
//! These are the values a statistics refresh hands to persistence and that
//! the planner later reads back:
//! - the row count and the average number of rows per distinct prefix;
//! - the retained sample keys with their per-prefix counters.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::accumulator::{Count, SampleKey};

/// Selectivity assumed when no estimate is available.
pub const DEFAULT_SELECTIVITY: f64 = 0.1;

/// Row count and per-prefix equality estimates for one index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSummary {
    /// Rows in the index.
    pub row_count: Count,
    /// For each key-column prefix length `i + 1`, the average number of rows
    /// sharing one value of that prefix, rounded up.
    pub avg_eq: Vec<Count>,
}

impl IndexSummary {
    /// Estimated rows matched by an equality constraint on the first
    /// `prefix_len` key columns.
    #[must_use]
    pub fn estimated_eq_rows(&self, prefix_len: usize) -> Option<Count> {
        prefix_len
            .checked_sub(1)
            .and_then(|i| self.avg_eq.get(i))
            .copied()
    }

    /// Fraction of the index matched by an equality constraint on the first
    /// `prefix_len` key columns.
    #[must_use]
    pub fn selectivity(&self, prefix_len: usize) -> f64 {
        match self.estimated_eq_rows(prefix_len) {
            Some(rows) if self.row_count > 0 => rows as f64 / self.row_count as f64,
            _ => DEFAULT_SELECTIVITY,
        }
    }
}

impl fmt::Display for IndexSummary {
    /// Whitespace separated: the row count, then one estimate per prefix.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.row_count)?;
        for v in &self.avg_eq {
            write!(f, " {v}")?;
        }
        Ok(())
    }
}

/// One retained sample as handed to persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRecord {
    /// Key of the sampled row.
    pub key: SampleKey,
    /// Rows equal to the sample on each column prefix.
    pub eq: Vec<Count>,
    /// Rows sorting before the sample on each column prefix.
    pub lt: Vec<Count>,
    /// Distinct prefixes sorting before the sample on each column prefix.
    pub distinct_lt: Vec<Count>,
}

/// Everything extracted from one accumulator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStatistics {
    /// Row count and distinct-prefix estimates.
    pub summary: IndexSummary,
    /// Retained samples, in ascending key order.
    pub samples: Vec<SampleRecord>,
}

impl IndexStatistics {
    /// Iterates the samples in stored order.
    pub fn samples(&self) -> std::slice::Iter<'_, SampleRecord> {
        self.samples.iter()
    }

    /// Number of samples.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

impl<'a> IntoIterator for &'a IndexStatistics {
    type Item = &'a SampleRecord;
    type IntoIter = std::slice::Iter<'a, SampleRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples()
    }
}
