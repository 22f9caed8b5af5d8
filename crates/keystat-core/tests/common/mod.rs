//! Shared helpers: sorted synthetic indexes and brute-force statistics.

#![allow(dead_code)]

use keystat_core::{AccumulatorParams, IndexStatistics, Result, StatAccumulator};

/// A sorted index: each row is its key column values, rowid implied by position.
#[derive(Debug)]
pub struct SyntheticIndex {
    pub rows: Vec<Vec<u32>>,
    pub key_columns: usize,
}

/// Exact counters of one row at every prefix length, rowid included.
#[derive(Debug, PartialEq, Eq)]
pub struct ExactCounts {
    pub eq: Vec<u64>,
    pub lt: Vec<u64>,
    pub distinct_lt: Vec<u64>,
}

impl SyntheticIndex {
    /// Sorts `rows` and wraps them.
    pub fn new(mut rows: Vec<Vec<u32>>, key_columns: usize) -> Self {
        rows.sort();
        Self { rows, key_columns }
    }

    /// Key columns plus the rowid.
    pub fn column_count(&self) -> usize {
        self.key_columns + 1
    }

    /// Leftmost column differing from the previous row; the rowid always differs.
    pub fn changes(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                if i == 0 {
                    return 0;
                }
                let prev = &self.rows[i - 1];
                row.iter()
                    .zip(prev)
                    .position(|(a, b)| a != b)
                    .unwrap_or(self.key_columns)
            })
            .collect()
    }

    /// Number of distinct prefixes of each key-column length.
    pub fn distinct_prefixes(&self) -> Vec<u64> {
        (1..=self.key_columns)
            .map(|len| {
                let mut prefixes: Vec<&[u32]> = self.rows.iter().map(|r| &r[..len]).collect();
                prefixes.dedup();
                prefixes.len() as u64
            })
            .collect()
    }

    /// Exact counters for row `rowid`.
    pub fn exact(&self, rowid: usize) -> ExactCounts {
        let mut eq = Vec::new();
        let mut lt = Vec::new();
        let mut distinct_lt = Vec::new();
        for len in 1..=self.key_columns {
            let prefix = &self.rows[rowid][..len];
            let before: Vec<&[u32]> = self
                .rows
                .iter()
                .map(|r| &r[..len])
                .filter(|p| *p < prefix)
                .collect();
            let mut distinct = before.clone();
            distinct.dedup();
            eq.push(self.rows.iter().filter(|r| &r[..len] == prefix).count() as u64);
            lt.push(before.len() as u64);
            distinct_lt.push(distinct.len() as u64);
        }
        eq.push(1);
        lt.push(rowid as u64);
        distinct_lt.push(rowid as u64);
        ExactCounts {
            eq,
            lt,
            distinct_lt,
        }
    }

    /// Default parameters sized from the true row count.
    pub fn params(&self) -> AccumulatorParams {
        AccumulatorParams::new(
            self.column_count(),
            self.key_columns,
            self.rows.len() as u64,
        )
    }

    /// Feeds every row and returns the accumulator.
    pub fn scan(&self, params: AccumulatorParams) -> Result<StatAccumulator> {
        let mut acc = StatAccumulator::new(params)?;
        for (rowid, changed) in self.changes().into_iter().enumerate() {
            acc.push(changed, rowid as i64)?;
        }
        Ok(acc)
    }

    /// Scans and extracts in one go.
    pub fn analyze(&self, params: AccumulatorParams) -> Result<IndexStatistics> {
        self.scan(params)?.extract()
    }
}

/// Installs a test subscriber once so `RUST_LOG` shows accumulator events.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
