//! Per-column running counters for the key-prefix group being ingested.

use crate::error::{Error, Result};

/// Row-count sized counter.
pub type Count = u64;

/// Allocates `len` copies of `value`, reporting allocation failure instead of aborting.
pub(crate) fn try_filled<T: Clone>(len: usize, value: T) -> Result<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|e| Error::ResourceExhausted(format!("{len} counter slots: {e}")))?;
    buf.resize(len, value);
    Ok(buf)
}

/// Copies `src` into a fresh buffer, reporting allocation failure.
pub(crate) fn try_copied(src: &[Count]) -> Result<Vec<Count>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(src.len())?;
    buf.extend_from_slice(src);
    Ok(buf)
}

/// Equality, less-than and distinct-less-than counters, one slot per column.
///
/// Slot `i` describes the prefix made of the first `i + 1` columns of the
/// row most recently ingested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningCounts {
    pub(crate) eq: Vec<Count>,
    pub(crate) lt: Vec<Count>,
    pub(crate) dlt: Vec<Count>,
}

impl RunningCounts {
    /// Creates zeroed counters for `columns` columns.
    pub(crate) fn try_new(columns: usize) -> Result<Self> {
        Ok(Self {
            eq: try_filled(columns, 0)?,
            lt: try_filled(columns, 0)?,
            dlt: try_filled(columns, 0)?,
        })
    }

    /// Number of columns tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.eq.len()
    }

    /// Returns true when no column is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.eq.is_empty()
    }

    /// Rows whose prefix through each column equals this row's.
    #[must_use]
    pub fn eq_counts(&self) -> &[Count] {
        &self.eq
    }

    /// Rows whose prefix through each column sorts before this row's.
    #[must_use]
    pub fn lt_counts(&self) -> &[Count] {
        &self.lt
    }

    /// Distinct prefixes through each column sorting before this row's.
    #[must_use]
    pub fn distinct_lt_counts(&self) -> &[Count] {
        &self.dlt
    }

    /// Seeds the counters for the first row: it equals itself on every column.
    pub(crate) fn start(&mut self) {
        self.eq.fill(1);
    }

    /// Moves the counters onto a row whose leftmost differing column is `changed`.
    ///
    /// Prefixes shorter than `changed` are unchanged and grow their group;
    /// every longer prefix opens a new group after the one just closed.
    pub(crate) fn advance(&mut self, changed: usize) {
        for eq in &mut self.eq[..changed] {
            *eq += 1;
        }
        for i in changed..self.eq.len() {
            self.dlt[i] += 1;
            self.lt[i] += self.eq[i];
            self.eq[i] = 1;
        }
    }

    /// Copies `other` into the existing buffers.
    pub(crate) fn copy_from(&mut self, other: &Self) {
        self.eq.copy_from_slice(&other.eq);
        self.lt.copy_from_slice(&other.lt);
        self.dlt.copy_from_slice(&other.dlt);
    }
}
