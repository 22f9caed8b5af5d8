//! Best candidate per column, awaiting promotion when its run closes.

use super::counts::Count;
use super::sample::{post_column_better, Sample};
use crate::error::Result;

/// One slot per column holding the most desirable row seen so far whose
/// distinguishing column is that slot's column.
#[derive(Debug, Clone)]
pub struct BestCandidateTracker {
    slots: Vec<Sample>,
}

impl BestCandidateTracker {
    pub(crate) fn try_new(column_count: usize) -> Result<Self> {
        let mut slots = Vec::new();
        slots.try_reserve_exact(column_count)?;
        for column in 0..column_count {
            slots.push(Sample::try_new(column_count, column)?);
        }
        Ok(Self { slots })
    }

    /// Candidate currently held for `column`.
    #[must_use]
    pub fn get(&self, column: usize) -> &Sample {
        &self.slots[column]
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true when there are no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Offers the freshly ingested row to every column slot but the last.
    ///
    /// Columns at or after `changed` start a new run, so their old candidate
    /// is stale and gets replaced outright.
    pub(crate) fn observe(&mut self, current: &Sample, changed: usize) -> Result<()> {
        let column_count = self.slots.len();
        for (i, slot) in self
            .slots
            .iter_mut()
            .enumerate()
            .take(column_count.saturating_sub(1))
        {
            if i >= changed || post_column_better(i, column_count, current, &*slot) {
                slot.copy_from(current)?;
                slot.column = i;
            }
        }
        Ok(())
    }

    /// Records the final equality count of `column` once its run has closed.
    pub(crate) fn finalize(&mut self, column: usize, eq: Count) {
        self.slots[column].counts.eq[column] = eq;
    }
}
