//! Streaming index statistics accumulator.
//!
//! The accumulator watches the rows of one index go by exactly once, in key
//! order, and keeps:
//! - an exact row count and running counters for the current prefix groups,
//!   from which per-prefix distinct estimates are derived;
//! - a bounded, key-ordered set of sample rows annotated with equality,
//!   less-than and distinct-less-than counts for every column prefix.
//!
//! Samples enter the store two ways. Periodic samples are forced in at
//! roughly even row intervals to cover the key range. Best candidates are
//! tracked per column while a run of equal prefixes lasts and are promoted
//! when the run closes, if they beat the least desirable retained sample.
//! Equality counts that are unknown when a sample is stored are filled in
//! later, when the corresponding run closes.
//!
//! Memory is fixed at construction: `max_samples + column_count + 1` sample
//! slots, independent of the number of rows.

mod best;
mod counts;
mod prng;
mod sample;
mod store;

#[cfg(test)]
mod store_tests;

pub use best::BestCandidateTracker;
pub use counts::{Count, RunningCounts};
pub use prng::{Lcg, TieBreak};
pub use sample::{Sample, SampleKey, StoredSample};
pub use store::SampleStore;

use crate::config::{SampleMode, StatsConfig};
use crate::error::{Error, Result};
use crate::stats::{IndexStatistics, IndexSummary};

/// Geometry and sizing of one accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccumulatorParams {
    /// Index columns including the trailing rowid or primary-key columns.
    pub column_count: usize,
    /// Index columns excluding the trailing rowid or primary-key columns.
    pub key_column_count: usize,
    /// Estimated rows in the index; only sizes the periodic stride.
    pub estimated_rows: u64,
    /// Capacity of the sample store.
    pub max_samples: usize,
    /// Sampling granularity.
    pub mode: SampleMode,
}

impl AccumulatorParams {
    /// Creates parameters with the default sampling configuration.
    #[must_use]
    pub fn new(column_count: usize, key_column_count: usize, estimated_rows: u64) -> Self {
        Self::from_config(
            &StatsConfig::default(),
            column_count,
            key_column_count,
            estimated_rows,
        )
    }

    /// Creates parameters whose sampling settings come from `config`.
    #[must_use]
    pub fn from_config(
        config: &StatsConfig,
        column_count: usize,
        key_column_count: usize,
        estimated_rows: u64,
    ) -> Self {
        Self {
            column_count,
            key_column_count,
            estimated_rows,
            max_samples: config.sampling.max_samples,
            mode: config.sampling.mode,
        }
    }

    /// Sets the store capacity.
    #[must_use]
    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = max_samples;
        self
    }

    /// Sets the sampling mode.
    #[must_use]
    pub fn with_mode(mut self, mode: SampleMode) -> Self {
        self.mode = mode;
        self
    }

    /// Rows between forced periodic samples, aiming at about a third of the
    /// capacity spread evenly over the estimated rows.
    #[must_use]
    pub fn periodic_stride(&self) -> Count {
        self.estimated_rows / (self.max_samples as u64 / 3 + 1) + 1
    }

    fn validate(&self) -> Result<()> {
        if self.key_column_count == 0 || self.key_column_count > self.column_count {
            return Err(Error::InvalidInput(format!(
                "key column count {} must be in [1, {}]",
                self.key_column_count, self.column_count
            )));
        }
        if self.max_samples == 0 {
            return Err(Error::InvalidInput(
                "sample capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Single-pass statistics accumulator for one index.
///
/// Feed every index row through [`push`](Self::push) in ascending key order,
/// then read the results with [`summary`](Self::summary) or
/// [`extract`](Self::extract). The first extraction finishes the scan: the
/// runs still open are closed in place and no further rows are accepted.
///
/// # Example
///
/// ```rust
/// use keystat_core::{AccumulatorParams, StatAccumulator};
///
/// // One key column plus the rowid.
/// let mut acc = StatAccumulator::new(AccumulatorParams::new(2, 1, 6))?;
/// for (rowid, changed) in [0, 1, 1, 0, 1, 0].into_iter().enumerate() {
///     acc.push(changed, rowid as i64)?;
/// }
/// assert_eq!(acc.summary().to_string(), "6 2");
/// # Ok::<(), keystat_core::Error>(())
/// ```
#[derive(Debug)]
pub struct StatAccumulator<R = Lcg> {
    column_count: usize,
    key_column_count: usize,
    mode: SampleMode,
    row_count: Count,
    stride: Count,
    tie_break: R,
    current: Sample,
    best: BestCandidateTracker,
    store: SampleStore,
    finished: bool,
}

impl StatAccumulator<Lcg> {
    /// Creates an accumulator seeded from the index geometry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for inconsistent parameters and
    /// [`Error::ResourceExhausted`] if the sample slots cannot be allocated.
    pub fn new(params: AccumulatorParams) -> Result<Self> {
        let tie_break = Lcg::for_index(params.column_count, params.estimated_rows);
        Self::with_tie_break(params, tie_break)
    }
}

impl<R: TieBreak> StatAccumulator<R> {
    /// Creates an accumulator drawing tie-break values from `tie_break`.
    ///
    /// # Errors
    ///
    /// Same as [`StatAccumulator::new`].
    pub fn with_tie_break(params: AccumulatorParams, tie_break: R) -> Result<Self> {
        params.validate()?;
        let column_count = params.column_count;
        let stride = params.periodic_stride();

        let accumulator = Self {
            column_count,
            key_column_count: params.key_column_count,
            mode: params.mode,
            row_count: 0,
            stride,
            tie_break,
            current: Sample::try_new(column_count, 0)?,
            best: BestCandidateTracker::try_new(column_count)?,
            store: SampleStore::try_new(params.max_samples, column_count, params.mode)?,
            finished: false,
        };

        tracing::debug!(
            column_count,
            key_column_count = params.key_column_count,
            max_samples = params.max_samples,
            stride,
            mode = ?params.mode,
            "statistics accumulator ready"
        );
        Ok(accumulator)
    }

    /// Ingests the next index row.
    ///
    /// `changed` is the leftmost column whose value differs from the previous
    /// row; for the first row it is ignored. `key` identifies the row in its
    /// table. Rows must arrive in ascending key order; that is not checked.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `changed` is not a column index or
    /// the scan is already finished, and [`Error::ResourceExhausted`] if a
    /// sample cannot be stored. After an error the accumulator must be
    /// discarded.
    pub fn push(&mut self, changed: usize, key: impl Into<SampleKey>) -> Result<()> {
        if self.finished {
            return Err(Error::InvalidInput(
                "rows cannot be pushed after extraction".to_string(),
            ));
        }
        if changed >= self.column_count {
            return Err(Error::InvalidInput(format!(
                "changed column {changed} out of range for {} columns",
                self.column_count
            )));
        }

        if self.row_count == 0 {
            self.current.counts.start();
        } else {
            close_prefix(
                self.mode,
                self.stride,
                &mut self.current,
                &mut self.best,
                &mut self.store,
                changed,
            )?;
            self.current.counts.advance(changed);
        }

        self.row_count += 1;
        self.current.key = key.into();
        self.current.hash = self.tie_break.next_hash();

        if self.mode.tracks_columns() {
            let lt = self.current.counts.lt[self.column_count - 1];
            if lt / self.stride != (lt + 1) / self.stride {
                self.current.is_periodic = true;
                self.current.column = 0;
                let inserted = self.store.insert(&self.current, self.column_count - 1);
                self.current.is_periodic = false;
                inserted?;
            }
            self.best.observe(&self.current, changed)?;
        }

        Ok(())
    }

    /// Row count and per-prefix average equality counts.
    ///
    /// The last prefix group never closes, so the running distinct counts
    /// already cover every row seen.
    #[must_use]
    pub fn summary(&self) -> IndexSummary {
        let rows = self.row_count;
        let avg_eq = self.current.counts.dlt[..self.key_column_count]
            .iter()
            .map(|dlt| {
                let distinct = dlt + 1;
                rows.div_ceil(distinct)
            })
            .collect();
        IndexSummary {
            row_count: rows,
            avg_eq,
        }
    }

    /// Closes the runs still open at the last row, once.
    ///
    /// Best candidates of those runs are considered for promotion and every
    /// pending equality count is backfilled, reusing the slots allocated at
    /// construction. Later calls do nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceExhausted`] if a promoted sample cannot be
    /// stored. The accumulator must then be discarded.
    pub fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        if self.row_count > 0 {
            close_prefix(
                self.mode,
                self.stride,
                &mut self.current,
                &mut self.best,
                &mut self.store,
                0,
            )?;
        }
        self.finished = true;
        tracing::debug!(
            rows = self.row_count,
            retained = self.store.len(),
            "statistics scan finished"
        );
        Ok(())
    }

    /// Returns true once the scan has been finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Summary plus every retained sample, in key order.
    ///
    /// Finishes the scan first if needed; repeated calls return the same
    /// statistics without touching the accumulator again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceExhausted`] if finishing the scan or copying
    /// a sample key fails and [`Error::Internal`] if an equality count was
    /// never resolved.
    pub fn extract(&mut self) -> Result<IndexStatistics> {
        self.finish()?;

        let width = if self.mode.tracks_columns() {
            self.column_count
        } else {
            1
        };
        let mut samples = Vec::new();
        samples.try_reserve_exact(self.store.len())?;
        for entry in &self.store {
            let record = entry
                .to_record(width)
                .inspect_err(|e| tracing::warn!(error = %e, "discarding sample extraction"))?;
            samples.push(record);
        }

        tracing::debug!(
            rows = self.row_count,
            samples = samples.len(),
            "index statistics extracted"
        );
        Ok(IndexStatistics {
            summary: self.summary(),
            samples,
        })
    }

    /// Rows ingested so far.
    #[must_use]
    pub fn row_count(&self) -> Count {
        self.row_count
    }

    /// Columns including the trailing rowid or primary-key columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// Columns excluding the trailing rowid or primary-key columns.
    #[must_use]
    pub fn key_column_count(&self) -> usize {
        self.key_column_count
    }

    /// Rows between forced periodic samples.
    #[must_use]
    pub fn periodic_stride(&self) -> Count {
        self.stride
    }

    /// Sampling granularity.
    #[must_use]
    pub fn mode(&self) -> SampleMode {
        self.mode
    }

    /// Candidate for the most recently ingested row.
    #[must_use]
    pub fn current(&self) -> &Sample {
        &self.current
    }

    /// Per-column best candidates.
    #[must_use]
    pub fn best_candidates(&self) -> &BestCandidateTracker {
        &self.best
    }

    /// Samples retained so far; the final runs are included once finished.
    #[must_use]
    pub fn store(&self) -> &SampleStore {
        &self.store
    }
}

/// Closes the runs of every column at or after `changed`.
///
/// `current` still describes the previous row, whose equality counts for
/// those columns are now final.
fn close_prefix(
    mode: SampleMode,
    stride: Count,
    current: &mut Sample,
    best: &mut BestCandidateTracker,
    store: &mut SampleStore,
    changed: usize,
) -> Result<()> {
    match mode {
        SampleMode::PerColumn => {
            let column_count = current.counts.len();
            for i in (changed..column_count - 1).rev() {
                best.finalize(i, current.counts.eq[i]);
                let candidate = best.get(i);
                if store.admits(candidate) {
                    tracing::trace!(column = i, "promoting best candidate");
                    store.insert(candidate, i)?;
                }
            }
            store.backfill(changed, &current.counts.eq);
        }
        SampleMode::Leading => {
            if changed == 0 {
                let lt = current.counts.lt[0];
                let eq = current.counts.eq[0];
                current.column = 0;
                if lt / stride != (lt + eq) / stride {
                    current.is_periodic = true;
                    let inserted = store.insert(current, 0);
                    current.is_periodic = false;
                    inserted?;
                } else if store.admits(current) {
                    store.insert(current, 0)?;
                }
            }
        }
    }
    Ok(())
}
