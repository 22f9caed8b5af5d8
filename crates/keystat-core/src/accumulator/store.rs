//! Bounded, key-ordered collection of retained samples.

use super::counts::Count;
use super::sample::{is_better, Sample, StoredSample};
use crate::config::SampleMode;
use crate::error::Result;

/// Retained samples in ascending key order, never more than `capacity`.
///
/// When full, `worst` points at the least desirable non-periodic entry,
/// which is the next one evicted.
#[derive(Debug, Clone)]
pub struct SampleStore {
    entries: Vec<StoredSample>,
    capacity: usize,
    column_count: usize,
    mode: SampleMode,
    worst: Option<usize>,
}

impl SampleStore {
    pub(crate) fn try_new(capacity: usize, column_count: usize, mode: SampleMode) -> Result<Self> {
        let mut entries = Vec::new();
        entries.try_reserve_exact(capacity)?;
        Ok(Self {
            entries,
            capacity,
            column_count,
            mode,
            worst: None,
        })
    }

    /// Number of retained samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing is retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of retained samples.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns true when the next insertion has to evict.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Index of the entry evicted next, if the store is full and holds a
    /// non-periodic entry.
    #[must_use]
    pub fn worst(&self) -> Option<usize> {
        self.worst
    }

    /// Retained samples in stored order.
    pub fn iter(&self) -> std::slice::Iter<'_, StoredSample> {
        self.entries.iter()
    }

    /// Whether a non-periodic candidate earns a place.
    ///
    /// A store full of periodic samples admits no further candidates.
    pub(crate) fn admits(&self, candidate: &Sample) -> bool {
        if !self.is_full() {
            return true;
        }
        self.worst.is_some_and(|w| {
            is_better(self.mode, self.column_count, candidate, &self.entries[w])
        })
    }

    /// Inserts `candidate`, evicting the worst entry when full.
    ///
    /// The first `pending` equality counts of the new entry stay unknown
    /// until backfilled. In per-column mode a non-periodic candidate whose
    /// prefix is already covered by a retained sample upgrades that sample
    /// instead of being stored twice.
    pub(crate) fn insert(&mut self, candidate: &Sample, pending: usize) -> Result<()> {
        if self.mode.tracks_columns() && !candidate.is_periodic {
            let column = candidate.column;
            let mut upgrade: Option<usize> = None;
            for (idx, old) in self.entries.iter().enumerate().rev() {
                if old.eq[column].is_some() {
                    continue;
                }
                if old.is_periodic {
                    tracing::trace!(column, "prefix already covered by a periodic sample");
                    return Ok(());
                }
                debug_assert!(old.column > column);
                let replace = upgrade.map_or(true, |u| {
                    is_better(self.mode, self.column_count, old, &self.entries[u])
                });
                if replace {
                    upgrade = Some(idx);
                }
            }
            if let Some(idx) = upgrade {
                let entry = &mut self.entries[idx];
                tracing::trace!(from = entry.column, to = column, "upgrading retained sample");
                entry.column = column;
                entry.eq[column] = Some(candidate.counts.eq[column]);
                self.refresh_worst();
                return Ok(());
            }
        }

        if self.is_full() {
            let victim = self.worst.unwrap_or(0);
            tracing::trace!(
                victim,
                periodic = self.entries[victim].is_periodic,
                "evicting retained sample"
            );
            self.entries[victim].assign(candidate, pending)?;
            let slot = self.entries.remove(victim);
            self.push_ordered(slot);
        } else {
            let entry = StoredSample::try_from_candidate(candidate, pending)?;
            self.push_ordered(entry);
        }

        self.refresh_worst();
        Ok(())
    }

    /// Fills unknown equality counts for columns `changed..` across all entries.
    pub(crate) fn backfill(&mut self, changed: usize, eq: &[Count]) {
        for entry in &mut self.entries {
            entry.backfill(changed, eq);
        }
    }

    fn push_ordered(&mut self, entry: StoredSample) {
        // Candidates arrive in key order, so appending keeps the store sorted.
        debug_assert!(
            !self.mode.tracks_columns()
                || self
                    .entries
                    .last()
                    .map_or(true, |last| entry.full_key_lt() > last.full_key_lt())
        );
        self.entries.push(entry);
    }

    fn refresh_worst(&mut self) {
        if !self.is_full() {
            self.worst = None;
            return;
        }
        let mut worst: Option<usize> = None;
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.is_periodic {
                continue;
            }
            let replace = worst.map_or(true, |w| {
                is_better(self.mode, self.column_count, &self.entries[w], entry)
            });
            if replace {
                worst = Some(i);
            }
        }
        self.worst = worst;
    }
}

impl<'a> IntoIterator for &'a SampleStore {
    type Item = &'a StoredSample;
    type IntoIter = std::slice::Iter<'a, StoredSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
