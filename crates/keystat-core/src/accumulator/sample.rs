//! Sample snapshots and the desirability ordering between them.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::counts::{try_copied, try_filled, Count, RunningCounts};
use crate::config::SampleMode;
use crate::error::{Error, Result};
use crate::stats::SampleRecord;

/// Representative key of a sampled row.
///
/// Rowid tables identify rows by integer; tables keyed on their primary key
/// carry the encoded key bytes instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleKey {
    /// Integer rowid.
    Integer(i64),
    /// Encoded primary-key bytes.
    Bytes(Vec<u8>),
}

impl Default for SampleKey {
    fn default() -> Self {
        Self::Integer(0)
    }
}

impl SampleKey {
    /// Clones `other` into `self`, reusing the byte buffer when both hold bytes.
    ///
    /// Growing the buffer reports allocation failure instead of aborting.
    pub(crate) fn assign(&mut self, other: &Self) -> Result<()> {
        match (self, other) {
            (Self::Bytes(dst), Self::Bytes(src)) => {
                dst.clear();
                dst.try_reserve_exact(src.len())?;
                dst.extend_from_slice(src);
            }
            (dst, src) => *dst = src.try_clone()?,
        }
        Ok(())
    }

    /// Clones the key, reporting allocation failure for byte keys.
    pub(crate) fn try_clone(&self) -> Result<Self> {
        match self {
            Self::Integer(v) => Ok(Self::Integer(*v)),
            Self::Bytes(src) => {
                let mut dst = Vec::new();
                dst.try_reserve_exact(src.len())?;
                dst.extend_from_slice(src);
                Ok(Self::Bytes(dst))
            }
        }
    }
}

impl From<i64> for SampleKey {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<Vec<u8>> for SampleKey {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<&[u8]> for SampleKey {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

/// Snapshot of a candidate row with fully known counters.
///
/// Used for the row being ingested and for the per-column best candidates.
#[derive(Debug, Clone)]
pub struct Sample {
    pub(crate) counts: RunningCounts,
    pub(crate) key: SampleKey,
    pub(crate) is_periodic: bool,
    pub(crate) column: usize,
    pub(crate) hash: u32,
}

impl Sample {
    pub(crate) fn try_new(columns: usize, column: usize) -> Result<Self> {
        Ok(Self {
            counts: RunningCounts::try_new(columns)?,
            key: SampleKey::default(),
            is_periodic: false,
            column,
            hash: 0,
        })
    }

    /// Counters of the sampled row.
    #[must_use]
    pub fn counts(&self) -> &RunningCounts {
        &self.counts
    }

    /// Key of the sampled row.
    #[must_use]
    pub fn key(&self) -> &SampleKey {
        &self.key
    }

    /// Column whose prefix this sample represents.
    #[must_use]
    pub fn column(&self) -> usize {
        self.column
    }

    /// Tie-break value drawn when the row was ingested.
    #[must_use]
    pub fn hash(&self) -> u32 {
        self.hash
    }

    /// Overwrites this sample with `other` without reallocating counters.
    pub(crate) fn copy_from(&mut self, other: &Self) -> Result<()> {
        self.key.assign(&other.key)?;
        self.counts.copy_from(&other.counts);
        self.is_periodic = other.is_periodic;
        self.column = other.column;
        self.hash = other.hash;
        Ok(())
    }
}

/// A sample retained in the store.
///
/// Equality counts for prefixes whose run had not closed at insertion time
/// are `None` until the run closes and the value is backfilled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSample {
    pub(crate) eq: Vec<Option<Count>>,
    pub(crate) lt: Vec<Count>,
    pub(crate) dlt: Vec<Count>,
    pub(crate) key: SampleKey,
    pub(crate) is_periodic: bool,
    pub(crate) column: usize,
    pub(crate) hash: u32,
}

impl StoredSample {
    /// Deep-copies `candidate`, leaving the first `pending` equality counts unknown.
    pub(crate) fn try_from_candidate(candidate: &Sample, pending: usize) -> Result<Self> {
        let columns = candidate.counts.len();
        let mut stored = Self {
            eq: try_filled(columns, None)?,
            lt: try_filled(columns, 0)?,
            dlt: try_filled(columns, 0)?,
            key: candidate.key.try_clone()?,
            is_periodic: false,
            column: 0,
            hash: 0,
        };
        stored.assign(candidate, pending)?;
        Ok(stored)
    }

    /// Overwrites this entry with `candidate`, reusing its buffers.
    pub(crate) fn assign(&mut self, candidate: &Sample, pending: usize) -> Result<()> {
        self.key.assign(&candidate.key)?;
        for (dst, src) in self.eq.iter_mut().zip(candidate.counts.eq_counts()) {
            *dst = Some(*src);
        }
        for slot in self.eq.iter_mut().take(pending) {
            *slot = None;
        }
        self.lt.copy_from_slice(candidate.counts.lt_counts());
        self.dlt.copy_from_slice(candidate.counts.distinct_lt_counts());
        self.is_periodic = candidate.is_periodic;
        self.column = candidate.column;
        self.hash = candidate.hash;
        Ok(())
    }

    /// Equality counts; `None` marks a prefix whose run is still open.
    #[must_use]
    pub fn eq_counts(&self) -> &[Option<Count>] {
        &self.eq
    }

    /// Less-than counts.
    #[must_use]
    pub fn lt_counts(&self) -> &[Count] {
        &self.lt
    }

    /// Distinct-less-than counts.
    #[must_use]
    pub fn distinct_lt_counts(&self) -> &[Count] {
        &self.dlt
    }

    /// Key of the sampled row.
    #[must_use]
    pub fn key(&self) -> &SampleKey {
        &self.key
    }

    /// True for samples forced in at a stride boundary.
    #[must_use]
    pub fn is_periodic(&self) -> bool {
        self.is_periodic
    }

    /// Column whose prefix this sample represents (meaningless when periodic).
    #[must_use]
    pub fn column(&self) -> usize {
        self.column
    }

    /// Tie-break value.
    #[must_use]
    pub fn hash(&self) -> u32 {
        self.hash
    }

    /// Less-than count over the full key, which orders the store.
    pub(crate) fn full_key_lt(&self) -> Count {
        self.lt.last().copied().unwrap_or(0)
    }

    /// Fills every unknown equality count at or after `from` with `eq[j]`.
    pub(crate) fn backfill(&mut self, from: usize, eq: &[Count]) {
        for (slot, value) in self.eq.iter_mut().zip(eq).skip(from) {
            if slot.is_none() {
                *slot = Some(*value);
            }
        }
    }

    /// Converts into an output record of `width` columns.
    pub(crate) fn to_record(&self, width: usize) -> Result<SampleRecord> {
        let mut eq = Vec::new();
        eq.try_reserve_exact(width)?;
        for (i, v) in self.eq[..width].iter().enumerate() {
            let v = v.ok_or_else(|| {
                Error::Internal(format!("equality count for column {i} never resolved"))
            })?;
            eq.push(v);
        }
        Ok(SampleRecord {
            key: self.key.try_clone()?,
            eq,
            lt: try_copied(&self.lt[..width])?,
            distinct_lt: try_copied(&self.dlt[..width])?,
        })
    }
}

/// Read access shared by fresh candidates and retained samples for ranking.
pub(crate) trait Ranked {
    fn column(&self) -> usize;
    fn hash(&self) -> u32;
    fn eq_at(&self, column: usize) -> Option<Count>;
}

impl Ranked for Sample {
    fn column(&self) -> usize {
        self.column
    }

    fn hash(&self) -> u32 {
        self.hash
    }

    fn eq_at(&self, column: usize) -> Option<Count> {
        Some(self.counts.eq[column])
    }
}

impl Ranked for StoredSample {
    fn column(&self) -> usize {
        self.column
    }

    fn hash(&self) -> u32 {
        self.hash
    }

    fn eq_at(&self, column: usize) -> Option<Count> {
        self.eq[column]
    }
}

/// Returns true if `new` beats `old` looking only past `column`.
///
/// Both are assumed to represent `column`; the first trailing column with a
/// larger equality count wins, then the larger hash.
pub(crate) fn post_column_better<A, B>(column: usize, column_count: usize, new: &A, old: &B) -> bool
where
    A: Ranked + ?Sized,
    B: Ranked + ?Sized,
{
    for j in column + 1..column_count {
        match new.eq_at(j).cmp(&old.eq_at(j)) {
            Ordering::Greater => return true,
            Ordering::Less => return false,
            Ordering::Equal => {}
        }
    }
    new.hash() > old.hash()
}

/// Returns true if non-periodic sample `new` is preferred over `old`.
///
/// Larger equality count on the represented column wins. On a tie, per-column
/// mode prefers the shorter prefix and then the trailing columns; leading
/// mode goes straight to the hash.
pub(crate) fn is_better<A, B>(mode: SampleMode, column_count: usize, new: &A, old: &B) -> bool
where
    A: Ranked + ?Sized,
    B: Ranked + ?Sized,
{
    match new.eq_at(new.column()).cmp(&old.eq_at(old.column())) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => match mode {
            SampleMode::PerColumn => {
                new.column() < old.column()
                    || (new.column() == old.column()
                        && post_column_better(new.column(), column_count, new, old))
            }
            SampleMode::Leading => new.hash() > old.hash(),
        },
    }
}
