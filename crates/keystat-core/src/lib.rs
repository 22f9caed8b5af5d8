//! # `Keystat` Core
//!
//! Single-pass index statistics for cost-based query planners.
//!
//! A statistics refresh scans each index once, in key order, and feeds every
//! row to a [`StatAccumulator`]. The accumulator keeps bounded memory no
//! matter how many rows it sees and produces:
//!
//! - **Summary**: exact row count and, for every key-column prefix, the
//!   average number of rows per distinct prefix value.
//! - **Samples**: a small set of representative keys annotated with
//!   equality, less-than and distinct-less-than counts at every prefix
//!   length, for range and skewed equality estimates.
//!
//! ## Quick Start
//!
//! ```rust
//! use keystat_core::{AccumulatorParams, StatAccumulator};
//!
//! // Index on (a) plus rowid: values A, A, B.
//! let mut acc = StatAccumulator::new(AccumulatorParams::new(2, 1, 3))?;
//! acc.push(0, 1_i64)?;
//! acc.push(1, 2_i64)?; // same `a`, new rowid
//! acc.push(0, 3_i64)?; // new `a`
//!
//! let stats = acc.extract()?;
//! assert_eq!(stats.summary.row_count, 3);
//! assert_eq!(stats.summary.avg_eq, vec![2]);
//! # Ok::<(), keystat_core::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]

pub mod accumulator;
pub mod config;
pub mod error;
pub mod stats;

pub use accumulator::{
    AccumulatorParams, Count, Lcg, SampleKey, SampleStore, StatAccumulator, StoredSample,
    TieBreak,
};
pub use config::{SampleMode, StatsConfig};
pub use error::{Error, Result};
pub use stats::{IndexStatistics, IndexSummary, SampleRecord};
