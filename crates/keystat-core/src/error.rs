//! Error types for `Keystat`.
//!
//! A single error type covers every fallible operation of the accumulator.
//! Resource exhaustion is the only failure a well-formed scan can hit; the
//! remaining variants report caller mistakes or configuration problems.

use thiserror::Error;

/// Result type alias for `Keystat` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while gathering index statistics.
///
/// Error codes follow the pattern `KSTAT-XXX` for easy debugging.
#[derive(Error, Debug)]
pub enum Error {
    /// Allocation failed while sizing or filling the accumulator (KSTAT-001).
    ///
    /// The statistics pass must be abandoned; no partial state is usable.
    #[error("[KSTAT-001] Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// The driver supplied arguments outside the accepted range (KSTAT-002).
    #[error("[KSTAT-002] Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error (KSTAT-003).
    #[error("[KSTAT-003] Configuration error: {0}")]
    Config(String),

    /// Internal error (KSTAT-004).
    ///
    /// An internal invariant did not hold. Please report if encountered.
    #[error("[KSTAT-004] Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns the error code (e.g., "KSTAT-001").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ResourceExhausted(_) => "KSTAT-001",
            Self::InvalidInput(_) => "KSTAT-002",
            Self::Config(_) => "KSTAT-003",
            Self::Internal(_) => "KSTAT-004",
        }
    }

    /// Returns true if this error is recoverable.
    ///
    /// Exhaustion and internal errors abort the whole statistics pass.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::ResourceExhausted(_) | Self::Internal(_))
    }
}

impl From<crate::config::ConfigError> for Error {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::collections::TryReserveError> for Error {
    fn from(err: std::collections::TryReserveError) -> Self {
        Self::ResourceExhausted(err.to_string())
    }
}
