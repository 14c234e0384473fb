//! Error types for the site ledger engine.
//!
//! The calculation layer is total over its inputs, so errors only arise at the
//! edges: configuration loading, parsing caller-supplied identifiers such as
//! month strings, optimistic-concurrency checks and the persistence boundary.

use thiserror::Error;

/// The main error type for the site ledger engine.
///
/// # Example
///
/// ```
/// use site_ledger::error::EngineError;
///
/// let error = EngineError::InvalidMonth {
///     value: "2026-13".to_string(),
/// };
/// assert_eq!(error.to_string(), "Invalid month '2026-13': expected YYYY-MM");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A month identifier was not of the form `YYYY-MM`.
    #[error("Invalid month '{value}': expected YYYY-MM")]
    InvalidMonth {
        /// The rejected value.
        value: String,
    },

    /// The original and edited records passed to a payment apply describe
    /// different people.
    #[error("Cannot apply payment: original '{original}' and edited '{edited}' are different people")]
    PersonMismatch {
        /// Id of the original record.
        original: String,
        /// Id of the edited record.
        edited: String,
    },

    /// The edit was made against an older version of the person record.
    #[error("Stale edit for person '{person_id}': edited version {found}, stored version {expected}")]
    StaleVersion {
        /// The person whose record changed underneath the edit.
        person_id: String,
        /// The version currently stored.
        expected: u64,
        /// The version the edit was based on.
        found: u64,
    },

    /// A write through the persistence boundary failed.
    #[error("Persistence failure during {operation}: {message}")]
    Persistence {
        /// The write that failed (e.g. "append_transaction").
        operation: String,
        /// The failure reported by the store.
        message: String,
    },
}

impl EngineError {
    /// Returns true for failures the caller may retry or reconcile on the next read.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::Persistence { .. } | EngineError::StaleVersion { .. }
        )
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
