//! Error types for data operations.

use crate::statement::StatementKind;
use thiserror::Error;

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, DataError>;

/// Failures while loading statements or reference data.
#[derive(Debug, Error)]
pub enum DataError {
    /// Reading a file failed
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// A CSV input was malformed
    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A JSON input was malformed
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Input parsed but did not have the expected shape
    #[error("Unexpected data layout: {0}")]
    Parse(String),

    /// Invalid symbol
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// A whole statement could not be supplied for a symbol
    #[error("{kind} unavailable for {symbol}: {reason}")]
    StatementUnavailable {
        /// Symbol that was queried
        symbol: String,
        /// Statement that could not be supplied
        kind: StatementKind,
        /// Reason the statement is unavailable
        reason: String,
    },

    /// Missing data
    #[error("Missing data for {symbol}: {reason}")]
    MissingData {
        /// Symbol that was queried
        symbol: String,
        /// Reason for missing data
        reason: String,
    },

    /// Malformed reference data (catalogs, sector averages)
    #[error("Invalid configuration: {0}")]
    Config(String),
}
