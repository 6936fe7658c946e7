//! Error types for analysis operations.
//!
//! Only failures that make a whole table impossible surface here. A single
//! cell that cannot be computed is recorded as missing instead.

use crate::formula::FormulaError;
use finsight_data::DataError;
use thiserror::Error;

/// Result type for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Ratio catalog unreadable or malformed
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A ratio formula failed to parse
    #[error("Invalid formula for ratio '{ratio}': {source}")]
    Formula {
        /// Ratio whose formula is malformed
        ratio: String,
        /// Parse failure
        #[source]
        source: FormulaError,
    },

    /// Requested year count outside the supported range
    #[error("Requested {requested} years, supported range is 0 to {max}")]
    InputBounds {
        /// Requested number of years
        requested: usize,
        /// Largest supported number of years
        max: usize,
    },

    /// Data layer error
    #[error("Data error: {0}")]
    Data(#[from] DataError),
}
