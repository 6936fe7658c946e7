#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/finsight-rs/finsight/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod catalog;
pub mod comparison;
pub mod config;
pub mod error;
pub mod formula;
pub mod grid;
pub mod growth;
pub mod period;
pub mod pipeline;
pub mod ratios;
pub mod table;

pub use catalog::{RatioCatalog, RatioDefinition, default_label};
pub use comparison::compare;
pub use config::{AnalysisConfig, MAX_YEARS_REQUEST};
pub use error::{AnalysisError, Result};
pub use formula::{EvalError, FieldSource, FieldValue, Formula, FormulaError};
pub use grid::{DifferenceTable, GrowthTable, RatioGrid};
pub use growth::{growth, percent_change};
pub use period::Period;
pub use pipeline::{Analysis, AnalysisRequest, FinancialAnalyzer};
pub use ratios::{RatioEngine, RatioIssue, RatiosTable};
pub use table::{FinancialTable, NumericRow, NumericTable, TableBuilder};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
