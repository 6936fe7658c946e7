#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/finsight-rs/finsight/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod provider;
pub mod sector;
pub mod statement;

pub use catalog::LineItemCatalog;
pub use error::{DataError, Result};
pub use provider::{
    CompanyInfo, DirectoryProvider, MemoryProvider, StatementProvider, normalize_symbol,
};
pub use sector::{SectorAverages, UNKNOWN_SECTOR, normalize_sector};
pub use statement::{Datum, Statement, StatementKind, TickerStatements};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
