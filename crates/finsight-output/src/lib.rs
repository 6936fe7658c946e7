#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/finsight-rs/finsight/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod frame;
pub mod markdown;
pub mod report;
pub mod workbook;

pub use export::{
    Cell, ExportError, ExportFormat, Exporter, Tabular, Tabulation, export_analysis,
    export_statements,
};
pub use frame::ToDataFrame;
pub use markdown::FinancialReport;
pub use report::{Report, ReportBuilder, ReportError};
pub use workbook::workbook_bytes;
