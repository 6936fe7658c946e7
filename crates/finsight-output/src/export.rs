//! Export functionality for analysis tables.
//!
//! Every table is first flattened to a [`Tabulation`] (a header plus rows of
//! [`Cell`]s) and then written as CSV, as a JSON array of records or as an
//! `.xlsx` sheet. Missing values are empty in CSV and spreadsheets and `null`
//! in JSON.

use crate::workbook::workbook_bytes;
use finsight_analysis::{Analysis, FinancialTable, RatioGrid, RatiosTable};
use finsight_data::{Datum, Statement, StatementKind, TickerStatements};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Output was not valid UTF-8.
    #[error("Encoding error: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// DataFrame construction error.
    #[error("DataFrame error: {0}")]
    Frame(#[from] polars::prelude::PolarsError),

    /// Spreadsheet encoding error.
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,

    /// Excel workbook; one sheet per table.
    Xlsx,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
            Self::Xlsx => "xlsx",
        }
    }

    /// Whether the output is binary rather than text.
    pub const fn is_binary(&self) -> bool {
        matches!(self, Self::Xlsx)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Json => write!(f, "json"),
            Self::PrettyJson => write!(f, "pretty-json"),
            Self::Xlsx => write!(f, "xlsx"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" | "prettyjson" => Ok(Self::PrettyJson),
            "xlsx" | "excel" => Ok(Self::Xlsx),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// One exported value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Integer, used for years.
    Int(i64),
    /// Floating-point value.
    Number(f64),
    /// Text.
    Text(String),
    /// Missing value.
    Empty,
}

impl Cell {
    fn to_field(&self) -> String {
        match self {
            Self::Int(v) => v.to_string(),
            Self::Number(v) => v.to_string(),
            Self::Text(s) => s.clone(),
            Self::Empty => String::new(),
        }
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Empty, Self::Number)
    }
}

impl From<&Datum> for Cell {
    fn from(value: &Datum) -> Self {
        match value {
            Datum::Number(v) if v.is_finite() => Self::Number(*v),
            Datum::Number(_) | Datum::Missing => Self::Empty,
            Datum::Text(s) => Self::Text(s.clone()),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Int(v) => serializer.serialize_i64(*v),
            Self::Number(v) => serializer.serialize_f64(*v),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Empty => serializer.serialize_none(),
        }
    }
}

/// A table flattened for export.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tabulation {
    /// Column names.
    pub header: Vec<String>,
    /// Rows, each as long as the header.
    pub rows: Vec<Vec<Cell>>,
}

impl Tabulation {
    /// Write as CSV with a header row.
    pub fn to_csv(&self) -> Result<String, ExportError> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.write_record(&self.header)?;
        for row in &self.rows {
            wtr.write_record(row.iter().map(Cell::to_field))?;
        }
        let data = String::from_utf8(wtr.into_inner().map_err(|e| e.into_error())?)?;
        Ok(data)
    }
}

/// Rows serialize as objects whose keys keep header order.
impl Serialize for Tabulation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Record<'a> {
            header: &'a [String],
            row: &'a [Cell],
        }

        impl Serialize for Record<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.header.len()))?;
                for (key, value) in self.header.iter().zip(self.row) {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }

        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&Record {
                header: &self.header,
                row,
            })?;
        }
        seq.end()
    }
}

/// Types that can be flattened to a [`Tabulation`].
pub trait Tabular {
    /// Flatten to a header and rows.
    fn tabulate(&self) -> Tabulation;

    /// Sheet name used when exported on its own as a workbook.
    fn sheet_name(&self) -> &str {
        "Sheet1"
    }
}

impl Tabular for FinancialTable {
    fn tabulate(&self) -> Tabulation {
        let mut header = Vec::with_capacity(self.width() + 1);
        header.push("Year".to_string());
        header.extend(self.columns().iter().cloned());

        let rows: Vec<Vec<Cell>> = self
            .periods()
            .iter()
            .zip(self.rows())
            .map(|(period, row)| {
                std::iter::once(Cell::Int(i64::from(period.year())))
                    .chain(row.iter().map(Cell::from))
                    .collect()
            })
            .collect();

        Tabulation { header, rows }
    }

    fn sheet_name(&self) -> &str {
        "Data"
    }
}

impl Tabular for RatiosTable {
    fn tabulate(&self) -> Tabulation {
        let mut header = Vec::with_capacity(self.ratios().len() + 1);
        header.push("year".to_string());
        header.extend(self.ratios().iter().cloned());

        let rows: Vec<Vec<Cell>> = self
            .periods()
            .iter()
            .zip(self.rows())
            .map(|(period, row)| {
                std::iter::once(Cell::Int(i64::from(period.year())))
                    .chain(row.iter().map(|v| Cell::from(*v)))
                    .collect()
            })
            .collect();

        Tabulation { header, rows }
    }

    fn sheet_name(&self) -> &str {
        "Ratios"
    }
}

impl Tabular for RatioGrid {
    fn tabulate(&self) -> Tabulation {
        let mut header = Vec::with_capacity(self.periods().len() + 1);
        header.push("ratio".to_string());
        header.extend(self.periods().iter().map(ToString::to_string));

        let rows: Vec<Vec<Cell>> = self
            .ratios()
            .iter()
            .zip(self.rows())
            .map(|(ratio, row)| {
                std::iter::once(Cell::Text(ratio.clone()))
                    .chain(row.iter().map(|v| Cell::from(*v)))
                    .collect()
            })
            .collect();

        Tabulation { header, rows }
    }
}

impl Tabular for Statement {
    fn tabulate(&self) -> Tabulation {
        let mut header = Vec::with_capacity(self.period_count() + 1);
        header.push("line_item".to_string());
        header.extend(self.periods.iter().cloned());

        let rows: Vec<Vec<Cell>> = self
            .line_items()
            .map(|(name, values)| {
                let mut row = Vec::with_capacity(self.period_count() + 1);
                row.push(Cell::Text(name.to_string()));
                row.extend(values.iter().map(Cell::from));
                row.resize(self.period_count() + 1, Cell::Empty);
                row
            })
            .collect();

        Tabulation { header, rows }
    }

    fn sheet_name(&self) -> &str {
        self.kind.name()
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to bytes in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_bytes(&self, format: ExportFormat) -> Result<Vec<u8>, ExportError>;

    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the format is binary.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        if format.is_binary() {
            return Err(ExportError::InvalidFormat(format!(
                "{format} is a binary format, export it to a file"
            )));
        }
        Ok(String::from_utf8(self.export_to_bytes(format)?)?)
    }

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_bytes(format)?;
        let mut file = File::create(path)?;
        file.write_all(&content)?;
        Ok(())
    }
}

impl<T: Tabular + ?Sized> Exporter for T {
    fn export_to_bytes(&self, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
        let table = self.tabulate();
        match format {
            ExportFormat::Csv => Ok(table.to_csv()?.into_bytes()),
            ExportFormat::Json => Ok(serde_json::to_vec(&table)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_vec_pretty(&table)?),
            ExportFormat::Xlsx => workbook_bytes(&[(self.sheet_name(), table)]),
        }
    }
}

/// Write every table of an analysis into `dir`.
///
/// Files are named `{SYMBOL}_data_analysis`, `{SYMBOL}_ratios_analysis`,
/// `{SYMBOL}_difference_analysis` and `{SYMBOL}_growth_analysis` with the
/// format's extension. Tables the analysis does not have are skipped, as is
/// an empty growth table. [`ExportFormat::Xlsx`] instead writes one
/// `{SYMBOL}_data_analysis.xlsx` workbook with the sheets `Data`, `Ratios`,
/// `Difference` and `Growth Rates`. Returns the paths written.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or a file cannot be
/// written.
pub fn export_analysis(
    analysis: &Analysis,
    dir: &Path,
    format: ExportFormat,
) -> Result<Vec<PathBuf>, ExportError> {
    std::fs::create_dir_all(dir)?;

    let mut tables: Vec<(&str, &str, &dyn Tabular)> = vec![("data", "Data", &analysis.data)];
    if let Some(ratios) = &analysis.ratios {
        tables.push(("ratios", "Ratios", ratios));
    }
    if let Some(difference) = &analysis.difference {
        tables.push(("difference", "Difference", difference));
    }
    if let Some(growth) = analysis.growth.as_ref().filter(|g| !g.is_empty()) {
        tables.push(("growth", "Growth Rates", growth));
    }

    if format == ExportFormat::Xlsx {
        let sheets: Vec<(&str, Tabulation)> = tables
            .iter()
            .map(|(_, sheet, table)| (*sheet, table.tabulate()))
            .collect();
        let path = dir.join(format!("{}_data_analysis.xlsx", analysis.symbol));
        std::fs::write(&path, workbook_bytes(&sheets)?)?;
        tracing::info!(
            symbol = %analysis.symbol,
            path = %path.display(),
            sheets = sheets.len(),
            "exported workbook"
        );
        return Ok(vec![path]);
    }

    let mut written = Vec::with_capacity(tables.len());
    for (name, _, table) in tables {
        let path = dir.join(format!(
            "{}_{name}_analysis.{}",
            analysis.symbol,
            format.extension()
        ));
        table.export_to_file(&path, format)?;
        tracing::info!(symbol = %analysis.symbol, path = %path.display(), "exported table");
        written.push(path);
    }
    Ok(written)
}

/// Write the raw statements of one ticker into `dir`.
///
/// Text formats write `{SYMBOL}_{balance_sheet|income_statement|cash_flow}`
/// files; [`ExportFormat::Xlsx`] writes one `{SYMBOL}_statements.xlsx`
/// workbook with a sheet per statement. Statements the provider could not
/// supply are skipped. Returns the paths written.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or a file cannot be
/// written.
pub fn export_statements(
    statements: &TickerStatements,
    dir: &Path,
    format: ExportFormat,
) -> Result<Vec<PathBuf>, ExportError> {
    std::fs::create_dir_all(dir)?;

    let available: Vec<&Statement> = StatementKind::all()
        .into_iter()
        .filter_map(|kind| statements.get(kind))
        .collect();
    if available.is_empty() {
        tracing::warn!(symbol = %statements.symbol, "no statements to export");
        return Ok(Vec::new());
    }

    if format == ExportFormat::Xlsx {
        let sheets: Vec<(&str, Tabulation)> = available
            .iter()
            .map(|statement| (statement.kind.name(), statement.tabulate()))
            .collect();
        let path = dir.join(format!("{}_statements.xlsx", statements.symbol));
        std::fs::write(&path, workbook_bytes(&sheets)?)?;
        return Ok(vec![path]);
    }

    let mut written = Vec::with_capacity(available.len());
    for statement in available {
        let path = dir.join(format!(
            "{}_{}.{}",
            statements.symbol,
            statement.kind.key(),
            format.extension()
        ));
        statement.export_to_file(&path, format)?;
        tracing::info!(
            symbol = %statements.symbol,
            statement = %statement.kind,
            path = %path.display(),
            "exported statement"
        );
        written.push(path);
    }
    Ok(written)
}
