//! JSON report envelope around an analysis.
//!
//! The envelope carries enough metadata to tell reports apart without
//! parsing their contents: ticker, company, sector, covered fiscal years and
//! the time the report was produced.

use chrono::{DateTime, Utc};
use finsight_analysis::{Analysis, MAX_YEARS_REQUEST};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Failure to produce or write a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The analysis could not be turned into JSON.
    #[error("Failed to encode report: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The report could not be written.
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Analysis results with identifying metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Ticker symbol.
    pub symbol: String,

    /// Company name, if the provider knew it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,

    /// Sector key the ratios were compared against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,

    /// When the report was produced.
    pub generated_at: DateTime<Utc>,

    /// Number of fiscal years covered.
    pub period_years: usize,

    /// The serialized analysis.
    pub contents: serde_json::Value,
}

impl Report {
    /// Envelope for arbitrary contents, stamped now.
    pub fn new(
        symbol: impl Into<String>,
        period_years: usize,
        contents: serde_json::Value,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            company: None,
            sector: None,
            generated_at: Utc::now(),
            period_years,
            contents,
        }
    }

    /// Envelope for a complete analysis.
    ///
    /// # Errors
    ///
    /// Fails if the analysis cannot be encoded as JSON.
    pub fn from_analysis(analysis: &Analysis) -> Result<Self, ReportError> {
        let builder = ReportBuilder::new()
            .symbol(&analysis.symbol)
            .sector(&analysis.sector)
            .period_years(analysis.years())
            .contents(serde_json::to_value(analysis)?);
        Ok(match &analysis.company.long_name {
            Some(name) => builder.company(name),
            None => builder,
        }
        .build())
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as pretty JSON.
    pub fn write_json(&self, path: &Path) -> Result<(), ReportError> {
        std::fs::write(path, self.to_json()?)?;
        tracing::info!(symbol = %self.symbol, path = %path.display(), "wrote JSON report");
        Ok(())
    }
}

/// Builder for [`Report`].
#[derive(Debug, Default)]
pub struct ReportBuilder {
    symbol: String,
    company: Option<String>,
    sector: Option<String>,
    period_years: Option<usize>,
    contents: Option<serde_json::Value>,
}

impl ReportBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticker symbol.
    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = symbol.into();
        self
    }

    /// Company name.
    pub fn company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    /// Sector key.
    pub fn sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    /// Number of fiscal years covered. Defaults to [`MAX_YEARS_REQUEST`].
    pub const fn period_years(mut self, years: usize) -> Self {
        self.period_years = Some(years);
        self
    }

    /// Report body.
    pub fn contents(mut self, contents: serde_json::Value) -> Self {
        self.contents = Some(contents);
        self
    }

    /// Stamp and return the report.
    pub fn build(self) -> Report {
        Report {
            company: self.company,
            sector: self.sector,
            ..Report::new(
                self.symbol,
                self.period_years.unwrap_or(MAX_YEARS_REQUEST),
                self.contents.unwrap_or(serde_json::Value::Null),
            )
        }
    }
}
