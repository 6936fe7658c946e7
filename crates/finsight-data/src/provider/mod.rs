//! Statement providers.
//!
//! A [`StatementProvider`] supplies the three annual statements and basic
//! company information for a ticker. Where the data comes from is the
//! provider's business; the analysis only ever sees [`TickerStatements`].

pub mod directory;
pub mod memory;

pub use directory::DirectoryProvider;
pub use memory::MemoryProvider;

use crate::error::{DataError, Result};
use crate::sector::normalize_sector;
use crate::statement::{Statement, StatementKind, TickerStatements};
use serde::{Deserialize, Serialize};

/// Descriptive company information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInfo {
    /// Ticker symbol
    #[serde(default)]
    pub symbol: String,
    /// Company name
    #[serde(default, rename = "longName", alias = "long_name")]
    pub long_name: Option<String>,
    /// Sector classification
    #[serde(default)]
    pub sector: Option<String>,
    /// Industry classification
    #[serde(default)]
    pub industry: Option<String>,
    /// Company website
    #[serde(default)]
    pub website: Option<String>,
}

impl CompanyInfo {
    /// Company information with nothing but the symbol.
    pub fn unknown(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    /// Sector lookup key: the lowercase sector, or `"n/a"` if unknown.
    pub fn sector_key(&self) -> String {
        normalize_sector(self.sector.as_deref().unwrap_or(""))
    }

    /// Company name, falling back to the symbol.
    pub fn display_name(&self) -> &str {
        self.long_name.as_deref().unwrap_or(&self.symbol)
    }
}

/// Normalize a ticker symbol: trimmed and upper-cased.
pub fn normalize_symbol(raw: &str) -> Result<String> {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
    }
    Ok(symbol)
}

/// Source of financial statements.
pub trait StatementProvider {
    /// Short provider name used in logs.
    fn name(&self) -> &str;

    /// Fetch one statement for a symbol, most recent period first.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement cannot be supplied.
    fn statement(&self, symbol: &str, kind: StatementKind) -> Result<Statement>;

    /// Fetch descriptive company information.
    ///
    /// # Errors
    ///
    /// Returns an error if no information is available.
    fn company_info(&self, symbol: &str) -> Result<CompanyInfo>;

    /// Fetch all three statements, keeping at most `max_periods` periods each.
    ///
    /// A statement that fails to load is logged and left out; the others are
    /// still returned.
    ///
    /// # Errors
    ///
    /// Only an invalid symbol is an error.
    fn fetch_statements(&self, symbol: &str, max_periods: usize) -> Result<TickerStatements> {
        let symbol = normalize_symbol(symbol)?;
        let mut statements = TickerStatements::new(symbol.as_str());

        for kind in StatementKind::all() {
            match self.statement(&symbol, kind) {
                Ok(mut statement) if statement.kind == kind => {
                    statement.truncate(max_periods);
                    statements.set(statement);
                }
                Ok(statement) => tracing::warn!(
                    provider = self.name(),
                    symbol = %symbol,
                    requested = %kind,
                    received = %statement.kind,
                    "provider returned the wrong statement"
                ),
                Err(e) => tracing::warn!(
                    provider = self.name(),
                    symbol = %symbol,
                    statement = %kind,
                    error = %e,
                    "failed to load statement"
                ),
            }
        }

        Ok(statements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Provider whose income statement always fails.
    #[derive(Debug)]
    struct FlakyProvider;

    impl StatementProvider for FlakyProvider {
        fn name(&self) -> &str {
            "flaky"
        }

        fn statement(&self, symbol: &str, kind: StatementKind) -> Result<Statement> {
            if kind == StatementKind::IncomeStatement {
                return Err(DataError::StatementUnavailable {
                    symbol: symbol.to_string(),
                    kind,
                    reason: "upstream failure".to_string(),
                });
            }
            Ok(Statement::new(
                kind,
                vec!["2024".into(), "2023".into(), "2022".into()],
            )
            .with_line_item("Item", [1.0, 2.0, 3.0]))
        }

        fn company_info(&self, symbol: &str) -> Result<CompanyInfo> {
            Ok(CompanyInfo::unknown(symbol))
        }
    }

    #[test]
    fn test_fetch_isolates_statement_failures() {
        let statements = FlakyProvider.fetch_statements(" msft ", 4).unwrap();
        assert_eq!(statements.symbol, "MSFT");
        assert!(statements.balance_sheet.is_some());
        assert!(statements.income_statement.is_none());
        assert!(statements.cash_flow.is_some());
    }

    #[test]
    fn test_fetch_truncates_periods() {
        let statements = FlakyProvider.fetch_statements("MSFT", 2).unwrap();
        let bs = statements.get(StatementKind::BalanceSheet).unwrap();
        assert_eq!(bs.period_count(), 2);
    }

    #[test]
    fn test_invalid_symbol() {
        let result = FlakyProvider.fetch_statements("   ", 4);
        assert!(matches!(result, Err(DataError::InvalidSymbol(_))));
    }

    #[test]
    fn test_company_info_sector_key() {
        let info = CompanyInfo {
            sector: Some("Technology".to_string()),
            ..CompanyInfo::unknown("MSFT")
        };
        assert_eq!(info.sector_key(), "technology");
        assert_eq!(CompanyInfo::unknown("X").sector_key(), "n/a");
        assert_eq!(info.display_name(), "MSFT");
    }

    #[test]
    fn test_company_info_from_json() {
        let info: CompanyInfo = serde_json::from_str(
            r#"{"symbol":"MSFT","longName":"Microsoft Corporation","sector":"Technology"}"#,
        )
        .unwrap();
        assert_eq!(info.long_name.as_deref(), Some("Microsoft Corporation"));
        assert_eq!(info.industry, None);
    }
}
