//! Statements read from CSV files on disk.
//!
//! Layout, one directory per ticker:
//!
//! ```text
//! <root>/MSFT/balance_sheet.csv
//! <root>/MSFT/income_statement.csv
//! <root>/MSFT/cash_flow.csv
//! <root>/MSFT/info.json        (optional)
//! ```
//!
//! Each statement file has line items as rows and periods as columns, most
//! recent first, which is how statements are usually exported from a data
//! vendor:
//!
//! ```text
//! ,2024-06-30,2023-06-30
//! Total Assets,512163000000,411976000000
//! Inventory,1246000000,
//! ```

use super::{CompanyInfo, StatementProvider};
use crate::error::{DataError, Result};
use crate::statement::{Datum, Statement, StatementKind};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Provider backed by a directory of exported statement files.
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    root: PathBuf,
}

impl DirectoryProvider {
    /// Create a provider rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a statement file for a symbol.
    pub fn statement_path(&self, symbol: &str, kind: StatementKind) -> PathBuf {
        self.root.join(symbol).join(format!("{}.csv", kind.key()))
    }

    /// Path of the company information file for a symbol.
    pub fn info_path(&self, symbol: &str) -> PathBuf {
        self.root.join(symbol).join("info.json")
    }
}

impl StatementProvider for DirectoryProvider {
    fn name(&self) -> &str {
        "directory"
    }

    fn statement(&self, symbol: &str, kind: StatementKind) -> Result<Statement> {
        let path = self.statement_path(symbol, kind);
        if !path.is_file() {
            return Err(DataError::StatementUnavailable {
                symbol: symbol.to_string(),
                kind,
                reason: format!("no file at {}", path.display()),
            });
        }
        let file = std::fs::File::open(&path)?;
        let statement = parse_statement_csv(kind, file)?;
        tracing::debug!(
            symbol,
            statement = %kind,
            line_items = statement.len(),
            periods = statement.period_count(),
            "loaded statement"
        );
        Ok(statement)
    }

    fn company_info(&self, symbol: &str) -> Result<CompanyInfo> {
        let path = self.info_path(symbol);
        if !path.is_file() {
            return Err(DataError::MissingData {
                symbol: symbol.to_string(),
                reason: format!("no company information at {}", path.display()),
            });
        }
        let content = std::fs::read_to_string(&path)?;
        let mut info: CompanyInfo = serde_json::from_str(&content)?;
        if info.symbol.is_empty() {
            info.symbol = symbol.to_string();
        }
        Ok(info)
    }
}

/// Parse a statement from CSV: header row of period labels (first cell is
/// ignored), then one row per line item.
///
/// Short rows are padded with missing cells. Rows without a name are skipped.
pub fn parse_statement_csv<R: Read>(kind: StatementKind, reader: R) -> Result<Statement> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    if headers.len() < 2 {
        return Err(DataError::Parse(format!(
            "{} has no period columns",
            kind.name()
        )));
    }

    let periods: Vec<String> = headers.iter().skip(1).map(|h| h.trim().to_string()).collect();
    let mut statement = Statement::new(kind, periods);

    for record in rdr.records() {
        let record = record?;
        let Some(name) = record.get(0).map(str::trim).filter(|n| !n.is_empty()) else {
            continue;
        };
        let mut values: Vec<Datum> = record.iter().skip(1).map(Datum::parse).collect();
        values.resize(statement.period_count(), Datum::Missing);
        statement.insert(name, values);
    }

    Ok(statement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const BALANCE_SHEET: &str = "\
,2024-06-30,2023-06-30,2022-06-30
Total Assets,512163000000,411976000000,364840000000
Inventory,1246000000,,3742000000
Goodwill,N/A
";

    #[test]
    fn test_parse_statement_csv() {
        let bs = parse_statement_csv(StatementKind::BalanceSheet, BALANCE_SHEET.as_bytes())
            .unwrap();
        assert_eq!(bs.periods, vec!["2024-06-30", "2023-06-30", "2022-06-30"]);
        assert_eq!(bs.len(), 3);
        assert_eq!(
            bs.value("Total Assets", 0),
            Some(&Datum::Number(512_163_000_000.0))
        );
        assert_eq!(bs.value("Inventory", 1), Some(&Datum::Missing));
        assert_eq!(bs.value("Goodwill", 0), Some(&Datum::Text("N/A".into())));
        assert_eq!(bs.value("Goodwill", 2), Some(&Datum::Missing));
    }

    #[test]
    fn test_parse_statement_without_periods() {
        let result = parse_statement_csv(StatementKind::CashFlow, "name\nFoo\n".as_bytes());
        assert!(matches!(result, Err(DataError::Parse(_))));
    }

    #[test]
    fn test_directory_provider() {
        let dir = TempDir::new().unwrap();
        let company = dir.path().join("MSFT");
        fs::create_dir_all(&company).unwrap();
        fs::write(company.join("balance_sheet.csv"), BALANCE_SHEET).unwrap();
        fs::write(
            company.join("info.json"),
            r#"{"longName":"Microsoft Corporation","sector":"Technology"}"#,
        )
        .unwrap();

        let provider = DirectoryProvider::new(dir.path());
        let statements = provider.fetch_statements("msft", 2).unwrap();
        let bs = statements.balance_sheet.as_ref().unwrap();
        assert_eq!(bs.period_count(), 2);
        assert!(statements.income_statement.is_none());
        assert!(statements.cash_flow.is_none());

        let info = provider.company_info("MSFT").unwrap();
        assert_eq!(info.symbol, "MSFT");
        assert_eq!(info.sector_key(), "technology");
    }

    #[test]
    fn test_missing_info_is_error() {
        let dir = TempDir::new().unwrap();
        let provider = DirectoryProvider::new(dir.path());
        assert!(matches!(
            provider.company_info("AAPL"),
            Err(DataError::MissingData { .. })
        ));
    }
}
