//! Line-item catalog.
//!
//! The catalog lists which line items are extracted from each statement. It is
//! usually loaded from a `datapoints.csv` file with one column per statement
//! (`balance_sheet`, `income_statement`, `cash_flow`); columns may have
//! different lengths, and empty cells are skipped.

use crate::error::{DataError, Result};
use crate::statement::StatementKind;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// Ordered line-item names per statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemCatalog {
    /// Balance sheet line items.
    pub balance_sheet: Vec<String>,

    /// Income statement line items.
    pub income_statement: Vec<String>,

    /// Cash flow line items.
    pub cash_flow: Vec<String>,
}

impl LineItemCatalog {
    /// Create a catalog from the three lists.
    ///
    /// Duplicates inside one list are dropped, keeping the first occurrence.
    pub fn new(
        balance_sheet: Vec<String>,
        income_statement: Vec<String>,
        cash_flow: Vec<String>,
    ) -> Self {
        Self {
            balance_sheet: distinct(balance_sheet),
            income_statement: distinct(income_statement),
            cash_flow: distinct(cash_flow),
        }
    }

    /// Line items for one statement.
    pub fn items(&self, kind: StatementKind) -> &[String] {
        match kind {
            StatementKind::BalanceSheet => &self.balance_sheet,
            StatementKind::IncomeStatement => &self.income_statement,
            StatementKind::CashFlow => &self.cash_flow,
        }
    }

    /// Union of all line items, in first-appearance order across
    /// balance sheet, income statement and cash flow.
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        for kind in StatementKind::all() {
            for item in self.items(kind) {
                if !columns.contains(item) {
                    columns.push(item.clone());
                }
            }
        }
        columns
    }

    /// Names listed under more than one statement.
    pub fn shared_items(&self) -> Vec<String> {
        self.columns()
            .into_iter()
            .filter(|name| {
                StatementKind::all()
                    .iter()
                    .filter(|&&k| self.items(k).contains(name))
                    .count()
                    > 1
            })
            .collect()
    }

    /// Total number of catalog entries across all statements.
    pub fn len(&self) -> usize {
        self.balance_sheet.len() + self.income_statement.len() + self.cash_flow.len()
    }

    /// Whether the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parse a catalog from CSV.
    ///
    /// Columns other than the three statement keys are ignored. At least one
    /// statement column must be present.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = rdr.headers()?.clone();

        let positions: Vec<Option<usize>> = StatementKind::all()
            .iter()
            .map(|k| headers.iter().position(|h| h.trim() == k.key()))
            .collect();
        if positions.iter().all(Option::is_none) {
            return Err(DataError::Config(
                "line-item catalog has none of the columns balance_sheet, income_statement, cash_flow"
                    .to_string(),
            ));
        }

        let mut lists: [Vec<String>; 3] = Default::default();
        for record in rdr.records() {
            let record = record?;
            for (list, position) in lists.iter_mut().zip(&positions) {
                if let Some(cell) = (*position).and_then(|p| record.get(p)) {
                    let cell = cell.trim();
                    if !cell.is_empty() {
                        list.push(cell.to_string());
                    }
                }
            }
        }

        let [balance_sheet, income_statement, cash_flow] = lists;
        Ok(Self::new(balance_sheet, income_statement, cash_flow))
    }

    /// Load a catalog from a CSV file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }
}

impl Default for LineItemCatalog {
    fn default() -> Self {
        let owned = |items: &[&str]| -> Vec<String> {
            items.iter().map(|s| (*s).to_string()).collect()
        };
        Self::new(
            owned(&[
                "Total Assets",
                "Current Assets",
                "Current Liabilities",
                "Inventory",
                "Cash And Cash Equivalents",
                "Total Debt",
                "Stockholders Equity",
            ]),
            owned(&[
                "Total Revenue",
                "Gross Profit",
                "EBIT",
                "Interest Expense",
                "Net Income",
                "Basic EPS",
            ]),
            owned(&[
                "Operating Cash Flow",
                "Capital Expenditure",
                "Free Cash Flow",
            ]),
        )
    }
}

fn distinct(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
