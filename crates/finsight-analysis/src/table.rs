//! Financial table builder.
//!
//! Turns sparse per-statement data into one row per requested fiscal year
//! with one column per catalog line item. Anything the provider could not
//! supply becomes [`Datum::Missing`]; the builder never fails on data.

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::formula::{FieldSource, FieldValue};
use crate::period::Period;
use finsight_data::{Datum, LineItemCatalog, StatementKind, TickerStatements};
use serde::Serialize;
use std::collections::HashMap;

/// Raw line-item values per period, most recent period first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialTable {
    symbol: String,
    periods: Vec<Period>,
    columns: Vec<String>,
    rows: Vec<Vec<Datum>>,
}

impl FinancialTable {
    /// Assemble a table from rows. Short rows are padded with missing cells.
    pub fn from_rows(
        symbol: impl Into<String>,
        periods: Vec<Period>,
        columns: Vec<String>,
        mut rows: Vec<Vec<Datum>>,
    ) -> Self {
        rows.resize(periods.len(), Vec::new());
        for row in &mut rows {
            row.resize(columns.len(), Datum::Missing);
        }
        Self {
            symbol: symbol.into(),
            periods,
            columns,
            rows,
        }
    }

    /// Ticker symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Row labels.
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// Column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows, parallel to [`periods`](Self::periods).
    pub fn rows(&self) -> &[Vec<Datum>] {
        &self.rows
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Cell for a period and column.
    pub fn get(&self, period: Period, column: &str) -> Option<&Datum> {
        let row = self.periods.iter().position(|p| *p == period)?;
        let col = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Number of cells that are not numeric after coercion.
    pub fn missing_count(&self) -> usize {
        self.rows
            .iter()
            .flatten()
            .filter(|d| d.coerce().is_none())
            .count()
    }

    /// Coerce every cell to a number; anything non-numeric becomes `None`.
    pub fn to_numeric(&self) -> NumericTable {
        NumericTable {
            periods: self.periods.clone(),
            index: self
                .columns
                .iter()
                .enumerate()
                .map(|(i, c)| (c.clone(), i))
                .collect(),
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .map(|row| row.iter().map(Datum::coerce).collect())
                .collect(),
        }
    }
}

/// Numeric view of a [`FinancialTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct NumericTable {
    periods: Vec<Period>,
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Option<f64>>>,
}

impl NumericTable {
    /// Row labels.
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// Column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Value for a period and column.
    pub fn get(&self, period: Period, column: &str) -> Option<f64> {
        let row = self.periods.iter().position(|p| *p == period)?;
        self.row(row)?.value(column)
    }

    /// Row at a position.
    pub fn row(&self, index: usize) -> Option<NumericRow<'_>> {
        Some(NumericRow {
            period: *self.periods.get(index)?,
            index: &self.index,
            values: self.rows.get(index)?,
        })
    }

    /// Iterate over rows in order.
    pub fn iter(&self) -> impl Iterator<Item = NumericRow<'_>> {
        (0..self.rows.len()).filter_map(|i| self.row(i))
    }
}

/// One period of a [`NumericTable`], usable as a formula field source.
#[derive(Debug, Clone, Copy)]
pub struct NumericRow<'a> {
    period: Period,
    index: &'a HashMap<String, usize>,
    values: &'a [Option<f64>],
}

impl NumericRow<'_> {
    /// Period of this row.
    pub const fn period(&self) -> Period {
        self.period
    }

    /// Value of a column, `None` if missing or unknown.
    pub fn value(&self, column: &str) -> Option<f64> {
        self.index
            .get(column)
            .and_then(|&i| self.values.get(i).copied().flatten())
    }
}

impl FieldSource for NumericRow<'_> {
    fn field(&self, name: &str) -> FieldValue {
        match self.index.get(name) {
            None => FieldValue::Unknown,
            Some(&i) => match self.values.get(i).copied().flatten() {
                Some(value) => FieldValue::Present(value),
                None => FieldValue::Missing,
            },
        }
    }
}

/// Builds [`FinancialTable`]s from provider statements.
#[derive(Debug, Clone)]
pub struct TableBuilder {
    catalog: LineItemCatalog,
    config: AnalysisConfig,
}

impl TableBuilder {
    /// Create a builder for a line-item catalog.
    pub const fn new(catalog: LineItemCatalog, config: AnalysisConfig) -> Self {
        Self { catalog, config }
    }

    /// Line items extracted by this builder.
    pub const fn catalog(&self) -> &LineItemCatalog {
        &self.catalog
    }

    /// Analysis settings.
    pub const fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Build the table for the `num_years` most recent periods.
    ///
    /// Periods are `current_year - offset` for each offset. A line item is
    /// missing when its statement is unavailable, the name is not in the
    /// statement, or the statement has fewer periods than requested. When a
    /// name is listed under several statements the first non-missing value
    /// in balance sheet, income statement, cash flow order wins.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InputBounds`](crate::AnalysisError::InputBounds)
    /// if `num_years` exceeds the configured maximum.
    pub fn build(&self, statements: &TickerStatements, num_years: usize) -> Result<FinancialTable> {
        self.config.validate_years(num_years)?;

        let symbol = statements.symbol.as_str();
        let columns = self.catalog.columns();
        let index: HashMap<&str, usize> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();
        let periods = self.config.periods(num_years);

        for kind in StatementKind::all() {
            if statements.get(kind).is_none() && !self.catalog.items(kind).is_empty() {
                tracing::warn!(
                    symbol,
                    statement = %kind,
                    "statement unavailable, its line items will be missing"
                );
            }
        }

        let mut rows = Vec::with_capacity(periods.len());
        for (offset, period) in periods.iter().enumerate() {
            let mut row = vec![Datum::Missing; columns.len()];
            for kind in StatementKind::all() {
                let statement = statements.get(kind);
                for item in self.catalog.items(kind) {
                    let Some(&col) = index.get(item.as_str()) else {
                        continue;
                    };
                    match statement.and_then(|s| s.value(item, offset)) {
                        Some(datum) if !datum.is_missing() => {
                            // Text is only a placeholder until a number turns up.
                            let upgrade = datum.coerce().is_some() && row[col].coerce().is_none();
                            if row[col].is_missing() || upgrade {
                                row[col] = datum.clone();
                            }
                        }
                        _ => tracing::debug!(
                            symbol,
                            statement = %kind,
                            line_item = %item,
                            period = %period,
                            "datapoint missing"
                        ),
                    }
                }
            }
            rows.push(row);
        }

        let table = FinancialTable {
            symbol: symbol.to_string(),
            periods,
            columns,
            rows,
        };
        tracing::info!(
            symbol,
            years = table.height(),
            line_items = table.width(),
            missing = table.missing_count(),
            "built financial table"
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use finsight_data::Statement;

    fn builder(bs: &[&str], is: &[&str], cf: &[&str]) -> TableBuilder {
        let owned = |items: &[&str]| -> Vec<String> {
            items.iter().map(|s| (*s).to_string()).collect()
        };
        TableBuilder::new(
            LineItemCatalog::new(owned(bs), owned(is), owned(cf)),
            AnalysisConfig::default().with_current_year(2024),
        )
    }

    fn periods(n: usize) -> Vec<String> {
        (0..n).map(|i| (2024 - i as i32).to_string()).collect()
    }

    #[test]
    fn test_values_placed_at_their_period() {
        let bs = Statement::new(StatementKind::BalanceSheet, periods(3))
            .with_line_item("Total Assets", [300.0, 200.0, 100.0]);
        let statements = TickerStatements::new("MSFT").with_statement(bs);

        let table = builder(&["Total Assets"], &[], &[])
            .build(&statements, 3)
            .unwrap();
        assert_eq!(table.height(), 3);
        assert_eq!(
            table.periods(),
            &[Period::new(2024), Period::new(2023), Period::new(2022)]
        );
        assert_eq!(
            table.get(Period::new(2023), "Total Assets"),
            Some(&Datum::Number(200.0))
        );
    }

    #[test]
    fn test_short_statement_rows_are_missing() {
        let is = Statement::new(StatementKind::IncomeStatement, periods(2))
            .with_line_item("Net Income", [10.0, 8.0]);
        let statements = TickerStatements::new("MSFT").with_statement(is);

        let table = builder(&["Total Assets"], &["Net Income"], &[])
            .build(&statements, 4)
            .unwrap();
        assert_eq!(table.height(), 4);
        assert_eq!(table.get(Period::new(2021), "Net Income"), Some(&Datum::Missing));
        // Balance sheet was never supplied.
        assert_eq!(table.get(Period::new(2024), "Total Assets"), Some(&Datum::Missing));
        assert_eq!(table.missing_count(), 6);
    }

    #[test]
    fn test_shared_item_takes_first_available() {
        let bs = Statement::new(StatementKind::BalanceSheet, periods(1))
            .with_line_item("Shared", [Datum::Missing]);
        let cf = Statement::new(StatementKind::CashFlow, periods(1))
            .with_line_item("Shared", [7.0]);
        let statements = TickerStatements::new("X")
            .with_statement(bs)
            .with_statement(cf);

        let table = builder(&["Shared"], &[], &["Shared"])
            .build(&statements, 1)
            .unwrap();
        assert_eq!(table.columns(), &["Shared".to_string()]);
        assert_eq!(table.get(Period::new(2024), "Shared"), Some(&Datum::Number(7.0)));
    }

    #[test]
    fn test_shared_item_prefers_number_over_text() {
        let bs = Statement::new(StatementKind::BalanceSheet, periods(2))
            .with_line_item("Shared", [Datum::Text("N/A".into()), Datum::Text("n/a".into())]);
        let cf = Statement::new(StatementKind::CashFlow, periods(2))
            .with_line_item("Shared", [Datum::Number(7.0), Datum::Missing]);
        let is = Statement::new(StatementKind::IncomeStatement, periods(2))
            .with_line_item("Shared", [Datum::Number(9.0), Datum::Missing]);
        let statements = TickerStatements::new("X")
            .with_statement(bs)
            .with_statement(is)
            .with_statement(cf);

        let table = builder(&["Shared"], &["Shared"], &["Shared"])
            .build(&statements, 2)
            .unwrap();
        // Earliest number wins; text stays only when no statement has a number.
        assert_eq!(table.get(Period::new(2024), "Shared"), Some(&Datum::Number(9.0)));
        assert_eq!(
            table.get(Period::new(2023), "Shared"),
            Some(&Datum::Text("n/a".into()))
        );
    }

    #[test]
    fn test_years_out_of_bounds() {
        let result = builder(&["A"], &[], &[]).build(&TickerStatements::new("X"), 5);
        assert!(matches!(
            result,
            Err(AnalysisError::InputBounds { requested: 5, max: 4 })
        ));
    }

    #[test]
    fn test_zero_years_is_empty() {
        let table = builder(&["A"], &[], &[])
            .build(&TickerStatements::new("X"), 0)
            .unwrap();
        assert!(table.is_empty());
        assert_eq!(table.width(), 1);
    }

    #[test]
    fn test_numeric_view() {
        let table = FinancialTable::from_rows(
            "X",
            vec![Period::new(2024)],
            vec!["A".into(), "B".into(), "C".into()],
            vec![vec![Datum::Number(1.0), Datum::Text(" 2.5 ".into()), Datum::Text("N/A".into())]],
        );
        let numeric = table.to_numeric();
        let row = numeric.row(0).unwrap();
        assert_eq!(row.field("A"), FieldValue::Present(1.0));
        assert_eq!(row.field("B"), FieldValue::Present(2.5));
        assert_eq!(row.field("C"), FieldValue::Missing);
        assert_eq!(row.field("D"), FieldValue::Unknown);
        assert_eq!(numeric.get(Period::new(2024), "B"), Some(2.5));
    }
}
