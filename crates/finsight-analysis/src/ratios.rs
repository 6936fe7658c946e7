//! Ratio engine.

use crate::catalog::RatioCatalog;
use crate::formula::EvalError;
use crate::period::Period;
use crate::table::FinancialTable;
use serde::Serialize;

/// A ratio cell that could not be computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatioIssue {
    /// Period of the cell.
    pub period: Period,
    /// Ratio of the cell.
    pub ratio: String,
    /// Why it has no value.
    pub error: EvalError,
}

/// Ratio values per period, most recent period first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatiosTable {
    periods: Vec<Period>,
    ratios: Vec<String>,
    rows: Vec<Vec<Option<f64>>>,
    #[serde(skip)]
    issues: Vec<RatioIssue>,
}

impl RatiosTable {
    /// Assemble a table from rows. Short rows are padded with `None`.
    pub fn from_rows(
        periods: Vec<Period>,
        ratios: Vec<String>,
        mut rows: Vec<Vec<Option<f64>>>,
    ) -> Self {
        rows.resize(periods.len(), Vec::new());
        for row in &mut rows {
            row.resize(ratios.len(), None);
        }
        Self {
            periods,
            ratios,
            rows,
            issues: Vec::new(),
        }
    }

    /// Row labels.
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// Ratio names, in catalog order.
    pub fn ratios(&self) -> &[String] {
        &self.ratios
    }

    /// Rows, parallel to [`periods`](Self::periods).
    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.rows
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Cells that could not be computed.
    pub fn issues(&self) -> &[RatioIssue] {
        &self.issues
    }

    /// Value at a row position.
    pub fn value(&self, row: usize, ratio: &str) -> Option<f64> {
        let col = self.ratios.iter().position(|r| r == ratio)?;
        self.rows.get(row)?.get(col).copied().flatten()
    }

    /// Value for a period.
    pub fn get(&self, period: Period, ratio: &str) -> Option<f64> {
        let row = self.periods.iter().position(|p| *p == period)?;
        self.value(row, ratio)
    }

    /// All values of one ratio, most recent first.
    pub fn series(&self, ratio: &str) -> Option<Vec<Option<f64>>> {
        let col = self.ratios.iter().position(|r| r == ratio)?;
        Some(self.rows.iter().map(|row| row.get(col).copied().flatten()).collect())
    }
}

/// Evaluates a [`RatioCatalog`] over financial tables.
#[derive(Debug, Clone, Default)]
pub struct RatioEngine {
    catalog: RatioCatalog,
}

impl RatioEngine {
    /// Create an engine for a catalog.
    pub const fn new(catalog: RatioCatalog) -> Self {
        Self { catalog }
    }

    /// The catalog being evaluated.
    pub const fn catalog(&self) -> &RatioCatalog {
        &self.catalog
    }

    /// Evaluate every ratio for every period of `table`.
    ///
    /// A cell whose formula cannot be evaluated is `None` and recorded as a
    /// [`RatioIssue`]; other cells are unaffected. A formula that never
    /// parsed yields an issue for every period.
    pub fn evaluate(&self, table: &FinancialTable) -> RatiosTable {
        let numeric = table.to_numeric();
        let mut rows = Vec::with_capacity(table.height());
        let mut issues = Vec::new();

        for row in numeric.iter() {
            let values = self
                .catalog
                .iter()
                .map(|definition| match definition.evaluate(&row) {
                    Ok(value) => Some(value),
                    Err(error) => {
                        tracing::warn!(
                            symbol = table.symbol(),
                            period = %row.period(),
                            ratio = %definition.name,
                            formula = %definition.source,
                            %error,
                            "ratio could not be computed"
                        );
                        issues.push(RatioIssue {
                            period: row.period(),
                            ratio: definition.name.clone(),
                            error,
                        });
                        None
                    }
                })
                .collect();
            rows.push(values);
        }

        RatiosTable {
            periods: table.periods().to_vec(),
            ratios: self.catalog.names(),
            rows,
            issues,
        }
    }
}
