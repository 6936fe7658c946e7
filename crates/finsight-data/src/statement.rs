//! Financial statement model.
//!
//! A [`Statement`] is a two-dimensional view of one financial statement:
//! line items (rows) indexed by name, and periods (columns) indexed by
//! offset, where offset 0 is the most recent period.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The three annual financial statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    /// Balance sheet
    BalanceSheet,

    /// Income statement
    IncomeStatement,

    /// Cash flow statement
    CashFlow,
}

impl StatementKind {
    /// Returns all statement kinds, in table column order.
    pub const fn all() -> [Self; 3] {
        [Self::BalanceSheet, Self::IncomeStatement, Self::CashFlow]
    }

    /// Returns the human readable statement name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::BalanceSheet => "Balance Sheet",
            Self::IncomeStatement => "Income Statement",
            Self::CashFlow => "Cash Flow",
        }
    }

    /// Returns the snake_case key used for file names and catalog columns.
    pub const fn key(&self) -> &'static str {
        match self {
            Self::BalanceSheet => "balance_sheet",
            Self::IncomeStatement => "income_statement",
            Self::CashFlow => "cash_flow",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A raw statement cell as supplied by a provider.
///
/// Providers do not always hand over clean numbers, so a cell may hold text
/// that is only coerced to a number when ratios are computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Datum {
    /// A numeric value.
    Number(f64),

    /// A value that arrived as text.
    Text(String),

    /// No value.
    #[default]
    Missing,
}

impl Datum {
    /// Parse a cell from its textual form.
    ///
    /// Empty cells are missing, numeric cells become numbers and anything
    /// else is kept verbatim as text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Missing;
        }
        trimmed
            .parse::<f64>()
            .map_or_else(|_| Self::Text(trimmed.to_string()), Self::Number)
    }

    /// Coerce the cell to a finite number.
    ///
    /// Non-finite numbers and text that does not parse as a float are
    /// treated as missing.
    pub fn coerce(&self) -> Option<f64> {
        let value = match self {
            Self::Number(v) => *v,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
            Self::Missing => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Returns true if the cell holds no value at all.
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl From<f64> for Datum {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Option<f64>> for Datum {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Missing, Self::Number)
    }
}

impl From<&str> for Datum {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{}", v),
            Self::Text(s) => write!(f, "{}", s),
            Self::Missing => Ok(()),
        }
    }
}

/// One financial statement for one company.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Which statement this is.
    pub kind: StatementKind,

    /// Period labels, most recent first.
    pub periods: Vec<String>,

    rows: Vec<(String, Vec<Datum>)>,
    index: HashMap<String, usize>,
}

impl Statement {
    /// Create an empty statement with the given period labels.
    pub fn new(kind: StatementKind, periods: Vec<String>) -> Self {
        Self {
            kind,
            periods,
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Add a line item, builder style.
    pub fn with_line_item<D: Into<Datum>>(
        mut self,
        name: &str,
        values: impl IntoIterator<Item = D>,
    ) -> Self {
        self.insert(name, values.into_iter().map(Into::into).collect());
        self
    }

    /// Insert or replace a line item.
    pub fn insert(&mut self, name: &str, values: Vec<Datum>) {
        match self.index.get(name) {
            Some(&i) => self.rows[i].1 = values,
            None => {
                self.index.insert(name.to_string(), self.rows.len());
                self.rows.push((name.to_string(), values));
            }
        }
    }

    /// Number of periods this statement covers.
    pub fn period_count(&self) -> usize {
        self.periods.len()
    }

    /// Whether the statement has a line item with this exact name.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Look up a cell by line item name and period offset.
    ///
    /// Returns `None` if the name is not in the statement or the offset is
    /// beyond the periods the statement covers.
    pub fn value(&self, name: &str, offset: usize) -> Option<&Datum> {
        if offset >= self.period_count() {
            return None;
        }
        let &i = self.index.get(name)?;
        self.rows[i].1.get(offset)
    }

    /// Line items in insertion order.
    pub fn line_items(&self) -> impl Iterator<Item = (&str, &[Datum])> {
        self.rows.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    /// Number of line items.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the statement has no line items.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keep only the `max_periods` most recent periods.
    pub fn truncate(&mut self, max_periods: usize) {
        self.periods.truncate(max_periods);
        for (_, values) in &mut self.rows {
            values.truncate(max_periods);
        }
    }
}

/// The three statements supplied for one ticker.
///
/// A statement is `None` when the provider could not supply it; the other
/// statements are unaffected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickerStatements {
    /// Ticker symbol.
    pub symbol: String,

    /// Balance sheet.
    pub balance_sheet: Option<Statement>,

    /// Income statement.
    pub income_statement: Option<Statement>,

    /// Cash flow statement.
    pub cash_flow: Option<Statement>,
}

impl TickerStatements {
    /// Create an empty set of statements for a symbol.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    /// Attach a statement, builder style. The slot is chosen by its kind.
    pub fn with_statement(mut self, statement: Statement) -> Self {
        self.set(statement);
        self
    }

    /// Put a statement into the slot matching its kind.
    pub fn set(&mut self, statement: Statement) {
        let slot = match statement.kind {
            StatementKind::BalanceSheet => &mut self.balance_sheet,
            StatementKind::IncomeStatement => &mut self.income_statement,
            StatementKind::CashFlow => &mut self.cash_flow,
        };
        *slot = Some(statement);
    }

    /// Get a statement by kind.
    pub const fn get(&self, kind: StatementKind) -> Option<&Statement> {
        match kind {
            StatementKind::BalanceSheet => self.balance_sheet.as_ref(),
            StatementKind::IncomeStatement => self.income_statement.as_ref(),
            StatementKind::CashFlow => self.cash_flow.as_ref(),
        }
    }

    /// Largest period count across the available statements.
    pub fn period_count(&self) -> usize {
        StatementKind::all()
            .iter()
            .filter_map(|&k| self.get(k))
            .map(Statement::period_count)
            .max()
            .unwrap_or(0)
    }
}
