//! Ratio catalog.
//!
//! Named ratio formulas, usually loaded from a `ratios.json` document:
//!
//! ```json
//! {
//!     "current_ratio": "Current Assets / Current Liabilities",
//!     "capex_ratio": { "formula": "-Capital Expenditure / Total Revenue", "label": "Capex to Sales" }
//! }
//! ```
//!
//! The order of the document's keys is the order of the ratio columns.

use crate::error::{AnalysisError, Result};
use crate::formula::{EvalError, FieldSource, Formula, FormulaError};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::io::Read;
use std::path::Path;

/// One named ratio.
///
/// A definition loaded from a catalog file keeps its formula even when it
/// does not parse; evaluating it then yields
/// [`EvalError::InvalidFormula`] for every period.
#[derive(Debug, Clone, PartialEq)]
pub struct RatioDefinition {
    /// Ratio identifier, e.g. `current_ratio`.
    pub name: String,
    /// Human-readable name used in reports.
    pub label: String,
    /// Formula text as written in the catalog.
    pub source: String,
    /// Parsed formula, or why it failed to parse.
    pub formula: std::result::Result<Formula, FormulaError>,
}

impl RatioDefinition {
    /// Parse `source` into a definition. A parse failure is kept, not raised.
    pub fn new(name: &str, source: &str, label: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            label: label.map_or_else(|| default_label(name), str::to_string),
            source: source.trim().to_string(),
            formula: Formula::parse(source),
        }
    }

    /// Whether the formula parsed.
    pub const fn is_valid(&self) -> bool {
        self.formula.is_ok()
    }

    /// Evaluate against one row of fields.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::InvalidFormula`] for a formula that never parsed,
    /// otherwise whatever [`Formula::evaluate`] reports.
    pub fn evaluate<S: FieldSource + ?Sized>(
        &self,
        fields: &S,
    ) -> std::result::Result<f64, EvalError> {
        match &self.formula {
            Ok(formula) => formula.evaluate(fields),
            Err(error) => Err(EvalError::InvalidFormula(error.clone())),
        }
    }
}

/// Ordered collection of ratio definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct RatioCatalog {
    entries: Vec<RatioDefinition>,
}

const STANDARD_RATIOS: &[(&str, &str)] = &[
    ("current_ratio", "Current Assets / Current Liabilities"),
    (
        "quick_ratio",
        "(Current Assets - Inventory) / Current Liabilities",
    ),
    ("gross_profit", "Gross Profit / Total Revenue"),
    ("net_profit", "Net Income / Total Revenue"),
    ("roa", "Net Income / Total Assets"),
    ("roe", "Net Income / Stockholders Equity"),
    ("asset_turnover", "Total Revenue / Total Assets"),
    ("debt_to_equity", "Total Debt / Stockholders Equity"),
    ("interest_cover", "EBIT / Interest Expense"),
];

/// Report label for a ratio name.
///
/// Standard ratios have fixed labels; anything else is title-cased from its
/// underscore-separated name.
pub fn default_label(name: &str) -> String {
    let known = match name {
        "current_ratio" => Some("Current Ratio"),
        "quick_ratio" => Some("Quick Ratio"),
        "gross_profit" => Some("Gross Profit"),
        "net_profit" => Some("Net Profit"),
        "roa" => Some("Return on Assets"),
        "roe" => Some("Return on Equity"),
        "asset_turnover" => Some("Asset Turnover"),
        "debt_to_equity" => Some("Debt to Equity"),
        "interest_cover" => Some("Interest Cover"),
        _ => None,
    };
    if let Some(label) = known {
        return label.to_string();
    }

    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl RatioCatalog {
    /// Create an empty catalog. [`Default`] gives the standard ratios.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add or replace a ratio. A replaced ratio keeps its position.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Formula`] if the formula does not parse.
    pub fn insert(&mut self, name: &str, formula: &str, label: Option<&str>) -> Result<()> {
        let definition = RatioDefinition::new(name, formula, label);
        if let Err(source) = &definition.formula {
            return Err(AnalysisError::Formula {
                ratio: name.to_string(),
                source: source.clone(),
            });
        }
        self.upsert(definition);
        Ok(())
    }

    fn upsert(&mut self, definition: RatioDefinition) {
        match self.entries.iter_mut().find(|d| d.name == definition.name) {
            Some(existing) => *existing = definition,
            None => self.entries.push(definition),
        }
    }

    /// Builder-style [`insert`](Self::insert) without a label.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Formula`] if the formula does not parse.
    pub fn with_ratio(mut self, name: &str, formula: &str) -> Result<Self> {
        self.insert(name, formula, None)?;
        Ok(self)
    }

    /// Parse a catalog from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Configuration`] for malformed JSON. A formula
    /// that does not parse is kept as an invalid definition and logged.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: OrderedEntries = serde_json::from_str(json)
            .map_err(|e| AnalysisError::Configuration(format!("invalid ratio catalog: {e}")))?;
        Self::from_entries(entries)
    }

    /// Parse a catalog from a JSON reader.
    ///
    /// # Errors
    ///
    /// See [`from_json_str`](Self::from_json_str).
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let entries: OrderedEntries = serde_json::from_reader(reader)
            .map_err(|e| AnalysisError::Configuration(format!("invalid ratio catalog: {e}")))?;
        Self::from_entries(entries)
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Configuration`] if the file cannot be read,
    /// otherwise see [`from_json_str`](Self::from_json_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            AnalysisError::Configuration(format!(
                "cannot read ratio catalog {}: {e}",
                path.display()
            ))
        })?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    fn from_entries(entries: OrderedEntries) -> Result<Self> {
        let mut catalog = Self::new();
        for (name, raw) in entries.0 {
            let name = name.trim();
            if name.is_empty() {
                return Err(AnalysisError::Configuration(
                    "ratio catalog contains an empty ratio name".to_string(),
                ));
            }
            let definition = match raw {
                RawRatio::Formula(formula) => RatioDefinition::new(name, &formula, None),
                RawRatio::Detailed { formula, label } => {
                    RatioDefinition::new(name, &formula, label.as_deref())
                }
            };
            if let Err(error) = &definition.formula {
                tracing::warn!(
                    ratio = %definition.name,
                    formula = %definition.source,
                    %error,
                    "ratio formula does not parse, its cells will be missing"
                );
            }
            catalog.upsert(definition);
        }
        tracing::debug!(
            ratios = catalog.len(),
            invalid = catalog.invalid().len(),
            "loaded ratio catalog"
        );
        Ok(catalog)
    }

    /// Ratio names in catalog order.
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|d| d.name.clone()).collect()
    }

    /// Look up a ratio by name.
    pub fn get(&self, name: &str) -> Option<&RatioDefinition> {
        self.entries.iter().find(|d| d.name == name)
    }

    /// Report label for a ratio, falling back to [`default_label`].
    pub fn label(&self, name: &str) -> String {
        self.get(name)
            .map_or_else(|| default_label(name), |d| d.label.clone())
    }

    /// Iterate over definitions in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &RatioDefinition> {
        self.entries.iter()
    }

    /// Number of ratios.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(ratio, field)` pairs whose field is not one of `columns`.
    ///
    /// Such ratios can never be computed against a table with these columns.
    pub fn unresolved_fields(&self, columns: &[String]) -> Vec<(String, String)> {
        self.entries
            .iter()
            .filter_map(|d| d.formula.as_ref().ok().map(|formula| (d, formula)))
            .flat_map(|(d, formula)| {
                formula
                    .fields()
                    .into_iter()
                    .filter(|field| !columns.iter().any(|c| c == field))
                    .map(|field| (d.name.clone(), field.to_string()))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Definitions whose formula did not parse.
    pub fn invalid(&self) -> Vec<&RatioDefinition> {
        self.entries.iter().filter(|d| !d.is_valid()).collect()
    }
}

impl Default for RatioCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl RatioCatalog {
    /// The nine standard ratios over Yahoo-style line-item names.
    pub fn standard() -> Self {
        let entries = STANDARD_RATIOS
            .iter()
            .map(|(name, formula)| RatioDefinition::new(name, formula, None))
            .collect();
        Self { entries }
    }
}

impl<'a> IntoIterator for &'a RatioCatalog {
    type Item = &'a RatioDefinition;
    type IntoIter = std::slice::Iter<'a, RatioDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawRatio {
    Formula(String),
    Detailed {
        formula: String,
        #[serde(default)]
        label: Option<String>,
    },
}

/// JSON object entries in document order.
struct OrderedEntries(Vec<(String, RawRatio)>);

impl<'de> Deserialize<'de> for OrderedEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = OrderedEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping ratio names to formulas")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, RawRatio>()? {
                    entries.push(entry);
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}
