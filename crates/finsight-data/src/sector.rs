//! Sector average reference data.
//!
//! Sector averages are one scalar per ratio per sector. They are typically
//! loaded from an `averages.csv` file shaped like:
//!
//! ```text
//! ratios,technology,healthcare
//! current_ratio,1.5,2.1
//! quick_ratio,1.2,1.7
//! ```

use crate::error::{DataError, Result};
use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

/// Sector key used when a company has no sector classification.
pub const UNKNOWN_SECTOR: &str = "n/a";

/// Normalize a sector name to its lookup key (trimmed, lowercase).
pub fn normalize_sector(raw: &str) -> String {
    let key = raw.trim().to_lowercase();
    if key.is_empty() {
        UNKNOWN_SECTOR.to_string()
    } else {
        key
    }
}

/// Per-sector averages for each ratio.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectorAverages {
    sectors: BTreeMap<String, HashMap<String, f64>>,
    ratios: Vec<String>,
}

impl SectorAverages {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the average for a ratio in a sector.
    pub fn insert(&mut self, sector: &str, ratio: &str, value: f64) {
        if !self.ratios.iter().any(|r| r == ratio) {
            self.ratios.push(ratio.to_string());
        }
        self.sectors
            .entry(normalize_sector(sector))
            .or_default()
            .insert(ratio.to_string(), value);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_average(mut self, sector: &str, ratio: &str, value: f64) -> Self {
        self.insert(sector, ratio, value);
        self
    }

    /// Average for a ratio in a sector. The sector is normalized first.
    pub fn get(&self, sector: &str, ratio: &str) -> Option<f64> {
        self.sectors
            .get(&normalize_sector(sector))
            .and_then(|averages| averages.get(ratio))
            .copied()
    }

    /// Whether the table has any averages for this sector.
    pub fn has_sector(&self, sector: &str) -> bool {
        self.sectors.contains_key(&normalize_sector(sector))
    }

    /// Sector keys, sorted.
    pub fn sectors(&self) -> impl Iterator<Item = &str> {
        self.sectors.keys().map(String::as_str)
    }

    /// Ratio names in the order they were first seen.
    pub fn ratios(&self) -> &[String] {
        &self.ratios
    }

    /// Whether the table holds no averages.
    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }

    /// Parse sector averages from CSV.
    ///
    /// The `ratios` column names the ratio on each row; every other column
    /// is a sector. Cells that do not parse as numbers are skipped.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = rdr.headers()?.clone();

        let ratio_col = headers
            .iter()
            .position(|h| matches!(h.trim(), "ratios" | "ratio"))
            .ok_or_else(|| {
                DataError::Config("sector averages need a 'ratios' column".to_string())
            })?;

        let mut table = Self::new();
        for record in rdr.records() {
            let record = record?;
            let Some(ratio) = record.get(ratio_col).map(str::trim) else {
                continue;
            };
            if ratio.is_empty() {
                continue;
            }
            for (col, sector) in headers.iter().enumerate() {
                if col == ratio_col {
                    continue;
                }
                let cell = record.get(col).unwrap_or("").trim();
                match cell.parse::<f64>() {
                    Ok(value) if value.is_finite() => table.insert(sector, ratio, value),
                    _ => {
                        tracing::debug!(sector, ratio, cell, "skipping non-numeric sector average");
                    }
                }
            }
        }
        Ok(table)
    }

    /// Load sector averages from a CSV file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }
}
