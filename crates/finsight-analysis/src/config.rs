//! Analysis configuration.

use crate::error::{AnalysisError, Result};
use crate::period::Period;
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Most years of annual statements that providers reliably supply.
pub const MAX_YEARS_REQUEST: usize = 4;

/// Settings shared by the table builder and the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Fiscal year of the most recent period (offset 0).
    pub current_year: i32,
    /// Largest number of years a run may request.
    pub max_years: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            current_year: Utc::now().year(),
            max_years: MAX_YEARS_REQUEST,
        }
    }
}

impl AnalysisConfig {
    /// Set the fiscal year of the most recent period.
    pub const fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    /// Set the largest number of years a run may request.
    pub const fn with_max_years(mut self, max_years: usize) -> Self {
        self.max_years = max_years;
        self
    }

    /// Check a requested year count against `max_years`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InputBounds`] if `requested > max_years`.
    pub const fn validate_years(&self, requested: usize) -> Result<()> {
        if requested > self.max_years {
            return Err(AnalysisError::InputBounds {
                requested,
                max: self.max_years,
            });
        }
        Ok(())
    }

    /// The periods covered by a run of `years` years, most recent first.
    pub fn periods(&self, years: usize) -> Vec<Period> {
        Period::sequence(self.current_year, years)
    }
}
