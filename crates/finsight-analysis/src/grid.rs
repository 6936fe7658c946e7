//! Ratio-by-period grids shared by sector comparison and growth.

use crate::period::Period;
use serde::Serialize;

/// Values with one row per ratio and one column per period.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RatioGrid {
    ratios: Vec<String>,
    periods: Vec<Period>,
    rows: Vec<Vec<Option<f64>>>,
}

/// Company ratio minus sector average, per ratio and period.
pub type DifferenceTable = RatioGrid;

/// Percent change against the previous period, labelled by the newer period.
pub type GrowthTable = RatioGrid;

impl RatioGrid {
    /// A grid with every cell missing.
    pub fn new(ratios: Vec<String>, periods: Vec<Period>) -> Self {
        let rows = vec![vec![None; periods.len()]; ratios.len()];
        Self {
            ratios,
            periods,
            rows,
        }
    }

    /// Assemble a grid from rows. Short rows are padded with `None`.
    pub fn from_rows(
        ratios: Vec<String>,
        periods: Vec<Period>,
        mut rows: Vec<Vec<Option<f64>>>,
    ) -> Self {
        rows.resize(ratios.len(), Vec::new());
        for row in &mut rows {
            row.resize(periods.len(), None);
        }
        Self {
            ratios,
            periods,
            rows,
        }
    }

    pub(crate) fn set(&mut self, ratio: usize, period: usize, value: Option<f64>) {
        if let Some(cell) = self.rows.get_mut(ratio).and_then(|r| r.get_mut(period)) {
            *cell = value;
        }
    }

    /// Row labels.
    pub fn ratios(&self) -> &[String] {
        &self.ratios
    }

    /// Column labels.
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// Rows, parallel to [`ratios`](Self::ratios).
    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.rows
    }

    /// Values of one ratio across periods.
    pub fn row(&self, ratio: &str) -> Option<&[Option<f64>]> {
        let index = self.ratios.iter().position(|r| r == ratio)?;
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Value for a ratio and period.
    pub fn get(&self, ratio: &str, period: Period) -> Option<f64> {
        let col = self.periods.iter().position(|p| *p == period)?;
        self.row(ratio)?.get(col).copied().flatten()
    }

    /// Whether the grid has no cells.
    pub fn is_empty(&self) -> bool {
        self.ratios.is_empty() || self.periods.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_lookup() {
        let mut grid = RatioGrid::new(
            vec!["roe".into()],
            vec![Period::new(2024), Period::new(2023)],
        );
        grid.set(0, 1, Some(2.0));
        grid.set(3, 3, Some(9.0));
        assert_eq!(grid.get("roe", Period::new(2023)), Some(2.0));
        assert_eq!(grid.get("roe", Period::new(2024)), None);
        assert_eq!(grid.get("roa", Period::new(2023)), None);
        assert!(!grid.is_empty());
        assert!(RatioGrid::default().is_empty());
    }
}
