//! Conversion of analysis tables to polars DataFrames.
//!
//! Values are coerced to `f64`; missing cells and text that is not a number
//! become nulls.

use crate::export::ExportError;
use finsight_analysis::{FinancialTable, Period, RatioGrid, RatiosTable};
use finsight_data::Datum;
use polars::prelude::*;

/// Types that convert to a polars [`DataFrame`].
pub trait ToDataFrame {
    /// Build a DataFrame.
    ///
    /// # Errors
    ///
    /// Returns an error if polars rejects the columns, e.g. duplicate names.
    fn to_dataframe(&self) -> Result<DataFrame, ExportError>;
}

fn years(periods: &[Period]) -> Vec<i32> {
    periods.iter().map(|p| p.year()).collect()
}

impl ToDataFrame for FinancialTable {
    fn to_dataframe(&self) -> Result<DataFrame, ExportError> {
        let mut columns: Vec<Column> = Vec::with_capacity(self.width() + 1);
        columns.push(Series::new("Year".into(), years(self.periods())).into());

        for (i, name) in self.columns().iter().enumerate() {
            let values: Vec<Option<f64>> = self
                .rows()
                .iter()
                .map(|row| row.get(i).and_then(Datum::coerce))
                .collect();
            columns.push(Series::new(name.as_str().into(), values).into());
        }

        Ok(DataFrame::new(columns)?)
    }
}

impl ToDataFrame for RatiosTable {
    fn to_dataframe(&self) -> Result<DataFrame, ExportError> {
        let mut columns: Vec<Column> = Vec::with_capacity(self.ratios().len() + 1);
        columns.push(Series::new("year".into(), years(self.periods())).into());

        for (i, ratio) in self.ratios().iter().enumerate() {
            let values: Vec<Option<f64>> = self
                .rows()
                .iter()
                .map(|row| row.get(i).copied().flatten())
                .collect();
            columns.push(Series::new(ratio.as_str().into(), values).into());
        }

        Ok(DataFrame::new(columns)?)
    }
}

impl ToDataFrame for RatioGrid {
    fn to_dataframe(&self) -> Result<DataFrame, ExportError> {
        let mut columns: Vec<Column> = Vec::with_capacity(self.periods().len() + 1);
        columns.push(Series::new("ratio".into(), self.ratios().to_vec()).into());

        for (i, period) in self.periods().iter().enumerate() {
            let values: Vec<Option<f64>> = self
                .rows()
                .iter()
                .map(|row| row.get(i).copied().flatten())
                .collect();
            columns.push(Series::new(period.to_string().into(), values).into());
        }

        Ok(DataFrame::new(columns)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(df: &DataFrame) -> Vec<String> {
        df.get_column_names()
            .iter()
            .map(|n| n.as_str().to_string())
            .collect()
    }

    #[test]
    fn test_financial_table_frame() {
        let table = FinancialTable::from_rows(
            "MSFT",
            vec![Period::new(2024), Period::new(2023)],
            vec!["Total Assets".into(), "Inventory".into()],
            vec![
                vec![Datum::Number(1000.0), Datum::Text("N/A".into())],
                vec![Datum::Text("800".into()), Datum::Missing],
            ],
        );
        let df = table.to_dataframe().unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(names(&df), vec!["Year", "Total Assets", "Inventory"]);
        assert_eq!(df.column("Inventory").unwrap().null_count(), 2);
        assert_eq!(df.column("Total Assets").unwrap().null_count(), 0);
    }

    #[test]
    fn test_ratio_grid_frame() {
        let grid = RatioGrid::from_rows(
            vec!["roe".into()],
            vec![Period::new(2024), Period::new(2023)],
            vec![vec![Some(20.0), None]],
        );
        let df = grid.to_dataframe().unwrap();
        assert_eq!(df.shape(), (1, 3));
        assert_eq!(names(&df), vec!["ratio", "2024", "2023"]);
    }

    #[test]
    fn test_empty_ratios_frame() {
        let ratios = RatiosTable::from_rows(Vec::new(), vec!["roe".into()], Vec::new());
        let df = ratios.to_dataframe().unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 2);
    }
}
