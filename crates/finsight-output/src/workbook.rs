//! Spreadsheet export.
//!
//! Several [`Tabulation`]s become named sheets of one `.xlsx` workbook. The
//! header row is bold; missing cells are left blank.

use crate::export::{Cell, ExportError, Tabulation};
use rust_xlsxwriter::{Format, Workbook, XlsxError};

/// Encode sheets as an `.xlsx` workbook, in the given order.
///
/// # Errors
///
/// Returns an error for an invalid or duplicate sheet name, or a table
/// beyond the spreadsheet row and column limits.
pub fn workbook_bytes(sheets: &[(&str, Tabulation)]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    for (name, table) in sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(*name)?;

        for (col, title) in table.header.iter().enumerate() {
            sheet.write_string_with_format(0, column(col)?, title, &bold)?;
        }

        for (i, cells) in table.rows.iter().enumerate() {
            let row = u32::try_from(i + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
            for (col, cell) in cells.iter().enumerate() {
                let col = column(col)?;
                match cell {
                    Cell::Int(v) => {
                        sheet.write_number(row, col, *v as f64)?;
                    }
                    Cell::Number(v) => {
                        sheet.write_number(row, col, *v)?;
                    }
                    Cell::Text(s) => {
                        sheet.write_string(row, col, s)?;
                    }
                    Cell::Empty => {}
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn column(index: usize) -> Result<u16, XlsxError> {
    u16::try_from(index).map_err(|_| XlsxError::RowColumnLimitError)
}
