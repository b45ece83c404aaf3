//! Download rendering.
//!
//! Serializes an in-memory [`Table`] to the two download formats the
//! dashboard offers: UTF-8 comma-separated text and a single-sheet XLSX
//! workbook, both with a header row. Rendering is pure; failures surface as
//! [`ExportError`] and never produce truncated output.

use rust_xlsxwriter::{Format, Workbook};
use soxdash_model::{CellScalar, Table};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv rendering failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv buffer flush failed: {0}")]
    CsvIo(#[from] std::io::Error),
    #[error("xlsx rendering failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

/// Render a table as UTF-8 comma-separated bytes with a header row.
pub fn to_csv_bytes(table: &Table) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(CellScalar::display_text))?;
    }
    Ok(writer.into_inner().map_err(|err| err.into_error())?)
}

/// Render a table as a single-sheet XLSX workbook with a header row.
///
/// Scalar types are preserved: numbers stay numbers, booleans stay booleans,
/// and date/times are written with a datetime number format so a re-import
/// reads them back as date/times.
pub fn to_xlsx_bytes(table: &Table) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let header_format = Format::new().set_bold();
    let datetime_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    for (col, name) in table.columns().iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, name, &header_format)?;
    }

    for (r, row) in table.rows().iter().enumerate() {
        let excel_row = (r + 1) as u32;
        for (c, cell) in row.iter().enumerate() {
            let col = c as u16;
            match cell {
                CellScalar::Empty => {}
                CellScalar::Number(n) => {
                    worksheet.write_number(excel_row, col, *n)?;
                }
                CellScalar::Text(s) => {
                    worksheet.write_string(excel_row, col, s)?;
                }
                CellScalar::Bool(b) => {
                    worksheet.write_boolean(excel_row, col, *b)?;
                }
                CellScalar::DateTime(dt) => {
                    worksheet.write_datetime_with_format(excel_row, col, dt, &datetime_format)?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn csv_output_has_header_and_display_values() {
        let mut table = Table::new(vec!["MICS ID".into(), "Planned Days".into()]);
        table
            .push_row(vec!["M-1".into(), CellScalar::Number(5.0)])
            .unwrap();
        table
            .push_row(vec!["M-2".into(), CellScalar::Empty])
            .unwrap();

        let bytes = to_csv_bytes(&table).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "MICS ID,Planned Days\nM-1,5\nM-2,\n");
    }

    #[test]
    fn csv_quotes_fields_containing_commas() {
        let mut table = Table::new(vec!["BU Country/Owner".into()]);
        table.push_row(vec!["Brazil, South".into()]).unwrap();

        let text = String::from_utf8(to_csv_bytes(&table).unwrap()).unwrap();
        assert_eq!(text, "BU Country/Owner\n\"Brazil, South\"\n");
    }

    #[test]
    fn xlsx_bytes_are_a_zip_container() {
        let mut table = Table::new(vec!["A".into()]);
        table.push_row(vec!["x".into()]).unwrap();

        let bytes = to_xlsx_bytes(&table).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
