//! Upload loading and validation.
//!
//! Turns uploaded `.xlsx`/`.csv` bytes into a [`Table`], enforcing the two
//! acceptance rules every upload must pass before anything touches storage:
//! at least one data row, and no more rows than the configured ceiling.
//! Only the first sheet of a workbook is read; its first row is the header.

use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader, Xlsx};
use soxdash_model::{CellScalar, Table, TableError};
use thiserror::Error;
use tracing::{info, warn};

/// Default row ceiling, overridable through configuration.
pub const DEFAULT_MAX_ROWS: usize = 100_000;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("the uploaded file contains no data rows")]
    Empty,
    #[error("the uploaded file has {rows} data rows; the limit is {max}")]
    TooManyRows { rows: usize, max: usize },
    #[error("the workbook has no sheets")]
    NoSheet,
    #[error("the file does not parse as an Excel workbook: {0}")]
    Xlsx(#[from] calamine::XlsxError),
    #[error("the file does not parse as CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("unsupported file extension '{0}' (expected .xlsx or .csv)")]
    UnsupportedExtension(String),
    #[error("failed to read upload: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Table(#[from] TableError),
}

impl IngestError {
    /// True for user-correctable failures (fix the file and retry), as
    /// opposed to unexpected I/O trouble.
    pub fn is_validation(&self) -> bool {
        !matches!(self, IngestError::Io(_))
    }
}

/// Load the first sheet of an XLSX workbook.
pub fn load_xlsx_bytes(bytes: &[u8], max_rows: usize) -> Result<Table, IngestError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(IngestError::NoSheet)??;

    let mut rows = range.rows();
    let header = rows.next().ok_or(IngestError::Empty)?;
    let columns = header_names(header);

    let mut table = Table::new(columns);
    for row in rows {
        // Excel ranges routinely include trailing blank rows; skip them
        // rather than storing empty records.
        if row.iter().all(is_blank) {
            continue;
        }
        let mut cells: Vec<CellScalar> = row.iter().map(convert_cell).collect();
        cells.resize(table.columns().len(), CellScalar::Empty);
        table.push_row(cells)?;
    }

    check_bounds(table, max_rows)
}

/// Load comma-separated text with a header row.
pub fn load_csv_bytes(bytes: &[u8], max_rows: usize) -> Result<Table, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let header = reader.headers()?.clone();
    if header.is_empty() {
        return Err(IngestError::Empty);
    }
    let columns = header
        .iter()
        .enumerate()
        .map(|(i, h)| named_or_positional(h, i))
        .collect();

    let mut table = Table::new(columns);
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        if record.len() > table.columns().len() {
            warn!(
                row = table.row_count() + 2,
                fields = record.len(),
                columns = table.columns().len(),
                "record has more fields than the header; extra fields dropped"
            );
        }
        let mut cells: Vec<CellScalar> = record.iter().map(parse_csv_field).collect();
        cells.resize(table.columns().len(), CellScalar::Empty);
        table.push_row(cells)?;
    }

    check_bounds(table, max_rows)
}

/// Load a file from disk, dispatching on its extension.
pub fn load_path(path: impl AsRef<Path>, max_rows: usize) -> Result<Table, IngestError> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let bytes = std::fs::read(path)?;
    match ext.as_str() {
        "xlsx" | "xlsm" => load_xlsx_bytes(&bytes, max_rows),
        "csv" => load_csv_bytes(&bytes, max_rows),
        other => Err(IngestError::UnsupportedExtension(other.to_string())),
    }
}

fn check_bounds(table: Table, max_rows: usize) -> Result<Table, IngestError> {
    if table.is_empty() {
        return Err(IngestError::Empty);
    }
    if table.row_count() > max_rows {
        return Err(IngestError::TooManyRows {
            rows: table.row_count(),
            max: max_rows,
        });
    }
    info!(rows = table.row_count(), columns = table.columns().len(), "loaded upload");
    Ok(table)
}

fn header_names(header: &[Data]) -> Vec<String> {
    header
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell {
            Data::Empty => named_or_positional("", i),
            other => named_or_positional(&other.to_string(), i),
        })
        .collect()
}

fn named_or_positional(name: &str, index: usize) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        format!("Column {}", index + 1)
    } else {
        trimmed.to_string()
    }
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn convert_cell(cell: &Data) -> CellScalar {
    match cell {
        Data::Empty => CellScalar::Empty,
        Data::String(s) => CellScalar::Text(s.clone()),
        Data::Float(f) => CellScalar::Number(*f),
        Data::Int(i) => CellScalar::Number(*i as f64),
        Data::Bool(b) => CellScalar::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(CellScalar::DateTime)
            .unwrap_or(CellScalar::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellScalar::Text(s.clone()),
        // Keep Excel error literals readable rather than dropping the cell.
        Data::Error(e) => CellScalar::Text(e.to_string()),
    }
}

fn parse_csv_field(field: &str) -> CellScalar {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return CellScalar::Empty;
    }
    if let Ok(n) = trimmed.parse::<f64>() {
        return CellScalar::Number(n);
    }
    match trimmed {
        "TRUE" | "True" | "true" => CellScalar::Bool(true),
        "FALSE" | "False" | "false" => CellScalar::Bool(false),
        _ => CellScalar::Text(field.to_string()),
    }
}
