use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value::CellScalar;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("row has {got} cells but the table has {expected} columns")]
    RowWidth { got: usize, expected: usize },
    #[error("required column '{0}' is missing from the uploaded sheet")]
    MissingColumn(String),
}

/// An ordered table with named columns.
///
/// Rows always have exactly `columns.len()` cells; `push_row` enforces this
/// so downstream layers never have to handle ragged data.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellScalar>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellScalar>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, row: Vec<CellScalar>) -> Result<(), TableError> {
        if row.len() != self.columns.len() {
            return Err(TableError::RowWidth {
                got: row.len(),
                expected: self.columns.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Index of a column by normalized header match, tolerating the case and
    /// whitespace variations seen in real uploads.
    pub fn column_index(&self, header: &str) -> Option<usize> {
        let wanted = normalize_header(header);
        self.columns
            .iter()
            .position(|c| normalize_header(c) == wanted)
    }

    /// A copy containing only rows whose cell in `column` displays exactly
    /// `value`. Unknown columns yield an empty table with the same header.
    pub fn filter_eq(&self, column: &str, value: &str) -> Table {
        let mut out = Table::new(self.columns.clone());
        if let Some(idx) = self.column_index(column) {
            out.rows = self
                .rows
                .iter()
                .filter(|row| row[idx].display_text() == value)
                .cloned()
                .collect();
        }
        out
    }
}

/// Lowercase, trim, and collapse internal whitespace so `"Control  Owner "`
/// and `"control owner"` compare equal. Mirrors how the original dashboard
/// recognized header variants.
pub(crate) fn normalize_header(header: &str) -> String {
    header
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Table {
        let mut t = Table::new(vec!["MICS ID".into(), "Status".into()]);
        t.push_row(vec!["M-1".into(), "Effective".into()]).unwrap();
        t.push_row(vec!["M-2".into(), "Ineffective".into()]).unwrap();
        t
    }

    #[test]
    fn push_row_rejects_ragged_rows() {
        let mut t = Table::new(vec!["A".into()]);
        let err = t.push_row(vec![]).unwrap_err();
        assert!(matches!(err, TableError::RowWidth { got: 0, expected: 1 }));
    }

    #[test]
    fn column_index_ignores_case_and_spacing() {
        let t = sample();
        assert_eq!(t.column_index("mics  id"), Some(0));
        assert_eq!(t.column_index(" STATUS "), Some(1));
        assert_eq!(t.column_index("missing"), None);
    }

    #[test]
    fn filter_eq_matches_on_display_text() {
        let t = sample();
        let filtered = t.filter_eq("Status", "Effective");
        assert_eq!(filtered.row_count(), 1);
        assert_eq!(filtered.rows()[0][0], CellScalar::Text("M-1".into()));

        let unknown = t.filter_eq("No Such Column", "x");
        assert!(unknown.is_empty());
        assert_eq!(unknown.columns(), t.columns());
    }
}
