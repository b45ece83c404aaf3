use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar cell value carried through ingest, storage and export.
///
/// The enum uses an explicit `{type, value}` tagged layout for stable
/// persisted JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellScalar {
    /// Empty / unset cell value.
    Empty,
    /// IEEE-754 double precision number.
    Number(f64),
    /// Plain text.
    Text(String),
    /// Boolean.
    Bool(bool),
    /// Calendar date/time without an offset, as Excel stores it.
    DateTime(NaiveDateTime),
}

impl Default for CellScalar {
    fn default() -> Self {
        CellScalar::Empty
    }
}

impl CellScalar {
    /// Returns true if the value is [`CellScalar::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, CellScalar::Empty)
    }

    /// Text form used for delimited export and exact-match filtering.
    ///
    /// Integral numbers drop the trailing `.0` so values round-trip the way
    /// the original dashboard displayed them.
    pub fn display_text(&self) -> String {
        match self {
            CellScalar::Empty => String::new(),
            CellScalar::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            CellScalar::Text(s) => s.clone(),
            CellScalar::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellScalar::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

impl fmt::Display for CellScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

impl From<f64> for CellScalar {
    fn from(value: f64) -> Self {
        CellScalar::Number(value)
    }
}

impl From<bool> for CellScalar {
    fn from(value: bool) -> Self {
        CellScalar::Bool(value)
    }
}

impl From<String> for CellScalar {
    fn from(value: String) -> Self {
        CellScalar::Text(value)
    }
}

impl From<&str> for CellScalar {
    fn from(value: &str) -> Self {
        CellScalar::Text(value.to_string())
    }
}
