use std::fmt;

use crate::table::Table;

/// Geometric measurements the classification service requires,
/// in declaration order. Extra columns in an upload are ignored.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "diagonal",
    "height_left",
    "height_right",
    "margin_low",
    "margin_up",
    "length",
];

/// One or more required columns are absent from the uploaded table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    /// Missing names, in [`REQUIRED_COLUMNS`] declaration order.
    pub missing: Vec<String>,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing required column(s): {}", self.missing.join(", "))
    }
}

impl std::error::Error for SchemaError {}

/// Check that every required column is present in `table`.
///
/// Pure set-difference check: never mutates the table, never injects
/// placeholder columns. Runs once per upload, before any network IO.
pub fn validate_schema(table: &Table) -> Result<(), SchemaError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|req| !table.column_names().iter().any(|c| c == *req))
        .map(|req| req.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(SchemaError { missing })
    }
}
