use std::fmt;

use serde::Serialize;

/// A single scalar cell: numeric measurement or free text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    /// Numeric view of the cell, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            Cell::Text(_) => None,
        }
    }

    /// A cell parsed from an empty CSV field counts as missing.
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Text(s) if s.is_empty())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(v) => write!(f, "{v}"),
            Cell::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Error building a [`Table`] from parsed rows.
#[derive(Debug)]
pub enum TableError {
    /// Two columns share a name.
    DuplicateColumn(String),
    /// A row's field count differs from the header's.
    RaggedRow { row: usize, expected: usize, found: usize },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateColumn(name) => write!(f, "duplicate column name '{name}'"),
            Self::RaggedRow { row, expected, found } => {
                write!(f, "row {row} has {found} field(s), expected {expected}")
            }
        }
    }
}

impl std::error::Error for TableError {}

/// In-memory rectangular dataset: named columns in insertion order,
/// all sharing one row count. Immutable once built.
#[derive(Debug, Clone)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Vec<Cell>>,
    n_rows: usize,
}

impl Table {
    /// Build a table from a header and row-major records.
    ///
    /// Rejects duplicate column names and rows whose width differs
    /// from the header. Zero rows is valid (header-only input).
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, TableError> {
        for (i, name) in headers.iter().enumerate() {
            if headers[..i].contains(name) {
                return Err(TableError::DuplicateColumn(name.clone()));
            }
        }

        let n_cols = headers.len();
        let n_rows = rows.len();
        let mut columns: Vec<Vec<Cell>> = vec![Vec::with_capacity(n_rows); n_cols];

        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() != n_cols {
                return Err(TableError::RaggedRow {
                    row: row_idx,
                    expected: n_cols,
                    found: row.len(),
                });
            }
            for (col, cell) in columns.iter_mut().zip(row) {
                col.push(cell);
            }
        }

        Ok(Table { names: headers, columns, n_rows })
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Borrowed view of one column's cells.
    pub fn column(&self, name: &str) -> Option<&[Cell]> {
        let idx = self.names.iter().position(|n| n == name)?;
        Some(&self.columns[idx])
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// Row `i` as borrowed cells in column order.
    pub fn row(&self, i: usize) -> Option<Vec<&Cell>> {
        if i >= self.n_rows {
            return None;
        }
        Some(self.columns.iter().map(|col| &col[i]).collect())
    }

    /// Count of missing cells across the whole table.
    pub fn missing_cells(&self) -> usize {
        self.columns
            .iter()
            .flat_map(|col| col.iter())
            .filter(|c| c.is_missing())
            .count()
    }
}
