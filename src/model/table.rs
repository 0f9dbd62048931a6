//! Table, Row, and Cell data structures

use std::borrow::Cow;
use std::hash::{Hash, Hasher};

use chrono::{NaiveDate, NaiveDateTime};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::schema::Column;
use crate::error::{DiffError, Result};

/// A cell value with type information
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(Cow<'static, str>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => true,
            (CellValue::Bool(a), CellValue::Bool(b)) => a == b,
            (CellValue::Int(a), CellValue::Int(b)) => a == b,
            (CellValue::Float(a), CellValue::Float(b)) => {
                // Handle NaN comparison
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (CellValue::String(a), CellValue::String(b)) => a == b,
            (CellValue::Date(a), CellValue::Date(b)) => a == b,
            (CellValue::DateTime(a), CellValue::DateTime(b)) => a == b,
            // Cross-type numeric comparison
            (CellValue::Int(a), CellValue::Float(b)) => (*a as f64) == *b,
            (CellValue::Float(a), CellValue::Int(b)) => *a == (*b as f64),
            _ => false,
        }
    }
}

impl Eq for CellValue {}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Null => {}
            CellValue::Bool(b) => b.hash(state),
            CellValue::Int(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::String(s) => s.hash(state),
            CellValue::Date(d) => d.hash(state),
            CellValue::DateTime(dt) => dt.hash(state),
        }
    }
}

impl CellValue {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Textual form of the value, used for key matching and reports
    pub fn display(&self) -> Cow<'_, str> {
        match self {
            CellValue::Null => Cow::Borrowed("NULL"),
            CellValue::Bool(b) => Cow::Owned(b.to_string()),
            CellValue::Int(i) => Cow::Owned(i.to_string()),
            CellValue::Float(f) => Cow::Owned(f.to_string()),
            CellValue::String(s) => Cow::Borrowed(s.as_ref()),
            CellValue::Date(d) => Cow::Owned(d.to_string()),
            CellValue::DateTime(dt) => Cow::Owned(dt.to_string()),
        }
    }

    /// Numeric view of the value, parsing strings
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(Cow::Owned(s.to_string()))
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(Cow::Owned(s))
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(d)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(dt)
    }
}

impl<T> From<Option<T>> for CellValue
where
    T: Into<CellValue>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Null,
        }
    }
}

/// A row in the table
#[derive(Debug, Clone)]
pub struct Row {
    /// Cell values in column order
    pub cells: Vec<CellValue>,
    /// Original line/row number in source file (1-indexed), 0 when built in memory
    pub source_line: usize,
}

impl Row {
    pub fn new(cells: Vec<CellValue>, source_line: usize) -> Self {
        Self { cells, source_line }
    }

    /// Get a cell value by column index
    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index)
    }
}

/// A named table of columns and rows.
///
/// Tables are read-only once built: the comparison engine only reads metadata
/// and values by `(row, column name)`.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl Table {
    /// Create a new empty table. Column names must be unique.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Result<Self> {
        let name = name.into();
        let mut seen = FxHashSet::default();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(DiffError::DuplicateColumn {
                    table: name,
                    column: column.name.clone(),
                });
            }
        }

        Ok(Self {
            name,
            columns,
            rows: Vec::new(),
        })
    }

    /// Build a table from in-memory rows
    pub fn from_rows(
        name: impl Into<String>,
        columns: Vec<Column>,
        rows: Vec<Vec<CellValue>>,
    ) -> Result<Self> {
        let mut table = Self::new(name, columns)?;
        for cells in rows {
            table.add_row(cells, 0)?;
        }
        Ok(table)
    }

    /// Add a row to the table. Short rows are padded with nulls.
    pub fn add_row(&mut self, mut cells: Vec<CellValue>, source_line: usize) -> Result<()> {
        if cells.len() > self.columns.len() {
            return Err(DiffError::RowWidth {
                table: self.name.clone(),
                row: self.rows.len(),
                width: cells.len(),
                column_count: self.columns.len(),
            });
        }
        cells.resize(self.columns.len(), CellValue::Null);
        self.rows.push(Row::new(cells, source_line));
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Column names in declaration order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Get column index by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Get column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Value at `(row, column)`
    pub fn value(&self, row: usize, column: &str) -> Result<&CellValue> {
        let col_idx = self
            .column_index(column)
            .ok_or_else(|| DiffError::NoSuchColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })?;
        self.value_at(row, col_idx)
    }

    /// Value at `(row, column index)`
    pub fn value_at(&self, row: usize, col_idx: usize) -> Result<&CellValue> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col_idx))
            .ok_or_else(|| DiffError::RowOutOfBounds {
                table: self.name.clone(),
                row,
                row_count: self.rows.len(),
            })
    }

    /// Copy of this table without the named columns. Unknown names are ignored.
    pub fn without_columns(&self, excluded: &[&str]) -> Table {
        let keep: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !excluded.contains(&c.name.as_str()))
            .map(|(i, _)| i)
            .collect();

        Table {
            name: self.name.clone(),
            columns: keep.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| {
                    let cells = keep.iter().map(|&i| row.cells[i].clone()).collect();
                    Row::new(cells, row.source_line)
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DataType;

    fn account() -> Table {
        Table::from_rows(
            "ACCOUNT",
            vec![
                Column::new("ACC_ID", DataType::Integer),
                Column::new("ACC_NAME", DataType::String),
            ],
            vec![
                vec![1i64.into(), "Alice".into()],
                vec![2i64.into(), "Bob".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let err = Table::new(
            "T",
            vec![Column::untyped("A"), Column::untyped("A")],
        )
        .unwrap_err();
        assert!(matches!(err, DiffError::DuplicateColumn { .. }));
    }

    #[test]
    fn test_value_access() {
        let table = account();
        assert_eq!(table.value(1, "ACC_NAME").unwrap(), &CellValue::from("Bob"));
        assert!(matches!(
            table.value(0, "MISSING"),
            Err(DiffError::NoSuchColumn { .. })
        ));
        assert!(matches!(
            table.value(5, "ACC_ID"),
            Err(DiffError::RowOutOfBounds { row: 5, .. })
        ));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let mut table = Table::new("T", vec![Column::untyped("A"), Column::untyped("B")]).unwrap();
        table.add_row(vec![1i64.into()], 2).unwrap();
        assert!(table.value(0, "B").unwrap().is_null());
        assert!(table.add_row(vec![1i64.into(), 2i64.into(), 3i64.into()], 3).is_err());
    }

    #[test]
    fn test_without_columns() {
        let table = account().without_columns(&["ACC_ID"]);
        assert_eq!(table.column_names(), vec!["ACC_NAME".to_string()]);
        assert_eq!(table.value(0, "ACC_NAME").unwrap(), &CellValue::from("Alice"));
    }
}
