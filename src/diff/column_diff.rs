//! Column alignment between expected and actual tables

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{DiffError, Result};
use crate::model::{Column, DataType, Table};

/// A column compared between two tables, with the type used to compare it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonColumn {
    pub name: String,
    pub data_type: DataType,
}

impl ComparisonColumn {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Columns present on only one side of a table comparison
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDiff {
    pub table: String,
    /// Expected columns missing from the actual table, in sorted order
    pub expected_only: Vec<String>,
    /// Actual columns missing from the expected table, in sorted order
    pub actual_only: Vec<String>,
    pub expected_count: usize,
    pub actual_count: usize,
}

impl ColumnDiff {
    pub fn has_difference(&self) -> bool {
        !self.expected_only.is_empty() || !self.actual_only.is_empty()
    }

    /// Human-readable summary of the mismatch
    pub fn message(&self) -> String {
        let mut parts = Vec::new();
        if self.expected_count != self.actual_count {
            parts.push(format!(
                "column count mismatch (expected={}, actual={})",
                self.expected_count, self.actual_count
            ));
        }
        if !self.expected_only.is_empty() {
            parts.push(format!(
                "expected columns not in actual: [{}]",
                self.expected_only.join(", ")
            ));
        }
        if !self.actual_only.is_empty() {
            parts.push(format!(
                "actual columns not in expected: [{}]",
                self.actual_only.join(", ")
            ));
        }
        format!("table {}: {}", self.table, parts.join("; "))
    }
}

/// Result of aligning the columns of two tables
#[derive(Debug, Clone)]
pub struct ColumnAlignment {
    pub table: String,
    /// Expected columns sorted by name
    pub expected: Vec<Column>,
    /// Actual columns sorted by name
    pub actual: Vec<Column>,
    pub diff: ColumnDiff,
}

impl ColumnAlignment {
    /// Resolve the comparison type of every shared column, in sorted order.
    ///
    /// Conflicting types fall back to text comparison when either side was
    /// inferred from values. Otherwise the first conflicting column fails.
    pub fn comparison_columns(&self) -> Result<Vec<ComparisonColumn>> {
        let mut columns = Vec::with_capacity(self.expected.len());
        for expected in &self.expected {
            let Some(actual) = self.actual.iter().find(|c| c.name == expected.name) else {
                continue;
            };
            let data_type = match expected.data_type.comparison_type(actual.data_type) {
                Some(data_type) => data_type,
                None if expected.inferred || actual.inferred => {
                    debug!(
                        "comparing column {} of table {} as text ({} vs {})",
                        expected.name, self.table, expected.data_type, actual.data_type
                    );
                    DataType::String
                }
                None => {
                    return Err(DiffError::IncompatibleDataTypes {
                        table: self.table.clone(),
                        column: expected.name.clone(),
                        expected: expected.data_type.to_string(),
                        actual: actual.data_type.to_string(),
                    })
                }
            };
            columns.push(ComparisonColumn::new(expected.name.clone(), data_type));
        }
        Ok(columns)
    }
}

/// Aligns the column sets of an expected and an actual table
pub trait ColumnAligner: Send + Sync {
    fn align(&self, expected: &Table, actual: &Table) -> ColumnAlignment;
}

/// Orders both column lists by name and reports names present on one side only
#[derive(Debug, Clone, Copy, Default)]
pub struct SortedColumnAligner;

impl SortedColumnAligner {
    /// Columns of a table sorted by name
    pub fn sorted_columns(table: &Table) -> Vec<Column> {
        let mut columns = table.columns().to_vec();
        columns.sort_by(|a, b| a.name.cmp(&b.name));
        columns
    }
}

impl ColumnAligner for SortedColumnAligner {
    fn align(&self, expected: &Table, actual: &Table) -> ColumnAlignment {
        let expected_columns = Self::sorted_columns(expected);
        let actual_columns = Self::sorted_columns(actual);

        let only_in = |left: &[Column], right: &[Column]| -> Vec<String> {
            left.iter()
                .filter(|l| !right.iter().any(|r| r.name == l.name))
                .map(|l| l.name.clone())
                .collect()
        };

        let diff = ColumnDiff {
            table: expected.name().to_string(),
            expected_only: only_in(&expected_columns, &actual_columns),
            actual_only: only_in(&actual_columns, &expected_columns),
            expected_count: expected_columns.len(),
            actual_count: actual_columns.len(),
        };

        ColumnAlignment {
            table: expected.name().to_string(),
            expected: expected_columns,
            actual: actual_columns,
            diff,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str, columns: &[(&str, DataType)]) -> Table {
        Table::new(
            name,
            columns.iter().map(|(n, t)| Column::new(*n, *t)).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_columns_are_sorted() {
        let expected = table("T", &[("B", DataType::String), ("A", DataType::Integer)]);
        let actual = table("T", &[("A", DataType::Integer), ("B", DataType::String)]);

        let alignment = SortedColumnAligner.align(&expected, &actual);
        assert!(!alignment.diff.has_difference());
        let names: Vec<_> = alignment.expected.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(
            alignment.comparison_columns().unwrap(),
            vec![
                ComparisonColumn::new("A", DataType::Integer),
                ComparisonColumn::new("B", DataType::String),
            ]
        );
    }

    #[test]
    fn test_column_diff() {
        let expected = table("T", &[("ACC_ID", DataType::Integer), ("ACC_NAME", DataType::String)]);
        let actual = table(
            "T",
            &[
                ("ACC_ID", DataType::Integer),
                ("ACC_NAME", DataType::String),
                ("ACC_EXTRA", DataType::String),
            ],
        );

        let diff = SortedColumnAligner.align(&expected, &actual).diff;
        assert!(diff.has_difference());
        assert!(diff.expected_only.is_empty());
        assert_eq!(diff.actual_only, vec!["ACC_EXTRA"]);
        assert!(diff.message().contains("column count mismatch (expected=2, actual=3)"));
    }

    #[test]
    fn test_comparison_type_resolution() {
        let expected = table("T", &[("A", DataType::Unknown), ("B", DataType::Integer)]);
        let actual = table("T", &[("A", DataType::Date), ("B", DataType::Decimal)]);

        let columns = SortedColumnAligner
            .align(&expected, &actual)
            .comparison_columns()
            .unwrap();
        assert_eq!(columns[0].data_type, DataType::Date);
        assert_eq!(columns[1].data_type, DataType::Decimal);
    }

    #[test]
    fn test_incompatible_types() {
        let expected = table("T", &[("A", DataType::Integer)]);
        let actual = table("T", &[("A", DataType::Bool)]);

        let err = SortedColumnAligner
            .align(&expected, &actual)
            .comparison_columns()
            .unwrap_err();
        assert!(matches!(err, DiffError::IncompatibleDataTypes { .. }));
    }

    #[test]
    fn test_inferred_type_conflict_compares_as_text() {
        let expected = Table::new("T", vec![Column::inferred("A", DataType::String)]).unwrap();
        let actual = Table::new("T", vec![Column::inferred("A", DataType::Integer)]).unwrap();

        let columns = SortedColumnAligner
            .align(&expected, &actual)
            .comparison_columns()
            .unwrap();
        assert_eq!(columns, vec![ComparisonColumn::new("A", DataType::String)]);
    }
}
