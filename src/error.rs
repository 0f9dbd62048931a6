//! Error types for dataset assertions

use thiserror::Error;

use crate::diff::{ColumnMismatch, Difference};

pub type Result<T> = std::result::Result<T, DiffError>;

#[derive(Error, Debug)]
pub enum DiffError {
    /// A cell failed the value comparison and the failure handler chose to halt
    #[error("{0}")]
    ValueMismatch(Box<Difference>),

    #[error("{0}")]
    ColumnMismatch(ColumnMismatch),

    #[error("table mismatch: expected tables [{}] but got [{}]", expected.join(", "), actual.join(", "))]
    TableMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("incompatible data types in table {table}, column {column}: expected {expected}, actual {actual}")]
    IncompatibleDataTypes {
        table: String,
        column: String,
        expected: String,
        actual: String,
    },

    #[error("contract violation: {message}")]
    ContractViolation { message: String },

    #[error("no table named {name}")]
    NoSuchTable { name: String },

    #[error("no column {column} in table {table}")]
    NoSuchColumn { table: String, column: String },

    #[error("row {row} out of bounds for table {table} with {row_count} rows")]
    RowOutOfBounds {
        table: String,
        row: usize,
        row_count: usize,
    },

    #[error("duplicate column {column} in table {table}")]
    DuplicateColumn { table: String, column: String },

    #[error("duplicate table {name} in dataset")]
    DuplicateTable { name: String },

    #[error("row {row} of table {table} has {width} cells but the table has {column_count} columns")]
    RowWidth {
        table: String,
        row: usize,
        width: usize,
        column_count: usize,
    },

    #[error("cannot cast {value:?} to {data_type}")]
    TypeCast { value: String, data_type: String },

    #[error("query for table {table} failed: {sql}")]
    Query {
        table: String,
        sql: String,
        #[source]
        source: anyhow::Error,
    },
}

impl DiffError {
    pub fn contract_violation(msg: impl Into<String>) -> Self {
        Self::ContractViolation {
            message: msg.into(),
        }
    }

    pub fn no_such_table(name: impl Into<String>) -> Self {
        Self::NoSuchTable { name: name.into() }
    }

    pub fn type_cast(value: impl Into<String>, data_type: impl ToString) -> Self {
        Self::TypeCast {
            value: value.into(),
            data_type: data_type.to_string(),
        }
    }

    /// True for failures that describe the data (value or structural mismatches),
    /// false for usage errors and data access failures.
    pub fn is_discrepancy(&self) -> bool {
        matches!(
            self,
            DiffError::ValueMismatch(_)
                | DiffError::ColumnMismatch(_)
                | DiffError::TableMismatch { .. }
                | DiffError::IncompatibleDataTypes { .. }
        )
    }
}
