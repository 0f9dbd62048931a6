//! Table equivalence engine
//!
//! Comparing two tables runs in a fixed order: align the column sets, resolve
//! the comparison type of every column, correlate expected rows with actual
//! rows, then compare each cell. Rows are visited in expected-table order and
//! columns in name order within each row, which is also the order in which
//! differences reach the [`FailureHandler`].

pub mod cell_diff;
mod column_diff;
mod handler;
mod row_diff;

use log::{debug, error};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{Config, RowMatching};
use crate::error::{DiffError, Result};
use crate::model::{CellValue, Dataset, Table};

pub use cell_diff::{DefaultSkipPolicy, SkipPolicy, ValueComparator, Verdict};
pub use column_diff::{
    ColumnAligner, ColumnAlignment, ColumnDiff, ComparisonColumn, SortedColumnAligner,
};
pub use handler::{CollectingHandler, FailFastHandler, FailureHandler};
pub use row_diff::{KeyedRowMatcher, PositionalRowMatcher, RowCorrelation, RowMatcher};

/// A single cell that differs between the expected and the actual table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Difference {
    pub expected_table: String,
    pub actual_table: String,
    /// Row index in the expected table
    pub row: usize,
    /// Correlated row index in the actual table, if any
    pub actual_row: Option<usize>,
    pub column: String,
    pub expected: CellValue,
    /// `None` when no actual row correlates with the expected row
    pub actual: Option<CellValue>,
}

impl Difference {
    /// Actual value as text, `<absent>` when there is no correlated row
    pub fn actual_display(&self) -> String {
        match &self.actual {
            Some(value) => value.display().into_owned(),
            None => "<absent>".to_string(),
        }
    }
}

impl std::fmt::Display for Difference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "value (table={}, row={}, col={}, expected={}, actual={})",
            self.expected_table,
            self.row,
            self.column,
            self.expected,
            self.actual_display()
        )
    }
}

/// Column sets of a table pair differ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMismatch {
    pub table: String,
    pub message: String,
    /// Expected column names in table order
    pub expected_columns: Vec<String>,
    /// Actual column names in table order
    pub actual_columns: Vec<String>,
}

impl std::fmt::Display for ColumnMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: expected columns [{}] but was [{}]",
            self.message,
            self.expected_columns.join(", "),
            self.actual_columns.join(", ")
        )
    }
}

/// Result of comparing one table of a dataset
#[derive(Debug)]
pub struct TableOutcome {
    pub table: String,
    pub differences: Vec<Difference>,
    /// Structural failure that stopped the comparison of this table
    pub failure: Option<DiffError>,
}

impl TableOutcome {
    pub fn is_equal(&self) -> bool {
        self.differences.is_empty() && self.failure.is_none()
    }
}

/// Main diff engine
pub struct DiffEngine {
    aligner: Box<dyn ColumnAligner>,
    row_matcher: Box<dyn RowMatcher>,
    comparator: ValueComparator,
}

impl DiffEngine {
    /// Create a new diff engine with configuration
    pub fn new(config: &Config) -> Self {
        let skip_policy = DefaultSkipPolicy::new()
            .with_ignored_columns(config.ignore_columns.iter().cloned())
            .with_skip_both_null(config.skip_both_null)
            .with_skip_absent_actual(config.skip_absent_actual);

        let comparator = ValueComparator::new(skip_policy)
            .with_ignore_case(config.ignore_case)
            .with_ignore_whitespace(config.ignore_whitespace)
            .with_numeric_tolerance(config.numeric_tolerance);

        let row_matcher: Box<dyn RowMatcher> = match config.row_matching {
            RowMatching::Keyed => Box::new(KeyedRowMatcher::new(config.key_suffixes.clone())),
            RowMatching::Positional => Box::new(PositionalRowMatcher),
        };

        Self {
            aligner: Box::new(SortedColumnAligner),
            row_matcher,
            comparator,
        }
    }

    pub fn with_column_aligner(mut self, aligner: impl ColumnAligner + 'static) -> Self {
        self.aligner = Box::new(aligner);
        self
    }

    pub fn with_row_matcher(mut self, row_matcher: impl RowMatcher + 'static) -> Self {
        self.row_matcher = Box::new(row_matcher);
        self
    }

    pub fn with_comparator(mut self, comparator: ValueComparator) -> Self {
        self.comparator = comparator;
        self
    }

    /// Compare two tables, failing fast unless a handler is supplied
    pub fn assert_tables_equal(
        &self,
        expected: &Table,
        actual: &Table,
        handler: Option<&mut dyn FailureHandler>,
    ) -> Result<()> {
        let mut fail_fast = FailFastHandler;
        let handler: &mut dyn FailureHandler = match handler {
            Some(handler) => handler,
            None => {
                debug!("no failure handler given, failing fast");
                &mut fail_fast
            }
        };
        self.compare_tables(expected, actual, handler)
    }

    /// Compare two tables, reporting to `handler`
    pub fn compare_tables(
        &self,
        expected: &Table,
        actual: &Table,
        handler: &mut dyn FailureHandler,
    ) -> Result<()> {
        if std::ptr::eq(expected, actual) {
            debug!(
                "expected and actual are the same table instance ({}), nothing to compare",
                expected.name()
            );
            return Ok(());
        }
        debug!(
            "comparing table {} ({} rows) with {} ({} rows)",
            expected.name(),
            expected.row_count(),
            actual.name(),
            actual.row_count()
        );

        let alignment = self.aligner.align(expected, actual);
        if alignment.diff.has_difference() {
            let err = handler.column_mismatch(ColumnMismatch {
                table: expected.name().to_string(),
                message: alignment.diff.message(),
                expected_columns: expected.column_names(),
                actual_columns: actual.column_names(),
            });
            error!("{}", err);
            return Err(err);
        }

        let columns = alignment.comparison_columns()?;
        self.compare_data(expected, actual, &columns, handler)
    }

    /// Compare the cells of two tables on the given columns.
    ///
    /// Every comparison column must exist in both tables.
    pub fn compare_data(
        &self,
        expected: &Table,
        actual: &Table,
        columns: &[ComparisonColumn],
        handler: &mut dyn FailureHandler,
    ) -> Result<()> {
        let mut indices = Vec::with_capacity(columns.len());
        for column in columns {
            match (
                expected.column_index(&column.name),
                actual.column_index(&column.name),
            ) {
                (Some(e), Some(a)) => indices.push((e, a)),
                _ => {
                    return Err(DiffError::contract_violation(format!(
                        "comparison column {} must exist in both {} and {}",
                        column.name,
                        expected.name(),
                        actual.name()
                    )))
                }
            }
        }

        let correlation = self.row_matcher.correlate(expected, actual, columns)?;

        for row in 0..expected.row_count() {
            let actual_row = correlation.actual_row(row);

            for (column, &(expected_idx, actual_idx)) in columns.iter().zip(&indices) {
                let expected_value = expected.value_at(row, expected_idx)?;
                let actual_value = actual_row
                    .map(|k| actual.value_at(k, actual_idx))
                    .transpose()?;

                if self.comparator.compare(column, expected_value, actual_value)?
                    == Verdict::Different
                {
                    handler.handle(Difference {
                        expected_table: expected.name().to_string(),
                        actual_table: actual.name().to_string(),
                        row,
                        actual_row,
                        column: column.name.clone(),
                        expected: expected_value.clone(),
                        actual: actual_value.cloned(),
                    })?;
                }
            }
        }

        Ok(())
    }

    /// Compare every table of two datasets, failing fast unless a handler is supplied
    pub fn assert_datasets_equal(
        &self,
        expected: &Dataset,
        actual: &Dataset,
        handler: Option<&mut dyn FailureHandler>,
    ) -> Result<()> {
        let mut fail_fast = FailFastHandler;
        let handler: &mut dyn FailureHandler = match handler {
            Some(handler) => handler,
            None => &mut fail_fast,
        };
        self.compare_datasets(expected, actual, handler)
    }

    /// Compare every table of two datasets in table name order
    pub fn compare_datasets(
        &self,
        expected: &Dataset,
        actual: &Dataset,
        handler: &mut dyn FailureHandler,
    ) -> Result<()> {
        if std::ptr::eq(expected, actual) {
            debug!("expected and actual are the same dataset instance, nothing to compare");
            return Ok(());
        }

        let names = Self::matching_table_names(expected, actual)?;
        for name in &names {
            self.compare_tables(expected.table(name)?, actual.table(name)?, handler)?;
        }
        Ok(())
    }

    /// Compare every table of two datasets concurrently, collecting all
    /// differences of each table. Outcomes are in table name order.
    ///
    /// Structural failures are kept per table; data access failures abort.
    pub fn collect_datasets(&self, expected: &Dataset, actual: &Dataset) -> Result<Vec<TableOutcome>> {
        if std::ptr::eq(expected, actual) {
            debug!("expected and actual are the same dataset instance, nothing to compare");
            return Ok(expected
                .sorted_table_names()
                .into_iter()
                .map(|table| TableOutcome {
                    table,
                    differences: Vec::new(),
                    failure: None,
                })
                .collect());
        }

        let names = Self::matching_table_names(expected, actual)?;

        names
            .par_iter()
            .map(|name| -> Result<TableOutcome> {
                let mut handler = CollectingHandler::new();
                let failure =
                    match self.compare_tables(expected.table(name)?, actual.table(name)?, &mut handler) {
                        Ok(()) => None,
                        Err(err) if err.is_discrepancy() => Some(err),
                        Err(err) => return Err(err),
                    };
                Ok(TableOutcome {
                    table: name.clone(),
                    differences: handler.into_differences(),
                    failure,
                })
            })
            .collect()
    }

    fn matching_table_names(expected: &Dataset, actual: &Dataset) -> Result<Vec<String>> {
        let expected_names = expected.sorted_table_names();
        let actual_names = actual.sorted_table_names();
        if expected_names != actual_names {
            let err = DiffError::TableMismatch {
                expected: expected_names,
                actual: actual_names,
            };
            error!("{}", err);
            return Err(err);
        }
        Ok(expected_names)
    }
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

/// Convenience function: compare two tables, failing on the first discrepancy
pub fn assert_tables_equal(expected: &Table, actual: &Table, config: &Config) -> Result<()> {
    DiffEngine::new(config).assert_tables_equal(expected, actual, None)
}
