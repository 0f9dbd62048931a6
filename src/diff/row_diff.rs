//! Row correlation between expected and actual tables

use log::debug;
use rustc_hash::FxHashMap;

use super::column_diff::ComparisonColumn;
use crate::error::Result;
use crate::model::{KeyBuilder, Table};

/// Expected-row to actual-row mapping for one table pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowCorrelation {
    key_column: Option<String>,
    matches: Vec<Option<usize>>,
}

impl RowCorrelation {
    /// Correlate expected row `i` with actual row `i`. Expected rows past the end
    /// of the actual table have no actual row.
    pub fn positional(expected_rows: usize, actual_rows: usize) -> Self {
        Self {
            key_column: None,
            matches: (0..expected_rows)
                .map(|i| (i < actual_rows).then_some(i))
                .collect(),
        }
    }

    pub fn keyed(key_column: String, matches: Vec<Option<usize>>) -> Self {
        Self {
            key_column: Some(key_column),
            matches,
        }
    }

    /// Key column used for correlation, `None` for positional alignment
    pub fn key_column(&self) -> Option<&str> {
        self.key_column.as_deref()
    }

    /// Actual row correlated with `expected_row`, `None` when there is none
    pub fn actual_row(&self, expected_row: usize) -> Option<usize> {
        self.matches.get(expected_row).copied().flatten()
    }
}

/// Finds, for each expected row, the actual row it should be compared against
pub trait RowMatcher: Send + Sync {
    fn correlate(
        &self,
        expected: &Table,
        actual: &Table,
        columns: &[ComparisonColumn],
    ) -> Result<RowCorrelation>;
}

/// Compares rows by index
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionalRowMatcher;

impl RowMatcher for PositionalRowMatcher {
    fn correlate(
        &self,
        expected: &Table,
        actual: &Table,
        _columns: &[ComparisonColumn],
    ) -> Result<RowCorrelation> {
        Ok(RowCorrelation::positional(
            expected.row_count(),
            actual.row_count(),
        ))
    }
}

/// Correlates rows by a key column derived from the comparison columns.
///
/// Key values are matched on their textual form. When several actual rows
/// share a key value, the first one in table order wins. A null key never
/// matches, on either side, so an expected row with a null key has no actual
/// row. When no key column can be derived, rows are aligned by position.
#[derive(Default)]
pub struct KeyedRowMatcher {
    keys: KeyBuilder,
}

impl KeyedRowMatcher {
    pub fn new(suffixes: Vec<String>) -> Self {
        Self {
            keys: KeyBuilder::new(suffixes),
        }
    }

    /// Key column for a table compared on `columns`, if any
    pub fn key_column(&self, columns: &[ComparisonColumn]) -> Option<String> {
        self.keys.resolve(columns.iter().map(|c| c.name.as_str()))
    }
}

impl RowMatcher for KeyedRowMatcher {
    fn correlate(
        &self,
        expected: &Table,
        actual: &Table,
        columns: &[ComparisonColumn],
    ) -> Result<RowCorrelation> {
        let Some(key_column) = self.key_column(columns) else {
            debug!(
                "no key column for table {} with suffixes {:?}, aligning rows by position",
                expected.name(),
                self.keys.suffixes()
            );
            return PositionalRowMatcher.correlate(expected, actual, columns);
        };
        debug!("correlating rows of table {} on {}", expected.name(), key_column);

        // First row per key value wins
        let mut index: FxHashMap<String, usize> = FxHashMap::default();
        for row in 0..actual.row_count() {
            let value = actual.value(row, &key_column)?;
            if !value.is_null() {
                index.entry(value.display().into_owned()).or_insert(row);
            }
        }

        let mut matches = Vec::with_capacity(expected.row_count());
        for row in 0..expected.row_count() {
            let value = expected.value(row, &key_column)?;
            let matched = if value.is_null() {
                None
            } else {
                index.get(&*value.display()).copied()
            };
            matches.push(matched);
        }

        Ok(RowCorrelation::keyed(key_column, matches))
    }
}
