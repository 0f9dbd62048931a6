//! Cell-level comparison logic

use std::borrow::Cow;
use std::cmp::Ordering;

use log::trace;
use rustc_hash::FxHashSet;

use super::column_diff::ComparisonColumn;
use crate::error::Result;
use crate::model::{CellValue, DataType};

static NULL: CellValue = CellValue::Null;

/// Decides whether a cell comparison is skipped before any typed comparison.
///
/// `actual` is `None` when no actual row correlates with the expected row.
pub trait SkipPolicy: Send + Sync {
    fn skip(&self, column: &str, expected: &CellValue, actual: Option<&CellValue>) -> bool;
}

/// Skip policy built from configuration
#[derive(Debug, Clone, Default)]
pub struct DefaultSkipPolicy {
    ignored_columns: FxHashSet<String>,
    skip_both_null: bool,
    skip_absent_actual: bool,
}

impl DefaultSkipPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never compare these columns
    pub fn with_ignored_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Treat a null expected value and a null or absent actual value as equivalent
    pub fn with_skip_both_null(mut self, skip: bool) -> Self {
        self.skip_both_null = skip;
        self
    }

    /// Exempt cells whose expected row has no correlated actual row
    pub fn with_skip_absent_actual(mut self, skip: bool) -> Self {
        self.skip_absent_actual = skip;
        self
    }

    pub fn is_ignored(&self, column: &str) -> bool {
        self.ignored_columns.contains(column)
    }
}

impl SkipPolicy for DefaultSkipPolicy {
    fn skip(&self, column: &str, expected: &CellValue, actual: Option<&CellValue>) -> bool {
        if self.is_ignored(column) {
            return true;
        }

        match actual {
            None => self.skip_absent_actual || (self.skip_both_null && expected.is_null()),
            Some(actual) => self.skip_both_null && expected.is_null() && actual.is_null(),
        }
    }
}

/// Outcome of comparing one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Skipped,
    Equal,
    Different,
}

/// Cell comparator: skip policy first, then the column's data type semantics
pub struct ValueComparator {
    skip_policy: Box<dyn SkipPolicy>,
    ignore_case: bool,
    ignore_whitespace: bool,
    numeric_tolerance: Option<f64>,
}

impl ValueComparator {
    /// Create a new cell comparator
    pub fn new(skip_policy: impl SkipPolicy + 'static) -> Self {
        Self {
            skip_policy: Box::new(skip_policy),
            ignore_case: false,
            ignore_whitespace: false,
            numeric_tolerance: None,
        }
    }

    pub fn with_ignore_case(mut self, ignore: bool) -> Self {
        self.ignore_case = ignore;
        self
    }

    pub fn with_ignore_whitespace(mut self, ignore: bool) -> Self {
        self.ignore_whitespace = ignore;
        self
    }

    pub fn with_numeric_tolerance(mut self, tolerance: Option<f64>) -> Self {
        self.numeric_tolerance = tolerance;
        self
    }

    /// Compare an expected value with an actual one, which is `None` when absent.
    ///
    /// An absent actual value compares as null.
    pub fn compare(
        &self,
        column: &ComparisonColumn,
        expected: &CellValue,
        actual: Option<&CellValue>,
    ) -> Result<Verdict> {
        if self.skip_policy.skip(&column.name, expected, actual) {
            trace!(
                "ignoring comparison {}={} on column {}",
                expected,
                actual.map_or(Cow::Borrowed("<absent>"), |v| v.display()),
                column.name
            );
            return Ok(Verdict::Skipped);
        }

        let actual = actual.unwrap_or(&NULL);
        if self.equal(column.data_type, expected, actual)? {
            Ok(Verdict::Equal)
        } else {
            Ok(Verdict::Different)
        }
    }

    fn equal(&self, data_type: DataType, expected: &CellValue, actual: &CellValue) -> Result<bool> {
        if expected.is_null() || actual.is_null() {
            return Ok(expected.is_null() && actual.is_null());
        }

        match data_type {
            DataType::Integer | DataType::Decimal if self.numeric_tolerance.is_some() => {
                let tolerance = self.numeric_tolerance.unwrap_or_default();
                if let (Some(a), Some(b)) = (expected.as_f64(), actual.as_f64()) {
                    return Ok((a - b).abs() <= tolerance);
                }
            }
            DataType::String | DataType::Unknown if self.ignore_case || self.ignore_whitespace => {
                return Ok(self.normalize(expected) == self.normalize(actual));
            }
            _ => {}
        }

        Ok(data_type.compare(expected, actual)? == Ordering::Equal)
    }

    fn normalize(&self, value: &CellValue) -> String {
        let mut text = value.display().into_owned();
        if self.ignore_whitespace {
            text = text.trim().to_string();
        }
        if self.ignore_case {
            text = text.to_lowercase();
        }
        text
    }
}

impl Default for ValueComparator {
    fn default() -> Self {
        Self::new(DefaultSkipPolicy::default())
    }
}
