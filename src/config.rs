//! Configuration handling for dataassert

use std::path::PathBuf;

use crate::model::DEFAULT_KEY_SUFFIXES;

/// Output format for comparison reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

/// How expected rows are paired with actual rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowMatching {
    /// By a key column derived from the key suffixes, falling back to position
    #[default]
    Keyed,
    /// Expected row `i` against actual row `i`
    Positional,
}

/// What happens when a difference is found
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailureMode {
    /// Stop at the first difference
    FailFast,
    /// Record every difference and keep comparing
    #[default]
    Collect,
}

/// Configuration for comparisons
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the expected dataset
    pub expected_path: PathBuf,
    /// Path to the actual dataset
    pub actual_path: PathBuf,
    /// Compare only this table
    pub table: Option<String>,
    /// Candidate key column suffixes, tried in order
    pub key_suffixes: Vec<String>,
    /// Row correlation strategy
    pub row_matching: RowMatching,
    /// Columns never compared
    pub ignore_columns: Vec<String>,
    /// Treat two null values as not worth comparing
    pub skip_both_null: bool,
    /// Do not report cells of expected rows that have no correlated actual row
    pub skip_absent_actual: bool,
    /// Ignore case when comparing string values
    pub ignore_case: bool,
    /// Ignore leading/trailing whitespace in string values
    pub ignore_whitespace: bool,
    /// Tolerance for numeric comparisons
    pub numeric_tolerance: Option<f64>,
    /// Failure handling
    pub failure_mode: FailureMode,
    /// Output format
    pub output_format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            expected_path: PathBuf::new(),
            actual_path: PathBuf::new(),
            table: None,
            key_suffixes: DEFAULT_KEY_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            row_matching: RowMatching::default(),
            ignore_columns: Vec::new(),
            skip_both_null: false,
            skip_absent_actual: false,
            ignore_case: false,
            ignore_whitespace: false,
            numeric_tolerance: None,
            failure_mode: FailureMode::default(),
            output_format: OutputFormat::default(),
        }
    }
}

impl Config {
    /// Create a new Config with dataset paths
    pub fn new(expected_path: PathBuf, actual_path: PathBuf) -> Self {
        Self {
            expected_path,
            actual_path,
            ..Default::default()
        }
    }

    /// Restrict the comparison to one table
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Set candidate key suffixes. An empty list disables keyed matching.
    pub fn with_key_suffixes(mut self, suffixes: Vec<String>) -> Self {
        self.key_suffixes = suffixes;
        self
    }

    pub fn with_row_matching(mut self, row_matching: RowMatching) -> Self {
        self.row_matching = row_matching;
        self
    }

    /// Set columns to ignore
    pub fn with_ignore_columns(mut self, columns: Vec<String>) -> Self {
        self.ignore_columns = columns;
        self
    }

    pub fn with_skip_both_null(mut self, skip: bool) -> Self {
        self.skip_both_null = skip;
        self
    }

    pub fn with_skip_absent_actual(mut self, skip: bool) -> Self {
        self.skip_absent_actual = skip;
        self
    }

    /// Enable case-insensitive comparison
    pub fn with_ignore_case(mut self, ignore: bool) -> Self {
        self.ignore_case = ignore;
        self
    }

    /// Enable whitespace-insensitive comparison
    pub fn with_ignore_whitespace(mut self, ignore: bool) -> Self {
        self.ignore_whitespace = ignore;
        self
    }

    /// Set numeric tolerance for float comparisons
    pub fn with_numeric_tolerance(mut self, tolerance: f64) -> Self {
        self.numeric_tolerance = Some(tolerance);
        self
    }

    pub fn with_failure_mode(mut self, mode: FailureMode) -> Self {
        self.failure_mode = mode;
        self
    }

    /// Set output format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }
}
