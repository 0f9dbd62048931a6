//! Comparison reports and their output formats

mod json;
mod terminal;

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;
use termcolor::ColorChoice;

use crate::config::OutputFormat;
use crate::diff::{Difference, TableOutcome};
use crate::error::DiffError;

pub use json::JsonOutput;
pub use terminal::TerminalOutput;

/// Outcome of comparing one table, ready for rendering
#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    pub table: String,
    pub differences: Vec<Difference>,
    /// Structural failure that stopped the comparison of this table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl TableReport {
    pub fn is_equal(&self) -> bool {
        self.differences.is_empty() && self.failure.is_none()
    }
}

impl From<TableOutcome> for TableReport {
    fn from(outcome: TableOutcome) -> Self {
        Self {
            table: outcome.table,
            differences: outcome.differences,
            failure: outcome.failure.map(|e| e.to_string()),
        }
    }
}

/// Everything found while comparing an expected dataset with an actual one
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub expected: String,
    pub actual: String,
    pub tables: Vec<TableReport>,
    /// Failure that stopped the whole comparison, such as differing table sets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl ComparisonReport {
    pub fn new(expected: &Path, actual: &Path) -> Self {
        Self {
            expected: expected.display().to_string(),
            actual: actual.display().to_string(),
            tables: Vec::new(),
            failure: None,
        }
    }

    /// Report built from per-table outcomes of a collecting comparison
    pub fn from_outcomes(expected: &Path, actual: &Path, outcomes: Vec<TableOutcome>) -> Self {
        let mut report = Self::new(expected, actual);
        report.tables = outcomes.into_iter().map(TableReport::from).collect();
        report
    }

    /// Report for a comparison that stopped on its first discrepancy.
    ///
    /// `tables` are the compared table names in comparison order; tables after
    /// the failing one were not compared and are left out. Errors that are not
    /// discrepancies are returned unchanged.
    pub fn from_fail_fast(
        expected: &Path,
        actual: &Path,
        tables: &[String],
        result: std::result::Result<(), DiffError>,
    ) -> std::result::Result<Self, DiffError> {
        let mut report = Self::new(expected, actual);
        let clean = |name: &String| TableReport {
            table: name.clone(),
            differences: Vec::new(),
            failure: None,
        };

        let err = match result {
            Ok(()) => {
                report.tables = tables.iter().map(clean).collect();
                return Ok(report);
            }
            Err(err) if err.is_discrepancy() => err,
            Err(err) => return Err(err),
        };

        let failing_table = match &err {
            DiffError::ValueMismatch(difference) => Some(difference.expected_table.clone()),
            DiffError::ColumnMismatch(mismatch) => Some(mismatch.table.clone()),
            DiffError::IncompatibleDataTypes { table, .. } => Some(table.clone()),
            _ => None,
        };

        let Some(failing_table) = failing_table else {
            report.failure = Some(err.to_string());
            return Ok(report);
        };

        for name in tables {
            if *name != failing_table {
                report.tables.push(clean(name));
                continue;
            }
            let mut table = clean(name);
            match err {
                DiffError::ValueMismatch(difference) => table.differences.push(*difference),
                other => table.failure = Some(other.to_string()),
            }
            report.tables.push(table);
            break;
        }
        Ok(report)
    }

    /// Report for a comparison that failed before any table was compared
    pub fn failed(expected: &Path, actual: &Path, err: &DiffError) -> Self {
        let mut report = Self::new(expected, actual);
        report.failure = Some(err.to_string());
        report
    }

    /// True when any difference or structural failure was found
    pub fn has_discrepancies(&self) -> bool {
        self.failure.is_some() || self.tables.iter().any(|t| !t.is_equal())
    }

    pub fn difference_count(&self) -> usize {
        self.tables.iter().map(|t| t.differences.len()).sum()
    }
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Render a comparison report to a writer
    fn render(&self, report: &ComparisonReport, writer: &mut dyn Write) -> Result<()>;
}

/// Factory for creating output formatters
pub struct OutputFactory;

impl OutputFactory {
    /// Create an output formatter based on format type
    pub fn create(format: OutputFormat, color_choice: ColorChoice) -> Box<dyn OutputFormatter> {
        match format {
            OutputFormat::Terminal => Box::new(TerminalOutput::with_color_choice(color_choice)),
            OutputFormat::Json => Box::new(JsonOutput::new()),
        }
    }
}

/// Render a report to stdout
pub fn render_to_stdout(
    report: &ComparisonReport,
    format: OutputFormat,
    color_choice: ColorChoice,
) -> Result<()> {
    let formatter = OutputFactory::create(format, color_choice);
    let mut stdout = std::io::stdout();
    formatter.render(report, &mut stdout)
}
