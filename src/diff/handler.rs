//! Failure handlers: how differences and column mismatches are surfaced

use super::{ColumnMismatch, Difference};
use crate::error::{DiffError, Result};

/// Receives the discrepancies found while comparing tables.
///
/// `handle` is called once per differing cell and may return an error to halt
/// the comparison, or record the difference and return `Ok(())` to continue.
/// `column_mismatch` is called once when the column sets of a table pair
/// differ; the comparison of that table always stops with the returned error.
pub trait FailureHandler {
    fn handle(&mut self, difference: Difference) -> Result<()>;

    fn column_mismatch(&mut self, mismatch: ColumnMismatch) -> DiffError;
}

/// Raises on the first difference or column mismatch
#[derive(Debug, Clone, Copy, Default)]
pub struct FailFastHandler;

impl FailureHandler for FailFastHandler {
    fn handle(&mut self, difference: Difference) -> Result<()> {
        Err(DiffError::ValueMismatch(Box::new(difference)))
    }

    fn column_mismatch(&mut self, mismatch: ColumnMismatch) -> DiffError {
        DiffError::ColumnMismatch(mismatch)
    }
}

/// Records every difference and keeps going
#[derive(Debug, Clone, Default)]
pub struct CollectingHandler {
    differences: Vec<Difference>,
    column_mismatches: Vec<ColumnMismatch>,
}

impl CollectingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Differences in the order they were reported
    pub fn differences(&self) -> &[Difference] {
        &self.differences
    }

    pub fn column_mismatches(&self) -> &[ColumnMismatch] {
        &self.column_mismatches
    }

    pub fn is_empty(&self) -> bool {
        self.differences.is_empty() && self.column_mismatches.is_empty()
    }

    pub fn into_differences(self) -> Vec<Difference> {
        self.differences
    }
}

impl FailureHandler for CollectingHandler {
    fn handle(&mut self, difference: Difference) -> Result<()> {
        self.differences.push(difference);
        Ok(())
    }

    fn column_mismatch(&mut self, mismatch: ColumnMismatch) -> DiffError {
        self.column_mismatches.push(mismatch.clone());
        DiffError::ColumnMismatch(mismatch)
    }
}
