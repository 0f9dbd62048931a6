//! dataassert - Cell-level equality assertions for tabular datasets
//!
//! Compares an expected dataset (a set of named tables) against an actual one.
//! Rows are correlated by a key column derived from the column names, or by
//! position when no key column exists, and every differing cell is reported
//! to a [`diff::FailureHandler`] that either stops at the first difference or
//! collects them all.

pub mod assertion;
pub mod config;
pub mod diff;
pub mod error;
pub mod model;
pub mod output;
pub mod parser;

pub use assertion::{Assertion, QueryConnection};
pub use config::Config;
pub use diff::{DiffEngine, Difference};
pub use error::{DiffError, Result};
pub use model::{Dataset, Table};
