//! Convenience entry points over the diff engine
//!
//! Each call resolves its inputs into tables and runs one comparison.

use anyhow::Result as AnyResult;

use crate::config::Config;
use crate::diff::{DiffEngine, FailureHandler};
use crate::error::{DiffError, Result};
use crate::model::{Dataset, Table};

/// A live connection able to run a query and return its result as a table
pub trait QueryConnection {
    fn create_query_table(&self, result_name: &str, sql: &str) -> AnyResult<Table>;
}

/// Table and dataset assertions backed by a configured [`DiffEngine`]
#[derive(Default)]
pub struct Assertion {
    engine: DiffEngine,
}

impl Assertion {
    pub fn new(config: &Config) -> Self {
        Self {
            engine: DiffEngine::new(config),
        }
    }

    pub fn with_engine(engine: DiffEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &DiffEngine {
        &self.engine
    }

    /// Every table of `expected` must equal the same-named table of `actual`
    pub fn assert_equals(&self, expected: &Dataset, actual: &Dataset) -> Result<()> {
        self.engine.assert_datasets_equal(expected, actual, None)
    }

    pub fn assert_equals_with_handler(
        &self,
        expected: &Dataset,
        actual: &Dataset,
        handler: &mut dyn FailureHandler,
    ) -> Result<()> {
        self.engine.compare_datasets(expected, actual, handler)
    }

    pub fn assert_tables_equal(&self, expected: &Table, actual: &Table) -> Result<()> {
        self.engine.assert_tables_equal(expected, actual, None)
    }

    pub fn assert_tables_equal_with_handler(
        &self,
        expected: &Table,
        actual: &Table,
        handler: &mut dyn FailureHandler,
    ) -> Result<()> {
        self.engine.compare_tables(expected, actual, handler)
    }

    /// Compare one table of two datasets with `ignore_cols` removed from both sides
    pub fn assert_equals_ignore_cols(
        &self,
        expected: &Dataset,
        actual: &Dataset,
        table_name: &str,
        ignore_cols: &[&str],
    ) -> Result<()> {
        self.assert_table_equals_ignore_cols(
            expected.table(table_name)?,
            actual.table(table_name)?,
            ignore_cols,
        )
    }

    /// Compare two tables with `ignore_cols` removed from both sides
    pub fn assert_table_equals_ignore_cols(
        &self,
        expected: &Table,
        actual: &Table,
        ignore_cols: &[&str],
    ) -> Result<()> {
        let expected = expected.without_columns(ignore_cols);
        let actual = actual.without_columns(ignore_cols);
        self.engine.assert_tables_equal(&expected, &actual, None)
    }

    /// Compare a table of `expected` with the result of running `sql` on `connection`
    pub fn assert_equals_by_query(
        &self,
        expected: &Dataset,
        connection: &dyn QueryConnection,
        sql: &str,
        table_name: &str,
        ignore_cols: &[&str],
    ) -> Result<()> {
        self.assert_table_equals_by_query(
            expected.table(table_name)?,
            connection,
            table_name,
            sql,
            ignore_cols,
        )
    }

    pub fn assert_table_equals_by_query(
        &self,
        expected: &Table,
        connection: &dyn QueryConnection,
        table_name: &str,
        sql: &str,
        ignore_cols: &[&str],
    ) -> Result<()> {
        let actual = connection
            .create_query_table(table_name, sql)
            .map_err(|source| DiffError::Query {
                table: table_name.to_string(),
                sql: sql.to_string(),
                source,
            })?;
        self.assert_table_equals_ignore_cols(expected, &actual, ignore_cols)
    }
}
