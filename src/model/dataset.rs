//! Named collections of tables

use indexmap::IndexMap;

use super::table::Table;
use crate::error::{DiffError, Result};

/// A collection of uniquely named tables, kept in insertion order
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    tables: IndexMap<String, Table>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset from tables, rejecting duplicate names
    pub fn from_tables(tables: impl IntoIterator<Item = Table>) -> Result<Self> {
        let mut dataset = Self::new();
        for table in tables {
            dataset.add_table(table)?;
        }
        Ok(dataset)
    }

    pub fn add_table(&mut self, table: Table) -> Result<()> {
        if self.tables.contains_key(table.name()) {
            return Err(DiffError::DuplicateTable {
                name: table.name().to_string(),
            });
        }
        self.tables.insert(table.name().to_string(), table);
        Ok(())
    }

    /// Look up a table by name
    pub fn table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| DiffError::no_such_table(name))
    }

    /// Table names in insertion order
    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    /// Table names sorted by name
    pub fn sorted_table_names(&self) -> Vec<String> {
        let mut names = self.table_names();
        names.sort();
        names
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Dataset holding only the named table
    pub fn select(&self, name: &str) -> Result<Dataset> {
        Dataset::from_tables([self.table(name)?.clone()])
    }
}
