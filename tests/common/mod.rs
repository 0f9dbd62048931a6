//! Common test utilities and helpers

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use dataassert::model::{CellValue, Column, DataType};
use dataassert::Table;

/// Temporary directory holding fixture files
pub struct TestFixture {
    pub temp_dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a CSV file from rows of fields; the first row is the header
    pub fn create_csv(&self, name: &str, data: &[Vec<&str>]) -> PathBuf {
        let path = self.root().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture dir");
        }
        let mut content = String::new();
        for row in data {
            content.push_str(&row.join(","));
            content.push('\n');
        }
        fs::write(&path, content).expect("write csv fixture");
        path
    }

    pub fn create_json(&self, name: &str, data: &serde_json::Value) -> PathBuf {
        let path = self.root().join(name);
        let content = serde_json::to_string_pretty(data).expect("serialize json fixture");
        fs::write(&path, content).expect("write json fixture");
        path
    }
}

/// ACCOUNT table with an integer id and a name
pub fn account(rows: &[(i64, &str)]) -> Table {
    Table::from_rows(
        "ACCOUNT",
        vec![
            Column::new("ACC_ID", DataType::Integer),
            Column::new("ACC_NAME", DataType::String),
        ],
        rows.iter()
            .map(|(id, name)| vec![CellValue::from(*id), CellValue::from(*name)])
            .collect(),
    )
    .expect("build ACCOUNT table")
}
