//! JSON dataset parser

use std::borrow::Cow;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{bail, Context, Result};
use indexmap::IndexSet;
use serde_json::Value;

use crate::model::{parse_date, parse_datetime, CellValue, Dataset, Table};

use super::{build_table, table_name_from_path, Parser};

/// Parser for JSON files.
///
/// An object maps table names to arrays of row objects. A bare array is a
/// single table named after the file stem.
pub struct JsonParser;

impl JsonParser {
    /// Parse an already-loaded JSON document
    pub fn parse_value(&self, value: Value, default_name: &str) -> Result<Dataset> {
        let mut dataset = Dataset::new();
        match value {
            Value::Array(rows) => dataset.add_table(rows_to_table(default_name, &rows)?)?,
            Value::Object(tables) => {
                for (name, rows) in tables {
                    let Value::Array(rows) = rows else {
                        bail!("Table {} must be an array of row objects", name);
                    };
                    dataset.add_table(rows_to_table(&name, &rows)?)?;
                }
            }
            _ => bail!("JSON must be an array or object"),
        }
        Ok(dataset)
    }
}

impl Parser for JsonParser {
    fn parse(&self, path: &Path) -> Result<Dataset> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open JSON file: {}", path.display()))?;
        let reader = BufReader::new(file);

        let value: Value =
            serde_json::from_reader(reader).context("Failed to parse JSON file")?;

        self.parse_value(value, &table_name_from_path(path))
    }

    fn supports_extension(&self, ext: &str) -> bool {
        ext.eq_ignore_ascii_case("json")
    }
}

fn rows_to_table(name: &str, rows: &[Value]) -> Result<Table> {
    // Collect all unique keys across all objects to build column list
    let mut column_names: IndexSet<String> = IndexSet::new();
    for row in rows {
        let Value::Object(obj) = row else {
            bail!("Rows of table {} must be objects", name);
        };
        for key in obj.keys() {
            column_names.insert(key.clone());
        }
    }

    let rows: Vec<(Vec<CellValue>, usize)> = rows
        .iter()
        .enumerate()
        .filter_map(|(i, row)| row.as_object().map(|obj| (i, obj)))
        .map(|(i, obj)| {
            let cells = column_names
                .iter()
                .map(|key| json_value_to_cell(obj.get(key)))
                .collect();
            (cells, i + 1)
        })
        .collect();

    build_table(name, column_names.into_iter().collect(), rows)
}

fn json_value_to_cell(value: Option<&Value>) -> CellValue {
    match value {
        None | Some(Value::Null) => CellValue::Null,
        Some(Value::Bool(b)) => CellValue::Bool(*b),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                CellValue::Int(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(Cow::Owned(n.to_string()))
            }
        }
        Some(Value::String(s)) => {
            if let Some(date) = parse_date(s).filter(|d| d.to_string() == *s) {
                return CellValue::Date(date);
            }
            if let Some(dt) = parse_datetime(s) {
                return CellValue::DateTime(dt);
            }
            CellValue::String(Cow::Owned(s.clone()))
        }
        // Nested values are compared as their JSON text
        Some(nested) => CellValue::String(Cow::Owned(nested.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_of_tables() {
        let dataset = JsonParser
            .parse_value(
                json!({
                    "ACCOUNT": [
                        {"ACC_ID": 1, "ACC_NAME": "Alice"},
                        {"ACC_ID": 2, "ACC_NAME": "Bob", "ACC_OPENED": "2024-02-01"}
                    ],
                    "BRANCH": []
                }),
                "unused",
            )
            .unwrap();

        assert_eq!(dataset.table_names(), vec!["ACCOUNT", "BRANCH"]);
        let account = dataset.table("ACCOUNT").unwrap();
        assert_eq!(account.column_count(), 3);
        assert!(account.value(0, "ACC_OPENED").unwrap().is_null());
        assert!(matches!(
            account.value(1, "ACC_OPENED").unwrap(),
            CellValue::Date(_)
        ));
    }

    #[test]
    fn test_bare_array_uses_default_name() {
        let dataset = JsonParser
            .parse_value(json!([{"X_ID": 1}]), "ITEMS")
            .unwrap();
        assert_eq!(dataset.table("ITEMS").unwrap().row_count(), 1);
    }

    #[test]
    fn test_rejects_scalar_rows() {
        assert!(JsonParser.parse_value(json!({"T": [1, 2]}), "T").is_err());
    }
}
