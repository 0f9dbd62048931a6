//! CSV parser: a single file is one table, a directory holds one table per file

use std::borrow::Cow;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;

use crate::model::{parse_date, parse_datetime, CellValue, Dataset, Table};

use super::{build_table, table_name_from_path, Parser};

/// Parser for CSV files and directories of CSV files
pub struct CsvParser;

impl CsvParser {
    /// Parse one CSV file into a table named after the file stem
    pub fn parse_table(&self, path: &Path) -> Result<Table> {
        let file =
            File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
        let delimiter = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
            _ => b',',
        };
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(BufReader::new(file));

        // Read headers
        let headers: Vec<String> = csv_reader
            .headers()
            .context("Failed to read CSV headers")?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        // Read rows
        let mut rows = Vec::new();
        for (line_num, result) in csv_reader.records().enumerate() {
            // +2 for 1-indexing and header
            let record =
                result.with_context(|| format!("Failed to read CSV row {}", line_num + 2))?;
            let cells: Vec<CellValue> = record.iter().map(parse_cell_value).collect();
            rows.push((cells, line_num + 2));
        }

        let name = table_name_from_path(path);
        build_table(&name, headers, rows)
            .with_context(|| format!("Invalid table in {}", path.display()))
    }

    fn csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)
            .with_context(|| format!("Failed to read directory: {}", dir.display()))?
        {
            let path = entry?.path();
            let is_csv = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
            if path.is_file() && is_csv {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl Parser for CsvParser {
    fn parse(&self, path: &Path) -> Result<Dataset> {
        let mut dataset = Dataset::new();
        if path.is_dir() {
            for file in Self::csv_files(path)? {
                debug!("loading table from {}", file.display());
                dataset.add_table(self.parse_table(&file)?)?;
            }
        } else {
            dataset.add_table(self.parse_table(path)?)?;
        }
        Ok(dataset)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "csv" | "tsv" | "txt")
    }
}

/// Parse a string value into a CellValue with type inference.
///
/// Text is only typed when the typed value is written the same way, so
/// padding, leading zeros and explicit `+` signs stay part of a string value.
pub(crate) fn parse_cell_value(s: &str) -> CellValue {
    if s.is_empty() || s.eq_ignore_ascii_case("null") {
        return CellValue::Null;
    }

    if s.trim() != s {
        return CellValue::String(Cow::Owned(s.to_string()));
    }

    if s.eq_ignore_ascii_case("true") {
        return CellValue::Bool(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return CellValue::Bool(false);
    }

    if is_plain_number(s) {
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Int(i);
        }

        if let Ok(f) = s.parse::<f64>() {
            if f.is_finite() {
                return CellValue::Float(f);
            }
        }
    }

    if let Some(date) = parse_date(s) {
        if date.to_string() == s {
            return CellValue::Date(date);
        }
    }

    if let Some(dt) = parse_datetime(s) {
        return CellValue::DateTime(dt);
    }

    // Default to string
    CellValue::String(Cow::Owned(s.to_string()))
}

/// Optional minus sign, digits without a redundant leading zero, optional fraction
fn is_plain_number(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let integer_part = digits.split(['.', 'e', 'E']).next().unwrap_or_default();
    !integer_part.is_empty()
        && integer_part.bytes().all(|b| b.is_ascii_digit())
        && (integer_part == "0" || !integer_part.starts_with('0'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DataType;
    use std::io::Write;

    #[test]
    fn test_parse_cell_value() {
        assert_eq!(parse_cell_value(""), CellValue::Null);
        assert_eq!(parse_cell_value("null"), CellValue::Null);
        assert_eq!(parse_cell_value("true"), CellValue::Bool(true));
        assert_eq!(parse_cell_value("42"), CellValue::Int(42));
        assert_eq!(parse_cell_value("3.25"), CellValue::Float(3.25));
        assert!(matches!(parse_cell_value("2024-01-31"), CellValue::Date(_)));
        assert!(matches!(
            parse_cell_value("2024-01-31 10:00:00"),
            CellValue::DateTime(_)
        ));
        assert_eq!(parse_cell_value("hello"), CellValue::from("hello"));
        assert_eq!(parse_cell_value("0.5"), CellValue::Float(0.5));
        assert_eq!(parse_cell_value("-12"), CellValue::Int(-12));
    }

    #[test]
    fn test_parse_cell_value_keeps_written_form() {
        assert_eq!(parse_cell_value("007"), CellValue::from("007"));
        assert_eq!(parse_cell_value("+7"), CellValue::from("+7"));
        assert_eq!(parse_cell_value(" 7"), CellValue::from(" 7"));
        assert_eq!(parse_cell_value("Bob  "), CellValue::from("Bob  "));
        assert_eq!(parse_cell_value(".5"), CellValue::from(".5"));
        assert_eq!(parse_cell_value("2024-1-5"), CellValue::from("2024-1-5"));
    }

    #[test]
    fn test_parse_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut account = File::create(dir.path().join("ACCOUNT.csv")).unwrap();
        writeln!(account, "ACC_ID,ACC_NAME\n1,Alice\n2,Bob").unwrap();
        let mut branch = File::create(dir.path().join("BRANCH.csv")).unwrap();
        writeln!(branch, "BRA_ID,BRA_CITY\n10,Oslo").unwrap();
        File::create(dir.path().join("notes.md")).unwrap();

        let dataset = CsvParser.parse(dir.path()).unwrap();
        assert_eq!(dataset.table_names(), vec!["ACCOUNT", "BRANCH"]);

        let account = dataset.table("ACCOUNT").unwrap();
        assert_eq!(account.row_count(), 2);
        assert_eq!(account.column("ACC_ID").unwrap().data_type, DataType::Integer);
        assert_eq!(account.value(1, "ACC_NAME").unwrap(), &CellValue::from("Bob"));
    }
}
