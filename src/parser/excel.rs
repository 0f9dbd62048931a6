//! Excel workbook parser (xlsx, xls, ods): one table per sheet

use std::borrow::Cow;
use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};

use crate::model::{parse_date, parse_datetime, CellValue, Dataset, Table};

use super::{build_table, Parser};

/// Parser for Excel files
pub struct ExcelParser;

impl Parser for ExcelParser {
    fn parse(&self, path: &Path) -> Result<Dataset> {
        let mut workbook = open_workbook_auto(path)
            .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;

        let mut dataset = Dataset::new();
        for sheet_name in workbook.sheet_names() {
            let range: Range<Data> = workbook
                .worksheet_range(&sheet_name)
                .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;
            dataset.add_table(parse_range(&sheet_name, range)?)?;
        }
        Ok(dataset)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "xlsx" | "xls" | "ods" | "xlsm")
    }
}

fn parse_range(name: &str, range: Range<Data>) -> Result<Table> {
    let mut sheet_rows = range.rows();

    // First row is header; an empty sheet is an empty table
    let headers: Vec<String> = match sheet_rows.next() {
        Some(header_row) => header_row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let name = cell_to_string(cell);
                if name.is_empty() {
                    format!("Column{}", i + 1)
                } else {
                    name
                }
            })
            .collect(),
        None => Vec::new(),
    };

    let rows: Vec<(Vec<CellValue>, usize)> = sheet_rows
        .enumerate()
        .map(|(line_num, row)| {
            let cells: Vec<CellValue> = row
                .iter()
                .take(headers.len())
                .map(convert_cell)
                .collect();
            // +2 for 1-indexing and header
            (cells, line_num + 2)
        })
        .collect();

    build_table(name, headers, rows)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => format!("{}", dt),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("#{:?}", e),
    }
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::String(s) => {
            if s.trim().is_empty() {
                CellValue::Null
            } else {
                CellValue::String(Cow::Owned(s.clone()))
            }
        }
        Data::Float(f) => {
            // Check if it's actually an integer
            if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                CellValue::Int(*f as i64)
            } else {
                CellValue::Float(*f)
            }
        }
        Data::Int(i) => CellValue::Int(*i),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => {
            // calamine renders the date as ISO text
            let s = format!("{}", dt);
            if let Some(datetime) = parse_datetime(&s) {
                CellValue::DateTime(datetime)
            } else if let Some(date) = parse_date(&s) {
                CellValue::Date(date)
            } else {
                CellValue::String(Cow::Owned(s))
            }
        }
        Data::DateTimeIso(s) => {
            if let Some(dt) = parse_datetime(s) {
                CellValue::DateTime(dt)
            } else if let Some(d) = parse_date(s) {
                CellValue::Date(d)
            } else {
                CellValue::String(Cow::Owned(s.clone()))
            }
        }
        Data::DurationIso(s) => CellValue::String(Cow::Owned(s.clone())),
        Data::Error(e) => CellValue::String(Cow::Owned(format!("#{:?}", e))),
    }
}
