//! Fixture loading: builds datasets from CSV, JSON, Excel and Parquet files

mod csv;
mod excel;
mod json;
mod parquet;

use std::path::Path;

use anyhow::{bail, Result};

use crate::model::{CellValue, Column, DataType, Dataset, Table};

pub use self::csv::CsvParser;
pub use self::excel::ExcelParser;
pub use self::json::JsonParser;
pub use self::parquet::ParquetParser;

/// Trait for loading a dataset from a path
pub trait Parser: Send + Sync {
    /// Parse a file (or directory) into a Dataset
    fn parse(&self, path: &Path) -> Result<Dataset>;

    /// Check if this parser can handle the given file extension
    fn supports_extension(&self, ext: &str) -> bool;
}

/// Factory for creating parsers based on file extension
pub struct ParserFactory {
    parsers: Vec<Box<dyn Parser>>,
}

impl Default for ParserFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserFactory {
    /// Create a new parser factory with all supported parsers
    pub fn new() -> Self {
        Self {
            parsers: vec![
                Box::new(CsvParser),
                Box::new(ExcelParser),
                Box::new(JsonParser),
                Box::new(ParquetParser),
            ],
        }
    }

    /// Get a parser for the given path. Directories are read as CSV datasets.
    pub fn get_parser(&self, path: &Path) -> Result<&dyn Parser> {
        if path.is_dir() {
            return Ok(&CsvParser);
        }

        let ext = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => ext.to_lowercase(),
            None => detect_format(path).unwrap_or("csv").to_string(),
        };

        for parser in &self.parsers {
            if parser.supports_extension(&ext) {
                return Ok(parser.as_ref());
            }
        }

        bail!("Unsupported file format: {}", ext)
    }

    /// Parse a path using the appropriate parser
    pub fn parse(&self, path: &Path) -> Result<Dataset> {
        let parser = self.get_parser(path)?;
        parser.parse(path)
    }
}

/// Detect file format from content (for files without extension)
pub fn detect_format(path: &Path) -> Option<&'static str> {
    use std::fs::File;
    use std::io::Read;

    let mut file = File::open(path).ok()?;
    let mut buffer = [0u8; 512];
    let bytes_read = file.read(&mut buffer).ok()?;

    if bytes_read >= 4 {
        // Excel ZIP format (xlsx)
        if &buffer[0..4] == b"PK\x03\x04" {
            return Some("xlsx");
        }
        if &buffer[0..4] == b"PAR1" {
            return Some("parquet");
        }
        // Old Excel format (xls)
        if &buffer[0..4] == b"\xD0\xCF\x11\xE0" {
            return Some("xls");
        }
    }

    let head = String::from_utf8_lossy(&buffer[..bytes_read]);
    let trimmed = head.trim_start();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        return Some("json");
    }

    Some("csv")
}

/// Table name for a single-table file: the file stem
pub(crate) fn table_name_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("table")
        .to_string()
}

/// Build a table from header names and rows, inferring column types from the values
pub(crate) fn build_table(
    name: &str,
    headers: Vec<String>,
    rows: Vec<(Vec<CellValue>, usize)>,
) -> Result<Table> {
    let mut types = vec![DataType::Unknown; headers.len()];
    for (cells, _) in &rows {
        for (ty, cell) in types.iter_mut().zip(cells) {
            *ty = ty.widen(DataType::of(cell));
        }
    }

    let columns = headers
        .into_iter()
        .zip(types)
        .map(|(name, ty)| Column::inferred(name, ty))
        .collect();

    let mut table = Table::new(name, columns)?;
    for (cells, source_line) in rows {
        table.add_row(cells, source_line)?;
    }
    Ok(table)
}
