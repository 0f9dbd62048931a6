//! Parquet file parser: one table per file, typed from the Arrow schema

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType as ArrowType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type,
    TimeUnit, TimestampMicrosecondType, TimestampMillisecondType, TimestampNanosecondType,
    TimestampSecondType, UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use log::debug;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::model::{CellValue, Column, DataType, Dataset, Table};

use super::{table_name_from_path, Parser};

/// Days from 0001-01-01 to 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Parser for Parquet files
pub struct ParquetParser;

impl Parser for ParquetParser {
    fn parse(&self, path: &Path) -> Result<Dataset> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open Parquet file: {}", path.display()))?;

        let builder = ParquetRecordBatchReaderBuilder::try_new(file)
            .context("Failed to create Parquet reader")?;

        let schema = builder.schema().clone();
        let reader = builder.build().context("Failed to build Parquet reader")?;

        let columns: Vec<Column> = schema
            .fields()
            .iter()
            .map(|field| Column::new(field.name().clone(), arrow_type_to_data_type(field.data_type())))
            .collect();

        let mut table = Table::new(table_name_from_path(path), columns)?;

        let mut line_num = 0usize;
        for batch_result in reader {
            let batch = batch_result.context("Failed to read Parquet batch")?;

            for row_idx in 0..batch.num_rows() {
                line_num += 1;
                let cells: Vec<CellValue> = batch
                    .columns()
                    .iter()
                    .map(|col| extract_cell_value(col, row_idx))
                    .collect();

                table.add_row(cells, line_num)?;
            }
        }
        debug!("read {} rows from {}", table.row_count(), path.display());

        Ok(Dataset::from_tables([table])?)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "parquet" | "pq")
    }
}

fn arrow_type_to_data_type(arrow_type: &ArrowType) -> DataType {
    match arrow_type {
        ArrowType::Null => DataType::Unknown,
        ArrowType::Boolean => DataType::Bool,
        ArrowType::Int8
        | ArrowType::Int16
        | ArrowType::Int32
        | ArrowType::Int64
        | ArrowType::UInt8
        | ArrowType::UInt16
        | ArrowType::UInt32
        | ArrowType::UInt64 => DataType::Integer,
        ArrowType::Float16 | ArrowType::Float32 | ArrowType::Float64 => DataType::Decimal,
        ArrowType::Date32 | ArrowType::Date64 => DataType::Date,
        ArrowType::Timestamp(_, _) => DataType::Timestamp,
        _ => DataType::String,
    }
}

fn extract_cell_value(array: &ArrayRef, row_idx: usize) -> CellValue {
    if array.is_null(row_idx) {
        return CellValue::Null;
    }

    match array.data_type() {
        ArrowType::Boolean => CellValue::Bool(array.as_boolean().value(row_idx)),
        ArrowType::Int8 => CellValue::Int(array.as_primitive::<Int8Type>().value(row_idx) as i64),
        ArrowType::Int16 => CellValue::Int(array.as_primitive::<Int16Type>().value(row_idx) as i64),
        ArrowType::Int32 => CellValue::Int(array.as_primitive::<Int32Type>().value(row_idx) as i64),
        ArrowType::Int64 => CellValue::Int(array.as_primitive::<Int64Type>().value(row_idx)),
        ArrowType::UInt8 => CellValue::Int(array.as_primitive::<UInt8Type>().value(row_idx) as i64),
        ArrowType::UInt16 => {
            CellValue::Int(array.as_primitive::<UInt16Type>().value(row_idx) as i64)
        }
        ArrowType::UInt32 => {
            CellValue::Int(array.as_primitive::<UInt32Type>().value(row_idx) as i64)
        }
        ArrowType::UInt64 => {
            let value = array.as_primitive::<UInt64Type>().value(row_idx);
            i64::try_from(value)
                .map(CellValue::Int)
                .unwrap_or_else(|_| CellValue::from(value.to_string()))
        }
        ArrowType::Float32 => {
            CellValue::Float(array.as_primitive::<Float32Type>().value(row_idx) as f64)
        }
        ArrowType::Float64 => CellValue::Float(array.as_primitive::<Float64Type>().value(row_idx)),
        ArrowType::Utf8 => CellValue::from(array.as_string::<i32>().value(row_idx)),
        ArrowType::LargeUtf8 => CellValue::from(array.as_string::<i64>().value(row_idx)),
        ArrowType::Date32 => {
            let days = array.as_primitive::<arrow::datatypes::Date32Type>().value(row_idx);
            days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
                .and_then(chrono::NaiveDate::from_num_days_from_ce_opt)
                .map(CellValue::Date)
                .unwrap_or(CellValue::Int(days as i64))
        }
        ArrowType::Timestamp(unit, _) => {
            let nanos = match unit {
                TimeUnit::Second => array
                    .as_primitive::<TimestampSecondType>()
                    .value(row_idx)
                    .checked_mul(1_000_000_000),
                TimeUnit::Millisecond => array
                    .as_primitive::<TimestampMillisecondType>()
                    .value(row_idx)
                    .checked_mul(1_000_000),
                TimeUnit::Microsecond => array
                    .as_primitive::<TimestampMicrosecondType>()
                    .value(row_idx)
                    .checked_mul(1_000),
                TimeUnit::Nanosecond => Some(
                    array
                        .as_primitive::<TimestampNanosecondType>()
                        .value(row_idx),
                ),
            };
            match nanos {
                Some(nanos) => CellValue::DateTime(
                    chrono::DateTime::from_timestamp_nanos(nanos).naive_utc(),
                ),
                None => display_value(array, row_idx),
            }
        }
        _ => display_value(array, row_idx),
    }
}

/// Fallback: Arrow's own textual rendering of the value
fn display_value(array: &ArrayRef, row_idx: usize) -> CellValue {
    match ArrayFormatter::try_new(array.as_ref(), &FormatOptions::default()) {
        Ok(formatter) => CellValue::from(formatter.value(row_idx).to_string()),
        Err(_) => CellValue::Null,
    }
}
