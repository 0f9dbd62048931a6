//! Data model for tabular data representation

mod dataset;
mod key;
mod schema;
mod table;

pub use dataset::Dataset;
pub use key::{KeyBuilder, DEFAULT_KEY_SUFFIXES};
pub use schema::{parse_date, parse_datetime, Column, DataType};
pub use table::{CellValue, Row, Table};
