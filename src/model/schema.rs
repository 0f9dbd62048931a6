//! Column metadata and data type semantics

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::table::CellValue;
use crate::error::{DiffError, Result};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// Data type of a column, selecting how its values are compared
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    Unknown,
    Bool,
    Integer,
    Decimal,
    String,
    Date,
    Timestamp,
}

impl DataType {
    /// Widen the type to accommodate another observed type
    pub fn widen(self, other: DataType) -> DataType {
        if self == other {
            return self;
        }

        match (self, other) {
            (DataType::Unknown, t) | (t, DataType::Unknown) => t,
            (DataType::Integer, DataType::Decimal) | (DataType::Decimal, DataType::Integer) => {
                DataType::Decimal
            }
            (DataType::Date, DataType::Timestamp) | (DataType::Timestamp, DataType::Date) => {
                DataType::Timestamp
            }
            _ => DataType::String,
        }
    }

    /// Type used to compare a column declared as `self` in the expected table
    /// and as `actual` in the actual table. `None` means the types are incompatible.
    pub fn comparison_type(self, actual: DataType) -> Option<DataType> {
        match (self, actual) {
            (a, b) if a == b => Some(a),
            (DataType::Unknown, t) | (t, DataType::Unknown) => Some(t),
            (DataType::Integer, DataType::Decimal) | (DataType::Decimal, DataType::Integer) => {
                Some(DataType::Decimal)
            }
            (DataType::Date, DataType::Timestamp) | (DataType::Timestamp, DataType::Date) => {
                Some(DataType::Timestamp)
            }
            _ => None,
        }
    }

    /// The type a single value would be inferred as
    pub fn of(value: &CellValue) -> DataType {
        match value {
            CellValue::Null => DataType::Unknown,
            CellValue::Bool(_) => DataType::Bool,
            CellValue::Int(_) => DataType::Integer,
            CellValue::Float(_) => DataType::Decimal,
            CellValue::String(_) => DataType::String,
            CellValue::Date(_) => DataType::Date,
            CellValue::DateTime(_) => DataType::Timestamp,
        }
    }

    /// Order two values under this type's semantics.
    ///
    /// Both values are cast to the type first, so `Int(1)` and `String("1")` are
    /// equal as integers and a date compares equal to midnight of the same day
    /// as a timestamp. Nulls sort before every other value.
    pub fn compare(self, expected: &CellValue, actual: &CellValue) -> Result<Ordering> {
        match (expected.is_null(), actual.is_null()) {
            (true, true) => return Ok(Ordering::Equal),
            (true, false) => return Ok(Ordering::Less),
            (false, true) => return Ok(Ordering::Greater),
            (false, false) => {}
        }

        let ordering = match self {
            DataType::Unknown => {
                if expected == actual {
                    Ordering::Equal
                } else {
                    expected.display().cmp(&actual.display())
                }
            }
            DataType::String => expected.display().cmp(&actual.display()),
            DataType::Bool => self.to_bool(expected)?.cmp(&self.to_bool(actual)?),
            DataType::Integer => self.to_i64(expected)?.cmp(&self.to_i64(actual)?),
            DataType::Decimal => compare_f64(self.to_f64(expected)?, self.to_f64(actual)?),
            DataType::Date => self.to_date(expected)?.cmp(&self.to_date(actual)?),
            DataType::Timestamp => self.to_datetime(expected)?.cmp(&self.to_datetime(actual)?),
        };
        Ok(ordering)
    }

    fn cast_error(self, value: &CellValue) -> DiffError {
        DiffError::type_cast(value.display(), self)
    }

    fn to_bool(self, value: &CellValue) -> Result<bool> {
        match value {
            CellValue::Bool(b) => Ok(*b),
            CellValue::Int(0) => Ok(false),
            CellValue::Int(1) => Ok(true),
            CellValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(true),
                "false" | "no" | "0" => Ok(false),
                _ => Err(self.cast_error(value)),
            },
            _ => Err(self.cast_error(value)),
        }
    }

    fn to_i64(self, value: &CellValue) -> Result<i64> {
        match value {
            CellValue::Int(i) => Ok(*i),
            CellValue::Float(f) if f.fract() == 0.0 => Ok(*f as i64),
            CellValue::Bool(b) => Ok(i64::from(*b)),
            CellValue::String(s) => s.trim().parse().map_err(|_| self.cast_error(value)),
            _ => Err(self.cast_error(value)),
        }
    }

    fn to_f64(self, value: &CellValue) -> Result<f64> {
        value.as_f64().ok_or_else(|| self.cast_error(value))
    }

    fn to_date(self, value: &CellValue) -> Result<NaiveDate> {
        match value {
            CellValue::Date(d) => Ok(*d),
            CellValue::DateTime(dt) => Ok(dt.date()),
            CellValue::String(s) => parse_date(s.trim()).ok_or_else(|| self.cast_error(value)),
            _ => Err(self.cast_error(value)),
        }
    }

    fn to_datetime(self, value: &CellValue) -> Result<NaiveDateTime> {
        match value {
            CellValue::DateTime(dt) => Ok(*dt),
            CellValue::Date(d) => Ok(d.and_time(chrono::NaiveTime::MIN)),
            CellValue::String(s) => {
                let s = s.trim();
                parse_datetime(s)
                    .or_else(|| parse_date(s).map(|d| d.and_time(chrono::NaiveTime::MIN)))
                    .ok_or_else(|| self.cast_error(value))
            }
            _ => Err(self.cast_error(value)),
        }
    }
}

/// Numeric ordering where `0.0 == -0.0` and NaN equals NaN, sorting after every number
fn compare_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| a.is_nan().cmp(&b.is_nan()))
}

/// Parse an ISO-8601 calendar date
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Parse an ISO-8601 date and time, with `T` or space separator
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Unknown => write!(f, "unknown"),
            DataType::Bool => write!(f, "bool"),
            DataType::Integer => write!(f, "integer"),
            DataType::Decimal => write!(f, "decimal"),
            DataType::String => write!(f, "string"),
            DataType::Date => write!(f, "date"),
            DataType::Timestamp => write!(f, "timestamp"),
        }
    }
}

/// Column metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name, unique within its table
    pub name: String,
    /// Declared or inferred data type
    pub data_type: DataType,
    /// The type was guessed from the values rather than declared
    #[serde(default)]
    pub inferred: bool,
}

impl Column {
    /// Create a column with a declared type
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            inferred: false,
        }
    }

    /// Create a column whose type was guessed from its values
    pub fn inferred(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            inferred: true,
            ..Self::new(name, data_type)
        }
    }

    /// Create a column whose type is not known up front
    pub fn untyped(name: impl Into<String>) -> Self {
        Self::new(name, DataType::Unknown)
    }
}
