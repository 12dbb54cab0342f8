//! SQL value enum for type-safe row handling.

use std::fmt;

/// A single MySQL cell, decoded by declared column type.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(rust_decimal::Decimal),
    Text(String),
    Bytes(Vec<u8>),
    Date(chrono::NaiveDate),
    Time(chrono::NaiveTime),
    DateTime(chrono::NaiveDateTime),
}

impl fmt::Display for SqlValue {
    /// Render the cell the way it will appear in a document field.
    ///
    /// MySQL booleans are tinyint(1) under the hood, so they render as
    /// "1"/"0" rather than "true"/"false". Binary columns are rendered
    /// lossily as UTF-8.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => f.write_str("NULL"),
            SqlValue::Bool(b) => f.write_str(if *b { "1" } else { "0" }),
            SqlValue::Int(i) => write!(f, "{}", i),
            SqlValue::Float(v) => write!(f, "{}", v),
            SqlValue::Decimal(d) => write!(f, "{}", d),
            SqlValue::Text(s) => f.write_str(s),
            SqlValue::Bytes(b) => write!(f, "{}", String::from_utf8_lossy(b)),
            SqlValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            SqlValue::Time(t) => write!(f, "{}", t.format("%H:%M:%S")),
            SqlValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// A decoded row, one value per selected column.
pub type Row = Vec<SqlValue>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn test_display_null_and_bool() {
        assert_eq!(SqlValue::Null.to_string(), "NULL");
        assert_eq!(SqlValue::Bool(true).to_string(), "1");
        assert_eq!(SqlValue::Bool(false).to_string(), "0");
    }

    #[test]
    fn test_display_numbers() {
        assert_eq!(SqlValue::Int(-42).to_string(), "-42");
        assert_eq!(SqlValue::Float(2.5).to_string(), "2.5");
        let d: rust_decimal::Decimal = "19.99".parse().unwrap();
        assert_eq!(SqlValue::Decimal(d).to_string(), "19.99");
    }

    #[test]
    fn test_display_temporal() {
        let date = NaiveDate::from_ymd_opt(2016, 3, 14).unwrap();
        assert_eq!(SqlValue::Date(date).to_string(), "2016-03-14");

        let time = NaiveTime::from_hms_opt(9, 5, 0).unwrap();
        assert_eq!(SqlValue::Time(time).to_string(), "09:05:00");

        let dt = date.and_time(time);
        assert_eq!(SqlValue::DateTime(dt).to_string(), "2016-03-14 09:05:00");
    }

    #[test]
    fn test_display_bytes_lossy() {
        assert_eq!(SqlValue::Bytes(b"abc".to_vec()).to_string(), "abc");
        assert_eq!(
            SqlValue::Bytes(vec![0x66, 0xFF, 0x6F]).to_string(),
            "f\u{FFFD}o"
        );
    }
}
