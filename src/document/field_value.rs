//! Field value types for update documents.
//!
//! This module defines the [`FieldValue`] enum which represents all value
//! types the Solr update protocol can carry. The wire format itself is
//! untyped text, so the variants here are the *native* side of the
//! conversion performed by [`crate::codec`].
//!
//! # Supported Types
//!
//! - **Text** - String data
//! - **Integer** - 64-bit signed integers
//! - **Float** - 64-bit floating-point numbers
//! - **Boolean** - true/false values
//! - **Binary** - Raw byte data, decoded as UTF-8 before transmission
//! - **Date** - Calendar dates (serialized with a synthetic midnight time)
//! - **DateTime** - UTC timestamps
//! - **Sequence** - An ordered run of values sharing one field name
//! - **Null** - Explicit null; elided from update requests
//!
//! # Examples
//!
//! ```
//! use solander::document::FieldValue;
//!
//! let text = FieldValue::Text("hello".to_string());
//! assert_eq!(text.as_text(), Some("hello"));
//!
//! let active = FieldValue::Boolean(true);
//! assert_eq!(active.to_string(), "true");
//!
//! assert!(FieldValue::Null.is_null());
//! assert!(FieldValue::Text(String::new()).is_null());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Represents a value for a field in an update document.
///
/// Multi-valued fields are expressed as a [`FieldValue::Sequence`]; each
/// element becomes its own `<field>` element in the update envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Text value
    Text(String),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// Boolean value
    Boolean(bool),
    /// Binary data
    Binary(Vec<u8>),
    /// Calendar date without a time component
    Date(chrono::NaiveDate),
    /// DateTime value
    DateTime(chrono::DateTime<chrono::Utc>),
    /// Ordered multi-value sequence
    Sequence(Vec<FieldValue>),
    /// Null value
    Null,
}

impl FieldValue {
    /// Convert to text if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to boolean if this is a boolean value.
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Convert to an integer if this is an integer value.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Convert to a float. Integer values widen losslessly where possible.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(f) => Some(*f),
            FieldValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get the value as binary data, if possible.
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Binary(data) => Some(data),
            _ => None,
        }
    }

    /// Get the elements of a multi-valued field, if this is a sequence.
    pub fn as_sequence(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::Sequence(values) => Some(values),
            _ => None,
        }
    }

    /// Whether this value is excluded from update requests entirely.
    ///
    /// Null and zero-length text both count: Solr treats an empty field
    /// element the same as a missing one, so neither is worth sending.
    pub fn is_null(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for FieldValue {
    /// The natural text representation, matching what Solr expects on the
    /// wire: booleans as literal `true`/`false`, date-times in UTC at
    /// second precision with a trailing `Z`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Boolean(true) => f.write_str("true"),
            FieldValue::Boolean(false) => f.write_str("false"),
            FieldValue::Binary(data) => f.write_str(&String::from_utf8_lossy(data)),
            FieldValue::Date(d) => write!(f, "{}T00:00:00Z", d.format("%Y-%m-%d")),
            FieldValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%SZ")),
            FieldValue::Sequence(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            FieldValue::Null => Ok(()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<chrono::DateTime<chrono::Utc>> for FieldValue {
    fn from(value: chrono::DateTime<chrono::Utc>) -> Self {
        FieldValue::DateTime(value)
    }
}

impl From<chrono::NaiveDate> for FieldValue {
    fn from(value: chrono::NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(values: Vec<T>) -> Self {
        FieldValue::Sequence(values.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;

    #[test]
    fn test_null_check() {
        assert!(FieldValue::Null.is_null());
        assert!(FieldValue::Text(String::new()).is_null());
        assert!(!FieldValue::Text(" ".to_string()).is_null());
        assert!(!FieldValue::Integer(0).is_null());
        assert!(!FieldValue::Boolean(false).is_null());
    }

    #[test]
    fn test_display_datetime_second_precision() {
        let dt = Utc.with_ymd_and_hms(2013, 1, 18, 0, 30, 28).unwrap();
        assert_eq!(
            FieldValue::DateTime(dt).to_string(),
            "2013-01-18T00:30:28Z"
        );
    }

    #[test]
    fn test_display_date_synthetic_midnight() {
        let d = NaiveDate::from_ymd_opt(2013, 1, 18).unwrap();
        assert_eq!(FieldValue::Date(d).to_string(), "2013-01-18T00:00:00Z");
    }

    #[test]
    fn test_display_booleans() {
        assert_eq!(FieldValue::Boolean(true).to_string(), "true");
        assert_eq!(FieldValue::Boolean(false).to_string(), "false");
    }

    #[test]
    fn test_from_conversions() {
        assert_eq!(FieldValue::from("abc"), FieldValue::Text("abc".to_string()));
        assert_eq!(FieldValue::from(7i64), FieldValue::Integer(7));
        assert_eq!(
            FieldValue::from(vec![1i64, 2, 3]),
            FieldValue::Sequence(vec![
                FieldValue::Integer(1),
                FieldValue::Integer(2),
                FieldValue::Integer(3),
            ])
        );
    }
}
