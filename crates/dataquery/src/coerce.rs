//! Conversion of textual filter literals to typed values.
//!
//! Coercion is total over [`FieldKind`] and never falls back to a default:
//! a literal that does not parse as the field's type is a
//! [`QueryError::Coercion`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::{QueryError, Result};
use crate::schema::{FieldKind, FieldType};
use crate::value::{Number, Timestamp, Value};

/// Literal accepted by optional fields to test for an absent value.
pub const NULL_LITERAL: &str = "null";

/// Datetime layouts with an explicit offset, tried after RFC 3339.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%z"];

/// Datetime layouts without an offset; read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

/// Date-only layouts; read as midnight UTC.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// A filter literal converted to its field's type.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Number(Number),
    Timestamp(Timestamp),
    Enum(u32),
    Bool(bool),
    /// The `null` literal on an optional field.
    Null,
}

impl Literal {
    /// Borrows this literal as a comparable [`Value`].
    pub fn as_value(&self) -> Value<'_> {
        match self {
            Literal::String(s) => Value::String(s),
            Literal::Number(n) => Value::Number(*n),
            Literal::Timestamp(t) => Value::Timestamp(*t),
            Literal::Enum(d) => Value::Enum(*d),
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Null => Value::None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }
}

/// Converts `raw` to a literal of the given field type.
///
/// # Example
///
/// ```
/// use dataquery::{coerce, FieldKind, FieldType, Literal, Number};
///
/// let lit = coerce("age", FieldType::new(FieldKind::Integer), "42").unwrap();
/// assert_eq!(lit, Literal::Number(Number::I64(42)));
///
/// assert!(coerce("age", FieldType::new(FieldKind::Integer), "forty").is_err());
/// ```
pub fn coerce(field: &str, ty: FieldType, raw: &str) -> Result<Literal> {
    if ty.optional && raw == NULL_LITERAL {
        return Ok(Literal::Null);
    }

    let fail = |reason: String| QueryError::Coercion {
        field: field.to_string(),
        literal: raw.to_string(),
        expected: ty.kind.as_str(),
        reason,
    };

    match ty.kind {
        FieldKind::String => Ok(Literal::String(raw.to_string())),
        FieldKind::Integer => raw
            .parse::<i64>()
            .map(|n| Literal::Number(Number::I64(n)))
            .map_err(|e| fail(e.to_string())),
        FieldKind::Unsigned => raw
            .parse::<u64>()
            .map(|n| Literal::Number(Number::U64(n)))
            .map_err(|e| fail(e.to_string())),
        FieldKind::Float => raw
            .parse::<f64>()
            .map(|n| Literal::Number(Number::F64(n)))
            .map_err(|e| fail(e.to_string())),
        FieldKind::Bool => match raw.to_ascii_lowercase().as_str() {
            "true" => Ok(Literal::Bool(true)),
            "false" => Ok(Literal::Bool(false)),
            _ => Err(fail("expected 'true' or 'false'".to_string())),
        },
        FieldKind::Timestamp => parse_timestamp(raw)
            .map(Literal::Timestamp)
            .ok_or_else(|| fail("unrecognised date/time format".to_string())),
        FieldKind::Enum(variants) => coerce_enum(variants, raw)
            .map(Literal::Enum)
            .ok_or_else(|| fail("not a member name or discriminant".to_string())),
    }
}

/// Matches a member name exactly, then falls back to a numeric
/// discriminant that belongs to the enum.
fn coerce_enum(variants: &[(&str, u32)], raw: &str) -> Option<u32> {
    if let Some(&(_, discriminant)) = variants.iter().find(|(name, _)| *name == raw) {
        return Some(discriminant);
    }
    let discriminant = raw.parse::<u32>().ok()?;
    variants
        .iter()
        .any(|&(_, d)| d == discriminant)
        .then_some(discriminant)
}

/// Parses an invariant-format date/time literal.
///
/// Accepts RFC 3339, ISO-like datetimes with a space or `T` separator (with
/// or without an offset), US-style `MM/DD/YYYY` dates, and bare dates.
/// Values without an offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    // The filter grammar lower-cases its input, including the `T` and `Z`
    // markers of ISO datetimes.
    let input = raw.trim().to_ascii_uppercase();

    if let Ok(dt) = DateTime::parse_from_rfc3339(&input) {
        return Some(dt.into());
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&input, format) {
            return Some(dt.into());
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&input, format) {
            return Some(Utc.from_utc_datetime(&naive).into());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&input, format) {
            let naive = date.and_hms_opt(0, 0, 0)?;
            return Some(Utc.from_utc_datetime(&naive).into());
        }
    }
    None
}
