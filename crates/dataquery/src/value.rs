//! Runtime value types for field comparison.
//!
//! The [`Value`] enum is what a schema accessor reads out of a record. It is
//! borrowed from the record, so string fields are never copied while a
//! query runs.

use std::cmp::Ordering;

use chrono::{DateTime, TimeZone};

/// Runtime value of a record field, borrowed from the record.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// String value (borrowed).
    String(&'a str),
    /// Numeric value.
    Number(Number),
    /// Timestamp value (milliseconds since Unix epoch, UTC).
    Timestamp(Timestamp),
    /// Enum discriminant value.
    Enum(u32),
    /// Boolean value.
    Bool(bool),
    /// Null, or the parent of a nested field is null.
    None,
}

impl Value<'_> {
    /// Returns `true` for an absent value, which only `ne` matches.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }
}

/// Numeric value supporting all common numeric types.
///
/// Numbers are stored in one of three variants to preserve precision.
/// Comparisons between different variants go through `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Converts the number to f64 for comparison.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Compares two numbers, handling mixed types.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::F64(a), Number::F64(b)) => a.partial_cmp(&b),
            (Number::I64(a), Number::U64(b)) => Some(compare_i64_u64(a, b)),
            (Number::U64(a), Number::I64(b)) => Some(compare_i64_u64(b, a).reverse()),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }

    /// Total order used for sorting: NaN sorts after every other number.
    pub fn sort_cmp(self, other: Number) -> Ordering {
        match (self.is_nan(), other.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.compare(other).unwrap_or(Ordering::Equal),
        }
    }

    fn is_nan(self) -> bool {
        matches!(self, Number::F64(n) if n.is_nan())
    }
}

fn compare_i64_u64(a: i64, b: u64) -> Ordering {
    match u64::try_from(a) {
        Ok(a) => a.cmp(&b),
        Err(_) => Ordering::Less,
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

macro_rules! number_from {
    ($variant:ident: $($ty:ty),+) => {
        $(
            impl From<$ty> for Number {
                fn from(n: $ty) -> Self {
                    Number::$variant(n as _)
                }
            }
        )+
    };
}

number_from!(I64: i8, i16, i32, i64, isize);
number_from!(U64: u8, u16, u32, u64, usize);
number_from!(F64: f32, f64);

/// Timestamp value represented as milliseconds since Unix epoch.
///
/// Offsets are normalized away: two timestamps naming the same instant in
/// different offsets are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Creates a new timestamp from milliseconds since Unix epoch.
    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    /// Creates a new timestamp from seconds since Unix epoch.
    pub fn from_secs(secs: i64) -> Self {
        Timestamp(secs * 1000)
    }

    /// Returns the timestamp as milliseconds since Unix epoch.
    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Returns the timestamp as seconds since Unix epoch.
    pub fn as_secs(self) -> i64 {
        self.0 / 1000
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Timestamp {
    fn from(dt: DateTime<Tz>) -> Self {
        Timestamp(dt.timestamp_millis())
    }
}

impl From<i64> for Timestamp {
    fn from(millis: i64) -> Self {
        Timestamp(millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn absent_values() {
        assert!(Value::None.is_none());
        assert!(!Value::String("").is_none());
        assert!(!Value::Bool(false).is_none());
    }

    #[test]
    fn literal_and_field_numbers_compare_across_kinds() {
        // A float field compared against an integer literal.
        assert_eq!(Number::F64(7.5).compare(Number::I64(8)), Some(Ordering::Less));
        // An unsigned field compared against a negative literal.
        assert_eq!(Number::U64(0).compare(Number::I64(-3)), Some(Ordering::Greater));
    }

    #[test]
    fn number_comparisons_mixed_types() {
        assert_eq!(
            Number::I64(5).compare(Number::U64(10)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::I64(-1).compare(Number::U64(0)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::U64(u64::MAX).compare(Number::I64(i64::MAX)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Number::I64(5).compare(Number::F64(5.0)),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn number_nan_comparison() {
        assert_eq!(Number::F64(f64::NAN).compare(Number::F64(1.0)), None);
    }

    #[test]
    fn sort_order_puts_nan_after_numbers() {
        let nan = Number::F64(f64::NAN);
        assert_eq!(nan.sort_cmp(Number::F64(f64::INFINITY)), Ordering::Greater);
        assert_eq!(Number::I64(i64::MAX).sort_cmp(nan), Ordering::Less);
        assert_eq!(nan.sort_cmp(Number::F64(-f64::NAN)), Ordering::Equal);
        assert_eq!(Number::F64(1.0).sort_cmp(Number::U64(2)), Ordering::Less);
    }

    #[test]
    fn number_from_field_types() {
        assert_eq!(Number::from(-7i8), Number::I64(-7));
        assert_eq!(Number::from(300usize), Number::U64(300));
        assert_eq!(Number::from(0.5f32), Number::F64(0.5));
    }

    #[test]
    fn timestamp_from_datetime_normalizes_offset() {
        let utc = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let plus_two = FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
            .unwrap();
        assert_eq!(Timestamp::from(utc), Timestamp::from(plus_two));
    }

    #[test]
    fn timestamp_units() {
        assert_eq!(Timestamp::from_secs(-2), Timestamp::from_millis(-2000));
        assert_eq!(Timestamp::from(1_500i64).as_secs(), 1);
    }
}
