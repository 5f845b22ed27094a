//! Traits for schema registration and derive macro support.
//!
//! [`Queryable`] is implemented by `#[derive(Queryable)]` (or by hand) to
//! hand out a record type's [`Schema`]. [`QueryEnum`] and [`QueryTimestamp`]
//! adapt user enum and datetime types to the query value model.

use chrono::{DateTime, TimeZone};

use crate::schema::Schema;
use crate::value::Timestamp;

/// Trait for record types that can be filtered and sorted.
///
/// This trait is typically derived using `#[derive(Queryable)]`, but can
/// also be implemented manually with [`Schema::builder`].
///
/// # Manual Implementation
///
/// ```
/// use dataquery::{FieldKind, FieldType, Number, Queryable, Schema, Value};
///
/// struct Task {
///     id: i64,
///     name: String,
/// }
///
/// impl Queryable for Task {
///     fn schema() -> Schema<Self> {
///         Schema::builder("Task")
///             .field("id", FieldType::new(FieldKind::Integer), |t: &Task| {
///                 Value::Number(Number::from(t.id))
///             })
///             .field("name", FieldType::new(FieldKind::String), |t: &Task| {
///                 Value::String(&t.name)
///             })
///             .primary_key("id")
///             .build()
///     }
/// }
///
/// let schema = Task::schema();
/// assert!(schema.resolve("NAME").is_ok());
/// ```
pub trait Queryable: Sized + 'static {
    /// Returns the schema descriptor for this record type.
    fn schema() -> Schema<Self>;
}

/// Helper trait for enum fields.
///
/// `VARIANTS` lists each member's filter name with its discriminant. Filter
/// literals are matched against the names case-sensitively, and the filter
/// grammar lower-cases its input, so names are usually written in lower
/// case.
///
/// # Example
///
/// ```
/// use dataquery::QueryEnum;
///
/// #[derive(Clone, Copy)]
/// enum Status {
///     Pending,
///     Active,
/// }
///
/// impl QueryEnum for Status {
///     const VARIANTS: &'static [(&'static str, u32)] = &[("pending", 0), ("active", 1)];
///
///     fn discriminant(&self) -> u32 {
///         match self {
///             Status::Pending => 0,
///             Status::Active => 1,
///         }
///     }
/// }
/// ```
pub trait QueryEnum {
    /// Member names and their discriminants.
    const VARIANTS: &'static [(&'static str, u32)];

    /// Returns the discriminant value for this enum variant.
    ///
    /// The discriminant also orders enum fields when sorting.
    fn discriminant(&self) -> u32;
}

/// Helper trait for converting datetime types to timestamps.
pub trait QueryTimestamp {
    /// Converts this value to a [`Timestamp`] for comparison.
    fn query_timestamp(&self) -> Timestamp;
}

// Integers are read as milliseconds since Unix epoch.
impl QueryTimestamp for i64 {
    fn query_timestamp(&self) -> Timestamp {
        Timestamp::from_millis(*self)
    }
}

impl QueryTimestamp for u64 {
    fn query_timestamp(&self) -> Timestamp {
        Timestamp::from_millis(*self as i64)
    }
}

impl<Tz: TimeZone> QueryTimestamp for DateTime<Tz> {
    fn query_timestamp(&self) -> Timestamp {
        Timestamp::from_millis(self.timestamp_millis())
    }
}
