//! Ordering types for query result sorting.
//!
//! Provides [`Dir`] for sort direction, [`OrderBy`] for a textual sort key,
//! and [`Sort`] for a sequence of keys compiled against a schema.

use std::cmp::Ordering;
use std::fmt;

use crate::error::Result;
use crate::schema::{Schema, SchemaField};
use crate::value::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dir {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Dir {
    /// Orients an ascending comparison in this direction.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }

    /// Returns the display name of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single sort key: a field path and a direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// The field to sort by.
    pub field: String,
    /// The sort direction.
    pub dir: Dir,
}

impl OrderBy {
    /// Creates a new ascending ordering for the given field.
    pub fn asc(field: impl Into<String>) -> Self {
        OrderBy {
            field: field.into(),
            dir: Dir::Asc,
        }
    }

    /// Creates a new descending ordering for the given field.
    pub fn desc(field: impl Into<String>) -> Self {
        OrderBy {
            field: field.into(),
            dir: Dir::Desc,
        }
    }

    /// Creates a new ordering with the given direction.
    pub fn new(field: impl Into<String>, dir: Dir) -> Self {
        OrderBy {
            field: field.into(),
            dir,
        }
    }
}

/// Formats the key in sort grammar form, e.g. `name desc`.
impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.dir)
    }
}

/// Compares two values of the same type.
///
/// Strings compare by ordinal, enums by discriminant. Null sorts after every
/// present value in ascending order.
///
/// Returns `None` if the types don't match or comparison is not possible (NaN).
pub fn compare_values<'a>(a: &Value<'a>, b: &Value<'a>) -> Option<Ordering> {
    match (a, b) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => a.compare(*b),
        (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
        (Value::Enum(a), Value::Enum(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),

        (Value::None, Value::None) => Some(Ordering::Equal),
        (Value::None, _) => Some(Ordering::Greater),
        (_, Value::None) => Some(Ordering::Less),

        _ => None,
    }
}

/// Total order over the values of one field.
fn sort_values(a: &Value<'_>, b: &Value<'_>) -> Ordering {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.sort_cmp(*b),
        _ => compare_values(a, b).unwrap_or(Ordering::Equal),
    }
}

/// A multi-key comparator compiled against a schema.
///
/// The first key is primary; each later key only breaks ties of all keys
/// before it. Sorting with [`slice::sort_by`] keeps records that tie on
/// every key in source order.
pub struct Sort<T> {
    keys: Vec<(SchemaField<T>, Dir)>,
}

impl<T> Sort<T> {
    /// Resolves every key against the schema.
    ///
    /// With no keys, sorts descending by the schema's primary key. A schema
    /// without a primary key gets an empty sort, which keeps source order.
    pub fn compile(orderings: &[OrderBy], schema: &Schema<T>) -> Result<Self> {
        if orderings.is_empty() {
            let keys = match schema.primary_key() {
                Some(pk) => vec![(schema.resolve(pk)?.clone(), Dir::Desc)],
                None => Vec::new(),
            };
            return Ok(Sort { keys });
        }

        let keys = orderings
            .iter()
            .map(|order_by| Ok((schema.resolve(&order_by.field)?.clone(), order_by.dir)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Sort { keys })
    }

    /// Compares two records key by key.
    ///
    /// NaN sorts after every number and before null when ascending.
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        for (field, dir) in &self.keys {
            let ordering = dir.apply(sort_values(&field.value(a), &field.value(b)));
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Returns the resolved keys as [`OrderBy`] values.
    pub fn keys(&self) -> Vec<OrderBy> {
        self.keys
            .iter()
            .map(|(field, dir)| OrderBy::new(field.name(), *dir))
            .collect()
    }

    /// Returns `true` if this sort leaves records in source order.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<T> Clone for Sort<T> {
    fn clone(&self) -> Self {
        Sort {
            keys: self.keys.clone(),
        }
    }
}

impl<T> fmt::Debug for Sort<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sort").field("keys", &self.keys()).finish()
    }
}
