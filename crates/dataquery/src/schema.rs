//! Schema descriptors and field path resolution.
//!
//! A [`Schema`] maps field names to typed accessor closures for one record
//! type. It is registered up front (by hand or with `#[derive(Queryable)]`)
//! so that resolving a field never needs runtime reflection.
//!
//! Field paths may contain one `.` separator to reach into a nested record,
//! e.g. `address.city`. Nested schemas are flattened at registration time,
//! so resolution is a single case-insensitive map lookup.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{QueryError, Result};
use crate::filter::{CustomHandler, RecordPredicate};
use crate::value::Value;

/// Separator between the segments of a nested field path.
pub const PATH_SEPARATOR: char = '.';

/// Shared accessor reading one field out of a record.
pub type Accessor<T> = Arc<dyn for<'a> Fn(&'a T) -> Value<'a> + Send + Sync>;

/// The closed set of field types understood by coercion and comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Signed integer.
    Integer,
    /// Unsigned integer.
    Unsigned,
    /// Floating point number.
    Float,
    /// Boolean.
    Bool,
    /// Text.
    String,
    /// Point in time with an offset.
    Timestamp,
    /// Enumeration, with its member names and discriminants.
    Enum(&'static [(&'static str, u32)]),
}

impl FieldKind {
    /// Returns the display name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Integer => "integer",
            FieldKind::Unsigned => "unsigned integer",
            FieldKind::Float => "float",
            FieldKind::Bool => "bool",
            FieldKind::String => "string",
            FieldKind::Timestamp => "timestamp",
            FieldKind::Enum(_) => "enum",
        }
    }

    /// Returns `true` for the numeric kinds.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            FieldKind::Integer | FieldKind::Unsigned | FieldKind::Float
        )
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Type of a schema field: a kind plus whether the value may be null.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldType {
    pub kind: FieldKind,
    pub optional: bool,
}

impl FieldType {
    /// A required field of the given kind.
    pub fn new(kind: FieldKind) -> Self {
        FieldType {
            kind,
            optional: false,
        }
    }

    /// A nullable field of the given kind.
    pub fn optional(kind: FieldKind) -> Self {
        FieldType {
            kind,
            optional: true,
        }
    }
}

/// A resolved field: its full path, type, and accessor.
pub struct SchemaField<T> {
    name: String,
    ty: FieldType,
    accessor: Accessor<T>,
}

impl<T> SchemaField<T> {
    /// Field path as registered, e.g. `address.city`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> FieldType {
        self.ty
    }

    pub fn kind(&self) -> FieldKind {
        self.ty.kind
    }

    /// Reads this field from a record.
    pub fn value<'a>(&self, record: &'a T) -> Value<'a> {
        (self.accessor)(record)
    }
}

impl<T> Clone for SchemaField<T> {
    fn clone(&self) -> Self {
        SchemaField {
            name: self.name.clone(),
            ty: self.ty,
            accessor: Arc::clone(&self.accessor),
        }
    }
}

impl<T> fmt::Debug for SchemaField<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaField")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .finish_non_exhaustive()
    }
}

/// Schema descriptor for a record type `T`.
pub struct Schema<T> {
    name: &'static str,
    fields: Vec<SchemaField<T>>,
    index: HashMap<String, usize>,
    nested: HashSet<String>,
    primary_key: Option<String>,
    custom: Option<CustomHandler<T>>,
    base_filter: Option<RecordPredicate<T>>,
}

impl<T: 'static> Schema<T> {
    /// Starts building a schema for the record type named `name`.
    pub fn builder(name: &'static str) -> SchemaBuilder<T> {
        SchemaBuilder {
            schema: Schema {
                name,
                fields: Vec::new(),
                index: HashMap::new(),
                nested: HashSet::new(),
                primary_key: None,
                custom: None,
                base_filter: None,
            },
        }
    }
}

impl<T> Schema<T> {
    /// Name of the record type, used in error messages.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// All registered fields, including flattened nested ones.
    pub fn fields(&self) -> &[SchemaField<T>] {
        &self.fields
    }

    /// Name of the primary identifier field, if any.
    pub fn primary_key(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    /// Returns `true` if `field` is the primary identifier.
    pub fn is_primary_key(&self, field: &SchemaField<T>) -> bool {
        self.primary_key
            .as_deref()
            .is_some_and(|pk| pk.eq_ignore_ascii_case(&field.name))
    }

    /// Handler for `custom` clauses, if one is registered.
    pub fn custom_handler(&self) -> Option<&CustomHandler<T>> {
        self.custom.as_ref()
    }

    /// Predicate every query result must satisfy, if one is registered.
    pub fn base_filter(&self) -> Option<&RecordPredicate<T>> {
        self.base_filter.as_ref()
    }

    /// Resolves a field path, case-insensitively.
    ///
    /// Fails with [`QueryError::SchemaResolution`] naming the first segment
    /// that does not exist.
    pub fn resolve(&self, path: &str) -> Result<&SchemaField<T>> {
        let key = path.trim().to_lowercase();
        if let Some(&idx) = self.index.get(&key) {
            return Ok(&self.fields[idx]);
        }

        let segment = match key.split_once(PATH_SEPARATOR) {
            Some((outer, inner)) if self.nested.contains(outer) => inner.to_string(),
            Some((outer, _)) => outer.to_string(),
            None => key,
        };
        Err(QueryError::SchemaResolution {
            schema: self.name,
            path: path.to_string(),
            segment,
        })
    }

    fn insert(&mut self, field: SchemaField<T>) {
        let key = field.name.to_lowercase();
        match self.index.get(&key) {
            Some(&idx) => self.fields[idx] = field,
            None => {
                self.index.insert(key, self.fields.len());
                self.fields.push(field);
            }
        }
    }
}

impl<T> Clone for Schema<T> {
    fn clone(&self) -> Self {
        Schema {
            name: self.name,
            fields: self.fields.clone(),
            index: self.index.clone(),
            nested: self.nested.clone(),
            primary_key: self.primary_key.clone(),
            custom: self.custom.clone(),
            base_filter: self.base_filter.clone(),
        }
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("primary_key", &self.primary_key)
            .field("custom", &self.custom.is_some())
            .field("base_filter", &self.base_filter.is_some())
            .finish()
    }
}

/// Fluent builder for [`Schema`].
pub struct SchemaBuilder<T> {
    schema: Schema<T>,
}

impl<T: 'static> SchemaBuilder<T> {
    /// Registers a field with its accessor.
    ///
    /// Registering the same name twice (case-insensitively) replaces the
    /// earlier field.
    pub fn field<F>(mut self, name: &str, ty: FieldType, accessor: F) -> Self
    where
        F: for<'a> Fn(&'a T) -> Value<'a> + Send + Sync + 'static,
    {
        self.schema.insert(SchemaField {
            name: name.to_string(),
            ty,
            accessor: Arc::new(accessor),
        });
        self
    }

    /// Registers a nested record reachable as `name.<field>`.
    ///
    /// Only the nested schema's own top-level fields are exposed: paths are
    /// at most one level deep.
    pub fn nested<U, P>(self, name: &str, project: P, inner: Schema<U>) -> Self
    where
        U: 'static,
        P: for<'a> Fn(&'a T) -> &'a U + Send + Sync + 'static,
    {
        self.nested_with(name, false, move |record| Some(project(record)), inner)
    }

    /// Registers a nested record that may be absent.
    ///
    /// Every field reached through an absent parent reads as null.
    pub fn nested_optional<U, P>(self, name: &str, project: P, inner: Schema<U>) -> Self
    where
        U: 'static,
        P: for<'a> Fn(&'a T) -> Option<&'a U> + Send + Sync + 'static,
    {
        self.nested_with(name, true, project, inner)
    }

    fn nested_with<U, P>(mut self, name: &str, optional: bool, project: P, inner: Schema<U>) -> Self
    where
        U: 'static,
        P: for<'a> Fn(&'a T) -> Option<&'a U> + Send + Sync + 'static,
    {
        let project = Arc::new(project);
        for field in inner.fields {
            if field.name.contains(PATH_SEPARATOR) {
                continue;
            }
            let project = Arc::clone(&project);
            let read = field.accessor;
            self.schema.insert(SchemaField {
                name: format!("{name}{PATH_SEPARATOR}{}", field.name),
                ty: FieldType {
                    kind: field.ty.kind,
                    optional: optional || field.ty.optional,
                },
                accessor: compose(move |record: &T| project(record), read),
            });
        }
        self.schema.nested.insert(name.to_lowercase());
        self
    }

    /// Names the primary identifier field.
    ///
    /// It is the default sort key (descending) and is compared exactly,
    /// not case-folded, by `eq`/`ne`. When unset, a field named `id` is
    /// used if one is registered.
    pub fn primary_key(mut self, name: &str) -> Self {
        self.schema.primary_key = Some(name.to_string());
        self
    }

    /// Registers the handler for `custom` clauses.
    ///
    /// The handler receives the clause's field name and literal value and
    /// returns a predicate that is ANDed onto the whole filter.
    pub fn custom<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str, &str) -> Result<RecordPredicate<T>> + Send + Sync + 'static,
    {
        self.schema.custom = Some(Arc::new(handler));
        self
    }

    /// Registers a predicate every result must satisfy, regardless of the
    /// client's filter.
    pub fn base_filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.schema.base_filter = Some(Arc::new(predicate));
        self
    }

    /// Finishes the schema.
    ///
    /// A primary key naming an unregistered field is dropped, so the
    /// `id` fallback applies instead.
    pub fn build(mut self) -> Schema<T> {
        if let Some(pk) = &self.schema.primary_key {
            if !self.schema.index.contains_key(&pk.to_lowercase()) {
                debug!(
                    schema = self.schema.name,
                    primary_key = %pk,
                    "dropping primary key that names no registered field"
                );
                self.schema.primary_key = None;
            }
        }
        if self.schema.primary_key.is_none() && self.schema.index.contains_key("id") {
            self.schema.primary_key = Some("id".to_string());
        }
        self.schema
    }
}

fn compose<T, U, P>(project: P, read: Accessor<U>) -> Accessor<T>
where
    T: 'static,
    U: 'static,
    P: for<'a> Fn(&'a T) -> Option<&'a U> + Send + Sync + 'static,
{
    Arc::new(move |record: &T| match project(record) {
        Some(parent) => read(parent),
        None => Value::None,
    })
}
