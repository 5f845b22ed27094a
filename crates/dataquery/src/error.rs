//! Error types for the dataquery crate.

use thiserror::Error;

use crate::op::Op;
use crate::schema::FieldKind;

/// Errors that can occur when compiling or executing a query.
///
/// Every variant is fatal to the query it was raised for. Nothing in this
/// crate retries or recovers locally.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A field path segment does not exist on the schema.
    #[error("schema '{schema}' has no field '{segment}' (while resolving '{path}')")]
    SchemaResolution {
        schema: &'static str,
        path: String,
        segment: String,
    },

    /// A literal could not be converted to the field's type.
    #[error("cannot convert '{literal}' to {expected} for field '{field}': {reason}")]
    Coercion {
        field: String,
        literal: String,
        expected: &'static str,
        reason: String,
    },

    /// Operator is not defined for the field's type.
    #[error("operator '{op}' is not valid for field '{field}' of type {kind}")]
    InvalidOperator {
        field: String,
        op: Op,
        kind: FieldKind,
    },

    /// A `custom` clause was used on a schema without a custom handler.
    #[error("custom filter is not implemented for schema '{schema}'")]
    CustomNotImplemented { schema: &'static str },

    /// The record source failed to materialize the result.
    #[error("record source error: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request parameters could not be read.
    #[error("invalid query parameters: {0}")]
    Params(String),
}

impl QueryError {
    /// Wraps an arbitrary record source error.
    pub fn from_source<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        QueryError::Source(Box::new(err))
    }
}

/// Result type for dataquery operations.
pub type Result<T> = std::result::Result<T, QueryError>;
