//! Dataquery - string-encoded filter, sort, and paging for record collections.
//!
//! Dataquery compiles a compact textual query, as sent by a list endpoint's
//! client, against a typed record schema and runs it over a record source:
//!
//! - A filter grammar of `field,op,value` clauses chained with `,and,` / `,or,`
//! - Multi-key sorting from `field [asc|desc]` lists, defaulting to the
//!   primary key, descending
//! - Paging by page number and size, with an unpaged mode
//! - Schemas registered up front, by hand or with `#[derive(Queryable)]`
//! - An asynchronous, cancellable materialization step
//!
//! # Quick Start
//!
//! ```rust
//! use dataquery::{FieldKind, FieldType, Number, QueryParams, Schema, Value};
//!
//! struct User {
//!     id: i64,
//!     email: String,
//! }
//!
//! let schema = Schema::builder("User")
//!     .field("id", FieldType::new(FieldKind::Integer), |u: &User| {
//!         Value::Number(Number::from(u.id))
//!     })
//!     .field("email", FieldType::new(FieldKind::String), |u: &User| {
//!         Value::String(&u.email)
//!     })
//!     .build();
//!
//! let users = vec![
//!     User { id: 1, email: "ana@example.com".into() },
//!     User { id: 2, email: "bo@test.org".into() },
//!     User { id: 3, email: "cy@Example.com".into() },
//! ];
//!
//! let plan = QueryParams::default()
//!     .filter("email,contains,@example.com")
//!     .into_options()
//!     .compile(&schema)
//!     .unwrap();
//!
//! let (page, total) = plan.apply(&users);
//! assert_eq!(total, 2);
//! assert_eq!(page[0].id, 3);
//! assert_eq!(page[1].id, 1);
//! ```
//!
//! # Filter Semantics
//!
//! Clauses are combined strictly left to right. Each clause carries the
//! join that follows it in the text, and there is no precedence:
//!
//! ```text
//! a,and,b,or,c    =>  (a AND b) OR c
//! a,or,b,and,c    =>  (a OR b) AND c
//! ```
//!
//! `custom` clauses are handed to the schema's custom handler and always
//! ANDed with the result, whatever join surrounds them. A schema's base
//! filter is ANDed last.
//!
//! # Field Types and Operators
//!
//! | Type | Operators |
//! |------|-----------|
//! | String | `eq`, `ne`, `contains`, `notcontains`, `startswith`, `endswith` |
//! | Number | `eq`, `ne`, `gt`, `ge`, `lt`, `le` |
//! | Timestamp | `eq`, `ne`, `gt`, `ge`, `lt`, `le` |
//! | Enum | `eq`, `ne` |
//! | Bool | `eq`, `ne` |
//!
//! String tests ignore case, except `eq`/`ne` on the primary key.

mod clause;
mod coerce;
mod error;
mod filter;
mod grammar;
mod op;
mod ordering;
mod page;
mod params;
mod query;
mod schema;
mod source;
mod traits;
mod value;

// Re-export public API
pub use clause::{format_filter, Clause};
pub use coerce::{coerce, parse_timestamp, Literal, NULL_LITERAL};
pub use error::{QueryError, Result};
pub use filter::{CustomHandler, Filter, RecordPredicate};
pub use grammar::{parse_filter, parse_order_by, FIELD_SEPARATOR, SORT_ASC_SUFFIX, SORT_DESC_SUFFIX};
pub use op::{Join, Op};
pub use ordering::{compare_values, Dir, OrderBy, Sort};
pub use page::QueryResult;
pub use params::{QueryParams, LIST_PAGE_SIZE};
pub use query::{skip_count, Query, QueryOptions, QueryPlan, Window, DEFAULT_PAGE_NO, DEFAULT_SIZE};
pub use schema::{
    Accessor, FieldKind, FieldType, Schema, SchemaBuilder, SchemaField, PATH_SEPARATOR,
};
pub use source::{Fetched, MemorySource, RecordSource};
pub use traits::{QueryEnum, QueryTimestamp, Queryable};
pub use value::{Number, Timestamp, Value};

#[cfg(feature = "derive")]
pub use dataquery_macros::{QueryEnum, Queryable};
