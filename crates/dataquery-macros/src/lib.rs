//! Proc macros for Dataquery.
//!
//! This crate provides derive macros that register record types with the
//! `dataquery` filter/sort compiler at compile time, so field resolution
//! never needs runtime reflection.
//!
//! # Available Macros
//!
//! ## Derive Macros
//!
//! - [`Queryable`] - Generate a record's schema from struct field annotations
//! - [`QueryEnum`] - Generate the member table of a fieldless enum
//!
//! These macros are re-exported by `dataquery` behind its default `derive`
//! feature; depend on `dataquery` rather than on this crate directly.
//!
//! # Examples
//!
//! For working examples, see `dataquery/tests/derive.rs`.

mod queryable;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives the `Queryable` trait for record structs.
///
/// This macro generates an implementation of `dataquery::Queryable`, whose
/// `schema()` registers every annotated field with a typed accessor.
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `String` | String field (`eq`, `ne`, `contains`, `notcontains`, `startswith`, `endswith`); needs `AsRef<str>` |
/// | `Number` | Numeric field, kind inferred from the primitive type |
/// | `Integer` / `Unsigned` / `Float` | Numeric field with an explicit kind |
/// | `Timestamp` | Timestamp field; needs a `QueryTimestamp` impl |
/// | `Enum` | Enum field; needs a `QueryEnum` impl |
/// | `Bool` | Boolean field (`eq`, `ne`) |
/// | `nested` | Nested `Queryable` record, reachable as `field.inner` |
/// | `key` | Marks the primary key (default sort, exact `eq`/`ne`) |
/// | `skip` | Exclude this field from queries |
/// | `rename = "..."` | Use a custom name for queries |
/// | `ty = "..."` | Give the type as a string, e.g. `ty = "enum"` |
///
/// Fields of type `Option<T>` are registered as optional: an absent value
/// reads as null and the literal `null` can be compared against it.
/// Fields without a `#[query]` attribute are not queryable.
///
/// # Generated Code
///
/// The macro generates:
///
/// 1. Field name constants (e.g., `User::EMAIL`, `User::ADDRESS`)
/// 2. Implementation of `Queryable::schema()`
///
/// # Example
///
/// ```ignore
/// use dataquery::{Queryable, QueryEnum, QueryParams};
///
/// #[derive(Clone, Copy, QueryEnum)]
/// enum Status { Pending, Active }
///
/// #[derive(Queryable)]
/// struct Address {
///     #[query(String)]
///     city: String,
/// }
///
/// #[derive(Queryable)]
/// struct User {
///     #[query(Integer, key)]
///     id: i64,
///
///     #[query(String)]
///     email: String,
///
///     #[query(Enum)]
///     status: Status,
///
///     #[query(nested)]
///     address: Address,
///
///     #[query(skip)]
///     password_hash: String,
/// }
///
/// let plan = QueryParams::default()
///     .filter("status,eq,active,and,address.city,eq,lisbon")
///     .into_options()
///     .compile(&User::schema())?;
/// ```
#[proc_macro_derive(Queryable, attributes(query))]
pub fn queryable_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    queryable::queryable_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derives the `QueryEnum` trait for fieldless enums.
///
/// Each variant's filter name is its lower-cased identifier, or its
/// lower-cased `#[query(rename = "...")]`. Discriminants follow the enum's own:
/// explicit integer literals where given, otherwise counting up from the
/// previous variant.
///
/// # Example
///
/// ```ignore
/// use dataquery::QueryEnum;
///
/// #[derive(Clone, Copy, QueryEnum)]
/// enum Priority {
///     Low = 1,
///     #[query(rename = "normal")]
///     Medium,
///     High,
/// }
///
/// assert_eq!(Priority::VARIANTS, &[("low", 1), ("normal", 2), ("high", 3)]);
/// ```
#[proc_macro_derive(QueryEnum, attributes(query))]
pub fn query_enum_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    queryable::query_enum_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
