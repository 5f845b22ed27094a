//! Implementation of the `#[derive(Queryable)]` and `#[derive(QueryEnum)]`
//! macros.
//!
//! This module provides derive macro support for dataquery schemas,
//! generating schema registrations and field constants from struct
//! annotations.

mod attrs;
mod derive;

pub use derive::{query_enum_derive_impl, queryable_derive_impl};
