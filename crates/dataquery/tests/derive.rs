//! Integration tests for the Queryable and QueryEnum derive macros.
//!
//! These tests verify that `#[derive(Queryable)]` registers fields, nested
//! records, and the primary key from struct field annotations, and that the
//! generated schemas compile and run real queries.

#![cfg(feature = "derive")]
#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use dataquery::{
    FieldKind, Query, QueryEnum, QueryError, QueryOptions, QueryParams, Queryable,
};

#[derive(Debug, Clone, Copy, PartialEq, QueryEnum)]
enum Status {
    Pending,
    Active,
    #[query(rename = "Gone")]
    Archived = 7,
}

#[derive(Debug, Clone, Queryable)]
struct Address {
    #[query(String)]
    city: String,

    #[query(String, rename = "zip")]
    postal_code: String,
}

#[derive(Debug, Clone, Queryable)]
struct User {
    #[query(Integer, key)]
    id: i64,

    #[query(String)]
    name: String,

    #[query(Number)]
    score: Option<f64>,

    #[query(Enum)]
    status: Status,

    #[query(Timestamp)]
    created_at: DateTime<Utc>,

    #[query(Bool)]
    verified: bool,

    #[query(nested)]
    address: Address,

    #[query(nested)]
    billing: Option<Address>,

    #[query(skip)]
    password_hash: String,

    notes: String,
}

fn address(city: &str) -> Address {
    Address {
        city: city.to_string(),
        postal_code: "1000".to_string(),
    }
}

fn user(id: i64, name: &str, status: Status, day: u32) -> User {
    User {
        id,
        name: name.to_string(),
        score: None,
        status,
        created_at: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
        verified: id % 2 == 0,
        address: address("Lisbon"),
        billing: None,
        password_hash: "x".to_string(),
        notes: String::new(),
    }
}

fn users() -> Vec<User> {
    let mut rows = vec![
        user(1, "Ana", Status::Active, 1),
        user(2, "Bruno", Status::Pending, 2),
        user(3, "Carla", Status::Archived, 3),
        user(4, "Diogo", Status::Active, 4),
    ];
    rows[1].score = Some(7.5);
    rows[2].score = Some(9.0);
    rows[3].address = address("Porto");
    rows[3].billing = Some(address("Faro"));
    rows
}

fn ids(options: QueryOptions) -> Vec<i64> {
    let records = users();
    let plan = options.compile(&User::schema()).unwrap();
    let (page, _) = plan.apply(&records);
    page.iter().map(|u| u.id).collect()
}

fn filtered(filter: &str) -> Vec<i64> {
    ids(QueryParams::default().filter(filter).into_options())
}

// ============================================================================
// Generated items
// ============================================================================

#[test]
fn test_field_constants() {
    assert_eq!(User::ID, "id");
    assert_eq!(User::NAME, "name");
    assert_eq!(User::CREATED_AT, "created_at");
    assert_eq!(User::ADDRESS, "address");
    assert_eq!(Address::ZIP, "zip");
}

#[test]
fn test_schema_registration() {
    let schema = User::schema();
    assert_eq!(schema.name(), "User");
    assert_eq!(schema.primary_key(), Some("id"));

    assert_eq!(schema.resolve("score").unwrap().kind(), FieldKind::Float);
    assert!(schema.resolve("score").unwrap().field_type().optional);
    assert!(!schema.resolve("name").unwrap().field_type().optional);
    assert_eq!(schema.resolve("address.zip").unwrap().kind(), FieldKind::String);
    assert!(schema.resolve("billing.city").unwrap().field_type().optional);

    assert!(schema.resolve("password_hash").is_err());
    assert!(schema.resolve("notes").is_err());
}

#[test]
fn test_enum_table() {
    assert_eq!(
        Status::VARIANTS,
        &[("pending", 0), ("active", 1), ("gone", 7)]
    );
    assert_eq!(Status::Archived.discriminant(), 7);
}

// ============================================================================
// Queries over derived schemas
// ============================================================================

#[test]
fn test_default_order_is_key_descending() {
    assert_eq!(ids(QueryOptions::new()), vec![4, 3, 2, 1]);
}

#[test]
fn test_string_filter() {
    assert_eq!(filtered("name,startswith,car"), vec![3]);
}

#[test]
fn test_enum_filter_by_name_and_discriminant() {
    assert_eq!(filtered("status,eq,active"), vec![4, 1]);
    assert_eq!(filtered("status,eq,gone"), vec![3]);
    assert_eq!(filtered("status,ne,0"), vec![4, 3, 1]);
}

#[test]
fn test_enum_filter_rejects_unknown_member() {
    let result = QueryParams::default()
        .filter("status,eq,deleted")
        .into_options()
        .compile(&User::schema());
    assert!(matches!(result, Err(QueryError::Coercion { .. })));
}

#[test]
fn test_timestamp_filter() {
    assert_eq!(filtered("created_at,ge,2024-03-03"), vec![4, 3]);
    assert_eq!(filtered("created_at,lt,2024-03-02T00:00:00Z"), vec![1]);
}

#[test]
fn test_optional_field_null_literal() {
    assert_eq!(filtered("score,eq,null"), vec![4, 1]);
    assert_eq!(filtered("score,ne,null"), vec![3, 2]);
    assert_eq!(filtered("score,gt,8"), vec![3]);
}

#[test]
fn test_bool_filter() {
    assert_eq!(filtered("verified,eq,true"), vec![4, 2]);
}

#[test]
fn test_nested_filters() {
    assert_eq!(filtered("address.city,eq,porto"), vec![4]);
    assert_eq!(filtered("billing.city,eq,faro"), vec![4]);
    assert_eq!(filtered("billing.city,eq,null"), vec![3, 2, 1]);
}

#[test]
fn test_sort_by_score_puts_nulls_last() {
    let options = QueryOptions::new().order_asc(User::SCORE);
    assert_eq!(ids(options), vec![2, 3, 1, 4]);
}

#[test]
fn test_for_type_executor() {
    let query = Query::<User>::for_type();
    let plan = query
        .plan(&QueryOptions::new().and_eq(User::NAME, "diogo"))
        .unwrap();
    let records = users();
    let (page, total) = plan.apply(&records);
    assert_eq!(total, 1);
    assert_eq!(page[0].id, 4);
}
