//! Query options, compiled plans, and execution.
//!
//! [`QueryOptions`] is the textual request: clauses, sort keys, and paging.
//! Compiling it against a [`Schema`] yields a [`QueryPlan`], which holds the
//! typed predicate and comparator and can be applied to an in-memory
//! collection or handed to a [`RecordSource`] for materialization.
//! [`Query`] bundles a schema with the compile-and-execute steps.

use std::cmp::Ordering;
use std::fmt;

use tracing::debug;

use crate::clause::Clause;
use crate::error::Result;
use crate::filter::Filter;
use crate::op::{Join, Op};
use crate::ordering::{Dir, OrderBy, Sort};
use crate::page::QueryResult;
use crate::schema::Schema;
use crate::source::RecordSource;
use crate::traits::Queryable;

/// Default page number.
pub const DEFAULT_PAGE_NO: i64 = 1;

/// Default page size. Any size `<= 0` returns every match, unpaged.
pub const DEFAULT_SIZE: i64 = -1;

/// Number of records to skip before the requested page.
///
/// Only a page number above 1 with a positive size skips anything.
///
/// ```
/// use dataquery::skip_count;
///
/// assert_eq!(skip_count(1, 10), 0);
/// assert_eq!(skip_count(3, 10), 20);
/// assert_eq!(skip_count(3, -1), 0);
/// assert_eq!(skip_count(0, 10), 0);
/// ```
pub fn skip_count(page_no: i64, size: i64) -> usize {
    if page_no > 1 && size > 0 {
        usize::try_from((page_no - 1).saturating_mul(size)).unwrap_or(usize::MAX)
    } else {
        0
    }
}

/// The slice of the ordered matches a query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Records to skip.
    pub skip: usize,
    /// Records to take after skipping; `None` takes the rest.
    pub take: Option<usize>,
}

impl Window {
    pub fn new(page_no: i64, size: i64) -> Self {
        Window {
            skip: skip_count(page_no, size),
            take: usize::try_from(size).ok().filter(|&n| n > 0),
        }
    }

    /// Returns `true` if the window covers every record.
    pub fn is_unbounded(&self) -> bool {
        self.skip == 0 && self.take.is_none()
    }

    /// Applies the window to an iterator.
    pub fn apply<I: Iterator>(&self, iter: I) -> impl Iterator<Item = I::Item> {
        iter.skip(self.skip).take(self.take.unwrap_or(usize::MAX))
    }
}

/// Filter, sort, and paging parameters of one request.
///
/// Clauses chain with the join stored on the clause before them, so the
/// builder methods set the previous clause's join when adding a new one.
///
/// # Example
///
/// ```
/// use dataquery::{Join, Op, QueryOptions};
///
/// let options = QueryOptions::new()
///     .and_eq("status", "active")
///     .and_ge("age", 18)
///     .or_contains("name", "admin")
///     .order_desc("created")
///     .page(2, 20);
///
/// assert_eq!(options.filters.len(), 3);
/// assert_eq!(options.filters[0].join, Join::And);
/// assert_eq!(options.filters[1].join, Join::Or);
/// assert_eq!(options.filters[2].op, Op::Contains);
/// assert_eq!(options.window().skip, 20);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    pub filters: Vec<Clause>,
    pub orderings: Vec<OrderBy>,
    pub page_no: i64,
    pub size: i64,
}

impl Default for QueryOptions {
    fn default() -> Self {
        QueryOptions {
            filters: Vec::new(),
            orderings: Vec::new(),
            page_no: DEFAULT_PAGE_NO,
            size: DEFAULT_SIZE,
        }
    }
}

impl QueryOptions {
    /// Creates options that match everything, in default order, unpaged.
    pub fn new() -> Self {
        QueryOptions::default()
    }

    // ========================================================================
    // Generic clause builders
    // ========================================================================

    fn push(mut self, join: Join, clause: Clause) -> Self {
        if let Some(last) = self.filters.last_mut() {
            last.join = join;
        }
        self.filters.push(clause);
        self
    }

    /// Adds a clause ANDed with everything before it.
    pub fn and(self, field: &str, op: Op, value: impl fmt::Display) -> Self {
        self.push(Join::And, Clause::new(field, op, value.to_string()))
    }

    /// Adds a clause ORed with everything before it.
    pub fn or(self, field: &str, op: Op, value: impl fmt::Display) -> Self {
        self.push(Join::Or, Clause::new(field, op, value.to_string()))
    }

    /// Adds a `custom` clause for the schema's custom handler.
    ///
    /// Custom predicates are always ANDed with the rest of the filter.
    pub fn custom(mut self, field: &str, value: impl fmt::Display) -> Self {
        self.filters
            .push(Clause::new(field, Op::Custom, value.to_string()));
        self
    }

    // ========================================================================
    // AND shorthand methods
    // ========================================================================

    pub fn and_eq(self, field: &str, value: impl fmt::Display) -> Self {
        self.and(field, Op::Eq, value)
    }

    pub fn and_ne(self, field: &str, value: impl fmt::Display) -> Self {
        self.and(field, Op::Ne, value)
    }

    pub fn and_gt(self, field: &str, value: impl fmt::Display) -> Self {
        self.and(field, Op::Gt, value)
    }

    pub fn and_ge(self, field: &str, value: impl fmt::Display) -> Self {
        self.and(field, Op::Ge, value)
    }

    pub fn and_lt(self, field: &str, value: impl fmt::Display) -> Self {
        self.and(field, Op::Lt, value)
    }

    pub fn and_le(self, field: &str, value: impl fmt::Display) -> Self {
        self.and(field, Op::Le, value)
    }

    pub fn and_contains(self, field: &str, value: impl fmt::Display) -> Self {
        self.and(field, Op::Contains, value)
    }

    pub fn and_not_contains(self, field: &str, value: impl fmt::Display) -> Self {
        self.and(field, Op::NotContains, value)
    }

    pub fn and_starts_with(self, field: &str, value: impl fmt::Display) -> Self {
        self.and(field, Op::StartsWith, value)
    }

    pub fn and_ends_with(self, field: &str, value: impl fmt::Display) -> Self {
        self.and(field, Op::EndsWith, value)
    }

    // ========================================================================
    // OR shorthand methods
    // ========================================================================

    pub fn or_eq(self, field: &str, value: impl fmt::Display) -> Self {
        self.or(field, Op::Eq, value)
    }

    pub fn or_ne(self, field: &str, value: impl fmt::Display) -> Self {
        self.or(field, Op::Ne, value)
    }

    pub fn or_contains(self, field: &str, value: impl fmt::Display) -> Self {
        self.or(field, Op::Contains, value)
    }

    pub fn or_starts_with(self, field: &str, value: impl fmt::Display) -> Self {
        self.or(field, Op::StartsWith, value)
    }

    // ========================================================================
    // Ordering and paging
    // ========================================================================

    /// Adds a sort key. Earlier keys take priority.
    pub fn order_by(mut self, field: &str, dir: Dir) -> Self {
        self.orderings.push(OrderBy::new(field, dir));
        self
    }

    pub fn order_asc(self, field: &str) -> Self {
        self.order_by(field, Dir::Asc)
    }

    pub fn order_desc(self, field: &str) -> Self {
        self.order_by(field, Dir::Desc)
    }

    /// Sets the page number (1-based) and page size.
    pub fn page(mut self, page_no: i64, size: i64) -> Self {
        self.page_no = page_no;
        self.size = size;
        self
    }

    /// Returns the paging window these options select.
    pub fn window(&self) -> Window {
        Window::new(self.page_no, self.size)
    }

    /// Returns `true` if every match is returned in one page.
    pub fn is_unpaged(&self) -> bool {
        self.size <= 0
    }

    /// Compiles these options against a schema.
    pub fn compile<T>(&self, schema: &Schema<T>) -> Result<QueryPlan<T>> {
        QueryPlan::compile(self, schema)
    }
}

/// A query compiled against a schema.
///
/// Plans are immutable and `Send + Sync`; one plan may be applied to any
/// number of collections, concurrently.
pub struct QueryPlan<T> {
    clauses: Vec<Clause>,
    orderings: Vec<OrderBy>,
    filter: Filter<T>,
    sort: Sort<T>,
    page_no: i64,
    size: i64,
}

impl<T> QueryPlan<T> {
    /// Resolves and type-checks every clause and sort key.
    pub fn compile(options: &QueryOptions, schema: &Schema<T>) -> Result<Self> {
        let filter = Filter::compile(&options.filters, schema)?;
        let sort = Sort::compile(&options.orderings, schema)?;
        let orderings = sort.keys();

        debug!(
            schema = schema.name(),
            clauses = options.filters.len(),
            sort_keys = orderings.len(),
            page_no = options.page_no,
            size = options.size,
            "compiled query plan"
        );

        Ok(QueryPlan {
            clauses: options.filters.clone(),
            orderings,
            filter,
            sort,
            page_no: options.page_no,
            size: options.size,
        })
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// The clauses this plan was compiled from.
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// The effective sort keys, including the default primary key order.
    pub fn orderings(&self) -> &[OrderBy] {
        &self.orderings
    }

    pub fn filter(&self) -> &Filter<T> {
        &self.filter
    }

    pub fn sort(&self) -> &Sort<T> {
        &self.sort
    }

    pub fn window(&self) -> Window {
        Window::new(self.page_no, self.size)
    }

    pub fn page_no(&self) -> i64 {
        self.page_no
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Tests a record against the compiled predicate.
    pub fn matches(&self, record: &T) -> bool {
        self.filter.matches(record)
    }

    /// Compares two records by the compiled sort keys.
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        self.sort.compare(a, b)
    }

    /// Filters, sorts, and windows a collection.
    ///
    /// Returns the page and the number of matches before windowing.
    pub fn apply<'a, I>(&self, records: I) -> (Vec<&'a T>, usize)
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let mut matched: Vec<&'a T> = records
            .into_iter()
            .filter(|record| self.matches(record))
            .collect();
        let total = matched.len();

        if !self.sort.is_empty() {
            matched.sort_by(|a, b| self.compare(a, b));
        }

        let page = self.window().apply(matched.into_iter()).collect();
        (page, total)
    }

    /// Materializes the plan from a record source.
    ///
    /// This awaits the source exactly once. Dropping the returned future
    /// abandons the query without producing a partial result.
    pub async fn execute<S>(&self, source: &S) -> Result<QueryResult<T>>
    where
        S: RecordSource<T> + ?Sized,
        T: Send + Sync + 'static,
    {
        self.execute_map(source, |record| record).await
    }

    /// Like [`execute`](Self::execute), projecting each record of the page.
    ///
    /// The projection runs after filtering, sorting, and windowing, so it
    /// never changes which records are returned or the total.
    pub async fn execute_map<S, U, F>(&self, source: &S, project: F) -> Result<QueryResult<U>>
    where
        S: RecordSource<T> + ?Sized,
        T: Send + Sync + 'static,
        F: FnMut(T) -> U,
    {
        let fetched = source.fetch(self).await?;
        let items: Vec<U> = fetched.items.into_iter().map(project).collect();

        debug!(
            skip = self.window().skip,
            returned = items.len(),
            total = fetched.total,
            "query executed"
        );

        Ok(self.envelope(items, fetched.total))
    }

    fn envelope<U>(&self, items: Vec<U>, total: usize) -> QueryResult<U> {
        if self.size <= 0 {
            let len = items.len();
            return QueryResult {
                items,
                total_records: len,
                page_no: 1,
                size: i64::try_from(len).unwrap_or(i64::MAX),
            };
        }

        QueryResult {
            items,
            total_records: total,
            page_no: self.page_no.max(1),
            size: self.size,
        }
    }
}

impl<T> Clone for QueryPlan<T> {
    fn clone(&self) -> Self {
        QueryPlan {
            clauses: self.clauses.clone(),
            orderings: self.orderings.clone(),
            filter: self.filter.clone(),
            sort: self.sort.clone(),
            page_no: self.page_no,
            size: self.size,
        }
    }
}

impl<T> fmt::Debug for QueryPlan<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryPlan")
            .field("clauses", &self.clauses)
            .field("orderings", &self.orderings)
            .field("filter", &self.filter)
            .field("window", &self.window())
            .finish()
    }
}

/// Executor for one record type.
///
/// Holds the schema, compiles fresh options on every call, and runs them
/// against a record source.
///
/// # Example
///
/// ```
/// use dataquery::{FieldKind, FieldType, MemorySource, Number, Query, QueryOptions, Schema, Value};
///
/// #[derive(Clone)]
/// struct Row {
///     id: i64,
/// }
///
/// let schema = Schema::builder("Row")
///     .field("id", FieldType::new(FieldKind::Integer), |r: &Row| {
///         Value::Number(Number::from(r.id))
///     })
///     .build();
///
/// let query = Query::new(schema);
/// let plan = query.plan(&QueryOptions::new().and_gt("id", 1)).unwrap();
/// let rows = vec![Row { id: 1 }, Row { id: 2 }, Row { id: 3 }];
/// let (page, total) = plan.apply(&rows);
///
/// assert_eq!(total, 2);
/// assert_eq!(page[0].id, 3);
/// ```
pub struct Query<T> {
    schema: Schema<T>,
}

impl<T: Queryable> Query<T> {
    /// Creates an executor from the type's registered schema.
    pub fn for_type() -> Self {
        Query::new(T::schema())
    }
}

impl<T> Query<T> {
    pub fn new(schema: Schema<T>) -> Self {
        Query { schema }
    }

    pub fn schema(&self) -> &Schema<T> {
        &self.schema
    }

    /// Compiles options against this executor's schema.
    pub fn plan(&self, options: &QueryOptions) -> Result<QueryPlan<T>> {
        QueryPlan::compile(options, &self.schema)
    }

    /// Compiles and executes options against a record source.
    pub async fn execute<S>(&self, options: &QueryOptions, source: &S) -> Result<QueryResult<T>>
    where
        S: RecordSource<T> + ?Sized,
        T: Send + Sync + 'static,
    {
        self.plan(options)?.execute(source).await
    }

    /// Compiles and executes options, projecting each record of the page.
    pub async fn execute_map<S, U, F>(
        &self,
        options: &QueryOptions,
        source: &S,
        project: F,
    ) -> Result<QueryResult<U>>
    where
        S: RecordSource<T> + ?Sized,
        T: Send + Sync + 'static,
        F: FnMut(T) -> U,
    {
        self.plan(options)?.execute_map(source, project).await
    }
}

impl<T> Clone for Query<T> {
    fn clone(&self) -> Self {
        Query {
            schema: self.schema.clone(),
        }
    }
}

impl<T> fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("schema", &self.schema)
            .finish()
    }
}
