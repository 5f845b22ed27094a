//! Record sources: the asynchronous materialization boundary.
//!
//! A [`RecordSource`] receives a compiled [`QueryPlan`] and returns the
//! records of the plan's window plus the number of records that matched
//! before windowing. Sources backed by a remote store may push the plan's
//! clauses and orderings down; [`MemorySource`] applies the plan directly.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::query::QueryPlan;

/// The window of records a source materialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched<T> {
    /// Records of the requested window, filtered and ordered.
    pub items: Vec<T>,
    /// Number of records matching the filter, ignoring the window.
    pub total: usize,
}

/// A collection that can be filtered, ordered, windowed, and counted.
///
/// `fetch` is the single suspension point of query execution. A source
/// must either return the complete window or an error; dropping the future
/// abandons the fetch.
#[async_trait]
pub trait RecordSource<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    async fn fetch(&self, plan: &QueryPlan<T>) -> Result<Fetched<T>>;
}

#[async_trait]
impl<T, S> RecordSource<T> for Arc<S>
where
    T: Send + Sync + 'static,
    S: RecordSource<T> + ?Sized,
{
    async fn fetch(&self, plan: &QueryPlan<T>) -> Result<Fetched<T>> {
        (**self).fetch(plan).await
    }
}

/// An in-memory record source.
///
/// Records are kept in insertion order, which is the order ties keep after
/// sorting.
#[derive(Debug, Clone)]
pub struct MemorySource<T> {
    records: Vec<T>,
}

impl<T> MemorySource<T> {
    pub fn new(records: Vec<T>) -> Self {
        MemorySource { records }
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn push(&mut self, record: T) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<T> Default for MemorySource<T> {
    fn default() -> Self {
        MemorySource {
            records: Vec::new(),
        }
    }
}

impl<T> From<Vec<T>> for MemorySource<T> {
    fn from(records: Vec<T>) -> Self {
        MemorySource::new(records)
    }
}

impl<T> FromIterator<T> for MemorySource<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        MemorySource::new(iter.into_iter().collect())
    }
}

#[async_trait]
impl<T> RecordSource<T> for MemorySource<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn fetch(&self, plan: &QueryPlan<T>) -> Result<Fetched<T>> {
        let (page, total) = plan.apply(&self.records);
        Ok(Fetched {
            items: page.into_iter().cloned().collect(),
            total,
        })
    }
}
