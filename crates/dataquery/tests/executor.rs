//! Asynchronous execution against record sources.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dataquery::{
    FieldKind, FieldType, Fetched, MemorySource, Number, Query, QueryError, QueryOptions,
    QueryParams, QueryPlan, RecordPredicate, RecordSource, Result, Schema, Value,
};

// ============================================================================
// Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct Order {
    id: i64,
    customer: String,
    total: f64,
    tenant: u32,
}

fn order(id: i64, customer: &str, total: f64, tenant: u32) -> Order {
    Order {
        id,
        customer: customer.to_string(),
        total,
        tenant,
    }
}

fn orders() -> Vec<Order> {
    vec![
        order(1, "acme", 120.0, 1),
        order(2, "globex", 80.5, 1),
        order(3, "acme", 15.0, 2),
        order(4, "initech", 300.0, 1),
        order(5, "acme", 42.0, 1),
    ]
}

fn schema() -> Schema<Order> {
    Schema::builder("Order")
        .field("id", FieldType::new(FieldKind::Integer), |o: &Order| {
            Value::Number(Number::from(o.id))
        })
        .field("customer", FieldType::new(FieldKind::String), |o: &Order| {
            Value::String(&o.customer)
        })
        .field("total", FieldType::new(FieldKind::Float), |o: &Order| {
            Value::Number(Number::from(o.total))
        })
        .primary_key("id")
        .build()
}

fn tenant_schema(tenant: u32) -> Schema<Order> {
    Schema::builder("Order")
        .field("id", FieldType::new(FieldKind::Integer), |o: &Order| {
            Value::Number(Number::from(o.id))
        })
        .field("customer", FieldType::new(FieldKind::String), |o: &Order| {
            Value::String(&o.customer)
        })
        .custom(|field, value| {
            let min: f64 = value
                .parse()
                .map_err(|_| QueryError::Params(format!("bad {field} value '{value}'")))?;
            let predicate: RecordPredicate<Order> = Arc::new(move |o: &Order| o.total >= min);
            Ok(predicate)
        })
        .base_filter(move |o: &Order| o.tenant == tenant)
        .build()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A source that waits before answering.
struct SlowSource {
    inner: MemorySource<Order>,
    delay: Duration,
}

#[async_trait]
impl RecordSource<Order> for SlowSource {
    async fn fetch(&self, plan: &QueryPlan<Order>) -> Result<Fetched<Order>> {
        tokio::time::sleep(self.delay).await;
        self.inner.fetch(plan).await
    }
}

/// A source whose backing store is unavailable.
struct BrokenSource;

#[async_trait]
impl RecordSource<Order> for BrokenSource {
    async fn fetch(&self, _plan: &QueryPlan<Order>) -> Result<Fetched<Order>> {
        Err(QueryError::from_source(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "store unavailable",
        )))
    }
}

// ============================================================================
// Execution
// ============================================================================

#[tokio::test]
async fn execute_returns_page_and_total() {
    init_tracing();
    let source = MemorySource::new(orders());
    let options = QueryParams::default()
        .filter("customer,eq,ACME")
        .order_by("total desc")
        .page(1, 2)
        .into_options();

    let result = Query::new(schema()).execute(&options, &source).await.unwrap();

    let ids: Vec<i64> = result.items.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![1, 5]);
    assert_eq!(result.total_records, 3);
    assert_eq!(result.page_no, 1);
    assert_eq!(result.size, 2);
    assert_eq!(result.page_count(), 2);
}

#[tokio::test]
async fn execute_second_page() {
    let source = MemorySource::new(orders());
    let options = QueryOptions::new().page(2, 2);

    let result = Query::new(schema()).execute(&options, &source).await.unwrap();

    let ids: Vec<i64> = result.items.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![3, 2]);
    assert_eq!(result.total_records, 5);
    assert_eq!(result.page_no, 2);
}

#[tokio::test]
async fn unpaged_envelope_reports_item_count() {
    let source = MemorySource::new(orders());
    let options = QueryOptions::new().and_gt("total", 50).page(4, -1);

    let result = Query::new(schema()).execute(&options, &source).await.unwrap();

    assert_eq!(result.len(), 3);
    assert_eq!(result.total_records, 3);
    assert_eq!(result.page_no, 1);
    assert_eq!(result.size, 3);
}

#[tokio::test]
async fn execute_map_projects_after_windowing() {
    let source = MemorySource::new(orders());
    let options = QueryOptions::new().order_asc("customer").order_asc("id").page(1, 3);

    let result = Query::new(schema())
        .execute_map(&options, &source, |o| o.customer)
        .await
        .unwrap();

    assert_eq!(result.items, vec!["acme", "acme", "acme"]);
    assert_eq!(result.total_records, 5);
}

#[tokio::test]
async fn base_filter_and_custom_handler() {
    let source = MemorySource::new(orders());
    let query = Query::new(tenant_schema(1));

    // The custom clause is ANDed even though an OR precedes it.
    let options = QueryParams::default()
        .filter("customer,eq,globex,or,minimum,custom,100")
        .into_options();
    let result = query.execute(&options, &source).await.unwrap();
    assert_eq!(result.total_records, 0);

    let options = QueryParams::default()
        .filter("customer,eq,acme,and,minimum,custom,40")
        .into_options();
    let result = query.execute(&options, &source).await.unwrap();
    let ids: Vec<i64> = result.items.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![5, 1]);
}

#[tokio::test]
async fn custom_without_handler_is_rejected() {
    let source = MemorySource::new(orders());
    let options = QueryParams::default()
        .filter("anything,custom,1")
        .into_options();

    let err = Query::new(schema())
        .execute(&options, &source)
        .await
        .unwrap_err();
    assert!(matches!(err, QueryError::CustomNotImplemented { schema: "Order" }));
}

#[tokio::test]
async fn shared_source_behind_arc() {
    let source: Arc<dyn RecordSource<Order>> = Arc::new(MemorySource::new(orders()));
    let plan = Query::new(schema())
        .plan(&QueryOptions::new().and_lt("total", 50))
        .unwrap();

    let result = plan.execute(&source).await.unwrap();
    let ids: Vec<i64> = result.items.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![5, 3]);
}

#[tokio::test]
async fn source_errors_propagate() {
    let plan = Query::new(schema()).plan(&QueryOptions::new()).unwrap();

    let err = plan.execute(&BrokenSource).await.unwrap_err();
    assert!(matches!(err, QueryError::Source(_)));
    assert!(err.to_string().contains("store unavailable"));
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn timeout_abandons_query_without_partial_result() {
    let source = SlowSource {
        inner: MemorySource::new(orders()),
        delay: Duration::from_secs(30),
    };
    let plan = Query::new(schema()).plan(&QueryOptions::new()).unwrap();

    let outcome = tokio::time::timeout(Duration::from_millis(20), plan.execute(&source)).await;
    assert!(outcome.is_err());
}

#[tokio::test]
async fn slow_source_completes_within_deadline() {
    let source = SlowSource {
        inner: MemorySource::new(orders()),
        delay: Duration::from_millis(5),
    };
    let plan = Query::new(schema())
        .plan(&QueryOptions::new().page(1, 1))
        .unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), plan.execute(&source))
        .await
        .expect("query should finish in time")
        .unwrap();
    assert_eq!(result.items[0].id, 5);
    assert_eq!(result.total_records, 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn plans_are_shared_across_tasks() {
    let source = Arc::new(MemorySource::new(orders()));
    let plan = Arc::new(
        Query::new(schema())
            .plan(&QueryOptions::new().and_contains("customer", "ac"))
            .unwrap(),
    );

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let plan = Arc::clone(&plan);
            let source = Arc::clone(&source);
            tokio::spawn(async move { plan.execute(&source).await.map(|r| r.total_records) })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), 3);
    }
}
