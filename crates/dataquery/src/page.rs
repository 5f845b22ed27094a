//! The paginated result envelope.

use serde::{Deserialize, Serialize};

/// One page of query results.
///
/// Serializes as `{ "items", "totalRecords", "pageNo", "size" }`.
///
/// `total_records` counts every record that matched the filter, not just
/// this page. An unpaged query reports `page_no` 1 and a `size` equal to
/// the number of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult<T> {
    pub items: Vec<T>,
    pub total_records: usize,
    pub page_no: i64,
    pub size: i64,
}

impl<T> QueryResult<T> {
    /// Transforms each item, keeping the paging fields.
    pub fn map<U, F>(self, f: F) -> QueryResult<U>
    where
        F: FnMut(T) -> U,
    {
        QueryResult {
            items: self.items.into_iter().map(f).collect(),
            total_records: self.total_records,
            page_no: self.page_no,
            size: self.size,
        }
    }

    /// Number of items on this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of pages needed to show every match at this page size.
    pub fn page_count(&self) -> usize {
        match usize::try_from(self.size) {
            Ok(size) if size > 0 => self.total_records.div_ceil(size),
            _ => usize::from(self.total_records > 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page() -> QueryResult<&'static str> {
        QueryResult {
            items: vec!["a", "b"],
            total_records: 5,
            page_no: 2,
            size: 2,
        }
    }

    #[test]
    fn serializes_with_camel_case_names() {
        let value = serde_json::to_value(page()).unwrap();
        assert_eq!(
            value,
            json!({
                "items": ["a", "b"],
                "totalRecords": 5,
                "pageNo": 2,
                "size": 2,
            })
        );
    }

    #[test]
    fn deserializes_envelope() {
        let parsed: QueryResult<i64> = serde_json::from_str(
            r#"{"items":[1,2,3],"totalRecords":3,"pageNo":1,"size":3}"#,
        )
        .unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed.total_records, 3);
    }

    #[test]
    fn map_keeps_paging() {
        let mapped = page().map(str::len);
        assert_eq!(mapped.items, vec![1, 1]);
        assert_eq!(mapped.total_records, 5);
        assert_eq!(mapped.page_no, 2);
    }

    #[test]
    fn page_count() {
        assert_eq!(page().page_count(), 3);

        let unpaged = QueryResult::<u8> {
            items: vec![],
            total_records: 0,
            page_no: 1,
            size: 0,
        };
        assert_eq!(unpaged.page_count(), 0);
        assert!(unpaged.is_empty());
    }
}
