//! Request parameters.
//!
//! [`QueryParams`] is the wire shape a list endpoint receives:
//!
//! ```json
//! { "filter": "name,contains,al", "orderBy": "id desc", "pageNo": 1, "size": 10 }
//! ```
//!
//! Every field is optional. `pageNo` defaults to 1 and `size` to -1
//! (unpaged).

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, Result};
use crate::grammar::{parse_filter, parse_order_by};
use crate::query::{QueryOptions, DEFAULT_PAGE_NO, DEFAULT_SIZE};

/// Page size of endpoints that list records for display.
pub const LIST_PAGE_SIZE: i64 = 10;

fn default_page_no() -> i64 {
    DEFAULT_PAGE_NO
}

fn default_size() -> i64 {
    DEFAULT_SIZE
}

/// Filter, sort, and paging parameters as received from a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    #[serde(default = "default_page_no")]
    pub page_no: i64,
    #[serde(default = "default_size")]
    pub size: i64,
}

impl Default for QueryParams {
    fn default() -> Self {
        QueryParams {
            filter: None,
            order_by: None,
            page_no: DEFAULT_PAGE_NO,
            size: DEFAULT_SIZE,
        }
    }
}

impl QueryParams {
    /// Parameters with an endpoint-specific default page size.
    pub fn with_default_size(size: i64) -> Self {
        QueryParams {
            size,
            ..QueryParams::default()
        }
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    pub fn page(mut self, page_no: i64, size: i64) -> Self {
        self.page_no = page_no;
        self.size = size;
        self
    }

    /// Reads parameters from query-string pairs.
    ///
    /// Keys are matched case-insensitively; unknown keys are ignored. A
    /// page number or size that is not an integer is an error. `size`
    /// falls back to `default_size` when absent.
    ///
    /// ```
    /// use dataquery::QueryParams;
    ///
    /// let params = QueryParams::from_pairs(
    ///     [("filter", "name,eq,bob"), ("pageNo", "2"), ("size", "5")],
    ///     -1,
    /// )
    /// .unwrap();
    /// assert_eq!(params.filter.as_deref(), Some("name,eq,bob"));
    /// assert_eq!(params.page_no, 2);
    /// ```
    pub fn from_pairs<I, K, V>(pairs: I, default_size: i64) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = QueryParams::with_default_size(default_size);
        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref().to_ascii_lowercase().as_str() {
                "filter" => params.filter = Some(value.to_string()),
                "orderby" => params.order_by = Some(value.to_string()),
                "pageno" => params.page_no = parse_int("pageNo", value)?,
                "size" => params.size = parse_int("size", value)?,
                _ => {}
            }
        }
        Ok(params)
    }

    /// Tokenizes the filter and sort strings.
    pub fn to_options(&self) -> QueryOptions {
        QueryOptions {
            filters: self.filter.as_deref().map(parse_filter).unwrap_or_default(),
            orderings: self
                .order_by
                .as_deref()
                .map(parse_order_by)
                .unwrap_or_default(),
            page_no: self.page_no,
            size: self.size,
        }
    }

    pub fn into_options(self) -> QueryOptions {
        self.to_options()
    }
}

impl From<QueryParams> for QueryOptions {
    fn from(params: QueryParams) -> Self {
        params.to_options()
    }
}

fn parse_int(name: &str, value: &str) -> Result<i64> {
    value
        .trim()
        .parse()
        .map_err(|e| QueryError::Params(format!("{name} must be an integer, got '{value}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause::Clause;
    use crate::op::Op;
    use crate::ordering::OrderBy;

    #[test]
    fn defaults() {
        let params: QueryParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params, QueryParams::default());
        assert_eq!(params.page_no, 1);
        assert_eq!(params.size, -1);
    }

    #[test]
    fn camel_case_wire_names() {
        let params: QueryParams = serde_json::from_str(
            r#"{"filter":"age,gt,3","orderBy":"name desc","pageNo":3,"size":25}"#,
        )
        .unwrap();
        assert_eq!(params.order_by.as_deref(), Some("name desc"));
        assert_eq!(params.page_no, 3);
        assert_eq!(params.size, 25);

        let json = serde_json::to_string(&QueryParams::default().order_by("id")).unwrap();
        assert_eq!(json, r#"{"orderBy":"id","pageNo":1,"size":-1}"#);
    }

    #[test]
    fn into_options_runs_the_grammar() {
        let options = QueryParams::default()
            .filter("Name,eq,Bob,or,age,gt,3")
            .order_by("name desc,id")
            .page(2, 10)
            .into_options();

        assert_eq!(options.filters.len(), 2);
        assert_eq!(options.filters[1], Clause::new("age", Op::Gt, "3"));
        assert_eq!(
            options.orderings,
            vec![OrderBy::desc("name"), OrderBy::asc("id")]
        );
        assert_eq!(options.window().skip, 10);
    }

    #[test]
    fn absent_strings_give_empty_options() {
        let options = QueryOptions::from(QueryParams::default());
        assert!(options.filters.is_empty());
        assert!(options.orderings.is_empty());
        assert!(options.is_unpaged());
    }

    #[test]
    fn from_pairs_uses_endpoint_default_size() {
        let params = QueryParams::from_pairs(Vec::<(&str, &str)>::new(), LIST_PAGE_SIZE).unwrap();
        assert_eq!(params.size, 10);

        let params = QueryParams::from_pairs([("SIZE", "-1"), ("OrderBy", "id")], 10).unwrap();
        assert_eq!(params.size, -1);
        assert_eq!(params.order_by.as_deref(), Some("id"));
    }

    #[test]
    fn from_pairs_rejects_bad_integers() {
        let err = QueryParams::from_pairs([("pageNo", "two")], -1).unwrap_err();
        assert!(matches!(err, QueryError::Params(_)));
        assert!(err.to_string().contains("pageNo"));
    }
}
