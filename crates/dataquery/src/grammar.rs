//! Tokenizer for the filter and sort grammars.
//!
//! # Filter grammar
//!
//! ```text
//! filter := clause (join clause)*
//! clause := field op value
//! op     := ",eq," | ",ne," | ",gt," | ",ge," | ",lt," | ",le,"
//!         | ",contains," | ",notcontains," | ",startswith," | ",endswith,"
//!         | ",custom,"
//! join   := ",and," | ",or,"
//! ```
//!
//! The whole input is lower-cased first. Clauses are cut off left to right:
//! at each step the earlier of the next `,and,` and the next `,or,` ends
//! the current clause and becomes its join. There is no grouping; the
//! joins are later folded strictly left to right.
//!
//! A clause that contains no operator token, or that does not split into
//! exactly one field and one value, is dropped.
//!
//! # Sort grammar
//!
//! ```text
//! order := key ("," key)*
//! key   := field | field " asc" | field " desc"
//! ```

use tracing::{debug, trace};

use crate::clause::Clause;
use crate::op::{Join, Op};
use crate::ordering::{Dir, OrderBy};

/// Separator between sort keys.
pub const FIELD_SEPARATOR: char = ',';

/// Suffix marking an ascending sort key.
pub const SORT_ASC_SUFFIX: &str = " asc";

/// Suffix marking a descending sort key.
pub const SORT_DESC_SUFFIX: &str = " desc";

/// Parses a filter string into its clauses, in order.
///
/// # Example
///
/// ```
/// use dataquery::{parse_filter, Join, Op};
///
/// let clauses = parse_filter("Name,eq,Alice,and,status,eq,active");
/// assert_eq!(clauses.len(), 2);
/// assert_eq!(clauses[0].field, "name");
/// assert_eq!(clauses[0].value, "alice");
/// assert_eq!(clauses[0].op, Op::Eq);
/// assert_eq!(clauses[0].join, Join::And);
/// ```
pub fn parse_filter(filter: &str) -> Vec<Clause> {
    let lowered = filter.to_lowercase();
    let mut rest = lowered.trim();
    let mut clauses = Vec::new();

    while !rest.trim().is_empty() {
        let (current, join, remainder) = split_next(rest);
        match parse_clause(current.trim(), join) {
            Some(clause) => {
                trace!(field = %clause.field, op = %clause.op, join = %clause.join, "parsed filter clause");
                clauses.push(clause);
            }
            None => debug!(clause = current, "dropping unrecognised filter clause"),
        }
        rest = remainder;
    }

    clauses
}

/// Splits off the next clause and the join that follows it.
fn split_next(s: &str) -> (&str, Join, &str) {
    let and = s.find(Join::And.token());
    let or = s.find(Join::Or.token());

    let (idx, join) = match (and, or) {
        (Some(a), Some(o)) if o < a => (o, Join::Or),
        (Some(a), _) => (a, Join::And),
        (None, Some(o)) => (o, Join::Or),
        (None, None) => return (s, Join::And, ""),
    };

    (&s[..idx], join, &s[idx + join.token().len()..])
}

/// Matches one clause against the operator vocabulary.
fn parse_clause(text: &str, join: Join) -> Option<Clause> {
    let op = Op::MATCH_ORDER
        .into_iter()
        .find(|op| text.contains(op.token()))?;

    let parts: Vec<&str> = text
        .split(op.token())
        .filter(|part| !part.is_empty())
        .collect();

    match parts.as_slice() {
        [field, value] if !field.trim().is_empty() && !value.trim().is_empty() => Some(Clause {
            field: field.trim().to_string(),
            op,
            value: value.trim().to_string(),
            join,
        }),
        _ => None,
    }
}

/// Parses a sort string into its keys, in priority order.
///
/// # Example
///
/// ```
/// use dataquery::{parse_order_by, Dir};
///
/// let keys = parse_order_by("LastName desc, firstName");
/// assert_eq!(keys.len(), 2);
/// assert_eq!(keys[0].field, "lastname");
/// assert_eq!(keys[0].dir, Dir::Desc);
/// assert_eq!(keys[1].dir, Dir::Asc);
/// ```
pub fn parse_order_by(order_by: &str) -> Vec<OrderBy> {
    order_by
        .to_lowercase()
        .split(FIELD_SEPARATOR)
        .filter(|piece| !piece.is_empty())
        .filter_map(|piece| {
            let piece = piece.trim();
            let (name, dir) = if let Some(name) = piece.strip_suffix(SORT_DESC_SUFFIX) {
                (name, Dir::Desc)
            } else if let Some(name) = piece.strip_suffix(SORT_ASC_SUFFIX) {
                (name, Dir::Asc)
            } else {
                (piece, Dir::Asc)
            };

            let name = name.trim();
            if name.is_empty() {
                debug!(key = piece, "dropping empty sort key");
                return None;
            }
            Some(OrderBy::new(name, dir))
        })
        .collect()
}
