//! Filter clauses.
//!
//! A [`Clause`] is one parsed filter term: a field path, an operator, the
//! raw literal, and the logical operator joining it to the next clause.
//! Clauses stay textual; they are typed against a schema only when a
//! [`Filter`](crate::Filter) is compiled.

use std::fmt;

use crate::op::{Join, Op};

/// A single filter term.
///
/// # Example
///
/// ```
/// use dataquery::{Clause, Join, Op};
///
/// let clause = Clause::new("name", Op::Eq, "alice").join(Join::Or);
/// assert_eq!(clause.to_string(), "name,eq,alice");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    /// Field path, possibly nested (`address.city`).
    pub field: String,
    /// The conditional operator.
    pub op: Op,
    /// The literal, still as text.
    pub value: String,
    /// How this clause combines with the next one. Ignored on the last
    /// clause.
    pub join: Join,
}

impl Clause {
    /// Creates a new clause joined to its successor with AND.
    pub fn new(field: impl Into<String>, op: Op, value: impl Into<String>) -> Self {
        Clause {
            field: field.into(),
            op,
            value: value.into(),
            join: Join::And,
        }
    }

    /// Sets how this clause combines with the next one.
    pub fn join(mut self, join: Join) -> Self {
        self.join = join;
        self
    }
}

/// Formats the clause in filter grammar form, without its join.
impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.field, self.op.token(), self.value)
    }
}

/// Encodes clauses back into a filter string.
///
/// The inverse of [`parse_filter`](crate::parse_filter) for clauses whose
/// fields and values contain no grammar tokens.
pub fn format_filter(clauses: &[Clause]) -> String {
    let mut out = String::new();
    for (i, clause) in clauses.iter().enumerate() {
        if i > 0 {
            out.push_str(clauses[i - 1].join.token());
        }
        out.push_str(&clause.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_defaults_to_and() {
        let clause = Clause::new("name", Op::Contains, "bob");
        assert_eq!(clause.join, Join::And);
        assert_eq!(clause.field, "name");
        assert_eq!(clause.value, "bob");
    }

    #[test]
    fn display_uses_operator_token() {
        assert_eq!(
            Clause::new("age", Op::Ge, "30").to_string(),
            "age,ge,30"
        );
        assert_eq!(
            Clause::new("email", Op::NotContains, "@test").to_string(),
            "email,notcontains,@test"
        );
    }

    #[test]
    fn format_filter_uses_preceding_join() {
        let clauses = vec![
            Clause::new("a", Op::Eq, "1"),
            Clause::new("b", Op::Eq, "2").join(Join::Or),
            Clause::new("c", Op::Eq, "3"),
        ];
        assert_eq!(format_filter(&clauses), "a,eq,1,and,b,eq,2,or,c,eq,3");
        assert_eq!(format_filter(&[]), "");
    }
}
