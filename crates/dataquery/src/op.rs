//! Conditional and logical operators of the filter grammar.
//!
//! The [`Op`] enum is the closed vocabulary of conditional operators. Each
//! operator has a literal grammar token (e.g. `,eq,`). [`Join`] is the
//! logical operator that chains a clause to the next one.

use std::cmp::Ordering;

/// Conditional operator of a filter clause.
///
/// Operators are grouped by the types they support:
/// - **Universal**: `Eq`, `Ne`
/// - **String**: `Contains`, `NotContains`, `StartsWith`, `EndsWith`
/// - **Ordered** (numbers, timestamps): `Gt`, `Ge`, `Lt`, `Le`
/// - **Escape hatch**: `Custom`, handled by the schema's custom handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// String contains substring.
    Contains,
    /// String does not contain substring.
    NotContains,
    /// String starts with prefix.
    StartsWith,
    /// String ends with suffix.
    EndsWith,
    /// Deferred to the schema's custom handler.
    Custom,
}

impl Op {
    /// Order in which clause text is searched for operator tokens.
    ///
    /// The first token found in a clause decides its operator.
    pub const MATCH_ORDER: [Op; 11] = [
        Op::Contains,
        Op::Eq,
        Op::Ne,
        Op::NotContains,
        Op::StartsWith,
        Op::EndsWith,
        Op::Ge,
        Op::Gt,
        Op::Le,
        Op::Lt,
        Op::Custom,
    ];

    /// Returns the grammar token for this operator, e.g. `,eq,`.
    pub fn token(self) -> &'static str {
        match self {
            Op::Eq => ",eq,",
            Op::Ne => ",ne,",
            Op::Gt => ",gt,",
            Op::Ge => ",ge,",
            Op::Lt => ",lt,",
            Op::Le => ",le,",
            Op::Contains => ",contains,",
            Op::NotContains => ",notcontains,",
            Op::StartsWith => ",startswith,",
            Op::EndsWith => ",endswith,",
            Op::Custom => ",custom,",
        }
    }

    /// Returns `true` if this operator is valid for string fields.
    pub fn is_string_op(self) -> bool {
        matches!(
            self,
            Op::Eq | Op::Ne | Op::Contains | Op::NotContains | Op::StartsWith | Op::EndsWith
        )
    }

    /// Returns `true` if this operator is valid for ordered fields
    /// (numbers and timestamps).
    pub fn is_ordering_op(self) -> bool {
        matches!(self, Op::Eq | Op::Ne | Op::Gt | Op::Ge | Op::Lt | Op::Le)
    }

    /// Returns `true` if this operator only tests equality
    /// (the only operators defined for bools and enums).
    pub fn is_equality_op(self) -> bool {
        matches!(self, Op::Eq | Op::Ne)
    }

    /// Evaluates a comparison given an ordering result.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            Op::Eq => ordering == Ordering::Equal,
            Op::Ne => ordering != Ordering::Equal,
            Op::Gt => ordering == Ordering::Greater,
            Op::Ge => ordering != Ordering::Less,
            Op::Lt => ordering == Ordering::Less,
            Op::Le => ordering != Ordering::Greater,
            _ => false, // Not an ordering-based operator
        }
    }

    /// Returns the display name of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "eq",
            Op::Ne => "ne",
            Op::Gt => "gt",
            Op::Ge => "ge",
            Op::Lt => "lt",
            Op::Le => "le",
            Op::Contains => "contains",
            Op::NotContains => "notcontains",
            Op::StartsWith => "startswith",
            Op::EndsWith => "endswith",
            Op::Custom => "custom",
        }
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Logical operator joining a clause to the one after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Join {
    /// Both sides must match.
    #[default]
    And,
    /// Either side may match.
    Or,
}

impl Join {
    /// Returns the grammar token for this join, e.g. `,and,`.
    pub fn token(self) -> &'static str {
        match self {
            Join::And => ",and,",
            Join::Or => ",or,",
        }
    }

    /// Combines an accumulated result with the next test.
    ///
    /// The right side is only evaluated when it can change the outcome.
    pub fn combine(self, acc: bool, next: impl FnOnce() -> bool) -> bool {
        match self {
            Join::And => acc && next(),
            Join::Or => acc || next(),
        }
    }

    /// Returns the display name of this join.
    pub fn as_str(self) -> &'static str {
        match self {
            Join::And => "and",
            Join::Or => "or",
        }
    }
}

impl std::fmt::Display for Join {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
