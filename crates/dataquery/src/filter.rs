//! Predicate builder.
//!
//! A [`Filter`] is the compiled form of a clause list. Each generic clause
//! becomes a typed test over one resolved field; the tests are folded
//! strictly left to right, each combining with the accumulated result using
//! the join recorded on the clause before it:
//!
//! ```text
//! acc = test[0]
//! acc = acc <join[0]> test[1]
//! acc = acc <join[1]> test[2]
//! ...
//! ```
//!
//! `custom` clauses do not take part in the fold. Their predicates, and the
//! schema's base filter, are ANDed onto the folded result.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::clause::Clause;
use crate::coerce::{coerce, Literal};
use crate::error::{QueryError, Result};
use crate::op::{Join, Op};
use crate::ordering::compare_values;
use crate::schema::{FieldKind, Schema, SchemaField};
use crate::value::Value;

/// A shared boolean test over one record.
pub type RecordPredicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Builds the predicate for a `custom` clause from its field name and
/// literal.
pub type CustomHandler<T> = Arc<dyn Fn(&str, &str) -> Result<RecordPredicate<T>> + Send + Sync>;

/// One typed single-field test.
struct FieldTest<T> {
    field: SchemaField<T>,
    op: Op,
    literal: Literal,
    fold_case: bool,
}

impl<T> FieldTest<T> {
    fn compile(clause: &Clause, schema: &Schema<T>) -> Result<Self> {
        let field = schema.resolve(&clause.field)?;
        let kind = field.kind();

        let valid = match kind {
            FieldKind::String => clause.op.is_string_op(),
            FieldKind::Bool | FieldKind::Enum(_) => clause.op.is_equality_op(),
            _ => clause.op.is_ordering_op(),
        };

        let invalid = || QueryError::InvalidOperator {
            field: field.name().to_string(),
            op: clause.op,
            kind,
        };
        if !valid {
            return Err(invalid());
        }

        let literal = coerce(field.name(), field.field_type(), &clause.value)?;
        if literal.is_null() && !clause.op.is_equality_op() {
            return Err(invalid());
        }

        // Equality on the primary identifier is exact. Every other string
        // test folds the record value to lower case.
        let fold_case = kind == FieldKind::String
            && !(clause.op.is_equality_op() && schema.is_primary_key(field));
        let literal = match literal {
            Literal::String(s) if fold_case => Literal::String(s.to_lowercase()),
            other => other,
        };

        trace!(field = field.name(), op = %clause.op, fold_case, "compiled filter clause");

        Ok(FieldTest {
            field: field.clone(),
            op: clause.op,
            literal,
            fold_case,
        })
    }

    fn matches(&self, record: &T) -> bool {
        let value = self.field.value(record);

        match (&value, &self.literal) {
            (_, Literal::Null) => match self.op {
                Op::Eq => value.is_none(),
                _ => !value.is_none(),
            },
            (Value::None, _) => self.op == Op::Ne,
            (Value::String(s), Literal::String(literal)) => {
                if self.fold_case {
                    string_test(self.op, &s.to_lowercase(), literal)
                } else {
                    string_test(self.op, s, literal)
                }
            }
            _ => match compare_values(&value, &self.literal.as_value()) {
                Some(ordering) => self.op.eval_ordering(ordering),
                None => self.op == Op::Ne,
            },
        }
    }
}

fn string_test(op: Op, value: &str, literal: &str) -> bool {
    match op {
        Op::Eq => value == literal,
        Op::Ne => value != literal,
        Op::Contains => value.contains(literal),
        Op::NotContains => !value.contains(literal),
        Op::StartsWith => value.starts_with(literal),
        Op::EndsWith => value.ends_with(literal),
        _ => false,
    }
}

impl<T> Clone for FieldTest<T> {
    fn clone(&self) -> Self {
        FieldTest {
            field: self.field.clone(),
            op: self.op,
            literal: self.literal.clone(),
            fold_case: self.fold_case,
        }
    }
}

/// A composite record predicate compiled against a schema.
///
/// An empty filter matches every record (subject to the base filter).
///
/// # Example
///
/// ```
/// use dataquery::{parse_filter, Filter, FieldKind, FieldType, Number, Schema, Value};
///
/// struct Row {
///     n: i64,
/// }
///
/// let schema = Schema::builder("Row")
///     .field("n", FieldType::new(FieldKind::Integer), |r: &Row| {
///         Value::Number(Number::from(r.n))
///     })
///     .build();
///
/// let filter = Filter::compile(&parse_filter("n,lt,2,or,n,gt,8"), &schema).unwrap();
/// assert!(filter.matches(&Row { n: 1 }));
/// assert!(!filter.matches(&Row { n: 5 }));
/// assert!(filter.matches(&Row { n: 9 }));
/// ```
pub struct Filter<T> {
    head: Option<FieldTest<T>>,
    tail: Vec<(Join, FieldTest<T>)>,
    custom: Vec<RecordPredicate<T>>,
    base: Option<RecordPredicate<T>>,
}

impl<T> Filter<T> {
    /// Compiles clauses against a schema.
    ///
    /// Fails on the first clause whose field does not resolve, whose literal
    /// does not coerce, or whose operator is not defined for the field's
    /// type. A `custom` clause on a schema without a custom handler fails
    /// with [`QueryError::CustomNotImplemented`].
    pub fn compile(clauses: &[Clause], schema: &Schema<T>) -> Result<Self> {
        let mut head = None;
        let mut tail = Vec::new();
        let mut custom = Vec::new();
        let mut join = Join::And;

        for clause in clauses {
            if clause.op == Op::Custom {
                let handler = schema
                    .custom_handler()
                    .ok_or(QueryError::CustomNotImplemented {
                        schema: schema.name(),
                    })?;
                custom.push(handler(&clause.field, &clause.value)?);
                continue;
            }

            let test = FieldTest::compile(clause, schema)?;
            if head.is_none() {
                head = Some(test);
            } else {
                tail.push((join, test));
            }
            join = clause.join;
        }

        Ok(Filter {
            head,
            tail,
            custom,
            base: schema.base_filter().cloned(),
        })
    }

    /// Tests a record against the filter.
    pub fn matches(&self, record: &T) -> bool {
        let chain = match &self.head {
            Some(head) => self
                .tail
                .iter()
                .fold(head.matches(record), |acc, (join, test)| {
                    join.combine(acc, || test.matches(record))
                }),
            None => true,
        };

        chain
            && self.custom.iter().all(|predicate| predicate(record))
            && self.base.as_ref().is_none_or(|predicate| predicate(record))
    }

    /// Number of generic (non-custom) tests.
    pub fn len(&self) -> usize {
        self.head.iter().count() + self.tail.len()
    }

    /// Returns `true` if the filter has no tests of its own.
    ///
    /// The schema's base filter is not counted.
    pub fn is_empty(&self) -> bool {
        self.head.is_none() && self.custom.is_empty()
    }
}

impl<T> Clone for Filter<T> {
    fn clone(&self) -> Self {
        Filter {
            head: self.head.clone(),
            tail: self.tail.clone(),
            custom: self.custom.clone(),
            base: self.base.clone(),
        }
    }
}

impl<T> fmt::Debug for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("tests", &self.len())
            .field("custom", &self.custom.len())
            .field("base", &self.base.is_some())
            .finish()
    }
}
