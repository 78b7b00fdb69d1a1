//! Local predicate evaluation.
//!
//! Residual filters are replayed in memory after the remote fetch. Items
//! expose their fields through [`Record`]; a missing field reads as
//! [`Literal::Null`].

use crate::ir::{ArithOp, CompareOp, Expr, FieldPath, Literal, Predicate};
use std::any::Any;
use std::cmp::Ordering;

/// Items whose fields can be read by path
pub trait Record: Any {
    /// Value at `path`, or `None` when the path does not exist or is unset
    fn field(&self, path: &FieldPath) -> Option<Literal>;
}

impl Predicate {
    /// Evaluate the predicate against a record
    pub fn matches<R: Record>(&self, record: &R) -> bool {
        match self {
            Predicate::And(lhs, rhs) => lhs.matches(record) && rhs.matches(record),
            Predicate::Or(lhs, rhs) => lhs.matches(record) || rhs.matches(record),
            Predicate::Not(inner) => !inner.matches(record),
            Predicate::Compare { op, lhs, rhs } => {
                compare(*op, &lhs.evaluate(record), &rhs.evaluate(record))
            }
            Predicate::Contains { field, values } => {
                let value = field.evaluate(record);
                values.iter().any(|candidate| *candidate == value)
            }
            Predicate::Custom(custom) => custom.test(record as &dyn Any),
        }
    }
}

impl Expr {
    /// Evaluate the operand against a record
    pub fn evaluate<R: Record>(&self, record: &R) -> Literal {
        match self {
            Expr::Field(path) => record.field(path).unwrap_or(Literal::Null),
            Expr::Const(value) => value.clone(),
            Expr::Arith { op, lhs, rhs } => {
                arithmetic(*op, &lhs.evaluate(record), &rhs.evaluate(record))
            }
        }
    }
}

fn compare(op: CompareOp, lhs: &Literal, rhs: &Literal) -> bool {
    match op {
        CompareOp::Eq => lhs == rhs,
        CompareOp::NotEq => lhs != rhs,
        CompareOp::Gt => lhs.compare(rhs) == Some(Ordering::Greater),
        CompareOp::GtEq => matches!(
            lhs.compare(rhs),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        CompareOp::Lt => lhs.compare(rhs) == Some(Ordering::Less),
        CompareOp::LtEq => matches!(lhs.compare(rhs), Some(Ordering::Less | Ordering::Equal)),
    }
}

/// Integer arithmetic stays integral; overflow, division by zero and
/// non-numeric operands yield null.
fn arithmetic(op: ArithOp, lhs: &Literal, rhs: &Literal) -> Literal {
    if let (Literal::Integer(a), Literal::Integer(b)) = (lhs, rhs) {
        let result = match op {
            ArithOp::Add => a.checked_add(*b),
            ArithOp::Sub => a.checked_sub(*b),
            ArithOp::Mul => a.checked_mul(*b),
            ArithOp::Div => a.checked_div(*b),
        };
        return result.map_or(Literal::Null, Literal::Integer);
    }

    match (lhs.as_f64(), rhs.as_f64()) {
        (Some(a), Some(b)) => {
            let result = match op {
                ArithOp::Add => a + b,
                ArithOp::Sub => a - b,
                ArithOp::Mul => a * b,
                ArithOp::Div if b == 0.0 => return Literal::Null,
                ArithOp::Div => a / b,
            };
            Literal::Float(result)
        }
        _ => Literal::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{field, lit};
    use crate::test_support::TestIssue;

    fn issue() -> TestIssue {
        TestIssue::new("id2")
            .with_assignee("foo")
            .with_votes(3)
    }

    #[test]
    fn test_compare_text_fields() {
        assert!(field("id").equals("id2").matches(&issue()));
        assert!(field("id").not_equals("id1").matches(&issue()));
        assert!(field("fields.assignee.name").equals("foo").matches(&issue()));
    }

    #[test]
    fn test_missing_field_reads_as_null() {
        let unassigned = TestIssue::new("id3");
        assert!(field("fields.assignee.name")
            .equals(Literal::Null)
            .matches(&unassigned));
        assert!(field("no.such.path").not_equals("x").matches(&unassigned));
    }

    #[test]
    fn test_ordering_comparisons() {
        assert!(field("fields.votes").gt(2).matches(&issue()));
        assert!(field("fields.votes").ge(3).matches(&issue()));
        assert!(!field("fields.votes").lt(3).matches(&issue()));
        assert!(field("fields.votes").le(3.5).matches(&issue()));
        assert!(!field("fields.votes").gt("a").matches(&issue()));
    }

    #[test]
    fn test_boolean_combinators() {
        let mine = field("fields.assignee.name").equals("foo");
        let other = field("id").equals("id9");
        assert!(mine.clone().or(other.clone()).matches(&issue()));
        assert!(!mine.clone().and(other.clone()).matches(&issue()));
        assert!((!other).matches(&issue()));
    }

    #[test]
    fn test_contains_membership() {
        assert!(field("id").is_in(["id1", "id2"]).matches(&issue()));
        assert!(!field("id").is_in(["id1"]).matches(&issue()));
        assert!(!field("id").is_in(Vec::<&str>::new()).matches(&issue()));
    }

    #[test]
    fn test_arithmetic_operands() {
        assert!((field("fields.votes") + 1).equals(4).matches(&issue()));
        assert!((field("fields.votes") * 2.0).equals(6).matches(&issue()));
        assert!((field("fields.votes") / 0).equals(Literal::Null).matches(&issue()));
        assert!((lit(i64::MAX) + 1).equals(Literal::Null).matches(&issue()));
        assert!((field("id") - 1).equals(Literal::Null).matches(&issue()));
    }

    #[test]
    fn test_custom_predicate_sees_record() {
        let predicate = Predicate::custom("votes above two", |i: &TestIssue| i.votes > 2);
        assert!(predicate.matches(&issue()));
        assert!(!predicate.matches(&TestIssue::new("id4")));
    }
}
