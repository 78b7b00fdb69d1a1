//! Predicate intermediate representation.
//!
//! Filters are built as explicit trees:
//!
//! ```rust,ignore
//! use issueq_query::ir::field;
//!
//! let mine = field("fields.assignee.name").equals("berci");
//! let open = field("fields.status.name").not_equals("Done");
//! let predicate = mine.and(open);
//! ```
//!
//! The same tree is rendered to query text by [`crate::render`] and evaluated
//! locally by [`crate::eval`].

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::ops;
use std::sync::Arc;

// ============================================================================
// Field paths
// ============================================================================

/// Ordered member names leading from a record to a value, e.g.
/// `fields.assignee.name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Build a path from individual segments
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Parse a dotted path. Empty segments are dropped.
    pub fn parse(dotted: &str) -> Self {
        Self(
            dotted
                .split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Path segments in access order
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Extend the path by one member
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// Dotted form, used as the lookup key of field tables
    pub fn dotted(&self) -> String {
        self.0.join(".")
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}

impl From<&str> for FieldPath {
    fn from(dotted: &str) -> Self {
        Self::parse(dotted)
    }
}

impl From<String> for FieldPath {
    fn from(dotted: String) -> Self {
        Self::parse(&dotted)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.dotted()
    }
}

// ============================================================================
// Literals
// ============================================================================

/// Control characters other than these are stripped from text literals.
const KEPT_CONTROL_CHARS: &[char] = &['\t', '\r', '\n'];

/// A constant value captured by a predicate.
///
/// `Display` gives the query-language form: text is double quoted with `"`
/// and `\` escaped and non-printable characters removed; `Raw` is written
/// verbatim for values that arrive already quoted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Literal {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
    /// Pre-rendered query text, emitted unchanged
    Raw(String),
}

impl Literal {
    /// Raw literal, written to query text exactly as given
    pub fn raw(text: impl Into<String>) -> Self {
        Self::Raw(text.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric view used for cross-type comparisons
    pub(crate) fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Ordering between comparable literals; `None` when the kinds differ
    /// or either side is null.
    pub fn compare(&self, other: &Self) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => None,
            },
        }
    }
}

impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Null, Self::Null) => true,
            (Self::Raw(a), Self::Raw(b)) => a == b,
            (Self::Raw(raw), other) | (other, Self::Raw(raw)) => *raw == other.to_string(),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => {
                f.write_str("\"")?;
                for c in text.chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        c if c.is_control() && !KEPT_CONTROL_CHARS.contains(&c) => {}
                        c => write!(f, "{}", c)?,
                    }
                }
                f.write_str("\"")
            }
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Null => f.write_str("null"),
            Self::Raw(raw) => f.write_str(raw),
        }
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for Literal {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<Literal>> From<Option<T>> for Literal {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

// ============================================================================
// Operators
// ============================================================================

/// Comparison operators with a query-language token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    NotEq,
    Gt,
    GtEq,
    Lt,
    LtEq,
}

impl CompareOp {
    pub fn token(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Lt => "<",
            Self::LtEq => "<=",
        }
    }
}

/// Arithmetic operators. Evaluated locally, never translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

// ============================================================================
// Expressions
// ============================================================================

/// Comparison operand
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Member access on the record
    Field(FieldPath),
    /// Constant captured at build time
    Const(Literal),
    /// Arithmetic over two operands
    Arith {
        op: ArithOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

/// Field reference operand
pub fn field(path: impl Into<FieldPath>) -> Expr {
    Expr::Field(path.into())
}

/// Constant operand
pub fn lit(value: impl Into<Literal>) -> Expr {
    Expr::Const(value.into())
}

impl Expr {
    fn compare(self, op: CompareOp, rhs: impl Into<Expr>) -> Predicate {
        Predicate::Compare {
            op,
            lhs: self,
            rhs: rhs.into(),
        }
    }

    /// `self = rhs`
    pub fn equals(self, rhs: impl Into<Expr>) -> Predicate {
        self.compare(CompareOp::Eq, rhs)
    }

    /// `self != rhs`
    pub fn not_equals(self, rhs: impl Into<Expr>) -> Predicate {
        self.compare(CompareOp::NotEq, rhs)
    }

    /// `self > rhs`
    pub fn gt(self, rhs: impl Into<Expr>) -> Predicate {
        self.compare(CompareOp::Gt, rhs)
    }

    /// `self >= rhs`
    pub fn ge(self, rhs: impl Into<Expr>) -> Predicate {
        self.compare(CompareOp::GtEq, rhs)
    }

    /// `self < rhs`
    pub fn lt(self, rhs: impl Into<Expr>) -> Predicate {
        self.compare(CompareOp::Lt, rhs)
    }

    /// `self <= rhs`
    pub fn le(self, rhs: impl Into<Expr>) -> Predicate {
        self.compare(CompareOp::LtEq, rhs)
    }

    /// Membership in a set of constants known at build time
    pub fn is_in<I, V>(self, values: I) -> Predicate
    where
        I: IntoIterator<Item = V>,
        V: Into<Literal>,
    {
        Predicate::Contains {
            field: self,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    fn arith(self, op: ArithOp, rhs: Expr) -> Self {
        Self::Arith {
            op,
            lhs: Box::new(self),
            rhs: Box::new(rhs),
        }
    }
}

impl From<Literal> for Expr {
    fn from(value: Literal) -> Self {
        Self::Const(value)
    }
}

macro_rules! const_expr_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Expr {
                fn from(value: $ty) -> Self {
                    Self::Const(Literal::from(value))
                }
            }
        )*
    };
}

const_expr_from!(&str, String, i64, i32, u32, f64, bool);

impl<R: Into<Expr>> ops::Add<R> for Expr {
    type Output = Expr;

    fn add(self, rhs: R) -> Expr {
        self.arith(ArithOp::Add, rhs.into())
    }
}

impl<R: Into<Expr>> ops::Sub<R> for Expr {
    type Output = Expr;

    fn sub(self, rhs: R) -> Expr {
        self.arith(ArithOp::Sub, rhs.into())
    }
}

impl<R: Into<Expr>> ops::Mul<R> for Expr {
    type Output = Expr;

    fn mul(self, rhs: R) -> Expr {
        self.arith(ArithOp::Mul, rhs.into())
    }
}

impl<R: Into<Expr>> ops::Div<R> for Expr {
    type Output = Expr;

    fn div(self, rhs: R) -> Expr {
        self.arith(ArithOp::Div, rhs.into())
    }
}

// ============================================================================
// Predicates
// ============================================================================

type CustomTest = Arc<dyn Fn(&dyn Any) -> bool + Send + Sync>;

/// Host predicate with no tree form. Always evaluated locally.
#[derive(Clone)]
pub struct CustomPredicate {
    label: String,
    test: CustomTest,
}

impl CustomPredicate {
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Run the predicate; records of another type never match.
    pub fn test(&self, record: &dyn Any) -> bool {
        (self.test)(record)
    }
}

impl fmt::Debug for CustomPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CustomPredicate").field(&self.label).finish()
    }
}

impl PartialEq for CustomPredicate {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.test, &other.test)
    }
}

/// Boolean filter expression
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
    Compare {
        op: CompareOp,
        lhs: Expr,
        rhs: Expr,
    },
    /// Membership of a field in a materialized constant set
    Contains {
        field: Expr,
        values: Vec<Literal>,
    },
    Custom(CustomPredicate),
}

impl Predicate {
    pub fn and(self, other: Predicate) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Predicate) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }

    /// Wrap a host closure over `T`
    pub fn custom<T, F>(label: impl Into<String>, test: F) -> Self
    where
        T: 'static,
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::Custom(CustomPredicate {
            label: label.into(),
            test: Arc::new(move |record: &dyn Any| {
                record.downcast_ref::<T>().is_some_and(|r| test(r))
            }),
        })
    }
}

impl ops::Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Predicate {
        Predicate::Not(Box::new(self))
    }
}
