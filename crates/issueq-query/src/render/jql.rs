//! JQL predicate renderer.
//!
//! Renders predicates as fully parenthesised JQL:
//! - comparisons: `(field=value)`, tokens `= != > >= < <=`
//! - combinators: `(lhs AND rhs)`, `(lhs OR rhs)`, `(NOT(inner))`
//! - membership: `(field IN (a,b))`
//!
//! Field references go through a [`FieldResolver`]; constants use their
//! `Display` form.

use crate::error::TranslateError;
use crate::ir::{CompareOp, Expr, Literal, Predicate};
use crate::render::PredicateRenderer;
use crate::resolve::{FieldMap, FieldResolver};
use std::sync::Arc;

/// JQL renderer over a field table.
pub struct JqlRenderer {
    resolver: Arc<dyn FieldResolver>,
}

impl Default for JqlRenderer {
    fn default() -> Self {
        Self::new(FieldMap::jira())
    }
}

impl JqlRenderer {
    /// Create a renderer using the given resolver
    pub fn new(resolver: impl FieldResolver + 'static) -> Self {
        Self {
            resolver: Arc::new(resolver),
        }
    }

    /// Create a renderer sharing an existing resolver
    pub fn with_resolver(resolver: Arc<dyn FieldResolver>) -> Self {
        Self { resolver }
    }

    fn render_predicate(&self, predicate: &Predicate) -> Result<String, TranslateError> {
        match predicate {
            Predicate::And(lhs, rhs) => self.render_binary(lhs, " AND ", rhs),
            Predicate::Or(lhs, rhs) => self.render_binary(lhs, " OR ", rhs),
            Predicate::Not(inner) => Ok(format!("(NOT{})", self.render_predicate(inner)?)),
            Predicate::Compare { op, lhs, rhs } => self.render_compare(*op, lhs, rhs),
            Predicate::Contains { field, values } => self.render_contains(field, values),
            Predicate::Custom(custom) => Err(TranslateError::UnsupportedPredicate(format!(
                "custom predicate '{}'",
                custom.label()
            ))),
        }
    }

    fn render_binary(
        &self,
        lhs: &Predicate,
        token: &str,
        rhs: &Predicate,
    ) -> Result<String, TranslateError> {
        Ok(format!(
            "({}{}{})",
            self.render_predicate(lhs)?,
            token,
            self.render_predicate(rhs)?
        ))
    }

    fn render_compare(&self, op: CompareOp, lhs: &Expr, rhs: &Expr) -> Result<String, TranslateError> {
        Ok(format!(
            "({}{}{})",
            self.render_operand(lhs)?,
            op.token(),
            self.render_operand(rhs)?
        ))
    }

    fn render_contains(&self, field: &Expr, values: &[Literal]) -> Result<String, TranslateError> {
        let Expr::Field(path) = field else {
            return Err(TranslateError::UnsupportedPredicate(
                "IN requires a field operand".to_string(),
            ));
        };
        if values.is_empty() {
            return Err(TranslateError::UnsupportedPredicate(
                "IN requires at least one value".to_string(),
            ));
        }

        let values = values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        Ok(format!("({} IN ({}))", self.resolver.resolve(path)?, values))
    }

    fn render_operand(&self, expr: &Expr) -> Result<String, TranslateError> {
        match expr {
            Expr::Field(path) => self.resolver.resolve(path),
            Expr::Const(value) => Ok(value.to_string()),
            Expr::Arith { op, .. } => Err(TranslateError::UnsupportedPredicate(format!(
                "arithmetic operand ({:?})",
                op
            ))),
        }
    }
}

impl PredicateRenderer for JqlRenderer {
    fn name(&self) -> &str {
        "jql"
    }

    fn render(&self, predicate: &Predicate) -> Result<String, TranslateError> {
        self.render_predicate(predicate)
    }
}
