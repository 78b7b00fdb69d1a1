//! Target renderers for predicates.
//!
//! Renderers convert a [`Predicate`] tree into query-language text the remote
//! service executes. A renderer failure is not fatal: the splitter keeps the
//! affected filter local.

mod jql;

pub use jql::JqlRenderer;

use crate::error::TranslateError;
use crate::ir::Predicate;

/// Trait for rendering predicates to a target query language.
pub trait PredicateRenderer: Send + Sync {
    /// Unique name for this renderer
    fn name(&self) -> &str;

    /// Render the predicate, or report why it has no textual form
    fn render(&self, predicate: &Predicate) -> Result<String, TranslateError>;
}
