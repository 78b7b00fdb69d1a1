//! Pushdown query engine for remote issue collections
//!
//! Queries are composed lazily from filters, skips and host operators. On
//! execution the longest translatable prefix of the chain is sent to the
//! remote service as JQL text plus a skip offset, and whatever is left is
//! replayed in memory over the fetched items.
//!
//! ## Modules
//!
//! - **ir**: field paths, literals, operands and predicates
//! - **eval**: local evaluation of predicates over [`Record`]s
//! - **resolve** / **render**: field tables and the JQL renderer
//! - **chain** / **split**: operation chains and the pushdown splitter
//! - **engine** / **query**: single-fetch execution and the fluent façade
//!
//! ## Usage
//!
//! ```rust,ignore
//! use issueq_query::{field, QueryEngine};
//!
//! let engine = QueryEngine::new(jira_client);
//! let issues = engine
//!     .query()
//!     .filter(field("fields.assignee.name").equals("berci"))
//!     .skip(10)
//!     .await?;
//! ```

pub mod chain;
pub mod engine;
pub mod error;
pub mod eval;
pub mod ir;
pub mod query;
pub mod render;
pub mod resolve;
pub mod split;

#[cfg(test)]
mod test_support;

// Re-exports
pub use chain::{Element, ElementType, Operation, OperationChain};
pub use engine::{replay, Executor, QueryEngine, RemoteFetch};
pub use error::{FetchError, QueryError, QueryResult, TranslateError};
pub use eval::Record;
pub use ir::{field, lit, ArithOp, CompareOp, Expr, FieldPath, Literal, Predicate};
pub use query::Query;
pub use render::{JqlRenderer, PredicateRenderer};
pub use resolve::{FieldMap, FieldResolver};
pub use split::{SplitResult, Splitter};
