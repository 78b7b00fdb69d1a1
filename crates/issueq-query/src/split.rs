//! Chain splitting.
//!
//! Partitions an [`OperationChain`] into the prefix the remote service can
//! execute (a query text plus a skip offset) and the residual that must be
//! replayed locally over the fetched items.
//!
//! The splitter walks the chain from the outermost operation toward the
//! source, tracking a [`PushdownState`]:
//!
//! - an operation over another element type than the source resets the state
//! - `Skip(n)` becomes the frontier with offset `n`; filters collected outside
//!   it are dropped, since they apply to the skipped window
//! - a translatable filter is collected; it becomes the frontier only when
//!   there is none yet
//! - an untranslatable filter or an opaque operation resets the state
//!
//! Everything from the source up to and including the frontier is pushed.

use crate::chain::{Operation, OperationChain};
use crate::error::QueryResult;
use crate::render::{JqlRenderer, PredicateRenderer};
use std::sync::Arc;
use tracing::{debug, trace};

/// Separator between collected filter texts
const CONJUNCTION: &str = " AND ";

/// The partition of a chain into remote and local parts
#[derive(Debug, Clone)]
pub struct SplitResult {
    /// Operations executed remotely, in application order
    pub pushed: Vec<Operation>,
    /// Query text for the remote fetch, `""` for no filter
    pub query: String,
    /// Number of leading remote results to skip
    pub offset: usize,
    /// Operations replayed locally, in application order
    pub residual: Vec<Operation>,
    /// Whether the whole chain was pushed
    pub complete: bool,
}

#[derive(Debug, Default)]
struct PushdownState {
    frontier: Option<usize>,
    filters: Vec<String>,
    offset: usize,
}

impl PushdownState {
    fn reset(&mut self) {
        self.frontier = None;
        self.filters.clear();
        self.offset = 0;
    }

    fn on_skip(&mut self, index: usize, count: usize) {
        self.frontier = Some(index);
        self.offset = count;
        self.filters.clear();
    }

    fn on_filter(&mut self, index: usize, text: String) {
        self.filters.push(text);
        if self.frontier.is_none() {
            self.frontier = Some(index);
        }
    }
}

/// Splits chains using a predicate renderer
#[derive(Clone)]
pub struct Splitter {
    renderer: Arc<dyn PredicateRenderer>,
}

impl Default for Splitter {
    fn default() -> Self {
        Self::new(JqlRenderer::default())
    }
}

impl Splitter {
    pub fn new(renderer: impl PredicateRenderer + 'static) -> Self {
        Self {
            renderer: Arc::new(renderer),
        }
    }

    pub fn with_renderer(renderer: Arc<dyn PredicateRenderer>) -> Self {
        Self { renderer }
    }

    pub fn renderer(&self) -> &dyn PredicateRenderer {
        self.renderer.as_ref()
    }

    /// Partition `chain` into pushed and residual operations
    pub fn split(&self, chain: &OperationChain) -> QueryResult<SplitResult> {
        chain.validate()?;

        let source = chain.source();
        let mut state = PushdownState::default();

        for (depth, operation) in chain.iter_outer_first().enumerate() {
            let index = chain.len() - 1 - depth;

            if operation.input() != source || operation.output() != source {
                trace!(index, %operation, "Element type differs from source, resetting");
                state.reset();
                continue;
            }

            match operation {
                Operation::Skip(skip) => {
                    trace!(index, count = skip.count(), "Skip becomes frontier");
                    state.on_skip(index, skip.count());
                }
                Operation::Filter(filter) => match self.renderer.render(filter.predicate()) {
                    Ok(text) => {
                        trace!(index, text = %text, "Collected filter");
                        state.on_filter(index, text);
                    }
                    Err(error) => {
                        trace!(index, %error, "Filter not translatable, resetting");
                        state.reset();
                    }
                },
                Operation::Opaque(opaque) => {
                    trace!(index, label = opaque.label(), "Opaque operation, resetting");
                    state.reset();
                }
            }
        }

        let mut pushed = chain.operations();
        let residual = match state.frontier {
            Some(frontier) => pushed.split_off(frontier + 1),
            None => std::mem::take(&mut pushed),
        };
        let result = SplitResult {
            complete: residual.is_empty(),
            query: state.filters.join(CONJUNCTION),
            offset: state.offset,
            pushed,
            residual,
        };

        debug!(
            renderer = self.renderer.name(),
            query = %result.query,
            offset = result.offset,
            pushed = result.pushed.len(),
            residual = result.residual.len(),
            complete = result.complete,
            "Split operation chain"
        );
        Ok(result)
    }
}
