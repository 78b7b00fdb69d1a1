//! Query execution.
//!
//! [`QueryEngine`] owns a [`RemoteFetch`] source and a [`Splitter`]. Each
//! execution splits the chain, issues exactly one remote fetch with the pushed
//! query text and offset, then replays the residual operations in memory.

use crate::chain::{Element, ElementType, Operation, OperationChain};
use crate::error::{FetchError, QueryError, QueryResult};
use crate::query::Query;
use crate::render::JqlRenderer;
use crate::resolve::{FieldMap, FieldResolver};
use crate::split::{SplitResult, Splitter};
use async_trait::async_trait;
use issueq_config::FieldsConfig;
use std::sync::Arc;
use tracing::{debug, info};

/// The remote collection a chain is executed against
///
/// `query` is the pushed-down filter text (`""` for no filter) and `offset`
/// the number of leading matches to skip (`0` for none).
#[async_trait]
pub trait RemoteFetch: Send + Sync {
    /// Items the remote collection yields
    type Item: Send + 'static;

    async fn fetch(&self, query: &str, offset: usize) -> Result<Vec<Self::Item>, FetchError>;
}

#[async_trait]
impl<F: RemoteFetch + ?Sized> RemoteFetch for Arc<F> {
    type Item = F::Item;

    async fn fetch(&self, query: &str, offset: usize) -> Result<Vec<Self::Item>, FetchError> {
        (**self).fetch(query, offset).await
    }
}

/// Type-erased execution seam used by [`Query`]
#[async_trait]
pub trait Executor: Send + Sync {
    /// Split `chain` without fetching
    fn explain(&self, chain: &OperationChain) -> QueryResult<SplitResult>;

    /// Run `chain` to completion
    async fn execute(&self, chain: &OperationChain) -> QueryResult<Vec<Element>>;
}

/// Executes operation chains against a remote source
pub struct QueryEngine<F> {
    fetch: Arc<F>,
    splitter: Splitter,
}

impl<F> Clone for QueryEngine<F> {
    fn clone(&self) -> Self {
        Self {
            fetch: Arc::clone(&self.fetch),
            splitter: self.splitter.clone(),
        }
    }
}

impl<F: RemoteFetch + 'static> QueryEngine<F> {
    /// Engine translating to JQL with the built-in Jira field table
    pub fn new(fetch: F) -> Self {
        Self {
            fetch: Arc::new(fetch),
            splitter: Splitter::default(),
        }
    }

    /// Engine translating to JQL through a custom resolver
    pub fn with_resolver(fetch: F, resolver: impl FieldResolver + 'static) -> Self {
        Self::with_splitter(fetch, Splitter::new(JqlRenderer::new(resolver)))
    }

    /// Engine using the field table described by `config`
    pub fn from_config(fetch: F, config: &FieldsConfig) -> Self {
        Self::with_resolver(fetch, FieldMap::from_config(config))
    }

    pub fn with_splitter(fetch: F, splitter: Splitter) -> Self {
        Self {
            fetch: Arc::new(fetch),
            splitter,
        }
    }

    pub fn splitter(&self) -> &Splitter {
        &self.splitter
    }

    /// Empty chain over this engine's source
    pub fn chain(&self) -> OperationChain {
        OperationChain::over::<F::Item>()
    }

    /// Start composing a query over the remote collection
    pub fn query(&self) -> Query<F::Item> {
        Query::new(Arc::new(self.clone()), self.chain())
    }

    fn check_source(&self, chain: &OperationChain) -> QueryResult<()> {
        let expected = ElementType::of::<F::Item>();
        if chain.source() == expected {
            Ok(())
        } else {
            Err(QueryError::MalformedChain(format!(
                "chain source {} does not match remote items {}",
                chain.source(),
                expected
            )))
        }
    }
}

#[async_trait]
impl<F: RemoteFetch + 'static> Executor for QueryEngine<F> {
    fn explain(&self, chain: &OperationChain) -> QueryResult<SplitResult> {
        self.check_source(chain)?;
        self.splitter.split(chain)
    }

    async fn execute(&self, chain: &OperationChain) -> QueryResult<Vec<Element>> {
        let split = self.explain(chain)?;

        info!(query = %split.query, offset = split.offset, "Fetching from remote");
        let fetched = self.fetch.fetch(&split.query, split.offset).await?;
        debug!(items = fetched.len(), residual = split.residual.len(), "Fetched items");

        let elements: Vec<Element> = fetched
            .into_iter()
            .map(|item| Box::new(item) as Element)
            .collect();

        if split.complete {
            return Ok(elements);
        }
        replay(&split.residual, elements)
    }
}

/// Apply `operations` in order over `elements`
pub fn replay(operations: &[Operation], elements: Vec<Element>) -> QueryResult<Vec<Element>> {
    operations
        .iter()
        .try_fold(elements, |elements, operation| operation.apply_local(elements))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::downcast_element;
    use crate::ir::field;
    use crate::test_support::{RecordingFetch, TestIssue};

    fn issues() -> Vec<TestIssue> {
        ["id1", "id2", "id3"].into_iter().map(TestIssue::new).collect()
    }

    fn ids(elements: Vec<Element>) -> Vec<String> {
        elements
            .into_iter()
            .map(|e| downcast_element::<TestIssue>(e).unwrap().id)
            .collect()
    }

    #[tokio::test]
    async fn test_complete_chain_returns_fetched_items() {
        let fetch = Arc::new(RecordingFetch::new(issues()));
        let engine = QueryEngine::new(Arc::clone(&fetch));
        let chain = engine
            .chain()
            .push(Operation::filter::<TestIssue>(field("id").not_equals("id9")));

        let result = engine.execute(&chain).await.unwrap();

        assert_eq!(ids(result), vec!["id1", "id2", "id3"]);
        assert_eq!(fetch.calls(), vec![("(id!=\"id9\")".to_string(), 0)]);
    }

    #[tokio::test]
    async fn test_residual_replayed_locally() {
        let fetch = Arc::new(RecordingFetch::new(issues()));
        let engine = QueryEngine::new(Arc::clone(&fetch));
        let chain = engine
            .chain()
            .push(Operation::skip::<TestIssue>(1))
            .push(Operation::filter::<TestIssue>(field("id").not_equals("id3")));

        let result = engine.execute(&chain).await.unwrap();

        assert_eq!(ids(result), vec!["id1", "id2"]);
        assert_eq!(fetch.calls(), vec![(String::new(), 1)]);
    }

    #[tokio::test]
    async fn test_fetch_error_propagates() {
        let engine = QueryEngine::new(RecordingFetch::<TestIssue>::failing("HTTP 503"));
        let err = engine.execute(&engine.chain()).await.unwrap_err();

        match err {
            QueryError::Fetch(inner) => assert_eq!(inner.to_string(), "HTTP 503"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_foreign_source_rejected_before_fetch() {
        let fetch = Arc::new(RecordingFetch::new(issues()));
        let engine = QueryEngine::new(Arc::clone(&fetch));

        let err = engine
            .execute(&OperationChain::over::<String>())
            .await
            .unwrap_err();

        assert!(matches!(err, QueryError::MalformedChain(_)));
        assert!(fetch.calls().is_empty());
    }

    #[tokio::test]
    async fn test_from_config_uses_configured_fields() {
        let fetch = Arc::new(RecordingFetch::new(issues()));
        let config = FieldsConfig::default().with_mapping("key", "issuekey");
        let engine = QueryEngine::from_config(Arc::clone(&fetch), &config);
        let chain = engine
            .chain()
            .push(Operation::filter::<TestIssue>(field("key").equals("K-1")));

        engine.execute(&chain).await.unwrap();

        assert_eq!(fetch.calls(), vec![("(issuekey=\"K-1\")".to_string(), 0)]);
    }

    #[test]
    fn test_explain_does_not_fetch() {
        let fetch = Arc::new(RecordingFetch::new(issues()));
        let engine = QueryEngine::new(Arc::clone(&fetch));
        let chain = engine.chain().push(Operation::skip::<TestIssue>(2));

        let split = engine.explain(&chain).unwrap();

        assert_eq!(split.offset, 2);
        assert!(fetch.calls().is_empty());
    }

    #[test]
    fn test_replay_in_order() {
        let operations = vec![
            Operation::skip::<TestIssue>(1),
            Operation::filter::<TestIssue>(field("id").not_equals("id2")),
        ];
        let elements = issues()
            .into_iter()
            .map(|i| Box::new(i) as Element)
            .collect();

        assert_eq!(ids(replay(&operations, elements).unwrap()), vec!["id3"]);
    }
}
