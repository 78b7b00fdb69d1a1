//! Fluent query composition.
//!
//! A [`Query`] is a lazily evaluated view over a remote collection. Each
//! composing call returns a new query sharing the chain built so far, so a
//! base query can be extended in several directions. Nothing is fetched
//! until the query is consumed by [`Query::collect`], `.await` or
//! [`Query::into_stream`].

use crate::chain::{downcast_element, Operation, OperationChain};
use crate::engine::Executor;
use crate::error::QueryResult;
use crate::eval::Record;
use crate::ir::Predicate;
use crate::split::SplitResult;
use futures::future::BoxFuture;
use futures::stream::{self, BoxStream, StreamExt};
use std::future::IntoFuture;
use std::marker::PhantomData;
use std::sync::Arc;

/// Lazily executed query yielding items of type `T`
pub struct Query<T> {
    executor: Arc<dyn Executor>,
    chain: OperationChain,
    _item: PhantomData<fn() -> T>,
}

impl<T> Clone for Query<T> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            chain: self.chain.clone(),
            _item: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query").field("chain", &self.chain).finish()
    }
}

impl<T: Send + 'static> Query<T> {
    pub fn new(executor: Arc<dyn Executor>, chain: OperationChain) -> Self {
        Self {
            executor,
            chain,
            _item: PhantomData,
        }
    }

    /// The operations composed so far
    pub fn chain(&self) -> &OperationChain {
        &self.chain
    }

    fn then<U: Send + 'static>(&self, operation: Operation) -> Query<U> {
        Query::new(Arc::clone(&self.executor), self.chain.push(operation))
    }

    /// Keep items matching `predicate`
    pub fn filter(&self, predicate: Predicate) -> Self
    where
        T: Record,
    {
        self.then(Operation::filter::<T>(predicate))
    }

    /// Keep items accepted by a host closure. Always evaluated locally.
    pub fn filter_fn<F>(&self, label: impl Into<String>, keep: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.apply(label, move |items: Vec<T>| {
            items.into_iter().filter(|item| keep(item)).collect()
        })
    }

    /// Drop the first `count` items
    pub fn skip(&self, count: usize) -> Self {
        self.then(Operation::skip::<T>(count))
    }

    /// Keep at most `count` items
    pub fn take(&self, count: usize) -> Self {
        self.apply(format!("take({count})"), move |items: Vec<T>| {
            items.into_iter().take(count).collect()
        })
    }

    /// Project each item
    pub fn map<U, F>(&self, label: impl Into<String>, f: F) -> Query<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        self.apply(label, move |items: Vec<T>| items.into_iter().map(&f).collect())
    }

    /// Stable sort by a key
    pub fn sort_by_key<K, F>(&self, label: impl Into<String>, key: F) -> Self
    where
        K: Ord,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.apply(label, move |mut items: Vec<T>| {
            items.sort_by_key(|item| key(item));
            items
        })
    }

    /// Compose an arbitrary host operator over the whole sequence
    pub fn apply<U, F>(&self, label: impl Into<String>, f: F) -> Query<U>
    where
        U: Send + 'static,
        F: Fn(Vec<T>) -> Vec<U> + Send + Sync + 'static,
    {
        self.then(Operation::opaque(label, f))
    }

    /// The split the next execution would use
    pub fn explain(&self) -> QueryResult<SplitResult> {
        self.executor.explain(&self.chain)
    }

    /// Execute and gather all items
    pub async fn collect(&self) -> QueryResult<Vec<T>> {
        collect_with(Arc::clone(&self.executor), self.chain.clone()).await
    }

    /// Execute when first polled and yield items one by one
    pub fn into_stream(self) -> BoxStream<'static, QueryResult<T>> {
        stream::once(collect_with::<T>(self.executor, self.chain))
            .flat_map(|result| match result {
                Ok(items) => stream::iter(items.into_iter().map(Ok)).left_stream(),
                Err(error) => stream::once(async move { Err(error) }).right_stream(),
            })
            .boxed()
    }
}

async fn collect_with<T: Send + 'static>(
    executor: Arc<dyn Executor>,
    chain: OperationChain,
) -> QueryResult<Vec<T>> {
    executor
        .execute(&chain)
        .await?
        .into_iter()
        .map(downcast_element::<T>)
        .collect()
}

impl<T: Send + 'static> IntoFuture for Query<T> {
    type Output = QueryResult<Vec<T>>;
    type IntoFuture = BoxFuture<'static, QueryResult<Vec<T>>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(collect_with(self.executor, self.chain))
    }
}
