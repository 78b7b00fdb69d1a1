//! Fixtures shared by unit tests.

use crate::engine::RemoteFetch;
use crate::error::FetchError;
use crate::eval::Record;
use crate::ir::{FieldPath, Literal};
use async_trait::async_trait;
use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub struct TestIssue {
    pub id: String,
    pub key: String,
    pub assignee: Option<String>,
    pub votes: i64,
}

impl TestIssue {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            key: format!("TEST-{}", id.trim_start_matches("id")),
            assignee: None,
            votes: 0,
        }
    }

    pub fn with_assignee(mut self, name: &str) -> Self {
        self.assignee = Some(name.to_string());
        self
    }

    pub fn with_votes(mut self, votes: i64) -> Self {
        self.votes = votes;
        self
    }
}

impl Record for TestIssue {
    fn field(&self, path: &FieldPath) -> Option<Literal> {
        match path.dotted().as_str() {
            "id" => Some(self.id.clone().into()),
            "key" => Some(self.key.clone().into()),
            "fields.assignee.name" => self.assignee.clone().map(Literal::from),
            "fields.votes" => Some(self.votes.into()),
            _ => None,
        }
    }
}

/// Returns the same items for every request and records the arguments
pub struct RecordingFetch<T> {
    items: Vec<T>,
    failure: Option<String>,
    calls: Mutex<Vec<(String, usize)>>,
}

impl<T> RecordingFetch<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            items: Vec::new(),
            failure: Some(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, usize)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> RemoteFetch for RecordingFetch<T> {
    type Item = T;

    async fn fetch(&self, query: &str, offset: usize) -> Result<Vec<T>, FetchError> {
        self.calls.lock().push((query.to_string(), offset));
        match &self.failure {
            Some(message) => Err(FetchError::msg(message.clone())),
            None => Ok(self.items.clone()),
        }
    }
}
