//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use issueq_query::{
    FetchError, FieldPath, JqlRenderer, Literal, Predicate, PredicateRenderer, Record,
    RemoteFetch,
};
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct JiraUser {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IssueFields {
    pub summary: String,
    pub assignee: Option<JiraUser>,
    pub votes: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub id: String,
    pub key: String,
    pub fields: IssueFields,
}

impl Issue {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            key: format!("PRJ-{}", id.trim_start_matches("id")),
            fields: IssueFields {
                summary: format!("Issue {id}"),
                assignee: None,
                votes: 0,
            },
        }
    }

    pub fn assigned(mut self, name: &str) -> Self {
        self.fields.assignee = Some(JiraUser {
            name: name.to_string(),
        });
        self
    }

    pub fn votes(mut self, votes: i64) -> Self {
        self.fields.votes = votes;
        self
    }
}

impl Record for Issue {
    fn field(&self, path: &FieldPath) -> Option<Literal> {
        match path.dotted().as_str() {
            "id" => Some(self.id.as_str().into()),
            "key" => Some(self.key.as_str().into()),
            "fields.summary" => Some(self.fields.summary.as_str().into()),
            "fields.assignee.name" => self
                .fields
                .assignee
                .as_ref()
                .map(|user| user.name.as_str().into()),
            "fields.votes" => Some(self.fields.votes.into()),
            _ => None,
        }
    }
}

/// id1..=id5, assigned alternately to foo and bar
pub fn sample_issues() -> Vec<Issue> {
    (1..=5)
        .map(|n| {
            let assignee = if n % 2 == 0 { "bar" } else { "foo" };
            Issue::new(&format!("id{n}")).assigned(assignee).votes(n)
        })
        .collect()
}

pub fn ids<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> Vec<String> {
    issues.into_iter().map(|issue| issue.id.clone()).collect()
}

/// Returns its items verbatim for every request and records the arguments
pub struct RecordingFetch {
    items: Vec<Issue>,
    failure: Option<String>,
    calls: Mutex<Vec<(String, usize)>>,
}

impl RecordingFetch {
    pub fn new(items: Vec<Issue>) -> Self {
        Self {
            items,
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new(Vec::new())
        }
    }

    pub fn calls(&self) -> Vec<(String, usize)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl RemoteFetch for RecordingFetch {
    type Item = Issue;

    async fn fetch(&self, query: &str, offset: usize) -> Result<Vec<Issue>, FetchError> {
        self.calls.lock().push((query.to_string(), offset));
        match &self.failure {
            Some(message) => Err(FetchError::msg(message.clone())),
            None => Ok(self.items.clone()),
        }
    }
}

/// Executes pushed queries the way the remote service would: every conjunct
/// filters the collection, then `offset` leading matches are dropped.
///
/// Conjuncts are looked up in a table of predicates registered by their
/// rendered text, so only registered filters can be pushed.
pub struct FaithfulFetch {
    items: Vec<Issue>,
    known: HashMap<String, Predicate>,
    calls: Mutex<usize>,
}

impl FaithfulFetch {
    pub fn new(items: Vec<Issue>) -> Self {
        Self {
            items,
            known: HashMap::new(),
            calls: Mutex::new(0),
        }
    }

    /// Register a translatable predicate
    pub fn register(&mut self, predicate: &Predicate) {
        let text = JqlRenderer::default()
            .render(predicate)
            .expect("registered predicates must be translatable");
        self.known.insert(text, predicate.clone());
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl RemoteFetch for FaithfulFetch {
    type Item = Issue;

    async fn fetch(&self, query: &str, offset: usize) -> Result<Vec<Issue>, FetchError> {
        *self.calls.lock() += 1;

        let mut conjuncts = Vec::new();
        if !query.is_empty() {
            for text in query.split(" AND ") {
                let predicate = self
                    .known
                    .get(text)
                    .ok_or_else(|| FetchError::msg(format!("unknown conjunct {text}")))?;
                conjuncts.push(predicate);
            }
        }

        Ok(self
            .items
            .iter()
            .filter(|issue| conjuncts.iter().all(|p| p.matches(*issue)))
            .skip(offset)
            .cloned()
            .collect())
    }
}
