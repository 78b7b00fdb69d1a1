//! Field name resolution.
//!
//! Maps record paths used in predicates to the identifiers understood by the
//! remote query language. The mapping is plain data; [`FieldMap::jira`]
//! carries the built-in Jira table and [`FieldMap::from_config`] builds one
//! from `issueq-config`.

use crate::error::TranslateError;
use crate::ir::FieldPath;
use issueq_config::FieldsConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Resolves a record path to a remote field identifier
pub trait FieldResolver: Send + Sync {
    /// Remote identifier for `path`, or [`TranslateError::UnknownField`]
    fn resolve(&self, path: &FieldPath) -> Result<String, TranslateError>;
}

/// Built-in Jira mappings, dotted record path -> JQL field
const JIRA_FIELDS: &[(&str, &str)] = &[
    ("id", "id"),
    ("key", "key"),
    ("fields.summary", "summary"),
    ("fields.description", "description"),
    ("fields.status.name", "status"),
    ("fields.assignee.name", "assignee"),
    ("fields.reporter.name", "reporter"),
    ("fields.priority.name", "priority"),
    ("fields.project.name", "project"),
    ("fields.issuetype.name", "issuetype"),
    ("fields.labels", "labels"),
    ("fields.parent.key", "parent"),
    ("fields.created", "created"),
    ("fields.updated", "updated"),
    ("fields.resolutiondate", "resolutiondate"),
];

/// Table-driven [`FieldResolver`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap {
    entries: HashMap<FieldPath, String>,
}

impl FieldMap {
    /// Empty table: every path is unknown
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in Jira field table
    pub fn jira() -> Self {
        Self::from_entries(JIRA_FIELDS.iter().copied())
    }

    /// Build a table from `(dotted path, remote field)` pairs
    pub fn from_entries<I, P, R>(entries: I) -> Self
    where
        I: IntoIterator<Item = (P, R)>,
        P: Into<FieldPath>,
        R: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(path, remote)| (path.into(), remote.into()))
                .collect(),
        }
    }

    /// Build a table from configuration. Configured mappings override the
    /// Jira defaults when both are present.
    pub fn from_config(config: &FieldsConfig) -> Self {
        let mut map = if config.jira_defaults {
            Self::jira()
        } else {
            Self::new()
        };
        for (path, remote) in &config.mappings {
            map.insert(path.as_str(), remote.as_str());
        }
        debug!(
            entries = map.len(),
            jira_defaults = config.jira_defaults,
            "Built field table from config"
        );
        map
    }

    /// Add or replace a mapping
    pub fn insert(&mut self, path: impl Into<FieldPath>, remote: impl Into<String>) {
        self.entries.insert(path.into(), remote.into());
    }

    /// Add or replace a mapping (builder pattern)
    pub fn with(mut self, path: impl Into<FieldPath>, remote: impl Into<String>) -> Self {
        self.insert(path, remote);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<&FieldsConfig> for FieldMap {
    fn from(config: &FieldsConfig) -> Self {
        Self::from_config(config)
    }
}

impl FieldResolver for FieldMap {
    fn resolve(&self, path: &FieldPath) -> Result<String, TranslateError> {
        self.entries
            .get(path)
            .cloned()
            .ok_or_else(|| TranslateError::UnknownField(path.dotted()))
    }
}
