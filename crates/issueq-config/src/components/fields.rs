//! Field table configuration
//!
//! Maps dotted record paths (as used in predicates) to the identifiers the
//! remote query language understands.
//!
//! ```toml
//! [fields]
//! jira_defaults = true
//!
//! [fields.mappings]
//! "fields.customfield_10800" = "cf[10800]"
//! "fields.assignee.name" = "assignee"
//! ```

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field table configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldsConfig {
    /// Start from the built-in Jira field table
    pub jira_defaults: bool,
    /// Additional or overriding entries, dotted path -> remote field
    pub mappings: BTreeMap<String, String>,
}

impl Default for FieldsConfig {
    fn default() -> Self {
        Self {
            jira_defaults: true,
            mappings: BTreeMap::new(),
        }
    }
}

impl FieldsConfig {
    /// Add a mapping (builder pattern)
    pub fn with_mapping(mut self, path: impl Into<String>, remote: impl Into<String>) -> Self {
        self.mappings.insert(path.into(), remote.into());
        self
    }

    /// Reject empty paths, empty path segments and empty remote names
    pub fn validate(&self) -> ConfigResult<()> {
        for (path, remote) in &self.mappings {
            if path.is_empty() || path.split('.').any(str::is_empty) {
                return Err(ConfigError::InvalidValue {
                    field: "fields.mappings".to_string(),
                    value: format!("malformed path '{}'", path),
                });
            }
            if remote.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("fields.mappings.{}", path),
                    value: "remote field name is empty".to_string(),
                });
            }
        }
        Ok(())
    }
}
