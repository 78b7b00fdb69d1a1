//! Logging configuration
//!
//! Controls the `tracing` subscriber installed by applications embedding the
//! query engine.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive string, e.g. `issueq_query=debug`
    pub filter: String,
    /// Emit ANSI colours
    pub ansi: bool,
    /// Include the event target in each line
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "issueq_query=info,issueq_config=info".to_string(),
            ansi: true,
            with_target: true,
        }
    }
}

impl LoggingConfig {
    /// Parse the filter directives
    pub fn env_filter(&self) -> ConfigResult<EnvFilter> {
        EnvFilter::try_new(&self.filter).map_err(|e| ConfigError::InvalidValue {
            field: "logging.filter".to_string(),
            value: format!("'{}': {}", self.filter, e),
        })
    }

    /// Check the filter directives parse
    pub fn validate(&self) -> ConfigResult<()> {
        self.env_filter().map(|_| ())
    }

    /// Install a global fmt subscriber.
    ///
    /// Fails if a global subscriber is already set.
    pub fn init(&self) -> ConfigResult<()> {
        tracing_subscriber::fmt()
            .with_env_filter(self.env_filter()?)
            .with_ansi(self.ansi)
            .with_target(self.with_target)
            .try_init()
            .map_err(|e| ConfigError::Logging(e.to_string()))
    }
}
