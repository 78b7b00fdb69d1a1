//! # issueq configuration
//!
//! Configuration for the issueq pushdown query engine: the table that maps
//! record field paths to remote query-language fields, and logging settings.
//!
//! ## Features
//!
//! - TOML and YAML config files (`toml` / `yaml` features, both on by default)
//! - Serde defaults for every section, so partial files are valid
//! - `ISSUEQ_LOG` environment override for the log filter
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use issueq_config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::load_from_file("issueq.toml").await?;
//!     config.logging.init()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod components;
mod error;
mod loader;

pub use components::*;
pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigFormat, ConfigLoader, LOG_ENV_VAR};

use serde::{Deserialize, Serialize};

/// Top-level configuration for the query engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Field path to remote field mappings
    pub fields: FieldsConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl QueryConfig {
    /// Validate every section
    pub fn validate(&self) -> ConfigResult<()> {
        self.fields.validate()?;
        self.logging.validate()
    }
}
