//! Config file loading
//!
//! Loads a [`QueryConfig`] from TOML or YAML (chosen by file extension),
//! applies environment overrides and validates the result.

use crate::error::{ConfigError, ConfigResult};
use crate::QueryConfig;
use std::path::Path;
use tracing::{debug, info};

/// Environment variable overriding `logging.filter`
pub const LOG_ENV_VAR: &str = "ISSUEQ_LOG";

/// Supported config file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.yaml` / `.yml`
    Yaml,
}

impl ConfigFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "toml" => Ok(Self::Toml),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Yaml => "YAML",
        }
    }
}

/// Loads query engine configuration
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load, apply `ISSUEQ_LOG` and validate a config file
    pub async fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<QueryConfig> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        info!(path = %path.display(), format = format.name(), "Loading query config");

        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let mut config = Self::parse(&contents, format)?;
        Self::apply_env_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Parse config text in the given format (no overrides, no validation)
    pub fn parse(contents: &str, format: ConfigFormat) -> ConfigResult<QueryConfig> {
        match format {
            ConfigFormat::Toml => Self::from_toml_str(contents),
            ConfigFormat::Yaml => Self::from_yaml_str(contents),
        }
    }

    /// Parse TOML config text
    #[cfg(feature = "toml")]
    pub fn from_toml_str(contents: &str) -> ConfigResult<QueryConfig> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse {
            format: ConfigFormat::Toml.name(),
            message: e.to_string(),
        })
    }

    /// Parse TOML config text
    #[cfg(not(feature = "toml"))]
    pub fn from_toml_str(_contents: &str) -> ConfigResult<QueryConfig> {
        Err(ConfigError::UnsupportedFormat(
            "TOML support is disabled".to_string(),
        ))
    }

    /// Parse YAML config text
    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(contents: &str) -> ConfigResult<QueryConfig> {
        serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse {
            format: ConfigFormat::Yaml.name(),
            message: e.to_string(),
        })
    }

    /// Parse YAML config text
    #[cfg(not(feature = "yaml"))]
    pub fn from_yaml_str(_contents: &str) -> ConfigResult<QueryConfig> {
        Err(ConfigError::UnsupportedFormat(
            "YAML support is disabled".to_string(),
        ))
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(config: &mut QueryConfig) {
        Self::apply_overrides_from(config, |key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_overrides_from<F>(config: &mut QueryConfig, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(filter) = lookup(LOG_ENV_VAR).filter(|f| !f.trim().is_empty()) {
            debug!(filter = %filter, "Log filter overridden from environment");
            config.logging.filter = filter;
        }
    }
}
