use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use validator::Validate;

pub const ENV_MAX_DEPTH: &str = "DQL_REWRITER_MAX_DEPTH";
pub const ENV_UID_ALIAS: &str = "DQL_REWRITER_UID_ALIAS";
pub const ENV_INDENT: &str = "DQL_REWRITER_INDENT";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Rewriter configuration with validation
#[derive(Clone, Debug, PartialEq, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriterConfig {
    /// Deepest selection nesting a rewrite will follow
    #[validate(range(
        min = 1,
        max = 1000,
        message = "Max selection depth must be between 1 and 1000"
    ))]
    pub max_selection_depth: u32,

    /// Alias of the node-identifier entry appended to nested blocks
    #[validate(length(min = 1, message = "UID sentinel alias cannot be empty"))]
    pub uid_sentinel_alias: String,

    /// Spaces per nesting level in rendered queries
    #[validate(range(max = 8, message = "Indent width must be at most 8"))]
    pub indent_width: u8,
}

impl Default for RewriterConfig {
    fn default() -> Self {
        Self {
            max_selection_depth: 64,
            uid_sentinel_alias: "dgraph.uid".to_string(),
            indent_width: 2,
        }
    }
}

impl RewriterConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            max_selection_depth: parse_env_var(ENV_MAX_DEPTH, "64")?,
            uid_sentinel_alias: env::var(ENV_UID_ALIAS).unwrap_or_else(|_| "dgraph.uid".to_string()),
            indent_width: parse_env_var(ENV_INDENT, "2")?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides; unset flags keep the current value
    pub fn with_cli(mut self, cli: &CliConfig) -> Result<Self, ConfigError> {
        if let Some(depth) = cli.max_depth {
            self.max_selection_depth = depth;
        }
        if let Some(alias) = &cli.uid_alias {
            self.uid_sentinel_alias = alias.clone();
        }
        if let Some(indent) = cli.indent {
            self.indent_width = indent;
        }

        self.validate()?;
        Ok(self)
    }

    /// Apply the keys a configuration file sets; absent keys keep the current
    /// value
    pub fn merge(mut self, file: &FileConfig) -> Result<Self, ConfigError> {
        if let Some(depth) = file.max_selection_depth {
            self.max_selection_depth = depth;
        }
        if let Some(alias) = &file.uid_sentinel_alias {
            self.uid_sentinel_alias = alias.clone();
        }
        if let Some(indent) = file.indent_width {
            self.indent_width = indent;
        }

        self.validate()?;
        Ok(self)
    }
}

/// Keys read from a YAML configuration file. Only the keys present in the
/// file override the environment.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub max_selection_depth: Option<u32>,
    pub uid_sentinel_alias: Option<String>,
    pub indent_width: Option<u8>,
}

impl FileConfig {
    /// Create configuration overlay from YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        // An empty file sets nothing
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content.to_string(),
            source: Box::new(e),
        })
    }
}

/// CLI overrides (parsed from command line arguments)
#[derive(Clone, Debug, Default)]
pub struct CliConfig {
    pub max_depth: Option<u32>,
    pub uid_alias: Option<String>,
    pub indent: Option<u8>,
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}
