//! Configuration schema definitions

use serde::{Deserialize, Serialize};

/// Resolver settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Prefix prepended to environment variable names referenced as `${env:NAME}`
    #[serde(default = "default_environment_prefix")]
    pub environment_prefix: String,
    /// Configuration files merged into the store, later files override earlier ones
    #[serde(default)]
    pub files: Vec<String>,
    /// Merge prefixed environment variables on top of the files
    #[serde(default = "default_true")]
    pub environment_layer: bool,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
pub(crate) fn default_environment_prefix() -> String {
    "SS_".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            environment_prefix: default_environment_prefix(),
            files: Vec::new(),
            environment_layer: default_true(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}
