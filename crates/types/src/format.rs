//! Serializer formats used for structured value decoding

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Structured format a configuration value is encoded in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerializerFormat {
    /// No declared format, every known format is attempted
    #[default]
    None,
    /// JSON document
    Json,
    /// YAML document
    Yaml,
}

impl fmt::Display for SerializerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SerializerFormat::None => "none",
            SerializerFormat::Json => "json",
            SerializerFormat::Yaml => "yaml",
        };
        f.write_str(name)
    }
}

impl FromStr for SerializerFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(SerializerFormat::None),
            "json" => Ok(SerializerFormat::Json),
            "yaml" | "yml" => Ok(SerializerFormat::Yaml),
            other => Err(format!("Unknown serializer format: {}", other)),
        }
    }
}
