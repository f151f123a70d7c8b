//! Error types for the configuration resolver

use thiserror::Error;

/// Main error type for the configuration resolver
#[derive(Error, Debug)]
pub enum ResolverError {
    /// Configuration loading or validation errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Variable resolution and conversion errors
    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),
}

impl ResolverError {
    /// Whether this error was raised by a reference cycle
    pub fn is_circular_reference(&self) -> bool {
        matches!(
            self,
            ResolverError::Resolution(ResolutionError::CircularReference { .. })
        )
    }

    /// Whether this error was raised by a failed type conversion
    pub fn is_type_mismatch(&self) -> bool {
        matches!(
            self,
            ResolverError::Resolution(ResolutionError::TypeMismatch { .. })
        )
    }
}

/// Result type alias for resolver operations
pub type Result<T> = std::result::Result<T, ResolverError>;

/// Configuration specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// Parse error
    #[error("Configuration parse error: {0}")]
    ParseError(String),

    /// Validation error
    #[error("Configuration validation error: {field}: {message}")]
    ValidationError { field: String, message: String },
}

/// Variable resolution specific errors
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// A key was reached twice while resolving a single reference chain
    #[error("Circular reference detected: {chain}")]
    CircularReference { chain: String },

    /// Neither structured decoding nor primitive coercion produced the target type
    #[error("Cannot convert '{value}' to {target}")]
    TypeMismatch { target: String, value: String },

    /// A structured section could not be bound to the target type
    #[error("Cannot bind section '{section}': {message}")]
    InvalidSection { section: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let err: ResolverError = ResolutionError::CircularReference {
            chain: "a -> b -> a".to_string(),
        }
        .into();
        assert!(err.is_circular_reference());
        assert!(!err.is_type_mismatch());
        assert_eq!(
            err.to_string(),
            "Resolution error: Circular reference detected: a -> b -> a"
        );

        let err: ResolverError = ResolutionError::TypeMismatch {
            target: "u16".to_string(),
            value: "abc".to_string(),
        }
        .into();
        assert!(err.is_type_mismatch());
    }

    #[test]
    fn test_config_error_display() {
        let err: ResolverError = ConfigError::FileNotFound {
            path: "missing.yaml".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Configuration error: Configuration file not found: missing.yaml"
        );
    }
}
