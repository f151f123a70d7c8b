//! Shared types for the configuration resolver
//!
//! This crate contains the error enums, key forms and serializer formats used
//! by the store, the resolver and the command-line front end.

pub mod error;
pub mod format;
pub mod key;
pub mod utils;

// Re-export commonly used types
pub use error::{ConfigError, ResolutionError, ResolverError, Result};
pub use format::SerializerFormat;
pub use key::KeyForm;
