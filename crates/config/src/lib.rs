//! Configuration management for the configuration resolver
//!
//! This crate loads configuration files and environment variables into a
//! read-only key/value store, and handles the resolver's own settings.

pub mod loader;
pub mod schema;
pub mod store;
pub mod validation;

pub use loader::{ConfigLoader, FileKind, StoreLoader};
pub use schema::*;
pub use store::{ConfigStore, FigmentStore};
pub use validation::*;
