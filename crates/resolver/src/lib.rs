//! Variable resolution for configuration values
//!
//! Values read from a [`config::ConfigStore`] may reference other keys with
//! `${name}` and environment variables with `${env:NAME}`. The [`Resolver`]
//! substitutes both (environment references first), follows chains of
//! references, rejects cycles and converts the result to typed values.

pub mod environment;
pub mod pattern;
pub mod resolver;
pub mod section;
pub mod typed;

pub use environment::{EnvironmentSource, ProcessEnvironment};
pub use resolver::Resolver;
pub use section::SectionRegistry;
pub use typed::{convert, get_typed_value, Conversion};
