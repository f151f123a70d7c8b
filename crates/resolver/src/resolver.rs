//! Variable resolver implementation

use crate::environment::{EnvironmentSource, ProcessEnvironment};
use crate::pattern::{replace_separators, ENVIRONMENT_REFERENCE, VARIABLE_REFERENCE};
use crate::section::SectionRegistry;
use crate::typed::{get_typed_value, primitive_candidates};
use config::ConfigStore;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};
use types::utils::{has_reference, sanitize_for_logging};
use types::{KeyForm, ResolutionError, Result, SerializerFormat};

/// Prefix applied to environment variable names unless already present
pub const DEFAULT_ENVIRONMENT_PREFIX: &str = "SS_";

/// Resolves `${name}` and `${env:NAME}` references against a store and an environment
///
/// A resolver never mutates its store. It is cheap to clone and can be shared
/// between threads; each instance carries its own store, environment source
/// and prefix.
#[derive(Clone)]
pub struct Resolver {
    store: Arc<dyn ConfigStore>,
    environment: Arc<dyn EnvironmentSource>,
    prefix: String,
    sections: SectionRegistry,
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("prefix", &self.prefix)
            .field("sections", &self.sections)
            .finish_non_exhaustive()
    }
}

/// Keys visited along the current reference chain
#[derive(Debug, Default)]
struct Chain {
    keys: Vec<String>,
}

impl Chain {
    fn enter(&mut self, key: String) -> Result<()> {
        if self.keys.contains(&key) {
            let mut cycle = self.keys.clone();
            cycle.push(key);
            return Err(ResolutionError::CircularReference {
                chain: cycle.join(" -> "),
            }
            .into());
        }
        self.keys.push(key);
        Ok(())
    }

    fn leave(&mut self) {
        self.keys.pop();
    }
}

impl Resolver {
    /// Resolver over `store`, reading the process environment with the default prefix
    pub fn new<S: ConfigStore + 'static>(store: S) -> Self {
        Self::from_shared(Arc::new(store))
    }

    pub fn from_shared(store: Arc<dyn ConfigStore>) -> Self {
        Self {
            store,
            environment: Arc::new(ProcessEnvironment),
            prefix: DEFAULT_ENVIRONMENT_PREFIX.to_string(),
            sections: SectionRegistry::new(),
        }
    }

    /// Read environment references from `environment` instead of the process
    pub fn with_environment<E: EnvironmentSource + 'static>(mut self, environment: E) -> Self {
        self.environment = Arc::new(environment);
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Register `section` as the store key for values of type `T`
    pub fn with_section<T: 'static>(mut self, section: impl Into<String>) -> Self {
        self.sections.register::<T>(section);
        self
    }

    pub fn environment_prefix(&self) -> &str {
        &self.prefix
    }

    pub fn sections(&self) -> &SectionRegistry {
        &self.sections
    }

    /// Canonicalize separators for `form`, then resolve references inside the key
    pub fn normalize_key(&self, name: &str, form: KeyForm) -> Result<String> {
        self.normalize_in(name, form, &mut Chain::default())
    }

    /// Replace every `${env:NAME}` in `text`; the result is trimmed
    pub fn resolve_environment_references(&self, text: &str) -> Result<String> {
        self.environment_references_in(text, &mut Chain::default())
    }

    /// Replace every `${name}` in `text` with its store value; the result is trimmed
    pub fn resolve_variable_references(&self, text: &str) -> Result<String> {
        self.variable_references_in(text, &mut Chain::default())
    }

    /// Resolve environment references, then variable references
    pub fn resolve(&self, text: &str) -> Result<String> {
        self.resolve_in(text, &mut Chain::default())
    }

    /// Resolved value of the environment variable `name` (prefixed if needed)
    pub fn environment_value(&self, name: &str) -> Result<String> {
        self.environment_value_in(name, &mut Chain::default())
    }

    pub fn environment_value_as<T: DeserializeOwned>(
        &self,
        name: &str,
        format: SerializerFormat,
    ) -> Result<T> {
        let value = self.environment_value(name)?;
        get_typed_value(&value, format)
    }

    /// Value stored at `key`, with references resolved
    ///
    /// A missing key yields an empty string. Values without references are
    /// returned exactly as stored.
    pub fn get_value(&self, key: &str) -> Result<String> {
        self.get_value_in(key, &mut Chain::default())
    }

    /// Bind the structured section at `key` to `T`
    ///
    /// Returns `Ok(None)` when `key` holds no section (missing or scalar).
    /// String leaves are resolved before binding.
    pub fn get_section<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let mut chain = Chain::default();
        let key = self.normalize_in(key, KeyForm::Lookup, &mut chain)?;

        let Some(mut section) = self.store.section(&key) else {
            return Ok(None);
        };
        if !(section.is_object() || section.is_array()) {
            return Ok(None);
        }

        self.resolve_tree(&mut section, &mut chain)?;

        let mut coerced = section.clone();
        match serde_json::from_value(section) {
            Ok(value) => Ok(Some(value)),
            Err(first) => {
                // Resolved leaves are strings; retry with their primitive reading
                coerce_tree(&mut coerced);
                serde_json::from_value(coerced).map(Some).map_err(|_| {
                    ResolutionError::InvalidSection {
                        section: key,
                        message: first.to_string(),
                    }
                    .into()
                })
            }
        }
    }

    /// Typed value at `key`: a structured section if present, otherwise the
    /// resolved scalar converted to `T`
    pub fn get_value_as<T: DeserializeOwned>(
        &self,
        key: &str,
        format: SerializerFormat,
    ) -> Result<T> {
        if let Some(value) = self.get_section(key)? {
            return Ok(value);
        }

        let value = self.get_value(key)?;
        get_typed_value(&value, format)
    }

    /// Typed value stored under the section registered for `T`
    pub fn get<T: DeserializeOwned + 'static>(&self, format: SerializerFormat) -> Result<T> {
        let section = self.sections.section_name::<T>();
        debug!("Reading {} from section '{}'", std::any::type_name::<T>(), section);
        self.get_value_as(&section, format)
    }

    fn normalize_in(&self, name: &str, form: KeyForm, chain: &mut Chain) -> Result<String> {
        let replaced = replace_separators(name, form);
        self.resolve_in(&replaced, chain)
    }

    fn resolve_in(&self, text: &str, chain: &mut Chain) -> Result<String> {
        let text = self.environment_references_in(text, chain)?;
        self.variable_references_in(&text, chain)
    }

    fn environment_references_in(&self, text: &str, chain: &mut Chain) -> Result<String> {
        substitute(&ENVIRONMENT_REFERENCE, text, |name| {
            self.environment_value_in(name, chain)
        })
    }

    fn variable_references_in(&self, text: &str, chain: &mut Chain) -> Result<String> {
        substitute(&VARIABLE_REFERENCE, text, |name| self.get_value_in(name, chain))
    }

    fn environment_value_in(&self, name: &str, chain: &mut Chain) -> Result<String> {
        let name = name.trim();
        let prefixed = if name.starts_with(&self.prefix) {
            name.to_string()
        } else {
            format!("{}{}", self.prefix, name)
        };
        let variable = self.normalize_in(&prefixed, KeyForm::Environment, chain)?;

        chain.enter(format!("env:{}", variable))?;
        let raw = self.environment.var(&variable).unwrap_or_default();
        trace!("Environment lookup '{}' = '{}'", variable, sanitize_for_logging(&raw));
        let value = self.resolve_in(&raw, chain)?;
        chain.leave();

        debug!("Resolved environment reference '{}'", variable);
        Ok(value)
    }

    fn get_value_in(&self, key: &str, chain: &mut Chain) -> Result<String> {
        let key = self.normalize_in(key, KeyForm::Lookup, chain)?;

        let Some(raw) = self.store.get(&key) else {
            trace!("No value stored at '{}'", key);
            return Ok(String::new());
        };

        if !has_reference(&raw) {
            return Ok(raw);
        }

        chain.enter(key.clone())?;
        let value = self.resolve_in(&raw, chain)?;
        chain.leave();

        debug!("Resolved '{}' to '{}'", key, sanitize_for_logging(&value));
        Ok(value)
    }

    fn resolve_tree(&self, value: &mut Value, chain: &mut Chain) -> Result<()> {
        match value {
            Value::String(s) if has_reference(s.as_str()) => {
                *s = self.resolve_in(s, chain)?;
            }
            Value::Array(items) => {
                for item in items {
                    self.resolve_tree(item, chain)?;
                }
            }
            Value::Object(map) => {
                for item in map.values_mut() {
                    self.resolve_tree(item, chain)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Replace every match of `pattern` in `text` with `replace(name)`, then trim
fn substitute<F>(pattern: &Regex, text: &str, mut replace: F) -> Result<String>
where
    F: FnMut(&str) -> Result<String>,
{
    let mut output = String::with_capacity(text.len());
    let mut last = 0;

    for captures in pattern.captures_iter(text) {
        let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        output.push_str(&text[last..whole.start()]);
        output.push_str(&replace(name.as_str())?);
        last = whole.end();
    }
    output.push_str(&text[last..]);

    Ok(output.trim().to_string())
}

fn coerce_tree(value: &mut Value) {
    match value {
        Value::String(s) => {
            if let Some(candidate) = primitive_candidates(s).into_iter().next() {
                *value = candidate;
            }
        }
        Value::Array(items) => items.iter_mut().for_each(coerce_tree),
        Value::Object(map) => map.values_mut().for_each(coerce_tree),
        _ => {}
    }
}
