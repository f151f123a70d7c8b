//! Key/value configuration store

use figment::Figment;
use serde_json::{Map, Value};
use tracing::trace;

/// Read-only lookup contract the resolver depends on
///
/// Keys use `:` as the hierarchy separator (`database:host`). Segments are
/// matched case-insensitively and may contain any other character, `.`
/// included.
pub trait ConfigStore: Send + Sync {
    /// Scalar value stored at `key`, rendered as a string
    ///
    /// Returns `None` for missing keys and for keys that hold a section.
    fn get(&self, key: &str) -> Option<String>;

    /// Structured subtree (or scalar) stored at `key`
    fn section(&self, key: &str) -> Option<Value>;
}

/// Store over a merged configuration tree
#[derive(Debug, Clone, Default)]
pub struct FigmentStore {
    root: Value,
}

impl FigmentStore {
    /// Snapshot the merged sources of `figment`
    pub fn from_figment(figment: &Figment) -> Result<Self, figment::Error> {
        let root = figment.extract::<Value>()?;
        Ok(Self::from_value(root))
    }

    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    /// Merge `layer` over the current tree
    ///
    /// Keys that differ only in case address the same entry; the existing
    /// spelling is kept.
    pub fn overlay(&mut self, layer: Value) {
        merge_ignore_case(&mut self.root, layer);
    }

    /// The whole configuration tree
    pub fn root(&self) -> &Value {
        &self.root
    }

    fn find(&self, key: &str) -> Option<&Value> {
        let mut segments = key.split(':').map(str::trim).filter(|s| !s.is_empty());
        let first = segments.next()?;

        let mut node = child(&self.root, first)?;
        for segment in segments {
            node = child(node, segment)?;
        }
        Some(node)
    }
}

impl ConfigStore for FigmentStore {
    fn get(&self, key: &str) -> Option<String> {
        let value = self.find(key);
        trace!("Store lookup '{}' (found: {})", key, value.is_some());
        value.and_then(scalar_to_string)
    }

    fn section(&self, key: &str) -> Option<Value> {
        self.find(key).cloned()
    }
}

/// Entry `segment` of `node`: an exact key, then a key equal ignoring case,
/// or an array index
fn child<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(segment).or_else(|| {
            map.iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(segment))
                .map(|(_, value)| value)
        }),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn merge_ignore_case(target: &mut Value, layer: Value) {
    match (target, layer) {
        (Value::Object(existing), Value::Object(incoming)) => {
            for (name, value) in incoming {
                let slot = matching_key(existing, &name).unwrap_or(name);
                match existing.get_mut(&slot) {
                    Some(current) => merge_ignore_case(current, value),
                    None => {
                        existing.insert(slot, value);
                    }
                }
            }
        }
        (target, layer) => *target = layer,
    }
}

fn matching_key(map: &Map<String, Value>, name: &str) -> Option<String> {
    if map.contains_key(name) {
        return Some(name.to_string());
    }
    map.keys().find(|k| k.eq_ignore_ascii_case(name)).cloned()
}

/// Render a scalar JSON value as the raw configuration string
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::providers::{Format, Yaml};
    use serde_json::json;

    fn store() -> FigmentStore {
        let figment = Figment::new().merge(Yaml::string(
            r#"
greeting: hello
database:
  host: localhost
  port: 5432
  replicas: [a, b]
debug: true
"#,
        ));
        FigmentStore::from_figment(&figment).unwrap()
    }

    #[test]
    fn test_scalar_lookup() {
        let store = store();
        assert_eq!(store.get("greeting").as_deref(), Some("hello"));
        assert_eq!(store.get("database:host").as_deref(), Some("localhost"));
        assert_eq!(store.get("database:port").as_deref(), Some("5432"));
        assert_eq!(store.get("debug").as_deref(), Some("true"));
        assert_eq!(store.get(" database : replicas : 1 ").as_deref(), Some("b"));
    }

    #[test]
    fn test_sections_are_not_scalars() {
        let store = store();
        assert_eq!(store.get("database"), None);
        assert_eq!(store.get("database:replicas"), None);
        assert_eq!(store.get("missing"), None);
        assert_eq!(store.get(""), None);
        assert_eq!(store.get(" : "), None);
    }

    #[test]
    fn test_section_lookup() {
        let store = store();
        assert_eq!(
            store.section("database"),
            Some(json!({"host": "localhost", "port": 5432, "replicas": ["a", "b"]}))
        );
        assert_eq!(store.section("greeting"), Some(json!("hello")));
        assert_eq!(store.section("nope:nothing"), None);
    }

    #[test]
    fn test_dots_are_part_of_the_key() {
        let store = FigmentStore::from_value(json!({
            "app.name": "svc",
            "app": {"name": "nested"},
            "logging": {"level.default": "warn"}
        }));
        assert_eq!(store.get("app.name").as_deref(), Some("svc"));
        assert_eq!(store.get("app:name").as_deref(), Some("nested"));
        assert_eq!(store.get("logging:level.default").as_deref(), Some("warn"));
    }

    #[test]
    fn test_lookup_ignores_case() {
        let store = FigmentStore::from_value(json!({
            "Database": {"Host": "db", "host": "exact"},
            "ApiKey": "k"
        }));
        assert_eq!(store.get("DATABASE:HOST").as_deref(), Some("db"));
        assert_eq!(store.get("database:host").as_deref(), Some("exact"));
        assert_eq!(store.get("apikey").as_deref(), Some("k"));
    }

    #[test]
    fn test_overlay_matches_keys_ignoring_case() {
        let mut store = FigmentStore::from_value(json!({
            "Database": {"Host": "filehost", "Port": 1}
        }));
        store.overlay(json!({"database": {"host": "envhost", "timeout": 5}}));

        assert_eq!(
            store.root(),
            &json!({"Database": {"Host": "envhost", "Port": 1, "timeout": 5}})
        );

        store.overlay(json!({"database": "flat"}));
        assert_eq!(store.get("Database").as_deref(), Some("flat"));
    }
}
