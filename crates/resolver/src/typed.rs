//! Typed conversion of resolved configuration strings
//!
//! Conversion runs in two layers. Structured decoding parses the string as a
//! JSON or YAML document; when that fails the string is coerced into a
//! primitive (boolean, integer, float, then the string as given) and the
//! target type is bound from that. Only when both layers fail is a mismatch
//! reported.
//!
//! Without a declared format, YAML is only accepted when it yields a mapping
//! or a sequence. A YAML scalar may drop comments or quotes, so scalars are
//! left to the primitive layer.

use serde::de::DeserializeOwned;
use serde_json::{Number, Value};
use tracing::trace;
use types::utils::sanitize_for_logging;
use types::{ResolutionError, ResolverError, Result, SerializerFormat};

/// Outcome of a typed conversion
#[derive(Debug, Clone, PartialEq)]
pub enum Conversion<T> {
    /// Decoded as a structured document
    Structured(T),
    /// Bound from a primitive coercion of the raw string
    Primitive(T),
    /// Neither layer produced a `T`
    Mismatch,
}

impl<T> Conversion<T> {
    /// The converted value, if any
    pub fn value(self) -> Option<T> {
        match self {
            Conversion::Structured(value) | Conversion::Primitive(value) => Some(value),
            Conversion::Mismatch => None,
        }
    }

    pub fn is_mismatch(&self) -> bool {
        matches!(self, Conversion::Mismatch)
    }

    /// Turn a mismatch into a [`ResolutionError::TypeMismatch`] naming `source`
    pub fn into_result(self, source: &str) -> Result<T> {
        self.value().ok_or_else(|| {
            ResolverError::from(ResolutionError::TypeMismatch {
                target: std::any::type_name::<T>().to_string(),
                value: sanitize_for_logging(source),
            })
        })
    }
}

/// Convert `source` into `T`, reporting which layer succeeded
pub fn convert<T: DeserializeOwned>(source: &str, format: SerializerFormat) -> Conversion<T> {
    if let Some(value) = decode_structured(source, format) {
        return Conversion::Structured(value);
    }

    match coerce_primitive(source) {
        Some(value) => Conversion::Primitive(value),
        None => {
            trace!(
                "No conversion of '{}' to {}",
                sanitize_for_logging(source),
                std::any::type_name::<T>()
            );
            Conversion::Mismatch
        }
    }
}

/// Convert `source` into `T`, failing only when both layers fail
pub fn get_typed_value<T: DeserializeOwned>(source: &str, format: SerializerFormat) -> Result<T> {
    convert(source, format).into_result(source)
}

fn decode_structured<T: DeserializeOwned>(source: &str, format: SerializerFormat) -> Option<T> {
    match format {
        SerializerFormat::Json => serde_json::from_str(source).ok(),
        SerializerFormat::Yaml => serde_yaml::from_str(source).ok(),
        SerializerFormat::None => serde_json::from_str(source)
            .ok()
            .or_else(|| decode_yaml_collection(source)),
    }
}

fn decode_yaml_collection<T: DeserializeOwned>(source: &str) -> Option<T> {
    let document: Value = serde_yaml::from_str(source).ok()?;
    if !(document.is_object() || document.is_array()) {
        return None;
    }
    serde_json::from_value(document).ok()
}

fn coerce_primitive<T: DeserializeOwned>(source: &str) -> Option<T> {
    primitive_candidates(source)
        .into_iter()
        .find_map(|candidate| serde_json::from_value(candidate).ok())
}

/// Primitive interpretations of `source`, most specific first
///
/// Booleans and numbers are read from the trimmed text; the final string
/// candidate is `source` unchanged.
pub(crate) fn primitive_candidates(source: &str) -> Vec<Value> {
    let s = source.trim();
    let mut candidates = Vec::new();

    if s.eq_ignore_ascii_case("true") {
        candidates.push(Value::Bool(true));
    } else if s.eq_ignore_ascii_case("false") {
        candidates.push(Value::Bool(false));
    }

    if let Ok(n) = s.parse::<i64>() {
        candidates.push(Value::Number(n.into()));
    } else if let Ok(n) = s.parse::<u64>() {
        candidates.push(Value::Number(n.into()));
    }

    if let Some(n) = s.parse::<f64>().ok().and_then(Number::from_f64) {
        candidates.push(Value::Number(n));
    }

    candidates.push(Value::String(source.to_string()));
    candidates
}
