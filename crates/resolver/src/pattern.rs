//! Reference patterns and key separators

use regex::Regex;
use std::sync::LazyLock;
use types::KeyForm;

/// `${env:NAME}`, the `env:` marker is case-insensitive
pub static ENVIRONMENT_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{(?i:env):([^}]*)\}").expect("valid environment reference pattern")
});

/// `${name}`, also matches `${env:NAME}` so it must run after environment resolution
pub static VARIABLE_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]*)\}").expect("valid variable reference pattern"));

// `::` must precede `:` so a double colon collapses into one separator
static LOOKUP_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"::|->|/").expect("valid lookup separator pattern"));

static ENVIRONMENT_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"::|->|/|:").expect("valid environment separator pattern"));

/// Replace hierarchical separators with the canonical separator of `form`
///
/// This does not resolve references embedded in the key; see
/// [`crate::Resolver::normalize_key`].
pub fn replace_separators(name: &str, form: KeyForm) -> String {
    let separators = match form {
        KeyForm::Lookup => &*LOOKUP_SEPARATORS,
        KeyForm::Environment => &*ENVIRONMENT_SEPARATORS,
    };
    separators.replace_all(name, form.separator()).into_owned()
}
