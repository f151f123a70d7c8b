//! Key normalization forms

use serde::{Deserialize, Serialize};

/// The context a key is normalized for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyForm {
    /// Configuration store lookup, hierarchical separators become `:`
    #[default]
    Lookup,
    /// Environment variable name, hierarchical separators become `_`
    Environment,
}

impl KeyForm {
    /// The canonical separator for this form
    pub fn separator(self) -> &'static str {
        match self {
            KeyForm::Lookup => ":",
            KeyForm::Environment => "_",
        }
    }
}
