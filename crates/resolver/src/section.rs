//! Section names for typed configuration shapes

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use types::utils::short_type_name;

/// Explicit table mapping a Rust type to the store key its values live under
///
/// Types without a registration fall back to their unqualified type name.
#[derive(Debug, Clone, Default)]
pub struct SectionRegistry {
    names: HashMap<TypeId, String>,
}

impl SectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `section` as the key for values of type `T`
    pub fn register<T: 'static>(&mut self, section: impl Into<String>) -> &mut Self {
        self.names.insert(TypeId::of::<T>(), section.into());
        self
    }

    /// Section key for `T`
    pub fn section_name<T: 'static>(&self) -> String {
        self.names
            .get(&TypeId::of::<T>())
            .cloned()
            .unwrap_or_else(|| short_type_name(type_name::<T>()).to_string())
    }

    pub fn is_registered<T: 'static>(&self) -> bool {
        self.names.contains_key(&TypeId::of::<T>())
    }
}
