//! Factory table for constructing default instances by type name.
//!
//! Statically typed targets cannot conjure an instance of an arbitrary
//! declared type at runtime, so hosts register a factory per type name.
//! The patch applier consults the registry whenever a path descends through
//! a member that is currently null.

use std::collections::HashMap;
use std::fmt;

use crate::value::Value;

type Factory = Box<dyn Fn() -> Value>;

/// Factory-function table keyed by type name.
#[derive(Default)]
pub struct TypeRegistry {
    factories: HashMap<String, Factory>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for a type name, replacing any previous one.
    pub fn register<F>(&mut self, type_name: impl Into<String>, factory: F)
    where
        F: Fn() -> Value + 'static,
    {
        self.factories.insert(type_name.into(), Box::new(factory));
    }

    /// Returns `true` if a factory is registered for the type name.
    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    /// Construct a default instance, or `None` if the type is unregistered.
    pub fn construct(&self, type_name: &str) -> Option<Value> {
        self.factories.get(type_name).map(|f| f())
    }

    /// Number of registered factories.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns `true` if no factories are registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Factories are opaque closures; print the registered names only.
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("TypeRegistry").field("types", &names).finish()
    }
}
