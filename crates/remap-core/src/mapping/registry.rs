//! Converter registry: user-supplied escape hatches for shapes the engine
//! cannot reconcile structurally
//!
//! The registry is a pure data store mapping ordered (source, destination)
//! type-identity pairs to conversion functions, plus the set of identities
//! flagged as single-field wrapper types. A single reader/writer lock guards
//! both maps: queries take shared access, mutations exclusive access, and a
//! mapping call racing a registration observes either the old or the new
//! entry, never a torn one.
//!
//! "Not found" is a normal lookup outcome, not an error; the engine falls
//! back to its other strategies or escalates on its own terms.
//!
//! Copyright (c) 2025 Remap Team
//! Licensed under the Apache-2.0 license

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::value::Value;

/// A user-supplied conversion function from one opaque value to another
pub type ConverterFn = Arc<dyn Fn(&Value) -> anyhow::Result<Value> + Send + Sync>;

/// Ordered (source, destination) identity pair keying a registration
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConverterKey {
    pub from: String,
    pub to: String,
}

impl ConverterKey {
    /// Create a key from a source and destination identity
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl fmt::Display for ConverterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

#[derive(Default)]
struct RegistryState {
    converters: HashMap<ConverterKey, ConverterFn>,
    wrappers: HashSet<String>,
}

/// Thread-safe store of converters and wrapper-type flags
#[derive(Default)]
pub struct ConverterRegistry {
    state: RwLock<RegistryState>,
}

impl ConverterRegistry {
    /// Create an empty registry: no converters, no wrapper flags
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a converter for the (from, to) identity pair
    ///
    /// The last registration for a pair wins.
    pub fn register<F>(&self, from: &str, to: &str, converter: F)
    where
        F: Fn(&Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        let key = ConverterKey::new(from, to);
        let mut state = self.state.write().unwrap();
        if state.converters.insert(key, Arc::new(converter)).is_some() {
            log::debug!("replacing converter for {} -> {}", from, to);
        }
    }

    /// Remove the converter for the pair; no-op when absent
    pub fn unregister(&self, from: &str, to: &str) {
        let key = ConverterKey::new(from, to);
        self.state.write().unwrap().converters.remove(&key);
    }

    /// Set or clear the wrapper flag for a type identity
    pub fn set_wrapper_type(&self, identity: &str, wrapper: bool) {
        let mut state = self.state.write().unwrap();
        if wrapper {
            state.wrappers.insert(identity.to_string());
        } else {
            state.wrappers.remove(identity);
        }
    }

    /// Whether the identity is flagged as a wrapper type
    pub fn is_wrapper_type(&self, identity: &str) -> bool {
        self.state.read().unwrap().wrappers.contains(identity)
    }

    /// Look up the converter for the pair, if one is registered
    pub fn lookup(&self, from: &str, to: &str) -> Option<ConverterFn> {
        let key = ConverterKey::new(from, to);
        self.state.read().unwrap().converters.get(&key).cloned()
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read().unwrap();
        f.debug_struct("ConverterRegistry")
            .field("converters", &state.converters.keys().collect::<Vec<_>>())
            .field("wrappers", &state.wrappers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_absent_is_none() {
        let registry = ConverterRegistry::new();
        assert!(registry.lookup("a", "b").is_none());
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = ConverterRegistry::new();
        registry.register("a", "b", |_| Ok(Value::Int(1)));
        let converter = registry.lookup("a", "b").expect("converter registered");
        assert_eq!(converter(&Value::Int(0)).unwrap(), Value::Int(1));
        assert!(registry.lookup("b", "a").is_none());
    }

    #[test]
    fn test_last_registration_wins() {
        let registry = ConverterRegistry::new();
        registry.register("a", "b", |_| Ok(Value::Int(1)));
        registry.register("a", "b", |_| Ok(Value::Int(2)));
        let converter = registry.lookup("a", "b").unwrap();
        assert_eq!(converter(&Value::Int(0)).unwrap(), Value::Int(2));
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let registry = ConverterRegistry::new();
        registry.register("a", "b", |_| Ok(Value::Int(1)));
        registry.unregister("a", "b");
        assert!(registry.lookup("a", "b").is_none());
        registry.unregister("a", "b");
    }

    #[test]
    fn test_wrapper_flags_default_false() {
        let registry = ConverterRegistry::new();
        assert!(!registry.is_wrapper_type("W"));
        registry.set_wrapper_type("W", true);
        assert!(registry.is_wrapper_type("W"));
        registry.set_wrapper_type("W", false);
        assert!(!registry.is_wrapper_type("W"));
    }

    #[test]
    fn test_concurrent_readers_and_writers() {
        let registry = Arc::new(ConverterRegistry::new());
        let mut handles = Vec::new();
        for i in 0..4 {
            let registry = Arc::clone(&registry);
            handles.push(std::thread::spawn(move || {
                let from = format!("from-{i}");
                registry.register(&from, "to", |_| Ok(Value::Int(7)));
                for _ in 0..100 {
                    let _ = registry.lookup(&from, "to");
                    let _ = registry.is_wrapper_type("W");
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        for i in 0..4 {
            assert!(registry.lookup(&format!("from-{i}"), "to").is_some());
        }
    }
}
