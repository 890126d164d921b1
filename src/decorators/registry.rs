//! Decorator registry implementation.

use crate::error::{ContextError, Result};
use crate::types::Value;

/// Ordered name → decorator mapping, private to one context node.
///
/// Names are unique per registry; insertion order is preserved.
#[derive(Clone, Debug, Default)]
pub struct DecoratorRegistry {
    entries: Vec<(String, Value)>,
}

impl DecoratorRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Register a decorator. Fails if `name` is already registered here.
    pub fn insert(&mut self, name: String, value: Value) -> Result<()> {
        if self.has(&name) {
            return Err(ContextError::DecoratorAlreadyPresent(name));
        }
        self.entries.push((name, value));
        Ok(())
    }

    /// Registered names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_and_get() {
        let mut registry = DecoratorRegistry::new();
        registry
            .insert("greet".to_string(), Value::data(json!("hi")))
            .unwrap();

        assert!(registry.has("greet"));
        assert_eq!(registry.get("greet"), Some(&Value::data(json!("hi"))));
        assert_eq!(registry.get("missing"), None);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = DecoratorRegistry::new();
        registry
            .insert("greet".to_string(), Value::data(json!("hi")))
            .unwrap();

        let result = registry.insert("greet".to_string(), Value::data(json!("again")));
        assert!(matches!(
            result,
            Err(ContextError::DecoratorAlreadyPresent(name)) if name == "greet"
        ));

        // The original entry is untouched
        assert_eq!(registry.get("greet"), Some(&Value::data(json!("hi"))));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut registry = DecoratorRegistry::new();
        for name in ["c", "a", "b"] {
            registry
                .insert(name.to_string(), Value::data(json!(null)))
                .unwrap();
        }

        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }
}
