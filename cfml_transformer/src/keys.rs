//! Per-unit key table
//!
//! Dynamic keys are appended in first-use order and looked up
//! case-insensitively, so `Foo` and `FOO` share one slot. Well-known keys
//! never reach this table; see [`cfml_runtime::key::field_name`].

use std::collections::HashMap;

use cfml_runtime::key::Key;
use tracing::trace;

#[derive(Debug, Clone, Default)]
pub struct KeyTable {
    keys: Vec<Key>,
    index: HashMap<Key, usize>,
}

impl KeyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `name`, appending it on first registration.
    pub fn register(&mut self, name: &str) -> usize {
        let key = Key::new(name);
        if let Some(&i) = self.index.get(&key) {
            return i;
        }
        let i = self.keys.len();
        trace!(key = name, index = i, "registered key");
        self.keys.push(key.clone());
        self.index.insert(key, i);
        i
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.index.get(&Key::new(name)).copied()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in slot order
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_case_insensitive_and_stable() {
        let mut table = KeyTable::new();
        assert_eq!(table.register("firstName"), 0);
        assert_eq!(table.register("lastName"), 1);
        assert_eq!(table.register("FIRSTNAME"), 0);
        assert_eq!(table.len(), 2);
        assert_eq!(table.keys()[0].as_str(), "firstName");
        assert_eq!(table.get("LastName"), Some(1));
        assert_eq!(table.get("other"), None);
    }
}
