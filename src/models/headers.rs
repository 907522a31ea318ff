//! Insertion-ordered header storage
//!
//! Header keys keep the exact casing they arrived with, and iteration order
//! is insertion order so a captured message re-serializes deterministically.
//! Inserting an existing key replaces its value in place; the map never
//! holds two entries for the same key.

use serde::{Deserialize, Serialize};

/// Ordered header map with overwrite-on-duplicate-key semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderMap {
    entries: Vec<(String, String)>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert a header. If the exact key is already present its value is
    /// replaced and the entry keeps its position.
    pub fn insert(&mut self, key: &str, value: &str) {
        for (existing, val) in self.entries.iter_mut() {
            if existing.as_str() == key {
                *val = value.to_string();
                return;
            }
        }
        self.entries.push((key.to_string(), value.to_string()));
    }

    /// Exact, case-sensitive lookup.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// ASCII case-insensitive lookup, for well-known headers whose casing
    /// varies across clients.
    pub fn get_ignore_case(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Remove a header by exact key, returning its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_overwrites_value_in_place() {
        let mut headers = HeaderMap::new();
        headers.insert("A", "1");
        headers.insert("B", "2");
        headers.insert("A", "3");

        assert_eq!(headers.get("A"), Some("3"));
        assert_eq!(headers.len(), 2);
        let keys: Vec<&str> = headers.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["A", "B"]);
    }

    #[test]
    fn get_is_case_sensitive_but_ignore_case_is_not() {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", "text/html");

        assert_eq!(headers.get("content-type"), None);
        assert_eq!(headers.get_ignore_case("content-type"), Some("text/html"));
    }

    #[test]
    fn remove_matches_exact_key_only() {
        let mut headers = HeaderMap::new();
        headers.insert("Host", "example.com");

        assert_eq!(headers.remove("host"), None);
        assert_eq!(headers.remove("Host"), Some("example.com".to_string()));
        assert!(headers.is_empty());
    }
}
