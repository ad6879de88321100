//! # Secondary Index
//!
//! `(field, term) → {keys}` for the configured fields.
//!
//! Derived state only (INVARIANT-2). Every write removes the key's old
//! terms before inserting the new ones, so an overwrite that moves a record
//! to another epoch never leaves it reachable under the old one.

use serde_json::Value;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Default)]
pub struct SecondaryIndex {
    fields: Vec<String>,
    postings: HashMap<(String, String), BTreeSet<String>>,
}

impl SecondaryIndex {
    pub fn new(fields: Vec<String>) -> Self {
        Self {
            fields,
            postings: HashMap::new(),
        }
    }

    /// Whether selectors on `field` can be answered from the index.
    pub fn covers(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    /// Re-index `key` after a write. `old` is the value being replaced.
    pub fn update(&mut self, key: &str, old: Option<&[u8]>, new: &[u8]) {
        if let Some(old) = old {
            for term in self.terms(old) {
                if let Some(keys) = self.postings.get_mut(&term) {
                    keys.remove(key);
                    if keys.is_empty() {
                        self.postings.remove(&term);
                    }
                }
            }
        }
        for term in self.terms(new) {
            self.postings
                .entry(term)
                .or_default()
                .insert(key.to_string());
        }
    }

    /// Keys whose `field` renders to `term`, in key order.
    ///
    /// `None` means the field is not indexed and the caller must scan.
    pub fn lookup(&self, field: &str, term: &str) -> Option<Vec<String>> {
        if !self.covers(field) {
            return None;
        }
        Some(
            self.postings
                .get(&(field.to_string(), term.to_string()))
                .map(|keys| keys.iter().cloned().collect())
                .unwrap_or_default(),
        )
    }

    pub fn clear(&mut self) {
        self.postings.clear();
    }

    fn terms(&self, raw: &[u8]) -> Vec<(String, String)> {
        let Ok(Value::Object(obj)) = serde_json::from_slice::<Value>(raw) else {
            return Vec::new();
        };
        self.fields
            .iter()
            .filter_map(|field| {
                obj.get(field)
                    .filter(|v| !v.is_object() && !v.is_array())
                    .map(|v| (field.clone(), v.to_string()))
            })
            .collect()
    }
}
