//! # Rich-Query Selector
//!
//! Single-field equality predicate over the JSON body of a stored value.
//!
//! Wire form: `{"selector":{"epochid":"7"}}`. Exactly one field, and the
//! value must be a JSON scalar. Anything else is rejected as an invalid
//! query rather than being interpreted loosely.

use crate::domain::errors::StoreError;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Equality selector on one top-level field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    field: String,
    value: Value,
}

impl Selector {
    /// `field == value` where `value` is a JSON string.
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: Value::String(value.into()),
        }
    }

    /// Build from an arbitrary JSON scalar.
    pub fn with_value(field: impl Into<String>, value: Value) -> Result<Self, StoreError> {
        let field = field.into();
        if field.is_empty() {
            return Err(StoreError::invalid_query("selector field is empty"));
        }
        if value.is_object() || value.is_array() {
            return Err(StoreError::invalid_query(format!(
                "selector value for '{field}' must be a scalar"
            )));
        }
        Ok(Self { field, value })
    }

    /// Parse the rich-query wire form.
    pub fn parse(query: &str) -> Result<Self, StoreError> {
        let root: Value = serde_json::from_str(query)
            .map_err(|e| StoreError::invalid_query(format!("selector is not JSON: {e}")))?;

        let selector = root
            .as_object()
            .and_then(|o| o.get("selector"))
            .and_then(Value::as_object)
            .ok_or_else(|| StoreError::invalid_query("missing \"selector\" object"))?;

        if selector.len() != 1 {
            return Err(StoreError::invalid_query(format!(
                "selector must name exactly one field, got {}",
                selector.len()
            )));
        }

        let (field, value) = selector
            .iter()
            .next()
            .ok_or_else(|| StoreError::invalid_query("empty selector"))?;
        Self::with_value(field.clone(), value.clone())
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Canonical index term for the selector value.
    ///
    /// The JSON rendering keeps `"7"` and `7` apart.
    pub fn term(&self) -> String {
        self.value.to_string()
    }

    /// Render back to the wire form.
    pub fn to_query_string(&self) -> String {
        let mut inner = Map::new();
        inner.insert(self.field.clone(), self.value.clone());
        let mut outer = Map::new();
        outer.insert("selector".to_string(), Value::Object(inner));
        Value::Object(outer).to_string()
    }

    /// Whether a stored value satisfies the selector.
    ///
    /// Values that are not JSON objects never match.
    pub fn matches(&self, raw: &[u8]) -> bool {
        match serde_json::from_slice::<Value>(raw) {
            Ok(Value::Object(obj)) => obj.get(&self.field) == Some(&self.value),
            _ => false,
        }
    }
}

impl FromStr for Selector {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}
