//! The normalized per-item output record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One output record. Always a JSON object, one per input item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultRecord(Map<String, Value>);

impl ResultRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a provider body. Objects are kept as-is; an empty body becomes an
    /// empty record; any other JSON value is placed under `data`.
    pub fn from_body(body: Value) -> Self {
        let mut record = Self::new();
        record.merge(body);
        record
    }

    /// `{success: false, error}` for a recovered provider error.
    pub fn soft_failure(message: impl Into<String>) -> Self {
        Self::new()
            .with("success", false)
            .with("error", message.into())
    }

    /// `{error}` placeholder for an item that failed fatally under
    /// continue-on-failure.
    pub fn error_placeholder(message: impl Into<String>) -> Self {
        Self::new().with("error", message.into())
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Spread `body` over the record; body fields win on conflict.
    pub fn merge(&mut self, body: Value) {
        match body {
            Value::Object(fields) => self.0.extend(fields),
            Value::Null => {}
            other => {
                self.0.insert("data".to_string(), other);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The `success` flag, when the record carries one.
    pub fn success(&self) -> Option<bool> {
        self.0.get("success").and_then(Value::as_bool)
    }

    pub fn error(&self) -> Option<&str> {
        self.0.get("error").and_then(Value::as_str)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}
