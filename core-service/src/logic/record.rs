//! Customer Record - raw input for the feature pipeline
//!
//! Plain field → value mapping. Validation of shape happens upstream;
//! the pipeline only requires the fields it encodes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Flat mapping of customer attribute names to scalar JSON values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerRecord(Map<String, Value>);

impl CustomerRecord {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Get raw value by field name
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Set field value
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    /// Builder-style setter
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for CustomerRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
