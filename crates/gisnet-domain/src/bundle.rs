//! Per-call input and result bundles.
//!
//! A bundle is built fresh for each call and owned exclusively by the
//! handling call. Nothing here is shared or reused across calls.

use crate::Value;
use std::collections::BTreeMap;

/// Envelope field keys used by the two operations.
pub mod keys {
    /// Platform configuration input
    pub const PLATFORM: &str = "platform";
    /// Cost-function module input
    pub const CF_MODULE: &str = "cf-module";
    /// Techno-economic-optimization module input
    pub const TEO_MODULE: &str = "teo-module";
    /// Prior GIS-module result (optimize only)
    pub const GIS_MODULE: &str = "gis-module";
    /// Plain-text run report (optimize output)
    pub const REPORT: &str = "report";
}

/// Decoded inputs for one call, keyed by envelope field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputBundle {
    fields: BTreeMap<String, Value>,
}

impl InputBundle {
    /// Create an empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a decoded field.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    /// Look up a field by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Look up a field, reporting its absence by name.
    pub fn require(&self, key: &str) -> Result<&Value, String> {
        self.fields
            .get(key)
            .ok_or_else(|| format!("input bundle is missing `{key}`"))
    }

    /// Number of fields present.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when no field has been inserted.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Output of one engine invocation, keyed by declared output name.
///
/// Completeness is the boundary layer's concern: a response is only
/// well-formed once every declared key has been taken out of the
/// bundle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultBundle {
    fields: BTreeMap<String, Value>,
}

impl ResultBundle {
    /// Create an empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an output value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    /// Look up an output by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Remove and return an output value.
    pub fn take(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    /// True when the bundle carries the given key.
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Number of outputs present.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when no output has been inserted.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, Value)> for ResultBundle {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
