//! Knowledge-base handle.

use crate::Value;
use std::collections::BTreeMap;

/// Immutable reference data consulted by the engine.
///
/// Constructed once at process startup from static data and shared
/// read-only across all workers for the lifetime of the service. The
/// lookup semantics of individual entries belong to the engine; this
/// type is only the handle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnowledgeBase {
    entries: BTreeMap<String, Value>,
}

impl KnowledgeBase {
    /// Build a knowledge base from its entries.
    pub fn new(entries: BTreeMap<String, Value>) -> Self {
        Self { entries }
    }

    /// Look up an entry by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Numeric entry lookup; integers widen to `f64`.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.entries.get(key).and_then(Value::as_f64)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the knowledge base has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Value)> for KnowledgeBase {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
