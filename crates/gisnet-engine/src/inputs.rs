//! Shape checks over decoded input fields.

use crate::EngineError;
use gisnet_codec::{encode_field, CodecPolicy};
use gisnet_domain::{InputBundle, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// A demand or supply site taken from the platform input.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SitePoint {
    pub id: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub capacity_kw: f64,
}

fn bad_input(field: &str, reason: impl Into<String>) -> EngineError {
    EngineError::BadInput {
        field: field.to_string(),
        reason: reason.into(),
    }
}

/// Field map of a decoded input: a mapping, or the state of a typed
/// object when the deployment runs the self-describing policy.
pub(crate) fn fields_of<'a>(
    field: &str,
    value: &'a Value,
) -> Result<&'a BTreeMap<String, Value>, EngineError> {
    match value {
        Value::Map(entries) => Ok(entries),
        Value::Object { state, .. } => Ok(state),
        other => Err(bad_input(field, format!("expected a mapping, got {other:?}"))),
    }
}

/// Look up a required input and view it as a field map.
pub(crate) fn require_fields<'a>(
    input: &'a InputBundle,
    field: &str,
) -> Result<&'a BTreeMap<String, Value>, EngineError> {
    let value = input
        .require(field)
        .map_err(|reason| bad_input(field, reason))?;
    fields_of(field, value)
}

/// Optional numeric entry of a field map.
pub(crate) fn number(fields: &BTreeMap<String, Value>, key: &str) -> Option<f64> {
    fields.get(key).and_then(Value::as_f64)
}

/// Parse the site list under `key`, treating an absent key as empty.
pub(crate) fn site_points(
    field: &str,
    fields: &BTreeMap<String, Value>,
    key: &str,
) -> Result<Vec<SitePoint>, EngineError> {
    let Some(value) = fields.get(key) else {
        return Ok(Vec::new());
    };
    let items = value
        .as_seq()
        .ok_or_else(|| bad_input(field, format!("`{key}` is not a sequence")))?;

    let mut sites = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let entry = item
            .as_map()
            .ok_or_else(|| bad_input(field, format!("`{key}[{index}]` is not a mapping")))?;
        let id = entry
            .get("id")
            .and_then(Value::as_text)
            .ok_or_else(|| bad_input(field, format!("`{key}[{index}]` has no text `id`")))?
            .to_string();
        let coord = |axis: &str| {
            number(entry, axis)
                .ok_or_else(|| bad_input(field, format!("`{key}[{index}]` has no numeric `{axis}`")))
        };
        sites.push(SitePoint {
            name: entry
                .get("name")
                .and_then(Value::as_text)
                .unwrap_or(&id)
                .to_string(),
            x: coord("x")?,
            y: coord("y")?,
            capacity_kw: number(entry, "capacity_kw").unwrap_or(0.0),
            id,
        });
    }
    Ok(sites)
}

/// Euclidean distance in input units.
pub(crate) fn distance(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
}

/// Persist an intermediate value into the per-call scratch directory.
pub(crate) fn write_snapshot(workdir: &Path, name: &str, value: &Value) -> Result<(), EngineError> {
    let payload = encode_field(CodecPolicy::SelfDescribing, name, value)
        .map_err(|e| EngineError::Snapshot(e.to_string()))?;
    std::fs::write(workdir.join(name), payload)?;
    Ok(())
}
