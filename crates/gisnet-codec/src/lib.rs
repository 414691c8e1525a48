#![warn(missing_docs)]

//! Field-level payload codec for the service boundary.
//!
//! Every envelope field is one JSON text payload. Two policies exist
//! and are fixed per deployment, never negotiated per call:
//!
//! - **Self-describing**: primitives, sequences and mappings are plain
//!   JSON; typed objects are carried as a two-key tagged JSON object
//!   (`"$object"` class name, `"$state"` field map) so the original
//!   shape is reconstructible without a schema.
//! - **Plain**: schema-less JSON only. Typed objects are not
//!   representable and fail fast instead of losing their class.
//!
//! A field encoded under one policy must be decoded under the same
//! policy; the decoder detects the tag namespace and rejects mixed
//! usage. Fields decode independently, with no cross-field state.

use gisnet_domain::Value;
use serde_json::Value as Json;
use std::collections::BTreeMap;
use thiserror::Error;

/// Key tagging a typed object in the self-describing policy.
pub const OBJECT_TAG: &str = "$object";
/// Key carrying the object field map in the self-describing policy.
pub const STATE_TAG: &str = "$state";

/// The two supported field encoding policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecPolicy {
    /// Tagged JSON able to round-trip typed object state.
    SelfDescribing,
    /// Schema-less JSON for cross-language interoperability.
    PlainText,
}

impl CodecPolicy {
    /// Parse a policy name as written in configuration.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "self-describing" => Some(CodecPolicy::SelfDescribing),
            "plain" => Some(CodecPolicy::PlainText),
            _ => None,
        }
    }

    /// Configuration name of the policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            CodecPolicy::SelfDescribing => "self-describing",
            CodecPolicy::PlainText => "plain",
        }
    }
}

/// A request field that could not be turned into a domain value.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Required field absent or empty on the wire
    #[error("field `{field}`: missing required payload")]
    MissingField {
        /// Envelope field name
        field: String,
    },

    /// Payload is not parseable under the active policy
    #[error("field `{field}`: malformed payload: {reason}")]
    Malformed {
        /// Envelope field name
        field: String,
        /// Parser-reported reason
        reason: String,
    },

    /// Type-tagged payload received under the plain policy
    #[error("field `{field}`: type-tagged payload is not accepted under the plain policy")]
    PolicyMismatch {
        /// Envelope field name
        field: String,
    },

    /// Tag structure present but unusable
    #[error("field `{field}`: malformed type tag: {reason}")]
    BadTag {
        /// Envelope field name
        field: String,
        /// What was wrong with the tag
        reason: String,
    },
}

/// A domain value that cannot be written under the active policy.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Typed object under the plain policy
    #[error("field `{field}`: object `{class}` is not representable under the plain policy")]
    Unrepresentable {
        /// Envelope field name
        field: String,
        /// Class of the offending object
        class: String,
    },

    /// Map key colliding with the tag namespace
    #[error("field `{field}`: map key `{key}` collides with the codec tag namespace")]
    ReservedKey {
        /// Envelope field name
        field: String,
        /// Offending map key
        key: String,
    },

    /// NaN or infinite float
    #[error("field `{field}`: non-finite float is not representable")]
    NonFinite {
        /// Envelope field name
        field: String,
    },
}

/// Decode one envelope field into a domain value.
pub fn decode_field(policy: CodecPolicy, field: &str, raw: &str) -> Result<Value, DecodeError> {
    if raw.is_empty() {
        return Err(DecodeError::MissingField {
            field: field.to_string(),
        });
    }
    let json: Json = serde_json::from_str(raw).map_err(|e| DecodeError::Malformed {
        field: field.to_string(),
        reason: e.to_string(),
    })?;
    from_json(policy, field, json)
}

/// Encode one domain value as an envelope field.
pub fn encode_field(policy: CodecPolicy, field: &str, value: &Value) -> Result<String, EncodeError> {
    let json = to_json(policy, field, value)?;
    Ok(json.to_string())
}

fn from_json(policy: CodecPolicy, field: &str, json: Json) -> Result<Value, DecodeError> {
    match json {
        Json::Null => Ok(Value::Null),
        Json::Bool(b) => Ok(Value::Bool(b)),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::Float(f))
            } else {
                Err(DecodeError::Malformed {
                    field: field.to_string(),
                    reason: format!("number `{n}` is out of range"),
                })
            }
        }
        Json::String(s) => Ok(Value::Text(s)),
        Json::Array(items) => {
            let seq = items
                .into_iter()
                .map(|item| from_json(policy, field, item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Seq(seq))
        }
        Json::Object(map) => {
            if map.contains_key(OBJECT_TAG) || map.contains_key(STATE_TAG) {
                return tagged_from_json(policy, field, map);
            }
            let entries = map
                .into_iter()
                .map(|(k, v)| Ok((k, from_json(policy, field, v)?)))
                .collect::<Result<BTreeMap<_, _>, DecodeError>>()?;
            Ok(Value::Map(entries))
        }
    }
}

fn tagged_from_json(
    policy: CodecPolicy,
    field: &str,
    map: serde_json::Map<String, Json>,
) -> Result<Value, DecodeError> {
    if policy == CodecPolicy::PlainText {
        return Err(DecodeError::PolicyMismatch {
            field: field.to_string(),
        });
    }
    let bad_tag = |reason: &str| DecodeError::BadTag {
        field: field.to_string(),
        reason: reason.to_string(),
    };
    if map.len() != 2 || !map.contains_key(OBJECT_TAG) || !map.contains_key(STATE_TAG) {
        return Err(bad_tag("expected exactly the `$object` and `$state` keys"));
    }
    let class = match map.get(OBJECT_TAG) {
        Some(Json::String(class)) => class.clone(),
        _ => return Err(bad_tag("class name is not text")),
    };
    let state = match map.into_iter().find(|(k, _)| k == STATE_TAG) {
        Some((_, Json::Object(state))) => state,
        _ => return Err(bad_tag("object state is not a mapping")),
    };
    let state = state
        .into_iter()
        .map(|(k, v)| Ok((k, from_json(policy, field, v)?)))
        .collect::<Result<BTreeMap<_, _>, DecodeError>>()?;
    Ok(Value::Object { class, state })
}

fn to_json(policy: CodecPolicy, field: &str, value: &Value) -> Result<Json, EncodeError> {
    match value {
        Value::Null => Ok(Json::Null),
        Value::Bool(b) => Ok(Json::Bool(*b)),
        Value::Int(i) => Ok(Json::Number((*i).into())),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(Json::Number)
            .ok_or_else(|| EncodeError::NonFinite {
                field: field.to_string(),
            }),
        Value::Text(s) => Ok(Json::String(s.clone())),
        Value::Seq(items) => {
            let array = items
                .iter()
                .map(|item| to_json(policy, field, item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Json::Array(array))
        }
        Value::Map(entries) => Ok(Json::Object(map_to_json(policy, field, entries)?)),
        Value::Object { class, state } => {
            if policy == CodecPolicy::PlainText {
                return Err(EncodeError::Unrepresentable {
                    field: field.to_string(),
                    class: class.clone(),
                });
            }
            let mut tagged = serde_json::Map::new();
            tagged.insert(OBJECT_TAG.to_string(), Json::String(class.clone()));
            tagged.insert(
                STATE_TAG.to_string(),
                Json::Object(map_to_json(policy, field, state)?),
            );
            Ok(Json::Object(tagged))
        }
    }
}

fn map_to_json(
    policy: CodecPolicy,
    field: &str,
    entries: &BTreeMap<String, Value>,
) -> Result<serde_json::Map<String, Json>, EncodeError> {
    let mut map = serde_json::Map::with_capacity(entries.len());
    for (key, value) in entries {
        if key == OBJECT_TAG || key == STATE_TAG {
            return Err(EncodeError::ReservedKey {
                field: field.to_string(),
                key: key.clone(),
            });
        }
        map.insert(key.clone(), to_json(policy, field, value)?);
    }
    Ok(map)
}
