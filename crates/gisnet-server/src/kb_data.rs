//! Static knowledge-base data.
//!
//! Default engineering parameters consulted by the engine when the
//! cost-function input does not override them. Built once at startup,
//! read-only afterwards.

use gisnet_domain::{KnowledgeBase, Value};

/// Build the process-wide knowledge base.
pub fn knowledge_base() -> KnowledgeBase {
    [
        ("pipe_cost_per_meter", Value::Float(450.0)),
        ("heat_loss_kw_per_m", Value::Float(0.0002)),
        ("max_pipe_length_m", Value::Int(2_000)),
        ("default_crs", Value::from("EPSG:4326")),
        (
            "road_classes",
            Value::Seq(vec![
                Value::from("residential"),
                Value::from("service"),
                Value::from("tertiary"),
                Value::from("secondary"),
                Value::from("primary"),
            ]),
        ),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value))
    .collect()
}
