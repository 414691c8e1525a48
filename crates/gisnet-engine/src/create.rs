//! Network creation: nodes and candidate edges from platform sites.

use crate::inputs::{distance, require_fields, site_points, write_snapshot, SitePoint};
use crate::EngineError;
use gisnet_domain::{keys, InputBundle, KnowledgeBase, ResultBundle, Value};
use std::path::Path;
use tracing::debug;

/// Fallback when neither cf-module nor the knowledge base carries a
/// pipe cost.
const DEFAULT_PIPE_COST_PER_METER: f64 = 450.0;

pub(crate) fn run_create_network(
    workdir: &Path,
    input: &InputBundle,
    kb: &KnowledgeBase,
) -> Result<ResultBundle, EngineError> {
    let platform = require_fields(input, keys::PLATFORM)?;
    let cf = require_fields(input, keys::CF_MODULE)?;
    require_fields(input, keys::TEO_MODULE)?;

    let demands = site_points(keys::PLATFORM, platform, "demands")?;
    let supplies = site_points(keys::PLATFORM, platform, "supplies")?;
    let cost_per_m = crate::inputs::number(cf, "pipe_cost_per_meter")
        .or_else(|| kb.get_f64("pipe_cost_per_meter"))
        .unwrap_or(DEFAULT_PIPE_COST_PER_METER);

    debug!(
        demands = demands.len(),
        supplies = supplies.len(),
        "creating network"
    );

    let nodes: Vec<Value> = demands
        .iter()
        .map(|site| node_value(site, "demand"))
        .chain(supplies.iter().map(|site| node_value(site, "supply")))
        .collect();

    // One candidate edge per demand, to its nearest supply.
    let mut edges = Vec::with_capacity(demands.len());
    for demand in &demands {
        if let Some(supply) = nearest(demand, &supplies) {
            let length_m = distance(demand.x, demand.y, supply.x, supply.y);
            edges.push(Value::map([
                ("source", Value::from(demand.id.clone())),
                ("target", Value::from(supply.id.clone())),
                ("length_m", Value::Float(length_m)),
                ("cost", Value::Float(length_m * cost_per_m)),
            ]));
        }
    }

    let network = Value::map([
        ("nodes", Value::Seq(nodes.clone())),
        ("edges", Value::Seq(edges.clone())),
    ]);
    write_snapshot(workdir, "road_network.json", &network)?;

    let mut result = ResultBundle::new();
    result.insert("nodes", Value::Seq(nodes));
    result.insert("edges", Value::Seq(edges));
    result.insert(
        "demand_list",
        Value::Seq(demands.iter().map(|s| Value::from(s.id.clone())).collect()),
    );
    result.insert(
        "supply_list",
        Value::Seq(supplies.iter().map(|s| Value::from(s.id.clone())).collect()),
    );
    Ok(result)
}

fn node_value(site: &SitePoint, kind: &str) -> Value {
    Value::map([
        ("id", Value::from(site.id.clone())),
        ("name", Value::from(site.name.clone())),
        ("x", Value::Float(site.x)),
        ("y", Value::Float(site.y)),
        ("kind", Value::from(kind)),
        ("capacity_kw", Value::Float(site.capacity_kw)),
    ])
}

fn nearest<'a>(from: &SitePoint, candidates: &'a [SitePoint]) -> Option<&'a SitePoint> {
    candidates.iter().min_by(|a, b| {
        let da = distance(from.x, from.y, a.x, a.y);
        let db = distance(from.x, from.y, b.x, b.y);
        da.total_cmp(&db)
    })
}
