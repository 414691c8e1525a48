//! Network optimization: greedy assignment of sinks to sources.

use crate::inputs::{distance, number, require_fields, write_snapshot, SitePoint};
use crate::EngineError;
use gisnet_domain::{keys, InputBundle, KnowledgeBase, ResultBundle, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

const DEFAULT_HEAT_LOSS_KW_PER_M: f64 = 0.0002;

/// A node taken from the prior GIS result.
#[derive(Debug, Clone)]
struct Node {
    site: SitePoint,
    kind: String,
}

pub(crate) fn run_optimize_network(
    workdir: &Path,
    input: &InputBundle,
    kb: &KnowledgeBase,
) -> Result<ResultBundle, EngineError> {
    require_fields(input, keys::PLATFORM)?;
    let cf = require_fields(input, keys::CF_MODULE)?;
    let teo = require_fields(input, keys::TEO_MODULE)?;
    let gis = require_fields(input, keys::GIS_MODULE)?;

    let nodes = node_list(gis)?;
    let potential_edges = match gis.get("edges") {
        Some(value) => value
            .as_seq()
            .ok_or_else(|| EngineError::BadInput {
                field: keys::GIS_MODULE.to_string(),
                reason: "`edges` is not a sequence".to_string(),
            })?
            .to_vec(),
        None => Vec::new(),
    };
    let edge_lengths = edge_length_index(&potential_edges);

    let loss_per_m = number(cf, "heat_loss_kw_per_m")
        .or_else(|| kb.get_f64("heat_loss_kw_per_m"))
        .unwrap_or(DEFAULT_HEAT_LOSS_KW_PER_M);
    let demand_factor = number(teo, "demand_factor").unwrap_or(1.0);

    let sinks: Vec<&Node> = nodes.iter().filter(|n| n.kind == "demand").collect();
    let sources: Vec<&Node> = nodes.iter().filter(|n| n.kind == "supply").collect();
    debug!(
        sinks = sinks.len(),
        sources = sources.len(),
        "optimizing network"
    );

    // Greedy assignment: each sink draws from its nearest source with
    // remaining capacity.
    let mut remaining: Vec<f64> = sources.iter().map(|s| s.site.capacity_kw).collect();
    let mut delivered_by_source = vec![0.0; sources.len()];
    let mut assignments: Vec<(usize, usize, f64)> = Vec::new(); // (sink, source, kw)
    for (sink_index, sink) in sinks.iter().enumerate() {
        let need = sink.site.capacity_kw * demand_factor;
        if need <= 0.0 {
            continue;
        }
        let candidate = (0..sources.len())
            .filter(|&i| remaining[i] > 0.0)
            .min_by(|&a, &b| {
                let da = site_distance(&sink.site, &sources[a].site);
                let db = site_distance(&sink.site, &sources[b].site);
                da.total_cmp(&db)
            });
        if let Some(source_index) = candidate {
            let kw = need.min(remaining[source_index]);
            remaining[source_index] -= kw;
            delivered_by_source[source_index] += kw;
            assignments.push((sink_index, source_index, kw));
        }
    }

    let mut solution_edges = Vec::with_capacity(assignments.len());
    let mut total_loss = 0.0;
    let mut total_cost = 0.0;
    for &(sink_index, source_index, kw) in &assignments {
        let sink = &sinks[sink_index].site;
        let source = &sources[source_index].site;
        let (length_m, cost) = edge_lengths
            .get(&(sink.id.clone(), source.id.clone()))
            .copied()
            .unwrap_or_else(|| (site_distance(sink, source), 0.0));
        let loss_kw = length_m * loss_per_m;
        total_loss += loss_kw;
        total_cost += cost;
        solution_edges.push(Value::map([
            ("source", Value::from(sink.id.clone())),
            ("target", Value::from(source.id.clone())),
            ("length_m", Value::Float(length_m)),
            ("cost", Value::Float(cost)),
            ("capacity_kw", Value::Float(kw)),
            ("loss_kw", Value::Float(loss_kw)),
        ]));
    }

    let served: Vec<&Node> = assignments.iter().map(|&(i, _, _)| sinks[i]).collect();
    let used_sources: Vec<usize> = (0..sources.len())
        .filter(|&i| delivered_by_source[i] > 0.0)
        .collect();

    let total_demand: f64 = sinks
        .iter()
        .map(|s| s.site.capacity_kw * demand_factor)
        .sum();
    let total_supply: f64 = sources.iter().map(|s| s.site.capacity_kw).sum();
    let total_delivered: f64 = assignments.iter().map(|&(_, _, kw)| kw).sum();

    let solution_nodes: Vec<Value> = served
        .iter()
        .map(|n| node_value(n))
        .chain(used_sources.iter().map(|&i| node_value(sources[i])))
        .collect();
    let selected_agents: Vec<Value> = served
        .iter()
        .map(|n| Value::from(n.site.id.clone()))
        .chain(
            used_sources
                .iter()
                .map(|&i| Value::from(sources[i].site.id.clone())),
        )
        .collect();
    let names: BTreeMap<String, Value> = nodes
        .iter()
        .map(|n| (n.site.id.clone(), Value::from(n.site.name.clone())))
        .collect();

    let report = format!(
        "network optimization report\n\
         sinks served: {}/{}\n\
         delivered: {:.2} kW of {:.2} kW requested\n\
         losses: {:.4} kW over {} edges\n\
         total cost: {:.2}\n",
        assignments.len(),
        sinks.len(),
        total_delivered,
        total_demand,
        total_loss,
        solution_edges.len(),
        total_cost,
    );

    let mut result = ResultBundle::new();
    result.insert(
        "res_sources_sinks",
        Value::map([
            (
                "sources",
                Value::Seq(
                    used_sources
                        .iter()
                        .map(|&i| {
                            Value::map([
                                ("id", Value::from(sources[i].site.id.clone())),
                                ("delivered_kw", Value::Float(delivered_by_source[i])),
                            ])
                        })
                        .collect(),
                ),
            ),
            (
                "sinks",
                Value::Seq(
                    assignments
                        .iter()
                        .map(|&(i, _, kw)| {
                            Value::map([
                                ("id", Value::from(sinks[i].site.id.clone())),
                                (
                                    "requested_kw",
                                    Value::Float(sinks[i].site.capacity_kw * demand_factor),
                                ),
                                ("received_kw", Value::Float(kw)),
                            ])
                        })
                        .collect(),
                ),
            ),
        ]),
    );
    result.insert(
        "sums",
        Value::map([
            ("demand_kw", Value::Float(total_demand)),
            ("supply_kw", Value::Float(total_supply)),
            ("delivered_kw", Value::Float(total_delivered)),
            ("unserved_kw", Value::Float(total_demand - total_delivered)),
        ]),
    );
    result.insert(
        "losses_cost_kw",
        Value::map([
            ("loss_kw", Value::Float(total_loss)),
            ("cost", Value::Float(total_cost)),
        ]),
    );
    result.insert("network_solution_nodes", Value::Seq(solution_nodes.clone()));
    result.insert("network_solution_edges", Value::Seq(solution_edges.clone()));
    result.insert("potential_edges", Value::Seq(potential_edges));
    result.insert(
        "potential_nodes",
        Value::Seq(nodes.iter().map(node_value).collect()),
    );
    result.insert("selected_agents", Value::Seq(selected_agents));
    result.insert("names_dict", Value::Map(names));
    result.insert(keys::REPORT, Value::Text(report));

    write_snapshot(
        workdir,
        "solution.json",
        &Value::map([
            ("nodes", Value::Seq(solution_nodes)),
            ("edges", Value::Seq(solution_edges)),
        ]),
    )?;

    Ok(result)
}

fn node_value(node: &Node) -> Value {
    Value::map([
        ("id", Value::from(node.site.id.clone())),
        ("name", Value::from(node.site.name.clone())),
        ("x", Value::Float(node.site.x)),
        ("y", Value::Float(node.site.y)),
        ("kind", Value::from(node.kind.clone())),
        ("capacity_kw", Value::Float(node.site.capacity_kw)),
    ])
}

fn site_distance(a: &SitePoint, b: &SitePoint) -> f64 {
    distance(a.x, a.y, b.x, b.y)
}

fn node_list(gis: &BTreeMap<String, Value>) -> Result<Vec<Node>, EngineError> {
    let bad = |reason: String| EngineError::BadInput {
        field: keys::GIS_MODULE.to_string(),
        reason,
    };
    let Some(value) = gis.get("nodes") else {
        return Ok(Vec::new());
    };
    let items = value
        .as_seq()
        .ok_or_else(|| bad("`nodes` is not a sequence".to_string()))?;

    let mut nodes = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let entry = item
            .as_map()
            .ok_or_else(|| bad(format!("`nodes[{index}]` is not a mapping")))?;
        let text = |key: &str| {
            entry
                .get(key)
                .and_then(Value::as_text)
                .map(str::to_string)
        };
        let id = text("id").ok_or_else(|| bad(format!("`nodes[{index}]` has no text `id`")))?;
        let coord = |axis: &str| {
            number(entry, axis)
                .ok_or_else(|| bad(format!("`nodes[{index}]` has no numeric `{axis}`")))
        };
        nodes.push(Node {
            site: SitePoint {
                name: text("name").unwrap_or_else(|| id.clone()),
                x: coord("x")?,
                y: coord("y")?,
                capacity_kw: number(entry, "capacity_kw").unwrap_or(0.0),
                id,
            },
            kind: text("kind").unwrap_or_else(|| "demand".to_string()),
        });
    }
    Ok(nodes)
}

/// Index candidate edges by (source, target) for length/cost lookups.
fn edge_length_index(edges: &[Value]) -> BTreeMap<(String, String), (f64, f64)> {
    let mut index = BTreeMap::new();
    for edge in edges {
        let Some(entry) = edge.as_map() else { continue };
        let endpoint = |key: &str| entry.get(key).and_then(Value::as_text);
        if let (Some(source), Some(target), Some(length_m)) =
            (endpoint("source"), endpoint("target"), number(entry, "length_m"))
        {
            index.insert(
                (source.to_string(), target.to_string()),
                (length_m, number(entry, "cost").unwrap_or(0.0)),
            );
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use gisnet_domain::NetworkEngine;

    fn node(id: &str, x: f64, y: f64, kind: &str, capacity_kw: f64) -> Value {
        Value::map([
            ("id", Value::from(id)),
            ("name", Value::from(format!("site {id}"))),
            ("x", Value::Float(x)),
            ("y", Value::Float(y)),
            ("kind", Value::from(kind)),
            ("capacity_kw", Value::Float(capacity_kw)),
        ])
    }

    fn optimize_input(gis: Value) -> InputBundle {
        let mut input = InputBundle::new();
        input.insert(keys::PLATFORM, Value::empty_map());
        input.insert(keys::CF_MODULE, Value::empty_map());
        input.insert(keys::TEO_MODULE, Value::empty_map());
        input.insert(keys::GIS_MODULE, gis);
        input
    }

    const STRUCTURED_KEYS: [&str; 9] = [
        "res_sources_sinks",
        "sums",
        "losses_cost_kw",
        "network_solution_nodes",
        "network_solution_edges",
        "potential_edges",
        "potential_nodes",
        "selected_agents",
        "names_dict",
    ];

    #[test]
    fn test_empty_network_optimizes_to_empty_solution() {
        let workdir = tempfile::tempdir().unwrap();
        let input = optimize_input(Value::empty_map());

        let result = crate::GisEngine::new()
            .optimize_network(workdir.path(), &input, &KnowledgeBase::default())
            .unwrap();

        for key in STRUCTURED_KEYS {
            assert!(result.contains(key), "{key}");
        }
        let report = result.get(keys::REPORT).unwrap().as_text().unwrap();
        assert!(report.contains("sinks served: 0/0"));
    }

    #[test]
    fn test_greedy_assignment_respects_capacity() {
        let workdir = tempfile::tempdir().unwrap();
        let gis = Value::map([(
            "nodes",
            Value::Seq(vec![
                node("d1", 0.0, 0.0, "demand", 60.0),
                node("d2", 1.0, 0.0, "demand", 60.0),
                node("s1", 0.5, 0.0, "supply", 100.0),
            ]),
        )]);

        let result = crate::GisEngine::new()
            .optimize_network(workdir.path(), &optimize_input(gis), &KnowledgeBase::default())
            .unwrap();

        let sums = result.get("sums").unwrap().as_map().unwrap().clone();
        assert_eq!(sums["demand_kw"].as_f64(), Some(120.0));
        assert_eq!(sums["supply_kw"].as_f64(), Some(100.0));
        // Second sink only gets what is left of s1.
        assert_eq!(sums["delivered_kw"].as_f64(), Some(100.0));
        assert_eq!(sums["unserved_kw"].as_f64(), Some(20.0));

        let report = result.get(keys::REPORT).unwrap().as_text().unwrap();
        assert!(report.starts_with("network optimization report"));
        assert!(workdir.path().join("solution.json").exists());
    }

    #[test]
    fn test_solution_prefers_candidate_edge_lengths() {
        let workdir = tempfile::tempdir().unwrap();
        let gis = Value::map([
            (
                "nodes",
                Value::Seq(vec![
                    node("d1", 0.0, 0.0, "demand", 10.0),
                    node("s1", 3.0, 4.0, "supply", 50.0),
                ]),
            ),
            (
                "edges",
                Value::Seq(vec![Value::map([
                    ("source", Value::from("d1")),
                    ("target", Value::from("s1")),
                    // Routed along roads: longer than the straight line.
                    ("length_m", Value::Float(7.5)),
                    ("cost", Value::Float(3375.0)),
                ])]),
            ),
        ]);

        let result = crate::GisEngine::new()
            .optimize_network(workdir.path(), &optimize_input(gis), &KnowledgeBase::default())
            .unwrap();

        let edges = result
            .get("network_solution_edges")
            .unwrap()
            .as_seq()
            .unwrap()
            .to_vec();
        assert_eq!(edges.len(), 1);
        let edge = edges[0].as_map().unwrap();
        assert_eq!(edge["length_m"].as_f64(), Some(7.5));
        assert_eq!(edge["cost"].as_f64(), Some(3375.0));

        let losses = result.get("losses_cost_kw").unwrap().as_map().unwrap().clone();
        assert_eq!(losses["loss_kw"].as_f64(), Some(7.5 * 0.0002));
    }

    #[test]
    fn test_demand_factor_scales_requests() {
        let workdir = tempfile::tempdir().unwrap();
        let gis = Value::map([(
            "nodes",
            Value::Seq(vec![
                node("d1", 0.0, 0.0, "demand", 10.0),
                node("s1", 1.0, 0.0, "supply", 50.0),
            ]),
        )]);
        let mut input = optimize_input(gis);
        input.insert(
            keys::TEO_MODULE,
            Value::map([("demand_factor", Value::Float(2.0))]),
        );

        let result = crate::GisEngine::new()
            .optimize_network(workdir.path(), &input, &KnowledgeBase::default())
            .unwrap();

        let sums = result.get("sums").unwrap().as_map().unwrap().clone();
        assert_eq!(sums["demand_kw"].as_f64(), Some(20.0));
        assert_eq!(sums["delivered_kw"].as_f64(), Some(20.0));
    }

    #[test]
    fn test_names_dict_covers_every_node() {
        let workdir = tempfile::tempdir().unwrap();
        let gis = Value::map([(
            "nodes",
            Value::Seq(vec![
                node("d1", 0.0, 0.0, "demand", 10.0),
                node("s1", 1.0, 0.0, "supply", 50.0),
            ]),
        )]);

        let result = crate::GisEngine::new()
            .optimize_network(workdir.path(), &optimize_input(gis), &KnowledgeBase::default())
            .unwrap();

        let names = result.get("names_dict").unwrap().as_map().unwrap().clone();
        assert_eq!(names.len(), 2);
        assert_eq!(names["d1"].as_text(), Some("site d1"));
    }
}
