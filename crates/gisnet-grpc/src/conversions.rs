//! Envelope conversions between proto messages and domain bundles.
//!
//! Each request field decodes independently through the payload codec;
//! each declared result key encodes independently on the way out. The
//! optimize `report` is the one exception: plain text, passed through
//! unchanged.

use gisnet_codec::{decode_field, encode_field, CodecPolicy, DecodeError, EncodeError};
use gisnet_domain::{keys, InputBundle, ResultBundle, Value};

use crate::proto;

/// Server-side failure to map an engine result onto the response
/// envelope. A missing key means the engine broke its contract; the
/// caller sees a fault, never a partial response.
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    /// Engine result bundle is missing a declared output key
    #[error("engine result is missing output key `{0}`")]
    MissingOutput(&'static str),

    /// The report output must be plain text
    #[error("engine report is not plain text")]
    ReportNotText,

    /// Result value not representable under the active policy
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Decode a create request into its input bundle.
pub fn decode_create_request(
    policy: CodecPolicy,
    req: &proto::CreateNetworkRequest,
) -> Result<InputBundle, DecodeError> {
    let mut input = InputBundle::new();
    input.insert(
        keys::PLATFORM,
        decode_field(policy, keys::PLATFORM, &req.platform)?,
    );
    input.insert(
        keys::CF_MODULE,
        decode_field(policy, keys::CF_MODULE, &req.cf_module)?,
    );
    input.insert(
        keys::TEO_MODULE,
        decode_field(policy, keys::TEO_MODULE, &req.teo_module)?,
    );
    Ok(input)
}

/// Decode an optimize request into its input bundle.
pub fn decode_optimize_request(
    policy: CodecPolicy,
    req: &proto::OptimizeNetworkRequest,
) -> Result<InputBundle, DecodeError> {
    let mut input = InputBundle::new();
    input.insert(
        keys::PLATFORM,
        decode_field(policy, keys::PLATFORM, &req.platform)?,
    );
    input.insert(
        keys::CF_MODULE,
        decode_field(policy, keys::CF_MODULE, &req.cf_module)?,
    );
    input.insert(
        keys::TEO_MODULE,
        decode_field(policy, keys::TEO_MODULE, &req.teo_module)?,
    );
    input.insert(
        keys::GIS_MODULE,
        decode_field(policy, keys::GIS_MODULE, &req.gis_module)?,
    );
    Ok(input)
}

/// Encode a create result bundle as its response envelope.
pub fn encode_create_response(
    policy: CodecPolicy,
    mut result: ResultBundle,
) -> Result<proto::CreateNetworkResponse, ResponseError> {
    Ok(proto::CreateNetworkResponse {
        nodes: encoded_output(policy, &mut result, "nodes")?,
        edges: encoded_output(policy, &mut result, "edges")?,
        demand_list: encoded_output(policy, &mut result, "demand_list")?,
        supply_list: encoded_output(policy, &mut result, "supply_list")?,
    })
}

/// Encode an optimize result bundle as its response envelope.
pub fn encode_optimize_response(
    policy: CodecPolicy,
    mut result: ResultBundle,
) -> Result<proto::OptimizeNetworkResponse, ResponseError> {
    Ok(proto::OptimizeNetworkResponse {
        res_sources_sinks: encoded_output(policy, &mut result, "res_sources_sinks")?,
        sums: encoded_output(policy, &mut result, "sums")?,
        losses_cost_kw: encoded_output(policy, &mut result, "losses_cost_kw")?,
        network_solution_nodes: encoded_output(policy, &mut result, "network_solution_nodes")?,
        network_solution_edges: encoded_output(policy, &mut result, "network_solution_edges")?,
        potential_edges: encoded_output(policy, &mut result, "potential_edges")?,
        potential_nodes: encoded_output(policy, &mut result, "potential_nodes")?,
        selected_agents: encoded_output(policy, &mut result, "selected_agents")?,
        names_dict: encoded_output(policy, &mut result, "names_dict")?,
        report: report_output(&mut result)?,
    })
}

fn encoded_output(
    policy: CodecPolicy,
    result: &mut ResultBundle,
    key: &'static str,
) -> Result<String, ResponseError> {
    let value = result.take(key).ok_or(ResponseError::MissingOutput(key))?;
    Ok(encode_field(policy, key, &value)?)
}

/// The report bypasses the structured codec entirely.
fn report_output(result: &mut ResultBundle) -> Result<String, ResponseError> {
    match result.take(keys::REPORT) {
        Some(Value::Text(report)) => Ok(report),
        Some(_) => Err(ResponseError::ReportNotText),
        None => Err(ResponseError::MissingOutput(keys::REPORT)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_optimize_bundle() -> ResultBundle {
        let mut result = ResultBundle::new();
        for key in [
            "res_sources_sinks",
            "sums",
            "losses_cost_kw",
            "network_solution_nodes",
            "network_solution_edges",
            "potential_edges",
            "potential_nodes",
            "selected_agents",
            "names_dict",
        ] {
            result.insert(key, Value::empty_map());
        }
        result.insert(keys::REPORT, Value::Text("all good\n".to_string()));
        result
    }

    #[test]
    fn test_decode_create_request_builds_bundle() {
        let req = proto::CreateNetworkRequest {
            platform: r#"{"crs": "EPSG:4326"}"#.to_string(),
            cf_module: "{}".to_string(),
            teo_module: "{}".to_string(),
        };

        let input = decode_create_request(CodecPolicy::PlainText, &req).unwrap();
        assert_eq!(input.len(), 3);
        let platform = input.get(keys::PLATFORM).unwrap().as_map().unwrap();
        assert_eq!(platform["crs"].as_text(), Some("EPSG:4326"));
    }

    #[test]
    fn test_decode_failure_names_the_field() {
        let req = proto::OptimizeNetworkRequest {
            platform: "{}".to_string(),
            cf_module: "{}".to_string(),
            teo_module: "{}".to_string(),
            gis_module: "{oops".to_string(),
        };

        let err = decode_optimize_request(CodecPolicy::PlainText, &req).unwrap_err();
        assert!(err.to_string().contains("gis-module"));
    }

    #[test]
    fn test_encode_create_response_requires_every_key() {
        let mut result = ResultBundle::new();
        result.insert("nodes", Value::Seq(vec![]));
        result.insert("edges", Value::Seq(vec![]));
        result.insert("demand_list", Value::Seq(vec![]));
        // supply_list deliberately absent

        let err = encode_create_response(CodecPolicy::PlainText, result).unwrap_err();
        assert!(matches!(err, ResponseError::MissingOutput("supply_list")));
    }

    #[test]
    fn test_encode_optimize_response_report_is_verbatim() {
        let mut result = full_optimize_bundle();
        let report = "losses: 0.5 kW\n\"quoted\" text stays raw\n";
        result.insert(keys::REPORT, Value::Text(report.to_string()));

        let response = encode_optimize_response(CodecPolicy::PlainText, result).unwrap();
        assert_eq!(response.report, report);
        // Every structured field is JSON under the plain policy.
        assert_eq!(response.sums, "{}");
    }

    #[test]
    fn test_non_text_report_is_rejected() {
        let mut result = full_optimize_bundle();
        result.insert(keys::REPORT, Value::Int(7));

        let err = encode_optimize_response(CodecPolicy::PlainText, result).unwrap_err();
        assert!(matches!(err, ResponseError::ReportNotText));
    }

    #[test]
    fn test_unrepresentable_result_is_encode_error() {
        let mut result = ResultBundle::new();
        result.insert("nodes", Value::object("RoadNetwork", [("n", Value::Int(1))]));
        result.insert("edges", Value::Seq(vec![]));
        result.insert("demand_list", Value::Seq(vec![]));
        result.insert("supply_list", Value::Seq(vec![]));

        let err = encode_create_response(CodecPolicy::PlainText, result).unwrap_err();
        assert!(matches!(err, ResponseError::Encode(_)));

        // The same bundle is representable under the self-describing
        // policy.
        let mut result = ResultBundle::new();
        result.insert("nodes", Value::object("RoadNetwork", [("n", Value::Int(1))]));
        result.insert("edges", Value::Seq(vec![]));
        result.insert("demand_list", Value::Seq(vec![]));
        result.insert("supply_list", Value::Seq(vec![]));
        assert!(encode_create_response(CodecPolicy::SelfDescribing, result).is_ok());
    }
}
