#![cfg(feature = "xraydb")]

use approx::assert_relative_eq;
use serde_json::{Value, json};
use xascalc::batch::compute_edge;
use xascalc::xraydb::XrayDb;
use xascalc::{BatchRequest, BatchResponse, CompoundContribution, EdgeConfig, run_batch};

fn request() -> BatchRequest {
    serde_json::from_value(json!({
        "compounds": [
            {"compound": "Fe", "area_density": 0.01},
            {"compound": "C", "area_density": 0.02}
        ],
        "edges": [
            {"element": "Fe", "edge_type": "K"},
            {"element": "Fe", "edge_type": "L4"},
            {"element": "Xx", "edge_type": "K"},
            {"element": "Ni", "edge_type": "K"}
        ]
    }))
    .unwrap()
}

#[test]
fn test_request_parses_wire_names() {
    let req = request();
    assert_eq!(req.compounds[0], CompoundContribution::new("Fe", 0.01));
    assert_eq!(req.edges[1], EdgeConfig::new("Fe", "L4"));
}

#[test]
fn test_bad_edges_do_not_abort_batch() {
    let response = run_batch(&XrayDb::new(), &request(), false);
    assert_eq!(response.results.len(), 4);

    let fe = response.results[0].computed().unwrap();
    assert_relative_eq!(fe.edge_value, 7112.0, epsilon = 1.0);
    assert!(fe.edge_jump > 0.0);
    assert_relative_eq!(fe.edge_jump, fe.abs_max - fe.abs_min);
    assert_eq!(fe.composition, "10.0 mg/cm² Fe + 20.0 mg/cm² C");
    assert!(fe.curves.is_none());

    assert!(response.results[1].error().unwrap().contains("L4"));
    assert!(response.results[2].error().unwrap().contains("Xx"));
    assert!(response.results[3].computed().is_some());
}

#[test]
fn test_response_json_shape() {
    let response = run_batch(&XrayDb::new(), &request(), false);
    let value = serde_json::to_value(&response).unwrap();
    let results = value["results"].as_array().unwrap();

    assert_eq!(results[0]["element"], "Fe");
    assert_eq!(results[0]["edge"], "K");
    assert!(results[0]["edge_value"].is_number());
    assert!(results[0].get("curves").is_none());
    assert!(results[0].get("error").is_none());

    assert!(results[1]["error"].is_string());
    assert!(results[1].get("edge_value").is_none());

    let back: BatchResponse = serde_json::from_value(value).unwrap();
    assert_eq!(back.results.len(), 4);
    assert!(back.results[0].computed().is_some());
    assert!(back.results[1].error().is_some());
}

#[test]
fn test_curves_included_on_request() {
    let req = BatchRequest {
        compounds: vec![CompoundContribution::new("Cu", 0.005)],
        edges: vec![EdgeConfig::new("Cu", "K")],
    };
    let response = run_batch(&XrayDb::new(), &req, true);
    let curves = response.results[0].computed().unwrap().curves.as_ref().unwrap();
    assert_eq!(curves.energy_ev.len(), 1000);
    assert_eq!(curves.absorption.len(), curves.energy_ev.len());
    assert_eq!(curves.transmission.len(), curves.energy_ev.len());
    assert!(curves.transmission.iter().all(|&t| t > 0.0 && t <= 100.0));
}

#[test]
fn test_empty_compounds_fail_every_edge() {
    let req: BatchRequest = serde_json::from_str(r#"{"edges": [{"element": "Fe", "edge_type": "K"}]}"#)
        .unwrap();
    let response = run_batch(&XrayDb::new(), &req, false);
    assert_eq!(response.results[0].error(), Some("no compounds provided"));
}

#[test]
fn test_compute_edge_matches_batch_entry() {
    let db = XrayDb::new();
    let req = request();
    let single = compute_edge(&db, &req.compounds, &req.edges[3], false).unwrap();
    let response = run_batch(&db, &req, false);
    assert_eq!(response.results[3].computed(), Some(&single));

    let value: Value = serde_json::to_value(&single).unwrap();
    assert!(value["abs_min"].as_f64().unwrap() >= 0.0);
}
