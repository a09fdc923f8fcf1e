use std::fs;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

fn xascalc(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_xascalc"))
        .args(args)
        .output()
        .expect("xascalc should run")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn calc_prints_text_report() {
    let output = xascalc(&["calc", "-e", "Fe", "--edge", "K", "-c", "Fe:0.01", "-c", "C:0.02"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let text = stdout(&output);
    assert!(text.contains("10.0 mg/cm² Fe + 20.0 mg/cm² C"));
    assert!(text.contains("Fe K edge at"));
    assert!(text.contains("Abs Max. is"));
    assert!(text.contains("Abs Min. is"));
    assert!(text.contains("Abs edge jump is"));
}

#[test]
fn calc_json_with_window_and_curves() {
    let output = xascalc(&[
        "calc", "-e", "Fe", "-c", "Fe:0.01", "--window", "7062", "7162", "--json", "--curves",
    ]);
    assert!(output.status.success());
    let parsed: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(parsed["element"], "Fe");
    assert_eq!(parsed["edge"], "K");
    let jump = parsed["edge_jump"].as_f64().unwrap();
    let max = parsed["abs_max"].as_f64().unwrap();
    let min = parsed["abs_min"].as_f64().unwrap();
    assert!(jump > 0.0);
    assert!((jump - (max - min)).abs() < 1e-12);
    assert_eq!(parsed["curves"]["energy_ev"].as_array().unwrap().len(), 1000);
}

#[test]
fn calc_writes_spectrum_file() {
    let temp = TempDir::new().expect("tempdir should be created");
    let path = temp.path().join("spectrum.tsv");
    let output = xascalc(&[
        "calc",
        "-e",
        "Cu",
        "-c",
        "Cu:0.005",
        "-o",
        path.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let contents = fs::read_to_string(&path).unwrap();
    let mut lines = contents.lines();
    assert_eq!(lines.next(), Some("# energy_ev\tabsorption\ttransmission_percent"));
    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len(), 1000);
    assert_eq!(rows[0].split('\t').count(), 3);
}

#[test]
fn calc_rejects_invalid_edge() {
    let output = xascalc(&["calc", "-e", "Fe", "--edge", "L4", "-c", "Fe:0.01"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid edge 'L4'"));
}

#[test]
fn calc_rejects_unknown_element() {
    let output = xascalc(&["calc", "-e", "Xx", "-c", "Fe:0.01"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown element: Xx"));
}

#[test]
fn calc_requires_a_compound() {
    let output = xascalc(&["calc", "-e", "Fe"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn batch_reports_errors_per_edge() {
    let temp = TempDir::new().expect("tempdir should be created");
    let request_path = temp.path().join("request.json");
    fs::write(
        &request_path,
        r#"{
            "compounds": [{"compound": "Fe2O3", "area_density": 0.005}],
            "edges": [
                {"element": "Fe", "edge_type": "K"},
                {"element": "Fe", "edge_type": "M5"},
                {"element": "O", "edge_type": "K"}
            ]
        }"#,
    )
    .unwrap();

    let output = xascalc(&["batch", request_path.to_str().unwrap()]);
    assert!(output.status.success());
    let parsed: Value = serde_json::from_str(&stdout(&output)).unwrap();
    let results = parsed["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert!(results[0]["edge_value"].is_number());
    assert!(results[1]["error"].as_str().unwrap().contains("M5"));
    assert!(results[2]["edge_value"].is_number());
}

#[test]
fn batch_rejects_malformed_request() {
    let temp = TempDir::new().expect("tempdir should be created");
    let request_path = temp.path().join("request.json");
    fs::write(&request_path, "{not json").unwrap();

    let output = xascalc(&["batch", request_path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid request JSON"));
}

#[test]
fn elements_lists_symbols() {
    let output = xascalc(&["elements", "--json"]);
    assert!(output.status.success());
    let parsed: Value = serde_json::from_str(&stdout(&output)).unwrap();
    let elements = parsed.as_array().unwrap();
    assert_eq!(elements.len(), 100);
    assert_eq!(elements[25]["symbol"], "Fe");
    assert_eq!(elements[25]["atomic_number"], 26);
}
