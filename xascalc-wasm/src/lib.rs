//! WASM bindings for xascalc.
//!
//! Build with:
//! ```sh
//! wasm-pack build -p xascalc-wasm
//! ```

use wasm_bindgen::prelude::*;

use xascalc::xraydb::XrayDb;
use xascalc::{AbsorptionModel, BatchRequest, CompoundContribution, XasCalcError, run_batch};

fn to_js(e: XasCalcError) -> JsError {
    JsError::new(&e.to_string())
}

fn to_object(json: &str) -> Result<JsValue, JsError> {
    js_sys::JSON::parse(json).map_err(|_| JsError::new("failed to build result object"))
}

// ── Batch ──

/// Runs every edge of a request and returns `{results: [...]}`.
///
/// The request has the shape
/// `{compounds: [{compound, area_density}], edges: [{element, edge_type}]}`.
/// Failed edges carry an `error` string instead of values.
#[wasm_bindgen]
pub fn calculate(request_json: &str, include_curves: bool) -> Result<JsValue, JsError> {
    let request: BatchRequest = serde_json::from_str(request_json)
        .map_err(|e| JsError::new(&format!("invalid request: {e}")))?;
    let response = run_batch(&XrayDb::new(), &request, include_curves);
    let json = serde_json::to_string(&response).map_err(|e| JsError::new(&e.to_string()))?;
    to_object(&json)
}

// ── Single model ──

/// Edge energy (eV) the absorption grid is centred on.
#[wasm_bindgen]
pub fn edge_energy(element: &str, edge: &str) -> Result<f64, JsError> {
    AbsorptionModel::new(XrayDb::new(), vec![], element, edge)
        .map(|model| model.edge_energy_ev())
        .map_err(to_js)
}

/// Total absorption on the 1 eV grid for parallel `formulas` and
/// `area_densities` (g/cm²).
#[wasm_bindgen]
pub fn total_absorption(
    formulas: Vec<String>,
    area_densities: &[f64],
    element: &str,
    edge: &str,
) -> Result<Vec<f64>, JsError> {
    if formulas.len() != area_densities.len() {
        return Err(JsError::new(&format!(
            "{} formulas but {} area densities",
            formulas.len(),
            area_densities.len()
        )));
    }
    let contributions = formulas
        .into_iter()
        .zip(area_densities)
        .map(|(formula, &density)| CompoundContribution::new(formula, density))
        .collect();
    let mut model =
        AbsorptionModel::new(XrayDb::new(), contributions, element, edge).map_err(to_js)?;
    model.compute().map(<[f64]>::to_vec).map_err(to_js)
}

/// Grid energies (eV) for an element and edge.
#[wasm_bindgen]
pub fn energy_grid(element: &str, edge: &str) -> Result<Vec<f64>, JsError> {
    AbsorptionModel::new(XrayDb::new(), vec![], element, edge)
        .map(|model| model.energies_ev().to_vec())
        .map_err(to_js)
}
