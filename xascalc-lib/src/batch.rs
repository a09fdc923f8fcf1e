//! Several edges of one sample in a single request.
//!
//! Each edge is computed independently: a bad element or edge label only
//! fails its own entry.

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::composition::CompoundContribution;
use crate::error::Result;
use crate::model::AbsorptionModel;
use crate::provider::XrayDataProvider;

/// Element and edge label of one requested edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeConfig {
    pub element: String,
    #[serde(rename = "edge_type")]
    pub edge: String,
}

impl EdgeConfig {
    pub fn new(element: impl Into<String>, edge: impl Into<String>) -> Self {
        EdgeConfig {
            element: element.into(),
            edge: edge.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub compounds: Vec<CompoundContribution>,
    #[serde(default)]
    pub edges: Vec<EdgeConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curves {
    pub energy_ev: Vec<f64>,
    pub absorption: Vec<f64>,
    pub transmission: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedEdge {
    /// Edge energy in eV.
    pub edge_value: f64,
    pub edge_jump: f64,
    pub abs_max: f64,
    pub abs_min: f64,
    pub composition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curves: Option<Curves>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EdgeOutcome {
    Computed(ComputedEdge),
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeResult {
    pub element: String,
    pub edge: String,
    #[serde(flatten)]
    pub outcome: EdgeOutcome,
}

impl EdgeResult {
    pub fn computed(&self) -> Option<&ComputedEdge> {
        match &self.outcome {
            EdgeOutcome::Computed(c) => Some(c),
            EdgeOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            EdgeOutcome::Computed(_) => None,
            EdgeOutcome::Failed { error } => Some(error),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub results: Vec<EdgeResult>,
}

impl ComputedEdge {
    /// Snapshot of a computed model's current summary.
    pub fn from_model<P>(model: &AbsorptionModel<P>, include_curves: bool) -> Result<Self> {
        let summary = model.summary()?;
        let curves = if include_curves {
            Some(Curves {
                energy_ev: model.energies_ev().to_vec(),
                absorption: model.total_absorption().unwrap_or_default().to_vec(),
                transmission: model.transmitted_percentage().unwrap_or_default().to_vec(),
            })
        } else {
            None
        };

        Ok(ComputedEdge {
            edge_value: model.edge_energy_ev(),
            edge_jump: summary.edge_jump,
            abs_max: summary.abs_max,
            abs_min: summary.abs_min,
            composition: model.composition_label(),
            curves,
        })
    }
}

/// Computes one model for the request's compounds around a single edge.
pub fn compute_edge<P: XrayDataProvider>(
    provider: &P,
    compounds: &[CompoundContribution],
    config: &EdgeConfig,
    include_curves: bool,
) -> Result<ComputedEdge> {
    let mut model = AbsorptionModel::new(
        provider,
        compounds.to_vec(),
        &config.element,
        &config.edge,
    )?;
    model.compute()?;
    ComputedEdge::from_model(&model, include_curves)
}

/// Runs every edge of `request`, collecting failures per entry.
pub fn run_batch<P: XrayDataProvider>(
    provider: &P,
    request: &BatchRequest,
    include_curves: bool,
) -> BatchResponse {
    info!(
        compounds = request.compounds.len(),
        edges = request.edges.len(),
        "running batch"
    );
    let results = request
        .edges
        .iter()
        .map(|config| {
            let outcome = match compute_edge(provider, &request.compounds, config, include_curves) {
                Ok(computed) => EdgeOutcome::Computed(computed),
                Err(e) => {
                    error!(
                        element = %config.element,
                        edge = %config.edge,
                        error = %e,
                        "edge calculation failed"
                    );
                    EdgeOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };
            EdgeResult {
                element: config.element.clone(),
                edge: config.edge.clone(),
                outcome,
            }
        })
        .collect();
    BatchResponse { results }
}
