use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::composition::CompoundContribution;
use crate::constants::{EV_PER_KEV, PERCENT};
use crate::edge::EdgeKind;
use crate::error::{ProviderError, Result, XasCalcError};
use crate::grid::{EnergyWindow, energy_grid_ev, energy_grid_kev, min_max_in_window};
use crate::provider::XrayDataProvider;

/// Extremes of the total absorption inside an energy window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeJumpSummary {
    pub abs_min: f64,
    pub abs_max: f64,
    pub edge_jump: f64,
}

impl fmt::Display for EdgeJumpSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Abs Max. is {:.3}", self.abs_max)?;
        writeln!(f, "Abs Min. is {:.3}", self.abs_min)?;
        write!(f, "Abs edge jump is {:.3}", self.edge_jump)
    }
}

#[derive(Debug, Clone)]
struct Spectrum {
    total_absorption: Vec<f64>,
    transmitted_percentage: Vec<f64>,
}

/// Absorption of a layered sample on a 1 eV grid around one absorption edge.
///
/// The grid and edge energy are fixed at construction. [`compute`](Self::compute)
/// fills in the absorption and transmission curves and the edge-jump
/// summary; [`edge_jump`](Self::edge_jump) re-evaluates the summary over
/// another window.
pub struct AbsorptionModel<P> {
    provider: P,
    contributions: Vec<CompoundContribution>,
    element: String,
    edge_kind: EdgeKind,
    edge_energy_ev: f64,
    energy_grid_ev: Vec<f64>,
    energy_grid_kev: Vec<f64>,
    spectrum: Option<Spectrum>,
    summary: Option<EdgeJumpSummary>,
}

impl<P: XrayDataProvider> AbsorptionModel<P> {
    /// Resolves the edge energy and builds the energy grid.
    ///
    /// `contributions` may be empty here; [`compute`](Self::compute) rejects
    /// an empty composition.
    pub fn new(
        provider: P,
        contributions: Vec<CompoundContribution>,
        element: &str,
        edge: &str,
    ) -> Result<Self> {
        let z = provider
            .atomic_number(element)
            .map_err(|_| XasCalcError::UnknownElement(element.to_string()))?;
        let edge_kind: EdgeKind = edge.parse()?;

        let unavailable = || XasCalcError::EdgeEnergyUnavailable {
            element: element.to_string(),
            edge: edge_kind.to_string(),
        };
        let edge_energy_ev = provider.edge_energy(z, edge_kind).map_err(|_| unavailable())?
            * EV_PER_KEV;
        if !edge_energy_ev.is_finite() || edge_energy_ev <= 0.0 {
            return Err(unavailable());
        }

        for c in &contributions {
            c.validate()?;
        }

        let energy_grid_ev = energy_grid_ev(edge_energy_ev);
        let energy_grid_kev = energy_grid_kev(edge_energy_ev);
        debug!(
            element,
            edge = %edge_kind,
            edge_energy_ev,
            points = energy_grid_ev.len(),
            "built energy grid"
        );

        Ok(AbsorptionModel {
            provider,
            contributions,
            element: element.to_string(),
            edge_kind,
            edge_energy_ev,
            energy_grid_ev,
            energy_grid_kev,
            spectrum: None,
            summary: None,
        })
    }

    /// Sums the absorption of every compound over the grid.
    ///
    /// On success the transmission curve and the edge-jump summary over
    /// edge ± 50 eV are updated too. A provider failure leaves the model
    /// exactly as it was before the call.
    pub fn compute(&mut self) -> Result<&[f64]> {
        if self.contributions.is_empty() {
            return Err(XasCalcError::EmptyComposition);
        }

        let n = self.energy_grid_kev.len();
        let mut total_absorption = vec![0.0_f64; n];
        let mut per_compound = Vec::with_capacity(self.contributions.len());

        for c in &self.contributions {
            let failed = |source: ProviderError| XasCalcError::CompositionCalculation {
                formula: c.formula.clone(),
                source,
            };
            let cross_sections = self
                .provider
                .total_cross_sections(&c.formula, &self.energy_grid_kev)
                .map_err(|e| failed(e.into()))?;
            if cross_sections.len() != n {
                return Err(failed(
                    format!(
                        "provider returned {} values for {n} energies",
                        cross_sections.len()
                    )
                    .into(),
                ));
            }

            let absorption: Vec<f64> = cross_sections
                .iter()
                .map(|cs| cs * c.area_density)
                .collect();
            for (total, a) in total_absorption.iter_mut().zip(&absorption) {
                *total += a;
            }
            debug!(formula = %c.formula, area_density = c.area_density, "added compound absorption");
            per_compound.push(absorption);
        }

        for (c, absorption) in self.contributions.iter_mut().zip(per_compound) {
            c.set_computed_absorption(absorption);
        }

        let transmitted_percentage = total_absorption
            .iter()
            .map(|a| (-a).exp() * PERCENT)
            .collect();
        self.summary = Some(summarize(
            &self.energy_grid_ev,
            &total_absorption,
            &EnergyWindow::around_edge(self.edge_energy_ev),
        ));

        let spectrum = self.spectrum.insert(Spectrum {
            total_absorption,
            transmitted_percentage,
        });
        Ok(&spectrum.total_absorption)
    }

    /// Edge jump between `e1` and `e2` (eV, inclusive).
    ///
    /// Omitted bounds are open; omitting both uses the whole grid. A window
    /// that selects no grid point falls back to the whole grid. The stored
    /// summary is replaced, so snapshot [`summary`](Self::summary) first if
    /// the previous window's extremes are still needed.
    pub fn edge_jump(&mut self, e1: Option<f64>, e2: Option<f64>) -> Result<f64> {
        let spectrum = self.spectrum.as_ref().ok_or(XasCalcError::NotComputed)?;
        let summary = summarize(
            &self.energy_grid_ev,
            &spectrum.total_absorption,
            &EnergyWindow::new(e1, e2),
        );
        self.summary = Some(summary);
        Ok(summary.edge_jump)
    }

    /// Replaces the composition and drops every derived curve.
    pub fn set_contributions(&mut self, mut contributions: Vec<CompoundContribution>) -> Result<()> {
        for c in &mut contributions {
            c.validate()?;
            c.clear_computed_absorption();
        }
        self.contributions = contributions;
        self.spectrum = None;
        self.summary = None;
        Ok(())
    }
}

impl<P> AbsorptionModel<P> {
    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn contributions(&self) -> &[CompoundContribution] {
        &self.contributions
    }

    pub fn element(&self) -> &str {
        &self.element
    }

    pub fn edge_kind(&self) -> EdgeKind {
        self.edge_kind
    }

    pub fn edge_energy_ev(&self) -> f64 {
        self.edge_energy_ev
    }

    pub fn energy_grid_kev(&self) -> &[f64] {
        &self.energy_grid_kev
    }

    /// Grid energies in eV, exact on integer steps from the grid start.
    pub fn energies_ev(&self) -> &[f64] {
        &self.energy_grid_ev
    }

    /// Extremes and edge jump of the most recent window.
    pub fn summary(&self) -> Result<EdgeJumpSummary> {
        self.summary.ok_or(XasCalcError::NotComputed)
    }

    pub fn is_computed(&self) -> bool {
        self.spectrum.is_some()
    }

    pub fn total_absorption(&self) -> Option<&[f64]> {
        self.spectrum.as_ref().map(|s| s.total_absorption.as_slice())
    }

    /// `exp(-absorption) * 100` at every grid point.
    pub fn transmitted_percentage(&self) -> Option<&[f64]> {
        self.spectrum
            .as_ref()
            .map(|s| s.transmitted_percentage.as_slice())
    }

    /// `10.0 mg/cm² Fe + 5.0 mg/cm² C`
    pub fn composition_label(&self) -> String {
        self.contributions
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" + ")
    }
}

fn summarize(energies_ev: &[f64], absorption: &[f64], window: &EnergyWindow) -> EdgeJumpSummary {
    let (abs_min, abs_max) = match min_max_in_window(energies_ev, absorption, window) {
        Some(extremes) => extremes,
        None => {
            warn!(
                lower_ev = ?window.lower,
                upper_ev = ?window.upper,
                "energy window selects no grid points, using the full grid"
            );
            min_max_in_window(energies_ev, absorption, &EnergyWindow::full()).unwrap_or_default()
        }
    };
    EdgeJumpSummary {
        abs_min,
        abs_max,
        edge_jump: abs_max - abs_min,
    }
}
