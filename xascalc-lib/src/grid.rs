use crate::constants::{
    EDGE_JUMP_HALF_WIDTH_EV, EV_PER_KEV, GRID_FLOOR_EV, GRID_HALF_WIDTH_EV, GRID_STEP_EV,
};

/// Builds the energy grid (eV) around an edge energy given in eV.
///
/// The grid starts at `max(100, edge - 500)` eV and steps by 1 eV up to,
/// but excluding, `edge + 500` eV. The point count is taken from the
/// ceilings of both bounds so rounding noise in the edge energy cannot add
/// a stray point.
pub fn energy_grid_ev(edge_energy_ev: f64) -> Vec<f64> {
    let start = GRID_FLOOR_EV.max(edge_energy_ev - GRID_HALF_WIDTH_EV);
    let stop = edge_energy_ev + GRID_HALF_WIDTH_EV;
    let count = (stop.ceil() - start.ceil()) / GRID_STEP_EV;
    if count.is_nan() || count <= 0.0 {
        return Vec::new();
    }
    (0..count as usize)
        .map(|i| start + i as f64 * GRID_STEP_EV)
        .collect()
}

/// Same grid as [`energy_grid_ev`], in keV.
///
/// Converting back with `* 1000` is not exact; match windows against
/// [`energy_grid_ev`].
pub fn energy_grid_kev(edge_energy_ev: f64) -> Vec<f64> {
    energy_grid_ev(edge_energy_ev)
        .into_iter()
        .map(|e| e / EV_PER_KEV)
        .collect()
}

/// Inclusive energy window in eV. Missing bounds are open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyWindow {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl EnergyWindow {
    pub fn new(lower: Option<f64>, upper: Option<f64>) -> Self {
        EnergyWindow { lower, upper }
    }

    /// Window selecting every grid point.
    pub fn full() -> Self {
        EnergyWindow::new(None, None)
    }

    /// Default edge-jump window: edge ± 50 eV, with the lower bound
    /// replaced by the grid floor when it would go negative.
    pub fn around_edge(edge_energy_ev: f64) -> Self {
        let mut lower = edge_energy_ev - EDGE_JUMP_HALF_WIDTH_EV;
        if lower < 0.0 {
            lower = GRID_FLOOR_EV;
        }
        EnergyWindow::new(Some(lower), Some(edge_energy_ev + EDGE_JUMP_HALF_WIDTH_EV))
    }

    pub fn is_full(&self) -> bool {
        self.lower.is_none() && self.upper.is_none()
    }

    pub fn contains(&self, energy_ev: f64) -> bool {
        self.lower.is_none_or(|lo| lo <= energy_ev) && self.upper.is_none_or(|hi| energy_ev <= hi)
    }
}

/// Min and max of `values` over grid points (eV) whose energy falls in
/// `window`.
///
/// Returns `None` when the window selects no points.
pub fn min_max_in_window(
    energies_ev: &[f64],
    values: &[f64],
    window: &EnergyWindow,
) -> Option<(f64, f64)> {
    energies_ev
        .iter()
        .zip(values)
        .filter(|(e, _)| window.contains(**e))
        .map(|(_, &v)| v)
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
