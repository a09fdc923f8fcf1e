/// Half-width of the energy grid around the edge (eV).
pub const GRID_HALF_WIDTH_EV: f64 = 500.0;

/// Lowest energy the grid may start at (eV).
pub const GRID_FLOOR_EV: f64 = 100.0;

/// Grid spacing (eV).
pub const GRID_STEP_EV: f64 = 1.0;

/// Half-width of the window used for the default edge-jump summary (eV).
pub const EDGE_JUMP_HALF_WIDTH_EV: f64 = 50.0;

/// eV per keV
pub const EV_PER_KEV: f64 = 1000.0;

/// Transmitted fraction is reported in percent.
pub const PERCENT: f64 = 100.0;
