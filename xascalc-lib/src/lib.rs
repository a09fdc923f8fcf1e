pub mod batch;
pub mod composition;
pub mod constants;
pub mod edge;
pub mod error;
pub mod grid;
pub mod model;
pub mod provider;

pub use batch::{BatchRequest, BatchResponse, EdgeConfig, EdgeOutcome, EdgeResult, run_batch};
pub use composition::{CompoundContribution, compound_formula};
pub use edge::EdgeKind;
pub use error::{Result, XasCalcError};
pub use grid::EnergyWindow;
pub use model::{AbsorptionModel, EdgeJumpSummary};
pub use provider::{CachedProvider, XrayDataProvider};
#[cfg(feature = "xraydb")]
pub use xraydb;
