use thiserror::Error;

/// Boxed provider failure carried by [`XasCalcError::CompositionCalculation`].
pub type ProviderError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum XasCalcError {
    #[error("invalid edge '{0}': choose from K, L1, L2 or L3")]
    InvalidEdge(String),
    #[error("unknown element: {0}")]
    UnknownElement(String),
    #[error("no edge energy available for {element} {edge}")]
    EdgeEnergyUnavailable { element: String, edge: String },
    #[error("no compounds provided")]
    EmptyComposition,
    #[error("absorption calculation failed for '{formula}': {source}")]
    CompositionCalculation {
        formula: String,
        #[source]
        source: ProviderError,
    },
    #[error("absorption has not been computed yet")]
    NotComputed,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, XasCalcError>;
