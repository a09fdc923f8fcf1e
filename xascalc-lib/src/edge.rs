use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::XasCalcError;

/// Absorption edges the model can be centred on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    K,
    L1,
    L2,
    L3,
}

impl EdgeKind {
    pub const ALL: [EdgeKind; 4] = [EdgeKind::K, EdgeKind::L1, EdgeKind::L2, EdgeKind::L3];

    /// IUPAC label, as used by the edge tables.
    pub fn label(self) -> &'static str {
        match self {
            Self::K => "K",
            Self::L1 => "L1",
            Self::L2 => "L2",
            Self::L3 => "L3",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EdgeKind {
    type Err = XasCalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "K" => Ok(Self::K),
            "L1" => Ok(Self::L1),
            "L2" => Ok(Self::L2),
            "L3" => Ok(Self::L3),
            other => Err(XasCalcError::InvalidEdge(other.to_string())),
        }
    }
}
