use serde::{Deserialize, Serialize};

use crate::error::LoopError;

/// How a system is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemCategory {
    /// Input-driven: receives player input, never updated by a timer.
    Active,
    /// Time-driven: updated from the high-frequency category timer.
    Passive,
    /// Both: receives input and is updated from the low-frequency timer.
    Hybrid,
}

impl SystemCategory {
    /// All categories in dispatch order.
    pub const ALL: [SystemCategory; 3] = [Self::Active, Self::Passive, Self::Hybrid];

    /// Lowercase name of the category.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Passive => "passive",
            Self::Hybrid => "hybrid",
        }
    }
}

impl std::fmt::Display for SystemCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SystemCategory {
    type Err = LoopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "passive" => Ok(Self::Passive),
            "hybrid" => Ok(Self::Hybrid),
            _ => Err(LoopError::UnknownCategory(s.to_string())),
        }
    }
}
