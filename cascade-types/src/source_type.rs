//! Source tier identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The tier a source belongs to.
///
/// Variants are ordered by lookup cost, cheapest first. Registries keyed by
/// type iterate in this order, so a request walks memory, then disk, then
/// network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// In-process cache.
    Memory,
    /// Local persistent storage (files, databases, preference stores).
    Disk,
    /// Remote service.
    Network,
}

impl SourceType {
    /// All tiers in iteration order.
    pub const ALL: [Self; 3] = [Self::Memory, Self::Disk, Self::Network];

    /// Lower-case label used in logs and layer configs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Disk => "disk",
            Self::Network => "network",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SourceType {
    type Err = crate::CascadeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "disk" => Ok(Self::Disk),
            "network" => Ok(Self::Network),
            other => Err(crate::CascadeError::InvalidArg(format!(
                "unknown source type: {other}"
            ))),
        }
    }
}
