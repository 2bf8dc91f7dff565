//! Addressing registered sources.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::SourceType;

/// Identifies one registered source inside a registry.
///
/// Type-keyed registries resolve [`SourceSelector::ByType`]; positional
/// registries resolve [`SourceSelector::Position`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceSelector {
    /// The source registered for this tier.
    ByType(SourceType),
    /// The source at this index in registration order.
    Position(usize),
}

impl SourceSelector {
    /// Selects the memory source.
    #[must_use]
    pub const fn memory() -> Self {
        Self::ByType(SourceType::Memory)
    }

    /// Selects the disk source.
    #[must_use]
    pub const fn disk() -> Self {
        Self::ByType(SourceType::Disk)
    }

    /// Selects the network source.
    #[must_use]
    pub const fn network() -> Self {
        Self::ByType(SourceType::Network)
    }

    /// Selects the source at `position`.
    #[must_use]
    pub const fn at(position: usize) -> Self {
        Self::Position(position)
    }
}

impl From<SourceType> for SourceSelector {
    fn from(t: SourceType) -> Self {
        Self::ByType(t)
    }
}

impl fmt::Display for SourceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ByType(t) => write!(f, "{t} source"),
            Self::Position(i) => write!(f, "source at position {i}"),
        }
    }
}
