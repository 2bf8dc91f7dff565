//! Configuration types shared by the controller and the source builders.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// When a guarded source should actually go to its underlying source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum RefreshPolicy {
    /// Every non-busy call fetches.
    #[default]
    Always,
    /// Fetch once, then stay quiet until re-armed.
    OneShot,
    /// Fetch when nothing was fetched yet or `interval` has elapsed since the
    /// last accepted fetch.
    TimeBased {
        /// Minimum spacing between fetches.
        interval: Duration,
    },
}

/// Built-in predicates deciding whether a request moves on to the next source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ChainPolicy {
    /// Query every source.
    #[default]
    AlwaysContinue,
    /// Skip a source when its predecessor already holds stored data.
    SkipIfPreviousHasData,
}

/// Which registry implementation a controller uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum RegistryKind {
    /// At most one source per tier, iterated memory, disk, network.
    #[default]
    ByType,
    /// Any number of sources, iterated in registration order.
    Positional,
}

/// Global configuration for a controller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Registry implementation.
    pub registry: RegistryKind,
    /// Default chaining predicate for requests built by the controller.
    pub chain_policy: ChainPolicy,
    /// Refresh policy applied to sources registered without an explicit one.
    pub refresh_policy: RefreshPolicy,
    /// Optional per-call deadline applied to every registered source.
    pub source_timeout: Option<Duration>,
}
