//! cascade-core
//!
//! Contracts and per-source machinery shared across the cascade crates.
//!
//! - `source`: the `Fetch` caller contract and the `Source` capability contract.
//! - `refresh`: refresh strategies (always, one-shot, time-based).
//! - `guard`: `GuardedSource`, the busy/refresh gate around one source.
//! - `callback`: `Subscriber` and the ordered `CallbackGroup` fan-out.
//! - `filter`: `ErrorFilter` for rewriting failures before delivery.
//! - `middleware`: the `Layer` trait implemented by source decorators.
//! - `memory`: `MemorySource`, a single-slot in-memory source.
//!
//! Async runtime (Tokio)
//! ---------------------
//! The contracts are runtime-agnostic `async_trait` traits, but
//! `TimeBasedRefresh` reads `tokio::time::Instant`, so time-based gating (and
//! its tests) follow Tokio's clock, including a paused test clock.
//!
#![warn(missing_docs)]

/// Subscriber trait and ordered fan-out group.
pub mod callback;
/// Error filter applied before failures reach subscribers.
pub mod filter;
/// Busy/refresh gating around one source.
pub mod guard;
/// Built-in single-slot memory source.
pub mod memory;
/// Layer trait implemented by source decorators.
pub mod middleware;
/// Refresh strategies.
pub mod refresh;
/// Caller and source contracts.
pub mod source;

pub use callback::{CallbackGroup, FnSubscriber, Subscriber, subscriber_fn};
pub use filter::ErrorFilter;
pub use guard::{FetchOutcome, GuardedSource, GuardedSourceBuilder};
pub use memory::MemorySource;
pub use middleware::Layer;
pub use refresh::{AlwaysRefresh, OneShotRefresh, RefreshStrategy, TimeBasedRefresh, strategy_for};
pub use source::{Fetch, Payload, Source};

pub use cascade_types::{
    CascadeError, ChainPolicy, ControllerConfig, ErrorCause, ErrorKind, LayerSpec, LayerStack,
    ParallelParams, RefreshPolicy, RegistryKind, Response, ResponseError, ResponseErrorBuilder,
    SourceParams, SourceSelector, SourceType,
};
