//! Cascade orchestrates one logical resource across several backing sources.
//!
//! Overview
//! - Sources implement the `cascade_core` contracts and are grouped by tier:
//!   memory, disk, network.
//! - Every source sits behind a `GuardedSource`: one fetch in flight at a time and
//!   a refresh strategy deciding whether an idle `get` goes through.
//! - A `Controller` builds requests over its sources; a chaining predicate
//!   decides, pair by pair, which of them are queried.
//! - Successes are stored into every other tier before subscribers hear about them.
//!
//! Key behaviors and trade-offs
//! - Refresh policy:
//!   - `Always`: every idle call fetches; freshest data, most traffic.
//!   - `OneShot`: fetch once until re-armed; suits immutable resources.
//!   - `TimeBased`: fetch when the interval has elapsed; a failed refresh is retried
//!     on the next call rather than waiting out the interval.
//! - Chaining:
//!   - `AlwaysContinue`: every tier is queried concurrently; callers see the cached
//!     value first and the network value when it lands.
//!   - `SkipIfPreviousHasData`: stop at the first tier holding data; economical but
//!     never refreshes behind a warm cache unless forced.
//! - Cascading: a response is never stored back into the tier it came from, so a
//!   memory hit does not rewrite memory while disk still gets a copy.
//! - Cancellation is advisory: `cancel()` asks sources to stop, but results that
//!   still arrive are delivered normally.
//!
//! Examples
//! Building a controller over three tiers:
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use cascade::{ChainPolicy, Controller, MemorySource, RefreshPolicy};
//!
//! let controller = Controller::<Profile>::builder()
//!     .with_source(Arc::new(MemorySource::new()))
//!     .with_source(disk.clone())
//!     .with_refresh_policy(RefreshPolicy::TimeBased { interval: Duration::from_secs(60) })
//!     .with_source(network.clone())
//!     .chain_policy(ChainPolicy::SkipIfPreviousHasData)
//!     .source_timeout(Duration::from_secs(5))
//!     .build()?;
//! ```
//!
//! Running a request with a request-scoped subscriber and an error filter:
//! ```rust,ignore
//! let report = controller
//!     .request()
//!     .subscribe(screen.clone())
//!     .error_filter(|e: ResponseError| e.with_user_message("Could not load profile"))
//!     .execute()
//!     .await;
//! assert_eq!(report.status_of(SourceType::Memory), Some(LegStatus::Succeeded));
//! ```
//!
//! Composing sources:
//! ```rust,ignore
//! use cascade::compose::Compose;
//!
//! let source = Compose::new(token)
//!     .chain(profile)
//!     .converter(|t: &Token, _: &SourceParams| SourceParams::new().with_payload(t.clone()))
//!     .into_source(SourceType::Network);
//! ```
//!
//! See `cascade/examples/` for runnable end-to-end demonstrations.
#![warn(missing_docs)]

pub(crate) mod core;

/// Chaining predicates.
pub mod chainer;
/// Chain, merge, and parallel compositions.
pub mod compose;
/// Source registries.
pub mod registry;
/// Request building and execution.
pub mod request;

pub use crate::chainer::{AlwaysContinue, SkipIfPreviousHasData, SourceChainer, chainer_for};
pub use crate::compose::{CallerSource, Chain, Compose, Merge, Parallel};
pub use crate::core::{Controller, ControllerBuilder};
pub use crate::registry::{PositionalRegistry, SourceRegistry, TypedRegistry};
pub use crate::request::{ExecutionReport, LegReport, LegStatus, Request, RequestBuilder};

pub use cascade_middleware::{
    DispatchSubscriber, FnMapper, Mapper, MappingSource, SourceBuilder, TimeoutSource,
};

// Re-export core types for convenience
pub use cascade_core::{
    AlwaysRefresh, CallbackGroup, CascadeError, ChainPolicy, ControllerConfig, ErrorFilter,
    ErrorKind, Fetch, FetchOutcome, GuardedSource, GuardedSourceBuilder, LayerSpec, LayerStack,
    MemorySource, OneShotRefresh, ParallelParams, Payload, RefreshPolicy, RefreshStrategy,
    RegistryKind, Response, ResponseError, Source, SourceParams, SourceSelector, SourceType,
    Subscriber, TimeBasedRefresh, subscriber_fn,
};
