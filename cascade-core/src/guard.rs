//! Busy and refresh gating around a single source.
//!
//! A [`GuardedSource`] is either idle or busy. A `get` arriving while busy is
//! ignored; a `get` arriving while idle consults the refresh strategy (unless
//! the params are forced) and, when accepted, marks the source busy until the
//! underlying call resolves. The busy flag is held by an RAII permit, so a
//! caller dropping the future mid-flight also returns the source to idle.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cascade_types::{RefreshPolicy, Response, ResponseError, SourceParams, SourceType};

use crate::refresh::{AlwaysRefresh, RefreshStrategy, strategy_for};
use crate::source::{Payload, Source};

/// Result of a gated `get`.
#[derive(Debug)]
pub enum FetchOutcome<T> {
    /// The underlying source was invoked and resolved.
    Completed(Result<Response<T>, ResponseError>),
    /// Ignored: a previous `get` is still in flight.
    Busy,
    /// Ignored: the refresh strategy declined.
    RefreshSkipped,
}

impl<T> FetchOutcome<T> {
    /// True when the underlying source was invoked.
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Short label for logs.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Completed(Ok(_)) => "succeeded",
            Self::Completed(Err(_)) => "failed",
            Self::Busy => "busy",
            Self::RefreshSkipped => "refresh skipped",
        }
    }

    /// The resolved result, if the underlying source was invoked.
    pub fn into_result(self) -> Option<Result<Response<T>, ResponseError>> {
        match self {
            Self::Completed(r) => Some(r),
            Self::Busy | Self::RefreshSkipped => None,
        }
    }
}

#[derive(Debug)]
struct Gate {
    busy: bool,
    strategy: Box<dyn RefreshStrategy>,
}

/// Returns the gate to idle when dropped.
struct BusyPermit<'a> {
    gate: &'a Mutex<Gate>,
}

impl Drop for BusyPermit<'_> {
    fn drop(&mut self) {
        self.gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .busy = false;
    }
}

/// A source wrapped with a single-flight busy gate and a refresh strategy.
pub struct GuardedSource<T: Payload> {
    inner: Arc<dyn Source<T>>,
    gate: Mutex<Gate>,
    default_params: SourceParams,
}

impl<T: Payload> fmt::Debug for GuardedSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardedSource")
            .field("name", &self.inner.name())
            .field("source_type", &self.inner.source_type())
            .field("busy", &self.is_busy())
            .finish_non_exhaustive()
    }
}

impl<T: Payload> GuardedSource<T> {
    /// Guard `inner` with an always-refresh strategy and default params.
    pub fn new(inner: Arc<dyn Source<T>>) -> Self {
        Self::builder(inner).build()
    }

    /// Start configuring a guard around `inner`.
    pub fn builder(inner: Arc<dyn Source<T>>) -> GuardedSourceBuilder<T> {
        GuardedSourceBuilder {
            inner,
            strategy: Box::new(AlwaysRefresh),
            default_params: SourceParams::default(),
        }
    }

    fn lock_gate(&self) -> MutexGuard<'_, Gate> {
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn try_acquire(&self, params: &SourceParams) -> Result<BusyPermit<'_>, FetchOutcome<T>> {
        let mut gate = self.lock_gate();
        if gate.busy {
            return Err(FetchOutcome::Busy);
        }
        let due = gate.strategy.should_refresh();
        if !due && !params.is_forced() {
            return Err(FetchOutcome::RefreshSkipped);
        }
        gate.busy = true;
        Ok(BusyPermit { gate: &self.gate })
    }

    /// Params without an index or payload fall back to the configured defaults.
    fn resolve_params(&self, params: &SourceParams) -> SourceParams {
        if params.index() == SourceParams::ALL && params.shared_payload().is_none() {
            self.default_params.clone().with_force(params.is_forced())
        } else {
            params.clone()
        }
    }

    /// Gated fetch.
    ///
    /// Returns [`FetchOutcome::Busy`] without touching the strategy when a
    /// previous call is in flight, and [`FetchOutcome::RefreshSkipped`] when the
    /// strategy declines and `params` are not forced. Otherwise invokes the
    /// underlying source and returns to idle before yielding its result.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "cascade_core::guard::get",
            skip(self, params),
            fields(
                source = self.inner.name(),
                source_type = %self.inner.source_type(),
                force = params.is_forced(),
            ),
        )
    )]
    pub async fn get(&self, params: &SourceParams) -> FetchOutcome<T> {
        let permit = match self.try_acquire(params) {
            Ok(permit) => permit,
            Err(gated) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(outcome = gated.label(), "get ignored by gate");
                return gated;
            }
        };

        let params = self.resolve_params(params);
        let result = self.inner.get(&params).await;
        if let Err(err) = &result
            && !err.is_empty()
        {
            self.lock_gate().strategy.on_refresh_failed();
        }
        drop(permit);
        FetchOutcome::Completed(result)
    }

    /// Store a response in the underlying source unless it came from this tier.
    pub async fn store(&self, response: &Response<T>) {
        if response.origin_type() == self.inner.source_type() {
            #[cfg(feature = "tracing")]
            tracing::trace!(
                source = self.inner.name(),
                origin = %response.origin_type(),
                "store skipped for same-tier response"
            );
            return;
        }
        self.inner.store(response).await;
    }

    /// Forward a cancel to the underlying source.
    ///
    /// The busy flag stays set until the pending call resolves or its future
    /// is dropped.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    /// Read stored data for `params` without fetching.
    pub fn peek(&self, params: &SourceParams) -> Option<T> {
        self.inner.peek(&self.resolve_params(params))
    }

    /// Whether data is stored for `params`.
    pub fn has_data(&self, params: &SourceParams) -> bool {
        self.inner.has_data(&self.resolve_params(params))
    }

    /// Whether data is stored for the default params.
    pub fn has_stored_data(&self) -> bool {
        self.inner.has_data(&self.default_params)
    }

    /// Drop stored data for `params`.
    pub fn clear(&self, params: &SourceParams) {
        self.inner.clear(&self.resolve_params(params));
    }

    /// Whether a `get` is in flight.
    pub fn is_busy(&self) -> bool {
        self.lock_gate().busy
    }

    /// Reset the refresh strategy so the next idle `get` fetches.
    pub fn force_refresh(&self) {
        self.lock_gate().strategy.reset();
    }

    /// The tier of the underlying source.
    pub fn source_type(&self) -> SourceType {
        self.inner.source_type()
    }

    /// Name of the underlying source.
    pub fn name(&self) -> &'static str {
        self.inner.name()
    }

    /// The wrapped source.
    pub const fn inner(&self) -> &Arc<dyn Source<T>> {
        &self.inner
    }

    /// Params used when a call arrives with default params.
    pub const fn default_params(&self) -> &SourceParams {
        &self.default_params
    }
}

/// Builder for [`GuardedSource`].
pub struct GuardedSourceBuilder<T: Payload> {
    inner: Arc<dyn Source<T>>,
    strategy: Box<dyn RefreshStrategy>,
    default_params: SourceParams,
}

impl<T: Payload> GuardedSourceBuilder<T> {
    /// Use a custom refresh strategy.
    #[must_use]
    pub fn refresh_strategy(mut self, strategy: Box<dyn RefreshStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Use the strategy described by `policy`.
    #[must_use]
    pub fn refresh_policy(self, policy: RefreshPolicy) -> Self {
        self.refresh_strategy(strategy_for(policy))
    }

    /// Params substituted whenever a call arrives with default params.
    #[must_use]
    pub fn default_params(mut self, params: SourceParams) -> Self {
        self.default_params = params;
        self
    }

    /// Finish.
    pub fn build(self) -> GuardedSource<T> {
        GuardedSource {
            inner: self.inner,
            gate: Mutex::new(Gate {
                busy: false,
                strategy: self.strategy,
            }),
            default_params: self.default_params,
        }
    }
}
