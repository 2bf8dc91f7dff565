//! One execution against a set of guarded sources.

use std::fmt;
use std::sync::Arc;
use std::task::Poll;

use cascade_core::{
    CallbackGroup, ErrorFilter, FetchOutcome, GuardedSource, Payload, Subscriber,
};
use cascade_types::{Response, ResponseError, SourceParams, SourceType};
use futures::poll;
use futures::stream::{FuturesUnordered, StreamExt};

use crate::chainer::SourceChainer;
use crate::registry::SourceRegistry;

/// What happened to one source during [`Request::execute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegStatus {
    /// The source produced a response; it was cascaded and broadcast.
    Succeeded,
    /// The source failed; the (filtered) error was broadcast.
    Failed,
    /// The source had nothing for the params; `on_empty` was broadcast.
    Empty,
    /// Ignored: the source was already fetching.
    Busy,
    /// Ignored: the source's refresh strategy declined.
    RefreshSkipped,
    /// Never invoked: the chaining predicate rejected it.
    ChainSkipped,
}

impl LegStatus {
    /// Lower-case label for logs and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Empty => "empty",
            Self::Busy => "busy",
            Self::RefreshSkipped => "refresh_skipped",
            Self::ChainSkipped => "chain_skipped",
        }
    }

    /// Whether the underlying source was actually called.
    #[must_use]
    pub const fn was_invoked(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Empty)
    }
}

impl fmt::Display for LegStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one source within an execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegReport {
    /// Name of the source.
    pub name: &'static str,
    /// Tier of the source.
    pub source_type: SourceType,
    /// What happened.
    pub status: LegStatus,
}

/// Per-source summary of a [`Request::execute`] call, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    legs: Vec<LegReport>,
}

impl ExecutionReport {
    /// Every leg, in the order the request listed its sources.
    #[must_use]
    pub fn legs(&self) -> &[LegReport] {
        &self.legs
    }

    /// Statuses in source order.
    #[must_use]
    pub fn statuses(&self) -> Vec<LegStatus> {
        self.legs.iter().map(|l| l.status).collect()
    }

    /// Status of the first leg of tier `source_type`.
    #[must_use]
    pub fn status_of(&self, source_type: SourceType) -> Option<LegStatus> {
        self.legs
            .iter()
            .find(|l| l.source_type == source_type)
            .map(|l| l.status)
    }

    /// Status of the leg at `position`.
    #[must_use]
    pub fn status_at(&self, position: usize) -> Option<LegStatus> {
        self.legs.get(position).map(|l| l.status)
    }

    /// Number of legs that succeeded.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.count(LegStatus::Succeeded)
    }

    /// Number of legs that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(LegStatus::Failed)
    }

    /// Number of legs whose source was actually called.
    #[must_use]
    pub fn invoked(&self) -> usize {
        self.legs.iter().filter(|l| l.status.was_invoked()).count()
    }

    /// Whether the request had no sources at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    fn count(&self, status: LegStatus) -> usize {
        self.legs.iter().filter(|l| l.status == status).count()
    }
}

/// Builder for a [`Request`], obtained from a [`Controller`](crate::Controller).
pub struct RequestBuilder<T: Payload> {
    registry: Arc<dyn SourceRegistry<T>>,
    targets: Vec<Arc<GuardedSource<T>>>,
    params: SourceParams,
    chainer: Arc<dyn SourceChainer<T>>,
    error_filter: Option<Arc<dyn ErrorFilter>>,
    subscribers: CallbackGroup<T>,
    controller_subscribers: Arc<CallbackGroup<T>>,
}

impl<T: Payload> RequestBuilder<T> {
    pub(crate) fn new(
        registry: Arc<dyn SourceRegistry<T>>,
        targets: Vec<Arc<GuardedSource<T>>>,
        chainer: Arc<dyn SourceChainer<T>>,
        controller_subscribers: Arc<CallbackGroup<T>>,
    ) -> Self {
        Self {
            registry,
            targets,
            params: SourceParams::default(),
            chainer,
            error_filter: None,
            subscribers: CallbackGroup::new(),
            controller_subscribers,
        }
    }

    /// Params passed to every source of the request.
    #[must_use]
    pub fn params(mut self, params: SourceParams) -> Self {
        self.params = params;
        self
    }

    /// Rewrite failures before any subscriber sees them.
    ///
    /// The filter runs once per failing source; request-scoped and
    /// controller-wide subscribers receive the same filtered error.
    #[must_use]
    pub fn error_filter(mut self, filter: impl ErrorFilter + 'static) -> Self {
        self.error_filter = Some(Arc::new(filter));
        self
    }

    /// Add a subscriber that only hears about this request.
    ///
    /// Request-scoped subscribers are notified before the controller's.
    #[must_use]
    pub fn subscribe(self, subscriber: Arc<dyn Subscriber<T>>) -> Self {
        self.subscribers.register(subscriber);
        self
    }

    /// Append a source to the request, after the ones already targeted.
    ///
    /// The source does not need to be registered with the controller; it is
    /// queried like any other target but does not receive cascaded stores
    /// from other requests.
    #[must_use]
    pub fn target(mut self, source: Arc<GuardedSource<T>>) -> Self {
        self.targets.push(source);
        self
    }

    /// Override the controller's chaining predicate for this request.
    #[must_use]
    pub fn chainer(mut self, chainer: impl SourceChainer<T> + 'static) -> Self {
        self.chainer = Arc::new(chainer);
        self
    }

    /// Finish.
    #[must_use]
    pub fn build(self) -> Request<T> {
        Request {
            registry: self.registry,
            sources: self.targets,
            params: self.params,
            chainer: self.chainer,
            error_filter: self.error_filter,
            subscribers: self.subscribers,
            controller_subscribers: self.controller_subscribers,
        }
    }

    /// Build and execute in one step.
    pub async fn execute(self) -> ExecutionReport {
        self.build().execute().await
    }
}

/// A configured execution across an ordered list of sources.
pub struct Request<T: Payload> {
    registry: Arc<dyn SourceRegistry<T>>,
    sources: Vec<Arc<GuardedSource<T>>>,
    params: SourceParams,
    chainer: Arc<dyn SourceChainer<T>>,
    error_filter: Option<Arc<dyn ErrorFilter>>,
    subscribers: CallbackGroup<T>,
    controller_subscribers: Arc<CallbackGroup<T>>,
}

impl<T: Payload> fmt::Debug for Request<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("sources", &self.sources)
            .field("params", &self.params)
            .field("subscribers", &self.subscribers)
            .finish_non_exhaustive()
    }
}

impl<T: Payload> Request<T> {
    /// The sources this request will consider, in order.
    #[must_use]
    pub fn sources(&self) -> &[Arc<GuardedSource<T>>] {
        &self.sources
    }

    /// The params every source receives.
    #[must_use]
    pub const fn params(&self) -> &SourceParams {
        &self.params
    }

    /// Run the request.
    ///
    /// Behavior:
    /// - The first source is always invoked; every later source is invoked only
    ///   when the chaining predicate accepts it given its immediate predecessor.
    /// - Sources are launched in order. Each launched source is polled once
    ///   before the next pair is judged, so a source that answers inline has
    ///   already been cascaded when its successor's predicate runs.
    /// - Invoked sources run concurrently. Their completions are handled one at
    ///   a time as they arrive, in no particular cross-source order.
    /// - A success is stored into every other registered source (each skipping
    ///   responses from its own tier), then delivered to request-scoped and then
    ///   controller-wide subscribers.
    /// - An empty answer is delivered through `on_empty`; any other failure is
    ///   passed through the error filter and delivered through `on_failure`.
    ///   Failures are never cascaded.
    /// - Sources ignored by their busy or refresh gate produce no delivery.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "cascade::request::execute",
            skip(self),
            fields(sources = self.sources.len(), force = self.params.is_forced()),
        )
    )]
    pub async fn execute(self) -> ExecutionReport {
        let mut statuses = vec![LegStatus::ChainSkipped; self.sources.len()];
        let mut legs = FuturesUnordered::new();

        for (i, source) in self.sources.iter().enumerate() {
            if i > 0 && !self.chainer.should_query_next(&self.sources[i - 1], source) {
                #[cfg(feature = "tracing")]
                tracing::debug!(source = source.name(), position = i, "skipped by chainer");
                continue;
            }
            let params = &self.params;
            legs.push(async move { (i, source.get(params).await) });

            // First poll of the new leg; inline answers settle before the next pair is judged.
            while let Poll::Ready(Some((done, outcome))) = poll!(legs.next()) {
                statuses[done] = self.settle(done, outcome).await;
            }
        }

        while let Some((done, outcome)) = legs.next().await {
            statuses[done] = self.settle(done, outcome).await;
        }
        drop(legs);

        ExecutionReport {
            legs: self
                .sources
                .iter()
                .zip(statuses)
                .map(|(s, status)| LegReport {
                    name: s.name(),
                    source_type: s.source_type(),
                    status,
                })
                .collect(),
        }
    }

    async fn settle(&self, position: usize, outcome: FetchOutcome<T>) -> LegStatus {
        let source = &self.sources[position];
        let status = self.complete(source, outcome).await;
        #[cfg(feature = "tracing")]
        tracing::debug!(source = source.name(), status = status.as_str(), "leg completed");
        status
    }

    async fn complete(&self, source: &Arc<GuardedSource<T>>, outcome: FetchOutcome<T>) -> LegStatus {
        match outcome {
            FetchOutcome::Busy => LegStatus::Busy,
            FetchOutcome::RefreshSkipped => LegStatus::RefreshSkipped,
            FetchOutcome::Completed(Ok(response)) => {
                self.cascade(source, &response).await;
                self.subscribers.broadcast_success(&response);
                self.controller_subscribers.broadcast_success(&response);
                LegStatus::Succeeded
            }
            FetchOutcome::Completed(Err(error)) if error.is_empty() => {
                self.subscribers.broadcast_empty(source.source_type());
                self.controller_subscribers
                    .broadcast_empty(source.source_type());
                LegStatus::Empty
            }
            FetchOutcome::Completed(Err(error)) => {
                let error = self.filter(error);
                self.subscribers.broadcast_failure(&error);
                self.controller_subscribers.broadcast_failure(&error);
                LegStatus::Failed
            }
        }
    }

    fn filter(&self, error: ResponseError) -> ResponseError {
        match &self.error_filter {
            Some(f) => f.filter(error),
            None => error,
        }
    }

    /// Store `response` into every registered source except the one that produced it.
    async fn cascade(&self, origin: &Arc<GuardedSource<T>>, response: &Response<T>) {
        for target in self.registry.all() {
            if Arc::ptr_eq(&target, origin) {
                continue;
            }
            target.store(response).await;
        }
    }
}
