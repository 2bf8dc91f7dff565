//! The capability contract every backing source implements.

use std::sync::Arc;

use async_trait::async_trait;
use cascade_types::{Response, ResponseError, SourceParams, SourceType};

/// Bound shared by every payload type flowing through the orchestration layer.
///
/// Payloads are cloned when a response is cascaded into other tiers and when a
/// source hands out a peeked value.
pub trait Payload: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Payload for T {}

/// The caller contract: something that can be asked for a response and told to stop.
///
/// Plain sources and compositions (chain, merge, parallel) all implement it, so
/// compositions nest freely.
#[async_trait]
pub trait Fetch<T: Payload>: Send + Sync {
    /// Retrieve a response for `params`.
    ///
    /// The returned future resolves exactly once, either to the response or to
    /// the failure. Implementations may resolve immediately or after awaiting
    /// external work.
    async fn get(&self, params: &SourceParams) -> Result<Response<T>, ResponseError>;

    /// Best-effort abort of any in-flight `get`.
    ///
    /// Idempotent and safe to call while idle. Results that still arrive after
    /// a cancel are processed normally by callers.
    fn cancel(&self) {}
}

/// A backing source (memory cache, disk, network) for one logical resource.
#[async_trait]
pub trait Source<T: Payload>: Fetch<T> {
    /// Stable identifier used in logs and layer stacks.
    fn name(&self) -> &'static str {
        "source"
    }

    /// The tier this source belongs to.
    fn source_type(&self) -> SourceType;

    /// Persist a response that originated elsewhere.
    async fn store(&self, response: &Response<T>);

    /// Synchronously read what is stored for `params`, without fetching.
    fn peek(&self, params: &SourceParams) -> Option<T>;

    /// Whether anything is stored for `params`.
    fn has_data(&self, params: &SourceParams) -> bool {
        self.peek(params).is_some()
    }

    /// Drop whatever is stored for `params`.
    fn clear(&self, params: &SourceParams);
}

#[async_trait]
impl<T, F> Fetch<T> for Arc<F>
where
    T: Payload,
    F: Fetch<T> + ?Sized,
{
    async fn get(&self, params: &SourceParams) -> Result<Response<T>, ResponseError> {
        (**self).get(params).await
    }

    fn cancel(&self) {
        (**self).cancel();
    }
}

#[async_trait]
impl<T, S> Source<T> for Arc<S>
where
    T: Payload,
    S: Source<T> + ?Sized,
{
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn source_type(&self) -> SourceType {
        (**self).source_type()
    }

    async fn store(&self, response: &Response<T>) {
        (**self).store(response).await;
    }

    fn peek(&self, params: &SourceParams) -> Option<T> {
        (**self).peek(params)
    }

    fn has_data(&self, params: &SourceParams) -> bool {
        (**self).has_data(params)
    }

    fn clear(&self, params: &SourceParams) {
        (**self).clear(params);
    }
}
