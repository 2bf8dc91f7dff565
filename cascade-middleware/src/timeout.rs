//! Deadline wrapper for sources.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cascade_core::{Fetch, Layer, Payload, Source};
use cascade_types::{Response, ResponseError, SourceParams, SourceType};

/// Wrapper that bounds every `get` of the inner source.
///
/// When the deadline expires the inner source is cancelled and the call fails
/// with [`ErrorKind::TimedOut`](cascade_types::ErrorKind::TimedOut). Everything
/// else is forwarded untouched.
pub struct TimeoutSource<T> {
    inner: Arc<dyn Source<T>>,
    timeout: Duration,
}

impl<T: Payload> TimeoutSource<T> {
    /// Wrap `inner` with a per-call deadline.
    pub fn new(inner: Arc<dyn Source<T>>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// Access the inner source.
    pub const fn inner(&self) -> &Arc<dyn Source<T>> {
        &self.inner
    }

    /// The configured deadline.
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl<T: Payload> Fetch<T> for TimeoutSource<T> {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "cascade_middleware::timeout::get",
            skip(self, params),
            fields(
                source = self.inner.name(),
                timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            ),
        )
    )]
    async fn get(&self, params: &SourceParams) -> Result<Response<T>, ResponseError> {
        if let Ok(result) = tokio::time::timeout(self.timeout, self.inner.get(params)).await {
            result
        } else {
            #[cfg(feature = "tracing")]
            tracing::warn!(source = self.inner.name(), "source call timed out");
            self.inner.cancel();
            Err(ResponseError::timed_out(
                self.inner.source_type(),
                self.timeout,
            ))
        }
    }

    fn cancel(&self) {
        self.inner.cancel();
    }
}

#[async_trait]
impl<T: Payload> Source<T> for TimeoutSource<T> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn source_type(&self) -> SourceType {
        self.inner.source_type()
    }

    async fn store(&self, response: &Response<T>) {
        self.inner.store(response).await;
    }

    fn peek(&self, params: &SourceParams) -> Option<T> {
        self.inner.peek(params)
    }

    fn has_data(&self, params: &SourceParams) -> bool {
        self.inner.has_data(params)
    }

    fn clear(&self, params: &SourceParams) {
        self.inner.clear(params);
    }
}

/// Layer that wraps sources in a [`TimeoutSource`].
#[derive(Debug, Clone, Copy)]
pub struct TimeoutLayer {
    timeout: Duration,
}

impl TimeoutLayer {
    /// Layer name used in stacks.
    pub const NAME: &'static str = "TimeoutSource";

    /// A layer applying `timeout` to every call.
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Rebuild from the JSON produced by [`Layer::config_json`].
    ///
    /// Returns `None` when `timeout_ms` is missing or not an integer.
    #[must_use]
    pub fn from_config(config: &serde_json::Value) -> Option<Self> {
        config
            .get("timeout_ms")
            .and_then(serde_json::Value::as_u64)
            .map(|ms| Self::new(Duration::from_millis(ms)))
    }
}

impl<T: Payload> Layer<T> for TimeoutLayer {
    fn apply(self: Box<Self>, inner: Arc<dyn Source<T>>) -> Arc<dyn Source<T>> {
        Arc::new(TimeoutSource::new(inner, self.timeout))
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn config_json(&self) -> serde_json::Value {
        serde_json::json!({
            "timeout_ms": u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
        })
    }
}
