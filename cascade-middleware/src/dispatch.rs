//! Invoke subscribers on a chosen executor.

use std::sync::Arc;

use cascade_core::{Payload, Subscriber};
use cascade_types::{Response, ResponseError, SourceType};
use tokio::runtime::Handle;

/// Subscriber decorator that re-posts every callback onto a runtime handle.
///
/// Use it when subscribers must run on a specific runtime (for example a
/// dedicated single-threaded runtime owning UI or actor state) instead of the
/// task that completed the source call. Payloads and errors are cloned into
/// the spawned task. Callbacks from one broadcast are spawned in order, but
/// their relative execution order is up to the target runtime.
pub struct DispatchSubscriber<T> {
    inner: Arc<dyn Subscriber<T>>,
    handle: Handle,
}

impl<T: Payload> DispatchSubscriber<T> {
    /// Dispatch callbacks for `inner` onto `handle`.
    pub fn new(inner: Arc<dyn Subscriber<T>>, handle: Handle) -> Arc<Self> {
        Arc::new(Self { inner, handle })
    }

    /// Dispatch onto the runtime the caller is currently running in.
    ///
    /// # Panics
    /// Panics when called outside of a Tokio runtime.
    pub fn on_current(inner: Arc<dyn Subscriber<T>>) -> Arc<Self> {
        Self::new(inner, Handle::current())
    }
}

impl<T: Payload> Subscriber<T> for DispatchSubscriber<T> {
    fn on_success(&self, response: &Response<T>) {
        let inner = Arc::clone(&self.inner);
        let response = response.clone();
        self.handle.spawn(async move { inner.on_success(&response) });
    }

    fn on_failure(&self, error: &ResponseError) {
        let inner = Arc::clone(&self.inner);
        let error = error.clone();
        self.handle.spawn(async move { inner.on_failure(&error) });
    }

    fn on_empty(&self, source_type: SourceType) {
        let inner = Arc::clone(&self.inner);
        self.handle.spawn(async move { inner.on_empty(source_type) });
    }
}
