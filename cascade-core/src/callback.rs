//! Subscriber fan-out.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cascade_types::{Response, ResponseError, SourceType};

/// Receives the outcome of source calls.
pub trait Subscriber<T>: Send + Sync {
    /// A source produced a response.
    fn on_success(&self, response: &Response<T>);

    /// A source failed.
    fn on_failure(&self, error: &ResponseError);

    /// A source answered with nothing for the requested params.
    fn on_empty(&self, source_type: SourceType) {
        let _ = source_type;
    }
}

/// An ordered set of subscribers notified together.
///
/// Membership is by `Arc` identity: registering the same subscriber twice is a
/// no-op, as is deregistering one that is not present. Broadcasts iterate over
/// a snapshot taken under the lock and invoke subscribers after releasing it,
/// so a subscriber may register or deregister (itself included) from inside
/// a callback.
pub struct CallbackGroup<T> {
    subscribers: Mutex<Vec<Arc<dyn Subscriber<T>>>>,
}

impl<T> Default for CallbackGroup<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for CallbackGroup<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackGroup")
            .field("len", &self.len())
            .finish()
    }
}

fn same<T>(a: &Arc<dyn Subscriber<T>>, b: &Arc<dyn Subscriber<T>>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

impl<T> CallbackGroup<T> {
    /// An empty group.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<dyn Subscriber<T>>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self) -> Vec<Arc<dyn Subscriber<T>>> {
        self.lock().clone()
    }

    /// Add `subscriber`; returns `false` if it was already present.
    pub fn register(&self, subscriber: Arc<dyn Subscriber<T>>) -> bool {
        let mut subs = self.lock();
        if subs.iter().any(|s| same(s, &subscriber)) {
            return false;
        }
        subs.push(subscriber);
        true
    }

    /// Remove `subscriber`; returns `false` if it was not present.
    pub fn deregister(&self, subscriber: &Arc<dyn Subscriber<T>>) -> bool {
        let mut subs = self.lock();
        let before = subs.len();
        subs.retain(|s| !same(s, subscriber));
        subs.len() != before
    }

    /// Remove every subscriber.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Whether any subscriber is registered.
    pub fn has_callbacks(&self) -> bool {
        !self.lock().is_empty()
    }

    /// Number of registered subscribers.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the group is empty.
    pub fn is_empty(&self) -> bool {
        !self.has_callbacks()
    }

    /// Deliver a success to every subscriber in registration order.
    pub fn broadcast_success(&self, response: &Response<T>) {
        for s in self.snapshot() {
            s.on_success(response);
        }
    }

    /// Deliver a failure to every subscriber in registration order.
    pub fn broadcast_failure(&self, error: &ResponseError) {
        for s in self.snapshot() {
            s.on_failure(error);
        }
    }

    /// Deliver an empty notification to every subscriber in registration order.
    pub fn broadcast_empty(&self, source_type: SourceType) {
        for s in self.snapshot() {
            s.on_empty(source_type);
        }
    }
}

impl<T> Subscriber<T> for CallbackGroup<T> {
    fn on_success(&self, response: &Response<T>) {
        self.broadcast_success(response);
    }

    fn on_failure(&self, error: &ResponseError) {
        self.broadcast_failure(error);
    }

    fn on_empty(&self, source_type: SourceType) {
        self.broadcast_empty(source_type);
    }
}

/// Subscriber built from a pair of closures.
pub struct FnSubscriber<S, F> {
    on_success: S,
    on_failure: F,
}

impl<T, S, F> Subscriber<T> for FnSubscriber<S, F>
where
    S: Fn(&Response<T>) + Send + Sync,
    F: Fn(&ResponseError) + Send + Sync,
{
    fn on_success(&self, response: &Response<T>) {
        (self.on_success)(response);
    }

    fn on_failure(&self, error: &ResponseError) {
        (self.on_failure)(error);
    }
}

/// Wrap two closures into a shareable subscriber.
pub fn subscriber_fn<T, S, F>(on_success: S, on_failure: F) -> Arc<dyn Subscriber<T>>
where
    T: 'static,
    S: Fn(&Response<T>) + Send + Sync + 'static,
    F: Fn(&ResponseError) + Send + Sync + 'static,
{
    Arc::new(FnSubscriber {
        on_success,
        on_failure,
    })
}
