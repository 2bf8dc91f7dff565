use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cascade_core::{ErrorKind, Payload, Response, ResponseError, SourceType, Subscriber};

/// One delivered callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<T> {
    /// `on_success` with the payload and its origin tier.
    Success(T, SourceType),
    /// `on_failure` with the error kind, failing tier, and user-facing message.
    Failure(ErrorKind, SourceType, String),
    /// `on_empty` for the given tier.
    Empty(SourceType),
}

/// A subscriber that records every callback in arrival order.
pub struct RecordingSubscriber<T> {
    events: Mutex<Vec<Event<T>>>,
}

impl<T: Payload> RecordingSubscriber<T> {
    /// A fresh recorder.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Event<T>>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Everything recorded so far.
    pub fn events(&self) -> Vec<Event<T>> {
        self.lock().clone()
    }

    /// Payloads of recorded successes, in order.
    pub fn successes(&self) -> Vec<T> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                Event::Success(v, _) => Some(v.clone()),
                _ => None,
            })
            .collect()
    }

    /// Recorded failures, in order.
    pub fn failures(&self) -> Vec<(ErrorKind, SourceType, String)> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                Event::Failure(k, s, m) => Some((*k, *s, m.clone())),
                _ => None,
            })
            .collect()
    }

    /// Number of recorded callbacks.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Forget everything recorded so far.
    pub fn reset(&self) {
        self.lock().clear();
    }

    /// This recorder as a shareable subscriber.
    #[must_use]
    pub fn as_subscriber(self: &Arc<Self>) -> Arc<dyn Subscriber<T>> {
        Arc::clone(self) as Arc<dyn Subscriber<T>>
    }
}

impl<T: Payload> Subscriber<T> for RecordingSubscriber<T> {
    fn on_success(&self, response: &Response<T>) {
        self.lock()
            .push(Event::Success(response.payload().clone(), response.origin_type()));
    }

    fn on_failure(&self, error: &ResponseError) {
        self.lock().push(Event::Failure(
            error.kind(),
            error.failed_source(),
            error.user_message().to_string(),
        ));
    }

    fn on_empty(&self, source_type: SourceType) {
        self.lock().push(Event::Empty(source_type));
    }
}
