use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use cascade_core::{Fetch, Payload, Response, ResponseError, Source, SourceParams, SourceType};
use tokio::sync::watch;

/// Instruction for how `get` should behave.
#[derive(Debug, Clone)]
pub enum MockBehavior<T> {
    /// Return the provided value.
    Return(T),
    /// Fail with the provided error.
    Fail(ResponseError),
    /// Report that nothing is available.
    Empty,
    /// Never resolve on its own; only a `cancel` ends the call (with a
    /// `Cancelled` error).
    Hang,
}

struct State<T> {
    behavior: MockBehavior<T>,
    stored: Option<T>,
    stored_origins: Vec<SourceType>,
    params_log: Vec<SourceParams>,
}

/// A scripted source.
///
/// Every `get` is logged, optionally delayed, and then answered according to
/// the current [`MockBehavior`]. A `cancel` interrupts calls that are delaying
/// or hanging.
pub struct MockSource<T> {
    name: &'static str,
    source_type: SourceType,
    delay: Option<Duration>,
    state: Mutex<State<T>>,
    cancel_epoch: watch::Sender<u64>,
    get_calls: AtomicUsize,
    store_calls: AtomicUsize,
    cancel_calls: AtomicUsize,
}

/// Builder for [`MockSource`].
pub struct MockSourceBuilder<T> {
    name: &'static str,
    source_type: SourceType,
    delay: Option<Duration>,
    behavior: MockBehavior<T>,
    stored: Option<T>,
}

impl<T: Payload> MockSourceBuilder<T> {
    /// Name reported by [`Source::name`] and attached as origin id.
    #[must_use]
    pub const fn name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Sleep this long before answering.
    #[must_use]
    pub const fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Answer with `value`.
    #[must_use]
    pub fn returns(mut self, value: T) -> Self {
        self.behavior = MockBehavior::Return(value);
        self
    }

    /// Fail with a plain error carrying `message`.
    #[must_use]
    pub fn fails(mut self, message: &str) -> Self {
        self.behavior = MockBehavior::Fail(ResponseError::failed(self.source_type, message));
        self
    }

    /// Use an explicit behavior.
    #[must_use]
    pub fn behavior(mut self, behavior: MockBehavior<T>) -> Self {
        self.behavior = behavior;
        self
    }

    /// Pre-fill the store with `value`.
    #[must_use]
    pub fn stored(mut self, value: T) -> Self {
        self.stored = Some(value);
        self
    }

    /// Finish.
    #[must_use]
    pub fn build(self) -> Arc<MockSource<T>> {
        let (cancel_epoch, _) = watch::channel(0);
        Arc::new(MockSource {
            name: self.name,
            source_type: self.source_type,
            delay: self.delay,
            state: Mutex::new(State {
                behavior: self.behavior,
                stored: self.stored,
                stored_origins: Vec::new(),
                params_log: Vec::new(),
            }),
            cancel_epoch,
            get_calls: AtomicUsize::new(0),
            store_calls: AtomicUsize::new(0),
            cancel_calls: AtomicUsize::new(0),
        })
    }
}

impl<T: Payload> MockSource<T> {
    /// Start a mock of the given tier. Defaults to answering `Empty`.
    #[must_use]
    pub const fn builder(source_type: SourceType) -> MockSourceBuilder<T> {
        MockSourceBuilder {
            name: source_type.as_str(),
            source_type,
            delay: None,
            behavior: MockBehavior::Empty,
            stored: None,
        }
    }

    /// Shortcut: a mock answering `value` immediately.
    #[must_use]
    pub fn returning(source_type: SourceType, value: T) -> Arc<Self> {
        Self::builder(source_type).returns(value).build()
    }

    /// Shortcut: a mock failing immediately with `message`.
    #[must_use]
    pub fn failing(source_type: SourceType, message: &str) -> Arc<Self> {
        Self::builder(source_type).fails(message).build()
    }

    fn state(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the behavior for subsequent calls.
    pub fn set_behavior(&self, behavior: MockBehavior<T>) {
        self.state().behavior = behavior;
    }

    /// Number of `get` calls received.
    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    /// Number of `store` calls received.
    pub fn store_calls(&self) -> usize {
        self.store_calls.load(Ordering::SeqCst)
    }

    /// Number of `cancel` calls received.
    pub fn cancel_calls(&self) -> usize {
        self.cancel_calls.load(Ordering::SeqCst)
    }

    /// Currently stored payload.
    pub fn stored(&self) -> Option<T> {
        self.state().stored.clone()
    }

    /// Origin tiers of every response stored so far, in order.
    pub fn stored_origins(&self) -> Vec<SourceType> {
        self.state().stored_origins.clone()
    }

    /// Params of every `get` received so far, in order.
    pub fn params_log(&self) -> Vec<SourceParams> {
        self.state().params_log.clone()
    }

    fn answer(&self, behavior: MockBehavior<T>) -> Result<Response<T>, ResponseError> {
        match behavior {
            MockBehavior::Return(v) => {
                Ok(Response::new(v, self.source_type).with_origin_id(self.name))
            }
            MockBehavior::Fail(e) => Err(e),
            MockBehavior::Empty => Err(ResponseError::empty(self.source_type)),
            MockBehavior::Hang => Err(ResponseError::cancelled(self.source_type)),
        }
    }
}

#[async_trait]
impl<T: Payload> Fetch<T> for MockSource<T> {
    async fn get(&self, params: &SourceParams) -> Result<Response<T>, ResponseError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        let mut cancelled = self.cancel_epoch.subscribe();
        // Snapshot the behavior without holding the lock across await points
        let behavior = {
            let mut state = self.state();
            state.params_log.push(params.clone());
            state.behavior.clone()
        };

        let hang = matches!(behavior, MockBehavior::Hang);
        let wait = async {
            if let Some(d) = self.delay {
                tokio::time::sleep(d).await;
            }
            if hang {
                std::future::pending::<()>().await;
            }
        };
        tokio::select! {
            () = wait => self.answer(behavior),
            _ = cancelled.changed() => Err(ResponseError::cancelled(self.source_type)),
        }
    }

    fn cancel(&self) {
        self.cancel_calls.fetch_add(1, Ordering::SeqCst);
        self.cancel_epoch.send_modify(|epoch| *epoch += 1);
    }
}

#[async_trait]
impl<T: Payload> Source<T> for MockSource<T> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn source_type(&self) -> SourceType {
        self.source_type
    }

    async fn store(&self, response: &Response<T>) {
        self.store_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state();
        state.stored = Some(response.payload().clone());
        state.stored_origins.push(response.origin_type());
    }

    fn peek(&self, _params: &SourceParams) -> Option<T> {
        self.stored()
    }

    fn clear(&self, _params: &SourceParams) {
        self.state().stored = None;
    }
}
