#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cascade_core::{Fetch, Response, ResponseError, Source, SourceParams, SourceType};
use tokio::sync::Semaphore;

/// What a `get` on [`HeldSource`] resolves to once released.
#[derive(Clone)]
pub enum Answer {
    Value(&'static str),
    Fail(&'static str),
    Empty,
}

/// A source whose `get` stays pending until the test releases it.
pub struct HeldSource {
    source_type: SourceType,
    answer: Mutex<Answer>,
    gate: Semaphore,
    get_calls: AtomicUsize,
    store_calls: AtomicUsize,
    cancel_calls: AtomicUsize,
    stored: Mutex<Option<String>>,
    last_params: Mutex<Option<SourceParams>>,
}

impl HeldSource {
    /// A source that holds every `get` until [`HeldSource::release`].
    pub fn held(source_type: SourceType, answer: Answer) -> Arc<Self> {
        Arc::new(Self {
            source_type,
            answer: Mutex::new(answer),
            gate: Semaphore::new(0),
            get_calls: AtomicUsize::new(0),
            store_calls: AtomicUsize::new(0),
            cancel_calls: AtomicUsize::new(0),
            stored: Mutex::new(None),
            last_params: Mutex::new(None),
        })
    }

    /// A source that answers immediately.
    pub fn ready(source_type: SourceType, answer: Answer) -> Arc<Self> {
        let me = Self::held(source_type, answer);
        me.gate.add_permits(Semaphore::MAX_PERMITS / 2);
        me
    }

    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    pub fn set_answer(&self, answer: Answer) {
        *self.answer.lock().unwrap() = answer;
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn store_calls(&self) -> usize {
        self.store_calls.load(Ordering::SeqCst)
    }

    pub fn cancel_calls(&self) -> usize {
        self.cancel_calls.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> Option<String> {
        self.stored.lock().unwrap().clone()
    }

    pub fn last_params(&self) -> Option<SourceParams> {
        self.last_params.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetch<String> for HeldSource {
    async fn get(&self, params: &SourceParams) -> Result<Response<String>, ResponseError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_params.lock().unwrap() = Some(params.clone());
        let permit = self.gate.acquire().await.expect("gate open");
        permit.forget();
        let answer = self.answer.lock().unwrap().clone();
        match answer {
            Answer::Value(v) => Ok(Response::new(v.to_string(), self.source_type)),
            Answer::Fail(msg) => Err(ResponseError::failed(self.source_type, msg)),
            Answer::Empty => Err(ResponseError::empty(self.source_type)),
        }
    }

    fn cancel(&self) {
        self.cancel_calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Source<String> for HeldSource {
    fn name(&self) -> &'static str {
        "held"
    }

    fn source_type(&self) -> SourceType {
        self.source_type
    }

    async fn store(&self, response: &Response<String>) {
        self.store_calls.fetch_add(1, Ordering::SeqCst);
        *self.stored.lock().unwrap() = Some(response.payload().clone());
    }

    fn peek(&self, _params: &SourceParams) -> Option<String> {
        self.stored()
    }

    fn clear(&self, _params: &SourceParams) {
        self.stored.lock().unwrap().take();
    }
}
