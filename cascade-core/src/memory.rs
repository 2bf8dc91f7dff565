//! Single-slot in-memory source.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use cascade_types::{Response, ResponseError, SourceParams, SourceType};

use crate::source::{Fetch, Payload, Source};

/// Holds the most recent payload stored into it.
///
/// `get` answers from the slot and never goes anywhere else; an empty slot
/// yields an [`ErrorKind::Empty`](cascade_types::ErrorKind::Empty) failure.
/// Params are ignored.
#[derive(Debug)]
pub struct MemorySource<T> {
    name: &'static str,
    slot: Mutex<Option<T>>,
}

impl<T> Default for MemorySource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MemorySource<T> {
    /// An empty memory source named "memory".
    #[must_use]
    pub const fn new() -> Self {
        Self::named("memory")
    }

    /// An empty memory source with a custom name.
    #[must_use]
    pub const fn named(name: &'static str) -> Self {
        Self {
            name,
            slot: Mutex::new(None),
        }
    }

    /// A memory source pre-filled with `value`.
    pub const fn with_value(value: T) -> Self {
        Self {
            name: "memory",
            slot: Mutex::new(Some(value)),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl<T: Payload> Fetch<T> for MemorySource<T> {
    async fn get(&self, _params: &SourceParams) -> Result<Response<T>, ResponseError> {
        let value = self.slot().clone();
        value
            .map(|v| Response::new(v, SourceType::Memory).with_origin_id(self.name))
            .ok_or_else(|| ResponseError::empty(SourceType::Memory))
    }
}

#[async_trait]
impl<T: Payload> Source<T> for MemorySource<T> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn source_type(&self) -> SourceType {
        SourceType::Memory
    }

    async fn store(&self, response: &Response<T>) {
        *self.slot() = Some(response.payload().clone());
    }

    fn peek(&self, _params: &SourceParams) -> Option<T> {
        self.slot().clone()
    }

    fn clear(&self, _params: &SourceParams) {
        self.slot().take();
    }
}
