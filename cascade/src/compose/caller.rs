use std::sync::Arc;

use async_trait::async_trait;
use cascade_core::{Fetch, Payload, Source};
use cascade_types::{Response, ResponseError, SourceParams, SourceType};

/// A [`Source`] that only fetches.
///
/// Wraps any [`Fetch`] (typically a composition) so it can be registered with
/// a controller. It stores nothing: `store` and `clear` are no-ops and `peek`
/// always returns `None`, so chainers that look at stored data never skip past
/// it.
pub struct CallerSource<T> {
    caller: Arc<dyn Fetch<T>>,
    source_type: SourceType,
    name: &'static str,
}

impl<T: Payload> CallerSource<T> {
    /// Expose `caller` as a source of tier `source_type`.
    pub fn new(caller: Arc<dyn Fetch<T>>, source_type: SourceType) -> Self {
        Self {
            caller,
            source_type,
            name: "composite",
        }
    }

    /// Name used in logs and reports.
    #[must_use]
    pub const fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }
}

#[async_trait]
impl<T: Payload> Fetch<T> for CallerSource<T> {
    async fn get(&self, params: &SourceParams) -> Result<Response<T>, ResponseError> {
        self.caller.get(params).await
    }

    fn cancel(&self) {
        self.caller.cancel();
    }
}

#[async_trait]
impl<T: Payload> Source<T> for CallerSource<T> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn source_type(&self) -> SourceType {
        self.source_type
    }

    async fn store(&self, _response: &Response<T>) {}

    fn peek(&self, _params: &SourceParams) -> Option<T> {
        None
    }

    fn clear(&self, _params: &SourceParams) {}
}
