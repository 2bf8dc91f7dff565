//! Composing sources into new sources.
//!
//! - [`Chain`]: query one source, validate, derive params, then query another.
//! - [`Merge`]: like `Chain`, but combine both responses.
//! - [`Parallel`]: query two sources at once and combine; the first failure wins.
//!
//! Every composite implements [`Fetch`], so composites nest, and
//! [`Compose::into_source`] turns any pipeline into a storage-less
//! [`CallerSource`] that can be registered with a controller.
//!
//! ```rust,ignore
//! let profile = Compose::new(session)
//!     .chain(account)
//!     .validator(|r: &Response<Session>| r.payload().is_valid())
//!     .converter(|s: &Session, _p: &SourceParams| SourceParams::new().with_payload(s.user_id))
//!     .parallel(avatar, |a, b| a.map(|acc| Profile::new(acc, b.into_payload())))
//!     .into_source(SourceType::Network);
//! ```

mod caller;
mod chain;
mod merge;
mod parallel;

use std::sync::Arc;

use cascade_core::{Fetch, Payload, Source};
use cascade_types::{ErrorKind, Response, ResponseError, SourceParams, SourceType};

pub use caller::CallerSource;
pub use chain::{Chain, ChainBuilder};
pub use merge::{Merge, MergeBuilder};
pub use parallel::Parallel;

/// Decides whether the first leg's response lets a composition continue.
pub trait ResponseValidator<A>: Send + Sync {
    /// Whether `response` is acceptable.
    fn is_valid(&self, response: &Response<A>) -> bool;

    /// The error delivered when `response` is rejected.
    fn error_for(&self, response: &Response<A>) -> ResponseError {
        ResponseError::builder(response.origin_type(), "response rejected by validator")
            .kind(ErrorKind::Rejected)
            .build()
    }
}

impl<A, F> ResponseValidator<A> for F
where
    F: Fn(&Response<A>) -> bool + Send + Sync,
{
    fn is_valid(&self, response: &Response<A>) -> bool {
        self(response)
    }
}

/// Accepts every response.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl<A> ResponseValidator<A> for AcceptAll {
    fn is_valid(&self, _response: &Response<A>) -> bool {
        true
    }
}

/// Derives the params of the second leg from the first leg's payload.
pub trait NextParamsConverter<A>: Send + Sync {
    /// Params for the next leg, given the previous payload and the composite's params.
    fn convert(&self, previous: &A, params: &SourceParams) -> SourceParams;
}

impl<A, F> NextParamsConverter<A> for F
where
    F: Fn(&A, &SourceParams) -> SourceParams + Send + Sync,
{
    fn convert(&self, previous: &A, params: &SourceParams) -> SourceParams {
        self(previous, params)
    }
}

/// Passes the composite's params through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepParams;

impl<A> NextParamsConverter<A> for KeepParams {
    fn convert(&self, _previous: &A, params: &SourceParams) -> SourceParams {
        params.clone()
    }
}

/// Combines the responses of two legs.
pub trait ResponseMerger<A, B, M>: Send + Sync {
    /// Produce the composite response.
    fn merge(&self, first: Response<A>, second: Response<B>) -> Response<M>;
}

impl<A, B, M, F> ResponseMerger<A, B, M> for F
where
    F: Fn(Response<A>, Response<B>) -> Response<M> + Send + Sync,
{
    fn merge(&self, first: Response<A>, second: Response<B>) -> Response<M> {
        self(first, second)
    }
}

/// Fluent entry point for building compositions.
pub struct Compose<T: Payload> {
    fetch: Arc<dyn Fetch<T>>,
}

impl<T: Payload> Compose<T> {
    /// Start a pipeline from `first`.
    pub fn new(first: Arc<dyn Fetch<T>>) -> Self {
        Self { fetch: first }
    }

    /// Continue with `next`, whose outcome becomes the pipeline's outcome.
    pub fn chain<B: Payload>(self, next: Arc<dyn Fetch<B>>) -> ChainBuilder<T, B> {
        ChainBuilder::new(self.fetch, next)
    }

    /// Continue with `next` and combine both responses with `merger`.
    pub fn merge<B, M>(
        self,
        next: Arc<dyn Fetch<B>>,
        merger: impl ResponseMerger<T, B, M> + 'static,
    ) -> MergeBuilder<T, B, M>
    where
        B: Payload,
        M: Payload,
    {
        MergeBuilder::new(self.fetch, next, merger)
    }

    /// Run alongside `other` and combine both responses with `merger`.
    pub fn parallel<B, M>(
        self,
        other: Arc<dyn Fetch<B>>,
        merger: impl ResponseMerger<T, B, M> + 'static,
    ) -> Compose<M>
    where
        B: Payload,
        M: Payload,
    {
        Compose::new(Arc::new(Parallel::new(self.fetch, other, merger)))
    }

    /// The composed caller.
    pub fn build(self) -> Arc<dyn Fetch<T>> {
        self.fetch
    }

    /// Expose the pipeline as a storage-less source of tier `source_type`.
    pub fn into_source(self, source_type: SourceType) -> Arc<dyn Source<T>> {
        Arc::new(CallerSource::new(self.fetch, source_type))
    }
}
