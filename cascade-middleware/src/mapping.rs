//! Presenting a source of one payload type as a source of another.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use cascade_core::{Fetch, Payload, Source};
use cascade_types::{Response, ResponseError, SourceParams, SourceType};

/// Bidirectional conversion between a stored representation and the exposed one.
pub trait Mapper<Stored, Exposed>: Send + Sync {
    /// Stored representation to exposed payload.
    fn map_from(&self, from: Stored) -> Exposed;

    /// Exposed payload back to the stored representation.
    fn map_to(&self, to: Exposed) -> Stored;
}

/// [`Mapper`] built from a pair of closures.
pub struct FnMapper<F, G> {
    from: F,
    to: G,
}

impl<F, G> FnMapper<F, G> {
    /// Pair a forward and a backward conversion.
    pub const fn new(from: F, to: G) -> Self {
        Self { from, to }
    }
}

impl<A, B, F, G> Mapper<A, B> for FnMapper<F, G>
where
    F: Fn(A) -> B + Send + Sync,
    G: Fn(B) -> A + Send + Sync,
{
    fn map_from(&self, from: A) -> B {
        (self.from)(from)
    }

    fn map_to(&self, to: B) -> A {
        (self.to)(to)
    }
}

/// A `Source<Exposed>` backed by a `Source<Stored>`.
///
/// `get` and `peek` convert with [`Mapper::map_from`]; `store` converts back
/// with [`Mapper::map_to`]. Origin tags pass through unchanged, so the usual
/// same-tier store skip still applies to the wrapped source.
pub struct MappingSource<Stored, Exposed, M> {
    inner: Arc<dyn Source<Stored>>,
    mapper: M,
    _to: PhantomData<fn() -> Exposed>,
}

impl<Stored, Exposed, M> MappingSource<Stored, Exposed, M>
where
    Stored: Payload,
    Exposed: Payload,
    M: Mapper<Stored, Exposed>,
{
    /// Wrap `inner` with `mapper`.
    pub fn new(inner: Arc<dyn Source<Stored>>, mapper: M) -> Self {
        Self {
            inner,
            mapper,
            _to: PhantomData,
        }
    }

    /// Access the inner source.
    pub const fn inner(&self) -> &Arc<dyn Source<Stored>> {
        &self.inner
    }
}

#[async_trait]
impl<Stored, Exposed, M> Fetch<Exposed> for MappingSource<Stored, Exposed, M>
where
    Stored: Payload,
    Exposed: Payload,
    M: Mapper<Stored, Exposed>,
{
    async fn get(&self, params: &SourceParams) -> Result<Response<Exposed>, ResponseError> {
        let response = self.inner.get(params).await?;
        Ok(response.map(|p| self.mapper.map_from(p)))
    }

    fn cancel(&self) {
        self.inner.cancel();
    }
}

#[async_trait]
impl<Stored, Exposed, M> Source<Exposed> for MappingSource<Stored, Exposed, M>
where
    Stored: Payload,
    Exposed: Payload,
    M: Mapper<Stored, Exposed>,
{
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn source_type(&self) -> SourceType {
        self.inner.source_type()
    }

    async fn store(&self, response: &Response<Exposed>) {
        let stored = response.clone().map(|p| self.mapper.map_to(p));
        self.inner.store(&stored).await;
    }

    fn peek(&self, params: &SourceParams) -> Option<Exposed> {
        self.inner.peek(params).map(|p| self.mapper.map_from(p))
    }

    fn has_data(&self, params: &SourceParams) -> bool {
        self.inner.has_data(params)
    }

    fn clear(&self, params: &SourceParams) {
        self.inner.clear(params);
    }
}
