use std::sync::Arc;

use async_trait::async_trait;
use cascade_core::{Fetch, Payload, Source};
use cascade_types::{Response, ResponseError, SourceParams, SourceType};

use super::chain::first_leg;
use super::{
    AcceptAll, ChainBuilder, Compose, KeepParams, NextParamsConverter, ResponseMerger,
    ResponseValidator,
};

/// Sequential composition combining both responses.
///
/// Runs like [`Chain`](super::Chain); on success of both legs the composite
/// resolves with `merger(first_response, second_response)`.
pub struct Merge<A: Payload, B: Payload, M: Payload> {
    first: Arc<dyn Fetch<A>>,
    second: Arc<dyn Fetch<B>>,
    validator: Arc<dyn ResponseValidator<A>>,
    converter: Arc<dyn NextParamsConverter<A>>,
    merger: Arc<dyn ResponseMerger<A, B, M>>,
}

impl<A: Payload, B: Payload, M: Payload> Merge<A, B, M> {
    /// Merge `first` and `second` with `merger`.
    pub fn new(
        first: Arc<dyn Fetch<A>>,
        second: Arc<dyn Fetch<B>>,
        merger: impl ResponseMerger<A, B, M> + 'static,
    ) -> Self {
        Self {
            first,
            second,
            validator: Arc::new(AcceptAll),
            converter: Arc::new(KeepParams),
            merger: Arc::new(merger),
        }
    }

    /// Gate the second leg on `first`'s response.
    #[must_use]
    pub fn with_validator(mut self, validator: impl ResponseValidator<A> + 'static) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    /// Derive the second leg's params from `first`'s payload.
    #[must_use]
    pub fn with_converter(mut self, converter: impl NextParamsConverter<A> + 'static) -> Self {
        self.converter = Arc::new(converter);
        self
    }
}

#[async_trait]
impl<A: Payload, B: Payload, M: Payload> Fetch<M> for Merge<A, B, M> {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "cascade::compose::merge::get", skip(self, params))
    )]
    async fn get(&self, params: &SourceParams) -> Result<Response<M>, ResponseError> {
        let (first, next) = first_leg(
            self.first.as_ref(),
            self.validator.as_ref(),
            self.converter.as_ref(),
            params,
        )
        .await?;
        let second = self.second.get(&next).await?;
        Ok(self.merger.merge(first, second))
    }

    fn cancel(&self) {
        self.first.cancel();
        self.second.cancel();
    }
}

/// Fluent builder returned by [`Compose::merge`].
pub struct MergeBuilder<A: Payload, B: Payload, M: Payload> {
    merge: Merge<A, B, M>,
}

impl<A: Payload, B: Payload, M: Payload> MergeBuilder<A, B, M> {
    pub(super) fn new(
        first: Arc<dyn Fetch<A>>,
        second: Arc<dyn Fetch<B>>,
        merger: impl ResponseMerger<A, B, M> + 'static,
    ) -> Self {
        Self {
            merge: Merge::new(first, second, merger),
        }
    }

    /// Gate the next leg on the previous response.
    #[must_use]
    pub fn validator(mut self, validator: impl ResponseValidator<A> + 'static) -> Self {
        self.merge = self.merge.with_validator(validator);
        self
    }

    /// Derive the next leg's params from the previous payload.
    #[must_use]
    pub fn converter(mut self, converter: impl NextParamsConverter<A> + 'static) -> Self {
        self.merge = self.merge.with_converter(converter);
        self
    }

    /// Close this step and return the pipeline so far.
    pub fn compose(self) -> Compose<M> {
        Compose::new(Arc::new(self.merge))
    }

    /// See [`Compose::chain`].
    pub fn chain<C: Payload>(self, next: Arc<dyn Fetch<C>>) -> ChainBuilder<M, C> {
        self.compose().chain(next)
    }

    /// See [`Compose::merge`].
    pub fn merge<C, N>(
        self,
        next: Arc<dyn Fetch<C>>,
        merger: impl ResponseMerger<M, C, N> + 'static,
    ) -> MergeBuilder<M, C, N>
    where
        C: Payload,
        N: Payload,
    {
        self.compose().merge(next, merger)
    }

    /// See [`Compose::parallel`].
    pub fn parallel<C, N>(
        self,
        other: Arc<dyn Fetch<C>>,
        merger: impl ResponseMerger<M, C, N> + 'static,
    ) -> Compose<N>
    where
        C: Payload,
        N: Payload,
    {
        self.compose().parallel(other, merger)
    }

    /// The composed caller.
    pub fn build(self) -> Arc<dyn Fetch<M>> {
        self.compose().build()
    }

    /// See [`Compose::into_source`].
    pub fn into_source(self, source_type: SourceType) -> Arc<dyn Source<M>> {
        self.compose().into_source(source_type)
    }
}
