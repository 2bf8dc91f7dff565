use std::sync::Arc;

use async_trait::async_trait;
use cascade_core::{Fetch, Payload, Source};
use cascade_types::{Response, ResponseError, SourceParams, SourceType};

use super::{
    AcceptAll, Compose, KeepParams, MergeBuilder, NextParamsConverter, ResponseMerger,
    ResponseValidator,
};

/// Sequential composition: `first`, then `second` with params derived from `first`.
///
/// The composite resolves with `second`'s outcome. A failure of `first` is
/// returned as is and `second` is never invoked; so is a response rejected by
/// the validator, which yields the validator's `Rejected` error.
pub struct Chain<A: Payload, B: Payload> {
    first: Arc<dyn Fetch<A>>,
    second: Arc<dyn Fetch<B>>,
    validator: Arc<dyn ResponseValidator<A>>,
    converter: Arc<dyn NextParamsConverter<A>>,
}

impl<A: Payload, B: Payload> Chain<A, B> {
    /// Chain `first` into `second`, accepting every response and passing params through.
    pub fn new(first: Arc<dyn Fetch<A>>, second: Arc<dyn Fetch<B>>) -> Self {
        Self {
            first,
            second,
            validator: Arc::new(AcceptAll),
            converter: Arc::new(KeepParams),
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

/// Shared first half of [`Chain`] and [`Merge`](super::Merge): fetch, validate, convert.
pub(super) async fn first_leg<A: Payload>(
    first: &dyn Fetch<A>,
    validator: &dyn ResponseValidator<A>,
    converter: &dyn NextParamsConverter<A>,
    params: &SourceParams,
) -> Result<(Response<A>, SourceParams), ResponseError> {
    let response = first.get(params).await?;
    if !validator.is_valid(&response) {
        #[cfg(feature = "tracing")]
        tracing::debug!(origin = %response.origin_type(), "first leg rejected by validator");
        return Err(validator.error_for(&response));
    }
    let next = converter.convert(response.payload(), params);
    Ok((response, next))
}

#[async_trait]
impl<A: Payload, B: Payload> Fetch<B> for Chain<A, B> {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "cascade::compose::chain::get", skip(self, params))
    )]
    async fn get(&self, params: &SourceParams) -> Result<Response<B>, ResponseError> {
        let (_, next) = first_leg(
            self.first.as_ref(),
            self.validator.as_ref(),
            self.converter.as_ref(),
            params,
        )
        .await?;
        self.second.get(&next).await
    }

    fn cancel(&self) {
        self.first.cancel();
        self.second.cancel();
    }
}

/// Fluent builder returned by [`Compose::chain`].
pub struct ChainBuilder<A: Payload, B: Payload> {
    chain: Chain<A, B>,
}

impl<A: Payload, B: Payload> ChainBuilder<A, B> {
    pub(super) fn new(first: Arc<dyn Fetch<A>>, second: Arc<dyn Fetch<B>>) -> Self {
        Self {
            chain: Chain::new(first, second),
        }
    }

    /// Gate the next leg on the previous response.
    #[must_use]
    pub fn validator(mut self, validator: impl ResponseValidator<A> + 'static) -> Self {
        self.chain = self.chain.with_validator(validator);
        self
    }

    /// Derive the next leg's params from the previous payload.
    #[must_use]
    pub fn converter(mut self, converter: impl NextParamsConverter<A> + 'static) -> Self {
        self.chain = self.chain.with_converter(converter);
        self
    }

    /// Close this step and return the pipeline so far.
    pub fn compose(self) -> Compose<B> {
        Compose::new(Arc::new(self.chain))
    }

    /// See [`Compose::chain`].
    pub fn chain<C: Payload>(self, next: Arc<dyn Fetch<C>>) -> ChainBuilder<B, C> {
        self.compose().chain(next)
    }

    /// See [`Compose::merge`].
    pub fn merge<C, M>(
        self,
        next: Arc<dyn Fetch<C>>,
        merger: impl ResponseMerger<B, C, M> + 'static,
    ) -> MergeBuilder<B, C, M>
    where
        C: Payload,
        M: Payload,
    {
        self.compose().merge(next, merger)
    }

    /// See [`Compose::parallel`].
    pub fn parallel<C, M>(
        self,
        other: Arc<dyn Fetch<C>>,
        merger: impl ResponseMerger<B, C, M> + 'static,
    ) -> Compose<M>
    where
        C: Payload,
        M: Payload,
    {
        self.compose().parallel(other, merger)
    }

    /// The composed caller.
    pub fn build(self) -> Arc<dyn Fetch<B>> {
        self.compose().build()
    }

    /// See [`Compose::into_source`].
    pub fn into_source(self, source_type: SourceType) -> Arc<dyn Source<B>> {
        self.compose().into_source(source_type)
    }
}
