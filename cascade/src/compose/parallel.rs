use std::sync::Arc;

use async_trait::async_trait;
use cascade_core::{Fetch, Payload};
use cascade_types::{ParallelParams, Response, ResponseError, SourceParams};
use futures::future::{Either, select};

use super::ResponseMerger;

/// Concurrent composition: both legs start together.
///
/// Behavior:
/// - When the params carry a [`ParallelParams`] payload, each leg receives its
///   own half; otherwise both legs receive the composite's params.
/// - Once both legs succeed the composite resolves with
///   `merger(first_response, second_response)`.
/// - The first failure wins: the composite resolves with it immediately, the
///   other leg is cancelled and its future dropped, so a later completion is
///   never observed.
pub struct Parallel<A: Payload, B: Payload, M: Payload> {
    first: Arc<dyn Fetch<A>>,
    second: Arc<dyn Fetch<B>>,
    merger: Arc<dyn ResponseMerger<A, B, M>>,
}

impl<A: Payload, B: Payload, M: Payload> Parallel<A, B, M> {
    /// Run `first` and `second` together and combine them with `merger`.
    pub fn new(
        first: Arc<dyn Fetch<A>>,
        second: Arc<dyn Fetch<B>>,
        merger: impl ResponseMerger<A, B, M> + 'static,
    ) -> Self {
        Self {
            first,
            second,
            merger: Arc::new(merger),
        }
    }
}

fn split(params: &SourceParams) -> (SourceParams, SourceParams) {
    match params.payload::<ParallelParams>() {
        Some(pair) => (pair.first.clone(), pair.second.clone()),
        None => (params.clone(), params.clone()),
    }
}

#[async_trait]
impl<A: Payload, B: Payload, M: Payload> Fetch<M> for Parallel<A, B, M> {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "cascade::compose::parallel::get", skip(self, params))
    )]
    async fn get(&self, params: &SourceParams) -> Result<Response<M>, ResponseError> {
        let (first_params, second_params) = split(params);
        let first = self.first.get(&first_params);
        let second = self.second.get(&second_params);

        match select(first, second).await {
            Either::Left((Ok(a), second)) => {
                let b = second.await?;
                Ok(self.merger.merge(a, b))
            }
            Either::Right((Ok(b), first)) => {
                let a = first.await?;
                Ok(self.merger.merge(a, b))
            }
            Either::Left((Err(e), second)) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(error = %e, "first leg failed; cancelling second");
                drop(second);
                self.second.cancel();
                Err(e)
            }
            Either::Right((Err(e), first)) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(error = %e, "second leg failed; cancelling first");
                drop(first);
                self.first.cancel();
                Err(e)
            }
        }
    }

    fn cancel(&self) {
        self.first.cancel();
        self.second.cancel();
    }
}
