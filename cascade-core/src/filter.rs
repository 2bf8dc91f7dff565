//! Rewriting failures before delivery.

use cascade_types::ResponseError;

/// Transforms a failure before it reaches subscribers.
///
/// Filters return a new value; use [`ResponseError::to_builder`] or the
/// `with_*` helpers to derive it from the input.
pub trait ErrorFilter: Send + Sync {
    /// Produce the error subscribers will see.
    fn filter(&self, error: ResponseError) -> ResponseError;
}

impl<F> ErrorFilter for F
where
    F: Fn(ResponseError) -> ResponseError + Send + Sync,
{
    fn filter(&self, error: ResponseError) -> ResponseError {
        self(error)
    }
}
