//! Predicates deciding whether a request moves on to the next source.

use std::sync::Arc;

use cascade_core::{GuardedSource, Payload};
use cascade_types::ChainPolicy;

/// Decides, for two consecutive sources of a request, whether the second is queried.
///
/// Only the immediate predecessor is consulted. The first source of a request
/// is always queried.
pub trait SourceChainer<T: Payload>: Send + Sync {
    /// Whether `next` should be invoked given that `previous` precedes it.
    fn should_query_next(&self, previous: &GuardedSource<T>, next: &GuardedSource<T>) -> bool;
}

impl<T, F> SourceChainer<T> for F
where
    T: Payload,
    F: Fn(&GuardedSource<T>, &GuardedSource<T>) -> bool + Send + Sync,
{
    fn should_query_next(&self, previous: &GuardedSource<T>, next: &GuardedSource<T>) -> bool {
        self(previous, next)
    }
}

/// Query every source.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysContinue;

impl<T: Payload> SourceChainer<T> for AlwaysContinue {
    fn should_query_next(&self, _previous: &GuardedSource<T>, _next: &GuardedSource<T>) -> bool {
        true
    }
}

/// Skip a source when its predecessor already holds data for its default params.
///
/// With the usual memory, disk, network ordering this stops at the first tier
/// that has something cached.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipIfPreviousHasData;

impl<T: Payload> SourceChainer<T> for SkipIfPreviousHasData {
    fn should_query_next(&self, previous: &GuardedSource<T>, _next: &GuardedSource<T>) -> bool {
        !previous.has_stored_data()
    }
}

/// Build the chainer described by `policy`.
pub fn chainer_for<T: Payload>(policy: ChainPolicy) -> Arc<dyn SourceChainer<T>> {
    match policy {
        ChainPolicy::SkipIfPreviousHasData => Arc::new(SkipIfPreviousHasData),
        _ => Arc::new(AlwaysContinue),
    }
}
