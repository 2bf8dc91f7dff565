#![allow(dead_code)]
// Re-export helpers so tests can `use crate::helpers::*;`

use std::sync::Arc;

use cascade::{Controller, ControllerBuilder, MemorySource, Source, SourceType};
use cascade_mock::{MockSource, RecordingSubscriber};

pub use cascade_mock::{Event, MockBehavior};

/// Owned string from a literal, to keep payload construction short.
pub fn s(v: &str) -> String {
    v.to_string()
}

/// An empty memory tier.
pub fn memory() -> Arc<MemorySource<String>> {
    Arc::new(MemorySource::new())
}

/// A memory tier holding `value`.
pub fn cached(value: &str) -> Arc<MemorySource<String>> {
    Arc::new(MemorySource::with_value(s(value)))
}

/// A scripted tier answering `value`.
pub fn answering(source_type: SourceType, value: &str) -> Arc<MockSource<String>> {
    MockSource::returning(source_type, s(value))
}

/// A scripted tier failing with `message`.
pub fn failing(source_type: SourceType, message: &str) -> Arc<MockSource<String>> {
    MockSource::failing(source_type, message)
}

/// A scripted tier with nothing to give.
pub fn empty(source_type: SourceType) -> Arc<MockSource<String>> {
    MockSource::builder(source_type).build()
}

/// A fresh recording subscriber.
pub fn recorder() -> Arc<RecordingSubscriber<String>> {
    RecordingSubscriber::new()
}

/// Upcast a concrete source for the builder.
pub fn dyn_source<S: Source<String> + 'static>(source: &Arc<S>) -> Arc<dyn Source<String>> {
    Arc::clone(source) as Arc<dyn Source<String>>
}

/// A builder pre-loaded with `sources`, in order.
pub fn builder_with(sources: &[Arc<dyn Source<String>>]) -> ControllerBuilder<String> {
    sources
        .iter()
        .fold(Controller::builder(), |b, src| b.with_source(Arc::clone(src)))
}

/// A controller over `sources` with default configuration.
pub fn controller(sources: &[Arc<dyn Source<String>>]) -> Controller<String> {
    builder_with(sources).build().unwrap()
}
