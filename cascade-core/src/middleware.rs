//! Layer trait for wrapping `Source` implementations.

use std::sync::Arc;

use crate::source::{Payload, Source};

/// Trait implemented by source decorators.
///
/// A layer consumes an inner `Source` and returns a wrapped source that
/// augments or restricts behavior (e.g., deadlines, payload mapping).
pub trait Layer<T: Payload>: Send + Sync {
    /// Apply this layer to wrap an inner source and return the wrapped source.
    fn apply(self: Box<Self>, inner: Arc<dyn Source<T>>) -> Arc<dyn Source<T>>;

    /// Layer name for introspection/logging.
    fn name(&self) -> &'static str;

    /// Opaque configuration snapshot for serialization/inspection.
    fn config_json(&self) -> serde_json::Value;
}
