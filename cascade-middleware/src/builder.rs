//! Builder for composing sources with layers.
//!
//! # Layer Ordering Convention
//!
//! Layers form an "onion" around the raw source:
//!
//! ```text
//! get(params)
//!     ↓
//! Outermost layer (sees the call first, the result last)
//!     ↓
//! Inner layers
//!     ↓
//! Raw source (memory slot, file, HTTP client, ...)
//! ```
//!
//! ## Storage vs Application Order
//!
//! The `layers` vector stores layers in **outermost-first** order (last added =
//! outermost), and they are **applied in reverse** during `build()`:
//!
//! ```text
//! builder.layer(A).layer(B)
//!
//! Storage: [B, A]  (outermost first)
//! Applied:  Raw -> A -> B
//! Result:   B(A(Raw))
//! ```
//!
//! This matches [`LayerStack`], where `layers[0]` is the outermost layer.

use std::sync::Arc;
use std::time::Duration;

use cascade_core::{GuardedSource, Layer, Payload, Source};
use cascade_types::{CascadeError, LayerSpec, LayerStack, RefreshPolicy};
use serde_json::json;

use crate::timeout::TimeoutLayer;

/// Name recorded for the raw source at the innermost position of a stack.
pub const RAW_SOURCE_LAYER: &str = "RawSource";

/// Builder composing a raw source with layered wrappers.
///
/// See [module-level documentation](self) for details on ordering.
pub struct SourceBuilder<T: Payload> {
    raw: Arc<dyn Source<T>>,
    /// Layers in outermost-first order.
    layers: Vec<Box<dyn Layer<T>>>,
}

impl<T: Payload> SourceBuilder<T> {
    /// Create a new builder from a raw, unwrapped source.
    #[must_use]
    pub fn new(raw: Arc<dyn Source<T>>) -> Self {
        Self {
            raw,
            layers: Vec::new(),
        }
    }

    /// Add or replace the deadline layer.
    ///
    /// The timeout is placed outermost so it bounds every inner layer as well
    /// as the raw source. An existing timeout layer is removed first.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.layers.retain(|l| l.name() != TimeoutLayer::NAME);
        self.layers.insert(0, Box::new(TimeoutLayer::new(timeout)));
        self
    }

    /// Remove the deadline layer if present.
    #[must_use]
    pub fn without_timeout(mut self) -> Self {
        self.layers.retain(|l| l.name() != TimeoutLayer::NAME);
        self
    }

    /// Add an arbitrary layer at the outermost position.
    #[must_use]
    pub fn layer(mut self, layer: Box<dyn Layer<T>>) -> Self {
        self.layers.insert(0, layer);
        self
    }

    /// Number of layers (the raw source excluded).
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether no layer has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Export the current composition for inspection or persistence.
    ///
    /// The raw source is appended as the innermost entry, recording its name
    /// and tier.
    #[must_use]
    pub fn to_stack(&self) -> LayerStack {
        let mut stack = LayerStack::new();
        for layer in &self.layers {
            stack.push_inner(LayerSpec::new(layer.name(), layer.config_json()));
        }
        stack.push_inner(LayerSpec::new(
            RAW_SOURCE_LAYER,
            json!({
                "name": self.raw.name(),
                "source_type": self.raw.source_type().as_str(),
            }),
        ));
        stack
    }

    /// Rebuild a composition around `raw` from an exported stack.
    ///
    /// Unknown layer names are ignored. The inverse of [`to_stack`](Self::to_stack).
    ///
    /// # Errors
    /// Returns `InvalidLayerStack` when a known layer carries an unusable
    /// configuration.
    pub fn from_stack(raw: Arc<dyn Source<T>>, stack: &LayerStack) -> Result<Self, CascadeError> {
        let mut layers: Vec<Box<dyn Layer<T>>> = Vec::new();
        for l in &stack.layers {
            if l.name == TimeoutLayer::NAME {
                let layer = TimeoutLayer::from_config(&l.config).ok_or_else(|| {
                    CascadeError::invalid_layer_stack(format!(
                        "{} requires an integer timeout_ms, got {}",
                        TimeoutLayer::NAME,
                        l.config
                    ))
                })?;
                layers.push(Box::new(layer));
            }
        }
        Ok(Self { raw, layers })
    }

    /// Build the wrapped source.
    ///
    /// Layers are applied innermost first, so with `layers = [Outer, Inner]`
    /// the result is `Outer(Inner(Raw))`.
    #[must_use]
    pub fn build(self) -> Arc<dyn Source<T>> {
        let mut acc: Arc<dyn Source<T>> = Arc::clone(&self.raw);
        for layer in self.layers.into_iter().rev() {
            acc = layer.apply(acc);
        }
        acc
    }

    /// Build the wrapped source and guard it with `policy`.
    #[must_use]
    pub fn build_guarded(self, policy: RefreshPolicy) -> GuardedSource<T> {
        GuardedSource::builder(self.build())
            .refresh_policy(policy)
            .build()
    }
}
