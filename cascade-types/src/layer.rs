use serde::{Deserialize, Serialize};

/// A single source layer with a name and free-form JSON configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    /// Layer name (e.g., "`TimeoutSource`").
    pub name: String,
    /// Opaque configuration blob; each layer documents its own schema.
    pub config: serde_json::Value,
}

impl LayerSpec {
    /// Convenience constructor.
    #[must_use]
    pub fn new<N: Into<String>>(name: N, config: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }
}

/// Ordered layers wrapped around a raw source.
///
/// Convention: `layers[0]` is the OUTERMOST layer and the last element is the
/// INNERMOST one (typically the raw source itself, recorded for inspection).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerStack {
    /// Ordered list of layers, outermost first.
    pub layers: Vec<LayerSpec>,
}

impl LayerStack {
    /// Create an empty stack.
    #[must_use]
    pub const fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Push a layer at the outermost position.
    pub fn push_outer(&mut self, layer: LayerSpec) {
        self.layers.insert(0, layer);
    }

    /// Append a layer as the innermost one.
    pub fn push_inner(&mut self, layer: LayerSpec) {
        self.layers.push(layer);
    }

    /// Names in outermost-first order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.name.as_str()).collect()
    }
}
