//! Where a controller keeps its guarded sources.
//!
//! Two layouts are provided:
//! - [`TypedRegistry`]: at most one source per [`SourceType`], iterated memory,
//!   disk, network. Registering a second source of a tier replaces the first.
//! - [`PositionalRegistry`]: any number of sources, iterated in registration
//!   order and addressed by their current index.
//!
//! Both guard their contents with a `std::sync::Mutex` held only for the
//! mutation or snapshot itself; callers always receive owned snapshots.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cascade_core::{GuardedSource, Payload};
use cascade_types::{CascadeError, SourceSelector, SourceType};

/// Storage and lookup of the sources a controller orchestrates.
pub trait SourceRegistry<T: Payload>: Send + Sync {
    /// Add `source`.
    ///
    /// Returns the source it displaced, if the layout allows only one entry per
    /// key.
    fn register(&self, source: Arc<GuardedSource<T>>) -> Option<Arc<GuardedSource<T>>>;

    /// Remove `source` (by identity); returns `false` if it was not registered.
    fn deregister(&self, source: &Arc<GuardedSource<T>>) -> bool;

    /// Look up the source addressed by `selector`.
    ///
    /// # Errors
    /// Returns `NotFound` when nothing is registered under `selector` or the
    /// selector kind is not understood by this layout.
    fn resolve(&self, selector: SourceSelector) -> Result<Arc<GuardedSource<T>>, CascadeError>;

    /// Snapshot of every source in iteration order.
    fn all(&self) -> Vec<Arc<GuardedSource<T>>>;

    /// The selector that currently addresses `source`.
    fn selector_for(&self, source: &Arc<GuardedSource<T>>) -> Option<SourceSelector>;

    /// Number of registered sources.
    fn len(&self) -> usize;

    /// Whether no source is registered.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock<V>(m: &Mutex<V>) -> MutexGuard<'_, V> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One source per tier, iterated in [`SourceType`] order.
pub struct TypedRegistry<T: Payload> {
    sources: Mutex<BTreeMap<SourceType, Arc<GuardedSource<T>>>>,
}

impl<T: Payload> Default for TypedRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Payload> TypedRegistry<T> {
    /// An empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sources: Mutex::new(BTreeMap::new()),
        }
    }
}

impl<T: Payload> SourceRegistry<T> for TypedRegistry<T> {
    fn register(&self, source: Arc<GuardedSource<T>>) -> Option<Arc<GuardedSource<T>>> {
        let previous = lock(&self.sources).insert(source.source_type(), source);
        #[cfg(feature = "tracing")]
        if let Some(prev) = &previous {
            tracing::debug!(
                replaced = prev.name(),
                source_type = %prev.source_type(),
                "source replaced in typed registry"
            );
        }
        previous
    }

    fn deregister(&self, source: &Arc<GuardedSource<T>>) -> bool {
        let mut sources = lock(&self.sources);
        let key = source.source_type();
        if sources.get(&key).is_some_and(|s| Arc::ptr_eq(s, source)) {
            sources.remove(&key);
            true
        } else {
            false
        }
    }

    fn resolve(&self, selector: SourceSelector) -> Result<Arc<GuardedSource<T>>, CascadeError> {
        match selector {
            SourceSelector::ByType(t) => lock(&self.sources)
                .get(&t)
                .cloned()
                .ok_or(CascadeError::not_found(selector)),
            SourceSelector::Position(_) => Err(CascadeError::not_found(selector)),
        }
    }

    fn all(&self) -> Vec<Arc<GuardedSource<T>>> {
        lock(&self.sources).values().cloned().collect()
    }

    fn selector_for(&self, source: &Arc<GuardedSource<T>>) -> Option<SourceSelector> {
        lock(&self.sources)
            .iter()
            .find(|(_, s)| Arc::ptr_eq(s, source))
            .map(|(t, _)| SourceSelector::ByType(*t))
    }

    fn len(&self) -> usize {
        lock(&self.sources).len()
    }
}

/// Any number of sources, iterated in registration order.
///
/// Positions are indices into the current list: deregistering a source shifts
/// every later source down by one.
pub struct PositionalRegistry<T: Payload> {
    sources: Mutex<Vec<Arc<GuardedSource<T>>>>,
}

impl<T: Payload> Default for PositionalRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Payload> PositionalRegistry<T> {
    /// An empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sources: Mutex::new(Vec::new()),
        }
    }
}

impl<T: Payload> SourceRegistry<T> for PositionalRegistry<T> {
    fn register(&self, source: Arc<GuardedSource<T>>) -> Option<Arc<GuardedSource<T>>> {
        lock(&self.sources).push(source);
        None
    }

    fn deregister(&self, source: &Arc<GuardedSource<T>>) -> bool {
        let mut sources = lock(&self.sources);
        let before = sources.len();
        sources.retain(|s| !Arc::ptr_eq(s, source));
        sources.len() != before
    }

    fn resolve(&self, selector: SourceSelector) -> Result<Arc<GuardedSource<T>>, CascadeError> {
        match selector {
            SourceSelector::Position(i) => lock(&self.sources)
                .get(i)
                .cloned()
                .ok_or(CascadeError::not_found(selector)),
            SourceSelector::ByType(_) => Err(CascadeError::not_found(selector)),
        }
    }

    fn all(&self) -> Vec<Arc<GuardedSource<T>>> {
        lock(&self.sources).clone()
    }

    fn selector_for(&self, source: &Arc<GuardedSource<T>>) -> Option<SourceSelector> {
        lock(&self.sources)
            .iter()
            .position(|s| Arc::ptr_eq(s, source))
            .map(SourceSelector::Position)
    }

    fn len(&self) -> usize {
        lock(&self.sources).len()
    }
}
