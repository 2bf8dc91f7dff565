use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use cascade_core::{CallbackGroup, GuardedSource, Payload, Source, Subscriber};
use cascade_middleware::SourceBuilder;
use cascade_types::{
    CascadeError, ChainPolicy, ControllerConfig, RefreshPolicy, RegistryKind, SourceParams,
    SourceSelector,
};

use crate::chainer::{SourceChainer, chainer_for};
use crate::registry::{PositionalRegistry, SourceRegistry, TypedRegistry};
use crate::request::RequestBuilder;

/// Orchestrator that drives requests across the registered sources of one resource.
pub struct Controller<T: Payload> {
    registry: Arc<dyn SourceRegistry<T>>,
    chainer: Arc<dyn SourceChainer<T>>,
    callbacks: Arc<CallbackGroup<T>>,
    cfg: ControllerConfig,
}

enum PendingSource<T: Payload> {
    Raw(Arc<dyn Source<T>>, RefreshPolicy),
    Guarded(Arc<GuardedSource<T>>),
}

/// Builder for constructing a [`Controller`].
pub struct ControllerBuilder<T: Payload> {
    sources: Vec<PendingSource<T>>,
    registry: Option<Arc<dyn SourceRegistry<T>>>,
    chainer: Option<Arc<dyn SourceChainer<T>>>,
    callbacks: Vec<Arc<dyn Subscriber<T>>>,
    cfg: ControllerConfig,
}

impl<T: Payload> Default for ControllerBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Payload> ControllerBuilder<T> {
    /// Create a new builder with default configuration.
    ///
    /// Behavior and trade-offs:
    /// - Starts with no sources; register at least one via [`with_source`](Self::with_source)
    ///   or [`with_guarded_source`](Self::with_guarded_source).
    /// - Defaults: type-keyed registry, every source queried, every idle `get`
    ///   fetches, no per-call deadline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sources: vec![],
            registry: None,
            chainer: None,
            callbacks: vec![],
            cfg: ControllerConfig::default(),
        }
    }

    /// Register a raw source, guarded with the current refresh policy.
    ///
    /// Behavior and trade-offs:
    /// - The policy in effect when this method is called applies; changing it
    ///   later with [`with_refresh_policy`](Self::with_refresh_policy) only affects
    ///   sources added afterwards.
    /// - A configured [`source_timeout`](Self::source_timeout) wraps the source at
    ///   build time.
    /// - With the type-keyed registry a later source of the same tier replaces
    ///   an earlier one.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn Source<T>>) -> Self {
        let policy = self.cfg.refresh_policy;
        self.sources.push(PendingSource::Raw(source, policy));
        self
    }

    /// Register a raw source with an explicit refresh policy.
    #[must_use]
    pub fn with_source_policy(mut self, source: Arc<dyn Source<T>>, policy: RefreshPolicy) -> Self {
        self.sources.push(PendingSource::Raw(source, policy));
        self
    }

    /// Register an already guarded source as is.
    ///
    /// Behavior and trade-offs:
    /// - Keeps its own refresh strategy and default params.
    /// - Not wrapped with the controller's source timeout.
    #[must_use]
    pub fn with_guarded_source(mut self, source: GuardedSource<T>) -> Self {
        self.sources
            .push(PendingSource::Guarded(Arc::new(source)));
        self
    }

    /// Refresh policy for raw sources added after this call.
    #[must_use]
    pub const fn with_refresh_policy(mut self, policy: RefreshPolicy) -> Self {
        self.cfg.refresh_policy = policy;
        self
    }

    /// Select the built-in registry layout.
    ///
    /// Behavior and trade-offs:
    /// - `ByType`: one source per tier, queried memory, disk, network; sources
    ///   are addressed with [`SourceSelector::ByType`].
    /// - `Positional`: any number of sources, queried in registration order and
    ///   addressed with [`SourceSelector::Position`].
    #[must_use]
    pub const fn registry(mut self, kind: RegistryKind) -> Self {
        self.cfg.registry = kind;
        self
    }

    /// Use a custom registry instead of a built-in one.
    ///
    /// Sources already present in it are kept; sources added through this
    /// builder are registered into it at build time.
    #[must_use]
    pub fn registry_impl(mut self, registry: Arc<dyn SourceRegistry<T>>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Select a built-in chaining predicate.
    #[must_use]
    pub const fn chain_policy(mut self, policy: ChainPolicy) -> Self {
        self.cfg.chain_policy = policy;
        self
    }

    /// Use a custom chaining predicate; takes precedence over [`chain_policy`](Self::chain_policy).
    #[must_use]
    pub fn chainer(mut self, chainer: impl SourceChainer<T> + 'static) -> Self {
        self.chainer = Some(Arc::new(chainer));
        self
    }

    /// Bound every `get` of raw sources with a deadline.
    ///
    /// Behavior and trade-offs:
    /// - On expiry the source is cancelled and the leg fails with `TimedOut`,
    ///   which subscribers receive like any other failure.
    /// - Guarded sources registered via [`with_guarded_source`](Self::with_guarded_source)
    ///   are left untouched.
    #[must_use]
    pub const fn source_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.source_timeout = Some(timeout);
        self
    }

    /// Subscriber notified for every request of the controller.
    #[must_use]
    pub fn with_callback(mut self, subscriber: Arc<dyn Subscriber<T>>) -> Self {
        self.callbacks.push(subscriber);
        self
    }

    /// Replace the whole configuration, e.g. one deserialized from a file.
    ///
    /// Sources already added keep the refresh policy they were added with.
    #[must_use]
    pub const fn config(mut self, cfg: ControllerConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Build the controller.
    ///
    /// # Errors
    /// Returns `NoSources` if neither the builder nor a custom registry holds a source.
    pub fn build(self) -> Result<Controller<T>, CascadeError> {
        let registry: Arc<dyn SourceRegistry<T>> = match self.registry {
            Some(r) => r,
            None => match self.cfg.registry {
                RegistryKind::Positional => Arc::new(PositionalRegistry::new()),
                _ => Arc::new(TypedRegistry::new()),
            },
        };

        for pending in self.sources {
            let guarded = match pending {
                PendingSource::Guarded(g) => g,
                PendingSource::Raw(raw, policy) => {
                    let mut layered = SourceBuilder::new(raw);
                    if let Some(timeout) = self.cfg.source_timeout {
                        layered = layered.with_timeout(timeout);
                    }
                    Arc::new(layered.build_guarded(policy))
                }
            };
            registry.register(guarded);
        }

        if registry.is_empty() {
            return Err(CascadeError::NoSources);
        }

        let chainer = self
            .chainer
            .unwrap_or_else(|| chainer_for(self.cfg.chain_policy));
        let callbacks = Arc::new(CallbackGroup::new());
        for cb in self.callbacks {
            callbacks.register(cb);
        }

        Ok(Controller {
            registry,
            chainer,
            callbacks,
            cfg: self.cfg,
        })
    }
}

impl<T: Payload> fmt::Debug for Controller<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("sources", &self.registry.all())
            .field("callbacks", &self.callbacks)
            .field("cfg", &self.cfg)
            .finish_non_exhaustive()
    }
}

impl<T: Payload> Controller<T> {
    /// Start building a new `Controller`.
    ///
    /// Typical usage registers the tiers of one resource and subscribes to results:
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use cascade::{ChainPolicy, Controller, MemorySource, RefreshPolicy};
    ///
    /// let controller = Controller::<String>::builder()
    ///     .with_source(Arc::new(MemorySource::new()))
    ///     .with_refresh_policy(RefreshPolicy::OneShot)
    ///     .with_source(network.clone())
    ///     .chain_policy(ChainPolicy::SkipIfPreviousHasData)
    ///     .build()?;
    ///
    /// controller.register_callback(ui.clone());
    /// controller.request().execute().await;
    /// ```
    #[must_use]
    pub fn builder() -> ControllerBuilder<T> {
        ControllerBuilder::new()
    }

    /// A request over every registered source, in registry order.
    #[must_use]
    pub fn request(&self) -> RequestBuilder<T> {
        RequestBuilder::new(
            Arc::clone(&self.registry),
            self.registry.all(),
            Arc::clone(&self.chainer),
            Arc::clone(&self.callbacks),
        )
    }

    /// A request over the single source addressed by `selector`.
    ///
    /// # Errors
    /// Returns `NotFound` when the selector does not resolve.
    pub fn request_for(&self, selector: SourceSelector) -> Result<RequestBuilder<T>, CascadeError> {
        let source = self.registry.resolve(selector)?;
        Ok(RequestBuilder::new(
            Arc::clone(&self.registry),
            vec![source],
            Arc::clone(&self.chainer),
            Arc::clone(&self.callbacks),
        ))
    }

    /// Ask every registered source to abort its in-flight `get`.
    ///
    /// Advisory: a result that still arrives is processed normally.
    pub fn cancel(&self) {
        for source in self.registry.all() {
            source.cancel();
        }
    }

    /// Ask one source to abort its in-flight `get`.
    ///
    /// # Errors
    /// Returns `NotFound` when the selector does not resolve.
    pub fn cancel_for(&self, selector: SourceSelector) -> Result<(), CascadeError> {
        self.registry.resolve(selector)?.cancel();
        Ok(())
    }

    /// Re-arm the refresh strategy of every source.
    pub fn force_refresh(&self) {
        for source in self.registry.all() {
            source.force_refresh();
        }
    }

    /// Read what the addressed source holds for `params`, without fetching.
    ///
    /// # Errors
    /// Returns `NotFound` when the selector does not resolve.
    pub fn peek(
        &self,
        selector: SourceSelector,
        params: &SourceParams,
    ) -> Result<Option<T>, CascadeError> {
        Ok(self.registry.resolve(selector)?.peek(params))
    }

    /// Add a controller-wide subscriber; returns `false` if already registered.
    pub fn register_callback(&self, subscriber: Arc<dyn Subscriber<T>>) -> bool {
        self.callbacks.register(subscriber)
    }

    /// Remove a controller-wide subscriber; returns `false` if it was not registered.
    pub fn deregister_callback(&self, subscriber: &Arc<dyn Subscriber<T>>) -> bool {
        self.callbacks.deregister(subscriber)
    }

    /// Remove every controller-wide subscriber.
    pub fn clear_callbacks(&self) {
        self.callbacks.clear();
    }

    /// Whether any controller-wide subscriber is registered.
    #[must_use]
    pub fn has_callbacks(&self) -> bool {
        self.callbacks.has_callbacks()
    }

    /// The controller-wide subscriber group.
    #[must_use]
    pub const fn callbacks(&self) -> &Arc<CallbackGroup<T>> {
        &self.callbacks
    }

    /// Snapshot of the registered sources, in registry order.
    #[must_use]
    pub fn sources(&self) -> Vec<Arc<GuardedSource<T>>> {
        self.registry.all()
    }

    /// The source addressed by `selector`.
    ///
    /// # Errors
    /// Returns `NotFound` when the selector does not resolve.
    pub fn source(&self, selector: SourceSelector) -> Result<Arc<GuardedSource<T>>, CascadeError> {
        self.registry.resolve(selector)
    }

    /// Register a source at runtime; returns the source it displaced, if any.
    ///
    /// Requests built afterwards include it; requests already executing still
    /// cascade their successes into it.
    pub fn register_source(&self, source: Arc<GuardedSource<T>>) -> Option<Arc<GuardedSource<T>>> {
        self.registry.register(source)
    }

    /// Remove the source addressed by `selector` and return it.
    ///
    /// # Errors
    /// Returns `NotFound` when the selector does not resolve.
    pub fn deregister_source(
        &self,
        selector: SourceSelector,
    ) -> Result<Arc<GuardedSource<T>>, CascadeError> {
        let source = self.registry.resolve(selector)?;
        self.registry.deregister(&source);
        Ok(source)
    }

    /// The selector currently addressing `source`.
    #[must_use]
    pub fn selector_for(&self, source: &Arc<GuardedSource<T>>) -> Option<SourceSelector> {
        self.registry.selector_for(source)
    }

    /// Effective configuration.
    #[must_use]
    pub const fn config(&self) -> &ControllerConfig {
        &self.cfg
    }
}
