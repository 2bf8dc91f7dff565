//! Per-call parameters handed to sources.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Parameters for a single `get`, `peek`, or `clear` call.
///
/// The payload is opaque to the orchestration layer; sources downcast it to
/// whatever request type they understand via [`SourceParams::payload`].
#[derive(Clone)]
pub struct SourceParams {
    index: i64,
    payload: Option<Arc<dyn Any + Send + Sync>>,
    force: bool,
}

impl SourceParams {
    /// Index value meaning "no particular element".
    pub const ALL: i64 = -1;

    /// Default parameters: no index, no payload, not forced.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            index: Self::ALL,
            payload: None,
            force: false,
        }
    }

    /// Attach an opaque payload.
    #[must_use]
    pub fn with_payload<P: Any + Send + Sync>(mut self, payload: P) -> Self {
        self.payload = Some(Arc::new(payload));
        self
    }

    /// Attach an already shared payload.
    #[must_use]
    pub fn with_shared_payload(mut self, payload: Arc<dyn Any + Send + Sync>) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Address a single element of a collection-valued source.
    #[must_use]
    pub const fn with_index(mut self, index: i64) -> Self {
        self.index = index;
        self
    }

    /// Bypass the refresh strategy of the guarded source receiving these params.
    ///
    /// Forcing never bypasses the busy gate: a source already fetching still
    /// ignores the call.
    #[must_use]
    pub const fn forced(mut self) -> Self {
        self.force = true;
        self
    }

    /// Set or clear the force flag.
    #[must_use]
    pub const fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Element index, or [`SourceParams::ALL`].
    #[must_use]
    pub const fn index(&self) -> i64 {
        self.index
    }

    /// Whether the refresh strategy should be bypassed.
    #[must_use]
    pub const fn is_forced(&self) -> bool {
        self.force
    }

    /// Downcast the payload to `P`.
    #[must_use]
    pub fn payload<P: Any>(&self) -> Option<&P> {
        self.payload.as_deref().and_then(|p| p.downcast_ref::<P>())
    }

    /// The raw shared payload, if any.
    #[must_use]
    pub fn shared_payload(&self) -> Option<&Arc<dyn Any + Send + Sync>> {
        self.payload.as_ref()
    }

    /// True when these are the default parameters.
    #[must_use]
    pub const fn is_default(&self) -> bool {
        self.index == Self::ALL && self.payload.is_none() && !self.force
    }
}

impl Default for SourceParams {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SourceParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceParams")
            .field("index", &self.index)
            .field("payload", &self.payload.as_ref().map(|_| ".."))
            .field("force", &self.force)
            .finish()
    }
}

/// Parameter pair for a parallel composition: one set per leg.
///
/// Attach it as the payload of the params passed to a parallel composite; when
/// absent, both legs receive the composite's params unchanged.
#[derive(Debug, Clone, Default)]
pub struct ParallelParams {
    /// Params for the first leg.
    pub first: SourceParams,
    /// Params for the second leg.
    pub second: SourceParams,
}

impl ParallelParams {
    /// Pair two sets of params.
    #[must_use]
    pub const fn new(first: SourceParams, second: SourceParams) -> Self {
        Self { first, second }
    }

    /// Wrap this pair into the params of the composite call.
    #[must_use]
    pub fn into_params(self) -> SourceParams {
        SourceParams::new().with_payload(self)
    }
}
