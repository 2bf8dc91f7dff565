//! Policies deciding whether a guarded source should actually fetch.

use std::fmt;
use std::time::Duration;

use cascade_types::RefreshPolicy;
use tokio::time::Instant;

/// Decides, per call, whether a guarded source goes to its underlying source.
///
/// `should_refresh` is only consulted while the source is idle, and a `true`
/// answer commits the strategy to the refresh (e.g. a time-based strategy
/// records the timestamp at that moment).
pub trait RefreshStrategy: Send + fmt::Debug {
    /// Whether the next call should fetch.
    fn should_refresh(&mut self) -> bool;

    /// Forget history so the next call fetches.
    fn reset(&mut self);

    /// Called after an accepted fetch failed with a real error.
    fn on_refresh_failed(&mut self) {}
}

/// Fetch on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysRefresh;

impl RefreshStrategy for AlwaysRefresh {
    fn should_refresh(&mut self) -> bool {
        true
    }

    fn reset(&mut self) {}
}

/// Fetch once, then decline until re-armed.
#[derive(Debug, Clone)]
pub struct OneShotRefresh {
    armed: bool,
}

impl OneShotRefresh {
    /// A strategy that allows exactly one refresh.
    #[must_use]
    pub const fn new() -> Self {
        Self { armed: true }
    }

    /// Arm or disarm the next refresh.
    pub const fn set_should_refresh(&mut self, armed: bool) {
        self.armed = armed;
    }
}

impl Default for OneShotRefresh {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshStrategy for OneShotRefresh {
    fn should_refresh(&mut self) -> bool {
        std::mem::replace(&mut self.armed, false)
    }

    fn reset(&mut self) {
        self.armed = true;
    }
}

/// Fetch when nothing was fetched yet or when `interval` has elapsed since the
/// last accepted fetch.
///
/// Time is read from [`tokio::time::Instant`], so a paused test clock drives it.
#[derive(Debug, Clone)]
pub struct TimeBasedRefresh {
    interval: Duration,
    last_update: Option<Instant>,
}

impl TimeBasedRefresh {
    /// A strategy refreshing at most once per `interval`.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_update: None,
        }
    }

    /// The configured interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Make the next call fetch regardless of elapsed time.
    pub const fn force_refresh(&mut self) {
        self.last_update = None;
    }
}

impl RefreshStrategy for TimeBasedRefresh {
    fn should_refresh(&mut self) -> bool {
        let now = Instant::now();
        let due = self
            .last_update
            .is_none_or(|last| now.duration_since(last) >= self.interval);
        if due {
            self.last_update = Some(now);
        }
        due
    }

    fn reset(&mut self) {
        self.force_refresh();
    }

    fn on_refresh_failed(&mut self) {
        self.force_refresh();
    }
}

/// Build the strategy described by a serializable policy.
#[must_use]
pub fn strategy_for(policy: RefreshPolicy) -> Box<dyn RefreshStrategy> {
    match policy {
        RefreshPolicy::OneShot => Box::new(OneShotRefresh::new()),
        RefreshPolicy::TimeBased { interval } => Box::new(TimeBasedRefresh::new(interval)),
        _ => Box::new(AlwaysRefresh),
    }
}
