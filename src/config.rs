//! # Global runtime configuration.
//!
//! Provides [`Config`] centralized settings for the hostvisor runtime.
//!
//! ## Sentinel values
//! - `removal_delay = 0s` → deferred removals complete on the next dispatcher turn
//! - `grace = 0s` → shutdown does not wait for the dispatcher to drain

use std::time::Duration;

/// Global configuration for the runtime context.
///
/// ## Field semantics
/// - `grace`: Maximum wait for the dispatcher to stop during shutdown
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped by Bus)
/// - `removal_delay`: Delay between the last resource release and its removal
/// - `idle_reports`: Whether resumed components are reported idle once the queue drains
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum time to wait for the dispatcher to stop before giving up.
    pub grace: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` events will
    /// receive `Lagged` and skip older items. Minimum value is 1.
    pub bus_capacity: usize,

    /// Window during which a resource whose counts reached zero can be
    /// re-acquired without a new remote round-trip.
    pub removal_delay: Duration,

    /// Publish `EventKind::Idle` for resumed components when the queue drains.
    pub idle_reports: bool,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns the removal delay as an `Option`.
    ///
    /// - `None` → complete removals on the next dispatcher turn
    /// - `Some(d)` → wait `d` before enqueueing the completion
    #[inline]
    pub fn deferred_removal(&self) -> Option<Duration> {
        if self.removal_delay == Duration::ZERO {
            None
        } else {
            Some(self.removal_delay)
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `grace = 10s`
    /// - `bus_capacity = 1024`
    /// - `removal_delay = 1s`
    /// - `idle_reports = true`
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(10),
            bus_capacity: 1024,
            removal_delay: Duration::from_secs(1),
            idle_reports: true,
        }
    }
}
