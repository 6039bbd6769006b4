//! # Event subscribers.
//!
//! ```text
//! Dispatcher ── publish(Event) ──► Bus ──► SubscriberSet::forward()
//!                                              │
//!                                   ┌──────────┼──────────────┐
//!                                   ▼          ▼              ▼
//!                           LifecycleTracker  LogWriter   user Subscribe impls
//! ```
//!
//! - [`Subscribe`]: extension trait
//! - [`SubscriberSet`]: per-subscriber queues, panic isolation, overflow reporting
//! - [`LifecycleTracker`]: last reported state per component (always installed)
//! - [`LogWriter`]: `tracing` renderer (feature `logging`)

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscriber;
mod tracker;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
pub use tracker::LifecycleTracker;
