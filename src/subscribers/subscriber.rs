//! # Event subscriber trait.
//!
//! [`Subscribe`] is the extension point for observing runtime events: reports
//! owed to the orchestrator, dispatch diagnostics, resource diagnostics.
//!
//! Each subscriber gets its own bounded queue and worker task (see
//! [`SubscriberSet`](super::SubscriberSet)). A full queue drops the event for
//! that subscriber only and publishes `EventKind::SubscriberOverflow`.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use hostvisor::{Event, EventKind, Subscribe};
//!
//! struct ReportForwarder;
//!
//! #[async_trait]
//! impl Subscribe for ReportForwarder {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind.is_report() {
//!             // send the acknowledgment to the orchestrator
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "report-forwarder" }
//!     fn queue_capacity(&self) -> usize { 4096 }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Runtime event observer.
///
/// Called from a dedicated worker task, never from the dispatcher. Events
/// arrive in bus order. Panics are caught and published as
/// `EventKind::SubscriberPanicked`.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    async fn on_event(&self, event: &Event);

    /// Name used in logs and overflow/panic events.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred queue capacity (clamped to at least 1).
    fn queue_capacity(&self) -> usize {
        1024
    }
}
