//! # LogWriter: event renderer for demos.
//!
//! Renders every [`Event`] as one `tracing` record under the
//! `hostvisor::events` target. Reports log at info, failures at warn,
//! everything else at debug.
//!
//! ## Example output
//! ```text
//! INFO hostvisor::events: [Resumed] token=component#1 seq=Some(5) state=Some(Resumed)
//! INFO hostvisor::events: [Relaunched] token=component#1 seq=Some(7) mask=Some(5)
//! WARN hostvisor::events: [Failed] token=component#2 reason="on_resume: boom"
//! ```

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::Subscribe;
use crate::events::{Event, EventKind};

const EVENTS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::events");

/// Subscriber that renders events through `tracing`.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn token(e: &Event) -> String {
    e.token.map_or_else(|| "-".to_string(), |t| t.to_string())
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let reason = e.reason.as_deref().unwrap_or("");
        match e.kind {
            EventKind::Resumed | EventKind::Paused | EventKind::Stopped => {
                info!(target: EVENTS_TARGET, "[{:?}] token={} seq={:?} state={:?}", e.kind, token(e), e.command_seq, e.state);
            }
            EventKind::Destroyed | EventKind::Idle => {
                info!(target: EVENTS_TARGET, "[{:?}] token={} seq={:?}", e.kind, token(e), e.command_seq);
            }
            EventKind::Relaunched | EventKind::RelaunchPerformed => {
                info!(target: EVENTS_TARGET, "[{:?}] token={} seq={:?} mask={:?}", e.kind, token(e), e.command_seq, e.config_changes);
            }
            EventKind::Failed | EventKind::ContractViolation | EventKind::ResourceError => {
                warn!(target: EVENTS_TARGET, "[{:?}] token={} reason={:?}", e.kind, token(e), reason);
            }
            EventKind::SubscriberPanicked | EventKind::SubscriberOverflow => {
                warn!(target: EVENTS_TARGET, "[{:?}] subscriber={} reason={:?}", e.kind, e.subscriber.unwrap_or("unknown"), reason);
            }
            EventKind::ResourceRemovalScheduled
            | EventKind::ResourceRemovalCanceled
            | EventKind::ResourceRemoved
            | EventKind::ResourceRemovalAborted => {
                debug!(target: EVENTS_TARGET, "[{:?}] handle={:?}", e.kind, e.handle);
            }
            _ => {
                debug!(target: EVENTS_TARGET, "[{:?}] token={} seq={:?} reason={:?}", e.kind, token(e), e.command_seq, reason);
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
