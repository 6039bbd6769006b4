//! # Runtime events emitted by the dispatcher and its side-registries.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Reports**: acknowledgments owed to the orchestrator boundary
//! - **Dispatch diagnostics**: stale/unknown commands, rejected transitions, failures
//! - **Relaunch / resource diagnostics**: merges, deferred removals
//! - **Runtime events**: subscriber health and shutdown
//!
//! The [`Event`] struct carries additional metadata such as the component
//! token, the command sequence the event relates to, and reasons.
//!
//! ## Ordering guarantees
//! Each event gets a bus-wide sequence number (`seq`) when published.
//! Reports for a single component are published in the order the transitions ran.
//!
//! ## Example
//! ```rust
//! use hostvisor::{ComponentToken, Event, EventKind};
//!
//! let ev = Event::new(EventKind::Failed)
//!     .with_token(ComponentToken::new(7))
//!     .with_reason("boom")
//!     .with_command_seq(3);
//!
//! assert!(ev.kind.is_report());
//! assert_eq!(ev.token, Some(ComponentToken::new(7)));
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! ```

use std::sync::Arc;
use std::time::SystemTime;

use crate::components::{ComponentToken, SavedState};
use crate::lifecycle::LifecycleState;
use crate::resources::ResourceHandle;

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    // === Reports (orchestrator boundary) ===
    /// Component resumed (`reportResumed`).
    ///
    /// Sets: `token`, `command_seq`, `state`
    Resumed,

    /// Component paused (`reportPaused`).
    ///
    /// Sets: `token`, `command_seq`, `state`
    Paused,

    /// Component stopped (`reportStopped`).
    ///
    /// Sets: `token`, `command_seq`, `state`, `saved_state` (if captured)
    Stopped,

    /// Component destroyed and its record removed (`reportDestroyed`).
    ///
    /// Sets: `token`, `command_seq`
    Destroyed,

    /// Remote relaunch request answered (`reportRelaunched`).
    ///
    /// Sets: `token`, `command_seq`, `config_changes`
    Relaunched,

    /// Resumed component observed an empty queue (`reportIdle`).
    ///
    /// Sets: `token`
    Idle,

    /// Component failed fatally and is being torn down.
    ///
    /// Sets: `token`, `command_seq`, `reason`
    Failed,

    // === Dispatch diagnostics ===
    /// Record created for a previously unseen token.
    ///
    /// Sets: `token`, `command_seq`
    Launched,

    /// Command discarded: its sequence is older than the record's.
    ///
    /// Sets: `token`, `command_seq` (stamped), `reason` (command label)
    CommandStale,

    /// Command dropped: no record for its token.
    ///
    /// Sets: `token`, `reason` (command label)
    TargetNotFound,

    /// Launch dropped: token live or already destroyed, or invalid initial state.
    ///
    /// Sets: `token`, `reason`
    LaunchRejected,

    /// Command dropped: no transition path for the component kind/state.
    ///
    /// Sets: `token`, `state`, `reason`
    TransitionRejected,

    /// Component returned from a hooked callback without calling through.
    ///
    /// Sets: `token`, `reason`
    ContractViolation,

    /// A recoverable callback error was accepted by the exception hook.
    ///
    /// Sets: `token`, `reason`
    TransitionRecovered,

    /// A newer process configuration was applied.
    ///
    /// Sets: `reason` (configuration seq)
    ConfigurationApplied,

    /// A configuration not newer than the current one was dropped.
    ///
    /// Sets: `reason` (configuration seq)
    ConfigurationStale,

    // === Relaunch diagnostics ===
    /// First relaunch request for a token; a relaunch is queued.
    ///
    /// Sets: `token`, `command_seq`, `config_changes`
    RelaunchScheduled,

    /// Relaunch request merged into the pending one.
    ///
    /// Sets: `token`, `command_seq`, `config_changes` (merged mask)
    RelaunchMerged,

    /// Physical relaunch completed.
    ///
    /// Sets: `token`, `command_seq`, `config_changes`, `state`
    RelaunchPerformed,

    /// Relaunch abandoned (stale, finishing, or component failed).
    ///
    /// Sets: `token`, `reason`
    RelaunchAborted,

    // === Resource diagnostics ===
    /// Last reference dropped; removal deferred.
    ///
    /// Sets: `handle`
    ResourceRemovalScheduled,

    /// Pending removal cancelled by a new acquisition.
    ///
    /// Sets: `handle`
    ResourceRemovalCanceled,

    /// Deferred removal completed; remote notified.
    ///
    /// Sets: `handle`
    ResourceRemoved,

    /// Deferred removal found the entry re-acquired and did nothing.
    ///
    /// Sets: `handle`
    ResourceRemovalAborted,

    /// Registry logic error (double release, duplicate pending removal).
    ///
    /// Sets: `handle`, `reason`
    ResourceError,

    // === Runtime events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets: `subscriber`, `reason`
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `subscriber`, `reason`
    SubscriberOverflow,

    /// Shutdown requested.
    ShutdownRequested,

    /// Dispatcher loop exited.
    ///
    /// Sets: `reason` (live record count)
    DispatcherStopped,
}

impl EventKind {
    /// True for acknowledgments owed to the orchestrator boundary.
    #[inline]
    pub fn is_report(self) -> bool {
        matches!(
            self,
            EventKind::Resumed
                | EventKind::Paused
                | EventKind::Stopped
                | EventKind::Destroyed
                | EventKind::Relaunched
                | EventKind::Idle
                | EventKind::Failed
        )
    }
}

/// Runtime event with optional metadata.
///
/// - `seq`: bus sequence, assigned on publish
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Bus-wide sequence number (0 until published).
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Component the event relates to.
    pub token: Option<ComponentToken>,
    /// Lifecycle sequence of the command that produced the event.
    pub command_seq: Option<u64>,
    /// Record state after the event.
    pub state: Option<LifecycleState>,
    /// Human-readable reason (errors, labels, details).
    pub reason: Option<Arc<str>>,
    /// Resource handle, for resource diagnostics.
    pub handle: Option<ResourceHandle>,
    /// Configuration-change mask.
    pub config_changes: Option<u32>,
    /// Saved instance state carried by `Stopped`.
    pub saved_state: Option<Arc<SavedState>>,
    /// Subscriber name, for subscriber diagnostics.
    pub subscriber: Option<&'static str>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: 0,
            at: SystemTime::now(),
            kind,
            token: None,
            command_seq: None,
            state: None,
            reason: None,
            handle: None,
            config_changes: None,
            saved_state: None,
            subscriber: None,
        }
    }

    /// Attaches a component token.
    #[inline]
    pub fn with_token(mut self, token: ComponentToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Attaches the command sequence.
    #[inline]
    pub fn with_command_seq(mut self, seq: u64) -> Self {
        self.command_seq = Some(seq);
        self
    }

    /// Attaches the record state.
    #[inline]
    pub fn with_state(mut self, state: LifecycleState) -> Self {
        self.state = Some(state);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a resource handle.
    #[inline]
    pub fn with_handle(mut self, handle: ResourceHandle) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Attaches a configuration-change mask.
    #[inline]
    pub fn with_config_changes(mut self, mask: u32) -> Self {
        self.config_changes = Some(mask);
        self
    }

    /// Attaches saved instance state.
    #[inline]
    pub fn with_saved_state(mut self, state: SavedState) -> Self {
        self.saved_state = Some(Arc::new(state));
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        let mut ev = Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"));
        ev.subscriber = Some(subscriber);
        ev
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        let mut ev = Event::new(EventKind::SubscriberPanicked).with_reason(info);
        ev.subscriber = Some(subscriber);
        ev
    }
}
