//! # Per-component lifecycle record.
//!
//! [`ComponentRecord`] is the authoritative local state of one component.
//! It is owned by the [`RecordStore`](super::RecordStore) and only touched on
//! the dispatcher task. [`RecordSnapshot`] is its read-only, cloneable view.

use crate::components::{Component, ComponentKind, ComponentSpec, ComponentToken, Configuration, Payload, SavedState};
use crate::lifecycle::LifecycleState;

/// Mutable lifecycle record.
pub(crate) struct ComponentRecord {
    pub(crate) token: ComponentToken,
    pub(crate) spec: ComponentSpec,
    /// Live instance; `None` before Create and after Destroy.
    pub(crate) instance: Option<Box<dyn Component>>,
    pub(crate) state: LifecycleState,
    /// Highest stamped sequence applied to this record.
    pub(crate) last_processed_seq: u64,

    pub(crate) pending_config: Option<Configuration>,
    pub(crate) override_config: Option<Configuration>,
    pub(crate) pending_results: Vec<Payload>,
    pub(crate) pending_signals: Vec<Payload>,
    pub(crate) saved_state: Option<SavedState>,
    pub(crate) persistent_state: Option<SavedState>,

    pub(crate) config_changes: u32,
    pub(crate) finishing: bool,
    pub(crate) failed: bool,
    pub(crate) relaunching: bool,
    pub(crate) visible: bool,
    pub(crate) starts_not_resumed: bool,
    pub(crate) only_local_request: bool,
    pub(crate) preserve_window: bool,
    /// Number of instances created for this token.
    pub(crate) launch_count: u32,
}

impl ComponentRecord {
    pub(crate) fn new(token: ComponentToken, spec: ComponentSpec, seq: u64) -> Self {
        Self {
            token,
            spec,
            instance: None,
            state: LifecycleState::Initialized,
            last_processed_seq: seq,
            pending_config: None,
            override_config: None,
            pending_results: Vec::new(),
            pending_signals: Vec::new(),
            saved_state: None,
            persistent_state: None,
            config_changes: 0,
            finishing: false,
            failed: false,
            relaunching: false,
            visible: true,
            starts_not_resumed: false,
            only_local_request: false,
            preserve_window: false,
            launch_count: 0,
        }
    }

    #[inline]
    pub(crate) fn kind(&self) -> ComponentKind {
        self.spec.kind()
    }

    /// Clears per-instance fields before a recreate.
    ///
    /// Saved/persistent state and pending payloads survive; they are handed
    /// to the next instance.
    pub(crate) fn reset_for_recreate(&mut self) {
        self.instance = None;
        self.state = LifecycleState::Initialized;
        self.pending_config = None;
        self.config_changes = 0;
        self.visible = true;
    }

    pub(crate) fn snapshot(&self) -> RecordSnapshot {
        RecordSnapshot {
            token: self.token,
            kind: self.spec.kind(),
            name: self.spec.name().to_owned(),
            state: self.state,
            last_processed_seq: self.last_processed_seq,
            finishing: self.finishing,
            failed: self.failed,
            visible: self.visible,
            config_changes: self.config_changes,
            pending_results: self.pending_results.len(),
            pending_signals: self.pending_signals.len(),
            has_pending_config: self.pending_config.is_some(),
            override_config: self.override_config.clone(),
            has_saved_state: self.saved_state.is_some(),
            has_persistent_state: self.persistent_state.is_some(),
            starts_not_resumed: self.starts_not_resumed,
            only_local_request: self.only_local_request,
            preserve_window: self.preserve_window,
            launch_count: self.launch_count,
        }
    }
}

/// Point-in-time view of a component record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSnapshot {
    /// Component token.
    pub token: ComponentToken,
    /// Component kind.
    pub kind: ComponentKind,
    /// Spec name.
    pub name: String,
    /// Lifecycle state.
    pub state: LifecycleState,
    /// Highest stamped sequence applied.
    pub last_processed_seq: u64,
    /// Being finished.
    pub finishing: bool,
    /// Marked failed (teardown queued).
    pub failed: bool,
    /// Window shown (last Stop's `show_window`).
    pub visible: bool,
    /// Accumulated configuration-change mask of the current instance.
    pub config_changes: u32,
    /// Undelivered results.
    pub pending_results: usize,
    /// Undelivered signals.
    pub pending_signals: usize,
    /// A configuration is parked for the next resume.
    pub has_pending_config: bool,
    /// Per-component override configuration.
    pub override_config: Option<Configuration>,
    /// Instance state saved by the last stop.
    pub has_saved_state: bool,
    /// Persistent state saved by the last stop.
    pub has_persistent_state: bool,
    /// Last relaunch stopped at Paused.
    pub starts_not_resumed: bool,
    /// Last relaunch was local only.
    pub only_local_request: bool,
    /// Last relaunch preserved the window.
    pub preserve_window: bool,
    /// Number of instances created (1 + relaunches).
    pub launch_count: u32,
}
