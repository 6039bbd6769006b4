//! # Command data model.
//!
//! [`Command`] is the inbound, one-way vocabulary of the orchestrator boundary.
//! `Instruction` extends it with work the runtime schedules for itself on the
//! same queue (physical relaunches, deferred resource removals, snapshots).

use tokio::sync::oneshot;

use crate::components::{ComponentSpec, ComponentToken, Configuration, Payload};
use crate::core::RecordSnapshot;
use crate::lifecycle::LifecycleState;
use crate::resources::RemovalTicket;

/// Lifecycle command addressed to the runtime.
///
/// `Resume`, `Pause` and `Stop` carry the orchestrator's sequence number;
/// the other targeted commands are stamped by [`RuntimeHandle::submit`](crate::RuntimeHandle::submit).
#[derive(Debug, Clone)]
pub enum Command {
    /// Create a record for an unseen token and drive it to `initial_state`.
    Launch {
        /// New component token.
        token: ComponentToken,
        /// What to instantiate.
        spec: ComponentSpec,
        /// Target state after launch (not `Destroyed`).
        initial_state: LifecycleState,
        /// Configuration the orchestrator launched with.
        config: Option<Configuration>,
    },
    /// Bring the component to the foreground.
    Resume {
        /// Target component.
        token: ComponentToken,
        /// Orchestrator sequence.
        seq: u64,
        /// Navigation moves forward (hint only).
        is_forward: bool,
    },
    /// Take the component out of the foreground.
    Pause {
        /// Target component.
        token: ComponentToken,
        /// Orchestrator sequence.
        seq: u64,
        /// The component is being finished.
        finishing: bool,
        /// Call `on_user_leaving` before pausing.
        user_leaving: bool,
        /// Configuration-change mask to record.
        config_changes: u32,
        /// Suppress the `Paused` report.
        dont_report: bool,
    },
    /// Stop the component, pausing it first if needed.
    Stop {
        /// Target component.
        token: ComponentToken,
        /// Orchestrator sequence.
        seq: u64,
        /// Keep the component's window shown.
        show_window: bool,
        /// Configuration-change mask to record.
        config_changes: u32,
    },
    /// Tear the component down and drop its record.
    Destroy {
        /// Target component.
        token: ComponentToken,
        /// The component is being finished.
        finishing: bool,
        /// Configuration-change mask to record.
        config_changes: u32,
    },
    /// Destroy and recreate the component (merged with pending relaunches).
    Relaunch(RelaunchCommand),
    /// Cross-component results for the component.
    DeliverResults {
        /// Target component.
        token: ComponentToken,
        /// Results, in arrival order.
        results: Vec<Payload>,
    },
    /// Cross-component signals for the component.
    DeliverSignals {
        /// Target component.
        token: ComponentToken,
        /// Signals, in arrival order.
        signals: Vec<Payload>,
    },
    /// Process-wide configuration change (no target).
    ConfigurationChanged {
        /// New configuration; dropped unless newer than the current one.
        config: Configuration,
    },
}

impl Command {
    /// Target token, `None` for global commands.
    pub fn token(&self) -> Option<ComponentToken> {
        match self {
            Command::Launch { token, .. }
            | Command::Resume { token, .. }
            | Command::Pause { token, .. }
            | Command::Stop { token, .. }
            | Command::Destroy { token, .. }
            | Command::DeliverResults { token, .. }
            | Command::DeliverSignals { token, .. } => Some(*token),
            Command::Relaunch(cmd) => Some(cmd.token),
            Command::ConfigurationChanged { .. } => None,
        }
    }

    /// Sequence supplied by the orchestrator, if the command carries one.
    pub fn carried_seq(&self) -> Option<u64> {
        match self {
            Command::Resume { seq, .. } | Command::Pause { seq, .. } | Command::Stop { seq, .. } => {
                Some(*seq)
            }
            _ => None,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Command::Launch { .. } => "launch",
            Command::Resume { .. } => "resume",
            Command::Pause { .. } => "pause",
            Command::Stop { .. } => "stop",
            Command::Destroy { .. } => "destroy",
            Command::Relaunch(_) => "relaunch",
            Command::DeliverResults { .. } => "deliver_results",
            Command::DeliverSignals { .. } => "deliver_signals",
            Command::ConfigurationChanged { .. } => "configuration_changed",
        }
    }
}

/// Destroy-and-recreate request.
///
/// ## Example
/// ```rust
/// use hostvisor::{ComponentToken, Payload, RelaunchCommand};
///
/// let cmd = RelaunchCommand::new(ComponentToken::new(2))
///     .with_config_changes(0x1)
///     .with_results(vec![Payload::new("picked", b"a".to_vec())]);
/// assert_eq!(cmd.config_changes, 0x1);
/// assert!(!cmd.not_resumed);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelaunchCommand {
    /// Target component.
    pub token: ComponentToken,
    /// Results to deliver to the recreated instance.
    pub results: Vec<Payload>,
    /// Signals to deliver to the recreated instance.
    pub signals: Vec<Payload>,
    /// Configuration-change mask.
    pub config_changes: u32,
    /// Recreate to Paused instead of Resumed.
    pub not_resumed: bool,
    /// New process configuration.
    pub new_config: Option<Configuration>,
    /// Replacement per-component override configuration.
    pub override_config: Option<Configuration>,
    /// Keep the window across the relaunch (hint).
    pub preserve_window: bool,
}

impl RelaunchCommand {
    /// Creates an empty relaunch request for `token`.
    pub fn new(token: ComponentToken) -> Self {
        Self {
            token,
            ..Self::default()
        }
    }

    /// Sets the results delta.
    pub fn with_results(mut self, results: Vec<Payload>) -> Self {
        self.results = results;
        self
    }

    /// Sets the signals delta.
    pub fn with_signals(mut self, signals: Vec<Payload>) -> Self {
        self.signals = signals;
        self
    }

    /// Sets the configuration-change mask.
    pub fn with_config_changes(mut self, mask: u32) -> Self {
        self.config_changes = mask;
        self
    }

    /// Requests a recreate that stops at Paused.
    pub fn not_resumed(mut self) -> Self {
        self.not_resumed = true;
        self
    }

    /// Sets the new process configuration.
    pub fn with_new_config(mut self, config: Configuration) -> Self {
        self.new_config = Some(config);
        self
    }

    /// Sets the override configuration.
    pub fn with_override_config(mut self, config: Configuration) -> Self {
        self.override_config = Some(config);
        self
    }

    /// Marks the window as preserved.
    pub fn preserve_window(mut self) -> Self {
        self.preserve_window = true;
        self
    }
}

/// Where a command came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Orchestrator boundary.
    Remote,
    /// The runtime itself or a component.
    Local,
}

/// Unit of work executed by the dispatcher.
#[derive(Debug)]
pub(crate) enum Instruction {
    Command(Command),
    /// Run the merged relaunch pending for the token.
    PerformRelaunch(ComponentToken),
    /// Deferred resource removal whose window elapsed.
    CompleteRemoval(RemovalTicket),
    /// Snapshot query; answered between commands.
    Inspect(oneshot::Sender<Vec<RecordSnapshot>>),
}

/// Queue entry: instruction plus its stamp.
#[derive(Debug)]
pub(crate) struct Envelope {
    pub(crate) seq: u64,
    pub(crate) origin: Origin,
    pub(crate) instruction: Instruction,
}

impl Envelope {
    pub(crate) fn new(seq: u64, origin: Origin, instruction: Instruction) -> Self {
        Self {
            seq,
            origin,
            instruction,
        }
    }
}
