//! # Relaunch merger.
//!
//! ## Precedence
//! ```text
//! pending \ incoming │ remote                               │ local
//! ───────────────────┼──────────────────────────────────────┼──────────────────
//! none               │ new request, flags from the command  │ new request, flags from the record
//! remote             │ merge; not_resumed/window from new;  │ merge deltas only
//!                    │ acknowledge the new request now      │
//! local              │ merge; only_local=false; remote      │ merge deltas only
//!                    │ not_resumed/window win; final ack    │
//! ```
//!
//! Deltas are: results and signals (appended in arrival order), the
//! configuration-change mask (OR), the newest `new_config`, the latest
//! `override_config` and the latest stamp.

use std::collections::HashMap;

use crate::commands::{Origin, RelaunchCommand};
use crate::components::{ComponentToken, Configuration, Payload};

/// Record fields captured when a local request opens a merge window.
#[derive(Debug, Clone, Default)]
pub struct RelaunchDefaults {
    /// The record is not currently resumed.
    pub not_resumed: bool,
    /// The record's current override configuration.
    pub override_config: Option<Configuration>,
}

/// Aggregated pending relaunch for one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaunchRequest {
    /// Target component.
    pub token: ComponentToken,
    /// Latest stamp among merged requests.
    pub seq: u64,
    /// Merged results, in arrival order.
    pub results: Vec<Payload>,
    /// Merged signals, in arrival order.
    pub signals: Vec<Payload>,
    /// OR of all merged masks.
    pub config_changes: u32,
    /// Recreate to Paused instead of Resumed.
    pub starts_not_resumed: bool,
    /// Newest process configuration among merged requests.
    pub new_config: Option<Configuration>,
    /// Override configuration to install on the record.
    pub override_config: Option<Configuration>,
    /// Window preservation hint.
    pub preserve_window: bool,
    /// No orchestrator acknowledgment is owed.
    pub only_local: bool,
    /// Number of requests folded into this one.
    pub merged: u32,
}

impl RelaunchRequest {
    fn open(cmd: RelaunchCommand, seq: u64, origin: Origin, defaults: RelaunchDefaults) -> Self {
        let local = origin == Origin::Local;
        let (starts_not_resumed, override_config) = if local {
            (defaults.not_resumed, cmd.override_config.or(defaults.override_config))
        } else {
            (cmd.not_resumed, cmd.override_config)
        };
        Self {
            token: cmd.token,
            seq,
            results: cmd.results,
            signals: cmd.signals,
            config_changes: cmd.config_changes,
            starts_not_resumed,
            new_config: cmd.new_config,
            override_config,
            preserve_window: cmd.preserve_window,
            only_local: local,
            merged: 1,
        }
    }

    fn absorb(&mut self, cmd: RelaunchCommand, seq: u64, origin: Origin) {
        self.seq = self.seq.max(seq);
        self.results.extend(cmd.results);
        self.signals.extend(cmd.signals);
        self.config_changes |= cmd.config_changes;
        if let Some(config) = cmd.new_config
            && config.is_newer_than(self.new_config.as_ref())
        {
            self.new_config = Some(config);
        }
        if cmd.override_config.is_some() {
            self.override_config = cmd.override_config;
        }
        if origin == Origin::Remote {
            self.only_local = false;
            self.starts_not_resumed = cmd.not_resumed;
            self.preserve_window = cmd.preserve_window;
        }
        self.merged += 1;
    }
}

/// Result of [`RelaunchMerger::request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// First request for the token; the caller must queue the physical relaunch.
    Scheduled,
    /// Folded into the pending request.
    Merged {
        /// Acknowledge this request to the orchestrator immediately.
        ack_now: bool,
    },
}

/// Pending relaunch requests, keyed by token.
#[derive(Debug, Default)]
pub struct RelaunchMerger {
    pending: HashMap<ComponentToken, RelaunchRequest>,
}

impl RelaunchMerger {
    /// Creates an empty merger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens or extends the merge window for `cmd.token`.
    pub fn request(
        &mut self,
        cmd: RelaunchCommand,
        seq: u64,
        origin: Origin,
        defaults: RelaunchDefaults,
    ) -> MergeOutcome {
        match self.pending.get_mut(&cmd.token) {
            None => {
                self.pending
                    .insert(cmd.token, RelaunchRequest::open(cmd, seq, origin, defaults));
                MergeOutcome::Scheduled
            }
            Some(pending) => {
                let ack_now = origin == Origin::Remote && !pending.only_local;
                pending.absorb(cmd, seq, origin);
                MergeOutcome::Merged { ack_now }
            }
        }
    }

    /// Closes the merge window and returns the aggregated request.
    pub fn take(&mut self, token: ComponentToken) -> Option<RelaunchRequest> {
        self.pending.remove(&token)
    }

    /// Pending request for `token`, if any.
    pub fn pending(&self, token: ComponentToken) -> Option<&RelaunchRequest> {
        self.pending.get(&token)
    }

    /// Number of open merge windows.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True if no relaunch is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: ComponentToken = ComponentToken::new(2);

    fn payload(name: &str) -> Payload {
        Payload::new(name, Vec::new())
    }

    #[test]
    fn second_request_merges_masks_and_payloads() {
        let mut merger = RelaunchMerger::new();
        let first = RelaunchCommand::new(T)
            .with_config_changes(0x1)
            .with_results(vec![payload("a")])
            .with_signals(vec![payload("s1")]);
        let second = RelaunchCommand::new(T)
            .with_config_changes(0x4)
            .with_results(vec![payload("b"), payload("c")]);

        assert_eq!(
            merger.request(first, 3, Origin::Remote, RelaunchDefaults::default()),
            MergeOutcome::Scheduled
        );
        assert_eq!(
            merger.request(second, 4, Origin::Remote, RelaunchDefaults::default()),
            MergeOutcome::Merged { ack_now: true }
        );
        assert_eq!(merger.len(), 1);

        let req = merger.take(T).unwrap();
        assert_eq!(req.config_changes, 0x5);
        assert_eq!(req.results, vec![payload("a"), payload("b"), payload("c")]);
        assert_eq!(req.signals, vec![payload("s1")]);
        assert_eq!(req.seq, 4);
        assert_eq!(req.merged, 2);
        assert!(merger.is_empty());
    }

    #[test]
    fn local_request_captures_record_defaults() {
        let mut merger = RelaunchMerger::new();
        let defaults = RelaunchDefaults {
            not_resumed: true,
            override_config: Some(Configuration::new(7)),
        };
        merger.request(RelaunchCommand::new(T), 1, Origin::Local, defaults);

        let req = merger.pending(T).unwrap();
        assert!(req.only_local);
        assert!(req.starts_not_resumed);
        assert_eq!(req.override_config, Some(Configuration::new(7)));
    }

    #[test]
    fn remote_into_local_clears_only_local_without_immediate_ack() {
        let mut merger = RelaunchMerger::new();
        let defaults = RelaunchDefaults {
            not_resumed: true,
            override_config: None,
        };
        merger.request(RelaunchCommand::new(T), 1, Origin::Local, defaults);
        let outcome = merger.request(
            RelaunchCommand::new(T).with_config_changes(0x2),
            2,
            Origin::Remote,
            RelaunchDefaults::default(),
        );

        assert_eq!(outcome, MergeOutcome::Merged { ack_now: false });
        let req = merger.take(T).unwrap();
        assert!(!req.only_local);
        assert!(!req.starts_not_resumed, "remote not_resumed wins");
        assert_eq!(req.config_changes, 0x2);
    }

    #[test]
    fn local_into_remote_keeps_remote_flags() {
        let mut merger = RelaunchMerger::new();
        merger.request(
            RelaunchCommand::new(T).not_resumed().preserve_window(),
            5,
            Origin::Remote,
            RelaunchDefaults::default(),
        );
        let outcome = merger.request(
            RelaunchCommand::new(T).with_config_changes(0x8),
            6,
            Origin::Local,
            RelaunchDefaults::default(),
        );

        assert_eq!(outcome, MergeOutcome::Merged { ack_now: false });
        let req = merger.take(T).unwrap();
        assert!(!req.only_local);
        assert!(req.starts_not_resumed);
        assert!(req.preserve_window);
        assert_eq!(req.config_changes, 0x8);
        assert_eq!(req.seq, 6);
    }

    #[test]
    fn only_newer_configuration_replaces_merged_one() {
        let mut merger = RelaunchMerger::new();
        merger.request(
            RelaunchCommand::new(T).with_new_config(Configuration::new(9)),
            1,
            Origin::Remote,
            RelaunchDefaults::default(),
        );
        merger.request(
            RelaunchCommand::new(T).with_new_config(Configuration::new(8)),
            2,
            Origin::Remote,
            RelaunchDefaults::default(),
        );
        assert_eq!(merger.take(T).unwrap().new_config, Some(Configuration::new(9)));
    }
}
