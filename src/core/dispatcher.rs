//! # Command dispatcher.
//!
//! Single consumer of the runtime queue. Executes one [`Envelope`] at a time,
//! to completion, on one task; handlers never await and never wait on another
//! command (follow-up work is enqueued at the tail).
//!
//! ## Per-command flow
//! ```text
//! Envelope{seq, origin, instruction}
//!     │
//!     ├─ checkout(token) ── missing ──► TargetNotFound (Launch creates instead)
//!     ├─ seq < last_processed_seq ────► CommandStale (no side effects, record untouched)
//!     ├─ last_processed_seq = seq
//!     ├─ path_to(target) ── invalid ──► TransitionRejected
//!     ├─ LifecycleMachine::run(steps) ─ error ─► fail(): Failed report, local Destroy queued
//!     └─ reports ──► Bus; checkin(record)
//! ```
//!
//! ## Rules
//! - Each record is checked out of the [`RecordStore`] while its command runs
//! - A failing component is isolated: the queue keeps going
//! - Idle reports for resumed components are flushed when the queue drains
//! - A relaunch is stale-checked when its command is admitted; the deferred
//!   `PerformRelaunch` only moves the stamp forward
//! - Every abandoned relaunch that owes the orchestrator an answer still
//!   reports `Relaunched`

use std::mem;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::record::ComponentRecord;
use super::store::RecordStore;
use crate::commands::{Command, Envelope, Instruction, Origin, RelaunchCommand, RuntimeHandle};
use crate::components::{ComponentSpec, ComponentToken, Configuration, ExceptionHook, FactoryRef, Payload};
use crate::error::TransitionError;
use crate::events::{Bus, Event, EventKind};
use crate::lifecycle::{LifecycleMachine, LifecycleState, Progress, Step};
use crate::relaunch::{MergeOutcome, RelaunchDefaults, RelaunchMerger, RelaunchRequest};
use crate::resources::Resources;

/// Tracing target for dispatcher diagnostics.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

pub(crate) struct Dispatcher {
    rx: mpsc::UnboundedReceiver<Envelope>,
    handle: RuntimeHandle,
    bus: Bus,
    store: RecordStore,
    merger: RelaunchMerger,
    factory: FactoryRef,
    resources: Resources,
    exception_hook: Option<Arc<dyn ExceptionHook>>,
    /// Current process configuration.
    config: Option<Configuration>,
    /// Tokens owed an idle report once the queue drains.
    idle: Vec<ComponentToken>,
    idle_reports: bool,
}

impl Dispatcher {
    pub(crate) fn new(
        rx: mpsc::UnboundedReceiver<Envelope>,
        handle: RuntimeHandle,
        bus: Bus,
        factory: FactoryRef,
        resources: Resources,
        exception_hook: Option<Arc<dyn ExceptionHook>>,
        idle_reports: bool,
    ) -> Self {
        Self {
            rx,
            handle,
            bus,
            store: RecordStore::new(),
            merger: RelaunchMerger::new(),
            factory,
            resources,
            exception_hook,
            config: None,
            idle: Vec::new(),
            idle_reports,
        }
    }

    /// Processes the queue until `token` is cancelled, then tears down
    /// every live component.
    pub(crate) async fn run(mut self, token: CancellationToken) {
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                next = self.rx.recv() => {
                    let Some(envelope) = next else { break };
                    self.dispatch(envelope);
                    if self.rx.is_empty() {
                        self.flush_idle();
                    }
                }
            }
        }
        self.rx.close();

        let live = self.store.len();
        for token in self.store.tokens() {
            if let Some(mut record) = self.store.checkout(token) {
                record.finishing = true;
                let seq = record.last_processed_seq;
                self.teardown(record, seq);
            }
        }
        info!(target: DISPATCH_TARGET, live, "dispatcher stopped");
        self.bus
            .publish(Event::new(EventKind::DispatcherStopped).with_reason(format!("live={live}")));
    }

    fn dispatch(&mut self, envelope: Envelope) {
        let Envelope {
            seq,
            origin,
            instruction,
        } = envelope;
        match instruction {
            Instruction::Command(command) => self.on_command(seq, origin, command),
            Instruction::PerformRelaunch(token) => self.perform_relaunch(token),
            Instruction::CompleteRemoval(ticket) => {
                self.resources.complete_removal(ticket);
            }
            Instruction::Inspect(reply) => {
                let _ = reply.send(self.store.snapshots());
            }
        }
    }

    fn on_command(&mut self, seq: u64, origin: Origin, command: Command) {
        debug!(target: DISPATCH_TARGET, command = command.as_label(), seq, ?origin, token = ?command.token(), "dispatching");
        match command {
            Command::Launch {
                token,
                spec,
                initial_state,
                config,
            } => self.launch(seq, token, spec, initial_state, config),
            Command::Resume {
                token, is_forward, ..
            } => self.resume(seq, token, is_forward),
            Command::Pause {
                token,
                finishing,
                user_leaving,
                config_changes,
                dont_report,
                ..
            } => self.pause(seq, token, finishing, user_leaving, config_changes, dont_report),
            Command::Stop {
                token,
                show_window,
                config_changes,
                ..
            } => self.stop(seq, token, show_window, config_changes),
            Command::Destroy {
                token,
                finishing,
                config_changes,
            } => self.destroy(seq, token, finishing, config_changes),
            Command::Relaunch(cmd) => self.relaunch(seq, origin, cmd),
            Command::DeliverResults { token, results } => self.deliver(seq, token, results, false),
            Command::DeliverSignals { token, signals } => self.deliver(seq, token, signals, true),
            Command::ConfigurationChanged { config } => self.apply_process_config(config),
        }
    }

    // ---- command handlers ----

    fn launch(
        &mut self,
        seq: u64,
        token: ComponentToken,
        spec: ComponentSpec,
        initial_state: LifecycleState,
        config: Option<Configuration>,
    ) {
        if self.store.is_taken(token) {
            let reason = if self.store.is_tombstoned(token) {
                "token already destroyed"
            } else {
                "token already live"
            };
            self.reject_launch(token, reason);
            return;
        }
        let steps = match LifecycleState::launch_path(initial_state, spec.kind()) {
            Ok(steps) => steps,
            Err(err) => {
                self.reject_launch(token, &err.to_string());
                return;
            }
        };
        if let Some(config) = config
            && config.is_newer_than(self.config.as_ref())
        {
            self.apply_process_config(config);
        }

        let mut record = ComponentRecord::new(token, spec, seq);
        record.starts_not_resumed = initial_state == LifecycleState::Paused;
        info!(target: DISPATCH_TARGET, %token, name = record.spec.name(), ?initial_state, seq, "launching component");
        self.bus.publish(
            Event::new(EventKind::Launched)
                .with_token(token)
                .with_command_seq(seq),
        );

        match self.drive(&mut record, &steps) {
            Ok(()) => {
                if record.state == LifecycleState::Resumed {
                    self.report(EventKind::Resumed, &record, seq);
                    self.queue_idle(token);
                }
                self.store.checkin(record);
            }
            Err(err) => self.fail(record, err, seq, false),
        }
    }

    fn resume(&mut self, seq: u64, token: ComponentToken, is_forward: bool) {
        let Some(mut record) = self.admit(token, seq, "resume") else {
            return;
        };
        if record.finishing {
            self.reject(&record, "resume", "component is finishing");
            self.store.checkin(record);
            return;
        }
        let Some(steps) = self.path(&record, LifecycleState::Resumed, "resume") else {
            self.store.checkin(record);
            return;
        };
        debug!(target: DISPATCH_TARGET, %token, is_forward, steps = steps.len(), "resuming");
        match self.drive(&mut record, &steps) {
            Ok(()) => {
                self.report(EventKind::Resumed, &record, seq);
                self.queue_idle(token);
                self.store.checkin(record);
            }
            Err(err) => self.fail(record, err, seq, false),
        }
    }

    fn pause(
        &mut self,
        seq: u64,
        token: ComponentToken,
        finishing: bool,
        user_leaving: bool,
        config_changes: u32,
        dont_report: bool,
    ) {
        let Some(mut record) = self.admit(token, seq, "pause") else {
            return;
        };
        record.finishing |= finishing;
        record.config_changes |= config_changes;
        let Some(steps) = self.path(&record, LifecycleState::Paused, "pause") else {
            self.store.checkin(record);
            return;
        };

        let mut outcome = Ok(());
        if user_leaving && !steps.is_empty() {
            let was_finishing = record.finishing;
            let mut progress = Progress::default();
            outcome = self.machine().user_leaving(&mut record, &mut progress);
            self.absorb(&record, was_finishing, progress);
        }
        match outcome.and_then(|()| self.drive(&mut record, &steps)) {
            Ok(()) => {
                if !dont_report {
                    self.report(EventKind::Paused, &record, seq);
                }
                self.store.checkin(record);
            }
            Err(err) => self.fail(record, err, seq, false),
        }
    }

    fn stop(&mut self, seq: u64, token: ComponentToken, show_window: bool, config_changes: u32) {
        let Some(mut record) = self.admit(token, seq, "stop") else {
            return;
        };
        record.config_changes |= config_changes;
        record.visible = show_window;
        let Some(steps) = self.path(&record, LifecycleState::Stopped, "stop") else {
            self.store.checkin(record);
            return;
        };

        for step in steps {
            if let Err(err) = self.drive(&mut record, &[step]) {
                self.fail(record, err, seq, false);
                return;
            }
            if step == Step::Pause {
                self.report(EventKind::Paused, &record, seq);
            }
        }

        let mut ev = Event::new(EventKind::Stopped)
            .with_token(token)
            .with_command_seq(seq)
            .with_state(record.state);
        if let Some(saved) = record.saved_state.clone() {
            ev = ev.with_saved_state(saved);
        }
        self.bus.publish(ev);
        self.store.checkin(record);
    }

    fn destroy(&mut self, seq: u64, token: ComponentToken, finishing: bool, config_changes: u32) {
        let Some(mut record) = self.admit(token, seq, "destroy") else {
            return;
        };
        record.finishing |= finishing;
        record.config_changes |= config_changes;
        self.teardown(record, seq);
    }

    fn relaunch(&mut self, seq: u64, origin: Origin, cmd: RelaunchCommand) {
        let token = cmd.token;
        let Some(record) = self.store.get(token) else {
            self.target_not_found(token, "relaunch");
            return;
        };
        let last = record.last_processed_seq;
        if seq < last {
            self.stale(token, seq, last, "relaunch");
            return;
        }
        let defaults = RelaunchDefaults {
            not_resumed: record.state != LifecycleState::Resumed,
            override_config: record.override_config.clone(),
        };
        let mask = cmd.config_changes;

        match self.merger.request(cmd, seq, origin, defaults) {
            MergeOutcome::Scheduled => {
                debug!(target: DISPATCH_TARGET, %token, seq, ?origin, mask, "relaunch scheduled");
                self.bus.publish(
                    Event::new(EventKind::RelaunchScheduled)
                        .with_token(token)
                        .with_command_seq(seq)
                        .with_config_changes(mask),
                );
                let perform = Envelope::new(seq, origin, Instruction::PerformRelaunch(token));
                if self.handle.enqueue(perform).is_err()
                    && let Some(request) = self.merger.take(token)
                {
                    self.relaunch_aborted(&request, "queue closed");
                }
            }
            MergeOutcome::Merged { ack_now } => {
                let merged = self.merger.pending(token).map_or(mask, |r| r.config_changes);
                debug!(target: DISPATCH_TARGET, %token, seq, ?origin, merged, ack_now, "relaunch merged");
                self.bus.publish(
                    Event::new(EventKind::RelaunchMerged)
                        .with_token(token)
                        .with_command_seq(seq)
                        .with_config_changes(merged),
                );
                if ack_now {
                    self.bus.publish(
                        Event::new(EventKind::Relaunched)
                            .with_token(token)
                            .with_command_seq(seq)
                            .with_config_changes(mask),
                    );
                }
            }
        }
    }

    fn deliver(&mut self, seq: u64, token: ComponentToken, payloads: Vec<Payload>, signals: bool) {
        let label = if signals {
            "deliver_signals"
        } else {
            "deliver_results"
        };
        let Some(mut record) = self.admit(token, seq, label) else {
            return;
        };
        if signals {
            record.pending_signals.extend(payloads);
        } else {
            record.pending_results.extend(payloads);
        }
        if record.state == LifecycleState::Resumed
            && let Err(err) = self.drive(&mut record, &[Step::Pause, Step::Resume])
        {
            self.fail(record, err, seq, false);
            return;
        }
        self.store.checkin(record);
    }

    fn apply_process_config(&mut self, config: Configuration) {
        let reason = format!("seq={}", config.seq);
        if !config.is_newer_than(self.config.as_ref()) {
            debug!(target: DISPATCH_TARGET, config_seq = config.seq, "stale configuration dropped");
            self.bus
                .publish(Event::new(EventKind::ConfigurationStale).with_reason(reason));
            return;
        }
        info!(target: DISPATCH_TARGET, config_seq = config.seq, "configuration applied");
        self.config = Some(config.clone());
        self.bus
            .publish(Event::new(EventKind::ConfigurationApplied).with_reason(reason));

        for token in self.store.tokens() {
            let Some(mut record) = self.store.checkout(token) else {
                continue;
            };
            let deliver_now = if record.kind().is_visual() {
                record.state == LifecycleState::Resumed
            } else {
                record.instance.is_some()
            };
            if !deliver_now {
                record.pending_config = Some(config.clone());
                self.store.checkin(record);
                continue;
            }

            let was_finishing = record.finishing;
            let mut progress = Progress::default();
            let outcome = self
                .machine()
                .apply_configuration(&mut record, &config, &mut progress);
            self.absorb(&record, was_finishing, progress);
            match outcome {
                Ok(()) => self.store.checkin(record),
                Err(err) => {
                    let seq = record.last_processed_seq;
                    self.fail(record, err, seq, false);
                }
            }
        }
    }

    /// Runs the merged relaunch for `token`.
    fn perform_relaunch(&mut self, token: ComponentToken) {
        let Some(mut request) = self.merger.take(token) else {
            debug!(target: DISPATCH_TARGET, %token, "relaunch already discarded");
            return;
        };
        let Some(mut record) = self.store.checkout(token) else {
            self.target_not_found(token, "relaunch");
            self.relaunch_aborted(&request, "component missing");
            return;
        };
        // Admitted with the Relaunch command; commands handled since then
        // only move the stamp forward.
        let seq = request.seq.max(record.last_processed_seq);
        request.seq = seq;
        record.last_processed_seq = seq;
        if record.finishing {
            self.relaunch_aborted(&request, "component is finishing");
            self.teardown(record, seq);
            return;
        }

        record.relaunching = true;
        record.config_changes |= request.config_changes;
        if let Some(config) = request.new_config.clone()
            && config.is_newer_than(self.config.as_ref())
        {
            self.apply_process_config(config);
        }
        if let Some(override_config) = request.override_config.clone() {
            record.override_config = Some(override_config);
        }

        // Destroy phase: pause (unreported), save state, destroy.
        let teardown = record
            .state
            .path_to(LifecycleState::Destroyed, record.kind())
            .unwrap_or_default();
        if let Err(err) = self.drive(&mut record, &teardown) {
            record.relaunching = false;
            self.relaunch_aborted(&request, err.as_label());
            self.fail(record, err, seq, true);
            return;
        }
        if record.finishing {
            self.relaunch_aborted(&request, "component finished during relaunch");
            self.finish_destroy(record, seq);
            return;
        }

        // Recreate phase.
        record.relaunching = false;
        record.reset_for_recreate();
        record.pending_results.extend(mem::take(&mut request.results));
        record.pending_signals.extend(mem::take(&mut request.signals));
        record.starts_not_resumed = request.starts_not_resumed;
        record.only_local_request = request.only_local;
        record.preserve_window = request.preserve_window;

        let target = match (record.kind().is_visual(), request.starts_not_resumed) {
            (false, _) => LifecycleState::Started,
            (true, true) => LifecycleState::Paused,
            (true, false) => LifecycleState::Resumed,
        };
        let outcome = LifecycleState::launch_path(target, record.kind())
            .and_then(|steps| self.drive(&mut record, &steps));
        if let Err(err) = outcome {
            self.relaunch_aborted(&request, err.as_label());
            self.fail(record, err, seq, false);
            return;
        }

        if record.state == LifecycleState::Resumed {
            self.report(EventKind::Resumed, &record, seq);
            self.queue_idle(token);
        }
        if !request.only_local {
            self.bus.publish(
                Event::new(EventKind::Relaunched)
                    .with_token(token)
                    .with_command_seq(seq)
                    .with_config_changes(request.config_changes),
            );
        }
        info!(
            target: DISPATCH_TARGET,
            %token,
            seq,
            mask = request.config_changes,
            merged = request.merged,
            only_local = request.only_local,
            state = ?record.state,
            "relaunch performed"
        );
        self.bus.publish(
            Event::new(EventKind::RelaunchPerformed)
                .with_token(token)
                .with_command_seq(seq)
                .with_config_changes(request.config_changes)
                .with_state(record.state),
        );
        self.store.checkin(record);
    }

    // ---- shared steps ----

    /// Checks the record out and applies the staleness rule.
    fn admit(&mut self, token: ComponentToken, seq: u64, label: &'static str) -> Option<ComponentRecord> {
        let Some(mut record) = self.store.checkout(token) else {
            self.target_not_found(token, label);
            return None;
        };
        let last = record.last_processed_seq;
        if seq < last {
            self.store.checkin(record);
            self.stale(token, seq, last, label);
            return None;
        }
        record.last_processed_seq = seq;
        Some(record)
    }

    fn stale(&self, token: ComponentToken, seq: u64, last: u64, label: &'static str) {
        debug!(target: DISPATCH_TARGET, %token, command = label, seq, last, "stale command discarded");
        self.bus.publish(
            Event::new(EventKind::CommandStale)
                .with_token(token)
                .with_command_seq(seq)
                .with_reason(label),
        );
    }

    fn path(&self, record: &ComponentRecord, target: LifecycleState, label: &'static str) -> Option<Vec<Step>> {
        match record.state.path_to(target, record.kind()) {
            Ok(steps) => Some(steps),
            Err(err) => {
                self.reject(record, label, &err.to_string());
                None
            }
        }
    }

    fn machine(&self) -> LifecycleMachine<'_> {
        LifecycleMachine::new(
            &*self.factory,
            &self.resources,
            self.exception_hook.as_deref(),
            self.config.as_ref(),
        )
    }

    fn drive(&self, record: &mut ComponentRecord, steps: &[Step]) -> Result<(), TransitionError> {
        let was_finishing = record.finishing;
        let mut progress = Progress::default();
        let outcome = self.machine().run(record, steps, &mut progress);
        self.absorb(record, was_finishing, progress);
        outcome
    }

    /// Publishes recovered errors and queues the follow-up work callbacks asked for.
    fn absorb(&self, record: &ComponentRecord, was_finishing: bool, progress: Progress) {
        let token = record.token;
        for (callback, err) in progress.recovered {
            warn!(target: DISPATCH_TARGET, %token, callback, error = %err, "callback error accepted by exception hook");
            self.bus.publish(
                Event::new(EventKind::TransitionRecovered)
                    .with_token(token)
                    .with_reason(format!("{callback}: {err}")),
            );
        }
        if progress.recreate_requested
            && let Err(err) = self.handle.request_recreate(token)
        {
            warn!(target: DISPATCH_TARGET, %token, error = %err, "recreate request dropped");
        }
        if record.finishing && !was_finishing && !record.relaunching {
            debug!(target: DISPATCH_TARGET, %token, "component finished itself");
            let destroy = Command::Destroy {
                token,
                finishing: true,
                config_changes: 0,
            };
            if let Err(err) = self.handle.enqueue_local(Instruction::Command(destroy)) {
                warn!(target: DISPATCH_TARGET, %token, error = %err, "finish request dropped");
            }
        }
    }

    /// Runs the full teardown and drops the record.
    fn teardown(&mut self, mut record: ComponentRecord, seq: u64) {
        let steps = record
            .state
            .path_to(LifecycleState::Destroyed, record.kind())
            .unwrap_or_default();
        match self.drive(&mut record, &steps) {
            Ok(()) => self.finish_destroy(record, seq),
            Err(err) => self.fail(record, err, seq, true),
        }
    }

    fn finish_destroy(&mut self, record: ComponentRecord, seq: u64) {
        let token = record.token;
        if let Some(request) = self.merger.take(token) {
            self.relaunch_aborted(&request, "component destroyed");
        }
        self.store.tombstone(token);
        drop(record);
        info!(target: DISPATCH_TARGET, %token, seq, "component destroyed");
        self.bus.publish(
            Event::new(EventKind::Destroyed)
                .with_token(token)
                .with_command_seq(seq)
                .with_state(LifecycleState::Destroyed),
        );
    }

    /// Marks the component failed, reports it and tears it down.
    ///
    /// Failures during a teardown drop the record directly; otherwise a local
    /// finishing Destroy is queued.
    fn fail(&mut self, mut record: ComponentRecord, err: TransitionError, seq: u64, tearing_down: bool) {
        let token = record.token;
        record.failed = true;
        record.finishing = true;
        error!(target: DISPATCH_TARGET, %token, seq, label = err.as_label(), error = %err, "component failed");

        if matches!(err, TransitionError::ContractViolation { .. }) {
            self.bus.publish(
                Event::new(EventKind::ContractViolation)
                    .with_token(token)
                    .with_reason(err.to_string()),
            );
        }
        self.bus.publish(
            Event::new(EventKind::Failed)
                .with_token(token)
                .with_command_seq(seq)
                .with_state(record.state)
                .with_reason(err.to_string()),
        );

        if tearing_down || record.instance.is_none() {
            record.instance = None;
            self.finish_destroy(record, seq);
            return;
        }
        self.store.checkin(record);
        let destroy = Command::Destroy {
            token,
            finishing: true,
            config_changes: 0,
        };
        if let Err(err) = self.handle.enqueue_local(Instruction::Command(destroy)) {
            warn!(target: DISPATCH_TARGET, %token, error = %err, "failure teardown not queued");
        }
    }

    fn report(&self, kind: EventKind, record: &ComponentRecord, seq: u64) {
        self.bus.publish(
            Event::new(kind)
                .with_token(record.token)
                .with_command_seq(seq)
                .with_state(record.state),
        );
    }

    fn reject(&self, record: &ComponentRecord, label: &'static str, reason: &str) {
        warn!(target: DISPATCH_TARGET, token = %record.token, command = label, state = ?record.state, reason, "transition rejected");
        self.bus.publish(
            Event::new(EventKind::TransitionRejected)
                .with_token(record.token)
                .with_state(record.state)
                .with_reason(format!("{label}: {reason}")),
        );
    }

    fn reject_launch(&self, token: ComponentToken, reason: &str) {
        warn!(target: DISPATCH_TARGET, %token, reason, "launch rejected");
        self.bus.publish(
            Event::new(EventKind::LaunchRejected)
                .with_token(token)
                .with_reason(reason),
        );
    }

    /// Drops a relaunch; a remote request is still answered with `Relaunched`.
    fn relaunch_aborted(&self, request: &RelaunchRequest, reason: &str) {
        let token = request.token;
        info!(target: DISPATCH_TARGET, %token, seq = request.seq, only_local = request.only_local, reason, "relaunch aborted");
        self.bus.publish(
            Event::new(EventKind::RelaunchAborted)
                .with_token(token)
                .with_command_seq(request.seq)
                .with_reason(reason),
        );
        if !request.only_local {
            self.bus.publish(
                Event::new(EventKind::Relaunched)
                    .with_token(token)
                    .with_command_seq(request.seq)
                    .with_config_changes(request.config_changes),
            );
        }
    }

    fn target_not_found(&self, token: ComponentToken, label: &'static str) {
        let requires_target = matches!(label, "resume" | "pause" | "stop");
        if requires_target && !self.store.is_tombstoned(token) {
            error!(target: DISPATCH_TARGET, %token, command = label, "command for unknown component");
        } else {
            warn!(target: DISPATCH_TARGET, %token, command = label, "command target not found");
        }
        self.bus.publish(
            Event::new(EventKind::TargetNotFound)
                .with_token(token)
                .with_reason(label),
        );
    }

    fn queue_idle(&mut self, token: ComponentToken) {
        if self.idle_reports && !self.idle.contains(&token) {
            self.idle.push(token);
        }
    }

    fn flush_idle(&mut self) {
        for token in mem::take(&mut self.idle) {
            let resumed = self
                .store
                .get(token)
                .is_some_and(|r| r.state == LifecycleState::Resumed);
            if resumed {
                self.bus
                    .publish(Event::new(EventKind::Idle).with_token(token));
            }
        }
    }
}
