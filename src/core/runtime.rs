//! # Runtime: owns the dispatcher task, the bus and the subscriber fan-out.
//!
//! ## Architecture
//! ```text
//! orchestrator ──► RuntimeHandle::submit(Command)
//!                      │  stamp (Sequencer)
//!                      ▼
//!              [unbounded mpsc queue] ◄── PerformRelaunch / failure teardown /
//!                      │                  CompleteRemoval / Inspect
//!                      ▼
//!                 Dispatcher (one task)
//!                      │  LifecycleMachine ─► Component callbacks
//!                      │  RelaunchMerger, RecordStore, Resources
//!                      ▼
//!                     Bus ──► SubscriberSet ──► LifecycleTracker, user subscribers
//!
//! Shutdown path:
//!   shutdown()
//!     └─► Bus.publish(ShutdownRequested)
//!     └─► runtime_token.cancel()
//!     └─► await dispatcher within cfg.grace
//!            ├─ joined        → Ok (live components were torn down)
//!            ├─ join error    → DispatcherAborted
//!            └─ grace elapsed → GraceExceeded { stuck: LifecycleTracker::snapshot() }
//! ```
//!
//! ## Example
//! ```rust
//! use hostvisor::{Command, Component, ComponentSpec, ComponentToken, Config, FactoryFn, LifecycleState, Runtime};
//!
//! struct Screen;
//! impl Component for Screen {}
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let factory = FactoryFn::arc(|_spec: &ComponentSpec| Ok(Box::new(Screen) as Box<dyn Component>));
//!     let runtime = Runtime::builder(Config::default(), factory).build();
//!
//!     let token = ComponentToken::new(1);
//!     runtime.submit(Command::Launch {
//!         token,
//!         spec: ComponentSpec::foreground("screen"),
//!         initial_state: LifecycleState::Resumed,
//!         config: None,
//!     })?;
//!
//!     let records = runtime.inspect().await?;
//!     assert_eq!(records[0].state, LifecycleState::Resumed);
//!
//!     runtime.shutdown().await?;
//!     Ok(())
//! }
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::builder::RuntimeBuilder;
use super::dispatcher::DISPATCH_TARGET;
use super::record::RecordSnapshot;
use super::shutdown;
use crate::commands::{Command, RuntimeHandle};
use crate::components::FactoryRef;
use crate::config::Config;
use crate::error::{RuntimeError, SubmitError};
use crate::events::{Bus, Event, EventKind};
use crate::resources::Resources;
use crate::subscribers::LifecycleTracker;

/// Component lifecycle runtime.
pub struct Runtime {
    cfg: Config,
    bus: Bus,
    handle: RuntimeHandle,
    resources: Resources,
    tracker: Arc<LifecycleTracker>,
    runtime_token: CancellationToken,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
}

impl Runtime {
    /// Starts building a runtime that instantiates components through `factory`.
    pub fn builder(cfg: Config, factory: FactoryRef) -> RuntimeBuilder {
        RuntimeBuilder::new(cfg, factory)
    }

    pub(crate) fn new_internal(
        cfg: Config,
        bus: Bus,
        handle: RuntimeHandle,
        resources: Resources,
        tracker: Arc<LifecycleTracker>,
        runtime_token: CancellationToken,
        dispatcher: JoinHandle<()>,
    ) -> Self {
        Self {
            cfg,
            bus,
            handle,
            resources,
            tracker,
            runtime_token,
            dispatcher: Mutex::new(Some(dispatcher)),
        }
    }

    /// Cloneable submission handle.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Shorthand for `self.handle().submit(command)`.
    pub fn submit(&self, command: Command) -> Result<u64, SubmitError> {
        self.handle.submit(command)
    }

    /// Snapshots of all live records, taken between two commands.
    pub async fn inspect(&self) -> Result<Vec<RecordSnapshot>, SubmitError> {
        self.handle.inspect().await
    }

    /// New receiver for every subsequent event (reports and diagnostics).
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Shared resource registry facade.
    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    /// Report-driven liveness view.
    pub fn tracker(&self) -> &Arc<LifecycleTracker> {
        &self.tracker
    }

    /// Runtime settings.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Stops the dispatcher and tears down every live component.
    ///
    /// Commands already queued behind the cancellation are not executed.
    /// Waits at most [`Config::grace`] for the dispatcher to exit.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        let join = self
            .dispatcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(join) = join else {
            return Err(RuntimeError::AlreadyShutDown);
        };

        info!(target: DISPATCH_TARGET, grace = ?self.cfg.grace, "shutdown requested");
        self.bus.publish(Event::new(EventKind::ShutdownRequested));
        self.runtime_token.cancel();

        let grace = self.cfg.grace;
        if grace.is_zero() {
            return Ok(());
        }
        match tokio::time::timeout(grace, join).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(RuntimeError::DispatcherAborted {
                reason: err.to_string(),
            }),
            Err(_) => {
                let stuck = self.tracker.snapshot().await;
                warn!(target: DISPATCH_TARGET, ?grace, ?stuck, "dispatcher did not stop within grace");
                Err(RuntimeError::GraceExceeded { grace, stuck })
            }
        }
    }

    /// Waits for a termination signal, then shuts down.
    pub async fn run_until_signal(&self) -> Result<(), RuntimeError> {
        match shutdown::termination().await {
            Ok(signal) => {
                info!(target: DISPATCH_TARGET, signal = signal.as_label(), "termination signal received");
            }
            Err(err) => {
                warn!(target: DISPATCH_TARGET, error = %err, "signal handlers unavailable; shutting down");
            }
        }
        self.shutdown().await
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.runtime_token.cancel();
    }
}
