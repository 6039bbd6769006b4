//! # hostvisor
//!
//! **Hostvisor** is a client-side component lifecycle runtime.
//!
//! A remote orchestrator decides what each component should be doing
//! (resumed, paused, stopped, destroyed, relaunched) and sends commands
//! stamped with a monotonic sequence. Hostvisor executes them against local
//! component instances, in order, one at a time, and publishes the
//! acknowledgments the orchestrator is owed.
//!
//! ## Architecture
//! ```text
//!   orchestrator / local callers
//!            │  Command { Launch, Resume{seq}, Pause{seq}, Stop{seq}, Destroy,
//!            │            Relaunch, DeliverResults, DeliverSignals, ConfigurationChanged }
//!            ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │ RuntimeHandle::submit ── stamp with Sequencer ──► unbounded queue │
//! └───────────────────────────────────┬───────────────────────────────┘
//!                                     ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │ Dispatcher (single task, one command at a time)                   │
//! │  - RecordStore: token → ComponentRecord (+ tombstones)            │
//! │  - stale check: stamp < last_processed_seq → discard              │
//! │  - LifecycleMachine: path_to(target) → Component callbacks        │
//! │  - RelaunchMerger: one destroy-and-recreate per merge window      │
//! │  - Resources: stable/unstable refcounts, deferred removal         │
//! └───────────────────────────────────┬───────────────────────────────┘
//!                                     │ reports + diagnostics
//!                                     ▼
//!                        Bus (broadcast) ──► SubscriberSet
//!                                              ├─► LifecycleTracker
//!                                              └─► user Subscribe impls
//! ```
//!
//! ## Features
//! | Area             | Description                                                   | Key types                                  |
//! |------------------|---------------------------------------------------------------|--------------------------------------------|
//! | **Runtime**      | Build, submit, inspect, shut down                             | [`Runtime`], [`RuntimeBuilder`], [`RuntimeHandle`] |
//! | **Components**   | Lifecycle callbacks with the call-through contract            | [`Component`], [`Hook`], [`ComponentFactory`] |
//! | **Lifecycle**    | States, steps, pure path computation                          | [`LifecycleState`], [`Step`]               |
//! | **Relaunch**     | Coalescing of relaunch requests                               | [`RelaunchCommand`], [`RelaunchMerger`]    |
//! | **Resources**    | Shared remote-resource refcounting                            | [`Resources`], [`ResourceRegistry`], [`RemoteResources`] |
//! | **Events**       | Reports and diagnostics on a broadcast bus                    | [`Event`], [`EventKind`], [`Subscribe`]    |
//! | **Errors**       | Typed errors with stable labels                               | [`TransitionError`], [`RuntimeError`]      |
//!
//! ## Optional features
//! - `logging`: exports the [`LogWriter`] subscriber that renders events through `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use hostvisor::{
//!     Command, Component, ComponentError, ComponentSpec, ComponentToken, Config, EventKind,
//!     FactoryFn, Hook, LifecycleState, RelaunchCommand, Runtime,
//! };
//!
//! struct Screen;
//!
//! impl Component for Screen {
//!     fn on_resume(&mut self, hook: &mut Hook<'_>) -> Result<(), ComponentError> {
//!         hook.call_through();
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let factory = FactoryFn::arc(|_spec: &ComponentSpec| Ok(Box::new(Screen) as Box<dyn Component>));
//!     let runtime = Runtime::builder(Config::default(), factory).build();
//!     let mut events = runtime.subscribe();
//!
//!     let token = ComponentToken::new(7);
//!     runtime.submit(Command::Launch {
//!         token,
//!         spec: ComponentSpec::foreground("screen"),
//!         initial_state: LifecycleState::Resumed,
//!         config: None,
//!     })?;
//!     runtime.submit(Command::Relaunch(RelaunchCommand::new(token).with_config_changes(0x1)))?;
//!
//!     loop {
//!         let ev = events.recv().await?;
//!         if ev.kind == EventKind::Relaunched {
//!             break;
//!         }
//!     }
//!
//!     runtime.shutdown().await?;
//!     Ok(())
//! }
//! ```
mod commands;
mod components;
mod config;
mod core;
mod error;
mod events;
mod lifecycle;
mod relaunch;
mod resources;
mod subscribers;

#[cfg(test)]
mod testing;

// ---- Public re-exports ----

pub use commands::{Command, Origin, RelaunchCommand, RuntimeHandle};
pub use components::{
    Component, ComponentFactory, ComponentKind, ComponentSpec, ComponentToken, Configuration,
    ExceptionHook, FactoryFn, FactoryRef, Hook, Payload, SavedState,
};
pub use config::Config;
pub use core::{RecordSnapshot, Runtime, RuntimeBuilder, Sequencer};
pub use error::{ComponentError, RegistryError, RuntimeError, SubmitError, TransitionError};
pub use events::{Bus, Event, EventKind};
pub use lifecycle::{LifecycleState, Step};
pub use relaunch::{MergeOutcome, RelaunchDefaults, RelaunchMerger, RelaunchRequest};
pub use resources::{
    Acquired, DetachedRemote, RefCounts, Released, Removal, RemovalTicket, RemoteResources,
    ResourceHandle, ResourceRegistry, Resources,
};
pub use subscribers::{LifecycleTracker, Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
