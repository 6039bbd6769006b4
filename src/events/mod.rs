//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the dispatcher, the lifecycle
//! machine, the resource facade and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Reports** (outbound acknowledgments to the orchestrator boundary):
//!   `Resumed`, `Paused`, `Stopped`, `Destroyed`, `Relaunched`, `Idle`, `Failed`.
//! - **Diagnostics**: stale commands, missing targets, merges, resource removals...
//! - **Consumers**: the runtime forwarder (fans out to `SubscriberSet`)
//!   and any receiver obtained from [`Bus::subscribe`].

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
