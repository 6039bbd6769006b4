//! # Event bus for broadcasting runtime events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking event publishing from the dispatcher, resource facade and
//! subscriber workers.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                  Receivers:
//!   Dispatcher ──┐
//!   Resources  ──┼──────► Bus ───────► subscriber_listener ────► SubscriberSet
//!   Workers    ──┘  (broadcast chan)   orchestrator boundary (Bus::subscribe)
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks.
//! - **Ordered stamping**: every published event gets the next bus sequence number.
//! - **Bounded capacity**: slow receivers observe `RecvError::Lagged(n)`.
//! - **No persistence**: events are lost if there are no active receivers at send time.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for runtime events.
///
/// ### Properties
/// - **Non-blocking**: `publish()` returns immediately.
/// - **Fire-and-forget**: no delivery or durability guarantees.
/// - **Cloneable**: cheap to clone; clones share the channel and the sequence counter.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
    seq: Arc<AtomicU64>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self {
            tx,
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Stamps the event with the next sequence number and publishes it.
    ///
    /// If there are no receivers, the event is dropped.
    pub fn publish(&self, mut ev: Event) {
        ev.seq = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that will observe subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
