//! # Event fan-out to subscribers.
//!
//! ```text
//! Bus ──► forward() ──► emit(event)
//!                          ├──► [queue 1] ──► worker 1 ──► sub1.on_event()
//!                          │                    └─► panic → SubscriberPanicked
//!                          └──► [queue N] ──► worker N ──► subN.on_event()
//! ```
//!
//! - `emit` never blocks (`try_send`)
//! - A full or closed queue drops the event for that subscriber and publishes
//!   `SubscriberOverflow` (never for an overflow event itself)
//! - Each subscriber sees events in bus order; there is no cross-subscriber ordering

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::warn;

use super::Subscribe;
use crate::events::{Bus, Event, EventKind};

/// Tracing target for subscriber diagnostics.
pub(crate) const SUBSCRIBERS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::subscribers");

struct Channel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Per-subscriber queues and worker tasks.
pub struct SubscriberSet {
    channels: Vec<Channel>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Spawns one worker per subscriber. Must be called inside a tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let name = sub.name();
            let (tx, rx) = mpsc::channel::<Arc<Event>>(sub.queue_capacity().max(1));
            workers.push(tokio::spawn(worker(sub, rx, bus.clone())));
            channels.push(Channel { name, sender: tx });
        }
        Self {
            channels,
            workers,
            bus,
        }
    }

    /// Number of subscribers.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// True if no subscriber is registered.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Queues `event` for every subscriber.
    pub fn emit(&self, event: Arc<Event>) {
        let is_overflow = event.kind == EventKind::SubscriberOverflow;

        for channel in &self.channels {
            let reason = match channel.sender.try_send(Arc::clone(&event)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            if !is_overflow {
                self.bus
                    .publish(Event::subscriber_overflow(channel.name, reason));
            }
        }
    }

    /// Forwards bus events until the bus closes.
    pub(crate) async fn forward(self: Arc<Self>, mut rx: broadcast::Receiver<Event>) {
        loop {
            match rx.recv().await {
                Ok(ev) => self.emit(Arc::new(ev)),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(target: SUBSCRIBERS_TARGET, skipped, "subscriber fan-out lagged behind the bus");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    /// Closes every queue and waits for the workers to drain.
    pub async fn shutdown(self) {
        drop(self.channels);
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}

async fn worker(sub: Arc<dyn Subscribe>, mut rx: mpsc::Receiver<Arc<Event>>, bus: Bus) {
    while let Some(ev) = rx.recv().await {
        let delivery = AssertUnwindSafe(sub.on_event(&ev)).catch_unwind().await;
        if let Err(panic) = delivery {
            let info = panic_info(&*panic);
            warn!(target: SUBSCRIBERS_TARGET, subscriber = sub.name(), info, "subscriber panicked");
            bus.publish(Event::subscriber_panicked(sub.name(), info));
        }
    }
}

fn panic_info(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct Collect {
        seen: Mutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl Subscribe for Collect {
        async fn on_event(&self, ev: &Event) {
            self.seen.lock().unwrap().push(ev.kind);
        }
        fn name(&self) -> &'static str {
            "collect"
        }
    }

    struct Explode;

    #[async_trait]
    impl Subscribe for Explode {
        async fn on_event(&self, _ev: &Event) {
            panic!("subscriber blew up");
        }
        fn name(&self) -> &'static str {
            "explode"
        }
    }

    struct Stuck;

    #[async_trait]
    impl Subscribe for Stuck {
        async fn on_event(&self, _ev: &Event) {
            std::future::pending::<()>().await;
        }
        fn name(&self) -> &'static str {
            "stuck"
        }
        fn queue_capacity(&self) -> usize {
            1
        }
    }

    #[tokio::test]
    async fn panics_are_isolated_and_published() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let collect = Arc::new(Collect::default());
        let set = SubscriberSet::new(vec![Arc::new(Explode), collect.clone()], bus.clone());

        set.emit(Arc::new(Event::new(EventKind::Idle)));
        set.emit(Arc::new(Event::new(EventKind::Paused)));

        let ev = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ev.kind, EventKind::SubscriberPanicked);
        assert_eq!(ev.subscriber, Some("explode"));

        set.shutdown().await;
        assert_eq!(
            *collect.seen.lock().unwrap(),
            vec![EventKind::Idle, EventKind::Paused]
        );
    }

    #[tokio::test]
    async fn full_queue_reports_overflow_for_that_subscriber() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let set = SubscriberSet::new(vec![Arc::new(Stuck)], bus.clone());

        for _ in 0..3 {
            set.emit(Arc::new(Event::new(EventKind::Idle)));
            tokio::task::yield_now().await;
        }

        let ev = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ev.kind, EventKind::SubscriberOverflow);
        assert_eq!(ev.subscriber, Some("stuck"));
    }
}
