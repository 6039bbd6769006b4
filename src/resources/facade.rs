//! # Component-facing resource API.
//!
//! [`Resources`] wraps the [`ResourceRegistry`] with the two things the bare
//! registry leaves to its caller: arming the deferred-removal timer and
//! publishing diagnostics on the [`Bus`].
//!
//! Registry logic errors (double release, duplicate pending removal) are
//! logged at error level, published as [`EventKind::ResourceError`] and
//! returned to the caller.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};

use super::remote::RESOURCES_TARGET;
use super::{Acquired, RefCounts, Released, Removal, RemovalTicket, ResourceHandle, ResourceRegistry};
use crate::commands::{Instruction, RuntimeHandle};
use crate::error::RegistryError;
use crate::events::{Bus, Event, EventKind};

/// Arms deferred-removal completions on the dispatcher queue.
#[derive(Clone, Debug)]
pub(crate) struct RemovalScheduler {
    handle: RuntimeHandle,
    delay: Option<Duration>,
    rt: tokio::runtime::Handle,
}

impl RemovalScheduler {
    /// Must be called inside a tokio runtime; timers run on it even when
    /// releases come from foreign threads.
    pub(crate) fn new(handle: RuntimeHandle, delay: Option<Duration>) -> Self {
        Self {
            handle,
            delay,
            rt: tokio::runtime::Handle::current(),
        }
    }

    fn schedule(&self, ticket: RemovalTicket) {
        let Some(delay) = self.delay else {
            complete_later(&self.handle, ticket);
            return;
        };
        let handle = self.handle.clone();
        self.rt.spawn(async move {
            tokio::time::sleep(delay).await;
            complete_later(&handle, ticket);
        });
    }
}

/// Queues the removal; a closed queue leaves it pending.
fn complete_later(handle: &RuntimeHandle, ticket: RemovalTicket) {
    if let Err(err) = handle.enqueue_local(Instruction::CompleteRemoval(ticket)) {
        warn!(
            target: RESOURCES_TARGET,
            handle = %ticket.handle,
            error = %err,
            "deferred removal not queued; removal stays pending"
        );
    }
}

/// Shared resource references, as seen by components through [`Hook::resources`](crate::Hook::resources).
#[derive(Clone)]
pub struct Resources {
    registry: Arc<ResourceRegistry>,
    scheduler: RemovalScheduler,
    bus: Bus,
}

impl Resources {
    pub(crate) fn new(registry: Arc<ResourceRegistry>, scheduler: RemovalScheduler, bus: Bus) -> Self {
        Self {
            registry,
            scheduler,
            bus,
        }
    }

    /// Adds a stable or unstable reference to `handle`.
    pub fn acquire(&self, handle: ResourceHandle, stable: bool) -> Acquired {
        let outcome = self.registry.acquire(handle, stable);
        if outcome == Acquired::RemovalCanceled {
            debug!(target: RESOURCES_TARGET, %handle, stable, "pending removal canceled");
            self.bus
                .publish(Event::new(EventKind::ResourceRemovalCanceled).with_handle(handle));
        }
        outcome
    }

    /// Drops a stable or unstable reference to `handle`.
    ///
    /// When both counts reach zero the removal is deferred by
    /// [`Config::removal_delay`](crate::Config::removal_delay).
    pub fn release(&self, handle: ResourceHandle, stable: bool) -> Result<Released, RegistryError> {
        match self.registry.release(handle, stable) {
            Ok(Released::RemovalScheduled(ticket)) => {
                debug!(target: RESOURCES_TARGET, %handle, "removal scheduled");
                self.bus
                    .publish(Event::new(EventKind::ResourceRemovalScheduled).with_handle(handle));
                self.scheduler.schedule(ticket);
                Ok(Released::RemovalScheduled(ticket))
            }
            Ok(released) => Ok(released),
            Err(err) => {
                error!(target: RESOURCES_TARGET, %handle, stable, error = %err, "resource registry logic error");
                self.bus.publish(
                    Event::new(EventKind::ResourceError)
                        .with_handle(handle)
                        .with_reason(err.to_string()),
                );
                Err(err)
            }
        }
    }

    /// Current counters for `handle`.
    pub fn counts(&self, handle: ResourceHandle) -> Option<RefCounts> {
        self.registry.counts(handle)
    }

    /// Underlying registry.
    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Runs on the dispatcher when a removal window elapsed.
    pub(crate) fn complete_removal(&self, ticket: RemovalTicket) -> Removal {
        let outcome = self.registry.complete_removal(ticket);
        let kind = match outcome {
            Removal::Completed => EventKind::ResourceRemoved,
            Removal::Aborted => EventKind::ResourceRemovalAborted,
        };
        debug!(target: RESOURCES_TARGET, handle = %ticket.handle, ?outcome, "deferred removal ran");
        self.bus.publish(Event::new(kind).with_handle(ticket.handle));
        outcome
    }
}

#[cfg(test)]
impl Resources {
    /// Resources backed by a logging remote and a queue nobody drains.
    pub(crate) fn detached() -> Self {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let handle = RuntimeHandle::new(tx, Arc::new(crate::core::Sequencer::new()));
        Self::new(
            Arc::new(ResourceRegistry::new(Arc::new(super::DetachedRemote))),
            RemovalScheduler::new(handle, None),
            Bus::new(16),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Envelope;
    use crate::core::Sequencer;
    use crate::resources::registry::tests::RecordingRemote;
    use tokio::sync::mpsc;

    const H: ResourceHandle = ResourceHandle::new(3);

    fn resources(
        delay: Option<Duration>,
    ) -> (Resources, Arc<RecordingRemote>, mpsc::UnboundedReceiver<Envelope>) {
        let remote = Arc::new(RecordingRemote::default());
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = RuntimeHandle::new(tx, Arc::new(Sequencer::new()));
        let res = Resources::new(
            Arc::new(ResourceRegistry::new(remote.clone())),
            RemovalScheduler::new(handle, delay),
            Bus::new(16),
        );
        (res, remote, rx)
    }

    #[tokio::test]
    async fn release_enqueues_completion_immediately_without_delay() {
        let (res, remote, mut rx) = resources(None);
        res.acquire(H, true);
        res.release(H, true).unwrap();

        let env = rx.recv().await.unwrap();
        let Instruction::CompleteRemoval(ticket) = env.instruction else {
            panic!("expected a removal completion");
        };
        assert_eq!(res.complete_removal(ticket), Removal::Completed);
        assert_eq!(remote.removals(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn delayed_removal_is_aborted_by_reacquire() {
        let (res, remote, mut rx) = resources(Some(Duration::from_secs(1)));
        res.acquire(H, true);
        res.release(H, true).unwrap();
        assert!(rx.try_recv().is_err());

        assert_eq!(res.acquire(H, true), Acquired::RemovalCanceled);
        tokio::time::advance(Duration::from_secs(2)).await;

        let env = rx.recv().await.unwrap();
        let Instruction::CompleteRemoval(ticket) = env.instruction else {
            panic!("expected a removal completion");
        };
        assert_eq!(res.complete_removal(ticket), Removal::Aborted);
        assert_eq!(remote.removals(), 0);
    }

    #[tokio::test]
    async fn release_after_queue_closed_keeps_removal_pending() {
        let (res, remote, rx) = resources(None);
        drop(rx);
        res.acquire(H, true);

        assert!(matches!(res.release(H, true), Ok(Released::RemovalScheduled(_))));
        assert!(res.counts(H).unwrap().remove_pending);
        assert_eq!(remote.removals(), 0);
    }

    #[tokio::test]
    async fn logic_errors_are_published() {
        let (res, _remote, _rx) = resources(None);
        let bus_rx = &mut res.bus.subscribe();
        res.acquire(H, false);
        assert!(res.release(H, true).is_err());

        let ev = bus_rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::ResourceError);
        assert_eq!(ev.handle, Some(H));
    }
}
