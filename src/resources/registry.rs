//! # Resource reference registry.
//!
//! Reference-counts shared remote-resource handles with two counters:
//! **stable** and **unstable** references. When both reach zero the entry is
//! not removed immediately: a deferred removal is scheduled and may be
//! cancelled by a new acquisition that arrives before it completes.
//!
//! ## Remote protocol
//! ```text
//! acquire(h) on unseen handle            → acquire_remote_resource(h, stable)
//! stable   0 → 1 (no removal pending)    → release_remote_resource(h, +1,  0)
//! stable   0 → 1 (removal pending)       → release_remote_resource(h, +1, -1)  convert held unstable ref
//! unstable 0 → 1 (no removal pending)    → release_remote_resource(h,  0, +1)
//! unstable 0 → 1 (removal pending)       → (nothing, takes over the held unstable ref)
//! stable   1 → 0, unstable == 0          → release_remote_resource(h, -1, +1)  hold one unstable ref
//! stable   1 → 0, unstable  > 0          → release_remote_resource(h, -1,  0)
//! unstable 1 → 0, stable  > 0            → release_remote_resource(h,  0, -1)
//! unstable 1 → 0, stable == 0            → (nothing, keep it for the removal window)
//! complete_removal(ticket) still pending → remove_remote_resource(h)
//! ```
//!
//! ## Rules
//! - Counts never go below zero: releasing a zero counter is [`RegistryError::DoubleRelease`]
//! - At most one removal pending per handle ([`RegistryError::DuplicateRemovalPending`])
//! - Each scheduled removal has a ticket; completion re-checks the pending flag and the ticket
//! - The map is guarded by the registry's own mutex; callers may be on any thread

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{RemoteResources, ResourceHandle};
use crate::error::RegistryError;

/// Per-handle counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefCounts {
    /// Stable references held.
    pub stable: u32,
    /// Unstable references held.
    pub unstable: u32,
    /// A deferred removal is scheduled.
    pub remove_pending: bool,
}

#[derive(Debug, Default)]
struct Entry {
    counts: RefCounts,
    /// Incremented on every scheduled removal.
    epoch: u64,
}

/// Identifies one scheduled removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovalTicket {
    /// Resource handle.
    pub handle: ResourceHandle,
    epoch: u64,
}

/// Outcome of [`ResourceRegistry::acquire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquired {
    /// First reference ever; remote acquired.
    Installed,
    /// Counter incremented.
    Incremented,
    /// Counter incremented and a pending removal was cancelled.
    RemovalCanceled,
}

/// Outcome of [`ResourceRegistry::release`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Released {
    /// Other references remain.
    Retained,
    /// Both counters reached zero; the caller must arrange for
    /// [`ResourceRegistry::complete_removal`] to run later.
    RemovalScheduled(RemovalTicket),
}

/// Outcome of [`ResourceRegistry::complete_removal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// Entry dropped and remote notified.
    Completed,
    /// Removal no longer pending (re-acquired, or superseded by a newer ticket).
    Aborted,
}

/// Reference-counting registry of remote-resource handles.
pub struct ResourceRegistry {
    entries: Mutex<HashMap<ResourceHandle, Entry>>,
    remote: Arc<dyn RemoteResources>,
}

impl ResourceRegistry {
    /// Creates an empty registry reporting to `remote`.
    pub fn new(remote: Arc<dyn RemoteResources>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            remote,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ResourceHandle, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a stable or unstable reference to `handle`.
    ///
    /// If the kind gains its first reference while a removal is pending, the
    /// removal is cancelled and the reference held for the removal window is
    /// taken over instead of requesting a new one.
    pub fn acquire(&self, handle: ResourceHandle, stable: bool) -> Acquired {
        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(&handle) else {
            let mut entry = Entry::default();
            if stable {
                entry.counts.stable = 1;
            } else {
                entry.counts.unstable = 1;
            }
            entries.insert(handle, entry);
            self.remote.acquire_remote_resource(handle, stable);
            return Acquired::Installed;
        };

        let counts = &mut entry.counts;
        if stable {
            counts.stable += 1;
            if counts.stable > 1 {
                return Acquired::Incremented;
            }
            if counts.remove_pending {
                counts.remove_pending = false;
                self.remote.release_remote_resource(handle, 1, -1);
                Acquired::RemovalCanceled
            } else {
                self.remote.release_remote_resource(handle, 1, 0);
                Acquired::Incremented
            }
        } else {
            counts.unstable += 1;
            if counts.unstable > 1 {
                return Acquired::Incremented;
            }
            if counts.remove_pending {
                counts.remove_pending = false;
                Acquired::RemovalCanceled
            } else {
                self.remote.release_remote_resource(handle, 0, 1);
                Acquired::Incremented
            }
        }
    }

    /// Drops a stable or unstable reference to `handle`.
    ///
    /// ### Errors
    /// - [`RegistryError::UnknownHandle`] if the handle was never acquired
    /// - [`RegistryError::DoubleRelease`] if the matching counter is already zero
    /// - [`RegistryError::DuplicateRemovalPending`] if a removal was already pending
    pub fn release(&self, handle: ResourceHandle, stable: bool) -> Result<Released, RegistryError> {
        let mut entries = self.lock();
        let entry = entries
            .get_mut(&handle)
            .ok_or(RegistryError::UnknownHandle { handle })?;
        let counts = &mut entry.counts;

        let (held, other) = if stable {
            (counts.stable, counts.unstable)
        } else {
            (counts.unstable, counts.stable)
        };
        if held == 0 {
            return Err(RegistryError::DoubleRelease { handle, stable });
        }
        let last_ref = held == 1 && other == 0;
        if last_ref && counts.remove_pending {
            return Err(RegistryError::DuplicateRemovalPending { handle });
        }

        if stable {
            counts.stable -= 1;
            if counts.stable == 0 {
                self.remote
                    .release_remote_resource(handle, -1, if last_ref { 1 } else { 0 });
            }
        } else {
            counts.unstable -= 1;
            if counts.unstable == 0 && !last_ref {
                self.remote.release_remote_resource(handle, 0, -1);
            }
        }

        if !last_ref {
            return Ok(Released::Retained);
        }
        counts.remove_pending = true;
        entry.epoch += 1;
        Ok(Released::RemovalScheduled(RemovalTicket {
            handle,
            epoch: entry.epoch,
        }))
    }

    /// Executes a deferred removal.
    ///
    /// Re-checks the pending flag and the ticket: an acquisition that arrived
    /// after the removal was scheduled aborts it.
    pub fn complete_removal(&self, ticket: RemovalTicket) -> Removal {
        let mut entries = self.lock();
        let still_pending = entries
            .get(&ticket.handle)
            .is_some_and(|e| e.counts.remove_pending && e.epoch == ticket.epoch);
        if !still_pending {
            return Removal::Aborted;
        }
        entries.remove(&ticket.handle);
        self.remote.remove_remote_resource(ticket.handle);
        Removal::Completed
    }

    /// Returns the counters for `handle`, if known.
    pub fn counts(&self, handle: ResourceHandle) -> Option<RefCounts> {
        self.lock().get(&handle).map(|e| e.counts)
    }

    /// Number of handles currently tracked (including those pending removal).
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True if no handle is tracked.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Call {
        Acquire(ResourceHandle, bool),
        Delta(ResourceHandle, i32, i32),
        Remove(ResourceHandle),
    }

    #[derive(Default)]
    pub(crate) struct RecordingRemote {
        pub(crate) calls: Mutex<Vec<Call>>,
    }

    impl RecordingRemote {
        pub(crate) fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        pub(crate) fn removals(&self) -> usize {
            self.calls()
                .iter()
                .filter(|c| matches!(c, Call::Remove(_)))
                .count()
        }
    }

    impl RemoteResources for RecordingRemote {
        fn acquire_remote_resource(&self, handle: ResourceHandle, stable: bool) {
            self.calls.lock().unwrap().push(Call::Acquire(handle, stable));
        }
        fn release_remote_resource(&self, handle: ResourceHandle, s: i32, u: i32) {
            self.calls.lock().unwrap().push(Call::Delta(handle, s, u));
        }
        fn remove_remote_resource(&self, handle: ResourceHandle) {
            self.calls.lock().unwrap().push(Call::Remove(handle));
        }
    }

    fn registry() -> (ResourceRegistry, Arc<RecordingRemote>) {
        let remote = Arc::new(RecordingRemote::default());
        (ResourceRegistry::new(remote.clone()), remote)
    }

    const H: ResourceHandle = ResourceHandle::new(1);

    #[test]
    fn first_acquire_installs_and_notifies_remote() {
        let (reg, remote) = registry();
        assert_eq!(reg.acquire(H, true), Acquired::Installed);
        assert_eq!(reg.acquire(H, true), Acquired::Incremented);
        assert_eq!(remote.calls(), vec![Call::Acquire(H, true)]);
        assert_eq!(reg.counts(H).unwrap().stable, 2);
    }

    #[test]
    fn last_release_defers_removal() {
        let (reg, remote) = registry();
        reg.acquire(H, true);
        let Released::RemovalScheduled(ticket) = reg.release(H, true).unwrap() else {
            panic!("removal should be scheduled");
        };
        assert!(reg.counts(H).unwrap().remove_pending);
        assert_eq!(remote.calls().last(), Some(&Call::Delta(H, -1, 1)));

        assert_eq!(reg.complete_removal(ticket), Removal::Completed);
        assert!(reg.counts(H).is_none());
        assert_eq!(remote.removals(), 1);
    }

    #[test]
    fn stable_reacquire_cancels_pending_removal() {
        let (reg, remote) = registry();
        reg.acquire(H, true);
        let Released::RemovalScheduled(ticket) = reg.release(H, true).unwrap() else {
            panic!("removal should be scheduled");
        };
        assert_eq!(reg.acquire(H, true), Acquired::RemovalCanceled);
        assert_eq!(remote.calls().last(), Some(&Call::Delta(H, 1, -1)));

        assert_eq!(reg.complete_removal(ticket), Removal::Aborted);
        assert_eq!(remote.removals(), 0);
        assert_eq!(reg.counts(H).unwrap().stable, 1);
    }

    #[test]
    fn unstable_reacquire_cancels_silently() {
        let (reg, remote) = registry();
        reg.acquire(H, false);
        let before = remote.calls().len();
        let Released::RemovalScheduled(ticket) = reg.release(H, false).unwrap() else {
            panic!("removal should be scheduled");
        };
        assert_eq!(reg.acquire(H, false), Acquired::RemovalCanceled);
        assert_eq!(remote.calls().len(), before);
        assert_eq!(reg.complete_removal(ticket), Removal::Aborted);
    }

    #[test]
    fn stale_ticket_cannot_complete_newer_removal() {
        let (reg, remote) = registry();
        reg.acquire(H, true);
        let Released::RemovalScheduled(old) = reg.release(H, true).unwrap() else {
            panic!("removal should be scheduled");
        };
        reg.acquire(H, true);
        let Released::RemovalScheduled(new) = reg.release(H, true).unwrap() else {
            panic!("removal should be scheduled");
        };
        assert_eq!(reg.complete_removal(old), Removal::Aborted);
        assert_eq!(remote.removals(), 0);
        assert_eq!(reg.complete_removal(new), Removal::Completed);
        assert_eq!(remote.removals(), 1);
    }

    #[test]
    fn mixed_references_keep_entry_alive() {
        let (reg, remote) = registry();
        reg.acquire(H, true);
        reg.acquire(H, false);
        assert_eq!(remote.calls(), vec![Call::Acquire(H, true), Call::Delta(H, 0, 1)]);

        assert_eq!(reg.release(H, true).unwrap(), Released::Retained);
        assert_eq!(remote.calls().last(), Some(&Call::Delta(H, -1, 0)));
        assert!(matches!(reg.release(H, false).unwrap(), Released::RemovalScheduled(_)));
    }

    #[test]
    fn double_release_is_reported_not_clamped() {
        let (reg, _remote) = registry();
        reg.acquire(H, false);
        assert_eq!(
            reg.release(H, true),
            Err(RegistryError::DoubleRelease { handle: H, stable: true })
        );
        assert_eq!(reg.counts(H).unwrap().unstable, 1);
        assert_eq!(
            reg.release(ResourceHandle::new(99), false),
            Err(RegistryError::UnknownHandle { handle: ResourceHandle::new(99) })
        );
    }

    #[test]
    fn duplicate_pending_removal_leaves_counts_untouched() {
        let (reg, remote) = registry();
        reg.acquire(H, true);
        reg.acquire(H, false);
        reg.release(H, true).unwrap();
        // Corrupt the entry the way a lost cancellation would.
        reg.lock().get_mut(&H).unwrap().counts.remove_pending = true;
        let calls = remote.calls().len();
        assert_eq!(
            reg.release(H, false),
            Err(RegistryError::DuplicateRemovalPending { handle: H })
        );
        assert_eq!(reg.counts(H).unwrap().unstable, 1);
        assert_eq!(remote.calls().len(), calls);
    }
}
