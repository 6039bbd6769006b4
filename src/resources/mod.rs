//! # Shared remote-resource reference counting.
//!
//! - [`registry`]: [`ResourceRegistry`] stable/unstable counts with deferred, cancelable removal;
//! - [`remote`]: [`RemoteResources`] the remote owner notified of reference changes;
//! - [`facade`]: [`Resources`] registry + removal timer + bus diagnostics, used by components.
//!
//! ## Architecture
//! ```text
//! Hook::resources() ─► Resources::acquire / release
//!                          │
//!                          ├─► ResourceRegistry (own mutex) ─► RemoteResources
//!                          │
//!                          └─► last ref dropped ─► timer(removal_delay)
//!                                                     └─► dispatcher queue: CompleteRemoval(ticket)
//!                                                            └─► ResourceRegistry::complete_removal
//! ```
//!
//! The registry does not depend on the dispatcher and is tested on its own.

mod facade;
mod registry;
mod remote;

pub use facade::Resources;
pub(crate) use facade::RemovalScheduler;
pub use registry::{Acquired, RefCounts, Released, Removal, RemovalTicket, ResourceRegistry};
pub use remote::{DetachedRemote, RemoteResources};

#[cfg(test)]
pub(crate) use registry::tests::{Call, RecordingRemote};

use std::fmt;

/// Identity of a shared remote resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceHandle(u64);

impl ResourceHandle {
    /// Wraps a raw handle identity.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw identity.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "resource#{}", self.0)
    }
}
