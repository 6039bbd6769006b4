//! # Remote counterpart of the resource registry.
//!
//! Calls are fire-and-forget notifications toward the remote owner.
//! Implementations must not block and must not call back into the registry.

use tracing::debug;

use super::ResourceHandle;

/// Tracing target for resource notifications.
pub(crate) const RESOURCES_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::resources");

/// Remote owner of shared resources.
pub trait RemoteResources: Send + Sync + 'static {
    /// First reference to `handle` in this process.
    fn acquire_remote_resource(&self, handle: ResourceHandle, stable: bool);

    /// Reference count delta report for an already known handle.
    ///
    /// Deltas may be positive (a kind gained its first reference again) or
    /// negative (a kind lost its last reference).
    fn release_remote_resource(&self, handle: ResourceHandle, stable_delta: i32, unstable_delta: i32);

    /// The handle was dropped from this process after its removal window.
    fn remove_remote_resource(&self, handle: ResourceHandle);
}

/// Remote that only logs; used when no remote owner is wired.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedRemote;

impl RemoteResources for DetachedRemote {
    fn acquire_remote_resource(&self, handle: ResourceHandle, stable: bool) {
        debug!(target: RESOURCES_TARGET, %handle, stable, "remote acquire (detached)");
    }

    fn release_remote_resource(&self, handle: ResourceHandle, stable_delta: i32, unstable_delta: i32) {
        debug!(target: RESOURCES_TARGET, %handle, stable_delta, unstable_delta, "remote delta (detached)");
    }

    fn remove_remote_resource(&self, handle: ResourceHandle) {
        debug!(target: RESOURCES_TARGET, %handle, "remote remove (detached)");
    }
}
