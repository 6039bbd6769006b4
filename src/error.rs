//! Error types used by the hostvisor runtime, components and the resource registry.
//!
//! This module defines the error enums of the crate:
//!
//! - [`RuntimeError`]: errors raised by the runtime context itself (shutdown).
//! - [`SubmitError`]: a command could not be enqueued.
//! - [`ComponentError`]: errors raised by component callbacks.
//! - [`TransitionError`]: a lifecycle transition chain failed for one component.
//! - [`RegistryError`]: logic errors detected by the resource reference registry.
//!
//! All types provide `as_label` for logs/metrics.

use std::time::Duration;

use thiserror::Error;

use crate::components::ComponentToken;
use crate::lifecycle::LifecycleState;
use crate::resources::ResourceHandle;

/// # Errors produced by the runtime context.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; the dispatcher did not stop in time.
    #[error("shutdown timeout {grace:?} exceeded; alive: {stuck:?}; forcing termination")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Components still reported alive at the deadline.
        stuck: Vec<ComponentToken>,
    },

    /// The dispatcher task terminated abnormally.
    #[error("dispatcher task aborted: {reason}")]
    DispatcherAborted {
        /// Join error description.
        reason: String,
    },

    /// Shutdown was requested twice.
    #[error("runtime already shut down")]
    AlreadyShutDown,
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use hostvisor::RuntimeError;
    ///
    /// let err = RuntimeError::AlreadyShutDown;
    /// assert_eq!(err.as_label(), "runtime_already_shut_down");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::DispatcherAborted { .. } => "runtime_dispatcher_aborted",
            RuntimeError::AlreadyShutDown => "runtime_already_shut_down",
        }
    }
}

/// Error returned when a command cannot be handed to the dispatcher.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// Dispatcher queue is closed (runtime shut down).
    #[error("dispatcher queue closed")]
    Closed,
}

/// # Errors raised by component callbacks.
///
/// `Fail` may be accepted by an [`ExceptionHook`](crate::ExceptionHook);
/// `Fatal` never is.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComponentError {
    /// Callback raised an unhandled condition.
    #[error("callback failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Non-recoverable error (panic, broken invariant).
    #[error("fatal error: {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },
}

impl ComponentError {
    /// Shorthand for [`ComponentError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        ComponentError::Fail {
            error: error.into(),
        }
    }

    /// Shorthand for [`ComponentError::Fatal`].
    pub fn fatal(error: impl Into<String>) -> Self {
        ComponentError::Fatal {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ComponentError::Fail { .. } => "component_failed",
            ComponentError::Fatal { .. } => "component_fatal",
        }
    }

    /// True if an exception hook may swallow this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ComponentError::Fail { .. })
    }
}

/// # Failure of a lifecycle transition chain.
///
/// Every variant is fatal for the affected component: the dispatcher marks it
/// failed, reports it and tears it down. Other components are unaffected.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// A callback returned an error that no exception hook accepted.
    #[error("component {token} failed in {callback}: {source}")]
    Callback {
        /// Target component.
        token: ComponentToken,
        /// Callback that raised the error (e.g. `on_pause`).
        callback: &'static str,
        /// Callback error.
        source: ComponentError,
    },

    /// A callback returned without calling through to [`Hook::call_through`](crate::Hook::call_through).
    #[error("component {token} did not call through in {callback}")]
    ContractViolation {
        /// Target component.
        token: ComponentToken,
        /// Callback that returned without calling through.
        callback: &'static str,
    },

    /// The factory could not produce a component instance.
    #[error("component {token} could not be instantiated: {source}")]
    Instantiate {
        /// Target component.
        token: ComponentToken,
        /// Factory error.
        source: ComponentError,
    },

    /// No path exists from the current state to the requested one.
    #[error("no transition from {from:?} to {target:?}")]
    Invalid {
        /// Current state.
        from: LifecycleState,
        /// Requested state.
        target: LifecycleState,
    },
}

impl TransitionError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TransitionError::Callback { .. } => "transition_callback_failed",
            TransitionError::ContractViolation { .. } => "transition_contract_violation",
            TransitionError::Instantiate { .. } => "transition_instantiate_failed",
            TransitionError::Invalid { .. } => "transition_invalid",
        }
    }

    /// True for errors caused by a component's own behaviour (as opposed to a rejected request).
    pub fn is_component_fault(&self) -> bool {
        !matches!(self, TransitionError::Invalid { .. })
    }
}

/// # Logic errors detected by the resource reference registry.
///
/// These indicate bugs in the caller and are reported, never retried or clamped.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// Release with the matching counter already at zero.
    #[error("double release of {handle} (stable={stable})")]
    DoubleRelease {
        /// Resource handle.
        handle: ResourceHandle,
        /// Which counter was released.
        stable: bool,
    },

    /// A second deferred removal was requested while one is pending.
    #[error("duplicate removal pending for {handle}")]
    DuplicateRemovalPending {
        /// Resource handle.
        handle: ResourceHandle,
    },

    /// Release of a handle the registry has never seen.
    #[error("unknown resource handle {handle}")]
    UnknownHandle {
        /// Resource handle.
        handle: ResourceHandle,
    },
}

impl RegistryError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use hostvisor::{RegistryError, ResourceHandle};
    ///
    /// let err = RegistryError::UnknownHandle { handle: ResourceHandle::new(7) };
    /// assert_eq!(err.as_label(), "registry_unknown_handle");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RegistryError::DoubleRelease { .. } => "registry_double_release",
            RegistryError::DuplicateRemovalPending { .. } => "registry_duplicate_removal",
            RegistryError::UnknownHandle { .. } => "registry_unknown_handle",
        }
    }
}
