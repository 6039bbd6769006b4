//! # Component lifecycle callbacks and the call-through contract.
//!
//! A [`Component`] is driven by the runtime through its lifecycle callbacks.
//! Hooked callbacks receive a [`Hook`] and **must** call [`Hook::call_through`]
//! before returning `Ok`; returning without it is a contract violation that is
//! fatal for the component.
//!
//! ## Rules
//! - Callbacks run on the dispatcher task, one at a time, to completion
//! - Callbacks never block on another command (use [`Hook::recreate`] / [`Hook::finish`])
//! - Errors are not retried; panics are caught and treated as fatal errors
//!
//! ## Example
//! ```rust
//! use hostvisor::{Component, ComponentError, Hook, SavedState};
//!
//! struct Screen {
//!     clicks: u32,
//! }
//!
//! impl Component for Screen {
//!     fn on_create(&mut self, hook: &mut Hook<'_>, saved: Option<&SavedState>) -> Result<(), ComponentError> {
//!         hook.call_through();
//!         if let Some(s) = saved {
//!             self.clicks = u32::from(s.data.first().copied().unwrap_or_default());
//!         }
//!         Ok(())
//!     }
//!
//!     fn on_save_state(&mut self) -> Option<SavedState> {
//!         Some(SavedState::new(vec![self.clicks as u8]))
//!     }
//! }
//! ```

use crate::components::{ComponentToken, Configuration, Payload, SavedState};
use crate::error::ComponentError;
use crate::lifecycle::Step;
use crate::resources::Resources;

/// Per-callback context handed to hooked lifecycle callbacks.
///
/// Carries the call-through flag checked after the callback returns, and lets
/// the component request follow-up work that the runtime performs after the
/// callback completes.
pub struct Hook<'a> {
    token: ComponentToken,
    step: Option<Step>,
    config: Option<&'a Configuration>,
    resources: &'a Resources,
    persistent: Option<&'a SavedState>,
    called: bool,
    finish_requested: bool,
    recreate_requested: bool,
}

impl<'a> Hook<'a> {
    pub(crate) fn new(
        token: ComponentToken,
        step: Option<Step>,
        config: Option<&'a Configuration>,
        resources: &'a Resources,
    ) -> Self {
        Self {
            token,
            step,
            config,
            resources,
            persistent: None,
            called: false,
            finish_requested: false,
            recreate_requested: false,
        }
    }

    pub(crate) fn with_persistent_state(mut self, state: Option<&'a SavedState>) -> Self {
        self.persistent = state;
        self
    }

    /// Marks the base lifecycle behaviour as performed.
    pub fn call_through(&mut self) {
        self.called = true;
    }

    /// Token of the component being driven.
    pub fn token(&self) -> ComponentToken {
        self.token
    }

    /// Step being performed (`None` for configuration delivery).
    pub fn step(&self) -> Option<Step> {
        self.step
    }

    /// Current process configuration, if any has been applied.
    pub fn configuration(&self) -> Option<&Configuration> {
        self.config
    }

    /// Shared resource registry.
    pub fn resources(&self) -> &Resources {
        self.resources
    }

    /// Persistent state captured by the last stop (persistable specs only).
    pub fn persistent_state(&self) -> Option<&SavedState> {
        self.persistent
    }

    /// Marks the component as being finished.
    ///
    /// Pending relaunches will not recreate it.
    pub fn finish(&mut self) {
        self.finish_requested = true;
    }

    /// Requests a local destroy-and-recreate once this callback completes.
    pub fn recreate(&mut self) {
        self.recreate_requested = true;
    }

    pub(crate) fn was_called(&self) -> bool {
        self.called
    }

    pub(crate) fn finish_requested(&self) -> bool {
        self.finish_requested
    }

    pub(crate) fn recreate_requested(&self) -> bool {
        self.recreate_requested
    }
}

/// # Managed component.
///
/// Default implementations call through and succeed, so components only
/// override what they need.
pub trait Component: Send + 'static {
    /// Instance created. `saved` is the state captured before a relaunch.
    fn on_create(
        &mut self,
        hook: &mut Hook<'_>,
        saved: Option<&SavedState>,
    ) -> Result<(), ComponentError> {
        let _ = saved;
        hook.call_through();
        Ok(())
    }

    /// Becoming visible / running.
    fn on_start(&mut self, hook: &mut Hook<'_>) -> Result<(), ComponentError> {
        hook.call_through();
        Ok(())
    }

    /// Restarting after a stop; followed by [`Component::on_start`].
    fn on_restart(&mut self, hook: &mut Hook<'_>) -> Result<(), ComponentError> {
        hook.call_through();
        Ok(())
    }

    /// Gaining the foreground.
    fn on_resume(&mut self, hook: &mut Hook<'_>) -> Result<(), ComponentError> {
        hook.call_through();
        Ok(())
    }

    /// Losing the foreground.
    fn on_pause(&mut self, hook: &mut Hook<'_>) -> Result<(), ComponentError> {
        hook.call_through();
        Ok(())
    }

    /// No longer visible.
    fn on_stop(&mut self, hook: &mut Hook<'_>) -> Result<(), ComponentError> {
        hook.call_through();
        Ok(())
    }

    /// Final callback before the instance is dropped.
    fn on_destroy(&mut self, hook: &mut Hook<'_>) -> Result<(), ComponentError> {
        hook.call_through();
        Ok(())
    }

    /// A newer configuration is delivered.
    fn on_configuration_changed(
        &mut self,
        hook: &mut Hook<'_>,
        config: &Configuration,
    ) -> Result<(), ComponentError> {
        let _ = config;
        hook.call_through();
        Ok(())
    }

    /// The user is navigating away (called before the pause).
    fn on_user_leaving(&mut self) {}

    /// Pending results delivered.
    fn on_results(&mut self, results: &[Payload]) -> Result<(), ComponentError> {
        let _ = results;
        Ok(())
    }

    /// Pending signals delivered.
    fn on_signals(&mut self, signals: &[Payload]) -> Result<(), ComponentError> {
        let _ = signals;
        Ok(())
    }

    /// Captures instance state before a stop.
    fn on_save_state(&mut self) -> Option<SavedState> {
        None
    }

    /// Captures state that survives full restarts (persistable specs only).
    fn on_save_persistent_state(&mut self) -> Option<SavedState> {
        None
    }
}

/// Designated acceptor for recoverable callback errors.
///
/// Returning `true` treats the failed step as completed; `false` lets the
/// error fail the component. Contract violations and fatal errors never
/// reach the hook.
pub trait ExceptionHook: Send + Sync + 'static {
    /// Decides whether `error` raised by `callback` (e.g. `"on_resume"`) may be ignored.
    fn on_exception(&self, token: ComponentToken, callback: &'static str, error: &ComponentError) -> bool;
}
