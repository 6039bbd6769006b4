//! # Lifecycle states and transition paths.
//!
//! ```text
//!   Create      Start       Resume
//!  ───────► Initialized ───► Started ───► Resumed
//!                               ▲           │  ▲
//!                        Restart│      Pause│  │Resume
//!                               │           ▼  │
//!                            Stopped ◄─── Paused
//!                               │    Stop
//!                        Destroy▼
//!                           Destroyed
//! ```
//!
//! ## Rules
//! - Pause always precedes Stop; Stop always precedes Destroy once started
//! - Pausing something that is not resumed is a no-op
//! - Background components never enter Resumed or Paused
//! - Destroyed is terminal: no path leaves it
//!
//! Path computation is pure; [`LifecycleMachine`](super::LifecycleMachine)
//! executes the returned steps.

use crate::components::ComponentKind;
use crate::error::TransitionError;

/// State of a component record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Instance created, not started.
    Initialized,
    /// Started (visible or running), not in the foreground.
    Started,
    /// In the foreground.
    Resumed,
    /// Lost the foreground, still started.
    Paused,
    /// No longer visible/running.
    Stopped,
    /// Torn down. Terminal.
    Destroyed,
}

impl LifecycleState {
    /// True if a Pause is not needed before a Stop (i.e. not resumed).
    #[inline]
    pub fn is_paused(self) -> bool {
        !matches!(self, LifecycleState::Resumed)
    }

    /// True if the record is stopped or was never started.
    #[inline]
    pub fn is_stopped(self) -> bool {
        matches!(
            self,
            LifecycleState::Initialized | LifecycleState::Stopped | LifecycleState::Destroyed
        )
    }

    /// Returns the ordered steps leading from `self` to `target`.
    ///
    /// ### Examples
    /// ```text
    /// Resumed  → Stopped    : [Pause, Stop]
    /// Paused   → Paused     : []             (idempotent)
    /// Stopped  → Resumed    : [Restart, Resume]
    /// Started  → Destroyed  : [Stop, Destroy]
    /// ```
    pub fn path_to(
        self,
        target: LifecycleState,
        kind: ComponentKind,
    ) -> Result<Vec<Step>, TransitionError> {
        use LifecycleState as S;
        use Step::*;

        let invalid = TransitionError::Invalid { from: self, target };
        if !kind.is_visual() && matches!(target, S::Resumed | S::Paused) {
            return Err(invalid);
        }

        let steps = match (self, target) {
            (S::Destroyed, _) => return Err(invalid),
            (S::Initialized, S::Initialized) => vec![],
            (_, S::Initialized) => return Err(invalid),

            (S::Initialized, S::Started) => vec![Start],
            (S::Started, S::Started) => vec![],
            (S::Stopped, S::Started) => vec![Restart],
            (_, S::Started) => return Err(invalid),

            (S::Initialized, S::Resumed) => vec![Start, Resume],
            (S::Started | S::Paused, S::Resumed) => vec![Resume],
            (S::Resumed, S::Resumed) => vec![],
            (S::Stopped, S::Resumed) => vec![Restart, Resume],

            (S::Resumed, S::Paused) => vec![Pause],
            (_, S::Paused) => vec![],

            (S::Initialized, S::Stopped) => vec![Start, Stop],
            (S::Started | S::Paused, S::Stopped) => vec![Stop],
            (S::Resumed, S::Stopped) => vec![Pause, Stop],
            (S::Stopped, S::Stopped) => vec![],

            (S::Initialized | S::Stopped, S::Destroyed) => vec![Destroy],
            (S::Started | S::Paused, S::Destroyed) => vec![Stop, Destroy],
            (S::Resumed, S::Destroyed) => vec![Pause, Stop, Destroy],
        };
        Ok(steps)
    }

    /// Returns the steps of a fresh launch that ends in `target`.
    ///
    /// A foreground launch to `Paused` resumes and immediately re-pauses
    /// (starts-not-resumed).
    pub fn launch_path(
        target: LifecycleState,
        kind: ComponentKind,
    ) -> Result<Vec<Step>, TransitionError> {
        let mut steps = vec![Step::Create];
        match target {
            LifecycleState::Destroyed => {
                return Err(TransitionError::Invalid {
                    from: LifecycleState::Initialized,
                    target,
                });
            }
            LifecycleState::Paused if kind.is_visual() => {
                steps.extend([Step::Start, Step::Resume, Step::Pause]);
            }
            _ => steps.extend(LifecycleState::Initialized.path_to(target, kind)?),
        }
        Ok(steps)
    }
}

/// A single lifecycle transition performed by the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Instantiate and call `on_create`.
    Create,
    /// Call `on_start`.
    Start,
    /// Call `on_restart` then `on_start` (from Stopped).
    Restart,
    /// Deliver pending payloads and call `on_resume`.
    Resume,
    /// Call `on_pause`.
    Pause,
    /// Save state and call `on_stop`.
    Stop,
    /// Call `on_destroy` and drop the instance.
    Destroy,
}

impl Step {
    /// State of the record after the step completed.
    #[inline]
    pub fn resulting_state(self) -> LifecycleState {
        match self {
            Step::Create => LifecycleState::Initialized,
            Step::Start | Step::Restart => LifecycleState::Started,
            Step::Resume => LifecycleState::Resumed,
            Step::Pause => LifecycleState::Paused,
            Step::Stop => LifecycleState::Stopped,
            Step::Destroy => LifecycleState::Destroyed,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(self) -> &'static str {
        match self {
            Step::Create => "create",
            Step::Start => "start",
            Step::Restart => "restart",
            Step::Resume => "resume",
            Step::Pause => "pause",
            Step::Stop => "stop",
            Step::Destroy => "destroy",
        }
    }
}
