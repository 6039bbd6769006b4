//! # Lifecycle state machine.
//!
//! - [`state`]: states, steps and pure path computation per component kind;
//! - [`machine`]: executes steps against a record, invoking component callbacks.

mod machine;
mod state;

pub(crate) use machine::{LifecycleMachine, Progress};
pub use state::{LifecycleState, Step};
