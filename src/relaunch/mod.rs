//! # Relaunch request coalescing.
//!
//! At most one [`RelaunchRequest`] is pending per token. Further requests
//! that arrive before the physical relaunch runs are folded into it by the
//! [`RelaunchMerger`]; exactly one destroy-and-recreate runs per merge window.

mod merger;

pub use merger::{MergeOutcome, RelaunchDefaults, RelaunchMerger, RelaunchRequest};
