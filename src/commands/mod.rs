//! # Inbound commands and their submission handle.
//!
//! - [`Command`] tagged lifecycle commands issued by the orchestrator boundary;
//! - [`RelaunchCommand`] payload of a destroy-and-recreate request;
//! - [`RuntimeHandle`] cloneable submission side of the dispatcher queue (stamps sequences).
//!
//! Internally every submission travels as an `Envelope` carrying the stamped
//! sequence, its origin and the instruction to run.

mod command;
mod handle;

pub(crate) use command::{Envelope, Instruction};
pub use command::{Command, Origin, RelaunchCommand};
pub use handle::RuntimeHandle;
