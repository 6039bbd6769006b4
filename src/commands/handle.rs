//! # Submission handle for the dispatcher queue.
//!
//! [`RuntimeHandle`] is the only way commands reach the dispatcher. It is
//! cheap to clone and may be used from any thread; submission never blocks.
//!
//! ## Stamping
//! ```text
//! Resume/Pause/Stop             → stamp = carried seq;   sequencer.observe(seq)
//! Launch/Destroy/Relaunch/Deliver → stamp = sequencer.current()
//! request_recreate / Hook::recreate → stamp = sequencer.current()
//! ConfigurationChanged          → unsequenced (ordered by its own config seq)
//! ```
//!
//! Only the orchestrator advances the counter, so a local stamp never passes a
//! sequence the orchestrator has yet to send. Equal stamps are admitted.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use super::{Command, Envelope, Instruction, Origin, RelaunchCommand};
use crate::components::ComponentToken;
use crate::core::{RecordSnapshot, Sequencer};
use crate::error::SubmitError;

/// Cloneable handle used to submit commands to the runtime.
#[derive(Clone, Debug)]
pub struct RuntimeHandle {
    tx: mpsc::UnboundedSender<Envelope>,
    sequencer: Arc<Sequencer>,
}

impl RuntimeHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Envelope>, sequencer: Arc<Sequencer>) -> Self {
        Self { tx, sequencer }
    }

    /// Submits an orchestrator command.
    ///
    /// Returns the sequence the command was stamped with. Commands execute
    /// one at a time, in submission order.
    pub fn submit(&self, command: Command) -> Result<u64, SubmitError> {
        let seq = match command.carried_seq() {
            Some(seq) => {
                self.sequencer.observe(seq);
                seq
            }
            None => self.sequencer.current(),
        };
        self.enqueue(Envelope::new(seq, Origin::Remote, Instruction::Command(command)))?;
        Ok(seq)
    }

    /// Requests a local destroy-and-recreate of `token`.
    ///
    /// No orchestrator acknowledgment is produced for it unless a remote
    /// relaunch is merged into the same window.
    pub fn request_recreate(&self, token: ComponentToken) -> Result<u64, SubmitError> {
        let seq = self.sequencer.current();
        let cmd = Command::Relaunch(RelaunchCommand::new(token));
        self.enqueue(Envelope::new(seq, Origin::Local, Instruction::Command(cmd)))?;
        Ok(seq)
    }

    /// Returns snapshots of all live records, taken between two commands.
    pub async fn inspect(&self) -> Result<Vec<RecordSnapshot>, SubmitError> {
        let (reply, rx) = oneshot::channel();
        self.enqueue(Envelope::new(
            self.sequencer.current(),
            Origin::Local,
            Instruction::Inspect(reply),
        ))?;
        rx.await.map_err(|_| SubmitError::Closed)
    }

    /// Current value of the lifecycle sequence counter.
    pub fn current_seq(&self) -> u64 {
        self.sequencer.current()
    }

    /// True once the dispatcher has stopped accepting work.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Enqueues runtime-internal work stamped with the current sequence.
    pub(crate) fn enqueue_local(&self, instruction: Instruction) -> Result<(), SubmitError> {
        self.enqueue(Envelope::new(self.sequencer.current(), Origin::Local, instruction))
    }

    pub(crate) fn enqueue(&self, envelope: Envelope) -> Result<(), SubmitError> {
        self.tx.send(envelope).map_err(|_| SubmitError::Closed)
    }
}
