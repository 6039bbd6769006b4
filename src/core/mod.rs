//! Runtime core: sequencing, records and the dispatcher.
//!
//! The public API of this module is [`Runtime`] (built through
//! [`RuntimeBuilder`]), [`Sequencer`] and [`RecordSnapshot`].
//!
//! Internal modules:
//! - [`dispatcher`]: single consumer of the command queue; runs handlers to completion;
//! - [`record`]: per-component lifecycle record and its snapshot;
//! - [`store`]: live records by token, plus tombstones of destroyed tokens;
//! - [`sequencer`]: monotonic lifecycle sequence counter;
//! - [`shutdown`]: termination signal handling.

mod builder;
mod dispatcher;
mod record;
mod runtime;
mod sequencer;
mod shutdown;
mod store;


pub use builder::RuntimeBuilder;
pub(crate) use record::ComponentRecord;
pub use record::RecordSnapshot;
pub use runtime::Runtime;
pub use sequencer::Sequencer;
