//! Port definitions (traits) implemented by adapters.
//!
//! Ports keep application code independent of the protocol layer: command
//! handlers depend on `VcsExecutor`, never on the manager type itself.

mod event_emitter;
mod vcs_executor;

pub use event_emitter::{EventEmitter, NoopEmitter};
pub use vcs_executor::VcsExecutor;
