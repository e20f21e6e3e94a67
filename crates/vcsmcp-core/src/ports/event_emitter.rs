//! Event emitter trait for lifecycle broadcasting.

use crate::events::VcsEvent;

/// Trait for emitting server lifecycle events.
///
/// # Implementations
///
/// - `NoopEmitter` - for tests and contexts without a listener
/// - Adapter-specific implementations (the CLI logs events through `tracing`)
pub trait EventEmitter: Send + Sync {
    /// Emit an event. Must not block.
    fn emit(&self, event: VcsEvent);
}

/// A no-op event emitter.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEmitter;

impl NoopEmitter {
    pub const fn new() -> Self {
        Self
    }
}

impl EventEmitter for NoopEmitter {
    fn emit(&self, _event: VcsEvent) {}
}
