//! Fixup progress port.
//!
//! Lets the embedding application observe one fixup call as it walks the
//! evaluation order (spinners, logs, traces). All methods have no-op
//! defaults; implement the ones you need.

/// Observer for the per-field progress of one fixup call.
pub trait FixupProgressNotifier: Send + Sync {
    /// A field's validator is about to run.
    fn on_field_start(&self, _field: &str) {}

    /// A field was skipped because its dependencies are not yet valid.
    fn on_field_blocked(&self, _field: &str, _unmet: &[String]) {}

    /// A field's outcome was recorded.
    fn on_field_outcome(&self, _field: &str, _valid: bool) {}

    /// The walk finished and was aggregated.
    fn on_result(&self, _accepted: bool) {}
}

/// Null object for callers that do not observe progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFixupProgress;

impl FixupProgressNotifier for NoFixupProgress {}
