//! Application layer for formfix
//!
//! This crate contains the fixup use case and port definitions. It depends
//! only on the domain layer.
//!
//! The entry point is [`RunFixupUseCase`]: given an immutable
//! [`FixupSpec`](formfix_domain::FixupSpec) and a raw partial input, it
//! walks the precomputed evaluation order, consults each field's validator
//! (or blocks the field on unmet dependencies), and aggregates the
//! outcomes into one accept/reject result.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    action::{ActionError, ToolActionPort},
    progress::{FixupProgressNotifier, NoFixupProgress},
    shape_check::{ShapeCheckPort, ShapeMismatch},
};
pub use use_cases::run_fixup::{FixupError, InvariantPolicy, RunFixupUseCase};
