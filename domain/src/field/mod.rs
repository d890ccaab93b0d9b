//! Field domain module
//!
//! This module defines the core abstractions of the **fixup pipeline** —
//! how a partially-filled, multi-field input is validated field by field,
//! in dependency order, into structured accept/reject feedback.
//!
//! # Overview
//!
//! A tool's input is declared as a set of [`FieldDecl`]s collected into a
//! [`FixupSpec`]. Each declaration names its hard dependencies
//! (`requires`) and soft influences (`influenced_by`) and carries a
//! [`FieldValidator`]. Construction validates every reference, rejects
//! dependency cycles, and precomputes one deterministic evaluation order.
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ FixupSpec    │───▶│ FieldOutcome │───▶│ FixupResult  │
//! │ (registry +  │    │ (one per     │    │ (accepted /  │
//! │  order)      │    │  field)      │    │  rejected)   │
//! └──────┬───────┘    └──────────────┘    └──────────────┘
//!        │
//!        ├─ requires:     "arrival" → ["departure"]
//!        └─ influencedBy: "date"    → ["passengers"]
//! ```
//!
//! # Hard dependencies vs soft influences
//!
//! | Edge | Gates evaluation order | Visible in context |
//! |------|------------------------|--------------------|
//! | `requires` | yes — the field is blocked until every dependency is valid | always |
//! | `influenced_by` | no — documentary ordering hint only | only when already validated |
//!
//! # Key Types
//!
//! - [`FixupSpec`] — immutable registry + precomputed evaluation order
//! - [`FieldDecl`] — one field: dependencies, kind, description, validator
//! - [`FixupInput`] — raw partial input for one call
//! - [`FieldOutcome`] — per-field result obeying the structural invariants
//! - [`FixupResult`] — aggregated accept/reject result
//! - [`ValidationContext`] / [`ContextView`] — normalized values flowing
//!   from validated fields to their dependents
//! - [`FieldValidator`] — async per-field validation function
//!
//! [`FieldValidator`]: validator::FieldValidator
//! [`FixupSpec`]: entities::FixupSpec
//! [`FieldDecl`]: entities::FieldDecl
//! [`FixupInput`]: entities::FixupInput
//! [`FieldOutcome`]: value_objects::FieldOutcome
//! [`FixupResult`]: value_objects::FixupResult
//! [`ValidationContext`]: value_objects::ValidationContext
//! [`ContextView`]: value_objects::ContextView

pub mod entities;
pub mod validator;
pub mod value_objects;

pub use entities::{FieldDecl, FixupInput, FixupSpec, FixupSpecBuilder, ValueKind};
pub use validator::{FieldValidator, FnValidator, ValidatorFault};
pub use value_objects::{
    ContextView, FieldOutcome, FixupResult, OutcomeViolation, ValidationContext,
};
