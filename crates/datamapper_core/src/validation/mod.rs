//! Field-level validation for transfer objects.
//!
//! # Responsibility
//! - Hold per-type rule tables published by transfer types.
//! - Judge pass/fail, aborting or logging per each rule's switches.
//!
//! # Invariants
//! - Validation never mutates the inspected value.
//! - A log-only violation still makes the overall result `false`.

pub mod engine;
pub mod rule;
