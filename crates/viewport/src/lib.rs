//! Viewport overrides: which renderer, if any, replaces the default renderer
//! of each viewport editor.
//!
//! # Invariants
//! - An editor maps to at most one renderer at a time.
//! - A new override replaces the old one in a single step.
//! - Clearing is total and idempotent.

mod controller;
mod override_name;

pub use controller::{ActivationChange, OverrideError, ViewportOverrideController};
pub use override_name::{OverrideTarget, parse_override_name};

pub fn crate_info() -> &'static str {
    "hdbridge-viewport v0.1.0"
}
