//! Command facade: the single flag-driven entry point of the bridge.
//!
//! # Invariants
//! - Exactly one operation per request, validated before anything runs.
//! - Short and long flag spellings resolve to the same request.
//! - Failed validation has no side effects.

mod facade;
mod request;

pub use facade::{CommandFacade, CommandOutput};
pub use request::{CommandError, CommandRequest, FLAGS, FlagSpec};

pub fn crate_info() -> &'static str {
    "hdbridge-command v0.1.0"
}
