//! Snapshot testing: reference images keyed by test case and snapshot name.
//!
//! # Invariants
//! - A reference is written only in record mode; compare mode never writes it.
//! - A mismatch is always reported with its distance and threshold.
//! - Captures complete before judgement; no partial frames are compared.

mod config;
mod store;

pub use config::{DEFAULT_TOLERANCE, SnapshotConfig};
pub use store::{CaptureError, FrameSource, SnapshotError, SnapshotStore};

pub fn crate_info() -> &'static str {
    "hdbridge-snapshot v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("snapshot"));
    }
}
