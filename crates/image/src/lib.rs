//! Image buffers and the frame comparator.
//!
//! # Invariants
//! - Comparison never mutates either buffer.
//! - Distances are deterministic: identical inputs give bit-identical results.
//! - `identical` holds iff the distance is exactly zero.

mod buffer;
mod compare;

pub use buffer::{ImageBuffer, ImageError, PixelFormat, Samples};
pub use compare::{ComparisonResult, Metric, compare, distance};

pub fn crate_info() -> &'static str {
    "hdbridge-image v0.1.0"
}
