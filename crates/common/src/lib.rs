//! Shared identifiers and configuration for the renderer bridge.
//!
//! # Invariants
//! - Renderer ids and scene-delegate ids live in distinct namespaces.
//! - Editor handles are opaque; the bridge never interprets them.

pub mod config;
pub mod types;

pub use config::BridgeConfig;
pub use types::{
    DEFAULT_SCENE_DELEGATE_ID, EMBREE_RENDERER_ID, EditorHandle, RendererId, STORM_RENDERER_ID,
    SceneDelegateId,
};

pub fn crate_info() -> &'static str {
    "hdbridge-common v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("common"));
    }
}
