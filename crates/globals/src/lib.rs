//! Render globals: bridge settings stored as typed attributes on the host
//! document's render-settings node.
//!
//! # Invariants
//! - Creation is idempotent and never overwrites an existing value.
//! - Freshly created attributes hold their documented defaults.

mod globals;

pub use globals::{
    COLOR_SELECTION_HIGHLIGHT, COLOR_SELECTION_HIGHLIGHT_COLOR, ENABLE_MOTION_SAMPLES,
    GlobalsError, MAXIMUM_SHADOW_MAP_RESOLUTION, RenderGlobals, SELECTION_OUTLINE,
    TEXTURE_MEMORY_PER_TEXTURE, WIREFRAME_SELECTION_HIGHLIGHT, documented_defaults,
    renderer_attribute_name,
};

pub fn crate_info() -> &'static str {
    "hdbridge-globals v0.1.0"
}
