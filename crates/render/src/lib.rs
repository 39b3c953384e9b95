//! Software reference host for the renderer bridge.
//!
//! Stands in for the host application: model editors carrying a
//! renderer-override name, a scene of flat-colored boxes seen through one
//! camera, and synchronous frame capture.
//!
//! # Invariants
//! - Rendering never mutates the scene or the camera.
//! - A frame is returned only once every pixel has been written.
//! - Every render delegate draws through the same flat-shaded path; the host
//!   tracks which delegate drew an editor, not how.
//! - Selection highlights follow the document's render globals.

mod host;
mod renderer;
mod scene;

pub use host::{DEFAULT_EDITOR, ModelEditor, RenderError, SoftwareHost};
pub use renderer::{FlatShadedRenderer, Renderer, SelectionStyle};
pub use scene::{Camera, FlatBox, Scene, Viewport};

pub fn crate_info() -> &'static str {
    "hdbridge-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
