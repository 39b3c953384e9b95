use hdbridge_common::{EditorHandle, RendererId};
use hdbridge_globals::RenderGlobals;
use hdbridge_image::{ImageBuffer, ImageError};
use hdbridge_snapshot::{CaptureError, FrameSource};
use hdbridge_viewport::{OverrideError, ViewportOverrideController};

use crate::renderer::{FlatShadedRenderer, Renderer, SelectionStyle};
use crate::scene::{Camera, Scene, Viewport};

/// Handle of the editor a fresh host starts with.
pub const DEFAULT_EDITOR: &str = "modelPanel4";

/// Errors from the reference host.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("no model editor {0}")]
    UnknownEditor(EditorHandle),
    #[error("model editor {0} already exists")]
    DuplicateEditor(EditorHandle),
    #[error("no shape {0} in the scene")]
    UnknownShape(usize),
    #[error(transparent)]
    Override(#[from] OverrideError),
    #[error("image error: {0}")]
    Image(#[from] ImageError),
}

/// One viewport editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelEditor {
    pub handle: EditorHandle,
    /// Name of the renderer override the host assigned; empty for none.
    pub renderer_override_name: String,
    /// Delegate that drew the last refresh, `None` for the default renderer.
    pub drawn_by: Option<RendererId>,
}

impl ModelEditor {
    fn new(handle: EditorHandle) -> Self {
        Self {
            handle,
            renderer_override_name: String::new(),
            drawn_by: None,
        }
    }
}

/// The host side of the bridge: editors, scene, camera and a renderer.
#[derive(Debug, Clone)]
pub struct SoftwareHost {
    scene: Scene,
    camera: Camera,
    viewport: Viewport,
    /// Never empty; the first editor has keyboard focus.
    editors: Vec<ModelEditor>,
    renderer: FlatShadedRenderer,
}

impl SoftwareHost {
    /// Host with one editor, [`DEFAULT_EDITOR`], which is active.
    pub fn new(scene: Scene, camera: Camera, viewport: Viewport) -> Self {
        Self {
            scene,
            camera,
            viewport,
            editors: vec![ModelEditor::new(EditorHandle::from(DEFAULT_EDITOR))],
            renderer: FlatShadedRenderer::new(),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Editor with keyboard focus.
    pub fn active_editor(&self) -> &EditorHandle {
        &self.editors[0].handle
    }

    pub fn add_editor(&mut self, editor: EditorHandle) -> Result<(), RenderError> {
        if self.index_of(&editor).is_ok() {
            return Err(RenderError::DuplicateEditor(editor));
        }
        tracing::debug!(%editor, "model editor added");
        self.editors.push(ModelEditor::new(editor));
        Ok(())
    }

    /// Add shape `index` to the selection.
    pub fn select(&mut self, index: usize) -> Result<(), RenderError> {
        if !self.scene.select(index) {
            return Err(RenderError::UnknownShape(index));
        }
        tracing::debug!(shape = index, "shape selected");
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.scene.clear_selection();
    }

    /// Take selection highlight settings from the document's render globals.
    pub fn apply_render_globals(&mut self, globals: &RenderGlobals) {
        let style = SelectionStyle::from_globals(globals);
        tracing::debug!(?style, "selection style updated");
        self.renderer = FlatShadedRenderer::with_selection(style);
    }

    pub fn editors(&self) -> &[ModelEditor] {
        &self.editors
    }

    pub fn editor(&self, editor: &EditorHandle) -> Result<&ModelEditor, RenderError> {
        Ok(&self.editors[self.index_of(editor)?])
    }

    /// Assign an override name. Takes effect on the next [`refresh`](Self::refresh).
    pub fn set_renderer_override_name(
        &mut self,
        editor: &EditorHandle,
        name: impl Into<String>,
    ) -> Result<(), RenderError> {
        let index = self.index_of(editor)?;
        self.editors[index].renderer_override_name = name.into();
        Ok(())
    }

    /// Push every editor's override name into `overrides` and redraw every
    /// editor. Returns once all frames are complete.
    ///
    /// Names are checked before any is applied. An editor naming a delegate
    /// that is not selectable goes back to the default renderer and nothing is
    /// drawn. Other editors keep their current overrides.
    pub fn refresh(
        &mut self,
        overrides: &mut ViewportOverrideController,
    ) -> Result<Vec<ImageBuffer>, RenderError> {
        let _span = tracing::info_span!("host_refresh", editors = self.editors.len()).entered();

        let mut rejected = None;
        for editor in &mut self.editors {
            if let Err(err) = overrides.validate_override_name(&editor.renderer_override_name) {
                tracing::warn!(editor = %editor.handle, error = %err, "override name rejected");
                overrides.deactivate(&editor.handle);
                editor.drawn_by = None;
                rejected.get_or_insert(err);
            }
        }
        if let Some(err) = rejected {
            return Err(err.into());
        }

        for editor in &mut self.editors {
            overrides.apply_override_name(&editor.handle, &editor.renderer_override_name)?;
            editor.drawn_by = overrides.active_for(&editor.handle).cloned();
            tracing::debug!(
                editor = %editor.handle,
                renderer = editor.drawn_by.as_ref().map(RendererId::as_str).unwrap_or("default"),
                "editor refreshed"
            );
        }
        self.editors.iter().map(|_| self.draw()).collect()
    }

    /// Render the current frame of `editor`.
    pub fn render(&self, editor: &EditorHandle) -> Result<ImageBuffer, RenderError> {
        self.index_of(editor)?;
        self.draw()
    }

    fn draw(&self) -> Result<ImageBuffer, RenderError> {
        Ok(self
            .renderer
            .render(&self.scene, &self.camera, &self.viewport)?)
    }

    fn index_of(&self, editor: &EditorHandle) -> Result<usize, RenderError> {
        self.editors
            .iter()
            .position(|e| e.handle == *editor)
            .ok_or_else(|| RenderError::UnknownEditor(editor.clone()))
    }
}

impl Default for SoftwareHost {
    fn default() -> Self {
        Self::new(Scene::default(), Camera::default(), Viewport::default())
    }
}

impl FrameSource for SoftwareHost {
    fn capture(&mut self, editor: &EditorHandle) -> Result<ImageBuffer, CaptureError> {
        self.render(editor).map_err(|e| CaptureError {
            editor: editor.clone(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use hdbridge_common::{BridgeConfig, EMBREE_RENDERER_ID, STORM_RENDERER_ID};
    use hdbridge_globals::{COLOR_SELECTION_HIGHLIGHT, WIREFRAME_SELECTION_HIGHLIGHT};
    use hdbridge_registry::{DelegateRegistry, SettingValue};

    fn small_host() -> SoftwareHost {
        SoftwareHost::new(
            Scene::cube(Vec3::ONE),
            Camera::default(),
            Viewport {
                width: 8,
                height: 8,
                ..Viewport::default()
            },
        )
    }

    #[test]
    fn fresh_host_has_default_editor() {
        let host = small_host();
        assert_eq!(host.active_editor().as_str(), DEFAULT_EDITOR);
        assert_eq!(host.editors().len(), 1);
    }

    #[test]
    fn duplicate_and_unknown_editors_are_errors() {
        let mut host = small_host();
        host.add_editor(EditorHandle::from("modelPanel1")).unwrap();
        assert!(matches!(
            host.add_editor(EditorHandle::from("modelPanel1")),
            Err(RenderError::DuplicateEditor(_))
        ));
        assert!(matches!(
            host.render(&EditorHandle::from("nope")),
            Err(RenderError::UnknownEditor(_))
        ));
    }

    #[test]
    fn refresh_applies_override_names() {
        let registry = DelegateRegistry::with_builtins();
        let mut overrides = ViewportOverrideController::new(&registry);
        let mut host = small_host();
        let editor = host.active_editor().clone();
        let embree = RendererId::from(EMBREE_RENDERER_ID);

        let name = overrides.config().override_name(&embree);
        host.set_renderer_override_name(&editor, name).unwrap();
        let frames = host.refresh(&mut overrides).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(overrides.active_for(&editor), Some(&embree));
        assert_eq!(host.editor(&editor).unwrap().drawn_by, Some(embree));

        host.set_renderer_override_name(&editor, "").unwrap();
        host.refresh(&mut overrides).unwrap();
        assert!(overrides.list_active().is_empty());
        assert_eq!(host.editor(&editor).unwrap().drawn_by, None);
    }

    #[test]
    fn unknown_override_name_fails_refresh() {
        let registry = DelegateRegistry::with_builtins();
        let mut overrides = ViewportOverrideController::new(&registry);
        let mut host = small_host();
        let editor = host.active_editor().clone();
        let name = overrides.config().override_name(&RendererId::from("HdNope"));
        host.set_renderer_override_name(&editor, name).unwrap();
        assert!(matches!(
            host.refresh(&mut overrides),
            Err(RenderError::Override(OverrideError::UnknownDelegate(_)))
        ));
    }

    #[test]
    fn rejected_name_returns_editor_to_default_renderer() {
        let registry = DelegateRegistry::with_builtins();
        let mut overrides = ViewportOverrideController::new(&registry);
        let mut host = small_host();
        let editor = host.active_editor().clone();
        let storm = RendererId::from(STORM_RENDERER_ID);

        let name = overrides.config().override_name(&storm);
        host.set_renderer_override_name(&editor, name).unwrap();
        host.refresh(&mut overrides).unwrap();
        assert_eq!(overrides.active_for(&editor), Some(&storm));

        let name = overrides.config().override_name(&RendererId::from("HdNope"));
        host.set_renderer_override_name(&editor, name).unwrap();
        assert!(host.refresh(&mut overrides).is_err());
        assert!(overrides.list_active().is_empty());
        assert_eq!(host.editor(&editor).unwrap().drawn_by, None);
    }

    #[test]
    fn rejected_name_leaves_other_editors_alone() {
        let registry = DelegateRegistry::with_builtins();
        let mut overrides = ViewportOverrideController::new(&registry);
        let mut host = small_host();
        let first = host.active_editor().clone();
        let second = EditorHandle::from("modelPanel1");
        host.add_editor(second.clone()).unwrap();
        let embree = RendererId::from(EMBREE_RENDERER_ID);
        let storm = RendererId::from(STORM_RENDERER_ID);

        let name = overrides.config().override_name(&embree);
        host.set_renderer_override_name(&first, name).unwrap();
        host.refresh(&mut overrides).unwrap();

        let name = overrides.config().override_name(&storm);
        host.set_renderer_override_name(&first, name).unwrap();
        let name = overrides.config().override_name(&RendererId::from("HdNope"));
        host.set_renderer_override_name(&second, name).unwrap();
        assert!(host.refresh(&mut overrides).is_err());

        assert_eq!(overrides.active_for(&first), Some(&embree));
        assert_eq!(host.editor(&first).unwrap().drawn_by, Some(embree.clone()));
        assert_eq!(overrides.active_for(&second), None);
        assert_eq!(host.editor(&second).unwrap().drawn_by, None);
        assert_eq!(overrides.list_active(), vec![embree]);
    }

    #[test]
    fn selecting_a_missing_shape_is_an_error() {
        let mut host = small_host();
        assert!(matches!(host.select(3), Err(RenderError::UnknownShape(3))));
        host.select(0).unwrap();
        assert!(host.scene().is_selected(0));
        host.clear_selection();
        assert!(!host.scene().is_selected(0));
    }

    #[test]
    fn render_globals_drive_the_highlight() {
        let registry = DelegateRegistry::with_builtins();
        let config = BridgeConfig::default();
        let mut globals = RenderGlobals::new(config.clone());
        globals.create(&registry);
        globals
            .set(
                &config.attribute_name(COLOR_SELECTION_HIGHLIGHT),
                SettingValue::Bool(false),
            )
            .unwrap();
        globals
            .set(
                &config.attribute_name(WIREFRAME_SELECTION_HIGHLIGHT),
                SettingValue::Bool(false),
            )
            .unwrap();

        let mut host = small_host();
        let editor = host.active_editor().clone();
        let plain = host.render(&editor).unwrap();
        host.select(0).unwrap();
        assert_ne!(host.render(&editor).unwrap(), plain);

        host.apply_render_globals(&globals);
        assert_eq!(host.render(&editor).unwrap(), plain);
    }

    #[test]
    fn capture_of_unknown_editor_is_capture_error() {
        let mut host = small_host();
        let err = host.capture(&EditorHandle::from("gone")).unwrap_err();
        assert_eq!(err.editor.as_str(), "gone");
    }
}
