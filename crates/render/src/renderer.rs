use glam::Vec3;
use hdbridge_globals::{
    COLOR_SELECTION_HIGHLIGHT, COLOR_SELECTION_HIGHLIGHT_COLOR, RenderGlobals, SELECTION_OUTLINE,
    WIREFRAME_SELECTION_HIGHLIGHT,
};
use hdbridge_image::{ImageBuffer, ImageError};
use hdbridge_registry::SettingValue;

use crate::scene::{Camera, Scene, Viewport};

/// Renderer-agnostic interface. Reads the scene and a view, produces output,
/// never mutates either.
pub trait Renderer {
    type Output;

    fn render(&self, scene: &Scene, camera: &Camera, viewport: &Viewport) -> Self::Output;
}

/// How selected boxes are drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionStyle {
    /// Blend the highlight color over selected surfaces by its alpha.
    pub color_highlight: bool,
    pub highlight_color: [f32; 4],
    /// Draw the silhouette of selected boxes in the highlight color.
    pub wireframe_highlight: bool,
    /// Silhouette width in pixels.
    pub outline_px: f32,
}

impl Default for SelectionStyle {
    fn default() -> Self {
        Self {
            color_highlight: true,
            highlight_color: [1.0, 1.0, 0.0, 0.5],
            wireframe_highlight: true,
            outline_px: 4.0,
        }
    }
}

impl SelectionStyle {
    /// Style described by the document's render globals. Attributes that do
    /// not exist yet keep their defaults.
    pub fn from_globals(globals: &RenderGlobals) -> Self {
        let mut style = Self::default();
        if let Some(v) = globals.setting(COLOR_SELECTION_HIGHLIGHT) {
            style.color_highlight = v.is_truthy();
        }
        if let Some(SettingValue::Color(c)) = globals.setting(COLOR_SELECTION_HIGHLIGHT_COLOR) {
            style.highlight_color = *c;
        }
        if let Some(v) = globals.setting(WIREFRAME_SELECTION_HIGHLIGHT) {
            style.wireframe_highlight = v.is_truthy();
        }
        match globals.setting(SELECTION_OUTLINE) {
            Some(SettingValue::Float(f)) => style.outline_px = *f as f32,
            Some(SettingValue::Int(i)) => style.outline_px = *i as f32,
            _ => {}
        }
        style
    }

    fn outline_radius(&self) -> i64 {
        if self.wireframe_highlight {
            self.outline_px.max(0.0).round() as i64
        } else {
            0
        }
    }
}

/// Unlit renderer: each pixel takes the color of the nearest box, or the
/// viewport clear color. Selected boxes get the highlight of its
/// [`SelectionStyle`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FlatShadedRenderer {
    selection: SelectionStyle,
}

impl FlatShadedRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selection(selection: SelectionStyle) -> Self {
        Self { selection }
    }

    fn shade(&self, scene: &Scene, hit: usize) -> Vec3 {
        let base = scene.boxes[hit].color;
        if self.selection.color_highlight && scene.is_selected(hit) {
            let [r, g, b, a] = self.selection.highlight_color;
            base.lerp(Vec3::new(r, g, b), a.clamp(0.0, 1.0))
        } else {
            base
        }
    }

    /// True when a selected pixel lies within the outline radius of a pixel
    /// showing something else. Pixels outside the frame do not count.
    fn on_outline(
        hits: &[Option<usize>],
        width: u32,
        height: u32,
        x: u32,
        y: u32,
        r: i64,
    ) -> bool {
        let own = hits[(y * width + x) as usize];
        for dy in -r..=r {
            for dx in -r..=r {
                let (nx, ny) = (x as i64 + dx, y as i64 + dy);
                if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                    continue;
                }
                if hits[(ny as u32 * width + nx as u32) as usize] != own {
                    return true;
                }
            }
        }
        false
    }
}

fn to_rgba8(color: Vec3) -> [u8; 4] {
    let c = (color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
    [c.x as u8, c.y as u8, c.z as u8, 255]
}

impl Renderer for FlatShadedRenderer {
    type Output = Result<ImageBuffer, ImageError>;

    fn render(&self, scene: &Scene, camera: &Camera, viewport: &Viewport) -> Self::Output {
        let (width, height) = (viewport.width, viewport.height);
        let mut hits = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                hits.push(scene.nearest(&camera.ray(viewport, x, y)));
            }
        }

        let radius = self.selection.outline_radius();
        let [r, g, b, _] = self.selection.highlight_color;
        let outline = to_rgba8(Vec3::new(r, g, b));
        let mut samples = Vec::with_capacity(hits.len() * 4);
        for y in 0..height {
            for x in 0..width {
                let pixel = match hits[(y * width + x) as usize] {
                    None => viewport.clear_color,
                    Some(hit)
                        if radius > 0
                            && scene.is_selected(hit)
                            && Self::on_outline(&hits, width, height, x, y, radius) =>
                    {
                        outline
                    }
                    Some(hit) => to_rgba8(self.shade(scene, hit)),
                };
                samples.extend_from_slice(&pixel);
            }
        }
        tracing::trace!(width, height, boxes = scene.boxes.len(), "frame rendered");
        ImageBuffer::from_rgba8(width, height, samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdbridge_common::BridgeConfig;
    use hdbridge_registry::DelegateRegistry;

    fn small() -> Viewport {
        Viewport {
            width: 9,
            height: 9,
            ..Viewport::default()
        }
    }

    #[test]
    fn empty_scene_is_clear_color() {
        let vp = Viewport {
            width: 4,
            height: 2,
            clear_color: [1, 2, 3, 255],
        };
        let img = FlatShadedRenderer::new()
            .render(&Scene::default(), &Camera::default(), &vp)
            .unwrap();
        assert_eq!(img.dimensions(), (4, 2));
        assert_eq!(img.pixel_rgba8(3, 1), Some([1, 2, 3, 255]));
    }

    #[test]
    fn cube_fills_the_center() {
        let vp = small();
        let img = FlatShadedRenderer::new()
            .render(&Scene::cube(Vec3::new(0.75, 0.5, 0.25)), &Camera::default(), &vp)
            .unwrap();
        assert_eq!(img.pixel_rgba8(4, 4), Some([191, 128, 64, 255]));
        assert_eq!(img.pixel_rgba8(0, 0), Some(vp.clear_color));
    }

    #[test]
    fn selected_cube_is_tinted_and_outlined() {
        let vp = Viewport {
            width: 41,
            height: 41,
            ..Viewport::default()
        };
        let mut scene = Scene::cube(Vec3::splat(0.5));
        scene.select(0);
        // Outline of one pixel, so the center pixel keeps the tint.
        let renderer = FlatShadedRenderer::with_selection(SelectionStyle {
            outline_px: 1.0,
            ..SelectionStyle::default()
        });
        let img = renderer.render(&scene, &Camera::default(), &vp).unwrap();
        assert_eq!(img.pixel_rgba8(20, 20), Some([191, 191, 64, 255]));
        assert_eq!(img.pixel_rgba8(0, 0), Some(vp.clear_color));

        let edge = (0..41)
            .map(|x| img.pixel_rgba8(x, 20).unwrap())
            .find(|px| *px != vp.clear_color);
        assert_eq!(edge, Some([255, 255, 0, 255]));
    }

    #[test]
    fn disabled_highlights_draw_selection_plainly() {
        let vp = small();
        let plain = Scene::cube(Vec3::splat(0.5));
        let mut selected = plain.clone();
        selected.select(0);
        let renderer = FlatShadedRenderer::with_selection(SelectionStyle {
            color_highlight: false,
            wireframe_highlight: false,
            ..SelectionStyle::default()
        });
        let camera = Camera::default();
        assert_eq!(
            renderer.render(&plain, &camera, &vp).unwrap(),
            renderer.render(&selected, &camera, &vp).unwrap()
        );
    }

    #[test]
    fn style_follows_render_globals() {
        let registry = DelegateRegistry::with_builtins();
        let config = BridgeConfig::default();
        let mut globals = RenderGlobals::new(config.clone());
        assert_eq!(SelectionStyle::from_globals(&globals), SelectionStyle::default());

        globals.create(&registry);
        assert_eq!(SelectionStyle::from_globals(&globals), SelectionStyle::default());

        globals
            .set(
                &config.attribute_name(COLOR_SELECTION_HIGHLIGHT_COLOR),
                SettingValue::Color([0.0, 0.0, 1.0, 1.0]),
            )
            .unwrap();
        globals
            .set(
                &config.attribute_name(WIREFRAME_SELECTION_HIGHLIGHT),
                SettingValue::Bool(false),
            )
            .unwrap();
        globals
            .set(&config.attribute_name(SELECTION_OUTLINE), SettingValue::Float(2.0))
            .unwrap();
        let style = SelectionStyle::from_globals(&globals);
        assert_eq!(style.highlight_color, [0.0, 0.0, 1.0, 1.0]);
        assert!(!style.wireframe_highlight);
        assert_eq!(style.outline_px, 2.0);
        assert_eq!(style.outline_radius(), 0);
    }

    #[test]
    fn colors_are_clamped() {
        assert_eq!(to_rgba8(Vec3::new(2.0, -1.0, 0.5)), [255, 0, 128, 255]);
    }
}
