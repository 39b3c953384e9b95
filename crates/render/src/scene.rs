use glam::{EulerRot, Quat, Vec3};
use std::collections::BTreeSet;

/// Perspective camera placed by translation and XYZ Euler rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub translate: Vec3,
    /// Rotation in degrees, applied X then Y then Z.
    pub rotate_degrees: Vec3,
    /// Horizontal field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            translate: Vec3::new(0.0, 0.0, 5.0),
            rotate_degrees: Vec3::ZERO,
            fov_degrees: 54.43,
        }
    }
}

impl Camera {
    /// Default lens and orientation, placed at `translate`.
    pub fn at(translate: Vec3) -> Self {
        Self {
            translate,
            ..Self::default()
        }
    }

    fn orientation(&self) -> Quat {
        let r = self.rotate_degrees;
        Quat::from_euler(
            EulerRot::XYZ,
            r.x.to_radians(),
            r.y.to_radians(),
            r.z.to_radians(),
        )
    }

    /// World-space ray through the center of pixel `(x, y)`. The camera looks
    /// down its local -Z axis with +Y up.
    pub fn ray(&self, viewport: &Viewport, x: u32, y: u32) -> Ray {
        let half = (self.fov_degrees.to_radians() * 0.5).tan();
        let aspect = viewport.height as f32 / viewport.width.max(1) as f32;
        let u = (2.0 * (x as f32 + 0.5) / viewport.width as f32 - 1.0) * half;
        let v = (1.0 - 2.0 * (y as f32 + 0.5) / viewport.height as f32) * half * aspect;
        Ray {
            origin: self.translate,
            direction: (self.orientation() * Vec3::new(u, v, -1.0)).normalize(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

/// Output size and background of a model editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub clear_color: [u8; 4],
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 400,
            height: 400,
            clear_color: [92, 92, 92, 255],
        }
    }
}

/// Axis-aligned box drawn in a single unlit color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatBox {
    pub center: Vec3,
    pub half_extents: Vec3,
    /// Linear RGB in `[0, 1]`.
    pub color: Vec3,
}

impl FlatBox {
    /// Unit cube centered on the origin.
    pub fn unit_cube(color: Vec3) -> Self {
        Self {
            center: Vec3::ZERO,
            half_extents: Vec3::splat(0.5),
            color,
        }
    }

    /// Distance along `ray` to the first surface point, if any (slab test).
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let inv = ray.direction.recip();
        let t1 = (self.center - self.half_extents - ray.origin) * inv;
        let t2 = (self.center + self.half_extents - ray.origin) * inv;
        let near = t1.min(t2).max_element();
        let far = t1.max(t2).min_element();
        if far < near.max(0.0) {
            return None;
        }
        Some(if near > 0.0 { near } else { far })
    }
}

/// Boxes drawn by the reference host, and which of them are selected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub boxes: Vec<FlatBox>,
    selection: BTreeSet<usize>,
}

impl Scene {
    /// A single unit cube, as made by a fresh `polyCube`.
    pub fn cube(color: Vec3) -> Self {
        Self {
            boxes: vec![FlatBox::unit_cube(color)],
            selection: BTreeSet::new(),
        }
    }

    /// Add a box; returns its index.
    pub fn push(&mut self, shape: FlatBox) -> usize {
        self.boxes.push(shape);
        self.boxes.len() - 1
    }

    /// Add box `index` to the selection. False if there is no such box.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.boxes.len() {
            return false;
        }
        self.selection.insert(index);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selection.contains(&index)
    }

    /// Index of the nearest box hit by `ray`.
    pub fn nearest(&self, ray: &Ray) -> Option<usize> {
        self.boxes
            .iter()
            .enumerate()
            .filter_map(|(i, b)| b.intersect(ray).map(|t| (t, i)))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, i)| i)
    }
}
