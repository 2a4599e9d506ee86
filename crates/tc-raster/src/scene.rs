// SPDX-License-Identifier: MIT
//! Placing models in front of a camera.
//!
//! A [`Transform`] builds the model matrix, a [`Camera`] the view and
//! projection for the current canvas, and a [`Rasterizer`] draws whole
//! models with them, keeping the depth buffer sized to the canvas.

use tc_term::{Canvas, Color};

use crate::depth::DepthBuffer;
use crate::math::{Mat4, Vec3};
use crate::model::Model;
use crate::raster::{draw_triangle_filled, draw_triangle_wireframe};

// ─── Transform ───────────────────────────────────────────────────────────────

/// Where a model sits, how big it is, and how it is turned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub size: Vec3,
    /// Rotation about X, then Y, then Z, in radians.
    pub rotation: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            size: Vec3::ONE,
            rotation: Vec3::ZERO,
        }
    }
}

impl Transform {
    /// Scale, rotate about X, Y and Z in turn, then translate.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        let Self {
            position: p,
            size: s,
            rotation: r,
        } = *self;
        Mat4::identity()
            * Mat4::scale(s.x, s.y, s.z)
            * Mat4::rotate_x(r.x)
            * Mat4::rotate_y(r.y)
            * Mat4::rotate_z(r.z)
            * Mat4::translate(p.x, p.y, p.z)
    }
}

// ─── Camera ──────────────────────────────────────────────────────────────────

/// A fixed camera on the +Z axis looking at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    /// Distance from the origin.
    pub distance: f32,
    /// Width / height of one character cell. Cells are roughly twice as
    /// tall as they are wide.
    pub cell_aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov_y: 45f32.to_radians(),
            near: 0.1,
            far: 100.0,
            distance: 5.0,
            cell_aspect: 0.5,
        }
    }
}

impl Camera {
    #[must_use]
    pub const fn view(&self) -> Mat4 {
        Mat4::translate(0.0, 0.0, -self.distance)
    }

    /// Projection for a `width × height` cell canvas.
    #[must_use]
    pub fn projection(&self, width: u16, height: u16) -> Mat4 {
        let aspect = f32::from(width) / f32::from(height.max(1)) * self.cell_aspect;
        Mat4::perspective(self.fov_y, aspect, self.near, self.far)
    }

    /// `view * projection` for a `width × height` cell canvas.
    #[must_use]
    pub fn view_projection(&self, width: u16, height: u16) -> Mat4 {
        self.view() * self.projection(width, height)
    }
}

// ─── Rasterizer ──────────────────────────────────────────────────────────────

/// Draws models through a camera onto any [`Canvas`].
///
/// ```
/// use tc_raster::{Rasterizer, Transform, CUBE};
/// use tc_term::{color, FrameBuffer};
///
/// let mut fb = FrameBuffer::new(40, 20);
/// let mut rasterizer = Rasterizer::default();
/// rasterizer.draw_model_filled(&mut fb, &CUBE, &Transform::default(), color::RED);
/// assert_eq!(fb.get(20, 10).map(|c| c.bg), Some(color::RED));
/// ```
#[derive(Debug, Clone)]
pub struct Rasterizer {
    pub camera: Camera,
    depth: DepthBuffer,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new(Camera::default())
    }
}

impl Rasterizer {
    #[must_use]
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            depth: DepthBuffer::new(0, 0),
        }
    }

    /// Depth left behind by the last filled draw.
    #[must_use]
    pub const fn depth(&self) -> &DepthBuffer {
        &self.depth
    }

    /// Full model-view-projection matrix for `transform` on `canvas`.
    #[must_use]
    pub fn mvp(&self, canvas: &impl Canvas, transform: &Transform) -> Mat4 {
        transform.matrix() * self.camera.view_projection(canvas.width(), canvas.height())
    }

    /// Every edge of every face of `model`.
    pub fn draw_model_wireframe(&self, canvas: &mut impl Canvas, model: &Model, transform: &Transform, color: Color) {
        if canvas.width() == 0 || canvas.height() == 0 {
            return;
        }
        let mvp = self.mvp(&*canvas, transform);
        for [a, b, c] in model.triangles() {
            draw_triangle_wireframe(canvas, a, b, c, &mvp, color);
        }
    }

    /// Every face of `model`, depth-tested. The depth buffer is reset first,
    /// so separate calls do not occlude each other.
    pub fn draw_model_filled(&mut self, canvas: &mut impl Canvas, model: &Model, transform: &Transform, color: Color) {
        self.begin_filled(&*canvas);
        self.draw_model_filled_keep_depth(canvas, model, transform, color);
    }

    /// Start a depth pass: size the depth buffer to `canvas` and push every
    /// cell back to the far plane.
    ///
    /// Follow with [`draw_model_filled_keep_depth`](Self::draw_model_filled_keep_depth)
    /// for each model that should occlude the others.
    pub fn begin_filled(&mut self, canvas: &impl Canvas) {
        let (w, h) = (canvas.width(), canvas.height());
        if (w, h) != (self.depth.width(), self.depth.height()) {
            log::debug!("depth buffer resized to {w}x{h}");
        }
        self.depth.resize(w, h);
        self.depth.reset();
    }

    /// Every face of `model`, tested against the depth left by earlier draws
    /// since the last [`begin_filled`](Self::begin_filled).
    ///
    /// A canvas whose size no longer matches the depth buffer starts a fresh
    /// pass.
    pub fn draw_model_filled_keep_depth(
        &mut self,
        canvas: &mut impl Canvas,
        model: &Model,
        transform: &Transform,
        color: Color,
    ) {
        let (w, h) = (canvas.width(), canvas.height());
        if w == 0 || h == 0 {
            return;
        }
        if (w, h) != (self.depth.width(), self.depth.height()) {
            self.begin_filled(&*canvas);
        }

        let mvp = self.mvp(&*canvas, transform);
        for [a, b, c] in model.triangles() {
            draw_triangle_filled(canvas, &mut self.depth, a, b, c, &mvp, color);
        }
        log::trace!("filled {} faces", model.faces.len());
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depth::FAR;
    use crate::model::CUBE;
    use pretty_assertions::assert_eq;
    use tc_term::FrameBuffer;
    use tc_term::color::{BLACK, GREEN, RED};

    fn bg(fb: &FrameBuffer, x: u16, y: u16) -> Option<Color> {
        fb.get(x, y).map(|c| c.bg)
    }

    fn painted(fb: &FrameBuffer, color: Color) -> usize {
        fb.cells().iter().filter(|c| c.bg == color).count()
    }

    // ── Transform ───────────────────────────────────────────────────────

    #[test]
    fn default_transform_is_identity() {
        assert_eq!(Transform::default().matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn transform_scales_before_translating() {
        let t = Transform {
            position: Vec3::new(1.0, 0.0, 0.0),
            size: Vec3::splat(3.0),
            rotation: Vec3::ZERO,
        };
        let p = t.matrix().transform_point(Vec3::new(1.0, 0.0, 0.0));
        assert!((p.x - 4.0).abs() < 1e-6);
    }

    // ── Camera ──────────────────────────────────────────────────────────

    #[test]
    fn origin_projects_to_canvas_center() {
        let cam = Camera::default();
        let p = crate::raster::project(Vec3::ZERO, &cam.view_projection(80, 24), 80, 24);
        assert!((p.x - 40.0).abs() < 1e-4 && (p.y - 12.0).abs() < 1e-4);
        assert!(p.z > -1.0 && p.z < FAR);
    }

    #[test]
    fn zero_height_projection_stays_finite() {
        let m = Camera::default().projection(10, 0);
        assert!(m.m.iter().flatten().all(|v| v.is_finite()));
    }

    // ── Rasterizer ──────────────────────────────────────────────────────

    #[test]
    fn filled_cube_covers_center_not_corners() {
        let mut fb = FrameBuffer::new(40, 20);
        let mut r = Rasterizer::default();
        r.draw_model_filled(&mut fb, &CUBE, &Transform::default(), RED);
        assert_eq!(bg(&fb, 20, 10), Some(RED));
        assert_eq!(bg(&fb, 0, 0), Some(BLACK));
        assert_eq!(bg(&fb, 39, 19), Some(BLACK));
        assert!(r.depth().get(20, 10).is_some_and(|z| z < FAR));
    }

    #[test]
    fn wireframe_cube_draws_edges_only() {
        let mut fb = FrameBuffer::new(40, 20);
        let big = Transform {
            size: Vec3::splat(2.0),
            ..Transform::default()
        };
        Rasterizer::default().draw_model_wireframe(&mut fb, &CUBE, &big, GREEN);
        let edges = painted(&fb, GREEN);
        assert!(edges > 0);
        assert!(edges < 40 * 20 / 2, "wireframe painted {edges} cells");
    }

    #[test]
    fn each_filled_call_starts_with_fresh_depth() {
        let mut fb = FrameBuffer::new(40, 20);
        let mut r = Rasterizer::default();
        let near = Transform {
            position: Vec3::new(0.0, 0.0, 1.0),
            ..Transform::default()
        };
        r.draw_model_filled(&mut fb, &CUBE, &near, RED);
        r.draw_model_filled(&mut fb, &CUBE, &Transform::default(), GREEN);
        assert_eq!(bg(&fb, 20, 10), Some(GREEN));
    }

    #[test]
    fn one_pass_occludes_across_models() {
        let mut fb = FrameBuffer::new(40, 20);
        let mut r = Rasterizer::default();
        let near = Transform {
            position: Vec3::new(0.0, 0.0, 1.0),
            ..Transform::default()
        };
        r.begin_filled(&fb);
        r.draw_model_filled_keep_depth(&mut fb, &CUBE, &near, RED);
        r.draw_model_filled_keep_depth(&mut fb, &CUBE, &Transform::default(), GREEN);
        assert_eq!(bg(&fb, 20, 10), Some(RED));

        // A new pass forgets the near cube.
        r.begin_filled(&fb);
        r.draw_model_filled_keep_depth(&mut fb, &CUBE, &Transform::default(), GREEN);
        assert_eq!(bg(&fb, 20, 10), Some(GREEN));
    }

    #[test]
    fn keep_depth_on_new_canvas_size_starts_fresh() {
        let mut r = Rasterizer::default();
        let mut small = FrameBuffer::new(10, 5);
        r.draw_model_filled(&mut small, &CUBE, &Transform::default(), RED);

        let mut fb = FrameBuffer::new(40, 20);
        r.draw_model_filled_keep_depth(&mut fb, &CUBE, &Transform::default(), GREEN);
        assert_eq!((r.depth().width(), r.depth().height()), (40, 20));
        assert_eq!(bg(&fb, 20, 10), Some(GREEN));
    }

    #[test]
    fn rotation_changes_the_silhouette() {
        let mut flat = FrameBuffer::new(40, 20);
        let mut turned = FrameBuffer::new(40, 20);
        let mut r = Rasterizer::default();
        r.draw_model_filled(&mut flat, &CUBE, &Transform::default(), RED);
        let spin = Transform {
            rotation: Vec3::new(0.6, 0.8, 0.0),
            ..Transform::default()
        };
        r.draw_model_filled(&mut turned, &CUBE, &spin, RED);
        assert_ne!(flat.cells(), turned.cells());
    }

    #[test]
    fn empty_canvas_is_ignored() {
        let mut fb = FrameBuffer::new(0, 0);
        let mut r = Rasterizer::default();
        r.draw_model_filled(&mut fb, &CUBE, &Transform::default(), RED);
        r.draw_model_wireframe(&mut fb, &CUBE, &Transform::default(), RED);
        assert_eq!(r.depth().width(), 0);
    }
}
