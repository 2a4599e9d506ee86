// SPDX-License-Identifier: MIT
//! Lines and triangles on a cell grid.
//!
//! Everything here draws through [`Canvas::draw_pixel`], so clipping is the
//! canvas's job and off-screen geometry costs nothing but the loop. Vertices
//! go through the model-view-projection matrix, land in normalized device
//! coordinates, and are stretched over the canvas with `y` pointing down.
//!
//! There is no near-plane clipping. A triangle with a vertex that projects
//! to a non-finite or absurdly distant position is dropped whole.

use tc_term::{Canvas, Color};

use crate::depth::DepthBuffer;
use crate::math::{Mat4, Vec3};

/// Projected coordinates beyond this many cells from the origin are treated
/// as unprojectable.
const MAX_COORD: f32 = 32_768.0;

/// Map `v` through `mvp` to screen space: x and y in cells, z kept as NDC
/// depth.
///
/// ```
/// use tc_raster::{project, Mat4, Vec3};
///
/// let p = project(Vec3::new(0.0, 0.0, 0.5), &Mat4::IDENTITY, 80, 24);
/// assert_eq!(p, Vec3::new(40.0, 12.0, 0.5));
/// ```
#[must_use]
pub fn project(v: Vec3, mvp: &Mat4, width: u16, height: u16) -> Vec3 {
    let ndc = mvp.transform_point(v);
    Vec3::new(
        (ndc.x + 1.0) * 0.5 * f32::from(width),
        (1.0 - ndc.y) * 0.5 * f32::from(height),
        ndc.z,
    )
}

/// The cell a screen-space position falls in.
fn cell_of(p: Vec3) -> Option<(i32, i32)> {
    let usable = |c: f32| c.is_finite() && c.abs() <= MAX_COORD;
    (usable(p.x) && usable(p.y) && p.z.is_finite())
        .then(|| (p.x.floor() as i32, p.y.floor() as i32))
}

/// Bresenham line from `(x1, y1)` to `(x2, y2)`, both ends included.
pub fn draw_line(canvas: &mut impl Canvas, x1: i32, y1: i32, x2: i32, y2: i32, color: Color) {
    let dx = i64::from(x2.abs_diff(x1));
    let dy = i64::from(y2.abs_diff(y1));
    let sx = if x1 < x2 { 1 } else { -1 };
    let sy = if y1 < y2 { 1 } else { -1 };
    let mut err = dx - dy;
    let (mut x, mut y) = (x1, y1);

    loop {
        canvas.draw_pixel(x, y, color);
        if x == x2 && y == y2 {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
}

/// Outline of the triangle `v1 v2 v3` after projection through `mvp`.
pub fn draw_triangle_wireframe(canvas: &mut impl Canvas, v1: Vec3, v2: Vec3, v3: Vec3, mvp: &Mat4, color: Color) {
    let (w, h) = (canvas.width(), canvas.height());
    let corners = [v1, v2, v3].map(|v| cell_of(project(v, mvp, w, h)));
    let [Some(a), Some(b), Some(c)] = corners else {
        return;
    };
    draw_line(canvas, a.0, a.1, b.0, b.1, color);
    draw_line(canvas, b.0, b.1, c.0, c.1, color);
    draw_line(canvas, c.0, c.1, a.0, a.1, color);
}

/// Solid triangle `v1 v2 v3`, depth-tested against `depth`.
///
/// Scanline fill: for each row, the leftmost and rightmost edge crossings
/// bound the span and depth is interpolated linearly between them. A cell
/// is drawn only when nearer than what `depth` holds.
#[allow(clippy::too_many_arguments)]
pub fn draw_triangle_filled(
    canvas: &mut impl Canvas,
    depth: &mut DepthBuffer,
    v1: Vec3,
    v2: Vec3,
    v3: Vec3,
    mvp: &Mat4,
    color: Color,
) {
    let (w, h) = (canvas.width(), canvas.height());
    let mut p = [v1, v2, v3].map(|v| project(v, mvp, w, h));
    if p.iter().any(|&v| cell_of(v).is_none()) {
        return;
    }
    p.sort_by(|a, b| a.y.total_cmp(&b.y));

    let row = |v: Vec3| v.y.floor() as i32;
    let y_start = row(p[0]).max(0);
    let y_end = row(p[2]).min(i32::from(h) - 1);

    for y in y_start..=y_end {
        let Some((left, right)) = span(&p, y) else {
            continue;
        };
        let x_start = left.0.floor() as i32;
        let x_end = right.0.floor() as i32;
        let width = x_end - x_start;

        for x in x_start.max(0)..=x_end.min(i32::from(w) - 1) {
            let z = if width == 0 {
                left.1
            } else {
                let t = (x - x_start) as f32 / width as f32;
                t.mul_add(right.1 - left.1, left.1)
            };
            if depth.test_and_set(x, y, z) {
                canvas.draw_pixel(x, y, color);
            }
        }
    }
}

/// Leftmost and rightmost `(x, z)` where row `y` crosses the triangle's
/// edges. Horizontal edges never count as crossings.
fn span(p: &[Vec3; 3], y: i32) -> Option<((f32, f32), (f32, f32))> {
    let mut left: Option<(f32, f32)> = None;
    let mut right: Option<(f32, f32)> = None;

    for i in 0..3 {
        let (a, b) = (p[i], p[(i + 1) % 3]);
        let (ya, yb) = (a.y.floor() as i32, b.y.floor() as i32);
        let crosses = (ya <= y && y < yb) || (yb <= y && y < ya);
        if !crosses || (b.y - a.y).abs() < f32::EPSILON {
            continue;
        }

        let t = (y as f32 - a.y) / (b.y - a.y);
        let x = t.mul_add(b.x - a.x, a.x);
        let z = t.mul_add(b.z - a.z, a.z);
        if left.is_none_or(|(lx, _)| x < lx) {
            left = Some((x, z));
        }
        if right.is_none_or(|(rx, _)| x > rx) {
            right = Some((x, z));
        }
    }

    left.zip(right)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
