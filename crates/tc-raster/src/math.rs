// SPDX-License-Identifier: MIT
//! Vectors and 4×4 matrices.
//!
//! Row-vector convention throughout: a point is transformed as `v * M`, so
//! transforms compose left to right. `scale * rotate * translate` scales
//! first and translates last. Translation lives in the bottom row.

use std::ops::{Add, Mul, Sub};

// ─── Vec3 ────────────────────────────────────────────────────────────────────

/// A point or direction in 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);

    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Same value on every axis.
    #[inline]
    #[must_use]
    pub const fn splat(v: f32) -> Self {
        Self::new(v, v, v)
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

// ─── Mat4 ────────────────────────────────────────────────────────────────────

/// A 4×4 transform, stored as `m[row][column]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    pub m: [[f32; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Self = Self {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    #[inline]
    #[must_use]
    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    #[must_use]
    pub const fn translate(x: f32, y: f32, z: f32) -> Self {
        let mut mat = Self::IDENTITY;
        mat.m[3][0] = x;
        mat.m[3][1] = y;
        mat.m[3][2] = z;
        mat
    }

    #[must_use]
    pub const fn scale(x: f32, y: f32, z: f32) -> Self {
        let mut mat = Self::IDENTITY;
        mat.m[0][0] = x;
        mat.m[1][1] = y;
        mat.m[2][2] = z;
        mat
    }

    /// Rotation about the X axis by `angle` radians.
    #[must_use]
    pub fn rotate_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let mut mat = Self::IDENTITY;
        mat.m[1][1] = c;
        mat.m[1][2] = s;
        mat.m[2][1] = -s;
        mat.m[2][2] = c;
        mat
    }

    /// Rotation about the Y axis by `angle` radians.
    #[must_use]
    pub fn rotate_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let mut mat = Self::IDENTITY;
        mat.m[0][0] = c;
        mat.m[0][2] = -s;
        mat.m[2][0] = s;
        mat.m[2][2] = c;
        mat
    }

    /// Rotation about the Z axis by `angle` radians.
    #[must_use]
    pub fn rotate_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let mut mat = Self::IDENTITY;
        mat.m[0][0] = c;
        mat.m[0][1] = s;
        mat.m[1][0] = -s;
        mat.m[1][1] = c;
        mat
    }

    /// Right-handed perspective projection looking down -Z.
    ///
    /// Points between `near` and `far` land in NDC z ∈ [-1, 1], smaller
    /// meaning nearer. `fov_y` is in radians; `aspect` is width / height.
    #[must_use]
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let tan_half = (fov_y / 2.0).tan();
        let depth = far - near;
        let mut m = [[0.0; 4]; 4];
        m[0][0] = 1.0 / (aspect * tan_half);
        m[1][1] = 1.0 / tan_half;
        m[2][2] = -(far + near) / depth;
        m[2][3] = -1.0;
        m[3][2] = -(2.0 * far * near) / depth;
        Self { m }
    }

    /// `v * self` with `w = 1`, followed by the perspective divide.
    ///
    /// The divide is skipped when `w` comes out as exactly zero.
    #[must_use]
    pub fn transform_point(&self, v: Vec3) -> Vec3 {
        let m = &self.m;
        let column = |j: usize| {
            v.z.mul_add(m[2][j], v.y.mul_add(m[1][j], v.x.mul_add(m[0][j], m[3][j])))
        };
        let (x, y, z, w) = (column(0), column(1), column(2), column(3));
        if w == 0.0 {
            Vec3::new(x, y, z)
        } else {
            Vec3::new(x / w, y / w, z / w)
        }
    }
}

impl Mul for Mat4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut m = [[0.0; 4]; 4];
        for (i, row) in m.iter_mut().enumerate() {
            for (j, out) in row.iter_mut().enumerate() {
                *out = (0..4).map(|k| self.m[i][k] * rhs.m[k][j]).sum();
            }
        }
        Self { m }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
