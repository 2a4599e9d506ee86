// SPDX-License-Identifier: MIT
//! Static triangle meshes.

use crate::math::Vec3;

/// Three indices into a model's vertex list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle(pub [usize; 3]);

/// A mesh: vertices plus the triangles that connect them.
#[derive(Debug, Clone, Copy)]
pub struct Model {
    pub vertices: &'static [Vec3],
    pub faces: &'static [Triangle],
}

impl Model {
    /// Resolve each face to its three vertices. Faces that index past the
    /// vertex list are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.faces.iter().filter_map(|&Triangle([a, b, c])| {
            Some([
                *self.vertices.get(a)?,
                *self.vertices.get(b)?,
                *self.vertices.get(c)?,
            ])
        })
    }
}

const CUBE_VERTICES: [Vec3; 8] = [
    Vec3::new(-0.5, -0.5, -0.5),
    Vec3::new(0.5, -0.5, -0.5),
    Vec3::new(0.5, 0.5, -0.5),
    Vec3::new(-0.5, 0.5, -0.5),
    Vec3::new(-0.5, -0.5, 0.5),
    Vec3::new(0.5, -0.5, 0.5),
    Vec3::new(0.5, 0.5, 0.5),
    Vec3::new(-0.5, 0.5, 0.5),
];

const CUBE_FACES: [Triangle; 12] = [
    // -z
    Triangle([0, 1, 2]),
    Triangle([0, 2, 3]),
    // +z
    Triangle([4, 6, 5]),
    Triangle([4, 7, 6]),
    // +x
    Triangle([1, 5, 6]),
    Triangle([1, 6, 2]),
    // -x
    Triangle([4, 0, 3]),
    Triangle([4, 3, 7]),
    // +y
    Triangle([3, 2, 6]),
    Triangle([3, 6, 7]),
    // -y
    Triangle([0, 4, 5]),
    Triangle([0, 5, 1]),
];

/// A unit cube centered on the origin, two triangles per side.
pub const CUBE: Model = Model {
    vertices: &CUBE_VERTICES,
    faces: &CUBE_FACES,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_shape() {
        assert_eq!(CUBE.vertices.len(), 8);
        assert_eq!(CUBE.faces.len(), 12);
        assert_eq!(CUBE.triangles().count(), 12);
    }

    #[test]
    fn cube_is_unit_sized() {
        for v in CUBE.vertices {
            for c in [v.x, v.y, v.z] {
                assert!((c.abs() - 0.5).abs() < f32::EPSILON);
            }
        }
    }

    #[test]
    fn every_cube_vertex_is_used() {
        let mut used = [false; 8];
        for Triangle(idx) in CUBE.faces {
            for &i in idx {
                used[i] = true;
            }
        }
        assert!(used.iter().all(|&u| u));
    }

    #[test]
    fn bad_indices_are_skipped() {
        static VERTS: [Vec3; 3] = [Vec3::ZERO, Vec3::ONE, Vec3::ZERO];
        static FACES: [Triangle; 2] = [Triangle([0, 1, 2]), Triangle([0, 1, 9])];
        let model = Model {
            vertices: &VERTS,
            faces: &FACES,
        };
        assert_eq!(model.triangles().count(), 1);
    }
}
