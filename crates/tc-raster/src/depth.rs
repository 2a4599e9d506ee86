// SPDX-License-Identifier: MIT
//! Per-cell depth buffer.

/// Depth of the far plane in normalized device coordinates.
pub const FAR: f32 = 1.0;

/// One depth value per cell. Smaller is nearer.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthBuffer {
    width: u16,
    height: u16,
    depth: Vec<f32>,
}

impl DepthBuffer {
    /// A buffer with every cell at the far plane.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            depth: vec![FAR; usize::from(width) * usize::from(height)],
        }
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Push every cell back to the far plane.
    pub fn reset(&mut self) {
        self.depth.fill(FAR);
    }

    /// Match a new canvas size, resetting if it changed.
    pub fn resize(&mut self, width: u16, height: u16) {
        if (width, height) != (self.width, self.height) {
            *self = Self::new(width, height);
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = u16::try_from(x).ok().filter(|&x| x < self.width)?;
        let y = u16::try_from(y).ok().filter(|&y| y < self.height)?;
        Some(usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    /// Depth stored at `(x, y)`, `None` off the buffer.
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Option<f32> {
        self.index(x, y).map(|i| self.depth[i])
    }

    /// Record `z` at `(x, y)` if it is nearer than what is there.
    ///
    /// Returns whether the cell should be drawn. Off-buffer cells never pass.
    pub fn test_and_set(&mut self, x: i32, y: i32, z: f32) -> bool {
        let Some(i) = self.index(x, y) else {
            return false;
        };
        if z < self.depth[i] {
            self.depth[i] = z;
            true
        } else {
            false
        }
    }
}
