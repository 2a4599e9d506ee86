// SPDX-License-Identifier: MIT
//
// Canvas: the minimal drawing surface.
//
// Anything that can report its size and fill a single cell is a canvas.
// Line and triangle rasterizers are written against this trait so they can
// target a bare `FrameBuffer` in tests and a live `Engine` in applications.

use crate::color::Color;

/// A grid of cells that can be painted one pixel at a time.
pub trait Canvas {
    /// Width in cells.
    fn width(&self) -> u16;

    /// Height in cells.
    fn height(&self) -> u16;

    /// Fill the cell at `(x, y)` with `color`. Off-canvas positions are
    /// ignored.
    fn draw_pixel(&mut self, x: i32, y: i32, color: Color);
}
