// SPDX-License-Identifier: MIT
//
// Cell: one character position on screen.
//
// A cell is a character plus a foreground and a background color. The grid
// of cells is the only thing drawing code touches; the diff renderer turns
// differences between two grids into terminal output.
//
// Colors are stored unmapped. Approximation to the eight terminal colors
// happens at output time, so two cells compare by their RGB values and not
// by what the terminal would end up showing.

use crate::color::{self, Color};

/// A single terminal cell.
///
/// Equality compares the character and the RGB of both colors. Alpha is
/// ignored (see [`Color`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Character to display.
    pub ch: char,
    /// Foreground (text) color.
    pub fg: Color,
    /// Background color.
    pub bg: Color,
}

impl Cell {
    /// A space on black.
    pub const EMPTY: Self = Self::blank(color::BLACK);

    /// Create a cell from its parts.
    #[inline]
    #[must_use]
    pub const fn new(ch: char, fg: Color, bg: Color) -> Self {
        Self { ch, fg, bg }
    }

    /// A space whose foreground and background are both `color`.
    ///
    /// This is how clears, filled pixels and backgrounds are stored.
    #[inline]
    #[must_use]
    pub const fn blank(color: Color) -> Self {
        Self {
            ch: ' ',
            fg: color,
            bg: color,
        }
    }

    /// Whether two cells would produce the same SGR state.
    #[inline]
    #[must_use]
    pub fn same_colors(self, other: Self) -> bool {
        self.fg == other.fg && self.bg == other.bg
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
