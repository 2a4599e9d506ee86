// SPDX-License-Identifier: MIT
//
// The stable color palette.
//
// Saved frame files refer to colors by their position in this table, so the
// order is part of the on-disk format. New colors may only be appended.

use crate::color::{self, Color};

/// The palette, in file-format order.
pub const PALETTE: [Color; 25] = [
    color::BLACK,
    color::RED,
    color::GREEN,
    color::YELLOW,
    color::BLUE,
    color::MAGENTA,
    color::CYAN,
    color::WHITE,
    color::LIGHTGRAY,
    color::DARKGRAY,
    color::GOLD,
    color::ORANGE,
    color::PINK,
    color::MAROON,
    color::LIME,
    color::DARKGREEN,
    color::SKYBLUE,
    color::DARKBLUE,
    color::PURPLE,
    color::VIOLET,
    color::DARKPURPLE,
    color::BEIGE,
    color::BROWN,
    color::DARKBROWN,
    color::RAYWHITE,
];

/// Index of the first entry RGB-equal to `color`, or `0` (black) when the
/// color is not in the palette.
///
/// ```
/// use tc_term::{color, palette};
///
/// assert_eq!(palette::index_of(color::BLUE), 4);
/// assert_eq!(palette::index_of(color::GRAY), 0);
/// ```
#[must_use]
pub fn index_of(color: Color) -> usize {
    PALETTE.iter().position(|&c| c == color).unwrap_or(0)
}

/// The entry at `index`, or black when out of range.
#[must_use]
pub fn color_at(index: usize) -> Color {
    PALETTE.get(index).copied().unwrap_or(color::BLACK)
}
