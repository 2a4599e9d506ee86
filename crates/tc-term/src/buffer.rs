// SPDX-License-Identifier: MIT
//
// FrameBuffer: the 2D cell grid that every draw call lands in.
//
// The engine keeps two of these. `current` is what the application is
// drawing this frame; `previous` is what the terminal is showing. The diff
// renderer compares them and then copies `current` over `previous`.
//
// Layout:
//
//   Flat `Vec<Cell>`, row-major: `index = y * width + x`. A row is a
//   contiguous slice, so whole-row comparison in the renderer is a single
//   slice equality.
//
// Coordinates:
//
//   Draw calls take signed `i32` coordinates and clip per cell. Shapes may
//   start off-screen on any side; the visible part is drawn and the rest is
//   dropped silently. Direct access (`get`/`set`/`row`) uses `u16` screen
//   positions and is bounds-checked.
//
// Background:
//
//   The buffer remembers the last `clear` color. Drawing with the reserved
//   `BLANK` color resolves to it at draw time, so text can be drawn "on
//   whatever is behind it" without the caller tracking the clear color.

use unicode_width::UnicodeWidthChar;

use crate::canvas::Canvas;
use crate::cell::Cell;
use crate::color::{self, Color};

/// Stand-in for characters that do not occupy exactly one column.
pub const REPLACEMENT_CHAR: char = '?';

/// Border character used by [`FrameBuffer::draw_rect_outline`].
pub const OUTLINE_CHAR: char = '#';

// ─── FrameBuffer ─────────────────────────────────────────────────────────────

/// A 2D grid of cells.
///
/// # Examples
///
/// ```
/// use tc_term::buffer::FrameBuffer;
/// use tc_term::color;
///
/// let mut buf = FrameBuffer::new(10, 4);
/// buf.clear(color::DARKBLUE);
/// buf.draw_text("hi", 1, 1, color::WHITE, color::BLANK);
///
/// let cell = buf.get(2, 1).unwrap();
/// assert_eq!(cell.ch, 'i');
/// assert_eq!(cell.bg, color::DARKBLUE);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
    background: Color,
}

impl FrameBuffer {
    // ─── Construction ────────────────────────────────────────────────────

    /// Create a buffer filled with spaces on black.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self::with_background(width, height, color::BLACK)
    }

    /// Create a buffer cleared to `background`.
    #[must_use]
    pub fn with_background(width: u16, height: u16, background: Color) -> Self {
        let size = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            cells: vec![Cell::blank(background); size],
            background,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    /// Width in columns.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height in rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// The color `BLANK` currently resolves to.
    #[inline]
    #[must_use]
    pub const fn background(&self) -> Color {
        self.background
    }

    /// Whether `(x, y)` is inside the grid.
    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    const fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Map signed coordinates to screen coordinates, if visible.
    #[inline]
    fn clip(&self, x: i32, y: i32) -> Option<(u16, u16)> {
        let x = u16::try_from(x).ok()?;
        let y = u16::try_from(y).ok()?;
        self.in_bounds(x, y).then_some((x, y))
    }

    /// Cell at `(x, y)`, or `None` if out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    /// Overwrite the cell at `(x, y)`. Returns `false` if out of bounds.
    #[inline]
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.index(x, y);
        self.cells[idx] = cell;
        true
    }

    /// The raw cell slice.
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Row `y` as a slice, or `None` if out of bounds.
    #[inline]
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y < self.height {
            let start = self.index(0, y);
            Some(&self.cells[start..start + usize::from(self.width)])
        } else {
            None
        }
    }

    /// Iterate cells with their `(x, y)` coordinates.
    #[allow(clippy::cast_possible_truncation)]
    pub fn iter(&self) -> impl Iterator<Item = (u16, u16, &Cell)> {
        let w = usize::from(self.width).max(1);
        self.cells.iter().enumerate().map(move |(i, cell)| {
            // x < width and y < height, both u16.
            ((i % w) as u16, (i / w) as u16, cell)
        })
    }

    /// Copy every cell from `other`.
    ///
    /// Both buffers must have the same dimensions. Mismatched sizes are
    /// ignored (the engine never produces them; resize is fatal).
    pub fn copy_from(&mut self, other: &Self) {
        if self.width == other.width && self.height == other.height {
            self.cells.copy_from_slice(&other.cells);
        }
    }

    // ─── Drawing ─────────────────────────────────────────────────────────

    /// Fill every cell with a space in `color` and remember it as the
    /// background for `BLANK`.
    pub fn clear(&mut self, color: Color) {
        let color = color.or_background(self.background);
        self.background = color;
        self.cells.fill(Cell::blank(color));
    }

    /// Write one cell at signed coordinates, resolving `BLANK` colors.
    ///
    /// Returns `true` if the cell was visible.
    pub fn put(&mut self, x: i32, y: i32, ch: char, fg: Color, bg: Color) -> bool {
        let Some((x, y)) = self.clip(x, y) else {
            return false;
        };
        let fg = fg.or_background(self.background);
        let bg = bg.or_background(self.background);
        let idx = self.index(x, y);
        self.cells[idx] = Cell::new(ch, fg, bg);
        true
    }

    /// A single filled cell: a space whose colors are both `color`.
    pub fn draw_pixel(&mut self, x: i32, y: i32, color: Color) {
        self.put(x, y, ' ', color, color);
    }

    /// Draw `text` left to right starting at `(x, y)`, one cell per `char`.
    ///
    /// Characters that are not exactly one column wide (controls, combining
    /// marks, CJK) are drawn as [`REPLACEMENT_CHAR`] so the grid stays in
    /// step with the terminal's columns.
    pub fn draw_text(&mut self, text: &str, x: i32, y: i32, fg: Color, bg: Color) {
        for (i, ch) in text.chars().enumerate() {
            let Ok(offset) = i32::try_from(i) else {
                break;
            };
            let col = x.saturating_add(offset);
            if col >= i32::from(self.width) {
                break;
            }
            let ch = if ch.width() == Some(1) { ch } else { REPLACEMENT_CHAR };
            self.put(col, y, ch, fg, bg);
        }
    }

    /// Fill a `w × h` rectangle with spaces.
    pub fn draw_rect_filled(&mut self, x: i32, y: i32, w: i32, h: i32, fg: Color, bg: Color) {
        let (x1, x2) = span(x, w, self.width);
        let (y1, y2) = span(y, h, self.height);
        for row in y1..y2 {
            for col in x1..x2 {
                self.put(col, row, ' ', fg, bg);
            }
        }
    }

    /// Outline a `w × h` rectangle with [`OUTLINE_CHAR`].
    ///
    /// Top and bottom rows are drawn in full, then the left and right
    /// columns without the corners.
    pub fn draw_rect_outline(&mut self, x: i32, y: i32, w: i32, h: i32, fg: Color, bg: Color) {
        if w <= 0 || h <= 0 {
            return;
        }
        let right = x.saturating_add(w - 1);
        let bottom = y.saturating_add(h - 1);

        let last_col = i32::from(self.width) - 1;
        let last_row = i32::from(self.height) - 1;

        for col in x.max(0)..=right.min(last_col) {
            self.put(col, y, OUTLINE_CHAR, fg, bg);
            self.put(col, bottom, OUTLINE_CHAR, fg, bg);
        }
        for row in y.saturating_add(1).max(0)..bottom.min(last_row + 1) {
            self.put(x, row, OUTLINE_CHAR, fg, bg);
            self.put(right, row, OUTLINE_CHAR, fg, bg);
        }
    }
}

/// Visible `[start, end)` range of a signed span against `0..limit`.
fn span(start: i32, len: i32, limit: u16) -> (i32, i32) {
    if len <= 0 {
        return (0, 0);
    }
    let end = start.saturating_add(len).min(i32::from(limit));
    (start.max(0), end)
}

impl Canvas for FrameBuffer {
    fn width(&self) -> u16 {
        self.width
    }

    fn height(&self) -> u16 {
        self.height
    }

    fn draw_pixel(&mut self, x: i32, y: i32, color: Color) {
        Self::draw_pixel(self, x, y, color);
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FrameBuffer({}x{})", self.width, self.height)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
