// SPDX-License-Identifier: MIT
//
// Differential renderer.
//
// Instead of redrawing the whole screen every frame, the renderer compares
// the frame the application just drew against the frame the terminal is
// showing, and sends only the cells that differ. A frame where one sprite
// moved costs two cells of output, not the whole screen.
//
// The pipeline per frame:
//
//   1. The application draws into the current FrameBuffer.
//   2. `render` compares it row by row with the stored previous frame.
//      A row equal to its predecessor is skipped with one slice comparison.
//   3. Each changed cell becomes move + colors + character on the backend,
//      which elides what it can and buffers the rest.
//   4. The current frame is copied into the previous one in full. The copy
//      reuses the existing allocation.
//
// The renderer starts out believing the terminal shows a blank screen in the
// initial background, which is exactly what the engine's open sequence
// leaves behind.

use crate::backend::TerminalBackend;
use crate::buffer::FrameBuffer;
use crate::color::Color;

// ─── RenderStats ─────────────────────────────────────────────────────────────

/// Statistics from a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Cells that differed from the previous frame and were written.
    pub cells_rendered: usize,
    /// Cells that matched the previous frame and were skipped.
    pub cells_skipped: usize,
    /// Rows skipped whole by slice comparison.
    pub rows_skipped: usize,
}

impl RenderStats {
    /// Total cells processed (rendered + skipped).
    #[inline]
    #[must_use]
    pub const fn total_cells(&self) -> usize {
        self.cells_rendered + self.cells_skipped
    }
}

// ─── DiffRenderer ────────────────────────────────────────────────────────────

/// Emits only the cells that changed since the last render.
///
/// ```
/// use tc_term::backend::HeadlessTerminal;
/// use tc_term::buffer::FrameBuffer;
/// use tc_term::color;
/// use tc_term::diff::DiffRenderer;
///
/// let mut term = HeadlessTerminal::new(8, 2);
/// let mut renderer = DiffRenderer::new(8, 2, color::BLACK);
/// let mut frame = FrameBuffer::new(8, 2);
/// frame.draw_text("hi", 0, 0, color::WHITE, color::BLANK);
///
/// let stats = renderer.render(&frame, &mut term);
/// assert_eq!(stats.cells_rendered, 2);
/// assert_eq!(term.screen_row(0), "hi      ");
/// ```
pub struct DiffRenderer {
    previous: FrameBuffer,
}

impl DiffRenderer {
    /// A renderer whose previous frame is blank in `background`.
    #[must_use]
    pub fn new(width: u16, height: u16, background: Color) -> Self {
        Self {
            previous: FrameBuffer::with_background(width, height, background),
        }
    }

    /// The frame the terminal is believed to show.
    #[inline]
    #[must_use]
    pub const fn previous(&self) -> &FrameBuffer {
        &self.previous
    }

    /// Send the difference between `current` and the previous frame to
    /// `backend`, then remember `current`.
    ///
    /// Does not flush the backend.
    pub fn render(&mut self, current: &FrameBuffer, backend: &mut impl TerminalBackend) -> RenderStats {
        let mut stats = RenderStats::default();
        let width = current.width();

        for y in 0..current.height() {
            let (Some(curr_row), Some(prev_row)) = (current.row(y), self.previous.row(y)) else {
                continue;
            };

            if curr_row == prev_row {
                stats.cells_skipped += usize::from(width);
                stats.rows_skipped += 1;
                continue;
            }

            for (x, (cell, prev)) in (0..width).zip(curr_row.iter().zip(prev_row)) {
                if cell == prev {
                    stats.cells_skipped += 1;
                    continue;
                }
                backend.move_cursor(x, y);
                backend.set_cell_colors(cell.fg, cell.bg);
                backend.write_char(cell.ch);
                stats.cells_rendered += 1;
            }
        }

        self.previous.copy_from(current);
        stats
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{HeadlessTerminal, Op};
    use crate::cell::Cell;
    use crate::color::{BLACK, BLANK, BLUE, RED, WHITE};
    use pretty_assertions::assert_eq;

    fn setup(w: u16, h: u16) -> (DiffRenderer, HeadlessTerminal, FrameBuffer) {
        let mut term = HeadlessTerminal::new(w, h);
        term.clear_screen(BLACK);
        term.take_ops();
        (DiffRenderer::new(w, h, BLACK), term, FrameBuffer::new(w, h))
    }

    // ── Blank frames ────────────────────────────────────────────────────

    #[test]
    fn blank_frame_matching_initial_state_writes_nothing() {
        let (mut r, mut term, frame) = setup(10, 5);
        let stats = r.render(&frame, &mut term);
        assert_eq!(stats.cells_rendered, 0);
        assert_eq!(stats.cells_skipped, 50);
        assert_eq!(stats.rows_skipped, 5);
        assert!(term.ops().is_empty());
    }

    #[test]
    fn different_background_redraws_everything() {
        let (mut r, mut term, mut frame) = setup(4, 2);
        frame.clear(BLUE);
        let stats = r.render(&frame, &mut term);
        assert_eq!(stats.cells_rendered, 8);
        assert_eq!(term.chars_written(), 8);
        assert_eq!(term.screen_cell(3, 1), Some(Cell::blank(BLUE)));
    }

    // ── Changed cells ───────────────────────────────────────────────────

    #[test]
    fn single_change_emits_move_colors_char() {
        let (mut r, mut term, mut frame) = setup(5, 3);
        frame.draw_text("@", 2, 1, WHITE, BLANK);
        let stats = r.render(&frame, &mut term);

        assert_eq!(stats.cells_rendered, 1);
        assert_eq!(stats.cells_skipped, 14);
        assert_eq!(stats.rows_skipped, 2);
        assert_eq!(
            term.take_ops(),
            vec![
                Op::MoveCursor { x: 2, y: 1 },
                Op::SetColors { fg: WHITE, bg: BLACK },
                Op::WriteChar('@'),
            ]
        );
    }

    #[test]
    fn identical_second_frame_writes_nothing() {
        let (mut r, mut term, mut frame) = setup(6, 3);
        frame.draw_text("abc", 0, 0, WHITE, RED);
        r.render(&frame, &mut term);
        term.take_ops();

        let stats = r.render(&frame, &mut term);
        assert_eq!(stats.cells_rendered, 0);
        assert_eq!(term.chars_written(), 0);
    }

    #[test]
    fn moved_sprite_rewrites_two_cells() {
        let (mut r, mut term, mut frame) = setup(6, 1);
        frame.draw_text("@", 1, 0, WHITE, BLANK);
        r.render(&frame, &mut term);

        frame.clear(BLACK);
        frame.draw_text("@", 2, 0, WHITE, BLANK);
        term.take_ops();
        let stats = r.render(&frame, &mut term);

        assert_eq!(stats.cells_rendered, 2);
        assert_eq!(term.screen_row(0), "  @   ");
    }

    #[test]
    fn color_only_change_is_rendered() {
        let (mut r, mut term, mut frame) = setup(2, 1);
        frame.draw_text("x", 0, 0, WHITE, BLACK);
        r.render(&frame, &mut term);
        frame.draw_text("x", 0, 0, RED, BLACK);
        let stats = r.render(&frame, &mut term);
        assert_eq!(stats.cells_rendered, 1);
    }

    #[test]
    fn alpha_only_change_is_skipped() {
        let (mut r, mut term, mut frame) = setup(2, 1);
        frame.draw_text("x", 0, 0, Color::rgba(9, 9, 9, 255), BLACK);
        r.render(&frame, &mut term);
        frame.draw_text("x", 0, 0, Color::rgba(9, 9, 9, 0), BLACK);
        let stats = r.render(&frame, &mut term);
        assert_eq!(stats.cells_rendered, 0);
    }

    #[test]
    fn previous_tracks_last_render() {
        let (mut r, mut term, mut frame) = setup(3, 1);
        frame.draw_text("ok", 0, 0, WHITE, BLACK);
        r.render(&frame, &mut term);
        assert_eq!(r.previous().cells(), frame.cells());
    }

    // ── Stats ───────────────────────────────────────────────────────────

    #[test]
    fn total_cells_sums_both() {
        let s = RenderStats {
            cells_rendered: 3,
            cells_skipped: 7,
            rows_skipped: 0,
        };
        assert_eq!(s.total_cells(), 10);
    }
}
