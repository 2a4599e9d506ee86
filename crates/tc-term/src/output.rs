// SPDX-License-Identifier: MIT
//
// Output buffering and stateful ANSI emission.
//
// Two components keep terminal I/O small:
//
//   OutputBuffer accumulates every byte of a frame in memory so the whole
//   frame reaches the terminal in a single write().
//
//   AnsiWriter tracks where the terminal cursor is and which colors are
//   active, and skips escape sequences that would not change anything. Two
//   horizontally adjacent cells need no cursor move; two cells whose colors
//   map to the same terminal colors need no SGR.

use std::io::{self, Write};

use crate::ansi;
use crate::color::{Color, TermColor};

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// A byte buffer that accumulates output for a single `write()`.
///
/// Default capacity: 16 KB, enough for most frames without reallocation.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 16_384;

impl OutputBuffer {
    /// Create an empty buffer with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append a character as UTF-8.
    #[inline]
    pub fn push_char(&mut self, ch: char) {
        let mut enc = [0u8; 4];
        self.buf.extend_from_slice(ch.encode_utf8(&mut enc).as_bytes());
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write accumulated output to `w` and clear the buffer.
    ///
    /// The buffer is cleared even when the write fails, so a broken pipe
    /// does not grow it without bound.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let result = w.write_all(&self.buf).and_then(|()| w.flush());
        self.buf.clear();
        result
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Real flushing happens in flush_to().
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── AnsiWriter ──────────────────────────────────────────────────────────────

/// Stateful ANSI encoder that skips redundant escapes.
///
/// - **Cursor**: a move to the position the terminal cursor already holds is
///   dropped. After a character the tracked position advances by one column.
/// - **Colors**: compared after mapping to terminal colors. Two different
///   RGB values that land on the same base color and brightness produce a
///   single SGR.
/// - **Reset / clear**: forget tracked colors so the next cell re-emits.
#[allow(clippy::struct_field_names)]
pub struct AnsiWriter {
    out: OutputBuffer,
    cursor: Option<(u16, u16)>,
    colors: Option<(TermColor, TermColor)>,
}

impl AnsiWriter {
    /// Create a writer with no tracked state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            out: OutputBuffer::new(),
            cursor: None,
            colors: None,
        }
    }

    /// Forget tracked cursor and colors.
    pub const fn invalidate(&mut self) {
        self.cursor = None;
        self.colors = None;
    }

    /// Pending bytes.
    #[inline]
    #[must_use]
    pub const fn buffer(&self) -> &OutputBuffer {
        &self.out
    }

    /// Move the cursor unless it is already at `(x, y)`.
    pub fn move_cursor(&mut self, x: u16, y: u16) {
        if self.cursor == Some((x, y)) {
            return;
        }
        ansi::cursor_to(&mut self.out, x, y).ok();
        self.cursor = Some((x, y));
    }

    /// Select colors unless the mapped pair is already active.
    pub fn set_colors(&mut self, fg: Color, bg: Color) {
        let pair = (TermColor::from(fg), TermColor::from(bg));
        if self.colors == Some(pair) {
            return;
        }
        ansi::colors(&mut self.out, pair.0, pair.1).ok();
        self.colors = Some(pair);
    }

    /// Output one character and advance the tracked cursor.
    pub fn write_char(&mut self, ch: char) {
        self.out.push_char(ch);
        self.cursor = self.cursor.map(|(x, y)| (x.saturating_add(1), y));
    }

    /// Show or hide the cursor.
    pub fn set_cursor_visible(&mut self, visible: bool) {
        if visible {
            ansi::cursor_show(&mut self.out).ok();
        } else {
            ansi::cursor_hide(&mut self.out).ok();
        }
    }

    /// Set the window title.
    pub fn set_title(&mut self, title: &str) {
        ansi::set_title(&mut self.out, title).ok();
    }

    /// Fill the whole screen with `bg` and home the cursor.
    pub fn clear_screen(&mut self, bg: Color) {
        self.invalidate();
        self.set_colors(bg, bg);
        ansi::clear_screen(&mut self.out).ok();
        ansi::cursor_home(&mut self.out).ok();
        self.cursor = Some((0, 0));
    }

    /// Reset attributes, show the cursor, clear and home.
    pub fn restore_screen(&mut self) {
        ansi::reset(&mut self.out).ok();
        ansi::cursor_show(&mut self.out).ok();
        ansi::cursor_home(&mut self.out).ok();
        ansi::clear_screen(&mut self.out).ok();
        self.invalidate();
    }

    /// Write all pending bytes to `w` in one call.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        self.out.flush_to(w)
    }
}

impl Default for AnsiWriter {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{self, BLACK, WHITE};

    fn text(w: &AnsiWriter) -> String {
        String::from_utf8(w.buffer().as_bytes().to_vec()).unwrap()
    }

    // ── OutputBuffer ────────────────────────────────────────────────────

    #[test]
    fn output_buffer_new_is_empty() {
        let buf = OutputBuffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
    }

    #[test]
    fn output_buffer_write_trait() {
        let mut buf = OutputBuffer::new();
        write!(buf, "hello {}", 42).unwrap();
        assert_eq!(buf.as_bytes(), b"hello 42");
    }

    #[test]
    fn output_buffer_push_char_unicode() {
        let mut buf = OutputBuffer::new();
        buf.push_char('é');
        assert_eq!(buf.as_bytes(), "é".as_bytes());
    }

    #[test]
    fn output_buffer_flush_to_writes_once_and_clears() {
        struct Counting {
            writes: usize,
            data: Vec<u8>,
        }
        impl Write for Counting {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.writes += 1;
                self.data.extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut buf = OutputBuffer::new();
        buf.write_all(b"abc").unwrap();
        buf.write_all(b"def").unwrap();
        let mut sink = Counting { writes: 0, data: Vec::new() };
        buf.flush_to(&mut sink).unwrap();
        assert_eq!(sink.writes, 1);
        assert_eq!(sink.data, b"abcdef");
        assert!(buf.is_empty());
    }

    #[test]
    fn output_buffer_flush_empty_is_noop() {
        let mut buf = OutputBuffer::new();
        let mut sink = Vec::new();
        buf.flush_to(&mut sink).unwrap();
        assert!(sink.is_empty());
    }

    // ── AnsiWriter: cursor ──────────────────────────────────────────────

    #[test]
    fn adjacent_chars_skip_cursor_move() {
        let mut w = AnsiWriter::new();
        w.move_cursor(3, 1);
        w.write_char('a');
        w.move_cursor(4, 1);
        w.write_char('b');
        assert_eq!(text(&w), "\x1b[2;4Hab");
    }

    #[test]
    fn non_adjacent_chars_move_cursor() {
        let mut w = AnsiWriter::new();
        w.move_cursor(0, 0);
        w.write_char('a');
        w.move_cursor(5, 0);
        w.write_char('b');
        assert_eq!(text(&w), "\x1b[1;1Ha\x1b[1;6Hb");
    }

    #[test]
    fn first_move_is_always_emitted() {
        let mut w = AnsiWriter::new();
        w.move_cursor(0, 0);
        assert_eq!(text(&w), "\x1b[1;1H");
    }

    // ── AnsiWriter: colors ──────────────────────────────────────────────

    #[test]
    fn repeated_colors_are_skipped() {
        let mut w = AnsiWriter::new();
        w.set_colors(WHITE, BLACK);
        w.set_colors(WHITE, BLACK);
        assert_eq!(text(&w), "\x1b[97;40m");
    }

    #[test]
    fn colors_compare_after_mapping() {
        let mut w = AnsiWriter::new();
        w.set_colors(WHITE, BLACK);
        // Near-white and near-black map to the same terminal colors.
        w.set_colors(color::RAYWHITE, color::TREADGRAY);
        assert_eq!(text(&w), "\x1b[97;40m");
    }

    #[test]
    fn invalidate_forces_reemit() {
        let mut w = AnsiWriter::new();
        w.set_colors(WHITE, BLACK);
        w.invalidate();
        w.set_colors(WHITE, BLACK);
        assert_eq!(text(&w), "\x1b[97;40m\x1b[97;40m");
    }

    // ── AnsiWriter: screen ──────────────────────────────────────────────

    #[test]
    fn clear_screen_sets_background_and_homes() {
        let mut w = AnsiWriter::new();
        w.clear_screen(BLACK);
        w.move_cursor(0, 0);
        assert_eq!(text(&w), "\x1b[30;40m\x1b[2J\x1b[H");
    }

    #[test]
    fn restore_screen_sequence() {
        let mut w = AnsiWriter::new();
        w.restore_screen();
        assert_eq!(text(&w), "\x1b[0m\x1b[?25h\x1b[H\x1b[2J");
    }

    #[test]
    fn title_and_cursor_visibility() {
        let mut w = AnsiWriter::new();
        w.set_cursor_visible(false);
        w.set_title("t");
        w.set_cursor_visible(true);
        assert_eq!(text(&w), "\x1b[?25l\x1b]0;t\x07\x1b[?25h");
    }
}
