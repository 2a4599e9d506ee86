// SPDX-License-Identifier: MIT
//
// HeadlessTerminal: a terminal that lives in memory.
//
// Every backend call is appended to an operation log, and a virtual screen
// is kept up to date from the same calls, so tests can assert both on what
// was sent and on what a real terminal would now show. Input comes from a
// queue of scripted reads. Time comes from a virtual clock that only moves
// when the engine sleeps or the test advances it.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use super::{Size, TerminalBackend};
use crate::cell::Cell;
use crate::color::{self, Color};
use crate::input::{self, KeyCode};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    EnterRawMode,
    RestoreMode,
    SetColors { fg: Color, bg: Color },
    MoveCursor { x: u16, y: u16 },
    WriteChar(char),
    SetCursorVisible(bool),
    SetTitle(String),
    ClearScreen(Color),
    Sleep(Duration),
    Flush,
}

/// An in-memory terminal.
///
/// ```
/// use tc_term::backend::{HeadlessTerminal, TerminalBackend};
/// use tc_term::KeyCode;
///
/// let mut term = HeadlessTerminal::new(20, 5);
/// term.push_input(b"\x1b[A");
/// assert_eq!(term.poll_key(), Some(KeyCode::Up));
/// assert_eq!(term.poll_key(), None);
/// ```
#[derive(Debug, Clone)]
pub struct HeadlessTerminal {
    size: Option<Size>,
    input: VecDeque<Vec<u8>>,
    clock: Duration,
    ops: Vec<Op>,
    raw: bool,
    cursor: (u16, u16),
    colors: (Color, Color),
    cursor_visible: bool,
    title: String,
    screen: Vec<Cell>,
    screen_size: Size,
}

impl HeadlessTerminal {
    /// A `cols × rows` terminal with an empty input queue.
    #[must_use]
    pub fn new(cols: u16, rows: u16) -> Self {
        let size = Size::new(cols, rows);
        Self {
            size: size.non_zero(),
            input: VecDeque::new(),
            clock: Duration::ZERO,
            ops: Vec::new(),
            raw: false,
            cursor: (0, 0),
            colors: (color::WHITE, color::BLACK),
            cursor_visible: true,
            title: String::new(),
            screen: vec![Cell::EMPTY; usize::from(cols) * usize::from(rows)],
            screen_size: size,
        }
    }

    // ─── Scripting ───────────────────────────────────────────────────────

    /// Queue the bytes of one read. Reads longer than
    /// [`MAX_READ`](input::MAX_READ) are truncated, as a real read would be.
    pub fn push_input(&mut self, bytes: &[u8]) {
        let len = bytes.len().min(input::MAX_READ);
        self.input.push_back(bytes[..len].to_vec());
    }

    /// Queue a single key press in its terminal encoding.
    ///
    /// `Escape` is queued as a bare `ESC`, which the decoder reports as no
    /// key. An `F` outside `1..=12` queues nothing.
    pub fn push_key(&mut self, key: KeyCode) {
        let bytes: &[u8] = match key {
            KeyCode::Char(b) => {
                self.push_input(&[b]);
                return;
            }
            KeyCode::Enter => b"\r",
            KeyCode::Backspace => b"\x08",
            KeyCode::Delete => b"\x7f",
            KeyCode::Escape => b"\x1b",
            KeyCode::Up => b"\x1b[A",
            KeyCode::Down => b"\x1b[B",
            KeyCode::Right => b"\x1b[C",
            KeyCode::Left => b"\x1b[D",
            KeyCode::F(n) => {
                let seq = match n {
                    1 => "\x1bOP",
                    2 => "\x1bOQ",
                    3 => "\x1bOR",
                    4 => "\x1bOS",
                    5 => "\x1b[15~",
                    6 => "\x1b[17~",
                    7 => "\x1b[18~",
                    8 => "\x1b[19~",
                    9 => "\x1b[20~",
                    10 => "\x1b[21~",
                    11 => "\x1b[23~",
                    12 => "\x1b[24~",
                    _ => return,
                };
                seq.as_bytes()
            }
        };
        self.push_input(bytes);
    }

    /// Change the size the terminal reports. `None` simulates a terminal
    /// whose size cannot be queried. The virtual screen keeps its size.
    pub const fn set_size(&mut self, size: Option<Size>) {
        self.size = size;
    }

    /// Move the virtual clock forward, as if work took `duration`.
    pub fn advance(&mut self, duration: Duration) {
        self.clock += duration;
    }

    // ─── Inspection ──────────────────────────────────────────────────────

    /// Every operation since creation or the last [`take_ops`](Self::take_ops).
    #[must_use]
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Drain the operation log.
    pub fn take_ops(&mut self) -> Vec<Op> {
        std::mem::take(&mut self.ops)
    }

    /// Number of characters written since the log was last drained.
    #[must_use]
    pub fn chars_written(&self) -> usize {
        self.ops.iter().filter(|op| matches!(op, Op::WriteChar(_))).count()
    }

    /// Total time requested through [`sleep`](TerminalBackend::sleep) in
    /// the current log.
    #[must_use]
    pub fn slept(&self) -> Duration {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Sleep(d) => Some(*d),
                _ => None,
            })
            .sum()
    }

    /// Whether raw mode is active.
    #[must_use]
    pub const fn is_raw(&self) -> bool {
        self.raw
    }

    #[must_use]
    pub const fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// What the terminal shows at `(x, y)`.
    #[must_use]
    pub fn screen_cell(&self, x: u16, y: u16) -> Option<Cell> {
        if x < self.screen_size.cols && y < self.screen_size.rows {
            let idx = usize::from(y) * usize::from(self.screen_size.cols) + usize::from(x);
            Some(self.screen[idx])
        } else {
            None
        }
    }

    /// The characters of screen row `y`.
    #[must_use]
    pub fn screen_row(&self, y: u16) -> String {
        (0..self.screen_size.cols)
            .filter_map(|x| self.screen_cell(x, y))
            .map(|c| c.ch)
            .collect()
    }
}

impl TerminalBackend for HeadlessTerminal {
    fn enter_raw_mode(&mut self) -> io::Result<()> {
        self.ops.push(Op::EnterRawMode);
        self.raw = true;
        Ok(())
    }

    fn restore_mode(&mut self) -> io::Result<()> {
        self.ops.push(Op::RestoreMode);
        self.raw = false;
        self.cursor_visible = true;
        self.cursor = (0, 0);
        self.screen.fill(Cell::EMPTY);
        Ok(())
    }

    fn set_cell_colors(&mut self, fg: Color, bg: Color) {
        self.ops.push(Op::SetColors { fg, bg });
        self.colors = (fg, bg);
    }

    fn move_cursor(&mut self, x: u16, y: u16) {
        self.ops.push(Op::MoveCursor { x, y });
        self.cursor = (x, y);
    }

    fn write_char(&mut self, ch: char) {
        self.ops.push(Op::WriteChar(ch));
        let (x, y) = self.cursor;
        if x < self.screen_size.cols && y < self.screen_size.rows {
            let idx = usize::from(y) * usize::from(self.screen_size.cols) + usize::from(x);
            self.screen[idx] = Cell::new(ch, self.colors.0, self.colors.1);
        }
        self.cursor = (x.saturating_add(1), y);
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        self.ops.push(Op::SetCursorVisible(visible));
        self.cursor_visible = visible;
    }

    fn set_title(&mut self, title: &str) {
        self.ops.push(Op::SetTitle(title.to_owned()));
        title.clone_into(&mut self.title);
    }

    fn clear_screen(&mut self, bg: Color) {
        self.ops.push(Op::ClearScreen(bg));
        self.screen.fill(Cell::blank(bg));
        self.cursor = (0, 0);
    }

    fn query_size(&self) -> Option<Size> {
        self.size
    }

    fn now(&self) -> Duration {
        self.clock
    }

    fn sleep(&mut self, duration: Duration) {
        self.ops.push(Op::Sleep(duration));
        self.clock += duration;
    }

    fn flush(&mut self) -> io::Result<()> {
        self.ops.push(Op::Flush);
        Ok(())
    }

    fn poll_key(&mut self) -> Option<KeyCode> {
        let bytes = self.input.pop_front()?;
        input::decode(&bytes)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{RED, WHITE};
    use pretty_assertions::assert_eq;

    #[test]
    fn zero_size_reports_none() {
        assert_eq!(HeadlessTerminal::new(0, 10).query_size(), None);
        assert_eq!(HeadlessTerminal::new(10, 4).query_size(), Some(Size::new(10, 4)));
    }

    #[test]
    fn ops_are_logged_in_order() {
        let mut t = HeadlessTerminal::new(4, 2);
        t.enter_raw_mode().unwrap();
        t.move_cursor(1, 1);
        t.set_cell_colors(WHITE, RED);
        t.write_char('x');
        t.flush().unwrap();
        assert_eq!(
            t.take_ops(),
            vec![
                Op::EnterRawMode,
                Op::MoveCursor { x: 1, y: 1 },
                Op::SetColors { fg: WHITE, bg: RED },
                Op::WriteChar('x'),
                Op::Flush,
            ]
        );
        assert!(t.ops().is_empty());
    }

    #[test]
    fn virtual_screen_tracks_writes() {
        let mut t = HeadlessTerminal::new(4, 2);
        t.clear_screen(RED);
        t.set_cell_colors(WHITE, RED);
        t.move_cursor(1, 0);
        t.write_char('a');
        t.write_char('b');
        assert_eq!(t.screen_row(0), " ab ");
        assert_eq!(t.screen_cell(2, 0), Some(Cell::new('b', WHITE, RED)));
        assert_eq!(t.screen_cell(0, 1), Some(Cell::blank(RED)));
    }

    #[test]
    fn writes_past_the_edge_are_dropped() {
        let mut t = HeadlessTerminal::new(2, 1);
        t.move_cursor(1, 0);
        t.write_char('a');
        t.write_char('b');
        assert_eq!(t.screen_row(0), " a");
    }

    #[test]
    fn sleep_advances_clock() {
        let mut t = HeadlessTerminal::new(1, 1);
        t.advance(Duration::from_millis(3));
        t.sleep(Duration::from_millis(7));
        assert_eq!(t.now(), Duration::from_millis(10));
        assert_eq!(t.slept(), Duration::from_millis(7));
    }

    #[test]
    fn input_reads_are_truncated_to_lookahead() {
        let mut t = HeadlessTerminal::new(1, 1);
        t.push_input(b"0123456789");
        assert_eq!(t.poll_key(), Some(KeyCode::Char(b'0')));
        assert_eq!(t.poll_key(), None);
    }

    #[test]
    fn push_key_round_trips_through_decoder() {
        let keys = [
            KeyCode::Char(b'w'),
            KeyCode::Enter,
            KeyCode::Backspace,
            KeyCode::Delete,
            KeyCode::Up,
            KeyCode::Down,
            KeyCode::Left,
            KeyCode::Right,
            KeyCode::F(1),
            KeyCode::F(4),
            KeyCode::F(5),
            KeyCode::F(12),
        ];
        let mut t = HeadlessTerminal::new(1, 1);
        for key in keys {
            t.push_key(key);
            assert_eq!(t.poll_key(), Some(key));
        }
    }

    #[test]
    fn bare_escape_reads_as_no_key() {
        let mut t = HeadlessTerminal::new(1, 1);
        t.push_key(KeyCode::Escape);
        assert_eq!(t.poll_key(), None);
    }

    #[test]
    fn invalid_function_key_queues_nothing() {
        let mut t = HeadlessTerminal::new(1, 1);
        t.push_key(KeyCode::F(13));
        t.push_key(KeyCode::Char(b'z'));
        assert_eq!(t.poll_key(), Some(KeyCode::Char(b'z')));
    }

    #[test]
    fn restore_clears_screen_and_raw_flag() {
        let mut t = HeadlessTerminal::new(2, 1);
        t.enter_raw_mode().unwrap();
        t.set_cursor_visible(false);
        t.write_char('z');
        t.restore_mode().unwrap();
        assert!(!t.is_raw());
        assert!(t.cursor_visible());
        assert_eq!(t.screen_row(0), "  ");
    }

    #[test]
    fn title_is_recorded() {
        let mut t = HeadlessTerminal::new(1, 1);
        t.set_title("hello");
        assert_eq!(t.title(), "hello");
    }
}
