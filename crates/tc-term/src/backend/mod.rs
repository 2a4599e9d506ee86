// SPDX-License-Identifier: MIT
//
// Terminal backends.
//
// The engine talks to the terminal only through `TerminalBackend`. Three
// implementations exist:
//
//   AnsiTerminal      termios raw mode and ANSI escape output (unix)
//   ConsoleTerminal   the Windows console API (windows)
//   HeadlessTerminal  an in-memory terminal with scripted input and a
//                     virtual clock, for tests and for running without a TTY
//
// `NativeTerminal` names whichever of the first two the target supports.
//
// Output operations are infallible at the call site. Backends buffer them
// and report I/O failures from `flush`, which the engine logs.

use std::fmt;
use std::io;
use std::sync::Once;
use std::time::Duration;

use crate::color::Color;
use crate::input::KeyCode;

pub mod headless;
#[cfg(unix)]
pub mod unix;
#[cfg(windows)]
pub mod windows;

pub use headless::{HeadlessTerminal, Op};
#[cfg(unix)]
pub use unix::AnsiTerminal;
#[cfg(windows)]
pub use windows::ConsoleTerminal;

/// The backend for the platform being compiled for.
#[cfg(unix)]
pub type NativeTerminal = AnsiTerminal;

/// The backend for the platform being compiled for.
#[cfg(windows)]
pub type NativeTerminal = ConsoleTerminal;

// ─── Size ────────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    /// Number of columns.
    pub cols: u16,
    /// Number of rows.
    pub rows: u16,
}

impl Size {
    #[inline]
    #[must_use]
    pub const fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }

    /// Total number of cells.
    #[inline]
    #[must_use]
    pub const fn area(self) -> u32 {
        self.cols as u32 * self.rows as u32
    }

    /// `Some(self)` unless either dimension is zero.
    #[inline]
    #[must_use]
    pub const fn non_zero(self) -> Option<Self> {
        if self.cols == 0 || self.rows == 0 { None } else { Some(self) }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.cols, self.rows)
    }
}

// ─── TerminalBackend ─────────────────────────────────────────────────────────

/// Everything the engine needs from a terminal.
pub trait TerminalBackend {
    /// Disable line buffering and echo, and neutralize Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns an error if the input mode cannot be read or changed.
    fn enter_raw_mode(&mut self) -> io::Result<()>;

    /// Undo [`enter_raw_mode`](Self::enter_raw_mode): reset colors, show
    /// the cursor, clear the screen and home the cursor, then restore the
    /// saved input mode and Ctrl-C handling.
    ///
    /// Idempotent, and safe after a partial `enter_raw_mode`.
    ///
    /// # Errors
    ///
    /// Returns an error if the saved input mode cannot be reapplied.
    fn restore_mode(&mut self) -> io::Result<()>;

    /// Select the colors for subsequent characters.
    fn set_cell_colors(&mut self, fg: Color, bg: Color);

    /// Move the cursor to the 0-indexed cell `(x, y)`.
    fn move_cursor(&mut self, x: u16, y: u16);

    /// Output one character at the cursor and advance it.
    fn write_char(&mut self, ch: char);

    fn set_cursor_visible(&mut self, visible: bool);

    fn set_title(&mut self, title: &str);

    /// Fill the screen with `bg` and home the cursor.
    fn clear_screen(&mut self, bg: Color);

    /// Current size, or `None` when unavailable or zero.
    fn query_size(&self) -> Option<Size>;

    /// Monotonic time since the backend was created.
    fn now(&self) -> Duration;

    /// Block for `duration`.
    fn sleep(&mut self, duration: Duration);

    /// Push buffered output to the terminal.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal write fails.
    fn flush(&mut self) -> io::Result<()>;

    /// The next pending key, without blocking.
    fn poll_key(&mut self) -> Option<KeyCode>;
}

impl<B: TerminalBackend + ?Sized> TerminalBackend for &mut B {
    fn enter_raw_mode(&mut self) -> io::Result<()> {
        (**self).enter_raw_mode()
    }
    fn restore_mode(&mut self) -> io::Result<()> {
        (**self).restore_mode()
    }
    fn set_cell_colors(&mut self, fg: Color, bg: Color) {
        (**self).set_cell_colors(fg, bg);
    }
    fn move_cursor(&mut self, x: u16, y: u16) {
        (**self).move_cursor(x, y);
    }
    fn write_char(&mut self, ch: char) {
        (**self).write_char(ch);
    }
    fn set_cursor_visible(&mut self, visible: bool) {
        (**self).set_cursor_visible(visible);
    }
    fn set_title(&mut self, title: &str) {
        (**self).set_title(title);
    }
    fn clear_screen(&mut self, bg: Color) {
        (**self).clear_screen(bg);
    }
    fn query_size(&self) -> Option<Size> {
        (**self).query_size()
    }
    fn now(&self) -> Duration {
        (**self).now()
    }
    fn sleep(&mut self, duration: Duration) {
        (**self).sleep(duration);
    }
    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
    fn poll_key(&mut self) -> Option<KeyCode> {
        (**self).poll_key()
    }
}

// ─── Panic Hook ──────────────────────────────────────────────────────────────

static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install (once per process) a panic hook that runs `restore` before the
/// previous hook prints the panic message.
///
/// `restore` must not take locks a panicking thread could be holding; the
/// native backends write straight to the OS handle.
pub(crate) fn install_panic_hook(restore: fn()) {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore();
            original(info);
        }));
        log::debug!("terminal restore panic hook installed");
    });
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_area() {
        assert_eq!(Size::new(80, 24).area(), 1920);
        assert_eq!(Size::new(0, 24).area(), 0);
    }

    #[test]
    fn size_display() {
        assert_eq!(Size::new(80, 24).to_string(), "80x24");
    }

    #[test]
    fn size_non_zero() {
        assert_eq!(Size::new(80, 24).non_zero(), Some(Size::new(80, 24)));
        assert_eq!(Size::new(0, 24).non_zero(), None);
        assert_eq!(Size::new(80, 0).non_zero(), None);
    }

    #[test]
    fn backend_by_mutable_reference() {
        fn title(mut b: impl TerminalBackend) {
            b.set_title("via ref");
        }
        let mut term = HeadlessTerminal::new(4, 2);
        title(&mut term);
        assert_eq!(term.ops(), &[Op::SetTitle("via ref".to_owned())]);
    }
}
