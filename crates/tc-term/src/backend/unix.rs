// SPDX-License-Identifier: MIT
//
// AnsiTerminal: termios raw mode and ANSI output.
//
// Safety: This module uses `unsafe` for termios (tcgetattr, tcsetattr),
// sigaction, ioctl (TIOCGWINSZ), isatty, poll, read, and raw fd writes.
// These are the POSIX interfaces for terminal control and have no safe
// equivalent in std. Each unsafe block is a single call.
#![allow(unsafe_code)]
//
// Raw mode here is deliberately light: only canonical input and echo are
// turned off, with VMIN=0/VTIME=0 so reads never block. Output processing
// stays on. SIGINT is pointed at a no-op handler so Ctrl-C cannot kill the
// process with the terminal still in raw mode; the previous disposition is
// saved and put back on restore.
//
// The panic hook bypasses Rust's stdout lock and writes a pre-built restore
// sequence straight to fd 1, then reapplies the saved termios from a global
// backup. A panic mid-flush, while the lock is held, cannot deadlock it.

use std::io::{self, Write};
use std::os::unix::io::AsRawFd;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::{Size, TerminalBackend, install_panic_hook};
use crate::color::Color;
use crate::input::{self, KeyCode};
use crate::output::AnsiWriter;
use crate::pacing;

// ─── Terminal Queries ────────────────────────────────────────────────────────

/// Query the terminal size via `ioctl(TIOCGWINSZ)` on stdout.
///
/// Returns `None` if stdout is not a terminal or reports a zero size.
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };

    if result == 0 {
        Size::new(ws.ws_col, ws.ws_row).non_zero()
    } else {
        None
    }
}

/// Whether stdin is connected to a terminal.
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

// ─── Panic-Safe Restore ──────────────────────────────────────────────────────

/// Global copy of the original termios, for the panic hook.
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Reset colors, show the cursor, home, clear.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[0m\x1b[?25h\x1b[H\x1b[2J";

fn emergency_restore() {
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref original) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, original);
            }
        }
    }
}

extern "C" fn ignore_signal(_sig: libc::c_int) {}

// ─── AnsiTerminal ────────────────────────────────────────────────────────────

/// The unix terminal backend.
///
/// Output is accumulated in memory and reaches stdout in one `write` per
/// [`flush`](TerminalBackend::flush). The terminal is restored on drop if
/// raw mode is still active.
pub struct AnsiTerminal {
    original_termios: Option<libc::termios>,
    original_sigint: Option<libc::sigaction>,
    writer: AnsiWriter,
    epoch: Instant,
    active: bool,
}

impl AnsiTerminal {
    #[must_use]
    pub fn new() -> Self {
        Self {
            original_termios: None,
            original_sigint: None,
            writer: AnsiWriter::new(),
            epoch: Instant::now(),
            active: false,
        }
    }

    /// Whether raw mode is currently active.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    fn enable_raw_mode(&mut self) -> io::Result<()> {
        if !is_tty() {
            log::debug!("stdin is not a tty, leaving input mode unchanged");
            return Ok(());
        }

        let fd = io::stdin().as_raw_fd();

        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &raw mut termios) != 0 {
                return Err(io::Error::last_os_error());
            }

            self.original_termios = Some(termios);
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = Some(termios);
            }

            termios.c_lflag &= !(libc::ICANON | libc::ECHO);
            termios.c_cc[libc::VMIN] = 0;
            termios.c_cc[libc::VTIME] = 0;

            if libc::tcsetattr(fd, libc::TCSANOW, &raw const termios) != 0 {
                return Err(io::Error::last_os_error());
            }
        }

        Ok(())
    }

    fn disable_raw_mode(&mut self) -> io::Result<()> {
        if let Some(ref original) = self.original_termios {
            let fd = io::stdin().as_raw_fd();

            unsafe {
                if libc::tcsetattr(fd, libc::TCSANOW, original) != 0 {
                    return Err(io::Error::last_os_error());
                }
            }

            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }
            self.original_termios = None;
        }
        Ok(())
    }

    fn ignore_sigint(&mut self) {
        unsafe {
            let mut sa: libc::sigaction = std::mem::zeroed();
            sa.sa_sigaction = ignore_signal as *const () as usize;
            sa.sa_flags = 0;
            libc::sigemptyset(&raw mut sa.sa_mask);

            let mut old: libc::sigaction = std::mem::zeroed();
            if libc::sigaction(libc::SIGINT, &raw const sa, &raw mut old) == 0 {
                self.original_sigint = Some(old);
            } else {
                log::warn!(
                    "could not install SIGINT handler: {}",
                    io::Error::last_os_error()
                );
            }
        }
    }

    fn restore_sigint(&mut self) {
        if let Some(old) = self.original_sigint.take() {
            let rc = unsafe { libc::sigaction(libc::SIGINT, &raw const old, std::ptr::null_mut()) };
            if rc != 0 {
                log::warn!(
                    "could not restore SIGINT handler: {}",
                    io::Error::last_os_error()
                );
            }
        }
    }
}

impl Default for AnsiTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalBackend for AnsiTerminal {
    fn enter_raw_mode(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }

        install_panic_hook(emergency_restore);

        // Marked active first so a failure below still gets a restore.
        self.active = true;
        self.enable_raw_mode()?;
        self.ignore_sigint();
        log::debug!("raw mode entered");
        Ok(())
    }

    fn restore_mode(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        self.writer.restore_screen();
        if let Err(e) = self.flush() {
            log::warn!("flush during restore failed: {e}");
        }

        let result = self.disable_raw_mode();
        self.restore_sigint();
        log::debug!("raw mode left");
        result
    }

    fn set_cell_colors(&mut self, fg: Color, bg: Color) {
        self.writer.set_colors(fg, bg);
    }

    fn move_cursor(&mut self, x: u16, y: u16) {
        self.writer.move_cursor(x, y);
    }

    fn write_char(&mut self, ch: char) {
        self.writer.write_char(ch);
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        self.writer.set_cursor_visible(visible);
    }

    fn set_title(&mut self, title: &str) {
        self.writer.set_title(title);
    }

    fn clear_screen(&mut self, bg: Color) {
        self.writer.clear_screen(bg);
    }

    fn query_size(&self) -> Option<Size> {
        get_size()
    }

    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        pacing::sleep(duration);
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        self.writer.flush_to(&mut stdout)?;
        stdout.flush()
    }

    fn poll_key(&mut self) -> Option<KeyCode> {
        let mut pfd = libc::pollfd {
            fd: libc::STDIN_FILENO,
            events: libc::POLLIN,
            revents: 0,
        };
        let ready = unsafe { libc::poll(&raw mut pfd, 1, 0) };
        if ready <= 0 || pfd.revents & libc::POLLIN == 0 {
            return None;
        }

        let mut buf = [0u8; input::MAX_READ];
        let n = unsafe { libc::read(libc::STDIN_FILENO, buf.as_mut_ptr().cast(), buf.len()) };
        let n = usize::try_from(n).ok().filter(|&n| n > 0)?;

        let key = input::decode(&buf[..n]);
        log::trace!("read {n} bytes -> {key:?}");
        key
    }
}

impl Drop for AnsiTerminal {
    fn drop(&mut self) {
        if self.active {
            let _ = self.restore_mode();
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_size_does_not_panic() {
        let _ = get_size();
    }

    #[test]
    fn is_tty_does_not_panic() {
        let _ = is_tty();
    }

    #[test]
    fn emergency_restore_shows_cursor_and_clears() {
        let s = std::str::from_utf8(EMERGENCY_RESTORE).unwrap();
        assert!(s.starts_with("\x1b[0m"), "must reset colors first");
        assert!(s.contains("\x1b[?25h"), "must show cursor");
        assert!(s.ends_with("\x1b[2J"), "must clear the screen");
    }

    #[test]
    fn new_is_inactive() {
        assert!(!AnsiTerminal::new().is_active());
    }

    #[test]
    fn restore_without_enter_is_noop() {
        let mut term = AnsiTerminal::new();
        term.restore_mode().unwrap();
        term.restore_mode().unwrap();
        assert!(!term.is_active());
    }

    #[test]
    fn clock_is_monotonic() {
        let term = AnsiTerminal::new();
        let a = term.now();
        let b = term.now();
        assert!(b >= a);
    }
}
