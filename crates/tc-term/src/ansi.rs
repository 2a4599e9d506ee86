// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state
// and no decisions about when to emit; the ANSI backend's writer owns that.
// This module only knows the byte-level encoding of each command.
//
// Cursor positions are 0-indexed in our API and converted to the 1-indexed
// form the terminal expects.
use std::io::{self, Write};

use crate::color::TermColor;

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` (CUP).
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

/// Move the cursor to the top-left corner.
#[inline]
pub fn cursor_home(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[H")
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Reset all SGR attributes (SGR 0).
///
/// Any tracked color state is stale after this.
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

// ─── Color ───────────────────────────────────────────────────────────────────

/// Set foreground and background in one SGR: `ESC[fg;bgm`.
#[inline]
pub fn colors(w: &mut impl Write, fg: TermColor, bg: TermColor) -> io::Result<()> {
    write!(w, "\x1b[{};{}m", fg.sgr_fg(), bg.sgr_bg())
}

// ─── Window ──────────────────────────────────────────────────────────────────

/// Set the window title (OSC 0).
///
/// Control characters in `title` are dropped; BEL or ESC inside the
/// payload would end the sequence early.
pub fn set_title(w: &mut impl Write, title: &str) -> io::Result<()> {
    w.write_all(b"\x1b]0;")?;
    for ch in title.chars().filter(|c| !c.is_control()) {
        let mut utf8 = [0u8; 4];
        w.write_all(ch.encode_utf8(&mut utf8).as_bytes())?;
    }
    w.write_all(b"\x07")
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{self, BaseColor};

    /// Run an ANSI function and return its output as a string.
    fn emit<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    // ── Cursor ──────────────────────────────────────────────────────────

    #[test]
    fn cursor_to_origin() {
        assert_eq!(emit(|w| cursor_to(w, 0, 0)), "\x1b[1;1H");
    }

    #[test]
    fn cursor_to_position() {
        assert_eq!(emit(|w| cursor_to(w, 10, 20)), "\x1b[21;11H");
    }

    #[test]
    fn cursor_to_max_does_not_overflow() {
        assert_eq!(emit(|w| cursor_to(w, u16::MAX, u16::MAX)), "\x1b[65536;65536H");
    }

    #[test]
    fn cursor_visibility() {
        assert_eq!(emit(|w| cursor_hide(w)), "\x1b[?25l");
        assert_eq!(emit(|w| cursor_show(w)), "\x1b[?25h");
        assert_eq!(emit(|w| cursor_home(w)), "\x1b[H");
    }

    // ── Screen ──────────────────────────────────────────────────────────

    #[test]
    fn screen_sequences() {
        assert_eq!(emit(|w| clear_screen(w)), "\x1b[2J");
        assert_eq!(emit(|w| reset(w)), "\x1b[0m");
    }

    // ── Color ───────────────────────────────────────────────────────────

    #[test]
    fn colors_white_on_black() {
        let fg = TermColor::from(color::WHITE);
        let bg = TermColor::from(color::BLACK);
        assert_eq!(emit(|w| colors(w, fg, bg)), "\x1b[97;40m");
    }

    #[test]
    fn colors_dim_red_on_bright_blue() {
        let fg = TermColor { base: BaseColor::Red, bright: false };
        let bg = TermColor { base: BaseColor::Blue, bright: true };
        assert_eq!(emit(|w| colors(w, fg, bg)), "\x1b[31;104m");
    }

    // ── Title ───────────────────────────────────────────────────────────

    #[test]
    fn title_is_osc_zero() {
        assert_eq!(emit(|w| set_title(w, "demo")), "\x1b]0;demo\x07");
    }

    #[test]
    fn title_strips_control_chars() {
        assert_eq!(emit(|w| set_title(w, "a\x07b\x1bc")), "\x1b]0;abc\x07");
    }

    #[test]
    fn title_keeps_unicode() {
        assert_eq!(emit(|w| set_title(w, "héllo")), "\x1b]0;héllo\x07");
    }
}
