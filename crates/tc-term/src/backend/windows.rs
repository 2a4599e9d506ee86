// SPDX-License-Identifier: MIT
//
// ConsoleTerminal: the Windows console API.
//
// Safety: Console handles, mode changes, attribute writes and the CRT's
// `_kbhit`/`_getch` are only reachable through FFI. Each unsafe block is a
// single call on a handle obtained from GetStdHandle.
#![allow(unsafe_code)]
//
// Colors go through `ConsoleAttr`, the same nearest-color mapping the ANSI
// backend uses, expressed as a console attribute word. Characters with the
// same attribute on the same row are collected into a run and written with
// one WriteConsoleW call.

use std::io;
use std::ptr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use windows_sys::Win32::Foundation::{BOOL, FALSE, HANDLE, INVALID_HANDLE_VALUE, TRUE};
use windows_sys::Win32::System::Console::{
    CONSOLE_CURSOR_INFO, CONSOLE_MODE, CONSOLE_SCREEN_BUFFER_INFO, COORD, CTRL_C_EVENT,
    ENABLE_ECHO_INPUT, ENABLE_LINE_INPUT, FillConsoleOutputAttribute, FillConsoleOutputCharacterW,
    GetConsoleCursorInfo, GetConsoleMode, GetConsoleScreenBufferInfo, GetStdHandle,
    STD_INPUT_HANDLE, STD_OUTPUT_HANDLE, SetConsoleCtrlHandler, SetConsoleCursorInfo,
    SetConsoleCursorPosition, SetConsoleMode, SetConsoleTextAttribute, SetConsoleTitleW,
    WriteConsoleW,
};

use super::{Size, TerminalBackend, install_panic_hook};
use crate::color::{Color, ConsoleAttr};
use crate::input::{self, KeyCode};
use crate::pacing;

unsafe extern "C" {
    fn _kbhit() -> i32;
    fn _getch() -> i32;
}

/// Default white-on-black attribute used when restoring.
const DEFAULT_ATTR: u16 = 0x0007;

/// Original input mode, for the panic hook.
static MODE_BACKUP: Mutex<Option<CONSOLE_MODE>> = Mutex::new(None);

unsafe extern "system" fn swallow_ctrl_c(ctrl_type: u32) -> BOOL {
    if ctrl_type == CTRL_C_EVENT { TRUE } else { FALSE }
}

fn std_handle(which: u32) -> Option<HANDLE> {
    let h = unsafe { GetStdHandle(which) };
    (!h.is_null() && h != INVALID_HANDLE_VALUE).then_some(h)
}

fn emergency_restore() {
    let Some(out) = std_handle(STD_OUTPUT_HANDLE) else {
        return;
    };
    unsafe {
        SetConsoleTextAttribute(out, DEFAULT_ATTR);
        let info = CONSOLE_CURSOR_INFO { dwSize: 25, bVisible: TRUE };
        SetConsoleCursorInfo(out, &raw const info);
    }
    if let (Ok(guard), Some(input)) = (MODE_BACKUP.lock(), std_handle(STD_INPUT_HANDLE)) {
        if let Some(mode) = *guard {
            unsafe {
                SetConsoleMode(input, mode);
            }
        }
    }
}

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn coord(x: u16, y: u16) -> COORD {
    COORD {
        X: i16::try_from(x).unwrap_or(i16::MAX),
        Y: i16::try_from(y).unwrap_or(i16::MAX),
    }
}

// ─── ConsoleTerminal ─────────────────────────────────────────────────────────

/// The Windows console backend.
pub struct ConsoleTerminal {
    input: Option<HANDLE>,
    output: Option<HANDLE>,
    original_mode: Option<CONSOLE_MODE>,
    ctrl_handler: bool,
    epoch: Instant,
    active: bool,
    attr: Option<ConsoleAttr>,
    cursor: Option<(u16, u16)>,
    run: Vec<u16>,
}

impl ConsoleTerminal {
    #[must_use]
    pub fn new() -> Self {
        Self {
            input: std_handle(STD_INPUT_HANDLE),
            output: std_handle(STD_OUTPUT_HANDLE),
            original_mode: None,
            ctrl_handler: false,
            epoch: Instant::now(),
            active: false,
            attr: None,
            cursor: None,
            run: Vec::with_capacity(256),
        }
    }

    /// Whether raw mode is currently active.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Write the pending character run.
    fn flush_run(&mut self) -> io::Result<()> {
        if self.run.is_empty() {
            return Ok(());
        }
        let Some(out) = self.output else {
            self.run.clear();
            return Ok(());
        };
        let len = u32::try_from(self.run.len()).unwrap_or(u32::MAX);
        let mut written = 0u32;
        let ok = unsafe {
            WriteConsoleW(out, self.run.as_ptr().cast(), len, &raw mut written, ptr::null())
        };
        self.run.clear();
        if ok == 0 { Err(io::Error::last_os_error()) } else { Ok(()) }
    }

    fn flush_run_logged(&mut self) {
        if let Err(e) = self.flush_run() {
            log::warn!("console write failed: {e}");
        }
    }

    fn screen_info(&self) -> Option<CONSOLE_SCREEN_BUFFER_INFO> {
        let out = self.output?;
        let mut info: CONSOLE_SCREEN_BUFFER_INFO = unsafe { std::mem::zeroed() };
        let ok = unsafe { GetConsoleScreenBufferInfo(out, &raw mut info) };
        (ok != 0).then_some(info)
    }

    fn fill(&mut self, attr: u16) {
        let (Some(out), Some(info)) = (self.output, self.screen_info()) else {
            return;
        };
        let cells = u32::try_from(i32::from(info.dwSize.X) * i32::from(info.dwSize.Y)).unwrap_or(0);
        let origin = COORD { X: 0, Y: 0 };
        let mut written = 0u32;
        unsafe {
            FillConsoleOutputCharacterW(out, u16::from(b' '), cells, origin, &raw mut written);
            FillConsoleOutputAttribute(out, attr, cells, origin, &raw mut written);
            SetConsoleCursorPosition(out, origin);
        }
        self.cursor = Some((0, 0));
    }
}

impl Default for ConsoleTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalBackend for ConsoleTerminal {
    fn enter_raw_mode(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }
        install_panic_hook(emergency_restore);
        self.active = true;

        if let Some(input) = self.input {
            let mut mode: CONSOLE_MODE = 0;
            if unsafe { GetConsoleMode(input, &raw mut mode) } == 0 {
                return Err(io::Error::last_os_error());
            }
            self.original_mode = Some(mode);
            if let Ok(mut guard) = MODE_BACKUP.lock() {
                *guard = Some(mode);
            }
            let raw = mode & !(ENABLE_LINE_INPUT | ENABLE_ECHO_INPUT);
            if unsafe { SetConsoleMode(input, raw) } == 0 {
                return Err(io::Error::last_os_error());
            }
        }

        if unsafe { SetConsoleCtrlHandler(Some(swallow_ctrl_c), TRUE) } == 0 {
            log::warn!("could not install Ctrl-C handler: {}", io::Error::last_os_error());
        } else {
            self.ctrl_handler = true;
        }

        log::debug!("console raw mode entered");
        Ok(())
    }

    fn restore_mode(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        self.flush_run_logged();
        self.set_cursor_visible(true);
        self.fill(DEFAULT_ATTR);
        self.attr = None;

        let mut result = Ok(());
        if let (Some(input), Some(mode)) = (self.input, self.original_mode.take()) {
            if unsafe { SetConsoleMode(input, mode) } == 0 {
                result = Err(io::Error::last_os_error());
            }
            if let Ok(mut guard) = MODE_BACKUP.lock() {
                *guard = None;
            }
        }
        if self.ctrl_handler {
            unsafe {
                SetConsoleCtrlHandler(Some(swallow_ctrl_c), FALSE);
            }
            self.ctrl_handler = false;
        }

        log::debug!("console raw mode left");
        result
    }

    fn set_cell_colors(&mut self, fg: Color, bg: Color) {
        let attr = ConsoleAttr::from_colors(fg, bg);
        if self.attr == Some(attr) {
            return;
        }
        self.flush_run_logged();
        if let Some(out) = self.output {
            unsafe {
                SetConsoleTextAttribute(out, attr.bits());
            }
        }
        self.attr = Some(attr);
    }

    fn move_cursor(&mut self, x: u16, y: u16) {
        if self.cursor == Some((x, y)) {
            return;
        }
        self.flush_run_logged();
        if let Some(out) = self.output {
            unsafe {
                SetConsoleCursorPosition(out, coord(x, y));
            }
        }
        self.cursor = Some((x, y));
    }

    fn write_char(&mut self, ch: char) {
        let mut units = [0u16; 2];
        self.run.extend_from_slice(ch.encode_utf16(&mut units));
        self.cursor = self.cursor.map(|(x, y)| (x.saturating_add(1), y));
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        let Some(out) = self.output else {
            return;
        };
        let mut info = CONSOLE_CURSOR_INFO { dwSize: 25, bVisible: TRUE };
        unsafe {
            GetConsoleCursorInfo(out, &raw mut info);
        }
        info.bVisible = if visible { TRUE } else { FALSE };
        unsafe {
            SetConsoleCursorInfo(out, &raw const info);
        }
    }

    fn set_title(&mut self, title: &str) {
        let wide = to_wide(title);
        unsafe {
            SetConsoleTitleW(wide.as_ptr());
        }
    }

    fn clear_screen(&mut self, bg: Color) {
        self.flush_run_logged();
        let attr = ConsoleAttr::from_colors(bg, bg);
        self.fill(attr.bits());
        self.set_cell_colors(bg, bg);
    }

    fn query_size(&self) -> Option<Size> {
        let info = self.screen_info()?;
        let w = info.srWindow.Right - info.srWindow.Left + 1;
        let h = info.srWindow.Bottom - info.srWindow.Top + 1;
        Size::new(u16::try_from(w).ok()?, u16::try_from(h).ok()?).non_zero()
    }

    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        pacing::sleep(duration);
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_run()
    }

    fn poll_key(&mut self) -> Option<KeyCode> {
        if unsafe { _kbhit() } == 0 {
            return None;
        }
        let first = u8::try_from(unsafe { _getch() }).ok()?;
        let key = input::decode_console(first, || {
            u8::try_from(unsafe { _getch() }).unwrap_or(0)
        });
        log::trace!("console key {first:#04x} -> {key:?}");
        key
    }
}

impl Drop for ConsoleTerminal {
    fn drop(&mut self) {
        if self.active {
            let _ = self.restore_mode();
        }
    }
}
