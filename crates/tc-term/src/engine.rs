// SPDX-License-Identifier: MIT
//
// Engine: the frame loop context.
//
// Everything an application touches lives here: the backend, the frame
// buffer being drawn, the renderer holding the frame on screen, the pacer
// and the single key slot. A frame looks like:
//
//   engine.begin_frame();          size check, key poll, grid reset
//   engine.clear_background(..);   draw calls land in the current grid
//   engine.draw_text(..);
//   engine.end_frame();            diff, flush, sleep to the target rate
//
// State machine:
//
//   Closed ──open──▶ Open ──close──▶ Closed
//
// The grids exist only while open, so "closed" is `frames == None` and every
// operation on a closed engine quietly does nothing. Opening twice is a
// no-op. Closing restores the terminal exactly once; dropping an open
// engine closes it.
//
// A terminal that changes size between frames is fatal. The grids are sized
// once at open and never reallocated.

use std::process;

use crate::backend::{Size, TerminalBackend};
use crate::buffer::FrameBuffer;
use crate::canvas::Canvas;
use crate::cell::Cell;
use crate::color::Color;
use crate::config::EngineConfig;
use crate::diff::{DiffRenderer, RenderStats};
use crate::error::{Error, Result};
use crate::input::KeyCode;
use crate::pacing::FramePacer;

/// Grids that exist only while the engine is open.
struct Frames {
    current: FrameBuffer,
    renderer: DiffRenderer,
    size: Size,
}

impl Frames {
    fn new(size: Size, background: Color) -> Self {
        Self {
            current: FrameBuffer::with_background(size.cols, size.rows, background),
            renderer: DiffRenderer::new(size.cols, size.rows, background),
            size,
        }
    }
}

/// A terminal drawing context.
///
/// ```
/// use tc_term::backend::HeadlessTerminal;
/// use tc_term::{color, Engine};
///
/// let mut engine = Engine::new(HeadlessTerminal::new(10, 4));
/// engine.open(0, 0, "demo");
/// engine.begin_frame();
/// engine.clear_background(color::BLACK);
/// engine.draw_text("@", 2, 2, color::WHITE, color::BLANK);
/// let stats = engine.end_frame();
/// assert_eq!(stats.cells_rendered, 1);
/// assert_eq!(engine.backend().screen_row(2), "  @       ");
/// ```
pub struct Engine<B: TerminalBackend> {
    backend: B,
    config: EngineConfig,
    frames: Option<Frames>,
    pacer: FramePacer,
    key: Option<KeyCode>,
}

impl<B: TerminalBackend> Engine<B> {
    /// A closed engine over `backend` with the default configuration.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, EngineConfig::default())
    }

    /// A closed engine over `backend`.
    #[must_use]
    pub fn with_config(backend: B, config: EngineConfig) -> Self {
        let mut pacer = FramePacer::new();
        pacer.set_target_fps(config.target_fps);
        Self {
            backend,
            config,
            frames: None,
            pacer,
            key: None,
        }
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// Take over the terminal.
    ///
    /// `width` and `height` are advisory: the grids always match the real
    /// terminal size. If the terminal cannot be set up, the terminal is
    /// restored and the process exits with status 1.
    pub fn open(&mut self, width: i32, height: i32, title: &str) {
        if let Err(e) = self.try_open(width, height, title) {
            fatal(&e);
        }
    }

    /// Like [`open`](Self::open), but returns the failure.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if raw mode cannot be entered, or
    /// [`Error::TerminalSize`] if the terminal reports no usable size. The
    /// terminal is restored before either is returned.
    pub fn try_open(&mut self, width: i32, height: i32, title: &str) -> Result<()> {
        if self.frames.is_some() {
            return Ok(());
        }

        if let Err(e) = self.backend.enter_raw_mode() {
            self.restore_backend();
            return Err(e.into());
        }

        let Some(size) = self.backend.query_size() else {
            self.restore_backend();
            return Err(Error::TerminalSize);
        };

        let background = self.config.initial_background;
        self.backend.set_title(title);
        self.backend.set_cursor_visible(false);
        self.backend.clear_screen(background);
        if let Err(e) = self.backend.flush() {
            log::warn!("flush after open failed: {e}");
        }

        self.frames = Some(Frames::new(size, background));
        self.key = None;
        log::debug!("engine open at {size} (requested {width}x{height}), title {title:?}");
        Ok(())
    }

    /// Give the terminal back. Does nothing if already closed.
    pub fn close(&mut self) {
        if self.frames.take().is_none() {
            return;
        }
        self.restore_backend();
        self.key = None;
        log::debug!("engine closed");
    }

    #[inline]
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.frames.is_some()
    }

    fn restore_backend(&mut self) {
        if let Err(e) = self.backend.restore_mode() {
            log::warn!("restoring terminal mode failed: {e}");
        }
    }

    // ─── Frames ──────────────────────────────────────────────────────────

    /// Start a frame: check the size, poll the key, reset the grid to the
    /// current background.
    ///
    /// A size change restores the terminal, reports the change and exits
    /// with status 1.
    pub fn begin_frame(&mut self) {
        if let Err(e) = self.try_begin_frame() {
            fatal(&e);
        }
    }

    /// Like [`begin_frame`](Self::begin_frame), but returns the resize.
    ///
    /// # Errors
    ///
    /// [`Error::Resized`] if the terminal size differs from the size at
    /// open. The engine is closed before the error is returned.
    pub fn try_begin_frame(&mut self) -> Result<()> {
        let Some(from) = self.frames.as_ref().map(|f| f.size) else {
            return Ok(());
        };

        let measured = self.backend.query_size();
        if measured != Some(from) {
            self.close();
            return Err(Error::Resized {
                from,
                to: measured.unwrap_or(Size::new(0, 0)),
            });
        }

        self.pacer.begin(self.backend.now());
        self.key = self.backend.poll_key();
        if let Some(key) = self.key {
            log::trace!("key {key} ({})", key.code());
        }

        if let Some(frames) = self.frames.as_mut() {
            let background = frames.current.background();
            frames.current.clear(background);
        }
        Ok(())
    }

    /// Send the changed cells, flush, and sleep out the rest of the frame.
    ///
    /// Returns what the renderer did; a closed engine reports nothing.
    pub fn end_frame(&mut self) -> RenderStats {
        let Some(frames) = self.frames.as_mut() else {
            return RenderStats::default();
        };

        let stats = frames.renderer.render(&frames.current, &mut self.backend);
        if let Err(e) = self.backend.flush() {
            log::warn!("frame flush failed: {e}");
        }
        log::trace!(
            "frame: {} rendered, {} skipped, {} rows skipped",
            stats.cells_rendered,
            stats.cells_skipped,
            stats.rows_skipped
        );

        if let Some(pause) = self.pacer.remaining(self.backend.now()) {
            self.backend.sleep(pause);
        }
        stats
    }

    /// Pace frames to `fps`. `fps <= 0` removes the limit.
    ///
    /// The target belongs to the engine, not to one open session: it may be
    /// set while closed and it survives `close` and a later `open`.
    pub fn set_target_fps(&mut self, fps: i32) {
        self.pacer.set_target_fps(fps);
        log::debug!("target frame time {:?}", self.pacer.target());
    }

    // ─── Drawing ─────────────────────────────────────────────────────────

    /// Fill the grid with spaces in `color` and make it the background that
    /// `BLANK` resolves to.
    pub fn clear_background(&mut self, color: Color) {
        if let Some(frames) = self.frames.as_mut() {
            frames.current.clear(color);
        }
    }

    pub fn draw_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(frames) = self.frames.as_mut() {
            frames.current.draw_pixel(x, y, color);
        }
    }

    pub fn draw_text(&mut self, text: &str, x: i32, y: i32, fg: Color, bg: Color) {
        if let Some(frames) = self.frames.as_mut() {
            frames.current.draw_text(text, x, y, fg, bg);
        }
    }

    pub fn draw_rect_filled(&mut self, x: i32, y: i32, w: i32, h: i32, fg: Color, bg: Color) {
        if let Some(frames) = self.frames.as_mut() {
            frames.current.draw_rect_filled(x, y, w, h, fg, bg);
        }
    }

    pub fn draw_rect_outline(&mut self, x: i32, y: i32, w: i32, h: i32, fg: Color, bg: Color) {
        if let Some(frames) = self.frames.as_mut() {
            frames.current.draw_rect_outline(x, y, w, h, fg, bg);
        }
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// The key polled this frame, clearing the slot.
    pub const fn get_key(&mut self) -> Option<KeyCode> {
        self.key.take()
    }

    /// Whether the key polled this frame is `key`.
    #[must_use]
    pub fn is_key(&self, key: KeyCode) -> bool {
        self.key == Some(key)
    }

    /// Whether the key polled this frame is one of the configured quit keys.
    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.key.is_some_and(|k| self.config.quit_keys.contains(&k))
    }

    // ─── Inspection ──────────────────────────────────────────────────────

    /// Grid width in cells, `0` when closed.
    #[must_use]
    pub fn screen_width(&self) -> u16 {
        self.frames.as_ref().map_or(0, |f| f.size.cols)
    }

    /// Grid height in cells, `0` when closed.
    #[must_use]
    pub fn screen_height(&self) -> u16 {
        self.frames.as_ref().map_or(0, |f| f.size.rows)
    }

    /// The cell drawn at `(x, y)` this frame.
    #[must_use]
    pub fn cell(&self, x: u16, y: u16) -> Option<Cell> {
        self.frames.as_ref()?.current.get(x, y).copied()
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    pub const fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

#[cfg(any(unix, windows))]
impl Engine<crate::backend::NativeTerminal> {
    /// A closed engine over this platform's terminal.
    #[must_use]
    pub fn native(config: EngineConfig) -> Self {
        Self::with_config(crate::backend::NativeTerminal::new(), config)
    }
}

impl<B: TerminalBackend> Canvas for Engine<B> {
    fn width(&self) -> u16 {
        self.screen_width()
    }

    fn height(&self) -> u16 {
        self.screen_height()
    }

    fn draw_pixel(&mut self, x: i32, y: i32, color: Color) {
        Self::draw_pixel(self, x, y, color);
    }
}

impl<B: TerminalBackend> Drop for Engine<B> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Report a fatal engine error and exit. The terminal is already restored.
fn fatal(err: &Error) -> ! {
    log::error!("{err}");
    eprintln!("tcanvas: {err}. Exiting.");
    process::exit(1);
}

// ─── Tests ───────────────────────────────────────────────────────────────────
