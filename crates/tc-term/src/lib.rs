// SPDX-License-Identifier: MIT
//
// tc-term: character-cell drawing straight to a terminal.
//
// An application opens an `Engine`, then draws frames into a grid of cells:
// text, rectangles and single-cell "pixels", each with a foreground and
// background color. At the end of each frame only the cells that changed
// are sent to the terminal, keyboard input is decoded without blocking, and
// the loop is paced to a target frame rate.
//
// No terminal library sits underneath. POSIX terminals are driven with
// termios and ANSI escape sequences, the Windows console through its own
// API, and tests through an in-memory terminal. All three implement
// `TerminalBackend`.

pub mod ansi;
pub mod backend;
pub mod buffer;
pub mod canvas;
pub mod cell;
pub mod color;
pub mod config;
pub mod diff;
pub mod engine;
pub mod error;
pub mod input;
pub mod output;
pub mod pacing;
pub mod palette;

pub use backend::{HeadlessTerminal, Size, TerminalBackend};
#[cfg(any(unix, windows))]
pub use backend::NativeTerminal;
pub use buffer::FrameBuffer;
pub use canvas::Canvas;
pub use cell::Cell;
pub use color::Color;
pub use config::EngineConfig;
pub use diff::RenderStats;
pub use engine::Engine;
pub use error::{Error, Result};
pub use input::KeyCode;
