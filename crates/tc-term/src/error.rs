// SPDX-License-Identifier: MIT
//
// Engine error types.

use std::io;

use thiserror::Error;

use crate::backend::Size;

/// Errors reported by the fallible engine entry points.
///
/// Drawing never fails. Only opening the terminal and starting a frame can,
/// and both restore the terminal before the error is returned.
#[derive(Error, Debug)]
pub enum Error {
    #[error("could not determine terminal size")]
    TerminalSize,

    #[error("terminal size changed from {from} to {to}")]
    Resized { from: Size, to: Size },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
