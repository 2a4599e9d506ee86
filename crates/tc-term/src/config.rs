// SPDX-License-Identifier: MIT
//
// Engine configuration.

use crate::color::{self, Color};
use crate::input::KeyCode;

/// Settings applied when an [`Engine`](crate::Engine) is created.
///
/// ```
/// use tc_term::{color, EngineConfig, KeyCode};
///
/// let config = EngineConfig::default()
///     .with_target_fps(30)
///     .with_quit_keys(vec![KeyCode::Char(b'x')])
///     .with_initial_background(color::DARKBLUE);
/// assert_eq!(config.target_fps, 30);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Frames per second to pace to. `0` or negative means unlimited.
    pub target_fps: i32,
    /// Keys that make [`should_quit`](crate::Engine::should_quit) true.
    pub quit_keys: Vec<KeyCode>,
    /// Background used before the first `clear_background`.
    pub initial_background: Color,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_fps: 0,
            quit_keys: vec![KeyCode::Escape, KeyCode::Char(b'q')],
            initial_background: color::BLACK,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub const fn with_target_fps(mut self, fps: i32) -> Self {
        self.target_fps = fps;
        self
    }

    #[must_use]
    pub fn with_quit_keys(mut self, keys: Vec<KeyCode>) -> Self {
        self.quit_keys = keys;
        self
    }

    #[must_use]
    pub const fn with_initial_background(mut self, color: Color) -> Self {
        self.initial_background = color;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = EngineConfig::default();
        assert_eq!(c.target_fps, 0);
        assert_eq!(c.quit_keys, vec![KeyCode::Escape, KeyCode::Char(b'q')]);
        assert_eq!(c.initial_background, color::BLACK);
    }

    #[test]
    fn builders_override() {
        let c = EngineConfig::default()
            .with_target_fps(60)
            .with_quit_keys(Vec::new())
            .with_initial_background(color::RED);
        assert_eq!(c.target_fps, 60);
        assert!(c.quit_keys.is_empty());
        assert_eq!(c.initial_background, color::RED);
    }
}
