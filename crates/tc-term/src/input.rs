// SPDX-License-Identifier: MIT
//
// Keyboard input decoding.
//
// Turns the bytes of one non-blocking read into at most one key. The engine
// keeps a single key slot per frame, so only the first token of a read is
// decoded and anything after it is dropped.
//
// The POSIX grammar is small:
//
//   ESC [ A|B|C|D        arrows
//   ESC O P|Q|R|S        F1-F4
//   ESC [ <n> ~          F5-F12 for n in 15 17 18 19 20 21 23 24
//   ESC                  Escape (nothing else in the read)
//   CR | LF              Enter
//   BS                   Backspace
//   DEL                  Delete
//   any other byte       that byte as a character code
//
// Any other escape sequence, and any sequence cut short by the end of the
// read, decodes to no key at all.
//
// The Windows console reports special keys as a 0x00 or 0xE0 prefix byte
// followed by a scan code. The scan-code table lives here as well so it is
// testable on every platform.

use std::fmt;

/// Upper bound on bytes consumed by a single poll.
pub const MAX_READ: usize = 8;

const ESC: u8 = 0x1B;
const CR: u8 = b'\r';
const LF: u8 = b'\n';
const BS: u8 = 0x08;
const DEL: u8 = 0x7F;

// ─── KeyCode ─────────────────────────────────────────────────────────────────

/// A decoded key.
///
/// Every key also has a stable integer code (see [`code`](Self::code)):
/// characters are their byte value, named keys use fixed values above 255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A raw character byte. Printable ASCII is the common case.
    Char(u8),
    Enter,
    Backspace,
    Delete,
    Escape,
    Up,
    Down,
    Left,
    Right,
    /// F1 through F12. Use [`KeyCode::function`] to build one from a
    /// number; other values have no code.
    F(u8),
}

impl KeyCode {
    pub const ENTER: u16 = 13;
    pub const BACKSPACE: u16 = 8;
    pub const DELETE: u16 = 127;
    pub const ESCAPE: u16 = 27;
    pub const UP: u16 = 256;
    pub const DOWN: u16 = 257;
    pub const LEFT: u16 = 258;
    pub const RIGHT: u16 = 259;
    pub const F1: u16 = 260;
    pub const F12: u16 = 271;

    /// Function key `n`, for `n` in `1..=12`.
    #[must_use]
    pub const fn function(n: u8) -> Option<Self> {
        match n {
            1..=12 => Some(Self::F(n)),
            _ => None,
        }
    }

    /// The key for a single raw byte.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            CR | LF => Self::Enter,
            BS => Self::Backspace,
            DEL => Self::Delete,
            ESC => Self::Escape,
            b => Self::Char(b),
        }
    }

    /// Integer code for this key. An `F` outside `1..=12` has no code and
    /// yields `0`, the same as "no key".
    ///
    /// ```
    /// use tc_term::input::KeyCode;
    ///
    /// assert_eq!(KeyCode::Char(b'a').code(), 97);
    /// assert_eq!(KeyCode::Up.code(), 256);
    /// assert_eq!(KeyCode::F(12).code(), 271);
    /// ```
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Char(b) => b as u16,
            Self::Enter => Self::ENTER,
            Self::Backspace => Self::BACKSPACE,
            Self::Delete => Self::DELETE,
            Self::Escape => Self::ESCAPE,
            Self::Up => Self::UP,
            Self::Down => Self::DOWN,
            Self::Left => Self::LEFT,
            Self::Right => Self::RIGHT,
            Self::F(n @ 1..=12) => Self::F1 + n as u16 - 1,
            Self::F(_) => 0,
        }
    }

    /// Inverse of [`code`](Self::code). `0` and unknown values are `None`.
    #[must_use]
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => None,
            Self::UP => Some(Self::Up),
            Self::DOWN => Some(Self::Down),
            Self::LEFT => Some(Self::Left),
            Self::RIGHT => Some(Self::Right),
            Self::F1..=Self::F12 => u8::try_from(code - Self::F1 + 1).ok().map(Self::F),
            _ => u8::try_from(code).ok().map(Self::from_byte),
        }
    }

    /// The character, if this is a printable ASCII key.
    #[must_use]
    pub const fn as_char(self) -> Option<char> {
        match self {
            Self::Char(b) if b.is_ascii_graphic() || b == b' ' => Some(b as char),
            _ => None,
        }
    }
}

impl From<char> for KeyCode {
    /// Non-ASCII characters have no single-byte code and map to `Char(b'?')`.
    fn from(ch: char) -> Self {
        u8::try_from(ch).map_or(Self::Char(b'?'), Self::from_byte)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Char(b' ') => f.write_str("Space"),
            Self::Char(b) if b.is_ascii_graphic() => write!(f, "{}", b as char),
            Self::Char(b) => write!(f, "0x{b:02x}"),
            Self::F(n) => write!(f, "F{n}"),
            other => write!(f, "{other:?}"),
        }
    }
}

// ─── Grammar Tables ──────────────────────────────────────────────────────────

/// Final bytes of `ESC [ x`.
pub const CSI_FINALS: [(u8, KeyCode); 4] = [
    (b'A', KeyCode::Up),
    (b'B', KeyCode::Down),
    (b'C', KeyCode::Right),
    (b'D', KeyCode::Left),
];

/// Final bytes of `ESC O x`.
pub const SS3_FINALS: [(u8, KeyCode); 4] = [
    (b'P', KeyCode::F(1)),
    (b'Q', KeyCode::F(2)),
    (b'R', KeyCode::F(3)),
    (b'S', KeyCode::F(4)),
];

/// Parameters of `ESC [ n ~`.
pub const CSI_TILDE: [(u16, KeyCode); 8] = [
    (15, KeyCode::F(5)),
    (17, KeyCode::F(6)),
    (18, KeyCode::F(7)),
    (19, KeyCode::F(8)),
    (20, KeyCode::F(9)),
    (21, KeyCode::F(10)),
    (23, KeyCode::F(11)),
    (24, KeyCode::F(12)),
];

/// Console scan codes that follow a `0x00` / `0xE0` prefix.
pub const CONSOLE_SCAN_CODES: [(u8, KeyCode); 18] = [
    (72, KeyCode::Up),
    (80, KeyCode::Down),
    (75, KeyCode::Left),
    (77, KeyCode::Right),
    (59, KeyCode::F(1)),
    (60, KeyCode::F(2)),
    (61, KeyCode::F(3)),
    (62, KeyCode::F(4)),
    (63, KeyCode::F(5)),
    (64, KeyCode::F(6)),
    (65, KeyCode::F(7)),
    (66, KeyCode::F(8)),
    (67, KeyCode::F(9)),
    (68, KeyCode::F(10)),
    (133, KeyCode::F(11)),
    (85, KeyCode::F(11)),
    (134, KeyCode::F(12)),
    (86, KeyCode::F(12)),
];

fn lookup<K: PartialEq + Copy>(table: &[(K, KeyCode)], key: K) -> Option<KeyCode> {
    table.iter().find(|(k, _)| *k == key).map(|&(_, code)| code)
}

// ─── Escape Decoder ──────────────────────────────────────────────────────────

/// Decoder states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Nothing consumed yet.
    Ground,
    /// Seen `ESC`.
    Escape,
    /// Seen `ESC [`.
    Csi,
    /// Seen `ESC [` and one or more digits.
    CsiParam(u16),
    /// Seen `ESC O`.
    Ss3,
}

/// What the machine does with one byte.
enum Step {
    Next(State),
    Done(Option<KeyCode>),
}

fn step(state: State, byte: u8) -> Step {
    match state {
        State::Ground => match byte {
            ESC => Step::Next(State::Escape),
            // NUL shares its code with "no key".
            0 => Step::Done(None),
            b => Step::Done(Some(KeyCode::from_byte(b))),
        },
        State::Escape => match byte {
            b'[' => Step::Next(State::Csi),
            b'O' => Step::Next(State::Ss3),
            _ => Step::Done(None),
        },
        State::Csi => match byte {
            b'0'..=b'9' => Step::Next(State::CsiParam(u16::from(byte - b'0'))),
            b => Step::Done(lookup(&CSI_FINALS, b)),
        },
        State::CsiParam(n) => match byte {
            b'0'..=b'9' => {
                let n = n.saturating_mul(10).saturating_add(u16::from(byte - b'0'));
                Step::Next(State::CsiParam(n))
            }
            b'~' => Step::Done(lookup(&CSI_TILDE, n)),
            _ => Step::Done(None),
        },
        State::Ss3 => Step::Done(lookup(&SS3_FINALS, byte)),
    }
}

/// Decode the first key in `bytes`.
///
/// Returns `None` for an empty read, an unrecognized escape sequence, or a
/// sequence that ends before its final byte, including a lone `ESC`.
///
/// ```
/// use tc_term::input::{decode, KeyCode};
///
/// assert_eq!(decode(b"\x1b[A"), Some(KeyCode::Up));
/// assert_eq!(decode(b"a"), Some(KeyCode::Char(b'a')));
/// assert_eq!(decode(b"\x1b"), None);
/// assert_eq!(decode(b"\x1b["), None);
/// ```
#[must_use]
pub fn decode(bytes: &[u8]) -> Option<KeyCode> {
    let mut state = State::Ground;

    for &byte in bytes {
        match step(state, byte) {
            Step::Next(next) => state = next,
            Step::Done(key) => return key,
        }
    }

    // Input ran out mid-sequence. A bare ESC is indistinguishable from the
    // start of a sequence split across reads, so it is no key either.
    None
}

/// Decode a console key from its first `_getch` value.
///
/// For a `0x00` / `0xE0` prefix, `scan_code` is called once to read the
/// second byte, which is looked up in [`CONSOLE_SCAN_CODES`].
pub fn decode_console(first: u8, scan_code: impl FnOnce() -> u8) -> Option<KeyCode> {
    match first {
        0x00 | 0xE0 => lookup(&CONSOLE_SCAN_CODES, scan_code()),
        b => Some(KeyCode::from_byte(b)),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
