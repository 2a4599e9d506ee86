// SPDX-License-Identifier: MIT
//
// tc-term color model: 8-bit RGBA values approximated to 8 terminal colors.
//
// Applications describe colors in full 24-bit RGB (with an advisory alpha
// channel), but the engine only promises the eight classic terminal colors
// plus a "bright" variant. Every color that reaches the terminal goes
// through `map_color` (nearest base color by squared RGB distance) and
// `is_bright` (any channel above 128).
//
// Equality is RGB-only. Alpha never participates in comparisons, which is
// what lets the diff renderer treat two cells as identical even when their
// colors were built with different alpha values.
//
// One value is reserved: `BLANK` (1, 0, 0, 0) means "whatever the current
// background is". Drawing code resolves it at draw time; it never reaches
// the terminal.

use std::fmt;

// ─── Color ───────────────────────────────────────────────────────────────────

/// An RGBA color. Alpha is carried along but otherwise ignored.
///
/// # Examples
///
/// ```
/// use tc_term::color::{self, Color};
///
/// let a = Color::rgba(10, 20, 30, 255);
/// let b = Color::rgba(10, 20, 30, 0);
/// assert_eq!(a, b); // alpha does not participate
/// assert_ne!(a, color::BLACK);
/// ```
#[derive(Clone, Copy)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel. Advisory only.
    pub a: u8,
}

impl Color {
    /// An opaque color.
    #[inline]
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// A color with an explicit alpha value.
    #[inline]
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Whether this is the reserved "use the current background" value.
    #[inline]
    #[must_use]
    pub const fn is_blank(self) -> bool {
        self.r == BLANK.r && self.g == BLANK.g && self.b == BLANK.b
    }

    /// Resolve [`BLANK`] to `background`; any other color is returned as is.
    #[inline]
    #[must_use]
    pub const fn or_background(self, background: Self) -> Self {
        if self.is_blank() { background } else { self }
    }

    /// The nearest of the eight terminal base colors.
    #[inline]
    #[must_use]
    pub fn base(self) -> BaseColor {
        map_color(self)
    }

    /// Squared Euclidean distance between two colors in RGB space.
    #[must_use]
    pub fn distance_sq(self, other: Self) -> u32 {
        let dr = i32::from(self.r) - i32::from(other.r);
        let dg = i32::from(self.g) - i32::from(other.g);
        let db = i32::from(self.b) - i32::from(other.b);
        // Each term is at most 255², the sum fits comfortably in u32.
        #[allow(clippy::cast_sign_loss)]
        let d = (dr * dr + dg * dg + db * db) as u32;
        d
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.r == other.r && self.g == other.g && self.b == other.b
    }
}

impl Eq for Color {}

impl Default for Color {
    fn default() -> Self {
        BLACK
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

// ─── Named Colors ────────────────────────────────────────────────────────────

/// Reserved: "use the current background color".
pub const BLANK: Color = Color::rgba(1, 0, 0, 0);
pub const RAYWHITE: Color = Color::rgb(245, 245, 245);
pub const TREADGRAY: Color = Color::rgb(30, 30, 30);
pub const LIGHTGRAY: Color = Color::rgb(200, 200, 200);
pub const GRAY: Color = Color::rgb(130, 130, 130);
pub const DARKGRAY: Color = Color::rgb(80, 80, 80);
pub const YELLOW: Color = Color::rgb(253, 249, 0);
pub const GOLD: Color = Color::rgb(255, 203, 0);
pub const ORANGE: Color = Color::rgb(255, 161, 0);
pub const PINK: Color = Color::rgb(255, 109, 194);
pub const RED: Color = Color::rgb(230, 41, 55);
pub const MAROON: Color = Color::rgb(190, 33, 55);
pub const GREEN: Color = Color::rgb(0, 200, 0);
pub const LIME: Color = Color::rgb(0, 255, 0);
pub const DARKGREEN: Color = Color::rgb(0, 82, 17);
pub const SKYBLUE: Color = Color::rgb(102, 191, 255);
pub const BLUE: Color = Color::rgb(0, 121, 241);
pub const DARKBLUE: Color = Color::rgb(0, 82, 172);
pub const PURPLE: Color = Color::rgb(200, 122, 255);
pub const VIOLET: Color = Color::rgb(135, 60, 190);
pub const DARKPURPLE: Color = Color::rgb(112, 31, 126);
pub const BEIGE: Color = Color::rgb(211, 176, 131);
pub const BROWN: Color = Color::rgb(127, 106, 79);
pub const DARKBROWN: Color = Color::rgb(76, 63, 47);
pub const WHITE: Color = Color::rgb(255, 255, 255);
pub const BLACK: Color = Color::rgb(0, 0, 0);
pub const MAGENTA: Color = Color::rgb(255, 0, 255);
pub const CYAN: Color = Color::rgb(0, 255, 255);

// ─── Base Colors ─────────────────────────────────────────────────────────────

/// The eight colors every terminal can show.
///
/// The discriminant is the standard terminal index: `30 + i` selects the
/// foreground in ANSI, and bits 0/1/2 are red/green/blue on the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BaseColor {
    Black = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Magenta = 5,
    Cyan = 6,
    White = 7,
}

impl BaseColor {
    /// All base colors in matching order. Ties resolve to the earlier entry.
    pub const ALL: [Self; 8] = [
        Self::Black,
        Self::Red,
        Self::Green,
        Self::Yellow,
        Self::Blue,
        Self::Magenta,
        Self::Cyan,
        Self::White,
    ];

    /// Terminal color index, 0–7.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Reference RGB value used for nearest-color matching.
    #[must_use]
    pub const fn reference(self) -> Color {
        match self {
            Self::Black => Color::rgb(0, 0, 0),
            Self::Red => Color::rgb(255, 0, 0),
            Self::Green => Color::rgb(0, 255, 0),
            Self::Yellow => Color::rgb(255, 255, 0),
            Self::Blue => Color::rgb(0, 0, 255),
            Self::Magenta => Color::rgb(255, 0, 255),
            Self::Cyan => Color::rgb(0, 255, 255),
            Self::White => Color::rgb(255, 255, 255),
        }
    }
}

/// Map a color to the nearest base color by squared RGB distance.
///
/// Deterministic; ties go to the first match in [`BaseColor::ALL`] order.
///
/// ```
/// use tc_term::color::{self, map_color, BaseColor};
///
/// assert_eq!(map_color(color::BLACK), BaseColor::Black);
/// assert_eq!(map_color(color::WHITE), BaseColor::White);
/// assert_eq!(map_color(color::RED), BaseColor::Red);
/// ```
#[must_use]
pub fn map_color(color: Color) -> BaseColor {
    let mut best = BaseColor::Black;
    let mut best_dist = u32::MAX;

    for base in BaseColor::ALL {
        let dist = color.distance_sq(base.reference());
        if dist < best_dist {
            best_dist = dist;
            best = base;
        }
    }

    best
}

/// Whether the bright/intense variant should be requested for `color`.
#[inline]
#[must_use]
pub const fn is_bright(color: Color) -> bool {
    color.r > 128 || color.g > 128 || color.b > 128
}

/// A color as the terminal will actually show it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TermColor {
    /// Nearest base color.
    pub base: BaseColor,
    /// Whether the bright variant is requested.
    pub bright: bool,
}

impl From<Color> for TermColor {
    fn from(color: Color) -> Self {
        Self {
            base: map_color(color),
            bright: is_bright(color),
        }
    }
}

impl TermColor {
    /// SGR parameter for this color as a foreground (30–37, 90–97).
    #[inline]
    #[must_use]
    pub const fn sgr_fg(self) -> u8 {
        30 + self.base.index() + if self.bright { 60 } else { 0 }
    }

    /// SGR parameter for this color as a background (40–47, 100–107).
    #[inline]
    #[must_use]
    pub const fn sgr_bg(self) -> u8 {
        40 + self.base.index() + if self.bright { 60 } else { 0 }
    }
}

// ─── Console Attributes ──────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Windows console character attributes.
    ///
    /// Values match `FOREGROUND_*` / `BACKGROUND_*` from `wincon.h`. Kept
    /// platform-independent so the mapping can be tested anywhere.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct ConsoleAttr: u16 {
        const FOREGROUND_BLUE      = 0x0001;
        const FOREGROUND_GREEN     = 0x0002;
        const FOREGROUND_RED       = 0x0004;
        const FOREGROUND_INTENSITY = 0x0008;
        const BACKGROUND_BLUE      = 0x0010;
        const BACKGROUND_GREEN     = 0x0020;
        const BACKGROUND_RED       = 0x0040;
        const BACKGROUND_INTENSITY = 0x0080;
    }
}

impl ConsoleAttr {
    /// Console attribute word for a foreground/background pair.
    #[must_use]
    pub fn from_colors(fg: Color, bg: Color) -> Self {
        let fg = TermColor::from(fg);
        let bg = TermColor::from(bg);
        let mut attr = Self::empty();

        let f = fg.base.index();
        attr.set(Self::FOREGROUND_RED, f & 0x1 != 0);
        attr.set(Self::FOREGROUND_GREEN, f & 0x2 != 0);
        attr.set(Self::FOREGROUND_BLUE, f & 0x4 != 0);
        attr.set(Self::FOREGROUND_INTENSITY, fg.bright);

        let b = bg.base.index();
        attr.set(Self::BACKGROUND_RED, b & 0x1 != 0);
        attr.set(Self::BACKGROUND_GREEN, b & 0x2 != 0);
        attr.set(Self::BACKGROUND_BLUE, b & 0x4 != 0);
        attr.set(Self::BACKGROUND_INTENSITY, bg.bright);

        attr
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
