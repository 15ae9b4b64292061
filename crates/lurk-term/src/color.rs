// SPDX-License-Identifier: MIT
//
// lurk-term color system: chat colors and terminal color modes.
//
// Chat servers hand us a `#RRGGBB` string per user. Terminals speak one of
// five color dialects, from nothing at all up to 24-bit RGB. This module
// owns both ends: parsing the hex tag into an [`Rgb`] and downsampling that
// value into whatever palette the terminal can show.
//
// Downsampling pipeline:
//
//   "#RRGGBB" → Rgb → TrueColor (identity)
//                   → Ansi256   (linear cube index)
//                   → Ansi16    (channel threshold heuristic)
//                   → Ansi8     (Ansi16 with bright codes folded down)
//
// The 16- and 256-color mappings are cheap approximations, not
// nearest-color searches.

// Single-character variable names (r, g, b) are the standard convention
// for color channels.
#![allow(clippy::many_single_char_names)]

use std::fmt;
use std::str::FromStr;

// ─── Rgb ─────────────────────────────────────────────────────────────────────

/// An 8-bit sRGB color, as carried by a chat `color` tag.
///
/// Channels are `u8`, so every value is in range by construction and none of
/// the conversions below can fail.
///
/// # Examples
///
/// ```
/// use lurk_term::color::Rgb;
///
/// let red = Rgb::from_hex("#FF0000").unwrap();
/// assert_eq!(red, Rgb::new(255, 0, 0));
/// assert_eq!(red.to_ansi16(), 91);
/// assert_eq!(red.to_ansi8(), 31);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Pure white, the color used when a user has none set.
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Pure black. Also what a malformed hex string decodes to.
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// Create a color from its three channels.
    #[inline]
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` or `RRGGBB` (hex digits in either case).
    ///
    /// Returns `None` for anything else: wrong length, stray characters, or
    /// an empty string.
    #[must_use]
    pub fn from_hex(s: &str) -> Option<Self> {
        parse_hex(s)
    }

    // ─── Downsampling ────────────────────────────────────────────────────

    /// Which primary channels dominate, per the 16-color heuristic.
    ///
    /// A channel counts when it is above the low threshold and neither of
    /// the other two channels is saturated. Strong mixes (white, yellow,
    /// pale colors) therefore set no bits at all.
    #[must_use]
    pub const fn dominant_channels(self) -> Channels {
        let mut bits = Channels::empty();
        if self.r > CHANNEL_LOW && self.g < CHANNEL_CAP && self.b < CHANNEL_CAP {
            bits = bits.union(Channels::RED);
        }
        if self.g > CHANNEL_LOW && self.r < CHANNEL_CAP && self.b < CHANNEL_CAP {
            bits = bits.union(Channels::GREEN);
        }
        if self.b > CHANNEL_LOW && self.r < CHANNEL_CAP && self.g < CHANNEL_CAP {
            bits = bits.union(Channels::BLUE);
        }
        bits
    }

    /// Whether any channel is bright enough to select the 90–97 range.
    #[inline]
    #[must_use]
    pub const fn is_bright(self) -> bool {
        self.r > BRIGHT_THRESHOLD || self.g > BRIGHT_THRESHOLD || self.b > BRIGHT_THRESHOLD
    }

    /// SGR foreground code in the 16-color range (30–37 or 90–97).
    ///
    /// This is a threshold heuristic, not a closest-match search: white maps
    /// to 90 (bright black) because no single channel dominates.
    #[must_use]
    pub const fn to_ansi16(self) -> u8 {
        let base = if self.is_bright() { 90 } else { 30 };
        base + self.dominant_channels().bits()
    }

    /// SGR foreground code restricted to the 8 normal colors (30–37).
    #[must_use]
    pub const fn to_ansi8(self) -> u8 {
        let code = self.to_ansi16();
        if code >= 90 { code - 60 } else { code }
    }

    /// Index into the 256-color palette.
    ///
    /// Linear scaling `round(r/255·36 + g/255·6 + b/255) + 16`. This lands
    /// somewhere in the 6×6×6 cube but is not an exact palette lookup; the
    /// result never exceeds 59.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_ansi256(self) -> u8 {
        let r = f32::from(self.r) / 255.0;
        let g = f32::from(self.g) / 255.0;
        let b = f32::from(self.b) / 255.0;
        // Bounded to 0.0..=43.0, so the cast cannot truncate.
        let idx = r.mul_add(36.0, g.mul_add(6.0, b)).round() as u8;
        idx + 16
    }

    /// Channels for 24-bit output. True color passes them through untouched.
    #[inline]
    #[must_use]
    pub const fn to_true_color(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}

impl fmt::Debug for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rgb({}, {}, {})", self.r, self.g, self.b)
    }
}


/// Decode a hex color, yielding black for malformed input.
///
/// Callers that need to tell "absent" from "black" should use
/// [`Rgb::from_hex`] instead.
#[must_use]
pub fn hex_to_rgb(s: &str) -> Rgb {
    parse_hex(s).unwrap_or(Rgb::BLACK)
}

// ─── Channels ────────────────────────────────────────────────────────────────

/// Above this a channel may count as dominant.
const CHANNEL_LOW: u8 = 64;

/// At or above this a channel disqualifies the other two from dominating.
const CHANNEL_CAP: u8 = 196;

/// Above this any channel selects the bright half of the 16-color palette.
const BRIGHT_THRESHOLD: u8 = 128;

bitflags::bitflags! {
    /// Primary channels, laid out the way ANSI numbers its colors.
    ///
    /// Red is bit 0, green bit 1, blue bit 2, so adding the bits to 30 (or
    /// 90) gives the SGR code directly: red + green = yellow = 33.
    ///
    /// ```
    /// use lurk_term::color::Channels;
    ///
    /// let yellow = Channels::RED | Channels::GREEN;
    /// assert_eq!(30 + yellow.bits(), 33);
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Channels: u8 {
        /// SGR color bit 0.
        const RED   = 1 << 0;
        /// SGR color bit 1.
        const GREEN = 1 << 1;
        /// SGR color bit 2.
        const BLUE  = 1 << 2;
    }
}

// ─── ColorMode ───────────────────────────────────────────────────────────────

/// How many colors the terminal can display, and thus which SGR family we
/// emit.
///
/// Chosen once at startup and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorMode {
    /// Color output disabled outright.
    None,
    /// Monochrome terminal. Emits no escapes, same as [`ColorMode::None`].
    #[default]
    Mono,
    /// 8 colors, SGR 30–37.
    Ansi8,
    /// 16 colors, SGR 30–37 and 90–97.
    Ansi16,
    /// 256-color palette, `38;5;n`.
    Ansi256,
    /// 24-bit RGB, `38;2;r;g;b`.
    TrueColor,
}

impl ColorMode {
    /// Every mode a user can name on the command line, most capable first.
    pub const NAMED: [Self; 5] = [
        Self::TrueColor,
        Self::Ansi256,
        Self::Ansi16,
        Self::Ansi8,
        Self::Mono,
    ];

    /// Look up a mode by its command-line name.
    ///
    /// | Name   | Mode                      |
    /// |--------|---------------------------|
    /// | `true` | [`ColorMode::TrueColor`]  |
    /// | `8bit` | [`ColorMode::Ansi256`]    |
    /// | `4bit` | [`ColorMode::Ansi16`]     |
    /// | `2bit` | [`ColorMode::Ansi8`]      |
    /// | `mono` | [`ColorMode::Mono`]       |
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "true" => Some(Self::TrueColor),
            "8bit" => Some(Self::Ansi256),
            "4bit" => Some(Self::Ansi16),
            "2bit" => Some(Self::Ansi8),
            "mono" => Some(Self::Mono),
            _ => None,
        }
    }

    /// The command-line name of this mode.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Mono => "mono",
            Self::Ansi8 => "2bit",
            Self::Ansi16 => "4bit",
            Self::Ansi256 => "8bit",
            Self::TrueColor => "true",
        }
    }

    /// Whether this mode emits any escape sequences at all.
    #[inline]
    #[must_use]
    pub const fn is_colored(self) -> bool {
        !matches!(self, Self::None | Self::Mono)
    }

    /// Guess the best mode from the terminal environment.
    ///
    /// Anything not recognizably colorful is [`ColorMode::Mono`], and so is
    /// output that isn't a terminal. `TERM` suffixes are checked first;
    /// `COLORTERM` is only consulted when none of them match.
    ///
    /// | Checked in order                    | Mode        |
    /// |-------------------------------------|-------------|
    /// | `TERM` ends `-m` or contains `-m-`  | `Mono`      |
    /// | `TERM` contains `-8c`               | `Ansi8`     |
    /// | `TERM` contains `-16c`              | `Ansi16`    |
    /// | `TERM` contains `-256`              | `Ansi256`   |
    /// | `COLORTERM` `truecolor` / `24bit`   | `TrueColor` |
    #[must_use]
    pub fn detect(is_tty: bool, term: Option<&str>, colorterm: Option<&str>) -> Self {
        if !is_tty {
            return Self::Mono;
        }

        if let Some(term) = term {
            if term.ends_with("-m") || term.contains("-m-") {
                return Self::Mono;
            } else if term.contains("-8c") {
                return Self::Ansi8;
            } else if term.contains("-16c") {
                return Self::Ansi16;
            } else if term.contains("-256") {
                return Self::Ansi256;
            }
        }

        match colorterm {
            Some(cterm) if cterm.contains("truecolor") || cterm.contains("24bit") => {
                Self::TrueColor
            }
            _ => Self::Mono,
        }
    }

    /// [`detect`](Self::detect) using stdout's TTY status and the real
    /// `TERM` / `COLORTERM` variables.
    #[must_use]
    pub fn detect_from_env() -> Self {
        let term = std::env::var("TERM").ok();
        let colorterm = std::env::var("COLORTERM").ok();
        let mode = Self::detect(
            crate::terminal::is_tty(),
            term.as_deref(),
            colorterm.as_deref(),
        );
        tracing::debug!(?term, ?colorterm, mode = mode.name(), "detected color mode");
        mode
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A color mode name that [`ColorMode::from_name`] does not know.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown color mode '{0}' (expected one of: true, 8bit, 4bit, 2bit, mono)")]
pub struct UnknownColorMode(pub String);

impl FromStr for ColorMode {
    type Err = UnknownColorMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownColorMode(s.to_owned()))
    }
}

// ─── Hex Parsing ─────────────────────────────────────────────────────────────

fn parse_hex(s: &str) -> Option<Rgb> {
    let s = s.strip_prefix('#').unwrap_or(s);
    let bytes = s.as_bytes();

    if bytes.len() != 6 {
        return None;
    }

    let r = parse_hex_byte(&bytes[0..2])?;
    let g = parse_hex_byte(&bytes[2..4])?;
    let b = parse_hex_byte(&bytes[4..6])?;
    Some(Rgb::new(r, g, b))
}

#[inline]
const fn parse_hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

#[inline]
fn parse_hex_byte(bytes: &[u8]) -> Option<u8> {
    let hi = parse_hex_digit(bytes[0])?;
    let lo = parse_hex_digit(bytes[1])?;
    Some(hi << 4 | lo)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Hex parsing ──────────────────────────────────────────────────────

    #[test]
    fn hex_white_with_hash() {
        assert_eq!(hex_to_rgb("#FFFFFF"), Rgb::new(255, 255, 255));
    }

    #[test]
    fn hex_black_without_hash() {
        assert_eq!(hex_to_rgb("000000"), Rgb::new(0, 0, 0));
    }

    #[test]
    fn hex_is_case_insensitive() {
        assert_eq!(Rgb::from_hex("#1e90ff"), Rgb::from_hex("#1E90FF"));
        assert_eq!(Rgb::from_hex("#1e90Ff"), Some(Rgb::new(30, 144, 255)));
    }

    #[test]
    fn hex_rejects_wrong_length() {
        assert_eq!(Rgb::from_hex("#FFF"), None);
        assert_eq!(Rgb::from_hex("#FFFFFFF"), None);
        assert_eq!(Rgb::from_hex(""), None);
        assert_eq!(Rgb::from_hex("#"), None);
    }

    #[test]
    fn hex_rejects_non_hex() {
        assert_eq!(Rgb::from_hex("#GG0000"), None);
        assert_eq!(Rgb::from_hex("#00 000"), None);
    }

    #[test]
    fn hex_rejects_multibyte_without_panicking() {
        // Six bytes, but not six ASCII digits.
        assert_eq!(Rgb::from_hex("ééé"), None);
    }

    #[test]
    fn malformed_hex_decodes_to_black() {
        assert_eq!(hex_to_rgb("not a color"), Rgb::BLACK);
    }

    // ── 16 / 8 color ─────────────────────────────────────────────────────

    #[test]
    fn ansi16_primaries() {
        assert_eq!(Rgb::new(255, 0, 0).to_ansi16(), 91);
        assert_eq!(Rgb::new(0, 255, 0).to_ansi16(), 92);
        assert_eq!(Rgb::new(0, 0, 255).to_ansi16(), 94);
    }

    #[test]
    fn ansi16_dark_colors_stay_normal() {
        assert_eq!(Rgb::new(0, 128, 0).to_ansi16(), 32);
        assert_eq!(Rgb::new(100, 0, 100).to_ansi16(), 35);
        assert_eq!(Rgb::BLACK.to_ansi16(), 30);
    }

    #[test]
    fn ansi16_white_has_no_dominant_channel() {
        assert_eq!(Rgb::WHITE.dominant_channels(), Channels::empty());
        assert_eq!(Rgb::WHITE.to_ansi16(), 90);
    }

    #[test]
    fn ansi16_twitch_palette_samples() {
        assert_eq!(hex_to_rgb("#1E90FF").to_ansi16(), 94); // DodgerBlue
        assert_eq!(hex_to_rgb("#FF7F50").to_ansi16(), 91); // Coral
        assert_eq!(hex_to_rgb("#2E8B57").to_ansi16(), 96); // SeaGreen
        assert_eq!(hex_to_rgb("#8A2BE2").to_ansi16(), 94); // BlueViolet
        assert_eq!(hex_to_rgb("#DAA520").to_ansi16(), 91); // GoldenRod
    }

    #[test]
    fn ansi16_always_in_range() {
        for r in (0..=255u8).step_by(17) {
            for g in (0..=255u8).step_by(17) {
                for b in (0..=255u8).step_by(17) {
                    let code = Rgb::new(r, g, b).to_ansi16();
                    assert!(
                        (30..=37).contains(&code) || (90..=97).contains(&code),
                        "({r}, {g}, {b}) → {code}"
                    );
                }
            }
        }
    }

    #[test]
    fn ansi8_always_in_normal_range() {
        for r in (0..=255u8).step_by(15) {
            for g in (0..=255u8).step_by(15) {
                for b in (0..=255u8).step_by(15) {
                    let code = Rgb::new(r, g, b).to_ansi8();
                    assert!((30..=37).contains(&code), "({r}, {g}, {b}) → {code}");
                }
            }
        }
    }

    #[test]
    fn ansi8_folds_bright_codes() {
        assert_eq!(Rgb::new(255, 0, 0).to_ansi8(), 31);
        assert_eq!(Rgb::new(0, 128, 0).to_ansi8(), 32);
    }

    // ── 256 color ────────────────────────────────────────────────────────

    #[test]
    fn ansi256_extremes() {
        assert_eq!(Rgb::BLACK.to_ansi256(), 16);
        assert_eq!(Rgb::WHITE.to_ansi256(), 59);
    }

    #[test]
    fn ansi256_rounds_linear_sum() {
        // 36·200/255 + 6·100/255 + 50/255 = 30.78…
        assert_eq!(Rgb::new(200, 100, 50).to_ansi256(), 47);
        assert_eq!(Rgb::new(255, 0, 0).to_ansi256(), 52);
        assert_eq!(Rgb::new(0, 0, 255).to_ansi256(), 17);
    }

    #[test]
    fn true_color_is_identity() {
        assert_eq!(Rgb::new(1, 2, 3).to_true_color(), (1, 2, 3));
    }

    // ── ColorMode ────────────────────────────────────────────────────────

    #[test]
    fn mode_names_roundtrip() {
        for mode in ColorMode::NAMED {
            assert_eq!(ColorMode::from_name(mode.name()), Some(mode));
        }
    }

    #[test]
    fn mode_from_str_rejects_unknown() {
        let err = "16bit".parse::<ColorMode>().unwrap_err();
        assert_eq!(err, UnknownColorMode("16bit".into()));
        assert!(err.to_string().contains("16bit"));
    }

    #[test]
    fn only_real_palettes_are_colored() {
        assert!(!ColorMode::None.is_colored());
        assert!(!ColorMode::Mono.is_colored());
        assert!(ColorMode::Ansi8.is_colored());
        assert!(ColorMode::TrueColor.is_colored());
    }

    #[test]
    fn detect_not_a_tty_is_mono() {
        let mode = ColorMode::detect(false, Some("xterm-256color"), Some("truecolor"));
        assert_eq!(mode, ColorMode::Mono);
    }

    #[test]
    fn detect_colorterm_truecolor() {
        assert_eq!(
            ColorMode::detect(true, Some("xterm"), Some("truecolor")),
            ColorMode::TrueColor
        );
        assert_eq!(ColorMode::detect(true, None, Some("24bit")), ColorMode::TrueColor);
        assert_eq!(ColorMode::detect(true, Some("xterm"), Some("yes")), ColorMode::Mono);
    }

    #[test]
    fn detect_term_suffix_beats_colorterm() {
        assert_eq!(
            ColorMode::detect(true, Some("xterm-256color"), Some("truecolor")),
            ColorMode::Ansi256
        );
        assert_eq!(
            ColorMode::detect(true, Some("vt100-m"), Some("24bit")),
            ColorMode::Mono
        );
    }

    #[test]
    fn detect_term_suffixes() {
        assert_eq!(ColorMode::detect(true, Some("xterm-256color"), None), ColorMode::Ansi256);
        assert_eq!(ColorMode::detect(true, Some("rxvt-16color"), None), ColorMode::Ansi16);
        assert_eq!(ColorMode::detect(true, Some("xterm-8color"), None), ColorMode::Ansi8);
        assert_eq!(ColorMode::detect(true, Some("vt100-m"), None), ColorMode::Mono);
        assert_eq!(ColorMode::detect(true, Some("xterm-m-old"), None), ColorMode::Mono);
    }

    #[test]
    fn detect_unknown_term_is_mono() {
        assert_eq!(ColorMode::detect(true, Some("dumb"), None), ColorMode::Mono);
        assert_eq!(ColorMode::detect(true, None, None), ColorMode::Mono);
    }
}
