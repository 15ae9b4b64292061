// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Two kinds of output live here. Screen control (cursor visibility, clearing)
// is a set of pure functions writing to any `impl Write`. Chat coloring is a
// prefix/suffix pair built per message: the prefix selects a foreground color
// in the dialect of the active `ColorMode`, the suffix resets it. Colors never
// nest, so one reset always closes exactly one prefix.
//
// All functions return `io::Result` propagated from the underlying writer.
use std::io::{self, Write};

use crate::color::{ColorMode, Rgb};

/// SGR 0: reset every attribute.
pub const RESET: &str = "\x1b[0m";

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to the top-left corner (CUP with no arguments).
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

/// Reset all SGR attributes to terminal defaults (SGR 0).
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(RESET.as_bytes())
}

// ─── Foreground Color ────────────────────────────────────────────────────────

/// The escape sequence that switches the foreground to `rgb`.
///
/// Empty for [`ColorMode::None`] and [`ColorMode::Mono`]. Otherwise:
///
/// | Mode        | Sequence              |
/// |-------------|-----------------------|
/// | `Ansi8`     | `ESC[30m`…`ESC[37m`   |
/// | `Ansi16`    | `ESC[30m`…`ESC[97m`   |
/// | `Ansi256`   | `ESC[38;5;<n>m`       |
/// | `TrueColor` | `ESC[38;2;<r>;<g>;<b>m` |
///
/// ```
/// use lurk_term::ansi::color_prefix;
/// use lurk_term::color::{ColorMode, Rgb};
///
/// let red = Rgb::new(255, 0, 0);
/// assert_eq!(color_prefix(ColorMode::TrueColor, red), "\x1b[38;2;255;0;0m");
/// assert_eq!(color_prefix(ColorMode::Ansi8, red), "\x1b[31m");
/// assert_eq!(color_prefix(ColorMode::Mono, red), "");
/// ```
#[must_use]
pub fn color_prefix(mode: ColorMode, rgb: Rgb) -> String {
    match mode {
        ColorMode::None | ColorMode::Mono => String::new(),
        ColorMode::Ansi8 => format!("\x1b[{}m", rgb.to_ansi8()),
        ColorMode::Ansi16 => format!("\x1b[{}m", rgb.to_ansi16()),
        ColorMode::Ansi256 => format!("\x1b[38;5;{}m", rgb.to_ansi256()),
        ColorMode::TrueColor => {
            let (r, g, b) = rgb.to_true_color();
            format!("\x1b[38;2;{r};{g};{b}m")
        }
    }
}

/// The escape sequence that closes a [`color_prefix`].
///
/// Empty exactly when the prefix is empty, [`RESET`] otherwise.
#[must_use]
pub const fn color_suffix(mode: ColorMode) -> &'static str {
    if mode.is_colored() { RESET } else { "" }
}

/// A matched prefix/suffix pair for one color.
///
/// Build once per message and reuse for header and body. Wrapping text in a
/// pair never changes its visible width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorPair {
    prefix: String,
    suffix: &'static str,
}

impl ColorPair {
    /// Build the pair for `rgb` in `mode`.
    #[must_use]
    pub fn new(mode: ColorMode, rgb: Rgb) -> Self {
        Self {
            prefix: color_prefix(mode, rgb),
            suffix: color_suffix(mode),
        }
    }

    /// A pair that emits nothing.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            prefix: String::new(),
            suffix: "",
        }
    }

    /// The opening escape.
    #[inline]
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The closing escape.
    #[inline]
    #[must_use]
    pub const fn suffix(&self) -> &'static str {
        self.suffix
    }

    /// Write `text` wrapped in this pair.
    ///
    /// # Errors
    ///
    /// Propagates write errors from `w`.
    pub fn paint(&self, w: &mut impl Write, text: &str) -> io::Result<()> {
        w.write_all(self.prefix.as_bytes())?;
        w.write_all(text.as_bytes())?;
        w.write_all(self.suffix.as_bytes())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
