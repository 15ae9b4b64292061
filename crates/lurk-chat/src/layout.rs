//! Line layout: headers, word wrapping and continuation padding.
//!
//! A rendered message is a **header** followed by a **body**:
//!
//! ```text
//! [12:34:56]                       @SomeModerator: this is the first line of
//!                                                  the message, wrapped and
//!                                                  aligned under its text
//! ```
//!
//! The header is the timestamp, a space, the badge and name right-aligned in a
//! fixed [`NAME_FIELD_WIDTH`] field, and a two-byte separator. When the whole
//! header would not fit on the terminal, the field collapses to the name's own
//! length and the body is written on one unwrapped line instead of producing
//! negative widths.
//!
//! Widths are byte counts. Color escapes are never counted.
//!
//! # Wrapping
//!
//! The body is split into space-separated [`words`]. A [`LineFiller`] decides
//! where each word goes:
//!
//! | Situation                               | [`Placement`]           |
//! |-----------------------------------------|-------------------------|
//! | first word, fits                        | `First`                 |
//! | fits after a separating space           | `Append`                |
//! | longer than a whole line                | `Oversized` (no split)  |
//! | otherwise                               | `Break` → newline + pad |
//!
//! An oversized word is written as-is on the current line, overflowing the
//! terminal, and the line counts as full afterwards.

use std::io::{self, Write};

use lurk_term::ansi::ColorPair;

/// Longest login or display name that still fits the aligned name field.
pub const NAME_MAX_LEN: usize = 25;

/// Width of the badge column (`@`, `+`, or nothing).
pub const BADGE_WIDTH: usize = 1;

/// Width of the aligned badge + name field.
pub const NAME_FIELD_WIDTH: usize = BADGE_WIDTH + NAME_MAX_LEN;

/// Width of `": "` and `"  "`.
pub const SEPARATOR_WIDTH: usize = 2;

// ---------------------------------------------------------------------------
// Budget
// ---------------------------------------------------------------------------

/// Horizontal space arithmetic for one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutBudget {
    /// Width of a fully aligned header.
    pub header_len: usize,
    /// Width the name field is padded to: [`NAME_FIELD_WIDTH`], or 0 when
    /// the aligned header does not fit.
    pub name_width: usize,
    /// Terminal width, 0 when unknown.
    pub term_width: usize,
}

impl LayoutBudget {
    /// Budget for a header with a `timestamp_len`-byte timestamp on a
    /// terminal `term_width` columns wide (`None` when unknown).
    #[must_use]
    pub const fn new(timestamp_len: usize, term_width: Option<usize>) -> Self {
        let spacer = if timestamp_len > 0 { 1 } else { 0 };
        let header_len = timestamp_len + spacer + NAME_FIELD_WIDTH + SEPARATOR_WIDTH;
        let term_width = match term_width {
            Some(w) => w,
            None => 0,
        };
        let name_width = if header_len > term_width {
            0
        } else {
            NAME_FIELD_WIDTH
        };
        Self {
            header_len,
            name_width,
            term_width,
        }
    }

    /// Budget that never pads and never wraps.
    #[must_use]
    pub const fn unaligned(timestamp_len: usize) -> Self {
        Self::new(timestamp_len, None)
    }

    /// Whether the aligned header fits the terminal.
    #[inline]
    #[must_use]
    pub const fn is_aligned(&self) -> bool {
        self.name_width > 0
    }

    /// Usable body width per line once `pad` columns are taken by the header
    /// or continuation padding. `None` means "write the body unwrapped".
    #[must_use]
    pub const fn wrap(&self, pad: usize) -> Option<Wrap> {
        if self.is_aligned() && pad < self.term_width {
            Some(Wrap {
                width: self.term_width - pad,
                pad,
            })
        } else {
            None
        }
    }
}

/// Wrapping geometry for a body: `width` bytes per line, continuation lines
/// indented by `pad` spaces. `pad + width` equals the terminal width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wrap {
    /// Usable bytes per line.
    pub width: usize,
    /// Indentation of continuation lines.
    pub pad: usize,
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Header separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    /// `": "` after a normal message's name.
    Colon,
    /// `"  "` after an action's name.
    Action,
}

impl Separator {
    /// The separator text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Colon => ": ",
            Self::Action => "  ",
        }
    }
}

/// The visible pieces of a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header<'a> {
    /// Rendered timestamp, possibly empty.
    pub timestamp: &'a str,
    /// Badge marker, possibly empty.
    pub badge: &'a str,
    /// Name to show.
    pub name: &'a str,
    /// Separator after the name.
    pub separator: Separator,
}

/// Write a header and return its visible width.
///
/// With an aligned budget the badge + name are truncated to
/// [`NAME_FIELD_WIDTH`] bytes and right-aligned in that field; otherwise they
/// are written at their natural length. Only the badge + name are colored.
///
/// # Errors
///
/// Propagates write errors from `w`.
pub fn write_header(
    w: &mut impl Write,
    header: &Header<'_>,
    colors: &ColorPair,
    budget: &LayoutBudget,
) -> io::Result<usize> {
    let mut width = 0;

    if !header.timestamp.is_empty() {
        w.write_all(header.timestamp.as_bytes())?;
        w.write_all(b" ")?;
        width += header.timestamp.len() + 1;
    }

    let mut field = String::with_capacity(header.badge.len() + header.name.len());
    field.push_str(header.badge);
    field.push_str(header.name);

    if budget.is_aligned() {
        truncate_on_char_boundary(&mut field, budget.name_width);
        let fill = budget.name_width - field.len();
        field.insert_str(0, &" ".repeat(fill));
    }
    colors.paint(w, &field)?;
    width += field.len();

    let separator = header.separator.as_str();
    w.write_all(separator.as_bytes())?;
    width += separator.len();

    Ok(width)
}

// ---------------------------------------------------------------------------
// Body
// ---------------------------------------------------------------------------

/// Write a body wrapped in `colors`, followed by a newline.
///
/// With `wrap == None` the text is written verbatim on one line. Otherwise it
/// is re-flowed word by word, which collapses runs of spaces.
///
/// # Errors
///
/// Propagates write errors from `w`.
pub fn write_body(
    w: &mut impl Write,
    text: &str,
    colors: &ColorPair,
    wrap: Option<Wrap>,
) -> io::Result<()> {
    match wrap {
        None => colors.paint(w, text)?,
        Some(wrap) => {
            w.write_all(colors.prefix().as_bytes())?;
            write_wrapped(w, text, wrap)?;
            w.write_all(colors.suffix().as_bytes())?;
        }
    }
    w.write_all(b"\n")
}

fn write_wrapped(w: &mut impl Write, text: &str, wrap: Wrap) -> io::Result<()> {
    let mut filler = LineFiller::new(wrap.width);

    for word in words(text) {
        match filler.place(word.len()) {
            Placement::First | Placement::Oversized { leading_space: false } => {}
            Placement::Append | Placement::Oversized { leading_space: true } => {
                w.write_all(b" ")?;
            }
            Placement::Break => {
                w.write_all(b"\n")?;
                write_spaces(w, wrap.pad)?;
            }
        }
        w.write_all(word.as_bytes())?;
    }

    Ok(())
}

/// Where the next word goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// First word of the line.
    First,
    /// After a single space on the current line.
    Append,
    /// Wider than any line: written unsplit on the current line, preceded by
    /// a space unless the line is empty. The line is full afterwards.
    ///
    /// Both the separating space and the full line are intentional, so the
    /// next word always starts on a fresh padded line.
    Oversized {
        /// Whether a separating space comes first.
        leading_space: bool,
    },
    /// On a fresh, padded line.
    Break,
}

/// Greedy line filling over word lengths.
#[derive(Debug, Clone)]
pub struct LineFiller {
    width: usize,
    remaining: usize,
    words_on_line: usize,
}

impl LineFiller {
    /// A filler for lines `width` bytes wide, starting on an empty line.
    #[must_use]
    pub const fn new(width: usize) -> Self {
        Self {
            width,
            remaining: width,
            words_on_line: 0,
        }
    }

    /// Bytes still free on the current line.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.remaining
    }

    /// Decide where a word of `len` bytes goes and account for it.
    pub const fn place(&mut self, len: usize) -> Placement {
        let on_line = self.words_on_line > 0;
        let needed = if on_line { len + 1 } else { len };

        if needed <= self.remaining {
            self.remaining -= needed;
            self.words_on_line += 1;
            return if on_line {
                Placement::Append
            } else {
                Placement::First
            };
        }

        if len > self.width {
            self.remaining = 0;
            self.words_on_line += 1;
            return Placement::Oversized {
                leading_space: on_line,
            };
        }

        self.remaining = self.width - len;
        self.words_on_line = 1;
        Placement::Break
    }
}

// ---------------------------------------------------------------------------
// Words
// ---------------------------------------------------------------------------

/// Space-separated words of `text`, skipping empty runs.
///
/// Lazy and borrowing: the text is never copied or modified, and the
/// iterator can be cloned to start over.
#[must_use]
pub const fn words(text: &str) -> Words<'_> {
    Words { rest: text }
}

/// Iterator returned by [`words`].
#[derive(Debug, Clone)]
pub struct Words<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Words<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let trimmed = self.rest.trim_start_matches(' ');
        if trimmed.is_empty() {
            self.rest = trimmed;
            return None;
        }
        let end = trimmed.find(' ').unwrap_or(trimmed.len());
        let (word, rest) = trimmed.split_at(end);
        self.rest = rest;
        Some(word)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn write_spaces(w: &mut impl Write, n: usize) -> io::Result<()> {
    const SPACES: &[u8; 32] = b"                                ";
    let mut left = n;
    while left > 0 {
        let chunk = left.min(SPACES.len());
        w.write_all(&SPACES[..chunk])?;
        left -= chunk;
    }
    Ok(())
}

/// Cut `s` to at most `max` bytes without splitting a character.
pub(crate) fn truncate_on_char_boundary(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}

#[cfg(test)]
mod tests {
    use super::*;
    use lurk_term::color::{ColorMode, Rgb};
    use pretty_assertions::assert_eq;

    fn header_out(header: &Header<'_>, colors: &ColorPair, budget: &LayoutBudget) -> (String, usize) {
        let mut buf = Vec::new();
        let width = write_header(&mut buf, header, colors, budget).unwrap();
        (String::from_utf8(buf).unwrap(), width)
    }

    fn body_out(text: &str, colors: &ColorPair, wrap: Option<Wrap>) -> String {
        let mut buf = Vec::new();
        write_body(&mut buf, text, colors, wrap).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn header<'a>(timestamp: &'a str, badge: &'a str, name: &'a str) -> Header<'a> {
        Header {
            timestamp,
            badge,
            name,
            separator: Separator::Colon,
        }
    }

    // ── Budget ──────────────────────────────────────────────────────────

    #[test]
    fn budget_without_timestamp() {
        let b = LayoutBudget::new(0, Some(80));
        assert_eq!(b.header_len, 28);
        assert_eq!(b.name_width, NAME_FIELD_WIDTH);
        assert!(b.is_aligned());
    }

    #[test]
    fn budget_with_timestamp() {
        let b = LayoutBudget::new(10, Some(80));
        assert_eq!(b.header_len, 10 + 1 + 26 + 2);
    }

    #[test]
    fn budget_exactly_fitting_is_aligned() {
        assert!(LayoutBudget::new(0, Some(28)).is_aligned());
        assert!(!LayoutBudget::new(0, Some(27)).is_aligned());
    }

    #[test]
    fn budget_unknown_width_is_unaligned() {
        let b = LayoutBudget::new(0, None);
        assert_eq!(b.name_width, 0);
        assert_eq!(b.wrap(5), None);
        assert_eq!(LayoutBudget::unaligned(10), LayoutBudget::new(10, None));
    }

    #[test]
    fn wrap_takes_what_the_header_left() {
        let b = LayoutBudget::new(0, Some(80));
        assert_eq!(b.wrap(28), Some(Wrap { width: 52, pad: 28 }));
    }

    #[test]
    fn wrap_refuses_when_pad_fills_terminal() {
        let b = LayoutBudget::new(0, Some(40));
        assert_eq!(b.wrap(40), None);
        assert_eq!(b.wrap(45), None);
    }

    // ── Header ──────────────────────────────────────────────────────────

    #[test]
    fn unaligned_header_uses_natural_width() {
        let (out, width) = header_out(
            &header("", "", "bob"),
            &ColorPair::none(),
            &LayoutBudget::unaligned(0),
        );
        assert_eq!(out, "bob: ");
        assert_eq!(width, 5);
    }

    #[test]
    fn aligned_header_right_aligns_name() {
        let (out, width) = header_out(
            &header("", "@", "bob"),
            &ColorPair::none(),
            &LayoutBudget::new(0, Some(80)),
        );
        assert_eq!(out, format!("{}@bob: ", " ".repeat(22)));
        assert_eq!(width, 28);
    }

    #[test]
    fn timestamp_gets_a_space() {
        let (out, width) = header_out(
            &header("[12:00:00]", "", "bob"),
            &ColorPair::none(),
            &LayoutBudget::unaligned(10),
        );
        assert_eq!(out, "[12:00:00] bob: ");
        assert_eq!(width, 16);
    }

    #[test]
    fn action_separator() {
        let h = Header {
            separator: Separator::Action,
            ..header("", "", "bob")
        };
        let (out, _) = header_out(&h, &ColorPair::none(), &LayoutBudget::unaligned(0));
        assert_eq!(out, "bob  ");
    }

    #[test]
    fn colors_wrap_only_the_name_and_are_not_counted() {
        let colors = ColorPair::new(ColorMode::TrueColor, Rgb::new(255, 0, 0));
        let (out, width) = header_out(
            &header("", "+", "bob"),
            &colors,
            &LayoutBudget::unaligned(0),
        );
        assert_eq!(out, "\x1b[38;2;255;0;0m+bob\x1b[0m: ");
        assert_eq!(width, 6);
    }

    #[test]
    fn long_name_is_truncated_when_aligned() {
        let name = "a".repeat(40);
        let (out, width) = header_out(
            &header("", "", &name),
            &ColorPair::none(),
            &LayoutBudget::new(0, Some(80)),
        );
        assert_eq!(out, format!("{}: ", "a".repeat(NAME_FIELD_WIDTH)));
        assert_eq!(width, 28);
    }

    #[test]
    fn long_name_is_kept_when_unaligned() {
        let name = "a".repeat(40);
        let (_, width) = header_out(
            &header("", "", &name),
            &ColorPair::none(),
            &LayoutBudget::unaligned(0),
        );
        assert_eq!(width, 42);
    }

    // ── Words ───────────────────────────────────────────────────────────

    #[test]
    fn words_skip_space_runs() {
        let got: Vec<&str> = words("  hello   world ").collect();
        assert_eq!(got, vec!["hello", "world"]);
    }

    #[test]
    fn words_of_blank_text() {
        assert_eq!(words("").count(), 0);
        assert_eq!(words("    ").count(), 0);
    }

    #[test]
    fn words_are_restartable() {
        let w = words("a b c");
        assert_eq!(w.clone().count(), 3);
        assert_eq!(w.collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    // ── LineFiller ──────────────────────────────────────────────────────

    #[test]
    fn filler_appends_until_full() {
        let mut f = LineFiller::new(10);
        assert_eq!(f.place(4), Placement::First);
        assert_eq!(f.place(4), Placement::Append);
        assert_eq!(f.remaining(), 1);
        assert_eq!(f.place(1), Placement::Break);
        assert_eq!(f.remaining(), 9);
    }

    #[test]
    fn filler_counts_the_separating_space() {
        let mut f = LineFiller::new(9);
        assert_eq!(f.place(4), Placement::First);
        // 4 + 1 + 4 = 9 fits exactly; 4 + 1 + 5 would not.
        assert_eq!(f.place(4), Placement::Append);
        assert_eq!(f.remaining(), 0);
    }

    #[test]
    fn filler_oversized_word() {
        let mut f = LineFiller::new(5);
        assert_eq!(f.place(2), Placement::First);
        assert_eq!(f.place(12), Placement::Oversized { leading_space: true });
        assert_eq!(f.remaining(), 0);
        assert_eq!(f.place(2), Placement::Break);
    }

    #[test]
    fn filler_oversized_first_word() {
        let mut f = LineFiller::new(5);
        assert_eq!(f.place(6), Placement::Oversized { leading_space: false });
    }

    // ── Body ────────────────────────────────────────────────────────────

    #[test]
    fn unwrapped_body_is_verbatim() {
        assert_eq!(body_out("a  b", &ColorPair::none(), None), "a  b\n");
    }

    #[test]
    fn colored_body() {
        let colors = ColorPair::new(ColorMode::Ansi16, Rgb::new(255, 0, 0));
        assert_eq!(body_out("waves", &colors, None), "\x1b[91mwaves\x1b[0m\n");
    }

    #[test]
    fn wrapped_body_pads_continuations() {
        let out = body_out(
            "aaaa bbbb cccc dddd eeee ffff gggg hhhh",
            &ColorPair::none(),
            Some(Wrap { width: 30, pad: 10 }),
        );
        assert_eq!(
            out,
            format!("aaaa bbbb cccc dddd eeee ffff\n{}gggg hhhh\n", " ".repeat(10))
        );
    }

    #[test]
    fn wrapped_lines_never_exceed_terminal_width() {
        let term_width = 40;
        let pad = 10;
        let out = body_out(
            "aaaa bbbb cccc dddd eeee ffff gggg hhhh",
            &ColorPair::none(),
            Some(Wrap {
                width: term_width - pad,
                pad,
            }),
        );
        let mut lines = out.lines();
        let first = lines.next().unwrap();
        assert!(pad + first.len() <= term_width);
        for line in lines {
            assert!(line.len() <= term_width, "{line:?}");
            assert!(line.starts_with(&" ".repeat(pad)));
        }
        let rejoined: Vec<&str> = out.split_whitespace().collect();
        assert_eq!(rejoined, "aaaa bbbb cccc dddd eeee ffff gggg hhhh".split(' ').collect::<Vec<_>>());
    }

    #[test]
    fn oversized_word_is_not_split() {
        let out = body_out(
            "hi abcdefghijklmnop there",
            &ColorPair::none(),
            Some(Wrap { width: 8, pad: 2 }),
        );
        assert_eq!(out, "hi abcdefghijklmnop\n  there\n");
    }

    #[test]
    fn empty_wrapped_body_is_just_a_newline() {
        assert_eq!(body_out("", &ColorPair::none(), Some(Wrap { width: 8, pad: 2 })), "\n");
    }
}
