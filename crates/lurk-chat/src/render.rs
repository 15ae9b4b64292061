//! Message rendering: turns a [`ChatEvent`] into terminal bytes.
//!
//! The four print functions cover the cross product of plain/action and
//! unaligned/aligned:
//!
//! | Function                 | Separator | Body colored | Wrapped |
//! |--------------------------|-----------|--------------|---------|
//! | [`print_privmsg`]        | `": "`    | no           | no      |
//! | [`print_privmsg_aligned`]| `": "`    | no           | yes     |
//! | [`print_action`]         | `"  "`    | yes          | no      |
//! | [`print_action_aligned`] | `"  "`    | yes          | yes     |
//!
//! [`render_message`] resolves name, badge, color, and timestamp from the
//! event and options, then picks one of them.

use std::io::{self, Write};

use lurk_term::ansi::ColorPair;
use lurk_term::color::{ColorMode, Rgb};
use lurk_term::terminal::Size;

use crate::badge::role_badge;
use crate::event::{ChatEvent, tag};
use crate::layout::{self, Header, LayoutBudget, Separator};
use crate::timestamp::{TimestampFormat, server_seconds};

/// Fixed rendering choices for a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct RenderOptions {
    /// Palette for name and action coloring.
    pub color_mode: ColorMode,
    /// Show `@` / `+` role badges.
    pub badges: bool,
    /// Right-align names in a fixed column and wrap bodies under it.
    pub align: bool,
    /// Prefer the `display-name` tag over the login.
    pub display_names: bool,
    /// Timestamp column.
    pub timestamp: TimestampFormat,
    /// Stamp with the server send time instead of the arrival time.
    pub server_time: bool,
}

/// Everything the print functions need, resolved from one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageLine<'a> {
    /// Rendered timestamp, possibly empty.
    pub timestamp: String,
    /// Badge marker, possibly empty.
    pub badge: &'static str,
    /// Name to show.
    pub name: &'a str,
    /// Body text.
    pub body: &'a str,
}

impl<'a> MessageLine<'a> {
    /// Resolve the visible parts of `event` under `options`.
    #[must_use]
    pub fn resolve(options: &RenderOptions, event: &'a ChatEvent<'a>) -> Self {
        let when = if options.server_time {
            server_seconds(event.tag(tag::SENT_TS))
        } else {
            None
        };

        Self {
            timestamp: options.timestamp.format(when),
            badge: if options.badges {
                role_badge(event.tag(tag::BADGES))
            } else {
                ""
            },
            name: display_name(options, event),
            body: event.message,
        }
    }

    fn header(&self, separator: Separator) -> Header<'_> {
        Header {
            timestamp: &self.timestamp,
            badge: self.badge,
            name: self.name,
            separator,
        }
    }
}

/// The name to show: the non-empty `display-name` tag when enabled, the
/// login otherwise.
#[must_use]
pub fn display_name<'a>(options: &RenderOptions, event: &'a ChatEvent<'a>) -> &'a str {
    if options.display_names {
        if let Some(name) = event.tags.get_non_empty(tag::DISPLAY_NAME) {
            return name;
        }
    }
    event.origin
}

/// The sender's color: the `color` tag when it parses, white otherwise.
#[must_use]
pub fn name_color(event: &ChatEvent<'_>) -> Rgb {
    event
        .tags
        .get_non_empty(tag::COLOR)
        .and_then(Rgb::from_hex)
        .unwrap_or(Rgb::WHITE)
}

/// Render one event as one or more newline-terminated lines.
///
/// `size` is the current terminal size, `None` when unknown; it only matters
/// when alignment is enabled.
///
/// # Errors
///
/// Propagates write errors from `w`.
pub fn render_message(
    w: &mut impl Write,
    options: &RenderOptions,
    size: Option<Size>,
    event: &ChatEvent<'_>,
) -> io::Result<()> {
    let line = MessageLine::resolve(options, event);
    let colors = ColorPair::new(options.color_mode, name_color(event));
    let term_width = size.map(Size::width);

    match (event.is_action, options.align) {
        (false, false) => print_privmsg(w, &line, &colors),
        (false, true) => print_privmsg_aligned(w, &line, &colors, term_width),
        (true, false) => print_action(w, &line, &colors),
        (true, true) => print_action_aligned(w, &line, &colors, term_width),
    }
}

/// `[ts ]badge+name: body` on one line; only the name is colored.
///
/// # Errors
///
/// Propagates write errors from `w`.
pub fn print_privmsg(
    w: &mut impl Write,
    line: &MessageLine<'_>,
    colors: &ColorPair,
) -> io::Result<()> {
    let budget = LayoutBudget::unaligned(line.timestamp.len());
    layout::write_header(w, &line.header(Separator::Colon), colors, &budget)?;
    layout::write_body(w, line.body, &ColorPair::none(), None)
}

/// Aligned header, body wrapped under it; only the name is colored.
///
/// # Errors
///
/// Propagates write errors from `w`.
pub fn print_privmsg_aligned(
    w: &mut impl Write,
    line: &MessageLine<'_>,
    colors: &ColorPair,
    term_width: Option<usize>,
) -> io::Result<()> {
    let budget = LayoutBudget::new(line.timestamp.len(), term_width);
    let pad = layout::write_header(w, &line.header(Separator::Colon), colors, &budget)?;
    layout::write_body(w, line.body, &ColorPair::none(), budget.wrap(pad))
}

/// `[ts ]badge+name  body` on one line; name and body share the color.
///
/// # Errors
///
/// Propagates write errors from `w`.
pub fn print_action(
    w: &mut impl Write,
    line: &MessageLine<'_>,
    colors: &ColorPair,
) -> io::Result<()> {
    let budget = LayoutBudget::unaligned(line.timestamp.len());
    layout::write_header(w, &line.header(Separator::Action), colors, &budget)?;
    layout::write_body(w, line.body, colors, None)
}

/// Aligned action; the colored body wraps under the header.
///
/// # Errors
///
/// Propagates write errors from `w`.
pub fn print_action_aligned(
    w: &mut impl Write,
    line: &MessageLine<'_>,
    colors: &ColorPair,
    term_width: Option<usize>,
) -> io::Result<()> {
    let budget = LayoutBudget::new(line.timestamp.len(), term_width);
    let pad = layout::write_header(w, &line.header(Separator::Action), colors, &budget)?;
    layout::write_body(w, line.body, colors, budget.wrap(pad))
}
