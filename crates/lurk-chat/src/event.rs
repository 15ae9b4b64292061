//! Chat events: one inbound message, borrowed from the line it came from.
//!
//! A [`ChatEvent`] lives for a single handler call. Every string in it points
//! into the raw protocol line except tag values that needed unescaping, which
//! is why [`Tags`] stores `Cow`s. Nothing here is mutated during rendering.

use std::borrow::Cow;

/// Tag names the renderer reads.
pub mod tag {
    /// Hex `#RRGGBB` name color chosen by the user. May be empty.
    pub const COLOR: &str = "color";
    /// Comma-separated `name/version` role list.
    pub const BADGES: &str = "badges";
    /// Capitalized (or localized) name to show instead of the login.
    pub const DISPLAY_NAME: &str = "display-name";
    /// Server send time, milliseconds since the epoch.
    pub const SENT_TS: &str = "tmi-sent-ts";
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// IRCv3 message tags in wire order.
///
/// Lookups return the last value for a key, so a repeated tag overrides an
/// earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags<'a> {
    entries: Vec<(&'a str, Cow<'a, str>)>,
}

impl<'a> Tags<'a> {
    /// An empty tag set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Parse the tag section of a message (without the leading `@`).
    ///
    /// `key=value` pairs are separated by `;`. A key without `=` has an empty
    /// value; empty keys are skipped. Values are unescaped.
    #[must_use]
    pub fn parse(raw: &'a str) -> Self {
        let entries = raw
            .split(';')
            .filter_map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (!key.is_empty()).then(|| (key, unescape_tag_value(value)))
            })
            .collect();
        Self { entries }
    }

    /// Append a tag.
    pub fn insert(&mut self, key: &'a str, value: impl Into<Cow<'a, str>>) {
        self.entries.push((key, value.into()));
    }

    /// The value for `key`, if present (possibly empty).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_ref())
    }

    /// The value for `key` when present and non-empty.
    #[must_use]
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// Number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no tags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Undo IRCv3 tag value escaping.
///
/// | Escape | Character |
/// |--------|-----------|
/// | `\:`   | `;`       |
/// | `\s`   | space     |
/// | `\\`   | `\`       |
/// | `\r`   | CR        |
/// | `\n`   | LF        |
///
/// Any other escaped character stands for itself, and a trailing lone
/// backslash is dropped. Borrows when there is nothing to unescape.
#[must_use]
pub fn unescape_tag_value(raw: &str) -> Cow<'_, str> {
    if !raw.contains('\\') {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some(':') => out.push(';'),
            Some('s') => out.push(' '),
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    Cow::Owned(out)
}

// ---------------------------------------------------------------------------
// ChatEvent
// ---------------------------------------------------------------------------

/// One chat message, as seen by the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent<'a> {
    /// Login name of the sender.
    pub origin: &'a str,
    /// Channel the message was sent to, including the leading `#`.
    pub channel: Option<&'a str>,
    /// Message body. For actions, the text between `ACTION ` and the closing
    /// CTCP delimiter.
    pub message: &'a str,
    /// Whether this is a `/me` action.
    pub is_action: bool,
    /// Message tags.
    pub tags: Tags<'a>,
}

impl<'a> ChatEvent<'a> {
    /// A plain message with no channel and no tags.
    #[must_use]
    pub const fn new(origin: &'a str, message: &'a str) -> Self {
        Self {
            origin,
            channel: None,
            message,
            is_action: false,
            tags: Tags::new(),
        }
    }

    /// Set the channel.
    #[must_use]
    pub fn with_channel(mut self, channel: &'a str) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Mark as a `/me` action.
    #[must_use]
    pub fn action(mut self) -> Self {
        self.is_action = true;
        self
    }

    /// Add a tag.
    #[must_use]
    pub fn with_tag(mut self, key: &'a str, value: &'a str) -> Self {
        self.tags.insert(key, value);
        self
    }

    /// Look up a tag value.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key)
    }
}
