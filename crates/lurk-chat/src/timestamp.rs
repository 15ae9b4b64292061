//! Timestamps: the optional `[12:34:56]` column in front of each message.
//!
//! A [`TimestampFormat`] is either disabled (renders as the empty string) or a
//! strftime pattern validated up front, so that a bad pattern is a startup
//! error instead of a rendering surprise. Instants are rendered in local time,
//! either "now" or the server-supplied send time of the message.
//!
//! Rendered stamps are capped at [`TIMESTAMP_MAX_LEN`] bytes. Patterns that
//! produce longer text are cut, never wrapped.

use std::fmt::{self, Write as _};

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, TimeZone};

use crate::layout::truncate_on_char_boundary;

/// The pattern used when timestamps are enabled without one.
pub const DEFAULT_FORMAT: &str = "[%H:%M:%S]";

/// Longest rendered timestamp, in bytes.
pub const TIMESTAMP_MAX_LEN: usize = 15;

/// A strftime pattern chrono cannot interpret.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid timestamp format '{0}'")]
pub struct InvalidFormat(pub String);

/// How (and whether) to stamp messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimestampFormat {
    pattern: Option<String>,
}

impl TimestampFormat {
    /// No timestamps.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { pattern: None }
    }

    /// Timestamps using `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidFormat`] if the pattern contains a specifier chrono
    /// does not understand (e.g. a trailing `%`).
    pub fn new(pattern: &str) -> Result<Self, InvalidFormat> {
        if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
            return Err(InvalidFormat(pattern.to_owned()));
        }
        Ok(Self {
            pattern: Some(pattern.to_owned()),
        })
    }

    /// Whether timestamps are rendered at all.
    #[inline]
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.pattern.is_some()
    }

    /// The configured pattern, if enabled.
    #[must_use]
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    /// Render `when` (Unix seconds) in local time, or the current time when
    /// `when` is `None` or out of range. Empty when disabled.
    #[must_use]
    pub fn format(&self, when: Option<i64>) -> String {
        if !self.is_enabled() {
            return String::new();
        }

        let instant = when
            .and_then(|secs| Local.timestamp_opt(secs, 0).earliest())
            .unwrap_or_else(Local::now);
        self.format_at(&instant)
    }

    /// Render a specific instant in its own time zone. Empty when disabled.
    #[must_use]
    pub fn format_at<Tz>(&self, instant: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let Some(pattern) = self.pattern.as_deref() else {
            return String::new();
        };

        let mut out = String::new();
        if write!(out, "{}", instant.format(pattern)).is_err() {
            tracing::debug!(pattern, "timestamp pattern failed to render");
            return String::new();
        }
        truncate_on_char_boundary(&mut out, TIMESTAMP_MAX_LEN);
        out
    }
}

/// Convert a `tmi-sent-ts` tag (milliseconds since the epoch) to seconds.
///
/// Missing, malformed, or non-positive values yield `None`, which callers
/// treat as "use the current time".
#[must_use]
pub fn server_seconds(tmi_sent_ts: Option<&str>) -> Option<i64> {
    let millis: i64 = tmi_sent_ts?.trim().parse().ok()?;
    (millis > 0).then_some(millis / 1000)
}
