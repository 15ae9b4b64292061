//! IRC line parsing: just enough of RFC 1459 plus IRCv3 tags for chat.
//!
//! ```text
//! @badges=moderator/1;color=#FF0000 :bob!bob@bob.tmi.twitch.tv PRIVMSG #lurk :hello world
//! └──────────── tags ─────────────┘ └──────── prefix ────────┘ └command┘ └─────params─────┘
//! ```
//!
//! Parsing borrows from the line. The only allocation is the parameter list
//! (and tag values that needed unescaping).

use crate::event::{ChatEvent, Tags};

/// A line that is not an IRC message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Nothing but whitespace.
    #[error("empty line")]
    Empty,
    /// Tags and/or prefix with no command after them.
    #[error("missing command")]
    MissingCommand,
}

/// One parsed IRC message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message<'a> {
    /// IRCv3 tags, empty when the line has none.
    pub tags: Tags<'a>,
    /// Source, without the leading `:`.
    pub prefix: Option<&'a str>,
    /// Command or three-digit numeric.
    pub command: &'a str,
    /// Parameters; the trailing one (after ` :`) may contain spaces.
    pub params: Vec<&'a str>,
}

impl<'a> Message<'a> {
    /// Parse a single line. A trailing CR/LF is ignored.
    ///
    /// # Errors
    ///
    /// [`ParseError::Empty`] for blank lines, [`ParseError::MissingCommand`]
    /// when only tags or a prefix are present.
    pub fn parse(line: &'a str) -> Result<Self, ParseError> {
        let mut rest = line.trim_end_matches(['\r', '\n']).trim_start_matches(' ');
        if rest.trim_end_matches(' ').is_empty() {
            return Err(ParseError::Empty);
        }

        let mut tags = Tags::new();
        if let Some(after) = rest.strip_prefix('@') {
            let (raw, tail) = split_word(after);
            tags = Tags::parse(raw);
            rest = tail;
        }

        let mut prefix = None;
        if let Some(after) = rest.strip_prefix(':') {
            let (source, tail) = split_word(after);
            prefix = Some(source);
            rest = tail;
        }

        let (command, mut rest) = split_word(rest);
        if command.is_empty() {
            return Err(ParseError::MissingCommand);
        }

        let mut params = Vec::new();
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }
            if let Some(trailing) = rest.strip_prefix(':') {
                params.push(trailing);
                break;
            }
            let (param, tail) = split_word(rest);
            params.push(param);
            rest = tail;
        }

        Ok(Self {
            tags,
            prefix,
            command,
            params,
        })
    }

    /// The nickname part of the prefix (`nick` in `nick!user@host`).
    #[must_use]
    pub fn nick(&self) -> Option<&'a str> {
        let prefix = self.prefix?;
        let end = prefix.find(['!', '@']).unwrap_or(prefix.len());
        Some(&prefix[..end]).filter(|nick| !nick.is_empty())
    }

    /// Parameter `index`, if present.
    #[must_use]
    pub fn param(&self, index: usize) -> Option<&'a str> {
        self.params.get(index).copied()
    }

    /// Turn a `PRIVMSG` into a chat event. `None` for other commands or a
    /// `PRIVMSG` missing its sender, target, or text.
    #[must_use]
    pub fn into_chat_event(self) -> Option<ChatEvent<'a>> {
        if self.command != "PRIVMSG" {
            return None;
        }
        let origin = self.nick()?;
        let channel = self.param(0)?;
        let text = self.param(1)?;
        let (is_action, message) = split_action(text);

        Some(ChatEvent {
            origin,
            channel: Some(channel),
            message,
            is_action,
            tags: self.tags,
        })
    }
}

/// Recognize a CTCP `ACTION` (`/me`) and return its text.
///
/// `"\x01ACTION waves\x01"` → `(true, "waves")`. The closing `\x01` is
/// optional; anything else is returned unchanged with `false`.
#[must_use]
pub fn split_action(text: &str) -> (bool, &str) {
    const MARKER: &str = "\x01ACTION";

    let Some(after) = text.strip_prefix(MARKER) else {
        return (false, text);
    };
    let body = if let Some(body) = after.strip_prefix(' ') {
        body
    } else if after.is_empty() || after.starts_with('\x01') {
        after
    } else {
        return (false, text);
    };
    (true, body.strip_suffix('\x01').unwrap_or(body))
}

fn split_word(s: &str) -> (&str, &str) {
    s.split_once(' ').unwrap_or((s, ""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::tag;
    use pretty_assertions::assert_eq;

    // ── Parsing ─────────────────────────────────────────────────────────

    #[test]
    fn parse_full_privmsg() {
        let msg = Message::parse(
            "@badges=moderator/1;color=#FF0000 :bob!bob@bob.tmi.twitch.tv PRIVMSG #lurk :hello world",
        )
        .unwrap();
        assert_eq!(msg.tags.get(tag::COLOR), Some("#FF0000"));
        assert_eq!(msg.prefix, Some("bob!bob@bob.tmi.twitch.tv"));
        assert_eq!(msg.command, "PRIVMSG");
        assert_eq!(msg.params, vec!["#lurk", "hello world"]);
        assert_eq!(msg.nick(), Some("bob"));
    }

    #[test]
    fn parse_without_tags_or_prefix() {
        let msg = Message::parse("PING :tmi.twitch.tv").unwrap();
        assert!(msg.tags.is_empty());
        assert_eq!(msg.prefix, None);
        assert_eq!(msg.command, "PING");
        assert_eq!(msg.params, vec!["tmi.twitch.tv"]);
    }

    #[test]
    fn parse_numeric_with_middle_params() {
        let msg = Message::parse(":tmi.twitch.tv 001 lurker :Welcome, GLHF!\r\n").unwrap();
        assert_eq!(msg.command, "001");
        assert_eq!(msg.param(0), Some("lurker"));
        assert_eq!(msg.param(1), Some("Welcome, GLHF!"));
        assert_eq!(msg.param(2), None);
    }

    #[test]
    fn parse_join() {
        let msg = Message::parse(":lurker!lurker@lurker.tmi.twitch.tv JOIN #lurk").unwrap();
        assert_eq!(msg.command, "JOIN");
        assert_eq!(msg.params, vec!["#lurk"]);
    }

    #[test]
    fn trailing_keeps_colons_and_spaces() {
        let msg = Message::parse(":a PRIVMSG #c :: leading  spaces ").unwrap();
        assert_eq!(msg.param(1), Some(": leading  spaces "));
    }

    #[test]
    fn empty_trailing_is_a_param() {
        let msg = Message::parse(":a PRIVMSG #c :").unwrap();
        assert_eq!(msg.params, vec!["#c", ""]);
    }

    #[test]
    fn blank_lines_are_empty() {
        assert_eq!(Message::parse(""), Err(ParseError::Empty));
        assert_eq!(Message::parse("   \r\n"), Err(ParseError::Empty));
    }

    #[test]
    fn prefix_alone_is_missing_command() {
        assert_eq!(Message::parse(":server"), Err(ParseError::MissingCommand));
        assert_eq!(Message::parse("@a=b"), Err(ParseError::MissingCommand));
    }

    #[test]
    fn server_prefix_nick() {
        let msg = Message::parse(":tmi.twitch.tv NOTICE * :hi").unwrap();
        assert_eq!(msg.nick(), Some("tmi.twitch.tv"));
    }

    // ── Actions ─────────────────────────────────────────────────────────

    #[test]
    fn action_with_closing_delimiter() {
        assert_eq!(split_action("\x01ACTION waves\x01"), (true, "waves"));
    }

    #[test]
    fn action_without_closing_delimiter() {
        assert_eq!(split_action("\x01ACTION waves"), (true, "waves"));
    }

    #[test]
    fn empty_action() {
        assert_eq!(split_action("\x01ACTION\x01"), (true, ""));
    }

    #[test]
    fn not_an_action() {
        assert_eq!(split_action("ACTION waves"), (false, "ACTION waves"));
        assert_eq!(split_action("\x01ACTIONS\x01"), (false, "\x01ACTIONS\x01"));
        assert_eq!(split_action("\x01VERSION\x01"), (false, "\x01VERSION\x01"));
    }

    // ── Chat events ─────────────────────────────────────────────────────

    #[test]
    fn privmsg_becomes_event() {
        let msg = Message::parse("@display-name=Bob :bob!bob@host PRIVMSG #lurk :\x01ACTION waves\x01")
            .unwrap();
        let event = msg.into_chat_event().unwrap();
        assert_eq!(event.origin, "bob");
        assert_eq!(event.channel, Some("#lurk"));
        assert_eq!(event.message, "waves");
        assert!(event.is_action);
        assert_eq!(event.tag(tag::DISPLAY_NAME), Some("Bob"));
    }

    #[test]
    fn other_commands_are_not_events() {
        let msg = Message::parse(":bob!bob@host JOIN #lurk").unwrap();
        assert_eq!(msg.into_chat_event(), None);
    }

    #[test]
    fn privmsg_without_text_is_not_an_event() {
        let msg = Message::parse(":bob!bob@host PRIVMSG #lurk").unwrap();
        assert_eq!(msg.into_chat_event(), None);
        let msg = Message::parse("PRIVMSG #lurk :hi").unwrap();
        assert_eq!(msg.into_chat_event(), None);
    }
}
