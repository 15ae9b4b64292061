//! Console: the chat session printed to a terminal.
//!
//! [`Console`] sits between the line-driven event loop and the renderer. It
//! parses each raw line, dispatches it, prints `***` status lines for the
//! session lifecycle, and keeps the terminal size current for alignment.
//!
//! ```text
//! *** Connected
//! *** Authenticated
//! *** Joined #lurk
//! bob: hello world
//! *** Disconnected
//! ```

use std::fmt;
use std::io::{self, Write};

use lurk_term::event_loop::{Action, LineApp};
use lurk_term::terminal::Size;

use crate::event::ChatEvent;
use crate::handler::{self, ChatHandler};
use crate::irc::Message;
use crate::render::{self, RenderOptions};

/// A rendering chat session writing to `W`.
#[derive(Debug)]
pub struct Console<W: Write> {
    out: W,
    options: RenderOptions,
    size: Option<Size>,
    channel: Option<String>,
    nick: Option<String>,
    rendered: u64,
}

impl<W: Write> Console<W> {
    /// A console writing to `out` with fixed rendering `options`.
    #[must_use]
    pub const fn new(out: W, options: RenderOptions) -> Self {
        Self {
            out,
            options,
            size: None,
            channel: None,
            nick: None,
            rendered: 0,
        }
    }

    /// Only show messages sent to `channel`. The leading `#` is optional and
    /// the comparison ignores case.
    #[must_use]
    pub fn with_channel_filter(mut self, channel: Option<&str>) -> Self {
        self.channel = channel.map(normalize_channel);
        self
    }

    /// Last known terminal size.
    #[must_use]
    pub const fn size(&self) -> Option<Size> {
        self.size
    }

    /// Our own nickname, once the server has told us.
    #[must_use]
    pub fn nick(&self) -> Option<&str> {
        self.nick.as_deref()
    }

    /// Messages rendered so far.
    #[must_use]
    pub const fn rendered(&self) -> u64 {
        self.rendered
    }

    /// Write a `*** text` status line.
    ///
    /// # Errors
    ///
    /// Propagates write errors.
    pub fn status(&mut self, text: fmt::Arguments<'_>) -> io::Result<()> {
        writeln!(self.out, "*** {text}")?;
        self.out.flush()
    }

    /// Give back the writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn accepts(&self, event: &ChatEvent<'_>) -> bool {
        match (&self.channel, event.channel) {
            (None, _) => true,
            (Some(wanted), Some(channel)) => normalize_channel(channel) == *wanted,
            (Some(_), None) => false,
        }
    }
}

impl<W: Write> ChatHandler for Console<W> {
    fn on_connect(&mut self) -> io::Result<()> {
        self.status(format_args!("Connected"))
    }

    fn on_authenticated(&mut self, nick: &str) -> io::Result<()> {
        tracing::debug!(nick, "authenticated");
        self.nick = Some(nick.to_owned());
        self.status(format_args!("Authenticated"))
    }

    fn on_join(&mut self, channel: &str, nick: &str) -> io::Result<()> {
        let ours = self
            .nick
            .as_deref()
            .is_some_and(|own| own.eq_ignore_ascii_case(nick));
        if ours {
            self.status(format_args!("Joined {channel}"))
        } else {
            Ok(())
        }
    }

    fn on_message(&mut self, event: &ChatEvent<'_>) -> io::Result<()> {
        if !self.accepts(event) {
            tracing::trace!(channel = ?event.channel, "filtered");
            return Ok(());
        }

        // One write per message.
        let mut buf = Vec::with_capacity(128);
        render::render_message(&mut buf, &self.options, self.size, event)?;
        self.out.write_all(&buf)?;
        self.out.flush()?;
        self.rendered += 1;
        Ok(())
    }

    fn on_disconnect(&mut self) -> io::Result<()> {
        tracing::info!(rendered = self.rendered, "input closed");
        self.status(format_args!("Disconnected"))
    }
}

impl<W: Write> LineApp for Console<W> {
    fn on_start(&mut self, size: Option<Size>) -> io::Result<()> {
        self.size = size;
        self.on_connect()
    }

    fn on_line(&mut self, line: &str) -> io::Result<Action> {
        match Message::parse(line) {
            Ok(message) => {
                tracing::debug!(command = message.command, "line");
                handler::dispatch(self, message)?;
            }
            Err(err) => tracing::warn!(%err, line, "unparseable line"),
        }
        Ok(Action::Continue)
    }

    fn on_resize(&mut self, size: Option<Size>) {
        self.size = size;
    }

    fn on_end_of_input(&mut self) -> io::Result<()> {
        self.on_disconnect()
    }
}

fn normalize_channel(channel: &str) -> String {
    let name = channel.strip_prefix('#').unwrap_or(channel);
    format!("#{}", name.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lurk_term::color::ColorMode;
    use pretty_assertions::assert_eq;

    fn console() -> Console<Vec<u8>> {
        Console::new(
            Vec::new(),
            RenderOptions {
                color_mode: ColorMode::Mono,
                ..RenderOptions::default()
            },
        )
    }

    fn run(mut console: Console<Vec<u8>>, lines: &[&str]) -> String {
        console.on_start(None).unwrap();
        for line in lines {
            assert_eq!(console.on_line(line).unwrap(), Action::Continue);
        }
        console.on_end_of_input().unwrap();
        String::from_utf8(console.into_inner()).unwrap()
    }

    #[test]
    fn full_session() {
        let out = run(
            console(),
            &[
                ":tmi.twitch.tv 001 lurker :Welcome, GLHF!",
                ":lurker!lurker@lurker.tmi.twitch.tv JOIN #lurk",
                "@color=#FF0000 :bob!bob@host PRIVMSG #lurk :hello world",
                ":bob!bob@host PRIVMSG #lurk :\x01ACTION waves\x01",
            ],
        );
        assert_eq!(
            out,
            "*** Connected\n\
             *** Authenticated\n\
             *** Joined #lurk\n\
             bob: hello world\n\
             bob  waves\n\
             *** Disconnected\n"
        );
    }

    #[test]
    fn other_joins_are_silent() {
        let out = run(
            console(),
            &[
                ":tmi.twitch.tv 001 lurker :Welcome",
                ":bob!bob@host JOIN #lurk",
            ],
        );
        assert_eq!(out, "*** Connected\n*** Authenticated\n*** Disconnected\n");
    }

    #[test]
    fn join_before_welcome_is_silent() {
        let out = run(console(), &[":lurker!lurker@host JOIN #lurk"]);
        assert_eq!(out, "*** Connected\n*** Disconnected\n");
    }

    #[test]
    fn garbage_lines_are_skipped() {
        let out = run(console(), &["", ":onlyprefix", "PING :tmi.twitch.tv"]);
        assert_eq!(out, "*** Connected\n*** Disconnected\n");
    }

    #[test]
    fn channel_filter() {
        let out = run(
            console().with_channel_filter(Some("LURK")),
            &[
                ":bob!bob@host PRIVMSG #lurk :here",
                ":bob!bob@host PRIVMSG #elsewhere :there",
            ],
        );
        assert_eq!(out, "*** Connected\nbob: here\n*** Disconnected\n");
    }

    #[test]
    fn counts_rendered_messages() {
        let mut console = console().with_channel_filter(Some("#lurk"));
        console.on_line(":bob!b@h PRIVMSG #lurk :one").unwrap();
        console.on_line(":bob!b@h PRIVMSG #other :two").unwrap();
        assert_eq!(console.rendered(), 1);
    }

    #[test]
    fn learns_nick_and_size() {
        let mut console = console();
        console.on_start(Some(Size::new(80, 24))).unwrap();
        console.on_line(":tmi.twitch.tv 001 Lurker :Welcome").unwrap();
        assert_eq!(console.nick(), Some("Lurker"));
        console.on_resize(Some(Size::new(100, 30)));
        assert_eq!(console.size(), Some(Size::new(100, 30)));
        console.on_resize(None);
        assert_eq!(console.size(), None);
    }

    #[test]
    fn resize_changes_the_next_layout() {
        let mut console = Console::new(
            Vec::new(),
            RenderOptions {
                color_mode: ColorMode::Mono,
                align: true,
                ..RenderOptions::default()
            },
        );
        let line = ":bob!bob@host PRIVMSG #lurk :aaaa bbbb cccc dddd";

        // 28-byte header leaves 12 bytes per line on 40 columns.
        console.on_resize(Some(Size::new(40, 24)));
        console.on_line(line).unwrap();

        console.on_resize(Some(Size::new(80, 24)));
        console.on_line(line).unwrap();

        console.on_resize(None);
        console.on_line(line).unwrap();

        let name = format!("{}bob: ", " ".repeat(23));
        let pad = " ".repeat(28);
        assert_eq!(
            String::from_utf8(console.into_inner()).unwrap(),
            format!(
                "{name}aaaa bbbb\n{pad}cccc dddd\n\
                 {name}aaaa bbbb cccc dddd\n\
                 bob: aaaa bbbb cccc dddd\n"
            )
        );
    }

    #[test]
    fn status_line() {
        let mut console = console();
        console.status(format_args!("Quit")).unwrap();
        assert_eq!(console.into_inner(), b"*** Quit\n");
    }

    #[test]
    fn channel_names_normalize() {
        assert_eq!(normalize_channel("Lurk"), "#lurk");
        assert_eq!(normalize_channel("#LURK"), "#lurk");
    }
}
