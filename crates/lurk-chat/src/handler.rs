//! Chat callbacks and the dispatcher that routes IRC messages to them.

use std::io;

use crate::event::ChatEvent;
use crate::irc::Message;

/// Receiver of chat lifecycle and message events.
///
/// Only [`on_message`](ChatHandler::on_message) is required; the rest default
/// to doing nothing.
pub trait ChatHandler {
    /// The input source is open.
    ///
    /// # Errors
    ///
    /// Output errors stop the session.
    fn on_connect(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// The server welcomed us as `nick`.
    ///
    /// # Errors
    ///
    /// Output errors stop the session.
    fn on_authenticated(&mut self, _nick: &str) -> io::Result<()> {
        Ok(())
    }

    /// `nick` joined `channel`.
    ///
    /// # Errors
    ///
    /// Output errors stop the session.
    fn on_join(&mut self, _channel: &str, _nick: &str) -> io::Result<()> {
        Ok(())
    }

    /// A chat message or action arrived.
    ///
    /// # Errors
    ///
    /// Output errors stop the session.
    fn on_message(&mut self, event: &ChatEvent<'_>) -> io::Result<()>;

    /// The input source is gone.
    ///
    /// # Errors
    ///
    /// Output errors stop the session.
    fn on_disconnect(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Route one parsed message to `handler`.
///
/// | Command   | Callback                                   |
/// |-----------|--------------------------------------------|
/// | `001`     | `on_authenticated(params[0])`              |
/// | `JOIN`    | `on_join(params[0], prefix nick)`          |
/// | `PRIVMSG` | `on_message(event)`                        |
///
/// Everything else is ignored.
///
/// # Errors
///
/// Propagates the handler's errors.
pub fn dispatch(handler: &mut impl ChatHandler, message: Message<'_>) -> io::Result<()> {
    match message.command {
        "001" => match message.param(0) {
            Some(nick) => handler.on_authenticated(nick),
            None => {
                tracing::warn!("welcome without a nickname");
                Ok(())
            }
        },
        "JOIN" => match (message.param(0), message.nick()) {
            (Some(channel), Some(nick)) => handler.on_join(channel, nick),
            _ => {
                tracing::warn!(prefix = ?message.prefix, "malformed JOIN");
                Ok(())
            }
        },
        "PRIVMSG" => match message.into_chat_event() {
            Some(event) => handler.on_message(&event),
            None => {
                tracing::warn!("malformed PRIVMSG");
                Ok(())
            }
        },
        command => {
            tracing::trace!(command, "ignored");
            Ok(())
        }
    }
}
