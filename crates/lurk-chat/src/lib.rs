//! lurk-chat: chat messages in, formatted terminal lines out.
//!
//! The pipeline for one raw line:
//!
//! ```text
//! irc::Message::parse ─▶ handler::dispatch ─▶ Console (ChatHandler)
//!                                                 │
//!                              render::render_message
//!                                                 │
//!            badge · timestamp · layout (header + wrapped body)
//! ```
//!
//! Terminal concerns (colors, size, the event loop) live in `lurk-term`.

pub mod badge;
pub mod console;
pub mod event;
pub mod handler;
pub mod irc;
pub mod layout;
pub mod render;
pub mod timestamp;
