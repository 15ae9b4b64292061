// SPDX-License-Identifier: MIT
//
// lurk: a read-only terminal viewer for Twitch-style IRC chat.
//
// This is the main binary that wires together both crates:
//
//   lurk-term → colors, terminal size, screen lifecycle, line event loop
//   lurk-chat → IRC parsing, badges, timestamps, layout, rendering
//
// Console implements lurk-term's LineApp trait, connecting the event loop
// to the renderer. Each input line flows through:
//
//   stdin/file → reader thread → on_line → Message::parse → dispatch
//   on_message → render_message → header + wrapped body → stdout
//
// Diagnostics go to stderr through tracing (filter: LURK_LOG), so stdout
// carries nothing but chat.

use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use lurk_chat::console::Console;
use lurk_chat::render::RenderOptions;
use lurk_chat::timestamp::{self, InvalidFormat, TimestampFormat};

use lurk_term::color::ColorMode;
use lurk_term::event_loop::{EventLoop, Exit};
use lurk_term::terminal::{self, Screen};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "LURK_LOG";

/// Filter used when `LURK_LOG` is unset or unparseable.
const DEFAULT_LOG_FILTER: &str = "lurk=warn";

// ─── Command line ───────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(name = "lurk", about = "Read-only terminal viewer for Twitch-style IRC chat", version)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Right-align names in a fixed column and wrap messages under it
    #[arg(short, long)]
    align: bool,

    /// Show @ for moderators and + for subscribers
    #[arg(short, long)]
    badges: bool,

    /// Only show messages sent to this channel
    #[arg(short, long, value_name = "CHANNEL")]
    channel: Option<String>,

    /// Show display names instead of login names
    #[arg(short, long)]
    display_names: bool,

    /// Color mode: true, 8bit, 4bit, 2bit, mono (detected when omitted)
    #[arg(short = 'm', long, value_name = "MODE")]
    color_mode: Option<ColorMode>,

    /// Stamp messages with the server send time instead of arrival time
    #[arg(short = 'r', long)]
    server_time: bool,

    /// Show timestamps, optionally with a strftime FORMAT
    #[arg(
        short,
        long,
        value_name = "FORMAT",
        num_args = 0..=1,
        default_missing_value = timestamp::DEFAULT_FORMAT,
        value_parser = parse_timestamp,
    )]
    timestamp: Option<TimestampFormat>,

    /// Read IRC lines from a file instead of stdin
    #[arg(short, long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Leave the screen alone on start and exit
    #[arg(long)]
    no_clear: bool,
}

fn parse_timestamp(pattern: &str) -> Result<TimestampFormat, InvalidFormat> {
    TimestampFormat::new(pattern)
}

impl Cli {
    /// Rendering options, with `detected` filling in an omitted color mode.
    fn render_options(&self, detected: impl FnOnce() -> ColorMode) -> RenderOptions {
        RenderOptions {
            color_mode: self.color_mode.unwrap_or_else(detected),
            badges: self.badges,
            align: self.align,
            display_names: self.display_names,
            timestamp: self.timestamp.clone().unwrap_or_default(),
            server_time: self.server_time,
        }
    }

    fn open_input(&self) -> Result<Box<dyn Read + Send>> {
        match &self.input {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("cannot open {}", path.display()))?;
                Ok(Box::new(file))
            }
            None => Ok(Box::new(io::stdin())),
        }
    }
}

// ─── Logging ────────────────────────────────────────────────────────────────

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let options = cli.render_options(ColorMode::detect_from_env);
    tracing::debug!(?options, "render options");

    let source = cli.open_input()?;

    let mut screen = Screen::new(!cli.no_clear);
    if terminal::is_tty() {
        screen.enter().context("failed to initialize terminal")?;
    }

    let mut console = Console::new(io::stdout(), options)
        .with_channel_filter(cli.channel.as_deref());
    console.status(format_args!("Connecting ..."))?;

    let mut event_loop = EventLoop::new();
    let exit = event_loop
        .run(&mut console, source)
        .context("failed to write chat output")?;

    match exit {
        Exit::EndOfInput => tracing::info!("end of input"),
        Exit::Signal => tracing::info!("interrupted"),
        Exit::Requested => tracing::info!("stopped"),
    }

    console.status(format_args!("Quit"))?;
    screen.leave().context("failed to restore terminal")?;
    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────────────
