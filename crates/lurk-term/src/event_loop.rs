// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Event loop: feeds input lines to the application, one at a time.
//
// Lines arrive from the background reader over a channel. The loop blocks on
// that channel with a short timeout so that, even when chat is quiet, it still
// wakes up to notice two things set asynchronously by signal handlers:
//
//   1. **Resize** (SIGWINCH): the terminal size is re-queried and handed to
//      the application. A line already being rendered keeps the old width;
//      the next one sees the new width.
//
//   2. **Quit** (SIGINT, SIGTERM, SIGQUIT): the loop returns so the caller
//      can restore the screen and say goodbye.
//
// Handlers only store to an `AtomicBool`. Nothing else in the program touches
// signal state.

use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::reader::LineReader;
use crate::terminal::{self, Size};

// ─── Signals ─────────────────────────────────────────────────────────────────

/// Set by the SIGWINCH handler. Checked each loop iteration.
static RESIZE_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Set by the SIGINT / SIGTERM / SIGQUIT handler.
static QUIT_RECEIVED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
fn install_signal_handlers() {
    unsafe {
        install_handler(libc::SIGWINCH, resize_handler as *const () as usize);
        for sig in [libc::SIGINT, libc::SIGTERM, libc::SIGQUIT] {
            install_handler(sig, quit_handler as *const () as usize);
        }
    }
}

#[cfg(unix)]
unsafe fn install_handler(sig: libc::c_int, handler: usize) {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = handler;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        if libc::sigaction(sig, &raw const sa, std::ptr::null_mut()) != 0 {
            tracing::warn!(signal = sig, "could not install signal handler");
        }
    }
}

#[cfg(unix)]
extern "C" fn resize_handler(_sig: libc::c_int) {
    RESIZE_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(unix)]
extern "C" fn quit_handler(_sig: libc::c_int) {
    QUIT_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_signal_handlers() {
    // No-op on non-unix platforms.
}

// ─── App Trait ───────────────────────────────────────────────────────────────

/// What the application tells the event loop to do after handling a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Continue running.
    Continue,
    /// Exit the event loop cleanly.
    Quit,
}

/// Why [`EventLoop::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// The input source reached end of file.
    EndOfInput,
    /// A termination signal arrived.
    Signal,
    /// The application returned [`Action::Quit`].
    Requested,
}

/// Application interface for the event loop.
///
/// Only [`on_line`](LineApp::on_line) is required.
pub trait LineApp {
    /// Called once before the first line, with the initial terminal size
    /// (`None` when stdout is not a terminal).
    ///
    /// # Errors
    ///
    /// Output errors abort the loop.
    fn on_start(&mut self, _size: Option<Size>) -> io::Result<()> {
        Ok(())
    }

    /// Handle one input line, terminator already stripped.
    ///
    /// # Errors
    ///
    /// Output errors abort the loop.
    fn on_line(&mut self, line: &str) -> io::Result<Action>;

    /// The terminal was resized. `None` means the size became unknown.
    fn on_resize(&mut self, _size: Option<Size>) {}

    /// The input source is exhausted. Not called when the loop ends for any
    /// other reason.
    ///
    /// # Errors
    ///
    /// Output errors are propagated to the caller of `run`.
    fn on_end_of_input(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ─── Loop Config ─────────────────────────────────────────────────────────────

/// Event loop timing.
#[derive(Debug, Clone, Copy)]
pub struct LoopConfig {
    /// How long to wait for a line before re-checking signal flags
    /// (milliseconds). Bounds quit and resize latency while chat is idle.
    pub tick_interval_ms: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 250,
        }
    }
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// The line-driven event loop.
///
/// ```no_run
/// use std::io;
/// use lurk_term::event_loop::{Action, EventLoop, LineApp};
///
/// struct Echo;
///
/// impl LineApp for Echo {
///     fn on_line(&mut self, line: &str) -> io::Result<Action> {
///         println!("{line}");
///         Ok(Action::Continue)
///     }
/// }
///
/// let mut event_loop = EventLoop::new();
/// event_loop.run(&mut Echo, io::stdin())?;
/// # Ok::<(), io::Error>(())
/// ```
#[derive(Debug)]
pub struct EventLoop {
    size: Option<Size>,
    config: LoopConfig,
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLoop {
    /// Create an event loop with default timing, querying the terminal size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LoopConfig::default())
    }

    /// Create an event loop with custom timing.
    #[must_use]
    pub fn with_config(config: LoopConfig) -> Self {
        Self {
            size: terminal::get_size(),
            config,
        }
    }

    /// The last known terminal size.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Option<Size> {
        self.size
    }

    /// Read lines from `source` until it ends, a quit signal arrives, or the
    /// application asks to stop.
    ///
    /// # Errors
    ///
    /// Returns the first output error raised by the application.
    pub fn run<R>(&mut self, app: &mut impl LineApp, source: R) -> io::Result<Exit>
    where
        R: Read + Send + 'static,
    {
        install_signal_handlers();

        let (mut reader, rx) = LineReader::spawn(source);
        let result = self.drive(app, &rx);
        reader.stop();

        result
    }

    /// The loop proper, separated from thread and signal setup.
    fn drive(&mut self, app: &mut impl LineApp, rx: &Receiver<String>) -> io::Result<Exit> {
        let timeout = Duration::from_millis(self.config.tick_interval_ms);
        app.on_start(self.size)?;

        loop {
            match rx.recv_timeout(timeout) {
                Ok(line) => {
                    if app.on_line(&line)? == Action::Quit {
                        return Ok(Exit::Requested);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    app.on_end_of_input()?;
                    return Ok(Exit::EndOfInput);
                }
            }

            if QUIT_RECEIVED.swap(false, Ordering::Relaxed) {
                tracing::info!("quit signal received");
                return Ok(Exit::Signal);
            }

            if RESIZE_RECEIVED.swap(false, Ordering::Relaxed) {
                self.size = terminal::get_size();
                tracing::info!(size = ?self.size, "terminal resized");
                app.on_resize(self.size);
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
