// SPDX-License-Identifier: MIT
//
// Terminal geometry and screen lifecycle.
//
// Safety: This module uses `unsafe` for ioctl (TIOCGWINSZ), isatty, and a
// raw fd write in the panic hook. These are the standard POSIX interfaces
// for terminal queries; each unsafe block is minimal.
#![allow(unsafe_code)]
//
// lurk never enters raw mode. It streams lines to a normal, line-buffered
// stdout and only needs three things from the terminal: how wide it is, whether
// it is a terminal at all, and a tidy screen (cursor hidden while chat scrolls,
// shown again on the way out, even after a panic).

use std::io::{self, Write};
use std::sync::Once;

use crate::ansi;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: u16,
    /// Number of rows (height in character cells).
    pub rows: u16,
}

impl Size {
    /// Create a size from columns and rows.
    #[inline]
    #[must_use]
    pub const fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }

    /// Width as a `usize`, the unit layout arithmetic works in.
    #[inline]
    #[must_use]
    pub const fn width(self) -> usize {
        self.cols as usize
    }
}

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Query the current size of the terminal behind stdout via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if stdout is not a terminal, the query fails, or the
/// terminal reports a zero dimension.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size::new(ws.ws_col, ws.ws_row))
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Check whether stdout is connected to a terminal (TTY).
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDOUT_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Panic-Safe Restore ─────────────────────────────────────────────────────

/// Restore sequence for emergency use: reset SGR attributes, show cursor.
///
/// Written when a panic unwinds past an active [`Screen`] so the user's
/// shell is not left with a hidden cursor or a dangling color.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[0m\x1b[?25h";

static PANIC_HOOK_INSTALLED: Once = Once::new();

fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();
            original(info);
        }));
    });
}

/// Write [`EMERGENCY_RESTORE`] straight to fd 1, bypassing the stdout lock
/// the panicking thread may hold.
fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── Screen ─────────────────────────────────────────────────────────────────

/// Screen handle with RAII cleanup.
///
/// [`enter`](Self::enter) hides the cursor and, unless disabled, clears the
/// screen and homes the cursor. [`leave`](Self::leave) (or drop) resets
/// colors, shows the cursor, and clears again.
///
/// ```no_run
/// use lurk_term::terminal::Screen;
///
/// let mut screen = Screen::new(true);
/// screen.enter()?;
/// println!("chat goes here");
/// // Cursor comes back when `screen` drops.
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct Screen {
    clear: bool,
    active: bool,
}

impl Screen {
    /// Create an inactive handle. `clear` controls whether entering and
    /// leaving wipe the screen.
    #[must_use]
    pub const fn new(clear: bool) -> Self {
        Self {
            clear,
            active: false,
        }
    }

    /// Whether [`enter`](Self::enter) has been called without a matching leave.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Prepare the screen for streaming chat.
    ///
    /// Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }

        install_panic_hook();

        let stdout = io::stdout();
        let mut lock = stdout.lock();
        self.write_enter(&mut lock)?;
        lock.flush()?;

        self.active = true;
        Ok(())
    }

    /// Put the terminal back the way we found it.
    ///
    /// Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }

        let stdout = io::stdout();
        let mut lock = stdout.lock();
        self.write_leave(&mut lock)?;
        lock.flush()?;

        self.active = false;
        Ok(())
    }

    fn write_enter(&self, w: &mut impl Write) -> io::Result<()> {
        ansi::cursor_hide(w)?;
        if self.clear {
            ansi::clear_screen(w)?;
            ansi::cursor_home(w)?;
        }
        Ok(())
    }

    fn write_leave(&self, w: &mut impl Write) -> io::Result<()> {
        ansi::reset(w)?;
        ansi::cursor_show(w)?;
        if self.clear {
            ansi::clear_screen(w)?;
            ansi::cursor_home(w)?;
        }
        Ok(())
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        if self.active {
            let _ = self.leave();
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
