// SPDX-License-Identifier: MIT
//
// Background line reader: frames a byte stream into text lines.
//
// A dedicated thread reads the chat source (stdin or a capture file) in
// blocking mode, splits it on `\n`, and sends each complete line through a
// standard channel. The main thread receives lines with `recv_timeout()` so it
// can keep polling signal flags between messages.
//
// Shutdown: the thread exits on EOF, on a read error, when the receiver is
// dropped, or when the stop flag is seen between reads. A thread parked in a
// blocking `read()` cannot be interrupted portably, so `stop()` only joins a
// thread that has already finished and otherwise detaches it; it dies with the
// process.

use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Bytes requested per `read()` call.
const READ_BUF_SIZE: usize = 8192;

/// Longest line we are willing to buffer. IRCv3 caps tags at 8191 bytes and
/// the rest of the message at 512, so anything past this is garbage.
pub const MAX_LINE_LEN: usize = 16_384;

// ─── LineSplitter ────────────────────────────────────────────────────────────

/// Incremental `\n` framing with `\r\n` tolerance.
///
/// Feed arbitrary byte chunks with [`push`](Self::push); complete lines come
/// out with their terminator stripped. Invalid UTF-8 is replaced, not
/// rejected.
///
/// ```
/// use lurk_term::reader::LineSplitter;
///
/// let mut split = LineSplitter::new();
/// assert!(split.push(b"PING :tmi").is_empty());
/// assert_eq!(split.push(b".twitch.tv\r\nPI"), vec!["PING :tmi.twitch.tv"]);
/// assert_eq!(split.finish(), Some("PI".to_string()));
/// ```
#[derive(Debug, Default)]
pub struct LineSplitter {
    pending: Vec<u8>,
    overflowed: bool,
}

impl LineSplitter {
    /// Create an empty splitter.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: Vec::new(),
            overflowed: false,
        }
    }

    /// Feed a chunk, returning every line it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();

        for part in chunk.split_inclusive(|&b| b == b'\n') {
            let complete = part.last() == Some(&b'\n');
            let body = if complete { &part[..part.len() - 1] } else { part };

            if !self.overflowed {
                if self.pending.len() + body.len() > MAX_LINE_LEN {
                    tracing::warn!(limit = MAX_LINE_LEN, "dropping oversized input line");
                    self.pending.clear();
                    self.overflowed = true;
                } else {
                    self.pending.extend_from_slice(body);
                }
            }

            if complete {
                if !self.overflowed {
                    lines.push(self.take_line());
                }
                self.pending.clear();
                self.overflowed = false;
            }
        }

        lines
    }

    /// Flush an unterminated final line, if any.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() || self.overflowed {
            self.pending.clear();
            self.overflowed = false;
            return None;
        }
        Some(self.take_line())
    }

    fn take_line(&mut self) -> String {
        if self.pending.last() == Some(&b'\r') {
            self.pending.pop();
        }
        let line = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        line
    }
}

// ─── LineReader ──────────────────────────────────────────────────────────────

/// Background reader thread.
///
/// ```no_run
/// use lurk_term::reader::LineReader;
///
/// let (reader, rx) = LineReader::spawn(std::io::stdin());
/// while let Ok(line) = rx.recv() {
///     println!("{line}");
/// }
/// drop(reader);
/// ```
pub struct LineReader {
    handle: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl LineReader {
    /// Spawn the reader thread over `source`.
    ///
    /// Each received `String` is one line without its terminator. The
    /// channel closes once the source is exhausted.
    ///
    /// # Panics
    ///
    /// Panics if the OS cannot spawn a new thread.
    #[must_use]
    pub fn spawn<R>(source: R) -> (Self, Receiver<String>)
    where
        R: Read + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("line-reader".into())
            .spawn(move || {
                Self::reader_loop(source, &tx, &stop_flag);
            })
            .expect("failed to spawn line reader thread");

        (
            Self {
                handle: Some(handle),
                stop,
            },
            rx,
        )
    }

    /// Ask the thread to stop, joining it if it has already exited.
    ///
    /// Idempotent.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.is_finished() {
                let _ = handle.join();
            }
        }
    }

    fn reader_loop<R: Read>(mut source: R, tx: &Sender<String>, stop: &AtomicBool) {
        let mut buf = [0u8; READ_BUF_SIZE];
        let mut splitter = LineSplitter::new();

        loop {
            if stop.load(Ordering::Relaxed) {
                return;
            }

            let n = match source.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::warn!(error = %e, "input read failed");
                    break;
                }
            };

            for line in splitter.push(&buf[..n]) {
                if tx.send(line).is_err() {
                    return;
                }
            }
        }

        if let Some(line) = splitter.finish() {
            let _ = tx.send(line);
        }
        tracing::debug!("input exhausted");
    }
}

impl Drop for LineReader {
    fn drop(&mut self) {
        self.stop();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
