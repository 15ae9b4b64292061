// SPDX-License-Identifier: MIT
//
// lurk-term: terminal plumbing for lurk.
//
// Everything lurk needs from the terminal and nothing it doesn't: chat colors
// parsed from hex and downsampled to whatever palette the terminal speaks,
// SGR prefix/suffix pairs, the window size, a tidy screen lifecycle, and a
// line-driven event loop that notices resizes and quit signals between lines.
//
// No raw mode, no alternate screen. Output is a plain scrolling stream, so
// piping lurk into a file or pager keeps working.

pub mod ansi;
pub mod color;
pub mod event_loop;
pub mod reader;
pub mod terminal;
