// SPDX-License-Identifier: MIT
//
// kup-term — Terminal layer for kup.
//
// Raw mode via termios, a byte-oriented key decoder, ANSI escape helpers,
// a frame-sized output buffer, and a single-threaded event loop that reads
// one batch of keys, hands them to the editor, and repaints. No TUI
// framework: every byte sent to the terminal is written here.

pub mod ansi;
pub mod event_loop;
pub mod input;
pub mod output;
pub mod terminal;
