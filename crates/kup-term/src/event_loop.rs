// SPDX-License-Identifier: MIT
//
// Event loop — one key at a time, then one frame.
//
// The loop is single-threaded and cooperative. Each iteration:
//
//   1. Paints a frame if anything changed (input, resize, or a tick that
//      reported new state) and writes it with one syscall.
//   2. Blocks in `read()` on stdin. Raw mode uses VMIN=0 / VTIME=1, so the
//      read returns after at most 100ms even when nothing was typed. That
//      read is the only place the loop ever waits.
//   3. Decodes the bytes into key events and hands each to the app, which
//      runs its whole mutation before the next key is looked at.
//
// A lone ESC byte is ambiguous: it could be the Escape key or the start of
// a CSI sequence. When a read times out with bytes still pending, the
// parser is flushed and the ESC becomes a real Escape keypress.
//
// Resize is detected by re-querying the window size on every tick; at a
// 100ms tick that is cheaper than a signal handler and just as responsive.

use std::io;

use crate::input::{KeyEvent, Parser};
use crate::output::OutputBuffer;
use crate::terminal::{Size, Terminal};

const READ_BUF_SIZE: usize = 1024;

// ─── App Trait ───────────────────────────────────────────────────────────────

/// What the application tells the event loop to do after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Continue running.
    Continue,
    /// Exit the event loop cleanly.
    Quit,
}

/// Application interface for the event loop.
///
/// The loop calls [`on_key`](App::on_key) for every decoded key,
/// [`on_resize`](App::on_resize) when the window size changes,
/// [`on_tick`](App::on_tick) after every read (including timeouts) and
/// [`paint`](App::paint) whenever the frame is dirty.
pub trait App {
    /// Handle one key. Return [`Action::Quit`] to exit the loop.
    fn on_key(&mut self, key: KeyEvent) -> Action;

    /// Handle terminal resize.
    fn on_resize(&mut self, _size: Size) {}

    /// Called after every read, even when no key arrived.
    ///
    /// Return `true` if time-based state changed (an expiring status
    /// message, for instance) and a repaint is needed.
    fn on_tick(&mut self) -> bool {
        false
    }

    /// Compose a full frame into `out`.
    ///
    /// The loop writes `out` to the terminal in one syscall afterwards.
    fn paint(&mut self, out: &mut OutputBuffer);
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// The terminal event loop.
///
/// Owns the terminal, the key parser and the frame buffer. Call
/// [`run`](Self::run) to enter the loop; it returns when the application
/// signals [`Action::Quit`] or stdin fails.
pub struct EventLoop {
    terminal: Terminal,
    parser: Parser,
    out: OutputBuffer,
}

impl EventLoop {
    /// Create an event loop for the current terminal.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be initialized.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            terminal: Terminal::new()?,
            parser: Parser::new(),
            out: OutputBuffer::new(),
        })
    }

    /// The current terminal size.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    /// Run until the application returns [`Action::Quit`].
    ///
    /// Enters raw mode first and always restores the terminal on the way
    /// out, including when the loop itself failed.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal setup, a read, or a frame write fails.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.terminal.enter()?;
        let result = self.run_inner(app);
        self.terminal.leave()?;
        result
    }

    fn run_inner(&mut self, app: &mut impl App) -> io::Result<()> {
        let mut dirty = true;
        let mut bytes = [0u8; READ_BUF_SIZE];

        loop {
            if dirty {
                self.out.clear();
                app.paint(&mut self.out);
                self.out.flush_stdout()?;
                dirty = false;
            }

            let n = self.terminal.read(&mut bytes)?;
            let keys = if n > 0 {
                self.parser.advance(&bytes[..n])
            } else if self.parser.has_pending() {
                self.parser.flush()
            } else {
                Vec::new()
            };

            if dispatch(app, &keys) == Action::Quit {
                return Ok(());
            }
            dirty |= !keys.is_empty();

            if let Some(size) = self.terminal.refresh_size() {
                app.on_resize(size);
                dirty = true;
            }

            dirty |= app.on_tick();
        }
    }
}

/// Deliver keys in order, stopping at the first that asks to quit.
fn dispatch(app: &mut impl App, keys: &[KeyEvent]) -> Action {
    for &key in keys {
        if app.on_key(key) == Action::Quit {
            return Action::Quit;
        }
    }
    Action::Continue
}

// ─── Tests ───────────────────────────────────────────────────────────────────
