// SPDX-License-Identifier: MIT
//
// Output buffering and stateful color tracking.
//
// Two components work together to minimize terminal I/O:
//
//   OutputBuffer — accumulates all ANSI bytes in memory so the entire frame
//   can be written in a single write() syscall. Partially drawn frames never
//   reach the terminal.
//
//   ColorWriter — remembers the foreground color last emitted and skips the
//   SGR sequence when the next run of bytes uses the same color. A row of
//   twenty default-colored bytes costs twenty bytes, not twenty escapes.

use std::io::{self, Write};

use crate::ansi;

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// A byte buffer that accumulates ANSI output for a single `write()` syscall.
///
/// Default capacity: 16 KB — enough for most frames without reallocation.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 16_384;

impl OutputBuffer {
    /// Create an empty buffer with default capacity (16 KB).
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes (for testing and debugging).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append raw bytes verbatim.
    #[inline]
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write accumulated output to stdout and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn flush_stdout(&mut self) -> io::Result<()> {
        if !self.buf.is_empty() {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&self.buf)?;
            stdout.flush()?;
            self.buf.clear();
        }
        Ok(())
    }

    /// Write accumulated output to an arbitrary writer and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Real flushing happens in flush_stdout() / flush_to().
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── ColorWriter ─────────────────────────────────────────────────────────────

/// Foreground color tracker that skips redundant SGR sequences.
///
/// `None` is the terminal's default foreground. A fresh writer assumes the
/// default is active, which holds at the start of every line the screen
/// composer draws.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorWriter {
    current: Option<u8>,
}

impl ColorWriter {
    /// Create a writer that assumes the default foreground is active.
    #[must_use]
    pub const fn new() -> Self {
        Self { current: None }
    }

    /// Write `bytes` in `color`, switching the foreground only if needed.
    pub fn write(&mut self, out: &mut OutputBuffer, color: Option<u8>, bytes: &[u8]) {
        if color != self.current {
            // Writes into a Vec never fail.
            let _ = match color {
                Some(index) => ansi::fg(out, index),
                None => ansi::fg_default(out),
            };
            self.current = color;
        }
        out.push_bytes(bytes);
    }

    /// Return to the default foreground if a color is active.
    pub fn finish(&mut self, out: &mut OutputBuffer) {
        if self.current.is_some() {
            let _ = ansi::fg_default(out);
            self.current = None;
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
