// SPDX-License-Identifier: MIT
//
// Terminal input parser.
//
// Turns raw stdin bytes into key events. Handles the sequences a plain
// xterm-compatible terminal sends in raw mode:
//
// - Legacy CSI sequences (arrows, Home/End, Delete, Page Up/Down)
// - SS3 sequences (arrows and Home/End in application cursor mode)
// - Control characters (Ctrl+letter, Enter, Tab, Backspace)
// - Alt+key (ESC followed by a printable byte)
// - Every other byte, delivered as-is: the editor is byte-oriented, so
//   UTF-8 lead and continuation bytes arrive as individual `Char` events.
//
// # Design
//
// The parser keeps a small byte buffer because an escape sequence can be
// split across two `read()` calls. Feed bytes with [`Parser::advance`].
// When a read times out with bytes still pending, call [`Parser::flush`]
// to emit a lone ESC as a real Escape keypress.

use bitflags::bitflags;

// ─── Event Types ────────────────────────────────────────────────────────────

/// A keyboard event with key identity and modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Which key was pressed.
    pub code: KeyCode,
    /// Active modifier keys.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A key with no modifiers.
    #[inline]
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
        }
    }

    /// Ctrl + an ASCII letter (lowercase).
    #[inline]
    #[must_use]
    pub const fn ctrl(letter: u8) -> Self {
        Self {
            code: KeyCode::Char(letter),
            modifiers: Modifiers::CTRL,
        }
    }

    /// True when this is Ctrl + `letter` with no other modifier.
    #[inline]
    #[must_use]
    pub fn is_ctrl(&self, letter: u8) -> bool {
        self.code == KeyCode::Char(letter) && self.modifiers == Modifiers::CTRL
    }
}

/// Identity of a key.
///
/// Printable input is a single byte in [`Char`](KeyCode::Char); Tab arrives
/// as `Char(b'\t')` because it is inserted like any other byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// One raw input byte.
    Char(u8),
    Enter,
    Backspace,
    Delete,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

bitflags! {
    /// Keyboard modifier flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
    }
}

// ─── Parser ─────────────────────────────────────────────────────────────────

/// Terminal input parser.
///
/// Feed raw bytes via [`advance`](Parser::advance) and collect
/// [`KeyEvent`]s. Incomplete sequences are buffered until more bytes
/// arrive or [`flush`](Parser::flush) is called.
pub struct Parser {
    buf: Vec<u8>,
}

impl Parser {
    /// Create a new parser with an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(16),
        }
    }

    /// Feed raw bytes from stdin and return all events that can be parsed.
    pub fn advance(&mut self, data: &[u8]) -> Vec<KeyEvent> {
        self.buf.extend_from_slice(data);
        let mut events = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            match try_parse(&self.buf[pos..]) {
                Parsed::Key(event, consumed) => {
                    events.push(event);
                    pos += consumed;
                }
                Parsed::Incomplete => break,
                Parsed::Skip(n) => pos += n,
            }
        }

        if pos > 0 {
            self.buf.drain(..pos);
        }

        events
    }

    /// Are there unconsumed bytes that might complete with more data?
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Flush pending bytes after a read timeout.
    ///
    /// The leading ESC becomes an Escape key; whatever followed it is
    /// parsed again on its own.
    pub fn flush(&mut self) -> Vec<KeyEvent> {
        let mut events = Vec::new();
        let pending = std::mem::take(&mut self.buf);
        let mut rest: &[u8] = &pending;

        while let Some((&first, tail)) = rest.split_first() {
            if first == 0x1B {
                events.push(KeyEvent::plain(KeyCode::Escape));
                rest = tail;
                continue;
            }
            match try_parse(rest) {
                Parsed::Key(event, consumed) => {
                    events.push(event);
                    rest = &rest[consumed..];
                }
                Parsed::Skip(n) => rest = &rest[n..],
                Parsed::Incomplete => rest = tail,
            }
        }

        events
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Stateless Parsing Functions ────────────────────────────────────────────

enum Parsed {
    /// Parsed a key, consuming `usize` bytes.
    Key(KeyEvent, usize),
    /// Sequence is incomplete — need more bytes.
    Incomplete,
    /// Unrecognized sequence, skip `usize` bytes.
    Skip(usize),
}

fn try_parse(buf: &[u8]) -> Parsed {
    let Some(&first) = buf.first() else {
        return Parsed::Skip(0);
    };

    match first {
        0x1B => parse_escape(buf),
        0x0A | 0x0D => Parsed::Key(KeyEvent::plain(KeyCode::Enter), 1),
        0x08 | 0x7F => Parsed::Key(KeyEvent::plain(KeyCode::Backspace), 1),
        0x09 => Parsed::Key(KeyEvent::plain(KeyCode::Char(b'\t')), 1),
        0x00 => Parsed::Key(KeyEvent::ctrl(b'@'), 1),
        b @ 0x01..=0x1A => Parsed::Key(KeyEvent::ctrl(b + b'a' - 1), 1),
        // FS, GS, RS, US: no editor meaning.
        0x1C..=0x1F => Parsed::Skip(1),
        b => Parsed::Key(KeyEvent::plain(KeyCode::Char(b)), 1),
    }
}

// ── Escape sequences ────────────────────────────────────────────────────────

fn parse_escape(buf: &[u8]) -> Parsed {
    debug_assert_eq!(buf[0], 0x1B);

    let Some(&second) = buf.get(1) else {
        return Parsed::Incomplete;
    };

    match second {
        b'[' => parse_csi(buf),
        b'O' => parse_ss3(buf),
        b @ 0x20..=0x7E => Parsed::Key(
            KeyEvent {
                code: KeyCode::Char(b),
                modifiers: Modifiers::ALT,
            },
            2,
        ),
        // ESC ESC or ESC + control byte: the first ESC stands alone.
        _ => Parsed::Key(KeyEvent::plain(KeyCode::Escape), 1),
    }
}

fn parse_csi(buf: &[u8]) -> Parsed {
    debug_assert!(buf.len() >= 2 && buf[1] == b'[');

    // Scan for the final byte (0x40..=0x7E). Parameter and intermediate
    // bytes live in 0x20..=0x3F.
    let mut end = 2;
    while end < buf.len() {
        let b = buf[end];
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            return Parsed::Skip(end);
        }
        end += 1;
    }

    if end >= buf.len() {
        return Parsed::Incomplete;
    }

    let final_byte = buf[end];
    let params = &buf[2..end];
    let consumed = end + 1;

    if final_byte == b'~' {
        let first = leading_number(params);
        let code = match first {
            1 | 7 => KeyCode::Home,
            3 => KeyCode::Delete,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            _ => return Parsed::Skip(consumed),
        };
        return Parsed::Key(KeyEvent::plain(code), consumed);
    }

    match cursor_key(final_byte) {
        Some(code) => Parsed::Key(KeyEvent::plain(code), consumed),
        None => Parsed::Skip(consumed),
    }
}

fn parse_ss3(buf: &[u8]) -> Parsed {
    debug_assert!(buf.len() >= 2 && buf[1] == b'O');

    let Some(&third) = buf.get(2) else {
        return Parsed::Incomplete;
    };

    match cursor_key(third) {
        Some(code) => Parsed::Key(KeyEvent::plain(code), 3),
        None => Parsed::Skip(3),
    }
}

/// Final bytes shared by CSI and SS3 cursor-key encodings.
const fn cursor_key(byte: u8) -> Option<KeyCode> {
    match byte {
        b'A' => Some(KeyCode::Up),
        b'B' => Some(KeyCode::Down),
        b'C' => Some(KeyCode::Right),
        b'D' => Some(KeyCode::Left),
        b'H' => Some(KeyCode::Home),
        b'F' => Some(KeyCode::End),
        _ => None,
    }
}

/// First `;`-separated decimal parameter, 0 when absent.
fn leading_number(params: &[u8]) -> u32 {
    params
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(0u32, |acc, b| {
            acc.saturating_mul(10).saturating_add(u32::from(b - b'0'))
        })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
