//! View — the bridge from document to terminal frame.
//!
//! A [`Viewport`] maps a window of the document onto the text area of the
//! screen. It holds only scroll state and the text area size; the document
//! and cursor are passed in. The `draw_*` functions compose one frame into
//! an [`OutputBuffer`]:
//!
//! ```text
//! ┌────────────────────────────────┐
//! │ int main(void) {               │ ← text rows (Viewport::rows)
//! │     return 0;                  │
//! │ ~                              │ ← past the end of the document
//! │ main.c - 3 lines       c | 1/3 │ ← status bar (inverse video)
//! │ HELP: Ctrl-S = save | ...      │ ← message bar
//! └────────────────────────────────┘
//! ```

use std::time::{Duration, Instant};

use kup_term::ansi;
use kup_term::output::{ColorWriter, OutputBuffer};
use kup_term::terminal::Size;

use crate::cursor::Cursor;
use crate::document::Document;
use crate::syntax::Highlight;

/// Screen rows reserved below the text area (status bar and message bar).
pub const RESERVED_ROWS: usize = 2;

/// Longest file name shown in the status bar.
const STATUS_NAME_WIDTH: usize = 20;

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// Scroll position, saved and restored by search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewportOffsets {
    pub row: usize,
    pub col: usize,
}

/// The visible window onto the document.
#[derive(Debug, Clone)]
pub struct Viewport {
    /// First visible row.
    row_offset: usize,
    /// First visible visual column.
    col_offset: usize,
    /// Text area height.
    rows: usize,
    /// Text area width.
    cols: usize,
}

/// One row of the text area that shows document content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRow<'a> {
    /// Document row index.
    pub index: usize,
    /// Screen row within the text area.
    pub screen_row: usize,
    /// Column-clipped slice of the row's render.
    pub render: &'a [u8],
    /// The matching slice of the row's highlight.
    pub highlight: &'a [Highlight],
}

impl Viewport {
    /// A viewport over a text area of `cols` × `rows`.
    #[must_use]
    pub const fn new(cols: usize, rows: usize) -> Self {
        Self {
            row_offset: 0,
            col_offset: 0,
            rows,
            cols,
        }
    }

    /// A viewport for a whole terminal, leaving room for the two bars.
    #[must_use]
    pub fn for_screen(size: Size) -> Self {
        let mut view = Self::new(0, 0);
        view.resize(size);
        view
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn row_offset(&self) -> usize {
        self.row_offset
    }

    #[inline]
    #[must_use]
    pub const fn col_offset(&self) -> usize {
        self.col_offset
    }

    #[inline]
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    #[must_use]
    pub const fn offsets(&self) -> ViewportOffsets {
        ViewportOffsets {
            row: self.row_offset,
            col: self.col_offset,
        }
    }

    pub const fn set_offsets(&mut self, offsets: ViewportOffsets) {
        self.row_offset = offsets.row;
        self.col_offset = offsets.col;
    }

    /// Adapt to a new terminal size.
    pub fn resize(&mut self, size: Size) {
        self.rows = usize::from(size.rows).saturating_sub(RESERVED_ROWS);
        self.cols = usize::from(size.cols);
    }

    // -- Scrolling ----------------------------------------------------------

    /// Adjust the offsets so the cursor is inside the text area.
    pub fn scroll(&mut self, cursor: Cursor, doc: &Document) {
        let rx = cursor.visual_col(doc);

        if cursor.row < self.row_offset {
            self.row_offset = cursor.row;
        }
        if self.rows > 0 && cursor.row >= self.row_offset + self.rows {
            self.row_offset = cursor.row - self.rows + 1;
        }
        if rx < self.col_offset {
            self.col_offset = rx;
        }
        if self.cols > 0 && rx >= self.col_offset + self.cols {
            self.col_offset = rx - self.cols + 1;
        }
    }

    /// Scroll vertically so `row` sits in the middle of the text area.
    pub const fn center_on(&mut self, row: usize) {
        self.row_offset = row.saturating_sub(self.rows / 2);
    }

    /// Screen position of the cursor, relative to the text area.
    ///
    /// Call after [`scroll`](Self::scroll) so the cursor is inside.
    #[must_use]
    pub fn cursor_screen(&self, cursor: Cursor, doc: &Document) -> (usize, usize) {
        (
            cursor.visual_col(doc).saturating_sub(self.col_offset),
            cursor.row.saturating_sub(self.row_offset),
        )
    }

    /// Every text-area row that shows a document row, with its render and
    /// highlight clipped to the visible columns.
    pub fn visible_rows<'a>(&self, doc: &'a Document) -> impl Iterator<Item = VisibleRow<'a>> {
        let col_offset = self.col_offset;
        let cols = self.cols;
        doc.rows()
            .iter()
            .enumerate()
            .skip(self.row_offset)
            .take(self.rows)
            .enumerate()
            .map(move |(screen_row, (index, row))| {
                let len = row.render().len();
                let start = col_offset.min(len);
                let end = col_offset.saturating_add(cols).min(len);
                VisibleRow {
                    index,
                    screen_row,
                    render: &row.render()[start..end],
                    highlight: &row.highlight()[start..end],
                }
            })
    }
}

// ---------------------------------------------------------------------------
// Status bar and message
// ---------------------------------------------------------------------------

/// What the status bar reports about the document and cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub filename: Option<String>,
    pub line_count: usize,
    pub dirty: bool,
    pub language: Option<&'static str>,
    /// Cursor row, 0-indexed.
    pub cursor_row: usize,
}

impl StatusLine {
    #[must_use]
    pub fn new(doc: &Document, cursor: Cursor) -> Self {
        Self {
            filename: doc.filename().map(|p| p.display().to_string()),
            line_count: doc.len(),
            dirty: doc.is_dirty(),
            language: doc.language().map(|l| l.name),
            cursor_row: cursor.row,
        }
    }

    /// Left part: name, line count and modified flag.
    #[must_use]
    pub fn left(&self) -> String {
        let name = self.filename.as_deref().unwrap_or("[No Name]");
        let name: String = name.chars().take(STATUS_NAME_WIDTH).collect();
        let modified = if self.dirty { "(modified)" } else { "" };
        format!("{name} - {} lines {modified}", self.line_count)
    }

    /// Right part: language and cursor row.
    #[must_use]
    pub fn right(&self) -> String {
        format!(
            "{} | {}/{}",
            self.language.unwrap_or("no ft"),
            self.cursor_row + 1,
            self.line_count
        )
    }

    /// Fit both parts into `width` columns: left-aligned left part, right
    /// part flush right when there is room for it.
    #[must_use]
    pub fn layout(&self, width: usize) -> String {
        let left = self.left();
        let right = self.right();
        let mut line: String = left.chars().take(width).collect();
        let used = line.chars().count();
        let right_len = right.chars().count();
        if used + right_len <= width {
            line.extend(std::iter::repeat_n(' ', width - used - right_len));
            line.push_str(&right);
        } else {
            line.extend(std::iter::repeat_n(' ', width - used));
        }
        line
    }
}

/// A transient message under the status bar.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    text: String,
    set_at: Instant,
}

impl StatusMessage {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            set_at: Instant::now(),
        }
    }

    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the message is still within `timeout` of being set.
    #[must_use]
    pub fn is_visible(&self, timeout: Duration) -> bool {
        self.set_at.elapsed() < timeout
    }
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

/// Draw the text area: document rows, `~` past the end, and the welcome
/// banner on an empty document.
pub fn draw_rows(out: &mut OutputBuffer, view: &Viewport, doc: &Document, welcome: &str) {
    let mut visible = view.visible_rows(doc).peekable();

    for screen_row in 0..view.rows() {
        match visible.next_if(|row| row.screen_row == screen_row) {
            Some(row) => draw_text(out, row.render, row.highlight),
            None if doc.is_empty() && screen_row == view.rows() / 3 => {
                draw_welcome(out, welcome, view.cols());
            }
            None => out.push_bytes(b"~"),
        }
        ansi::clear_line(out).ok();
        out.push_bytes(b"\r\n");
    }
}

/// Draw one clipped row in its highlight colors.
///
/// Control bytes show as inverse `@`-letters (`^A` as `A`) or `?`.
fn draw_text(out: &mut OutputBuffer, render: &[u8], highlight: &[Highlight]) {
    let mut colors = ColorWriter::new();
    for (&byte, &class) in render.iter().zip(highlight) {
        if byte.is_ascii_control() {
            let symbol = if byte <= 26 { b'@' + byte } else { b'?' };
            colors.finish(out);
            ansi::inverse(out).ok();
            out.push_bytes(&[symbol]);
            ansi::reset(out).ok();
        } else {
            colors.write(out, class.color(), &[byte]);
        }
    }
    colors.finish(out);
}

fn draw_welcome(out: &mut OutputBuffer, welcome: &str, cols: usize) {
    let text: String = welcome.chars().take(cols).collect();
    let mut padding = (cols - text.chars().count()) / 2;
    if padding > 0 {
        out.push_bytes(b"~");
        padding -= 1;
    }
    out.push_bytes(" ".repeat(padding).as_bytes());
    out.push_bytes(text.as_bytes());
}

/// Draw the inverse-video status bar.
pub fn draw_status_bar(out: &mut OutputBuffer, status: &StatusLine, cols: usize) {
    ansi::inverse(out).ok();
    out.push_bytes(status.layout(cols).as_bytes());
    ansi::reset(out).ok();
    out.push_bytes(b"\r\n");
}

/// Draw the message bar. `text` is clipped to the screen width.
pub fn draw_message_bar(out: &mut OutputBuffer, text: Option<&str>, cols: usize) {
    ansi::clear_line(out).ok();
    if let Some(text) = text {
        let clipped: String = text.chars().take(cols).collect();
        out.push_bytes(clipped.as_bytes());
    }
}
