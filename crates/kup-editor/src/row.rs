//! A single line of the document.
//!
//! A [`Row`] keeps three parallel views of one line: the logical bytes, the
//! tab-expanded render, and one highlight class per rendered byte. Only the
//! logical bytes are edited; the render is rebuilt after every edit and the
//! highlight is recomputed by the owning
//! [`Document`](crate::document::Document), which knows the neighbouring
//! rows' comment state.

use crate::render::{expand_tabs, logical_to_visual, visual_to_logical};
use crate::syntax::{highlight_line, Highlight, Language};

/// One line of text, without its line terminator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    chars: Vec<u8>,
    render: Vec<u8>,
    highlight: Vec<Highlight>,
    /// A block comment is still open at the end of this row.
    comment_open: bool,
    /// The incoming comment state this row was last classified with.
    comment_open_in: bool,
}

impl Row {
    /// Build a row from its logical bytes. The highlight starts out all
    /// [`Highlight::Normal`] until the document classifies it.
    #[must_use]
    pub fn new(chars: Vec<u8>, tab_stop: usize) -> Self {
        let mut row = Self {
            chars,
            ..Self::default()
        };
        row.rebuild_render(tab_stop);
        row
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn chars(&self) -> &[u8] {
        &self.chars
    }

    #[inline]
    #[must_use]
    pub fn render(&self) -> &[u8] {
        &self.render
    }

    #[inline]
    #[must_use]
    pub fn highlight(&self) -> &[Highlight] {
        &self.highlight
    }

    #[inline]
    #[must_use]
    pub const fn comment_open(&self) -> bool {
        self.comment_open
    }

    #[inline]
    #[must_use]
    pub const fn comment_open_in(&self) -> bool {
        self.comment_open_in
    }

    /// Length in logical bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Visual column of logical column `col`.
    #[must_use]
    pub fn visual_col(&self, col: usize, tab_stop: usize) -> usize {
        logical_to_visual(&self.chars, col, tab_stop)
    }

    /// Logical column at visual column `rx`.
    #[must_use]
    pub fn logical_col(&self, rx: usize, tab_stop: usize) -> usize {
        visual_to_logical(&self.chars, rx, tab_stop)
    }

    // -- Editing ------------------------------------------------------------
    //
    // These keep `render` current but leave the highlight to the document.

    /// Insert `byte` before column `at` (clamped to the row length).
    pub(crate) fn insert_byte(&mut self, at: usize, byte: u8, tab_stop: usize) {
        let at = at.min(self.chars.len());
        self.chars.insert(at, byte);
        self.rebuild_render(tab_stop);
    }

    /// Remove the byte at column `at`. Returns `None` past the end.
    pub(crate) fn remove_byte(&mut self, at: usize, tab_stop: usize) -> Option<u8> {
        if at >= self.chars.len() {
            return None;
        }
        let byte = self.chars.remove(at);
        self.rebuild_render(tab_stop);
        Some(byte)
    }

    /// Append bytes to the end of the row.
    pub(crate) fn append(&mut self, bytes: &[u8], tab_stop: usize) {
        self.chars.extend_from_slice(bytes);
        self.rebuild_render(tab_stop);
    }

    /// Truncate the row at `at` (clamped) and return the removed tail.
    pub(crate) fn split_off(&mut self, at: usize, tab_stop: usize) -> Vec<u8> {
        let at = at.min(self.chars.len());
        let tail = self.chars.split_off(at);
        self.rebuild_render(tab_stop);
        tail
    }

    /// Re-expand tabs. The highlight is resized to match and reset to
    /// [`Highlight::Normal`] so the two stay the same length.
    pub(crate) fn rebuild_render(&mut self, tab_stop: usize) {
        self.render = expand_tabs(&self.chars, tab_stop);
        self.highlight.clear();
        self.highlight.resize(self.render.len(), Highlight::Normal);
    }

    // -- Highlighting -------------------------------------------------------

    /// Reclassify the row given the previous row's end state. Returns this
    /// row's end state.
    pub(crate) fn update_syntax(&mut self, language: Option<&Language>, open_in: bool) -> bool {
        self.comment_open_in = open_in;
        self.comment_open = highlight_line(&self.render, language, open_in, &mut self.highlight);
        self.comment_open
    }

    /// Paint `class` over rendered bytes `start..start + len` (clipped).
    pub(crate) fn overlay(&mut self, start: usize, len: usize, class: Highlight) {
        let end = start.saturating_add(len).min(self.highlight.len());
        if start < end {
            self.highlight[start..end].fill(class);
        }
    }

    /// Put back a previously saved highlight.
    ///
    /// Ignored when the length no longer matches the render, which means the
    /// row was edited and reclassified since the snapshot.
    pub(crate) fn restore_highlight(&mut self, saved: Vec<Highlight>) -> bool {
        if saved.len() != self.render.len() {
            return false;
        }
        self.highlight = saved;
        true
    }
}
