//! The document: an ordered store of rows plus file metadata.
//!
//! `Document` owns every byte of text. All edits go through it so that each
//! one leaves the rows consistent before returning: the structural change
//! first, then the affected rows' render, then their highlight, then the
//! downstream syntax cascade.
//!
//! # Positions
//!
//! Positions never fail. A row index past the end clamps to
//! [`len`](Document::len), the "past last row" position where typing starts
//! a new row; a column past the end of its row clamps to the row length.
//!
//! # Syntax cascade
//!
//! Each row remembers the incoming block-comment state it was classified
//! with. After an edit, the touched rows are reclassified and the walk
//! continues downward only while the state flowing into the next row differs
//! from what that row last saw. The walk only moves forward, so it ends at
//! the last row at the latest.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, trace};

use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::render::DEFAULT_TAB_STOP;
use crate::row::Row;
use crate::syntax::{Highlight, Language};

/// An editable text document.
#[derive(Debug)]
pub struct Document {
    rows: Vec<Row>,
    dirty: u64,
    language: Option<&'static Language>,
    filename: Option<PathBuf>,
    tab_stop: usize,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DEFAULT_TAB_STOP)
    }
}

impl Document {
    // -- Construction -------------------------------------------------------

    /// An empty, unnamed document.
    #[must_use]
    pub fn new(tab_stop: usize) -> Self {
        Self {
            rows: Vec::new(),
            dirty: 0,
            language: None,
            filename: None,
            tab_stop: tab_stop.max(1),
        }
    }

    /// Build a document from flat file content.
    ///
    /// Lines are split on `\n` and trailing `\r`/`\n` bytes are stripped
    /// from each, so CRLF files load as plain rows. A final newline does not
    /// produce an extra empty row; empty content gives no rows at all.
    #[must_use]
    pub fn from_bytes(bytes: &[u8], tab_stop: usize) -> Self {
        let mut doc = Self::new(tab_stop);
        let tab_stop = doc.tab_stop;
        if !bytes.is_empty() {
            let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
            doc.rows = body
                .split(|&b| b == b'\n')
                .map(|line| Row::new(trim_line_end(line).to_vec(), tab_stop))
                .collect();
        }
        doc.highlight_from(0, doc.rows.len());
        doc
    }

    /// Load a document from disk. The language is chosen from the path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read.
    pub fn open(path: impl AsRef<Path>, tab_stop: usize) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let mut doc = Self::from_bytes(&bytes, tab_stop);
        doc.set_filename(path);
        doc.dirty = 0;
        info!(path = %path.display(), rows = doc.rows.len(), "opened file");
        Ok(doc)
    }

    // -- Access -------------------------------------------------------------

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn row(&self, at: usize) -> Option<&Row> {
        self.rows.get(at)
    }

    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Length of row `at`, 0 past the last row.
    #[must_use]
    pub fn row_len(&self, at: usize) -> usize {
        self.rows.get(at).map_or(0, Row::len)
    }

    /// Mutation counter since the last load or save.
    #[inline]
    #[must_use]
    pub const fn dirty(&self) -> u64 {
        self.dirty
    }

    #[inline]
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty > 0
    }

    #[inline]
    #[must_use]
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    #[inline]
    #[must_use]
    pub const fn language(&self) -> Option<&'static Language> {
        self.language
    }

    #[inline]
    #[must_use]
    pub const fn tab_stop(&self) -> usize {
        self.tab_stop
    }

    /// Clamp a cursor into the document: the row to `0..=len`, the column to
    /// that row's length.
    #[must_use]
    pub fn clamp(&self, cursor: Cursor) -> Cursor {
        let row = cursor.row.min(self.len());
        Cursor::new(row, cursor.col.min(self.row_len(row)))
    }

    // -- Configuration ------------------------------------------------------

    /// Change the tab stop and re-render every row.
    pub fn set_tab_stop(&mut self, tab_stop: usize) {
        let tab_stop = tab_stop.max(1);
        if tab_stop == self.tab_stop {
            return;
        }
        self.tab_stop = tab_stop;
        for row in &mut self.rows {
            row.rebuild_render(tab_stop);
        }
        self.highlight_from(0, self.rows.len());
    }

    /// Name the document and pick its language from the new name.
    pub fn set_filename(&mut self, path: impl Into<PathBuf>) {
        self.filename = Some(path.into());
        self.select_language();
    }

    /// Choose the language from the file name and re-highlight every row.
    ///
    /// No file name, or a name no language claims, turns highlighting off.
    pub fn select_language(&mut self) {
        self.language = self
            .filename
            .as_deref()
            .and_then(Path::to_str)
            .and_then(Language::for_filename);
        debug!(language = ?self.language.map(|l| l.name), "selected language");
        self.highlight_from(0, self.rows.len());
    }

    // -- Row operations -----------------------------------------------------

    /// Insert a new row before `at`. Does nothing if `at > len`.
    pub fn insert_row(&mut self, at: usize, text: &[u8]) {
        if at > self.rows.len() {
            return;
        }
        self.rows.insert(at, Row::new(text.to_vec(), self.tab_stop));
        self.dirty += 1;
        self.highlight_from(at, 1);
    }

    /// Remove row `at`. Does nothing if it does not exist.
    pub fn delete_row(&mut self, at: usize) {
        if at >= self.rows.len() {
            return;
        }
        self.rows.remove(at);
        self.dirty += 1;
        self.highlight_from(at, 1);
    }

    /// Append `text` to the end of row `at`. Does nothing past the last row.
    pub fn append_string(&mut self, at: usize, text: &[u8]) {
        let tab_stop = self.tab_stop;
        let Some(row) = self.rows.get_mut(at) else {
            return;
        };
        row.append(text, tab_stop);
        self.dirty += 1;
        self.highlight_from(at, 1);
    }

    // -- Cursor operations --------------------------------------------------

    /// Insert `byte` at the cursor and return the cursor after it.
    ///
    /// On the past-last-row position an empty row is appended first.
    pub fn insert_char(&mut self, cursor: Cursor, byte: u8) -> Cursor {
        let mut at = self.clamp(cursor);
        let tab_stop = self.tab_stop;
        if at.row == self.rows.len() {
            self.rows.push(Row::new(Vec::new(), tab_stop));
            at.col = 0;
        }
        self.rows[at.row].insert_byte(at.col, byte, tab_stop);
        self.dirty += 1;
        self.highlight_from(at.row, 1);
        Cursor::new(at.row, at.col + 1)
    }

    /// Delete the byte before the cursor and return the new cursor.
    ///
    /// At column 0 the row is joined onto the previous one and the cursor
    /// lands on the join point. Nothing happens at the start of the document
    /// or on the past-last-row position.
    pub fn delete_char(&mut self, cursor: Cursor) -> Cursor {
        let at = self.clamp(cursor);
        if at.row == self.rows.len() || (at.row == 0 && at.col == 0) {
            return at;
        }

        let tab_stop = self.tab_stop;
        if at.col > 0 {
            self.rows[at.row].remove_byte(at.col - 1, tab_stop);
            self.dirty += 1;
            self.highlight_from(at.row, 1);
            return Cursor::new(at.row, at.col - 1);
        }

        let prev = at.row - 1;
        let join = self.rows[prev].len();
        let removed = self.rows.remove(at.row);
        self.rows[prev].append(removed.chars(), tab_stop);
        self.dirty += 1;
        self.highlight_from(prev, 1);
        Cursor::new(prev, join)
    }

    /// Split the row at the cursor; the tail moves to a new row below.
    ///
    /// On the past-last-row position an empty row is appended instead.
    /// Returns the start of the row below.
    pub fn split_row(&mut self, cursor: Cursor) -> Cursor {
        let at = self.clamp(cursor);
        if at.row == self.rows.len() {
            self.insert_row(at.row, b"");
            return Cursor::new(at.row + 1, 0);
        }

        let tab_stop = self.tab_stop;
        let tail = self.rows[at.row].split_off(at.col, tab_stop);
        self.rows.insert(at.row + 1, Row::new(tail, tab_stop));
        self.dirty += 1;
        self.highlight_from(at.row, 2);
        Cursor::new(at.row + 1, 0)
    }

    // -- Persistence --------------------------------------------------------

    /// Flat file content: every row followed by `\n`.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let size = self.rows.iter().map(|r| r.len() + 1).sum();
        let mut out = Vec::with_capacity(size);
        for row in &self.rows {
            out.extend_from_slice(row.chars());
            out.push(b'\n');
        }
        out
    }

    /// Write the document to its file and mark it clean.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoFileName`] if the document was never named, or
    /// [`Error::Io`] if the write fails. The document is unchanged on error.
    pub fn save(&mut self) -> Result<usize> {
        let path = self.filename.as_deref().ok_or(Error::NoFileName)?;
        let written = self.write_to(path)?;
        self.dirty = 0;
        Ok(written)
    }

    /// Save to `path`, then name the document after it (re-selecting the
    /// language).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the write fails. Name, language and dirty
    /// state are unchanged on error.
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<usize> {
        let path = path.into();
        let written = self.write_to(&path)?;
        self.set_filename(path);
        self.dirty = 0;
        Ok(written)
    }

    fn write_to(&self, path: &Path) -> Result<usize> {
        let content = self.serialize();
        fs::write(path, &content)?;
        info!(path = %path.display(), bytes = content.len(), "saved file");
        Ok(content.len())
    }

    // -- Highlight overlay --------------------------------------------------

    /// Paint `class` over a range of row `at`'s render and return the
    /// highlight as it was before.
    pub fn overlay_highlight(
        &mut self,
        at: usize,
        start: usize,
        len: usize,
        class: Highlight,
    ) -> Option<Vec<Highlight>> {
        let row = self.rows.get_mut(at)?;
        let saved = row.highlight().to_vec();
        row.overlay(start, len, class);
        Some(saved)
    }

    /// Put back a highlight saved by [`overlay_highlight`].
    ///
    /// Returns `false` if the row is gone or no longer matches the snapshot.
    ///
    /// [`overlay_highlight`]: Self::overlay_highlight
    pub fn restore_highlight(&mut self, at: usize, saved: Vec<Highlight>) -> bool {
        self.rows
            .get_mut(at)
            .is_some_and(|row| row.restore_highlight(saved))
    }

    // -- Syntax -------------------------------------------------------------

    /// Reclassify rows `start..start + count`, then keep going while the
    /// incoming comment state of the next row changed.
    fn highlight_from(&mut self, start: usize, count: usize) {
        let language = self.language;
        let forced_end = start.saturating_add(count);
        let mut at = start;

        while at < self.rows.len() {
            let open_in = at > 0 && self.rows[at - 1].comment_open();
            if at >= forced_end && self.rows[at].comment_open_in() == open_in {
                break;
            }
            self.rows[at].update_syntax(language, open_in);
            at += 1;
        }

        if at > forced_end {
            trace!(start, cascaded = at - forced_end, "syntax cascade");
        }
    }
}

/// Strip trailing `\r` and `\n` bytes.
fn trim_line_end(mut line: &[u8]) -> &[u8] {
    while let [rest @ .., b'\r' | b'\n'] = line {
        line = rest;
    }
    line
}
