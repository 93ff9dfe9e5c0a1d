//! Search — incremental substring search with a match overlay.
//!
//! A [`SearchSession`] lives for as long as the search prompt is open. Every
//! keystroke becomes a [`SearchStep`]: editing the query restarts the search
//! from where the cursor was when the session began, the arrow keys move to
//! the next or previous match, Enter keeps the cursor on the current match,
//! and Escape puts the cursor and viewport back where they were.
//!
//! # Matching
//!
//! Rows are searched in their rendered form, so a query typed with spaces
//! matches text indented with tabs the way it appears on screen. The first
//! occurrence in a row wins. The scan wraps around the document and visits
//! every row at most once per step.
//!
//! # Match overlay
//!
//! The matched range is painted with [`Highlight::Match`]. The row's
//! previous highlight is saved first and put back at the start of the next
//! step, so at most one row carries the overlay at any time.

use kup_term::input::{KeyCode, KeyEvent};
use tracing::debug;

use crate::cursor::Cursor;
use crate::document::Document;
use crate::editor::Editor;
use crate::prompt::{PromptHandler, PromptOutcome};
use crate::syntax::Highlight;
use crate::view::{Viewport, ViewportOffsets};

// ---------------------------------------------------------------------------
// Direction and steps
// ---------------------------------------------------------------------------

/// Search direction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SearchDirection {
    Forward,
    Backward,
}

/// One user action inside a search session.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SearchStep {
    /// Move to the next match (→ or ↓).
    Next,
    /// Move to the previous match (← or ↑).
    Previous,
    /// The query changed; search again from the session origin.
    Edit,
    /// End the session, keeping the cursor on the match (Enter).
    Accept,
    /// End the session, restoring cursor and viewport (Escape).
    Cancel,
}

impl SearchStep {
    /// Map a key that did not close the prompt to a step.
    #[must_use]
    pub const fn from_key(key: KeyEvent) -> Self {
        match key.code {
            KeyCode::Right | KeyCode::Down => Self::Next,
            KeyCode::Left | KeyCode::Up => Self::Previous,
            KeyCode::Enter => Self::Accept,
            KeyCode::Escape => Self::Cancel,
            _ => Self::Edit,
        }
    }
}

// ---------------------------------------------------------------------------
// Match
// ---------------------------------------------------------------------------

/// A match in rendered coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match {
    pub row: usize,
    /// Visual column of the first matched byte.
    pub rx: usize,
    pub len: usize,
}

/// First occurrence of `query` in `haystack`. An empty query never matches.
#[must_use]
pub fn find_in_row(haystack: &[u8], query: &[u8]) -> Option<usize> {
    if query.is_empty() || query.len() > haystack.len() {
        return None;
    }
    haystack.windows(query.len()).position(|w| w == query)
}

/// Ring scan over rows for `query`.
///
/// With `after` set, the scan starts one row past it in `direction`.
/// Without it, the scan is a fresh forward search starting at (and
/// including) `origin`. Every row is visited at most once.
#[must_use]
pub fn find(
    doc: &Document,
    query: &[u8],
    origin: usize,
    after: Option<usize>,
    direction: SearchDirection,
) -> Option<Match> {
    let n = doc.len();
    if n == 0 || query.is_empty() {
        return None;
    }

    let (start, direction) = match after {
        Some(last) => {
            let last = last % n;
            let start = match direction {
                SearchDirection::Forward => (last + 1) % n,
                SearchDirection::Backward => (last + n - 1) % n,
            };
            (start, direction)
        }
        None => (origin % n, SearchDirection::Forward),
    };

    (0..n)
        .map(|i| match direction {
            SearchDirection::Forward => (start + i) % n,
            SearchDirection::Backward => (start + n - i) % n,
        })
        .find_map(|row| {
            let render = doc.row(row)?.render();
            find_in_row(render, query).map(|rx| Match {
                row,
                rx,
                len: query.len(),
            })
        })
}

// ---------------------------------------------------------------------------
// SearchSession
// ---------------------------------------------------------------------------

/// State of one incremental search.
#[derive(Debug)]
pub struct SearchSession {
    origin: Cursor,
    origin_offsets: ViewportOffsets,
    last_match: Option<usize>,
    direction: SearchDirection,
    /// Row carrying the match overlay and its highlight from before.
    saved_highlight: Option<(usize, Vec<Highlight>)>,
}

impl SearchSession {
    /// Start a session at the current cursor and scroll position.
    #[must_use]
    pub fn new(origin: Cursor, origin_offsets: ViewportOffsets) -> Self {
        debug!(row = origin.row, col = origin.col, "search started");
        Self {
            origin,
            origin_offsets,
            last_match: None,
            direction: SearchDirection::Forward,
            saved_highlight: None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn last_match(&self) -> Option<usize> {
        self.last_match
    }

    #[inline]
    #[must_use]
    pub const fn direction(&self) -> SearchDirection {
        self.direction
    }

    /// Run one step of the session.
    ///
    /// Returns the match the cursor moved to, if any. On no match nothing
    /// moves and no overlay is painted.
    pub fn step(
        &mut self,
        doc: &mut Document,
        cursor: &mut Cursor,
        view: &mut Viewport,
        query: &[u8],
        step: SearchStep,
    ) -> Option<Match> {
        self.restore_overlay(doc);

        match step {
            SearchStep::Accept => {
                debug!(row = cursor.row, "search accepted");
                return None;
            }
            SearchStep::Cancel => {
                *cursor = self.origin;
                view.set_offsets(self.origin_offsets);
                debug!("search cancelled");
                return None;
            }
            SearchStep::Next => self.direction = SearchDirection::Forward,
            SearchStep::Previous => self.direction = SearchDirection::Backward,
            SearchStep::Edit => {
                self.last_match = None;
                self.direction = SearchDirection::Forward;
            }
        }

        let found = find(doc, query, self.origin.row, self.last_match, self.direction)?;
        self.last_match = Some(found.row);

        let tab_stop = doc.tab_stop();
        let col = doc
            .row(found.row)
            .map_or(0, |row| row.logical_col(found.rx, tab_stop));
        *cursor = Cursor::new(found.row, col);
        view.center_on(found.row);

        if let Some(saved) = doc.overlay_highlight(found.row, found.rx, found.len, Highlight::Match) {
            self.saved_highlight = Some((found.row, saved));
        }
        Some(found)
    }

    /// Put back the highlight the last match overlaid, if any.
    pub fn restore_overlay(&mut self, doc: &mut Document) {
        if let Some((row, saved)) = self.saved_highlight.take() {
            doc.restore_highlight(row, saved);
        }
    }
}

impl PromptHandler for SearchSession {
    fn on_key(&mut self, editor: &mut Editor, input: &[u8], key: KeyEvent) {
        let step = SearchStep::from_key(key);
        let (doc, cursor, view) = editor.search_parts();
        self.step(doc, cursor, view, input, step);
    }

    fn on_finish(&mut self, editor: &mut Editor, outcome: PromptOutcome) {
        let step = match outcome {
            PromptOutcome::Submitted(_) => SearchStep::Accept,
            PromptOutcome::Cancelled => SearchStep::Cancel,
        };
        let (doc, cursor, view) = editor.search_parts();
        self.step(doc, cursor, view, b"", step);
    }
}
