//! Editor — key handling on top of the document.
//!
//! The [`Editor`] owns everything one editing session needs: the document,
//! the cursor, the viewport, the options, an optional open prompt and the
//! status message. Each key is routed either to the open prompt or to one
//! of the command handlers below. Handlers return whether the document
//! changed.
//!
//! | Key                 | Action                               |
//! |---------------------|--------------------------------------|
//! | printable, Tab      | insert byte                          |
//! | Enter               | split row                            |
//! | Backspace, Ctrl-H   | delete backward                      |
//! | Delete              | delete forward                       |
//! | arrows              | move cursor                          |
//! | Home / End          | start / end of row                   |
//! | PageUp / PageDown   | move by one screen                   |
//! | Ctrl-S              | save (prompts for a name if needed)  |
//! | Ctrl-F              | incremental search                   |
//! | Ctrl-Q              | quit (confirms unsaved changes)      |
//! | Ctrl-L, Escape      | nothing                              |

use kup_term::ansi;
use kup_term::event_loop::{Action, App};
use kup_term::input::{KeyCode, KeyEvent};
use kup_term::output::OutputBuffer;
use kup_term::terminal::Size;
use tracing::{info, warn};

use crate::cursor::{Cursor, Direction};
use crate::document::Document;
use crate::error::{Error, Result};
use crate::options::Options;
use crate::prompt::{Prompt, SaveAsHandler};
use crate::search::SearchSession;
use crate::view::{
    StatusLine, StatusMessage, Viewport, draw_message_bar, draw_rows, draw_status_bar,
};

/// Shown in the message bar at startup.
pub const HELP_MESSAGE: &str = "HELP: Ctrl-S = save | Ctrl-Q = quit | Ctrl-F = find";

/// One editing session.
pub struct Editor {
    document: Document,
    cursor: Cursor,
    view: Viewport,
    options: Options,
    prompt: Option<Prompt>,
    message: Option<StatusMessage>,
    /// Ctrl-Q presses still needed before a dirty document is abandoned.
    quit_remaining: u32,
    /// Whether the last frame showed the status message.
    message_painted: bool,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(Document::default(), Options::default(), Size::FALLBACK)
    }
}

impl Editor {
    /// Start a session on `document` for a terminal of `size`.
    #[must_use]
    pub fn new(mut document: Document, options: Options, size: Size) -> Self {
        document.set_tab_stop(options.tab_stop);
        Self {
            document,
            cursor: Cursor::default(),
            view: Viewport::for_screen(size),
            quit_remaining: options.quit_times,
            options,
            prompt: None,
            message: Some(StatusMessage::new(HELP_MESSAGE)),
            message_painted: false,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    #[inline]
    pub const fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    #[inline]
    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.view
    }

    #[inline]
    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    /// Whether a prompt currently owns the keyboard.
    #[inline]
    #[must_use]
    pub const fn is_prompting(&self) -> bool {
        self.prompt.is_some()
    }

    /// The text for the message bar: the open prompt, or a status message
    /// that has not expired.
    #[must_use]
    pub fn message_text(&self) -> Option<String> {
        if let Some(prompt) = &self.prompt {
            return Some(prompt.message());
        }
        self.message
            .as_ref()
            .filter(|m| m.is_visible(self.options.message_timeout))
            .map(|m| m.text().to_string())
    }

    /// Show `text` in the message bar.
    pub fn set_status(&mut self, text: impl Into<String>) {
        self.message = Some(StatusMessage::new(text));
    }

    /// Cursor position on screen, as terminal coordinates.
    #[must_use]
    pub fn cursor_screen(&self) -> (u16, u16) {
        let (x, y) = self.view.cursor_screen(self.cursor, &self.document);
        (
            u16::try_from(x).unwrap_or(u16::MAX),
            u16::try_from(y).unwrap_or(u16::MAX),
        )
    }

    pub(crate) fn search_parts(&mut self) -> (&mut Document, &mut Cursor, &mut Viewport) {
        (&mut self.document, &mut self.cursor, &mut self.view)
    }

    // -- Editing ------------------------------------------------------------

    pub fn insert_char(&mut self, byte: u8) -> bool {
        self.cursor = self.document.insert_char(self.cursor, byte);
        true
    }

    pub fn insert_newline(&mut self) -> bool {
        self.cursor = self.document.split_row(self.cursor);
        true
    }

    pub fn delete_backward(&mut self) -> bool {
        let before = self.document.dirty();
        self.cursor = self.document.delete_char(self.cursor);
        self.document.dirty() != before
    }

    /// Delete the byte under the cursor, joining the next row at the end of
    /// a row.
    pub fn delete_forward(&mut self) -> bool {
        let last_row = self.document.len().saturating_sub(1);
        let at_end = self.cursor.col >= self.document.row_len(self.cursor.row);
        if self.cursor.row >= self.document.len() || (self.cursor.row == last_row && at_end) {
            return false;
        }
        self.cursor.move_right(&self.document);
        self.delete_backward()
    }

    // -- Movement -----------------------------------------------------------

    pub fn move_cursor(&mut self, dir: Direction) -> bool {
        self.cursor.step(dir, &self.document);
        false
    }

    /// Move by one screen: first to the top (or bottom) visible row, then a
    /// full screen further.
    pub fn page(&mut self, dir: Direction) -> bool {
        let rows = self.view.rows();
        match dir {
            Direction::Up | Direction::Left => {
                self.cursor.row = self.view.row_offset();
                self.cursor.clamp(&self.document);
                self.cursor.move_up(rows, &self.document);
            }
            Direction::Down | Direction::Right => {
                let bottom = (self.view.row_offset() + rows).saturating_sub(1);
                self.cursor.row = bottom.min(self.document.len());
                self.cursor.clamp(&self.document);
                self.cursor.move_down(rows, &self.document);
            }
        }
        false
    }

    pub const fn home(&mut self) -> bool {
        self.cursor.move_home();
        false
    }

    pub fn end(&mut self) -> bool {
        self.cursor.move_end(&self.document);
        false
    }

    // -- Commands -----------------------------------------------------------

    /// Save to the document's file, or ask for a name first.
    pub fn save(&mut self) -> bool {
        if self.document.filename().is_none() {
            self.prompt = Some(Prompt::new(
                "Save as: ",
                " (ESC to cancel)",
                Box::new(SaveAsHandler),
            ));
            return false;
        }
        let result = self.document.save();
        self.report_save(result);
        false
    }

    /// Open the incremental search prompt.
    pub fn find(&mut self) -> bool {
        let session = SearchSession::new(self.cursor, self.view.offsets());
        self.prompt = Some(Prompt::new(
            "Search: ",
            " (Use ESC/Arrows/Enter)",
            Box::new(session),
        ));
        false
    }

    /// Show the result of a save in the message bar.
    pub(crate) fn report_save(&mut self, result: Result<usize>) {
        match result {
            Ok(bytes) => self.set_status(format!("{bytes} bytes written to disk")),
            Err(Error::SaveAborted) => {
                info!("save aborted");
                self.set_status("Save aborted");
            }
            Err(err) => {
                warn!(error = %err, "save failed");
                self.set_status(format!("Can't save! {err}"));
            }
        }
    }

    // -- Dispatch -----------------------------------------------------------

    /// Handle one key.
    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if let Some(prompt) = self.prompt.take() {
            if let Some(prompt) = prompt.handle_key(self, key) {
                self.prompt = Some(prompt);
            }
            return Action::Continue;
        }

        if key.is_ctrl(b'q') {
            return self.quit();
        }
        self.quit_remaining = self.options.quit_times;

        if key.is_ctrl(b's') {
            self.save();
        } else if key.is_ctrl(b'f') {
            self.find();
        } else if key.is_ctrl(b'h') {
            self.delete_backward();
        } else {
            self.dispatch_plain(key);
        }
        Action::Continue
    }

    fn dispatch_plain(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                self.insert_newline();
            }
            KeyCode::Backspace => {
                self.delete_backward();
            }
            KeyCode::Delete => {
                self.delete_forward();
            }
            KeyCode::Up => {
                self.move_cursor(Direction::Up);
            }
            KeyCode::Down => {
                self.move_cursor(Direction::Down);
            }
            KeyCode::Left => {
                self.move_cursor(Direction::Left);
            }
            KeyCode::Right => {
                self.move_cursor(Direction::Right);
            }
            KeyCode::Home => {
                self.home();
            }
            KeyCode::End => {
                self.end();
            }
            KeyCode::PageUp => {
                self.page(Direction::Up);
            }
            KeyCode::PageDown => {
                self.page(Direction::Down);
            }
            KeyCode::Char(byte) if key.modifiers.is_empty() && is_insertable(byte) => {
                self.insert_char(byte);
            }
            KeyCode::Char(_) | KeyCode::Escape => {}
        }
    }

    fn quit(&mut self) -> Action {
        if self.document.is_dirty() && self.quit_remaining > 0 {
            self.set_status(format!(
                "WARNING!!! File has unsaved changes. Press Ctrl-Q {} more times to quit.",
                self.quit_remaining
            ));
            self.quit_remaining -= 1;
            return Action::Continue;
        }
        info!(dirty = self.document.is_dirty(), "quit");
        Action::Quit
    }

    // -- Painting -----------------------------------------------------------

    /// Compose a full frame.
    pub fn draw(&mut self, out: &mut OutputBuffer) {
        self.view.scroll(self.cursor, &self.document);

        ansi::cursor_hide(out).ok();
        ansi::cursor_home(out).ok();

        let welcome = format!("kup editor -- version {}", crate::VERSION);
        draw_rows(out, &self.view, &self.document, &welcome);
        draw_status_bar(
            out,
            &StatusLine::new(&self.document, self.cursor),
            self.view.cols(),
        );
        let message = self.message_text();
        draw_message_bar(out, message.as_deref(), self.view.cols());
        self.message_painted = message.is_some();

        let (x, y) = self.cursor_screen();
        ansi::cursor_to(out, x, y).ok();
        ansi::cursor_show(out).ok();
    }
}

/// Printable ASCII, tab, and any non-ASCII byte.
const fn is_insertable(byte: u8) -> bool {
    byte == b'\t' || !byte.is_ascii_control()
}

impl App for Editor {
    fn on_key(&mut self, key: KeyEvent) -> Action {
        self.handle_key(key)
    }

    fn on_resize(&mut self, size: Size) {
        self.view.resize(size);
    }

    fn on_tick(&mut self) -> bool {
        self.message_text().is_some() != self.message_painted
    }

    fn paint(&mut self, out: &mut OutputBuffer) {
        self.draw(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Highlight;
    use kup_term::input::Modifiers;
    use pretty_assertions::assert_eq;

    fn editor(text: &str) -> Editor {
        Editor::new(
            Document::from_bytes(text.as_bytes(), 4),
            Options::default(),
            Size { cols: 40, rows: 12 },
        )
    }

    fn lines(e: &Editor) -> Vec<String> {
        e.document()
            .rows()
            .iter()
            .map(|r| String::from_utf8_lossy(r.chars()).into_owned())
            .collect()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::plain(code)
    }

    fn type_str(e: &mut Editor, s: &str) {
        for b in s.bytes() {
            e.handle_key(key(KeyCode::Char(b)));
        }
    }

    // -- Editing ------------------------------------------------------------

    #[test]
    fn typing_into_empty_document() {
        let mut e = editor("");
        type_str(&mut e, "hi");
        e.handle_key(key(KeyCode::Enter));
        type_str(&mut e, "\tx");
        assert_eq!(lines(&e), vec!["hi", "\tx"]);
        assert_eq!(e.cursor(), Cursor::new(1, 2));
        assert_eq!(e.cursor_screen(), (5, 1));
    }

    #[test]
    fn backspace_at_origin_is_noop() {
        let mut e = editor("ab");
        assert!(!e.delete_backward());
        assert_eq!(lines(&e), vec!["ab"]);
    }

    #[test]
    fn backspace_joins_rows() {
        let mut e = editor("ab\ncd\n");
        e.handle_key(key(KeyCode::Down));
        e.handle_key(key(KeyCode::Backspace));
        assert_eq!(lines(&e), vec!["abcd"]);
        assert_eq!(e.cursor(), Cursor::new(0, 2));
    }

    #[test]
    fn ctrl_h_is_backspace() {
        let mut e = editor("ab");
        e.handle_key(key(KeyCode::End));
        e.handle_key(KeyEvent::ctrl(b'h'));
        assert_eq!(lines(&e), vec!["a"]);
    }

    #[test]
    fn delete_forward_removes_under_cursor() {
        let mut e = editor("abc\nde");
        e.handle_key(key(KeyCode::Delete));
        assert_eq!(lines(&e), vec!["bc", "de"]);
        e.handle_key(key(KeyCode::End));
        e.handle_key(key(KeyCode::Delete));
        assert_eq!(lines(&e), vec!["bcde"]);
        assert_eq!(e.cursor(), Cursor::new(0, 2));
    }

    #[test]
    fn delete_forward_at_document_end_is_noop() {
        let mut e = editor("ab");
        e.handle_key(key(KeyCode::End));
        assert!(!e.delete_forward());
        assert_eq!(e.cursor(), Cursor::new(0, 2));
    }

    #[test]
    fn control_and_alt_chars_are_not_inserted() {
        let mut e = editor("");
        e.handle_key(KeyEvent::ctrl(b'l'));
        e.handle_key(key(KeyCode::Escape));
        e.handle_key(KeyEvent {
            code: KeyCode::Char(b'x'),
            modifiers: Modifiers::ALT,
        });
        assert!(e.document().is_empty());
    }

    // -- Movement -----------------------------------------------------------

    #[test]
    fn page_down_and_up() {
        let text: String = (0..100).map(|i| format!("{i}\n")).collect();
        let mut e = editor(&text);
        let rows = e.viewport().rows();
        e.handle_key(key(KeyCode::PageDown));
        assert_eq!(e.cursor().row, 2 * rows - 1);
        let mut out = OutputBuffer::new();
        e.draw(&mut out);
        e.handle_key(key(KeyCode::PageUp));
        assert_eq!(e.cursor().row, 0);
    }

    #[test]
    fn page_down_clamps_column_to_landing_row() {
        let mut text = String::from("a long first row\n");
        text.extend((0..40).map(|_| "x\n"));
        let mut e = editor(&text);
        e.handle_key(key(KeyCode::End));
        e.handle_key(key(KeyCode::PageDown));
        assert_eq!(e.cursor().col, 1);
        e.handle_key(key(KeyCode::PageUp));
        assert_eq!(e.cursor().row, 0);
        assert!(e.cursor().col <= 1);
    }

    #[test]
    fn page_down_stops_at_past_last_row() {
        let mut e = editor("a\nb\n");
        e.handle_key(key(KeyCode::PageDown));
        assert_eq!(e.cursor(), Cursor::new(2, 0));
    }

    #[test]
    fn home_and_end_keys() {
        let mut e = editor("hello");
        e.handle_key(key(KeyCode::End));
        assert_eq!(e.cursor().col, 5);
        e.handle_key(key(KeyCode::Home));
        assert_eq!(e.cursor().col, 0);
    }

    // -- Quit ---------------------------------------------------------------

    #[test]
    fn clean_document_quits_at_once() {
        let mut e = editor("a");
        assert_eq!(e.handle_key(KeyEvent::ctrl(b'q')), Action::Quit);
    }

    #[test]
    fn dirty_document_needs_confirmation() {
        let mut e = editor("a");
        type_str(&mut e, "x");
        for remaining in (1..=3).rev() {
            assert_eq!(e.handle_key(KeyEvent::ctrl(b'q')), Action::Continue);
            assert_eq!(
                e.message_text().unwrap(),
                format!(
                    "WARNING!!! File has unsaved changes. Press Ctrl-Q {remaining} more times to quit."
                )
            );
        }
        assert_eq!(e.handle_key(KeyEvent::ctrl(b'q')), Action::Quit);
    }

    #[test]
    fn other_key_resets_quit_counter() {
        let mut e = editor("a");
        type_str(&mut e, "x");
        e.handle_key(KeyEvent::ctrl(b'q'));
        e.handle_key(KeyEvent::ctrl(b'q'));
        e.handle_key(key(KeyCode::Left));
        e.handle_key(KeyEvent::ctrl(b'q'));
        assert!(e.message_text().unwrap().contains("Press Ctrl-Q 3 more"));
    }

    // -- Save ---------------------------------------------------------------

    #[test]
    fn save_named_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "hello\n").unwrap();
        let doc = Document::open(&path, 4).unwrap();
        let mut e = Editor::new(doc, Options::default(), Size::FALLBACK);
        type_str(&mut e, ">");
        e.handle_key(KeyEvent::ctrl(b's'));
        assert_eq!(std::fs::read(&path).unwrap(), b">hello\n");
        assert_eq!(e.message_text().unwrap(), "7 bytes written to disk");
        assert!(!e.document().is_dirty());
    }

    #[test]
    fn save_unnamed_prompts_for_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.c");
        let mut e = editor("int x;");
        e.handle_key(KeyEvent::ctrl(b's'));
        assert!(e.is_prompting());
        type_str(&mut e, path.to_str().unwrap());
        e.handle_key(key(KeyCode::Enter));
        assert!(!e.is_prompting());
        assert_eq!(std::fs::read(&path).unwrap(), b"int x;\n");
        assert_eq!(e.document().language().map(|l| l.name), Some("c"));
    }

    #[test]
    fn save_as_escape_aborts() {
        let mut e = editor("x");
        e.handle_key(KeyEvent::ctrl(b's'));
        type_str(&mut e, "out.txt");
        e.handle_key(key(KeyCode::Escape));
        assert!(!e.is_prompting());
        assert_eq!(e.message_text().unwrap(), "Save aborted");
        assert!(e.document().filename().is_none());
    }

    #[test]
    fn save_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = Document::from_bytes(b"x", 4);
        doc.set_filename(dir.path());
        let mut e = Editor::new(doc, Options::default(), Size::FALLBACK);
        type_str(&mut e, "y");
        e.handle_key(KeyEvent::ctrl(b's'));
        assert!(e.message_text().unwrap().starts_with("Can't save! I/O error: "));
        assert!(e.document().is_dirty());
    }

    // -- Search -------------------------------------------------------------

    #[test]
    fn search_escape_restores_everything() {
        let mut doc = Document::from_bytes(b"int x = 1; // hi\n\"str\"\n", 4);
        doc.set_filename("t.c");
        let mut e = Editor::new(doc, Options::default(), Size::FALLBACK);
        let before = e.document().row(1).unwrap().highlight().to_vec();

        e.handle_key(KeyEvent::ctrl(b'f'));
        type_str(&mut e, "\"str\"");
        assert_eq!(e.cursor(), Cursor::new(1, 0));
        assert_eq!(e.document().row(1).unwrap().highlight()[0], Highlight::Match);
        assert!(e.message_text().unwrap().starts_with("Search: \"str\""));

        e.handle_key(key(KeyCode::Escape));
        assert!(!e.is_prompting());
        assert_eq!(e.cursor(), Cursor::new(0, 0));
        assert_eq!(e.document().row(1).unwrap().highlight(), before.as_slice());
    }

    #[test]
    fn search_enter_keeps_match() {
        let mut e = editor("abc\nxyz\nxyz");
        e.handle_key(KeyEvent::ctrl(b'f'));
        type_str(&mut e, "xy");
        e.handle_key(key(KeyCode::Down));
        e.handle_key(key(KeyCode::Enter));
        assert_eq!(e.cursor(), Cursor::new(2, 0));
        assert!(!e.is_prompting());
        assert!(e
            .document()
            .rows()
            .iter()
            .all(|r| r.highlight().iter().all(|&h| h != Highlight::Match)));
    }

    #[test]
    fn search_does_not_edit_document() {
        let mut e = editor("abc");
        e.handle_key(KeyEvent::ctrl(b'f'));
        type_str(&mut e, "b");
        e.handle_key(key(KeyCode::Backspace));
        e.handle_key(key(KeyCode::Escape));
        assert_eq!(lines(&e), vec!["abc"]);
        assert!(!e.document().is_dirty());
    }

    // -- Painting -----------------------------------------------------------

    #[test]
    fn startup_shows_help() {
        let e = editor("");
        assert_eq!(e.message_text().as_deref(), Some(HELP_MESSAGE));
    }

    #[test]
    fn draw_places_cursor_and_bars() {
        let mut e = Editor::new(
            Document::from_bytes(b"hello", 4),
            Options::default(),
            Size { cols: 80, rows: 12 },
        );
        e.handle_key(key(KeyCode::End));
        let mut out = OutputBuffer::new();
        e.draw(&mut out);
        let frame = String::from_utf8_lossy(out.as_bytes()).into_owned();
        assert!(frame.starts_with("\x1b[?25l\x1b[H"));
        assert!(frame.contains("hello"));
        assert!(frame.contains("[No Name] - 1 lines"));
        assert!(frame.contains(HELP_MESSAGE));
        assert!(frame.ends_with("\x1b[1;6H\x1b[?25h"));
    }

    #[test]
    fn message_is_clipped_to_screen_width() {
        let mut e = editor("");
        let mut out = OutputBuffer::new();
        e.draw(&mut out);
        let frame = String::from_utf8_lossy(out.as_bytes()).into_owned();
        assert!(frame.contains(&HELP_MESSAGE[..40]));
        assert!(!frame.contains(HELP_MESSAGE));
    }

    #[test]
    fn expired_message_requests_repaint() {
        let mut e = Editor::new(
            Document::default(),
            Options {
                message_timeout: std::time::Duration::ZERO,
                ..Options::default()
            },
            Size::FALLBACK,
        );
        assert!(e.message_text().is_none());
        e.message_painted = true;
        assert!(e.on_tick());
        let mut out = OutputBuffer::new();
        e.paint(&mut out);
        assert!(!e.on_tick());
    }

    #[test]
    fn resize_changes_text_area() {
        let mut e = editor("");
        e.on_resize(Size { cols: 100, rows: 50 });
        assert_eq!(e.viewport().rows(), 48);
        assert_eq!(e.viewport().cols(), 100);
    }

    #[test]
    fn tab_stop_option_applies_to_document() {
        let doc = Document::from_bytes(b"\tx", 4);
        let e = Editor::new(
            doc,
            Options {
                tab_stop: 8,
                ..Options::default()
            },
            Size::FALLBACK,
        );
        assert_eq!(e.document().row(0).unwrap().render(), b"        x");
    }
}
