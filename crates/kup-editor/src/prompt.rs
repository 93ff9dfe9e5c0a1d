//! Prompt — a one-line input in the message bar.
//!
//! While a [`Prompt`] is open it receives every key instead of the document.
//! It does the line editing itself and reports to a [`PromptHandler`]:
//! after each key that leaves the prompt open (so search can run as the
//! user types), and once when the prompt closes with Enter or Escape.
//!
//! The editor takes the prompt out of itself while the handler runs, which
//! lets the handler borrow the whole [`Editor`] mutably.

use std::path::PathBuf;

use kup_term::input::{KeyCode, KeyEvent};

use crate::editor::Editor;
use crate::error::Error;

/// How a prompt was closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    /// Enter on a non-empty input.
    Submitted(Vec<u8>),
    /// Escape.
    Cancelled,
}

/// Receives the prompt's input as it changes and when it closes.
pub trait PromptHandler {
    /// Called after every key that did not close the prompt.
    fn on_key(&mut self, _editor: &mut Editor, _input: &[u8], _key: KeyEvent) {}

    /// Called once when the prompt closes.
    fn on_finish(&mut self, editor: &mut Editor, outcome: PromptOutcome);
}

/// An open prompt: a label around the input, and the handler to notify.
pub struct Prompt {
    prefix: String,
    suffix: String,
    input: Vec<u8>,
    handler: Box<dyn PromptHandler>,
}

impl Prompt {
    /// Open a prompt shown as `prefix`, the input, then `suffix`.
    #[must_use]
    pub fn new(
        prefix: impl Into<String>,
        suffix: impl Into<String>,
        handler: Box<dyn PromptHandler>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
            input: Vec::new(),
            handler,
        }
    }

    #[inline]
    #[must_use]
    pub fn input(&self) -> &[u8] {
        &self.input
    }

    /// Text for the message bar.
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "{}{}{}",
            self.prefix,
            String::from_utf8_lossy(&self.input),
            self.suffix
        )
    }

    /// Apply one key to the input line.
    ///
    /// Returns the outcome if the key closes the prompt. Enter on an empty
    /// input does not close it.
    pub fn edit(&mut self, key: KeyEvent) -> Option<PromptOutcome> {
        match key.code {
            KeyCode::Escape => Some(PromptOutcome::Cancelled),
            KeyCode::Enter if !self.input.is_empty() => {
                Some(PromptOutcome::Submitted(self.input.clone()))
            }
            KeyCode::Backspace | KeyCode::Delete => {
                self.input.pop();
                None
            }
            KeyCode::Char(b'h') if key.is_ctrl(b'h') => {
                self.input.pop();
                None
            }
            KeyCode::Char(byte)
                if key.modifiers.is_empty() && (0x20..0x7f).contains(&byte) =>
            {
                self.input.push(byte);
                None
            }
            _ => None,
        }
    }

    /// Feed a key through the prompt and its handler.
    ///
    /// Returns the prompt back if it is still open.
    #[must_use]
    pub fn handle_key(mut self, editor: &mut Editor, key: KeyEvent) -> Option<Self> {
        match self.edit(key) {
            Some(outcome) => {
                self.handler.on_finish(editor, outcome);
                None
            }
            None => {
                self.handler.on_key(editor, &self.input, key);
                Some(self)
            }
        }
    }
}

/// Names an unnamed document and saves it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaveAsHandler;

impl PromptHandler for SaveAsHandler {
    fn on_finish(&mut self, editor: &mut Editor, outcome: PromptOutcome) {
        match outcome {
            PromptOutcome::Submitted(name) => {
                let path = PathBuf::from(String::from_utf8_lossy(&name).into_owned());
                let result = editor.document_mut().save_as(path);
                editor.report_save(result);
            }
            PromptOutcome::Cancelled => editor.report_save(Err(Error::SaveAborted)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Recorder {
        seen: std::rc::Rc<std::cell::RefCell<Vec<String>>>,
    }

    impl PromptHandler for Recorder {
        fn on_key(&mut self, _editor: &mut Editor, input: &[u8], _key: KeyEvent) {
            self.seen
                .borrow_mut()
                .push(String::from_utf8_lossy(input).into_owned());
        }

        fn on_finish(&mut self, _editor: &mut Editor, outcome: PromptOutcome) {
            self.seen.borrow_mut().push(format!("{outcome:?}"));
        }
    }

    fn prompt() -> Prompt {
        Prompt::new("Name: ", " (ESC)", Box::new(SaveAsHandler))
    }

    fn ch(byte: u8) -> KeyEvent {
        KeyEvent::plain(KeyCode::Char(byte))
    }

    #[test]
    fn typing_and_message() {
        let mut p = prompt();
        assert_eq!(p.edit(ch(b'a')), None);
        assert_eq!(p.edit(ch(b'b')), None);
        assert_eq!(p.input(), b"ab");
        assert_eq!(p.message(), "Name: ab (ESC)");
    }

    #[test]
    fn backspace_variants() {
        let mut p = prompt();
        for b in b"abcd" {
            p.edit(ch(*b));
        }
        p.edit(KeyEvent::plain(KeyCode::Backspace));
        p.edit(KeyEvent::plain(KeyCode::Delete));
        p.edit(KeyEvent::ctrl(b'h'));
        assert_eq!(p.input(), b"a");
        p.edit(KeyEvent::plain(KeyCode::Backspace));
        p.edit(KeyEvent::plain(KeyCode::Backspace));
        assert_eq!(p.input(), b"");
    }

    #[test]
    fn control_and_modified_keys_are_not_inserted() {
        let mut p = prompt();
        p.edit(KeyEvent::ctrl(b'x'));
        p.edit(ch(b'\t'));
        p.edit(KeyEvent::plain(KeyCode::Up));
        assert_eq!(p.input(), b"");
    }

    #[test]
    fn enter_requires_input() {
        let mut p = prompt();
        assert_eq!(p.edit(KeyEvent::plain(KeyCode::Enter)), None);
        p.edit(ch(b'x'));
        assert_eq!(
            p.edit(KeyEvent::plain(KeyCode::Enter)),
            Some(PromptOutcome::Submitted(b"x".to_vec()))
        );
    }

    #[test]
    fn escape_cancels() {
        let mut p = prompt();
        p.edit(ch(b'x'));
        assert_eq!(
            p.edit(KeyEvent::plain(KeyCode::Escape)),
            Some(PromptOutcome::Cancelled)
        );
    }

    #[test]
    fn handler_sees_every_key_then_finish() {
        let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut editor = Editor::default();
        let mut p = Some(Prompt::new(
            "",
            "",
            Box::new(Recorder { seen: seen.clone() }),
        ));
        for key in [ch(b'h'), ch(b'i'), KeyEvent::plain(KeyCode::Escape)] {
            p = p.and_then(|p| p.handle_key(&mut editor, key));
        }
        assert!(p.is_none());
        assert_eq!(*seen.borrow(), vec!["h", "hi", "Cancelled"]);
    }
}
