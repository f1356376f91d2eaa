//! Code editor surface
//!
//! Tracks the caret of a plain-text editor and implements the one key binding
//! codesnap overrides: Tab inserts the configured indentation at the caret
//! instead of moving focus. Offsets are in chars, not bytes.

use crate::settings::TabSize;

/// Keys the editor distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Tab,
    Enter,
    Backspace,
    Char(char),
    Other,
}

/// Whether the editor consumed a key or left it to default handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editor {
    selection_start: usize,
    selection_end: usize,
    focused: bool,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Editor { selection_start: 0, selection_end: 0, focused: true }
    }

    pub fn caret(&self) -> usize {
        self.selection_end
    }

    pub fn selection(&self) -> (usize, usize) {
        (self.selection_start, self.selection_end)
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    /// Select `start..end` in `text`, clamped to its length.
    pub fn select(&mut self, text: &str, start: usize, end: usize) {
        let len = text.chars().count();
        let (start, end) = (start.min(len), end.min(len));
        self.selection_start = start.min(end);
        self.selection_end = end.max(start);
    }

    pub fn set_caret(&mut self, text: &str, pos: usize) {
        self.select(text, pos, pos);
    }

    /// Replace the whole text, as a paste or native edit would.
    pub fn input(&mut self, text: &mut String, new_text: impl Into<String>) {
        *text = new_text.into();
        let (start, end) = self.selection();
        self.select(text, start, end);
    }

    /// Handle a key press against `text`.
    ///
    /// Tab inserts `tab` at the selection start without replacing the
    /// selection and collapses the caret after the inserted run.
    pub fn key_down(&mut self, key: Key, text: &mut String, tab: TabSize) -> KeyOutcome {
        match key {
            Key::Tab => {
                let at = self.selection_start.min(text.chars().count());
                text.insert_str(byte_offset(text, at), tab.as_str());
                let caret = at + tab.width();
                self.selection_start = caret;
                self.selection_end = caret;
                KeyOutcome::Handled
            }
            _ => KeyOutcome::Default,
        }
    }
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices().nth(chars).map(|(i, _)| i).unwrap_or(text.len())
}
