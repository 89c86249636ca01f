#![forbid(unsafe_code)]

//! Input line controller: edit buffer, history, and autocomplete.
//!
//! Editing happens at the end of the line only. The suggestion is always an
//! ordinary command; secret commands are never offered.

use unicode_segmentation::UnicodeSegmentation;

use crate::command::{Command, completions};

#[derive(Debug, Clone, Default)]
pub struct InputLine {
    buffer: String,
    history: Vec<String>,
    /// `history.len()` means "past the newest entry".
    history_index: usize,
    suggestion: Option<Command>,
    tab_matches: Vec<Command>,
    tab_index: usize,
}

impl InputLine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.buffer
    }

    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Current ghost suggestion, if visible.
    #[must_use]
    pub fn suggestion(&self) -> Option<Command> {
        self.suggestion
    }

    /// Part of the suggestion not yet typed, for drawing after the cursor.
    #[must_use]
    pub fn ghost_suffix(&self) -> Option<&'static str> {
        let name = self.suggestion?.name();
        let typed = self.buffer.to_lowercase();
        name.strip_prefix(typed.as_str()).filter(|rest| !rest.is_empty())
    }

    pub fn insert_char(&mut self, ch: char) {
        self.buffer.push(ch);
        self.refresh_suggestion();
    }

    pub fn insert_str(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.refresh_suggestion();
    }

    /// Remove the last grapheme.
    pub fn backspace(&mut self) {
        if let Some((idx, _)) = self.buffer.grapheme_indices(true).next_back() {
            self.buffer.truncate(idx);
        }
        self.refresh_suggestion();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.clear_suggestion();
    }

    /// Up arrow: step to an older entry, stopping at the oldest.
    pub fn history_prev(&mut self) {
        if self.history.is_empty() {
            return;
        }
        self.history_index = self.history_index.saturating_sub(1);
        self.buffer.clone_from(&self.history[self.history_index]);
        self.clear_suggestion();
    }

    /// Down arrow: step to a newer entry; past the newest clears the line.
    pub fn history_next(&mut self) {
        if self.history.is_empty() {
            return;
        }
        self.history_index += 1;
        if self.history_index >= self.history.len() {
            self.history_index = self.history.len();
            self.buffer.clear();
        } else {
            self.buffer.clone_from(&self.history[self.history_index]);
        }
        self.clear_suggestion();
    }

    /// Tab: show the single match, or cycle while the match set is unchanged.
    pub fn tab(&mut self) {
        let typed = self.normalized();
        let matches = completions(&typed);
        match matches.len() {
            0 => {}
            1 => {
                self.tab_matches.clear();
                self.set_suggestion(matches[0]);
            }
            _ => {
                if self.tab_matches == matches {
                    self.tab_index = (self.tab_index + 1) % self.tab_matches.len();
                } else {
                    self.tab_matches = matches;
                    self.tab_index = 0;
                }
                let pick = self.tab_matches[self.tab_index];
                self.set_suggestion(pick);
            }
        }
    }

    /// Space: accept a visible suggestion without submitting. Returns
    /// `false` (and inserts a space) when there was nothing to accept.
    pub fn space(&mut self) -> bool {
        if self.accept_suggestion() {
            return true;
        }
        self.insert_char(' ');
        false
    }

    /// Enter: accept a visible suggestion, then submit.
    pub fn enter(&mut self) -> Option<String> {
        self.accept_suggestion();
        self.submit()
    }

    /// Take the trimmed line. Whitespace-only lines are ignored and left in
    /// place.
    pub fn submit(&mut self) -> Option<String> {
        let line = self.buffer.trim().to_string();
        if line.is_empty() {
            return None;
        }
        self.history.push(line.clone());
        self.history_index = self.history.len();
        self.buffer.clear();
        self.clear_suggestion();
        Some(line)
    }

    fn accept_suggestion(&mut self) -> bool {
        let Some(cmd) = self.suggestion else {
            return false;
        };
        self.buffer = cmd.name().to_string();
        self.clear_suggestion();
        true
    }

    fn normalized(&self) -> String {
        self.buffer.trim().to_lowercase()
    }

    fn refresh_suggestion(&mut self) {
        self.clear_suggestion();
        let typed = self.normalized();
        if typed.is_empty() {
            return;
        }
        if let Some(first) = completions(&typed).into_iter().next()
            && first.name() != typed
        {
            self.suggestion = Some(first);
        }
    }

    fn set_suggestion(&mut self, cmd: Command) {
        // A suggestion equal to the typed text is not shown.
        self.suggestion = (cmd.name() != self.buffer).then_some(cmd);
    }

    fn clear_suggestion(&mut self) {
        self.suggestion = None;
        self.tab_matches.clear();
        self.tab_index = 0;
    }
}
