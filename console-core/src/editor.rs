//! Input editor
//!
//! State machine over the live input line: a bounded [`LineBuffer`], a cursor
//! offset and a one-slot [`KillRing`]. Every transition keeps
//! `cursor <= len <= capacity`.

use serde::{Deserialize, Serialize};

use crate::error::{EditError, Result};
use crate::line_buffer::{LineBuffer, MAX_INPUT_LENGTH};
use crate::signal::Signal;

/// Named edit actions delivered by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditAction {
    /// Insert a character at the cursor
    Type(char),
    Enter,
    Left,
    Right,
    Backspace,
    Delete,
    /// Cut from the cursor to the end of the line
    Kill,
    /// Paste the last killed text at the cursor
    Yank,
    Home,
    End,
    /// Clear the scrollback
    Clear,
    HistoryPrev,
    HistoryNext,
    Complete,
}

impl EditAction {
    /// Parse an action name; `type` needs a key
    pub fn from_name(name: &str, key: Option<char>) -> Option<Self> {
        let action = match name {
            "type" => EditAction::Type(key?),
            "enter" => EditAction::Enter,
            "left" => EditAction::Left,
            "right" => EditAction::Right,
            "backspace" => EditAction::Backspace,
            "delete" => EditAction::Delete,
            "kill" => EditAction::Kill,
            "yank" => EditAction::Yank,
            "home" => EditAction::Home,
            "end" => EditAction::End,
            "clear" => EditAction::Clear,
            "history-prev" => EditAction::HistoryPrev,
            "history-next" => EditAction::HistoryNext,
            "complete" => EditAction::Complete,
            _ => return None,
        };
        Some(action)
    }

    pub fn name(&self) -> &'static str {
        match self {
            EditAction::Type(_) => "type",
            EditAction::Enter => "enter",
            EditAction::Left => "left",
            EditAction::Right => "right",
            EditAction::Backspace => "backspace",
            EditAction::Delete => "delete",
            EditAction::Kill => "kill",
            EditAction::Yank => "yank",
            EditAction::Home => "home",
            EditAction::End => "end",
            EditAction::Clear => "clear",
            EditAction::HistoryPrev => "history-prev",
            EditAction::HistoryNext => "history-next",
            EditAction::Complete => "complete",
        }
    }
}

/// Outcome of one [`InputEditor::apply`] call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// The line content changed
    Edited,
    /// Only the cursor moved
    Moved,
    /// Nothing to do at this position
    Ignored,
    /// The edit was refused; the line is unchanged
    Rejected(EditError),
    /// The line was submitted
    Activate,
    /// A handler should be invoked
    Signal(Signal),
    /// The scrollback should be cleared
    ClearScrollback,
}

/// Single-slot kill ring.
///
/// Keeps the line as it stood when it was killed and the offset of the cut;
/// [`killed`](Self::killed) is the part that was removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillRing {
    line: String,
    cut: usize,
}

impl KillRing {
    /// The whole line at the time of the kill
    pub fn line(&self) -> &str {
        &self.line
    }

    /// The text removed by the kill, inserted again by yank
    pub fn killed(&self) -> &str {
        &self.line[self.cut..]
    }

    pub fn is_empty(&self) -> bool {
        self.killed().is_empty()
    }
}

/// Editable input line with cursor and kill ring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEditor {
    buffer: LineBuffer,
    cursor: usize,
    kill_ring: KillRing,
}

impl InputEditor {
    pub fn new() -> Self {
        Self::with_capacity(MAX_INPUT_LENGTH)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: LineBuffer::with_capacity(capacity),
            cursor: 0,
            kill_ring: KillRing::default(),
        }
    }

    pub fn input(&self) -> &str {
        self.buffer.as_str()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    pub fn kill_ring(&self) -> &KillRing {
        &self.kill_ring
    }

    /// Apply one action
    pub fn apply(&mut self, action: EditAction) -> Edit {
        match action {
            EditAction::Type(c) => self.insert_char(c),
            EditAction::Enter => Edit::Activate,
            EditAction::Left => {
                if self.cursor == 0 {
                    return Edit::Ignored;
                }
                self.cursor -= 1;
                Edit::Moved
            }
            EditAction::Right => {
                if self.cursor >= self.len() {
                    return Edit::Ignored;
                }
                self.cursor += 1;
                Edit::Moved
            }
            EditAction::Backspace => {
                if self.cursor == 0 {
                    return Edit::Ignored;
                }
                self.buffer.remove_range(self.cursor - 1, 1);
                self.cursor -= 1;
                Edit::Edited
            }
            EditAction::Delete => {
                if self.cursor >= self.len() {
                    return Edit::Ignored;
                }
                self.buffer.remove_range(self.cursor, 1);
                Edit::Edited
            }
            EditAction::Kill => self.kill(),
            EditAction::Yank => self.yank(),
            EditAction::Home => {
                self.cursor = 0;
                Edit::Moved
            }
            EditAction::End => {
                self.cursor = self.len();
                Edit::Moved
            }
            EditAction::Clear => Edit::ClearScrollback,
            EditAction::HistoryPrev => Edit::Signal(Signal::HistoryPrev),
            EditAction::HistoryNext => Edit::Signal(Signal::HistoryNext),
            EditAction::Complete => Edit::Signal(Signal::Complete),
        }
    }

    fn insert_char(&mut self, c: char) -> Edit {
        let mut utf8 = [0u8; 4];
        match self.buffer.insert_at(self.cursor, c.encode_utf8(&mut utf8)) {
            Ok(()) => {
                self.cursor += 1;
                Edit::Edited
            }
            Err(err) => Edit::Rejected(err),
        }
    }

    fn kill(&mut self) -> Edit {
        if self.cursor >= self.len() {
            return Edit::Ignored;
        }

        self.kill_ring = KillRing {
            line: self.buffer.as_str().to_owned(),
            cut: self.cursor,
        };
        self.buffer.truncate(self.cursor);
        log::debug!("Kill ring: {:?}", self.kill_ring.killed());
        Edit::Edited
    }

    fn yank(&mut self) -> Edit {
        let killed = self.kill_ring.killed();
        if killed.is_empty() {
            return Edit::Ignored;
        }
        if self.buffer.len() + killed.len() >= self.buffer.capacity() {
            log::debug!("Yank dropped: {} characters would overflow the input", killed.len());
            return Edit::Ignored;
        }

        match self.buffer.insert_at(self.cursor, killed) {
            Ok(()) => {
                self.cursor += killed.len();
                Edit::Edited
            }
            Err(err) => Edit::Rejected(err),
        }
    }

    /// Replace the line and put the cursor at its end
    pub fn set_input(&mut self, text: &str) -> Result<()> {
        self.buffer.set(text)?;
        self.cursor = self.buffer.len();
        Ok(())
    }

    /// Move the cursor, clamped to the line
    pub fn set_cursor(&mut self, pos: usize) {
        self.cursor = pos.min(self.len());
    }

    /// Take the line content, leaving it empty with the cursor at 0
    pub fn take_input(&mut self) -> String {
        self.cursor = 0;
        self.buffer.truncate(0)
    }

    /// Pull the cursor back inside the line
    pub fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.len());
    }
}

impl Default for InputEditor {
    fn default() -> Self {
        Self::new()
    }
}
