//! Console snapshot for testing and debugging
//!
//! Serializable copy of everything the console shows.

use serde::{Deserialize, Serialize};

use crate::console::{Caret, Console};

/// A complete snapshot of console state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsoleSnapshot {
    /// Scrollback lines without their trailing break
    pub lines: Vec<String>,
    /// Whether the last scrollback line is still open
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub open_line: bool,
    pub prompt: String,
    pub input: String,
    pub cursor: usize,
    /// Text that `yank` would insert
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kill_ring: String,
    /// Caret from the last render
    pub caret: Caret,
}

impl ConsoleSnapshot {
    pub fn from_console(console: &Console) -> Self {
        let scrollback = console.scrollback();
        Self {
            lines: scrollback
                .lines()
                .iter()
                .map(|line| line.text().to_string())
                .collect(),
            open_line: scrollback.last().is_some_and(|line| !line.is_terminated()),
            prompt: console.prompt().to_string(),
            input: console.input().to_string(),
            cursor: console.cursor(),
            kill_ring: console.kill_ring().killed().to_string(),
            caret: console.caret(),
        }
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The visible text: scrollback lines then prompt and input
    pub fn screen_text(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text.push_str(&self.prompt);
        text.push_str(&self.input);
        text
    }
}
