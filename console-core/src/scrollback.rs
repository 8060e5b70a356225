//! Scrollback buffer
//!
//! Ordered history of console output, oldest first. Every line except the
//! last one ends in a line break; the last line stays open until a break is
//! printed into it.

use serde::{Deserialize, Serialize};

/// One scrollback entry, including its trailing `\n` once terminated
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    content: String,
}

impl Line {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw content, including the trailing break if any
    pub fn as_str(&self) -> &str {
        &self.content
    }

    /// Content without the trailing break
    pub fn text(&self) -> &str {
        self.content.strip_suffix('\n').unwrap_or(&self.content)
    }

    /// Whether the line ends in a line break
    pub fn is_terminated(&self) -> bool {
        self.content.ends_with('\n')
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

impl From<String> for Line {
    fn from(content: String) -> Self {
        Self { content }
    }
}

/// Growable list of output lines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scrollback {
    lines: Vec<Line>,
}

impl Scrollback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `text`, starting a new line after every `\n`.
    ///
    /// The last line is replaced with a new value each time text is merged
    /// into it. Consumes the text in a loop, so the number of breaks in one
    /// call does not affect stack depth.
    pub fn print(&mut self, text: &str) {
        let mut rest = text;
        loop {
            self.open_last_line();

            let Some(last) = self.lines.last_mut() else {
                return;
            };
            match rest.find('\n') {
                Some(pos) => {
                    let (head, tail) = rest.split_at(pos + 1);
                    *last = Line::from(format!("{}{}", last.content, head));
                    if tail.is_empty() {
                        return;
                    }
                    rest = tail;
                }
                None => {
                    *last = Line::from(format!("{}{}", last.content, rest));
                    return;
                }
            }
        }
    }

    /// Make sure the last line exists and is still open
    fn open_last_line(&mut self) {
        match self.lines.last() {
            Some(last) if !last.is_terminated() => {}
            _ => self.lines.push(Line::new()),
        }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    pub fn last(&self) -> Option<&Line> {
        self.lines.last()
    }

    /// Everything printed so far, as one string
    pub fn text(&self) -> String {
        self.lines.iter().map(Line::as_str).collect()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
