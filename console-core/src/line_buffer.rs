//! Bounded line buffer
//!
//! Storage for the input line. Positions are byte offsets; since only ASCII is
//! accepted they are also character offsets.

use crate::error::{EditError, Result};

/// Default capacity of the input line
pub const MAX_INPUT_LENGTH: usize = 511;

/// Single line of ASCII text that never grows past its capacity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBuffer {
    text: String,
    capacity: usize,
}

impl LineBuffer {
    /// Empty buffer holding at most [`MAX_INPUT_LENGTH`] characters
    pub fn new() -> Self {
        Self::with_capacity(MAX_INPUT_LENGTH)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            text: String::with_capacity(capacity),
            capacity,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    /// Insert `text` so that it starts at `pos`
    pub fn insert_at(&mut self, pos: usize, text: &str) -> Result<()> {
        if pos > self.len() {
            return Err(EditError::OutOfBounds {
                pos,
                len: self.len(),
            });
        }
        Self::check_single_byte(text)?;
        self.check_room(text.len())?;

        self.text.insert_str(pos, text);
        Ok(())
    }

    /// Remove up to `len` characters starting at `pos` and return them.
    ///
    /// The range is clipped to the end of the line.
    pub fn remove_range(&mut self, pos: usize, len: usize) -> String {
        if pos >= self.len() {
            return String::new();
        }
        let end = pos.saturating_add(len).min(self.len());
        self.text.drain(pos..end).collect()
    }

    /// Keep the first `len` characters and return the rest
    pub fn truncate(&mut self, len: usize) -> String {
        if len >= self.len() {
            return String::new();
        }
        self.text.split_off(len)
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Replace the whole content
    pub fn set(&mut self, text: &str) -> Result<()> {
        Self::check_single_byte(text)?;
        if text.len() > self.capacity {
            return Err(EditError::CapacityExceeded {
                len: 0,
                additional: text.len(),
                capacity: self.capacity,
            });
        }

        self.text.clear();
        self.text.push_str(text);
        Ok(())
    }

    fn check_room(&self, additional: usize) -> Result<()> {
        if self.len() + additional > self.capacity {
            return Err(EditError::CapacityExceeded {
                len: self.len(),
                additional,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    fn check_single_byte(text: &str) -> Result<()> {
        match text.chars().find(|c| !c.is_ascii()) {
            Some(c) => Err(EditError::NotSingleByte(c)),
            None => Ok(()),
        }
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}
