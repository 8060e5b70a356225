//! Error types for input line edits

use thiserror::Error;

/// Reasons an edit of the input line is rejected.
///
/// A rejected edit leaves the line untouched; the console reports it to the
/// log and carries on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// The edit would grow the line past its capacity
    #[error("Input buffer is full ({len} + {additional} exceeds {capacity} characters)")]
    CapacityExceeded {
        len: usize,
        additional: usize,
        capacity: usize,
    },

    /// Edit position past the end of the line
    #[error("Position {pos} is out of bounds (line length {len})")]
    OutOfBounds { pos: usize, len: usize },

    /// Only single-byte code units are accepted on the input line
    #[error("Character {0:?} is not a single-byte code unit")]
    NotSingleByte(char),
}

/// Result type for input line edits
pub type Result<T> = std::result::Result<T, EditError>;
