//! Glyph Console Core
//!
//! This crate provides the platform-independent part of a single-line text
//! console overlay:
//! - Scrollback buffer of printed lines
//! - Bounded input line with cursor and a one-slot kill ring
//! - Signal handlers for activate, complete and history navigation
//! - Glyph layout into textured quads
//!
//! Fonts, windows and GPU upload are left to the host, which plugs in through
//! the [`GlyphAtlas`] and [`GeometrySink`] traits. This crate has NO GUI
//! dependencies and can be used headlessly for testing.

pub mod atlas;
pub mod console;
pub mod editor;
mod error;
pub mod geometry;
pub mod layout;
mod line_buffer;
pub mod scrollback;
pub mod signal;
mod snapshot;
pub mod style;

pub use atlas::{FixedAtlas, FontId, FontMetrics, Glyph, GlyphAtlas, TexRect};
pub use console::{Caret, Console, ConsoleConfig, FrameInfo, Handler, Viewport};
pub use editor::{Edit, EditAction, InputEditor, KillRing};
pub use error::{EditError, Result};
pub use geometry::{quad, GeometrySink, Primitive, Vertex, VertexBuffer, QUAD_INDICES};
pub use layout::{BoundingBox, Pen, TextLayout};
pub use line_buffer::{LineBuffer, MAX_INPUT_LENGTH};
pub use scrollback::{Line, Scrollback};
pub use signal::{Signal, SignalDispatcher};
pub use snapshot::ConsoleSnapshot;
pub use style::{FontSet, Rgba, Style, StyleKind, StyleTable};
