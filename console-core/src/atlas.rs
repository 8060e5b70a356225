//! Glyph atlas contract
//!
//! The console does not rasterize fonts. It asks a [`GlyphAtlas`] for glyph
//! metrics, kerning and sub-texture coordinates and treats the answers as
//! opaque. [`FixedAtlas`] is a synthetic monospace implementation used for
//! headless runs, benchmarks and tests.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Handle to a font face owned by the atlas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FontId(pub u32);

/// Normalized sub-rectangle of the atlas texture
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TexRect {
    pub s0: f32,
    pub t0: f32,
    pub s1: f32,
    pub t1: f32,
}

impl TexRect {
    pub const fn new(s0: f32, t0: f32, s1: f32, t1: f32) -> Self {
        Self { s0, t0, s1, t1 }
    }
}

/// Placement metrics of one rasterized glyph
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Glyph {
    /// Horizontal distance from the pen to the bitmap's left edge
    pub offset_x: f32,
    /// Vertical distance from the baseline to the bitmap's top edge
    pub offset_y: f32,
    pub width: f32,
    pub height: f32,
    pub advance_x: f32,
    pub advance_y: f32,
    pub tex: TexRect,
}

/// Per-face vertical metrics
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FontMetrics {
    /// Row height including the line gap
    pub height: f32,
    pub line_gap: f32,
    /// Distance from baseline to the top of the tallest glyph
    pub ascender: f32,
    /// Distance from baseline to the lowest descent (negative)
    pub descender: f32,
    /// Offset of the underline from the baseline (negative is below)
    pub underline_position: f32,
    pub underline_thickness: f32,
}

impl FontMetrics {
    /// Distance between two consecutive baselines
    pub fn line_height(&self) -> f32 {
        self.height - self.line_gap
    }
}

/// Source of glyph geometry for the layout engine
pub trait GlyphAtlas {
    /// Vertical metrics of `font`
    fn metrics(&self, font: FontId) -> FontMetrics;

    /// Look up (and rasterize on first use) the glyph for `c`.
    ///
    /// Returns `None` when the face has no glyph for the character; layout
    /// skips such characters without moving the pen.
    fn glyph(&mut self, font: FontId, c: char) -> Option<Glyph>;

    /// Horizontal adjustment between `previous` and `current`
    fn kerning(&self, font: FontId, previous: char, current: char) -> f32;

    /// Atlas cell that rasterizes as fully covered, used for the caret and
    /// line decorations
    fn caret_cell(&self, font: FontId) -> TexRect;
}

/// Cells per row of the synthetic atlas grid
const GRID: u32 = 16;

/// Synthetic monospace atlas with fixed metrics.
///
/// Every printable ASCII character maps to one cell of a 16x16 grid; cell 0
/// is reserved for the caret. Faces are not distinguished, all fonts share
/// the same metrics.
#[derive(Debug, Clone)]
pub struct FixedAtlas {
    advance: f32,
    metrics: FontMetrics,
    kerning: HashMap<(char, char), f32>,
    missing: HashSet<char>,
}

impl FixedAtlas {
    /// Atlas with `advance` pixels per character and rows `height` pixels tall
    pub fn new(advance: f32, height: f32) -> Self {
        Self {
            advance,
            metrics: FontMetrics {
                height,
                line_gap: 0.0,
                ascender: (height * 0.8).round(),
                descender: -(height * 0.2).round(),
                underline_position: -(height * 0.1).round(),
                underline_thickness: 1.0,
            },
            kerning: HashMap::new(),
            missing: HashSet::new(),
        }
    }

    /// Add a kerning pair
    pub fn with_kerning(mut self, previous: char, current: char, amount: f32) -> Self {
        self.kerning.insert((previous, current), amount);
        self
    }

    /// Pretend the face has no glyph for `c`
    pub fn without_glyph(mut self, c: char) -> Self {
        self.missing.insert(c);
        self
    }

    /// Replace the line gap
    pub fn with_line_gap(mut self, line_gap: f32) -> Self {
        self.metrics.line_gap = line_gap;
        self
    }

    pub fn advance(&self) -> f32 {
        self.advance
    }

    fn cell(index: u32) -> TexRect {
        let size = 1.0 / GRID as f32;
        let s0 = (index % GRID) as f32 * size;
        let t0 = (index / GRID) as f32 * size;
        TexRect::new(s0, t0, s0 + size, t0 + size)
    }
}

impl Default for FixedAtlas {
    fn default() -> Self {
        Self::new(8.0, 16.0)
    }
}

impl GlyphAtlas for FixedAtlas {
    fn metrics(&self, _font: FontId) -> FontMetrics {
        self.metrics
    }

    fn glyph(&mut self, _font: FontId, c: char) -> Option<Glyph> {
        if !c.is_ascii() || c.is_ascii_control() || self.missing.contains(&c) {
            return None;
        }

        Some(Glyph {
            offset_x: 0.0,
            offset_y: self.metrics.ascender,
            width: self.advance,
            height: self.metrics.ascender - self.metrics.descender,
            advance_x: self.advance,
            advance_y: 0.0,
            tex: Self::cell(c as u32),
        })
    }

    fn kerning(&self, _font: FontId, previous: char, current: char) -> f32 {
        self.kerning
            .get(&(previous, current))
            .copied()
            .unwrap_or(0.0)
    }

    fn caret_cell(&self, _font: FontId) -> TexRect {
        Self::cell(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_height() {
        let metrics = FontMetrics {
            height: 16.0,
            line_gap: 2.0,
            ..Default::default()
        };
        assert_eq!(metrics.line_height(), 14.0);
    }

    #[test]
    fn test_fixed_atlas_glyphs() {
        let mut atlas = FixedAtlas::new(8.0, 16.0);
        let glyph = atlas.glyph(FontId(0), 'A').unwrap();
        assert_eq!(glyph.advance_x, 8.0);
        assert_eq!(glyph.width, 8.0);
        assert_eq!(glyph.offset_y, 13.0);
        assert_eq!(glyph.height, 16.0);

        // 'A' is 65: row 4, column 1
        assert_eq!(glyph.tex, TexRect::new(1.0 / 16.0, 4.0 / 16.0, 2.0 / 16.0, 5.0 / 16.0));
    }

    #[test]
    fn test_fixed_atlas_missing_glyphs() {
        let mut atlas = FixedAtlas::default().without_glyph('x');
        assert!(atlas.glyph(FontId(0), 'x').is_none());
        assert!(atlas.glyph(FontId(0), '\n').is_none());
        assert!(atlas.glyph(FontId(0), 'é').is_none());
        assert!(atlas.glyph(FontId(0), 'y').is_some());
    }

    #[test]
    fn test_fixed_atlas_kerning() {
        let atlas = FixedAtlas::default().with_kerning('A', 'V', -2.0);
        assert_eq!(atlas.kerning(FontId(0), 'A', 'V'), -2.0);
        assert_eq!(atlas.kerning(FontId(0), 'V', 'A'), 0.0);
    }

    #[test]
    fn test_caret_cell_is_reserved() {
        let mut atlas = FixedAtlas::default();
        let caret = atlas.caret_cell(FontId(0));
        for c in ' '..='~' {
            assert_ne!(atlas.glyph(FontId(0), c).unwrap().tex, caret);
        }
    }
}
