//! Glyph layout engine
//!
//! Walks text left to right with a pen, asking the atlas for kerning and
//! glyph metrics, and pushes one textured quad per glyph into a
//! [`GeometrySink`]. Coordinates have y growing upward; the pen sits on the
//! baseline.

use serde::{Deserialize, Serialize};

use crate::atlas::{GlyphAtlas, TexRect};
use crate::geometry::{quad, GeometrySink, QUAD_INDICES};
use crate::style::{Rgba, Style};

/// Running layout position
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pen {
    pub x: f32,
    pub y: f32,
}

impl Pen {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned extent of emitted geometry. `(x, y)` is the bottom-left
/// corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    /// Box spanning two corners given in any order
    pub fn from_corners(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x: x0.min(x1),
            y: y0.min(y1),
            width: (x1 - x0).abs(),
            height: (y1 - y0).abs(),
        }
    }

    /// Zero-size box at a point
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            width: 0.0,
            height: 0.0,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Smallest box containing both
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        BoundingBox {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.top().max(other.top()) - y,
        }
    }
}

/// Grow an optional box
pub(crate) fn extend(bounds: &mut Option<BoundingBox>, other: BoundingBox) {
    *bounds = Some(match bounds {
        Some(current) => current.union(&other),
        None => other,
    });
}

/// Pen plus counters for one layout pass
#[derive(Debug, Clone, Default)]
pub struct TextLayout {
    pub pen: Pen,
    quads: usize,
}

impl TextLayout {
    pub fn new(pen: Pen) -> Self {
        Self { pen, quads: 0 }
    }

    /// Quads pushed so far
    pub fn quad_count(&self) -> usize {
        self.quads
    }

    /// Lay out one character.
    ///
    /// `previous` is the preceding character of the same run, used for
    /// kerning. Returns the glyph's box, or `None` when the atlas has no glyph
    /// for `current`, in which case nothing is emitted and the pen stays put.
    pub fn add_glyph<A, S>(
        &mut self,
        atlas: &mut A,
        sink: &mut S,
        style: &Style,
        current: char,
        previous: Option<char>,
    ) -> Option<BoundingBox>
    where
        A: GlyphAtlas + ?Sized,
        S: GeometrySink + ?Sized,
    {
        let glyph = atlas.glyph(style.font, current)?;
        if let Some(previous) = previous {
            self.pen.x += atlas.kerning(style.font, previous, current);
        }

        let x0 = self.pen.x + glyph.offset_x;
        let y0 = self.pen.y + glyph.offset_y + style.rise;
        let x1 = x0 + glyph.width;
        let y1 = y0 - glyph.height;
        sink.push_quad(&quad(x0, y0, x1, y1, glyph.tex, style.foreground), &QUAD_INDICES);
        self.quads += 1;

        self.pen.x += glyph.advance_x + style.spacing;
        self.pen.y += glyph.advance_y;
        Some(BoundingBox::from_corners(x0, y0, x1, y1))
    }

    /// Lay out `text` as one kerned run and return the box of its glyphs.
    ///
    /// The box starts from the first glyph actually emitted. A run that emits
    /// nothing yields a zero-size box at the starting pen.
    pub fn add_text<A, S>(&mut self, atlas: &mut A, sink: &mut S, style: &Style, text: &str) -> BoundingBox
    where
        A: GlyphAtlas + ?Sized,
        S: GeometrySink + ?Sized,
    {
        self.add_run(atlas, sink, style, text, |_, _| {})
    }

    /// Like [`add_text`](Self::add_text), calling `after_glyph(index, pen)`
    /// once per character after it has been laid out (or skipped).
    pub fn add_run<A, S, F>(
        &mut self,
        atlas: &mut A,
        sink: &mut S,
        style: &Style,
        text: &str,
        mut after_glyph: F,
    ) -> BoundingBox
    where
        A: GlyphAtlas + ?Sized,
        S: GeometrySink + ?Sized,
        F: FnMut(usize, &Pen),
    {
        let start = self.pen;
        let mut bounds = None;
        let mut previous = None;

        for (index, current) in text.chars().enumerate() {
            if let Some(glyph_box) = self.add_glyph(atlas, sink, style, current, previous) {
                extend(&mut bounds, glyph_box);
            }
            previous = Some(current);
            after_glyph(index, &self.pen);
        }

        if bounds.is_some() && style.has_decorations() {
            self.add_decorations(atlas, sink, style, start, self.pen.x);
        }

        bounds.unwrap_or_else(|| BoundingBox::at(start.x, start.y))
    }

    /// Underline, overline and strikethrough bars spanning `start.x..end_x`
    fn add_decorations<A, S>(&mut self, atlas: &mut A, sink: &mut S, style: &Style, start: Pen, end_x: f32)
    where
        A: GlyphAtlas + ?Sized,
        S: GeometrySink + ?Sized,
    {
        let metrics = atlas.metrics(style.font);
        let tex = atlas.caret_cell(style.font);
        let thickness = metrics.underline_thickness.max(1.0);
        let baseline = start.y + style.rise;

        let bars = [
            (style.underline, baseline + metrics.underline_position, style.underline_color),
            (style.overline, baseline + metrics.ascender, style.overline_color),
            (
                style.strikethrough,
                baseline + metrics.ascender * 0.33,
                style.strikethrough_color,
            ),
        ];
        for (enabled, y, color) in bars {
            if enabled {
                self.add_rect(sink, start.x, y, end_x, y - thickness, tex, color);
            }
        }
    }

    /// Push a flat quad that does not move the pen
    #[allow(clippy::too_many_arguments)]
    pub fn add_rect<S>(&mut self, sink: &mut S, x0: f32, y0: f32, x1: f32, y1: f32, tex: TexRect, color: Rgba)
    where
        S: GeometrySink + ?Sized,
    {
        sink.push_quad(&quad(x0, y0, x1, y1, tex, color), &QUAD_INDICES);
        self.quads += 1;
    }
}
