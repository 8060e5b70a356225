//! Style table
//!
//! A fixed, indexed set of eight visual styles. Every piece of text the
//! console lays out picks one of these: the scrollback is faint, the prompt
//! is bold and the input line is normal.

use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::atlas::FontId;

/// RGBA color with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);
    /// Fully transparent (the blue channel is kept from the classic markup "none")
    pub const NONE: Rgba = Rgba::new(0.0, 0.0, 1.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from 8-bit channels
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 && hex.len() != 8 {
            return None;
        }

        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        let mut color = Self::from_rgb8(channel(0)?, channel(2)?, channel(4)?);
        if hex.len() == 8 {
            color.a = channel(6)? as f32 / 255.0;
        }
        Some(color)
    }

    /// Same color with the RGB channels replaced by a gray level
    pub fn with_gray(self, level: f32) -> Self {
        Self::new(level, level, level, self.a)
    }
}

/// The eight style categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleKind {
    Normal,
    Error,
    Warning,
    Output,
    Bold,
    Italic,
    BoldItalic,
    Faint,
}

impl StyleKind {
    /// `default` is an alias of `normal`
    pub const DEFAULT: StyleKind = StyleKind::Normal;

    pub const COUNT: usize = 8;

    pub const ALL: [StyleKind; StyleKind::COUNT] = [
        StyleKind::Normal,
        StyleKind::Error,
        StyleKind::Warning,
        StyleKind::Output,
        StyleKind::Bold,
        StyleKind::Italic,
        StyleKind::BoldItalic,
        StyleKind::Faint,
    ];

    /// Position in the style table
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            StyleKind::Normal => "normal",
            StyleKind::Error => "error",
            StyleKind::Warning => "warning",
            StyleKind::Output => "output",
            StyleKind::Bold => "bold",
            StyleKind::Italic => "italic",
            StyleKind::BoldItalic => "bold-italic",
            StyleKind::Faint => "faint",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "normal" | "default" => Some(StyleKind::Normal),
            "error" => Some(StyleKind::Error),
            "warning" => Some(StyleKind::Warning),
            "output" => Some(StyleKind::Output),
            "bold" => Some(StyleKind::Bold),
            "italic" => Some(StyleKind::Italic),
            "bold-italic" => Some(StyleKind::BoldItalic),
            "faint" => Some(StyleKind::Faint),
            _ => None,
        }
    }
}

/// A named bundle of font and color/decoration attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    /// Font resource owned by the glyph atlas
    pub font: FontId,
    /// Nominal size in pixels
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
    /// Vertical baseline shift
    pub rise: f32,
    /// Extra horizontal spacing
    pub spacing: f32,
    pub gamma: f32,
    pub foreground: Rgba,
    pub background: Rgba,
    pub underline: bool,
    pub underline_color: Rgba,
    pub overline: bool,
    pub overline_color: Rgba,
    pub strikethrough: bool,
    pub strikethrough_color: Rgba,
}

impl Style {
    /// Plain style for `font` with the given foreground
    pub fn plain(font: FontId, foreground: Rgba) -> Self {
        Self {
            font,
            size: 13.0,
            bold: false,
            italic: false,
            rise: 0.0,
            spacing: 0.0,
            gamma: 1.0,
            foreground,
            background: Rgba::NONE,
            underline: false,
            underline_color: Rgba::WHITE,
            overline: false,
            overline_color: Rgba::WHITE,
            strikethrough: false,
            strikethrough_color: Rgba::WHITE,
        }
    }

    /// Whether any line decoration is enabled
    pub fn has_decorations(&self) -> bool {
        self.underline || self.overline || self.strikethrough
    }
}

/// Font faces used by the style table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FontSet {
    pub regular: FontId,
    pub bold: FontId,
    pub italic: FontId,
    pub bold_italic: FontId,
}

impl FontSet {
    /// Use the same face for every variant
    pub fn single(font: FontId) -> Self {
        Self {
            regular: font,
            bold: font,
            italic: font,
            bold_italic: font,
        }
    }
}

/// Fixed table of styles indexed by [`StyleKind`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleTable {
    styles: [Style; StyleKind::COUNT],
}

impl StyleTable {
    /// Dark text on a light background
    pub fn new(fonts: FontSet) -> Self {
        Self::with_palette(fonts, Rgba::BLACK, 0.35)
    }

    /// Light text on a dark background
    pub fn dark(fonts: FontSet) -> Self {
        Self::with_palette(fonts, Rgba::WHITE, 0.65)
    }

    /// Build the table from a base foreground and the gray level of faint text
    pub fn with_palette(fonts: FontSet, foreground: Rgba, faint_level: f32) -> Self {
        let normal = Style::plain(fonts.regular, foreground);

        let bold = Style {
            font: fonts.bold,
            bold: true,
            ..normal.clone()
        };
        let italic = Style {
            font: fonts.italic,
            italic: true,
            ..normal.clone()
        };
        let bold_italic = Style {
            font: fonts.bold_italic,
            bold: true,
            italic: true,
            ..normal.clone()
        };
        let faint = Style {
            foreground: foreground.with_gray(faint_level),
            ..normal.clone()
        };
        let error = Style {
            foreground: Rgba::new(1.0, 0.0, 0.0, foreground.a),
            ..normal.clone()
        };
        let warning = Style {
            foreground: Rgba::new(1.0, 0.5, 0.5, foreground.a),
            ..normal.clone()
        };
        let output = Style {
            foreground: Rgba::new(0.0, 0.0, 1.0, foreground.a),
            ..normal.clone()
        };

        Self {
            styles: [normal, error, warning, output, bold, italic, bold_italic, faint],
        }
    }

    pub fn get(&self, kind: StyleKind) -> &Style {
        &self.styles[kind.index()]
    }

    /// Replace one entry; takes effect from the next frame
    pub fn set(&mut self, kind: StyleKind, style: Style) {
        self.styles[kind.index()] = style;
    }

    pub fn iter(&self) -> impl Iterator<Item = (StyleKind, &Style)> {
        StyleKind::ALL.iter().map(move |&kind| (kind, self.get(kind)))
    }
}

impl Default for StyleTable {
    fn default() -> Self {
        Self::new(FontSet::default())
    }
}

impl Index<StyleKind> for StyleTable {
    type Output = Style;

    fn index(&self, kind: StyleKind) -> &Style {
        self.get(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fonts() -> FontSet {
        FontSet {
            regular: FontId(0),
            bold: FontId(1),
            italic: FontId(2),
            bold_italic: FontId(3),
        }
    }

    #[test]
    fn test_style_kind_indices() {
        for (i, kind) in StyleKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
        assert_eq!(StyleKind::DEFAULT, StyleKind::Normal);
    }

    #[test]
    fn test_style_kind_names() {
        for kind in StyleKind::ALL {
            assert_eq!(StyleKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(StyleKind::from_name("default"), Some(StyleKind::Normal));
        assert_eq!(StyleKind::from_name("blink"), None);
    }

    #[test]
    fn test_table_fonts() {
        let table = StyleTable::new(fonts());
        assert_eq!(table[StyleKind::Normal].font, FontId(0));
        assert_eq!(table[StyleKind::Bold].font, FontId(1));
        assert_eq!(table[StyleKind::Italic].font, FontId(2));
        assert_eq!(table[StyleKind::BoldItalic].font, FontId(3));
        assert_eq!(table[StyleKind::Faint].font, FontId(0));
        assert!(table[StyleKind::BoldItalic].bold);
        assert!(table[StyleKind::BoldItalic].italic);
    }

    #[test]
    fn test_table_colors() {
        let table = StyleTable::new(fonts());
        assert_eq!(table[StyleKind::Normal].foreground, Rgba::BLACK);
        assert_eq!(table[StyleKind::Error].foreground, Rgba::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(table[StyleKind::Output].foreground, Rgba::new(0.0, 0.0, 1.0, 1.0));
        let faint = table[StyleKind::Faint].foreground;
        assert_eq!((faint.r, faint.g, faint.b), (0.35, 0.35, 0.35));

        let dark = StyleTable::dark(fonts());
        assert_eq!(dark[StyleKind::Normal].foreground, Rgba::WHITE);
    }

    #[test]
    fn test_set_replaces_entry() {
        let mut table = StyleTable::new(fonts());
        let mut style = table[StyleKind::Output].clone();
        style.underline = true;
        table.set(StyleKind::Output, style);
        assert!(table[StyleKind::Output].has_decorations());
        assert!(!table[StyleKind::Normal].has_decorations());
    }

    #[test]
    fn test_rgba_from_hex() {
        assert_eq!(Rgba::from_hex("#ffffff"), Some(Rgba::WHITE));
        assert_eq!(Rgba::from_hex("000000"), Some(Rgba::BLACK));
        let half = Rgba::from_hex("#ff000080").unwrap();
        assert_eq!(half.r, 1.0);
        assert!((half.a - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(Rgba::from_hex("#fff"), None);
        assert_eq!(Rgba::from_hex("#gg0000"), None);
    }
}
