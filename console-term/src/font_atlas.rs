//! Font atlas
//!
//! Rasterizes glyphs with fontdue on first use and packs them into a single
//! coverage texture using shelf packing. A small fully covered cell is
//! reserved at the origin for the caret and line decorations.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use console_core::{FontId, FontMetrics, FontSet, Glyph, GlyphAtlas, TexRect};
use fontdue::{Font, FontSettings};
use thiserror::Error;

use crate::config::FontConfig;

/// Side length of the atlas texture in pixels
pub const ATLAS_SIZE: u32 = 1024;

/// Side length of the reserved caret cell
const CARET_CELL: u32 = 2;

/// Font loading errors
#[derive(Error, Debug)]
pub enum FontError {
    #[error("Failed to read font {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse font: {0}")]
    Parse(String),

    #[error("Font has no horizontal line metrics")]
    NoLineMetrics,

    #[error("No usable system font found")]
    NoFontFound,
}

/// Single-channel coverage texture with a shelf packer
#[derive(Debug, Clone)]
pub struct AtlasTexture {
    width: u32,
    height: u32,
    data: Vec<u8>,
    cursor_x: u32,
    cursor_y: u32,
    row_height: u32,
    /// Bumped on every upload
    generation: u64,
}

impl AtlasTexture {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; (width * height) as usize],
            cursor_x: 0,
            cursor_y: 0,
            row_height: 0,
            generation: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Copy a `w`x`h` bitmap into the next free slot and return its top-left
    /// corner, or `None` when the texture is full
    pub fn insert(&mut self, bitmap: &[u8], w: u32, h: u32) -> Option<(u32, u32)> {
        let padding = 1u32;
        let padded_w = w + padding;
        let padded_h = h + padding;

        if self.cursor_x + padded_w > self.width {
            self.cursor_x = 0;
            self.cursor_y += self.row_height;
            self.row_height = 0;
        }
        if self.cursor_y + padded_h > self.height || padded_w > self.width {
            return None;
        }

        let x = self.cursor_x;
        let y = self.cursor_y;
        for row in 0..h {
            let dst_start = ((y + row) * self.width + x) as usize;
            let src_start = (row * w) as usize;
            let len = w as usize;
            if dst_start + len <= self.data.len() && src_start + len <= bitmap.len() {
                self.data[dst_start..dst_start + len].copy_from_slice(&bitmap[src_start..src_start + len]);
            }
        }

        self.cursor_x += padded_w;
        self.row_height = self.row_height.max(padded_h);
        self.generation += 1;
        Some((x, y))
    }

    /// Normalized coordinates of a pixel rectangle
    pub fn tex_rect(&self, x: f32, y: f32, w: f32, h: f32) -> TexRect {
        let fw = self.width as f32;
        let fh = self.height as f32;
        TexRect::new(x / fw, y / fh, (x + w) / fw, (y + h) / fh)
    }

    /// Nearest-texel coverage at normalized coordinates
    pub fn sample(&self, s: f32, t: f32) -> u8 {
        let x = ((s * self.width as f32) as i64).clamp(0, self.width as i64 - 1) as u32;
        let y = ((t * self.height as f32) as i64).clamp(0, self.height as i64 - 1) as u32;
        self.data[(y * self.width + x) as usize]
    }
}

struct Face {
    font: Font,
    size: f32,
    metrics: FontMetrics,
    /// `None` records a character the face cannot draw
    glyphs: HashMap<char, Option<Glyph>>,
}

/// Glyph atlas over one or more fontdue faces
pub struct FontAtlas {
    faces: Vec<Face>,
    texture: AtlasTexture,
    caret: TexRect,
}

impl FontAtlas {
    pub fn new() -> Self {
        Self::with_size(ATLAS_SIZE, ATLAS_SIZE)
    }

    pub fn with_size(width: u32, height: u32) -> Self {
        let mut texture = AtlasTexture::new(width, height);
        let filled = [u8::MAX; (CARET_CELL * CARET_CELL) as usize];
        let caret = match texture.insert(&filled, CARET_CELL, CARET_CELL) {
            // Sample the middle of the cell so filtering never reaches its edge
            Some((x, y)) => texture.tex_rect(x as f32 + 0.5, y as f32 + 0.5, 1.0, 1.0),
            None => TexRect::default(),
        };
        Self {
            faces: Vec::new(),
            texture,
            caret,
        }
    }

    /// Load every face named by the config. Styled faces that fail to load
    /// fall back to the regular one.
    pub fn from_config(config: &FontConfig) -> Result<(Self, FontSet), FontError> {
        let mut atlas = Self::new();
        let regular = match &config.path {
            Some(path) => atlas.add_font_file(path, config.size)?,
            None => atlas.add_default_font(config.size)?,
        };

        let mut styled = |path: &Option<PathBuf>| match path {
            Some(path) => atlas.add_font_file(path, config.size).unwrap_or_else(|e| {
                log::warn!("Using regular face instead of {:?}: {}", path, e);
                regular
            }),
            None => regular,
        };
        let fonts = FontSet {
            regular,
            bold: styled(&config.bold),
            italic: styled(&config.italic),
            bold_italic: styled(&config.bold_italic),
        };

        atlas.preload(fonts.regular);
        Ok((atlas, fonts))
    }

    /// Load a face from a font file
    pub fn add_font_file(&mut self, path: &Path, size: f32) -> Result<FontId, FontError> {
        let data = std::fs::read(path).map_err(|source| FontError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let id = self.add_font_bytes(&data, size)?;
        log::info!("Loaded font: {}", path.display());
        Ok(id)
    }

    /// Try the usual system monospace fonts in order of preference
    pub fn add_default_font(&mut self, size: f32) -> Result<FontId, FontError> {
        let font_paths = [
            "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
            "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
            "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
            "/usr/share/fonts/truetype/ttf-bitstream-vera/VeraMono.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
            "/usr/share/fonts/truetype/ubuntu/UbuntuMono-R.ttf",
            "/usr/share/fonts/truetype/freefont/FreeMono.ttf",
            "/System/Library/Fonts/Menlo.ttc",
            "C:\\Windows\\Fonts\\consola.ttf",
        ];

        for path in &font_paths {
            match self.add_font_file(Path::new(path), size) {
                Ok(id) => return Ok(id),
                Err(e) => log::trace!("Skipping {}: {}", path, e),
            }
        }
        Err(FontError::NoFontFound)
    }

    /// Load a face from font data
    pub fn add_font_bytes(&mut self, data: &[u8], size: f32) -> Result<FontId, FontError> {
        let font = Font::from_bytes(data, FontSettings::default())
            .map_err(|e| FontError::Parse(e.to_string()))?;
        let line = font
            .horizontal_line_metrics(size)
            .ok_or(FontError::NoLineMetrics)?;

        let thickness = (size / 14.0).round().max(1.0);
        let metrics = FontMetrics {
            height: line.new_line_size,
            line_gap: line.line_gap,
            ascender: line.ascent,
            descender: line.descent,
            underline_position: (line.descent * 0.5).round().min(-1.0),
            underline_thickness: thickness,
        };

        let id = FontId(self.faces.len() as u32);
        self.faces.push(Face {
            font,
            size,
            metrics,
            glyphs: HashMap::new(),
        });
        Ok(id)
    }

    /// Rasterize printable ASCII up front
    pub fn preload(&mut self, font: FontId) {
        for c in ' '..='~' {
            self.glyph(font, c);
        }
    }

    pub fn texture(&self) -> &AtlasTexture {
        &self.texture
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn face(&self, font: FontId) -> Option<&Face> {
        self.faces.get(font.0 as usize)
    }

    fn rasterize(&mut self, font: FontId, c: char) -> Option<Glyph> {
        let face = self.faces.get(font.0 as usize)?;
        if c.is_control() || face.font.lookup_glyph_index(c) == 0 {
            return None;
        }

        let (metrics, bitmap) = face.font.rasterize(c, face.size);
        let w = metrics.width as u32;
        let h = metrics.height as u32;
        let tex = if w == 0 || h == 0 {
            TexRect::default()
        } else {
            match self.texture.insert(&bitmap, w, h) {
                Some((x, y)) => self.texture.tex_rect(x as f32, y as f32, w as f32, h as f32),
                None => {
                    log::warn!("Glyph atlas is full, cannot add {:?}", c);
                    return None;
                }
            }
        };

        Some(Glyph {
            offset_x: metrics.xmin as f32,
            offset_y: (metrics.ymin + metrics.height as i32) as f32,
            width: w as f32,
            height: h as f32,
            advance_x: metrics.advance_width,
            advance_y: 0.0,
            tex,
        })
    }
}

impl Default for FontAtlas {
    fn default() -> Self {
        Self::new()
    }
}

impl GlyphAtlas for FontAtlas {
    fn metrics(&self, font: FontId) -> FontMetrics {
        self.face(font).map(|face| face.metrics).unwrap_or_default()
    }

    fn glyph(&mut self, font: FontId, c: char) -> Option<Glyph> {
        if let Some(cached) = self.face(font).and_then(|face| face.glyphs.get(&c)) {
            return *cached;
        }

        let glyph = self.rasterize(font, c);
        if let Some(face) = self.faces.get_mut(font.0 as usize) {
            face.glyphs.insert(c, glyph);
        }
        glyph
    }

    fn kerning(&self, font: FontId, previous: char, current: char) -> f32 {
        self.face(font)
            .and_then(|face| face.font.horizontal_kern(previous, current, face.size))
            .unwrap_or(0.0)
    }

    fn caret_cell(&self, _font: FontId) -> TexRect {
        self.caret
    }
}
