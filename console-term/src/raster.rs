//! Software rasterizer
//!
//! A [`GeometrySink`] that keeps the pushed quads and, on `render`, draws them
//! into a CPU frame buffer of `0RGB` pixels ready for softbuffer. Quads are
//! axis aligned, so each one is filled as a rectangle sampling the atlas
//! coverage texture. Coordinates are y-up with the origin at the bottom-left
//! corner of the frame.

use console_core::{GeometrySink, Primitive, Rgba, Vertex, VertexBuffer};

use crate::font_atlas::AtlasTexture;

/// Frame buffer target for console geometry
pub struct SoftwareSink {
    geometry: VertexBuffer,
    texture: AtlasTexture,
    /// Generation of the atlas texture last copied in
    synced: Option<u64>,
    frame: Vec<u32>,
    width: u32,
    height: u32,
    background: u32,
}

impl SoftwareSink {
    pub fn new(width: u32, height: u32, background: u32) -> Self {
        Self {
            geometry: VertexBuffer::new(),
            texture: AtlasTexture::new(1, 1),
            synced: None,
            frame: vec![background; frame_len(width, height)],
            width,
            height,
            background,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.frame = vec![self.background; frame_len(width, height)];
    }

    /// Copy the atlas texture if it changed since the last sync. Returns
    /// whether a copy was made.
    pub fn sync_texture(&mut self, texture: &AtlasTexture) -> bool {
        if self.synced == Some(texture.generation()) {
            return false;
        }
        self.texture.clone_from(texture);
        self.synced = Some(texture.generation());
        true
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixels of the last rendered frame, row-major from the top
    pub fn frame(&self) -> &[u32] {
        &self.frame
    }

    fn draw_quad(&mut self, quad: &[Vertex]) {
        let (top_left, bottom_right) = (quad[0], quad[2]);
        let (x0, y0, x1, y1) = (top_left.x, top_left.y, bottom_right.x, bottom_right.y);
        if x0 == x1 || y0 == y1 {
            return;
        }

        let height = self.height as f32;
        let color = top_left.color();
        let left = x0.min(x1).floor().max(0.0) as u32;
        let right = (x0.max(x1).ceil().max(0.0) as u32).min(self.width);
        let first_row = (height - y0.max(y1)).floor().max(0.0) as u32;
        let last_row = ((height - y0.min(y1)).ceil().max(0.0) as u32).min(self.height);

        for py in first_row..last_row {
            let cy = height - (py as f32 + 0.5);
            let v = (y0 - cy) / (y0 - y1);
            if !(0.0..=1.0).contains(&v) {
                continue;
            }
            let t = top_left.t + v * (bottom_right.t - top_left.t);

            for px in left..right {
                let u = (px as f32 + 0.5 - x0) / (x1 - x0);
                if !(0.0..=1.0).contains(&u) {
                    continue;
                }
                let s = top_left.s + u * (bottom_right.s - top_left.s);

                let coverage = self.texture.sample(s, t);
                if coverage == 0 {
                    continue;
                }
                let alpha = coverage as f32 / 255.0 * color.a;
                let idx = py as usize * self.width as usize + px as usize;
                if let Some(pixel) = self.frame.get_mut(idx) {
                    *pixel = blend(*pixel, color, alpha);
                }
            }
        }
    }
}

impl GeometrySink for SoftwareSink {
    fn clear(&mut self) {
        self.geometry.clear();
    }

    fn push_quad(&mut self, vertices: &[Vertex; 4], indices: &[u32; 6]) {
        self.geometry.push_quad(vertices, indices);
    }

    fn render(&mut self, primitive: Primitive) {
        self.frame.fill(self.background);
        let quads: Vec<[Vertex; 4]> = self
            .geometry
            .quads()
            .filter_map(|quad| quad.try_into().ok())
            .collect();
        for quad in &quads {
            self.draw_quad(quad);
        }
        self.geometry.render(primitive);
    }
}

/// Pixel count of a `width`x`height` frame
fn frame_len(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

/// Convert a color channel in `0.0..=1.0` to a byte
fn channel(value: f32) -> u32 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u32
}

/// Blend `color` over a 0RGB pixel
fn blend(existing: u32, color: Rgba, alpha: f32) -> u32 {
    let alpha = alpha.clamp(0.0, 1.0);
    let mix = |shift: u32, value: f32| {
        let dst = ((existing >> shift) & 0xFF) as f32;
        let src = channel(value) as f32;
        ((src * alpha + dst * (1.0 - alpha)).round() as u32).min(255) << shift
    };
    mix(16, color.r) | mix(8, color.g) | mix(0, color.b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font_atlas::FontAtlas;
    use console_core::{quad, FontId, GlyphAtlas, QUAD_INDICES};

    fn sink_with_atlas(width: u32, height: u32) -> (SoftwareSink, FontAtlas) {
        let atlas = FontAtlas::new();
        let mut sink = SoftwareSink::new(width, height, 0);
        sink.sync_texture(atlas.texture());
        (sink, atlas)
    }

    #[test]
    fn test_blend() {
        assert_eq!(blend(0x000000, Rgba::WHITE, 1.0), 0xffffff);
        assert_eq!(blend(0xffffff, Rgba::BLACK, 0.0), 0xffffff);
        assert_eq!(blend(0x000000, Rgba::new(1.0, 0.0, 0.0, 1.0), 0.5), 0x800000);
    }

    #[test]
    fn test_frame_len_does_not_wrap() {
        assert_eq!(frame_len(70_000, 70_000), 4_900_000_000);
        assert_eq!(frame_len(0, 10), 0);
    }

    #[test]
    fn test_fills_caret_quad() {
        let (mut sink, atlas) = sink_with_atlas(4, 4);
        let tex = atlas.caret_cell(FontId(0));
        sink.push_quad(&quad(1.0, 3.0, 3.0, 1.0, tex, Rgba::WHITE), &QUAD_INDICES);
        sink.render(Primitive::Triangles);

        let frame = sink.frame();
        let lit: Vec<usize> = (0..16).filter(|&i| frame[i] == 0xffffff).collect();
        // y-up: the quad covers rows 1 and 2 from the top
        assert_eq!(lit, vec![5, 6, 9, 10]);
    }

    #[test]
    fn test_clips_to_frame() {
        let (mut sink, atlas) = sink_with_atlas(2, 2);
        let tex = atlas.caret_cell(FontId(0));
        sink.push_quad(&quad(-5.0, 10.0, 10.0, -5.0, tex, Rgba::WHITE), &QUAD_INDICES);
        sink.render(Primitive::Triangles);
        assert!(sink.frame().iter().all(|&p| p == 0xffffff));
    }

    #[test]
    fn test_render_clears_to_background() {
        let (mut sink, atlas) = sink_with_atlas(2, 2);
        let tex = atlas.caret_cell(FontId(0));
        sink.push_quad(&quad(0.0, 2.0, 2.0, 0.0, tex, Rgba::WHITE), &QUAD_INDICES);
        sink.render(Primitive::Triangles);
        assert!(sink.frame().iter().all(|&p| p == 0xffffff));

        sink.clear();
        sink.render(Primitive::Triangles);
        assert!(sink.frame().iter().all(|&p| p == 0));

        let mut dark = SoftwareSink::new(2, 2, 0x102030);
        dark.sync_texture(atlas.texture());
        dark.push_quad(&quad(0.0, 1.0, 1.0, 0.0, tex, Rgba::WHITE), &QUAD_INDICES);
        dark.render(Primitive::Triangles);
        // Bottom-left pixel lit, the rest keep the background
        assert_eq!(dark.frame(), &[0x102030, 0x102030, 0xffffff, 0x102030]);
    }

    #[test]
    fn test_sync_texture_only_on_change() {
        let atlas = FontAtlas::new();
        let mut sink = SoftwareSink::new(1, 1, 0);
        assert!(sink.sync_texture(atlas.texture()));
        assert!(!sink.sync_texture(atlas.texture()));
    }

    #[test]
    fn test_resize() {
        let mut sink = SoftwareSink::new(2, 2, 7);
        sink.resize(3, 5);
        assert_eq!(sink.frame().len(), 15);
        assert_eq!((sink.width(), sink.height()), (3, 5));
    }
}
