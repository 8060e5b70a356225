//! Geometry stream
//!
//! Glyphs leave the layout engine as textured quads: four vertices and six
//! indices (two triangles) each. A [`GeometrySink`] receives them and issues
//! the draw; [`VertexBuffer`] is the in-memory sink.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::atlas::TexRect;
use crate::style::Rgba;

/// Index pattern of one quad, relative to its first vertex
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// `vertex:3f, tex_coord:2f, color:4f`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub s: f32,
    pub t: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Vertex {
    pub fn new(x: f32, y: f32, s: f32, t: f32, color: Rgba) -> Self {
        Self {
            x,
            y,
            z: 0.0,
            s,
            t,
            r: color.r,
            g: color.g,
            b: color.b,
            a: color.a,
        }
    }

    pub fn color(&self) -> Rgba {
        Rgba::new(self.r, self.g, self.b, self.a)
    }
}

/// Build the four vertices of a flat-colored quad.
///
/// `(x0, y0)` is the top-left corner and `(x1, y1)` the bottom-right, with y
/// growing upward. Vertex order is top-left, bottom-left, bottom-right,
/// top-right, matching [`QUAD_INDICES`].
pub fn quad(x0: f32, y0: f32, x1: f32, y1: f32, tex: TexRect, color: Rgba) -> [Vertex; 4] {
    [
        Vertex::new(x0, y0, tex.s0, tex.t0, color),
        Vertex::new(x0, y1, tex.s0, tex.t1, color),
        Vertex::new(x1, y1, tex.s1, tex.t1, color),
        Vertex::new(x1, y0, tex.s1, tex.t0, color),
    ]
}

/// Primitive topology of a draw call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Primitive {
    Triangles,
}

/// Receiver of quad geometry
pub trait GeometrySink {
    /// Drop all geometry pushed so far
    fn clear(&mut self);

    /// Append one quad; `indices` are relative to the quad's first vertex
    fn push_quad(&mut self, vertices: &[Vertex; 4], indices: &[u32; 6]);

    /// Draw everything pushed since the last `clear`
    fn render(&mut self, primitive: Primitive);
}

/// Growable vertex/index buffer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexBuffer {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    /// Number of `render` calls
    draws: usize,
}

impl VertexBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Vertices of each quad, in push order
    pub fn quads(&self) -> impl Iterator<Item = &[Vertex]> {
        self.vertices.chunks_exact(4)
    }

    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// How many times the buffer has been drawn
    pub fn draw_count(&self) -> usize {
        self.draws
    }

    /// Shift every vertex, e.g. to center a laid-out label
    pub fn translate(&mut self, dx: f32, dy: f32) {
        for vertex in &mut self.vertices {
            vertex.x += dx;
            vertex.y += dy;
        }
    }

    /// Raw vertex data for upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw index data for upload
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

impl GeometrySink for VertexBuffer {
    fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    fn push_quad(&mut self, vertices: &[Vertex; 4], indices: &[u32; 6]) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(vertices);
        self.indices.extend(indices.iter().map(|i| base + i));
    }

    fn render(&mut self, _primitive: Primitive) {
        self.draws += 1;
    }
}
