use super::font::Glyph;

/// Vertices the overlay may emit per frame (two floats each).
pub const OVERLAY_VERTEX_CAPACITY: usize = 8192;

const VERTICES_PER_PIXEL: usize = 6;
const FLOATS_PER_VERTEX: usize = 2;

/// Pixel dimensions used to convert overlay coordinates into NDC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    fn ndc_x(&self, px: f32) -> f32 {
        (px / self.width as f32) * 2.0 - 1.0
    }

    fn ndc_y(&self, py: f32) -> f32 {
        1.0 - (py / self.height as f32) * 2.0
    }
}

/// Reusable per-frame storage for overlay triangles in NDC.
///
/// Glyphs are admitted whole or not at all. The first glyph that does not fit
/// saturates the buffer, and every glyph after it is dropped until
/// [`OverlayVertexBuffer::clear`] starts the next frame.
#[derive(Debug, Clone)]
pub struct OverlayVertexBuffer {
    floats: Vec<f32>,
    capacity: usize,
    saturated: bool,
}

impl OverlayVertexBuffer {
    pub fn new() -> Self {
        Self::with_capacity(OVERLAY_VERTEX_CAPACITY)
    }

    /// `capacity` is counted in vertices.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            floats: Vec::with_capacity(capacity * FLOATS_PER_VERTEX),
            capacity,
            saturated: false,
        }
    }

    pub fn clear(&mut self) {
        self.floats.clear();
        self.saturated = false;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn vertex_count(&self) -> usize {
        self.floats.len() / FLOATS_PER_VERTEX
    }

    pub fn is_saturated(&self) -> bool {
        self.saturated
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.floats
    }

    fn admit(&mut self, vertices: usize) -> bool {
        if self.saturated || self.vertex_count() + vertices > self.capacity {
            self.saturated = true;
            return false;
        }
        true
    }

    fn push_quad(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.floats.extend_from_slice(&[
            x1, y1, x2, y1, x2, y2, //
            x2, y2, x1, y2, x1, y1,
        ]);
    }
}

impl Default for OverlayVertexBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Integer pixel multiplier for a scale factor, never below 1.
pub fn pixel_size(scale: f32) -> i32 {
    (scale as i32).max(1)
}

/// Emits one quad per lit pixel of `glyph` with its top-left at `origin`.
///
/// Returns the number of vertices written, which is zero when the buffer
/// could not take the whole glyph.
pub fn rasterize_glyph(
    glyph: &Glyph,
    origin: (i32, i32),
    scale: f32,
    viewport: Viewport,
    out: &mut OverlayVertexBuffer,
) -> usize {
    let needed = glyph.lit_pixels() * VERTICES_PER_PIXEL;
    if needed == 0 || !out.admit(needed) {
        return 0;
    }

    let size = pixel_size(scale);
    for (row, col) in glyph.lit() {
        let px = (origin.0 + col as i32 * size) as f32;
        let py = (origin.1 + row as i32 * size) as f32;
        out.push_quad(
            viewport.ndc_x(px),
            viewport.ndc_y(py),
            viewport.ndc_x(px + size as f32),
            viewport.ndc_y(py + size as f32),
        );
    }
    needed
}

/// Rasterizes `ch` if the font has it. Unknown characters emit nothing.
pub fn rasterize_char(
    ch: char,
    origin: (i32, i32),
    scale: f32,
    viewport: Viewport,
    out: &mut OverlayVertexBuffer,
) -> usize {
    match Glyph::for_char(ch) {
        Some(glyph) => rasterize_glyph(glyph, origin, scale, viewport, out),
        None => 0,
    }
}
