//! Diagnostic text drawn over the shader: the file name in the top-left corner
//! and the frame rate (plus GPU power when a sensor is available) in the
//! bottom-right, rasterized from the built-in bitmap font into plain
//! triangles.
//!
//! - `font` holds the 5x7 glyph table.
//! - `raster` turns glyphs into NDC quads inside a capacity-bounded buffer.
//! - `layout` positions the two text blocks and formats the status line.
//!
//! [`OverlayCompositor`] owns the overlay program and buffer and is careful to
//! hand GL state back to the main pipeline exactly as it found it.

mod font;
mod layout;
mod raster;

use shadertoy::{overlay_sources, VersionDirective};
use tracing::debug;

use crate::gpu::{BufferHandle, BufferUsage, GlBackend, ProgramHandle};
use crate::RenderError;

pub use font::{Glyph, GLYPH_COLUMNS, GLYPH_COUNT, GLYPH_ROWS};
pub use layout::{
    format_status, OverlayLayout, TextBlock, DEFAULT_OVERLAY_SCALE, OVERLAY_PADDING,
};
pub use raster::{
    pixel_size, rasterize_char, rasterize_glyph, OverlayVertexBuffer, Viewport,
    OVERLAY_VERTEX_CAPACITY,
};

/// Components per overlay vertex and per main-pipeline vertex.
const POSITION_COMPONENTS: i32 = 2;

pub struct OverlayCompositor {
    program: ProgramHandle,
    buffer: BufferHandle,
    layout: OverlayLayout,
    label: Option<String>,
    status: String,
    vertices: OverlayVertexBuffer,
}

impl OverlayCompositor {
    /// Compiles and links the overlay program for `directive` and allocates
    /// its vertex buffer. A failed program is deleted before returning.
    pub fn create(
        gl: &mut dyn GlBackend,
        directive: &VersionDirective,
        label: Option<String>,
        scale: f32,
    ) -> Result<Self, RenderError> {
        let sources = overlay_sources(directive)?;
        let program = gl.compile_program(&sources.vertex, &sources.fragment)?;
        if let Err(err) = gl.link_program(program) {
            gl.delete_program(program);
            return Err(err.into());
        }
        let buffer = match gl.create_buffer() {
            Ok(buffer) => buffer,
            Err(err) => {
                gl.delete_program(program);
                return Err(err.into());
            }
        };
        debug!(?program, ?buffer, family = ?sources.family, "overlay program ready");
        Ok(Self {
            program,
            buffer,
            layout: OverlayLayout::new(scale),
            label,
            status: String::new(),
            vertices: OverlayVertexBuffer::new(),
        })
    }

    pub fn layout(&self) -> &OverlayLayout {
        &self.layout
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The most recently formatted status line.
    pub fn status_text(&self) -> &str {
        &self.status
    }

    pub fn vertices(&self) -> &OverlayVertexBuffer {
        &self.vertices
    }

    /// Rebuilds this frame's geometry from scratch. Identical inputs always
    /// produce identical vertices. Returns the vertex count.
    pub fn build_geometry(&mut self, viewport: Viewport, fps: f32, power_mw: Option<u32>) -> usize {
        self.vertices.clear();
        let cell_width = self.layout.cell_width;

        if let Some(label) = self.label.as_deref() {
            self.layout
                .label(label)
                .rasterize(cell_width, viewport, &mut self.vertices);
        }

        format_status(&mut self.status, fps, power_mw);
        self.layout
            .status(&self.status, viewport)
            .rasterize(cell_width, viewport, &mut self.vertices);

        self.vertices.vertex_count()
    }

    /// Draws the overlay on top of the current frame.
    ///
    /// Skipped for non-positive `fps` or an empty frame. Otherwise the bound
    /// program and array buffer are saved, the overlay is drawn with alpha
    /// blending, and the saved bindings plus the main pipeline's 2-float
    /// position layout are restored. Returns whether anything was drawn.
    pub fn draw(
        &mut self,
        gl: &mut dyn GlBackend,
        viewport: Viewport,
        fps: f32,
        power_mw: Option<u32>,
    ) -> bool {
        if fps <= 0.0 {
            return false;
        }
        let vertex_count = self.build_geometry(viewport, fps, power_mw);
        if vertex_count == 0 {
            return false;
        }

        let previous_program = gl.current_program();
        let previous_buffer = gl.bound_array_buffer();

        gl.use_program(Some(self.program));
        gl.bind_array_buffer(Some(self.buffer));
        gl.upload_vertices(self.vertices.as_slice(), BufferUsage::Dynamic);
        gl.configure_position_attribute(POSITION_COMPONENTS);

        gl.set_blending(true);
        gl.draw_triangles(vertex_count as i32);

        gl.set_blending(false);
        gl.use_program(previous_program);
        gl.bind_array_buffer(previous_buffer);
        gl.configure_position_attribute(POSITION_COMPONENTS);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::recording::{GlCall, RecordingBackend};

    fn compositor(gl: &mut RecordingBackend, label: Option<&str>) -> OverlayCompositor {
        OverlayCompositor::create(
            gl,
            &VersionDirective::from_override("300 es"),
            label.map(str::to_string),
            DEFAULT_OVERLAY_SCALE,
        )
        .unwrap()
    }

    #[test]
    fn geometry_is_idempotent_within_a_frame() {
        let mut gl = RecordingBackend::new("ES 3.00");
        let mut overlay = compositor(&mut gl, Some("wave.frag"));
        let viewport = Viewport::new(1920, 1080);

        let first_count = overlay.build_geometry(viewport, 60.0, Some(42_000));
        let first = overlay.vertices().as_slice().to_vec();
        let second_count = overlay.build_geometry(viewport, 60.0, Some(42_000));

        assert_eq!(first_count, second_count);
        assert_eq!(first, overlay.vertices().as_slice());
        assert_eq!(overlay.status_text(), "60.0 FPS  42.00 W");
    }

    #[test]
    fn geometry_covers_label_and_status() {
        let mut gl = RecordingBackend::new("ES 3.00");
        let mut overlay = compositor(&mut gl, Some("wave.frag"));
        let viewport = Viewport::new(1920, 1080);

        let lit = |text: &str| -> usize {
            text.chars()
                .filter_map(Glyph::for_char)
                .map(Glyph::lit_pixels)
                .sum()
        };
        let count = overlay.build_geometry(viewport, 60.0, None);
        assert_eq!(count, 6 * (lit("wave.frag") + lit("60.0 FPS")));
    }

    #[test]
    fn draw_saves_and_restores_bindings() {
        let mut gl = RecordingBackend::new("ES 3.00");
        let mut overlay = compositor(&mut gl, None);
        let main_program = ProgramHandle(77);
        let main_buffer = BufferHandle(78);
        gl.use_program(Some(main_program));
        gl.bind_array_buffer(Some(main_buffer));
        gl.calls.clear();

        assert!(overlay.draw(&mut gl, Viewport::new(800, 600), 30.0, None));
        let vertex_count = overlay.vertices().vertex_count() as i32;

        assert_eq!(
            gl.calls,
            vec![
                GlCall::UseProgram(Some(overlay.program)),
                GlCall::BindArrayBuffer(Some(overlay.buffer)),
                GlCall::Upload {
                    floats: vertex_count as usize * 2,
                    usage: BufferUsage::Dynamic,
                },
                GlCall::PositionAttribute(2),
                GlCall::Blending(true),
                GlCall::Draw(vertex_count),
                GlCall::Blending(false),
                GlCall::UseProgram(Some(main_program)),
                GlCall::BindArrayBuffer(Some(main_buffer)),
                GlCall::PositionAttribute(2),
            ]
        );
        assert_eq!(gl.current_program(), Some(main_program));
        assert_eq!(gl.bound_array_buffer(), Some(main_buffer));
    }

    #[test]
    fn non_positive_fps_skips_drawing() {
        let mut gl = RecordingBackend::new("ES 3.00");
        let mut overlay = compositor(&mut gl, Some("wave.frag"));
        gl.calls.clear();

        assert!(!overlay.draw(&mut gl, Viewport::new(800, 600), 0.0, None));
        assert!(!overlay.draw(&mut gl, Viewport::new(800, 600), -1.0, None));
        assert!(gl.calls.is_empty());
    }

    #[test]
    fn failed_link_deletes_program_and_reports() {
        let mut gl = RecordingBackend::new("ES 3.00");
        gl.failing_links = vec![0];
        let result = OverlayCompositor::create(
            &mut gl,
            &VersionDirective::none(),
            None,
            DEFAULT_OVERLAY_SCALE,
        );
        assert!(matches!(result, Err(RenderError::Gpu(_))));
    }
}
