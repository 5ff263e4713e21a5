use std::fmt::Write;

use super::raster::{rasterize_char, OverlayVertexBuffer, Viewport};

pub const DEFAULT_OVERLAY_SCALE: f32 = 2.0;
pub const OVERLAY_PADDING: i32 = 10;

/// Character cell geometry derived from a scale factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayLayout {
    pub scale: f32,
    pub cell_width: i32,
    pub cell_height: i32,
    pub padding: i32,
}

impl OverlayLayout {
    pub fn new(scale: f32) -> Self {
        Self {
            scale,
            cell_width: (6.0 * scale) as i32,
            cell_height: (8.0 * scale) as i32,
            padding: OVERLAY_PADDING,
        }
    }

    /// Filename block anchored at the top-left padding.
    pub fn label<'a>(&self, text: &'a str) -> TextBlock<'a> {
        TextBlock {
            text,
            origin: (self.padding, self.padding),
            scale: self.scale,
        }
    }

    /// Status block right-aligned against the bottom-right padding. Every
    /// character, spaces included, takes one cell of width.
    pub fn status<'a>(&self, text: &'a str, viewport: Viewport) -> TextBlock<'a> {
        let cells = text.chars().count() as i32;
        let start_x = viewport.width as i32 - cells * self.cell_width - self.padding;
        let start_y = viewport.height as i32 - self.cell_height - self.padding;
        TextBlock {
            text,
            origin: (start_x, start_y),
            scale: self.scale,
        }
    }
}

impl Default for OverlayLayout {
    fn default() -> Self {
        Self::new(DEFAULT_OVERLAY_SCALE)
    }
}

/// One line of overlay text, rebuilt every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextBlock<'a> {
    pub text: &'a str,
    pub origin: (i32, i32),
    pub scale: f32,
}

impl TextBlock<'_> {
    /// Rasterizes the block left to right, advancing one cell per character
    /// whether or not it has a glyph. Returns the vertices emitted.
    pub fn rasterize(
        &self,
        cell_width: i32,
        viewport: Viewport,
        out: &mut OverlayVertexBuffer,
    ) -> usize {
        let (x, y) = self.origin;
        self.text
            .chars()
            .enumerate()
            .map(|(i, ch)| {
                rasterize_char(ch, (x + i as i32 * cell_width, y), self.scale, viewport, out)
            })
            .sum()
    }
}

/// Writes `"<fps> FPS"` or `"<fps> FPS  <watts> W"` into `out`.
pub fn format_status(out: &mut String, fps: f32, power_mw: Option<u32>) {
    out.clear();
    // Writing into a String cannot fail.
    let _ = match power_mw {
        Some(mw) => write!(out, "{fps:.1} FPS  {:.2} W", f64::from(mw) / 1000.0),
        None => write!(out, "{fps:.1} FPS"),
    };
}
