use std::path::PathBuf;

use crate::overlay::DEFAULT_OVERLAY_SCALE;

/// Diagnostic overlay settings.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayOptions {
    /// Draw the file name and frame rate over the shader.
    pub enabled: bool,
    /// Text scale; the glyph pixel size is its integer part, at least 1.
    pub scale: f32,
    /// Look for a GPU power sensor and show its reading in the status line.
    pub telemetry: bool,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            scale: DEFAULT_OVERLAY_SCALE,
            telemetry: true,
        }
    }
}

/// Immutable configuration passed to the renderer at start-up.
///
/// `RendererConfig` mirrors CLI flags and tells the renderer which shader file
/// to compile, how large the window should be, and how the overlay behaves.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Window size in physical pixels.
    pub surface_size: (u32, u32),
    /// Path to the `mainImage` shader body.
    pub shader_source: PathBuf,
    /// Directive to use instead of the driver-reported version, e.g. `"300 es"`.
    pub glsl_version: Option<String>,
    pub overlay: OverlayOptions,
    /// Freeze `iTime` at this many seconds.
    pub fixed_time: Option<f32>,
    /// Wait for vertical blank between frames.
    pub vsync: bool,
}

impl Default for RendererConfig {
    /// Provides a 1080p configuration with no shader selected.
    fn default() -> Self {
        Self {
            surface_size: (1920, 1080),
            shader_source: PathBuf::new(),
            glsl_version: None,
            overlay: OverlayOptions::default(),
            fixed_time: None,
            vsync: true,
        }
    }
}
