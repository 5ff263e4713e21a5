//! Renderer crate for glsltoy.
//!
//! Runs a ShaderToy-style `mainImage` body full-screen through OpenGL and
//! draws a small diagnostic overlay on top of it. The overall flow is:
//!
//! ```text
//!   CLI / glsltoy
//!          │ RendererConfig + HookRegistry
//!          ▼
//!   renderer::run ──▶ GlWindow (winit + glutin) ──▶ GlowBackend
//!                                                      │
//!   FrameDriver::init ─▶ directive ─▶ main program ─▶ init hooks ─▶ overlay
//!   FrameDriver::render ─▶ uniforms ─▶ render hooks ─▶ draw ─▶ overlay
//! ```
//!
//! Everything between the window and the driver goes through [`GlBackend`],
//! so the frame sequence and overlay state handling run without a GPU in
//! tests.

mod compile;
pub mod driver;
pub mod gpu;
pub mod hooks;
pub mod overlay;
pub mod runtime;
pub mod telemetry;
mod types;
mod window;

use shadertoy::VersionError;
use thiserror::Error;

pub use driver::{FrameDriver, RenderContext};
pub use gpu::{
    BufferHandle, BufferUsage, GlBackend, GlowBackend, GpuError, ProgramHandle, ShaderStage,
    UniformLocation, UniformValue,
};
pub use hooks::{HookRegistry, InitHook, RenderHook};
pub use runtime::{FpsCounter, TimeSample, TimeSource};
pub use telemetry::PowerSensor;
pub use types::{OverlayOptions, RendererConfig};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Version(#[from] VersionError),
    #[error("main shader program failed")]
    MainProgram(#[source] GpuError),
    #[error(transparent)]
    Gpu(#[from] GpuError),
}

/// Opens a window for `config.shader_source` and renders until it closes.
///
/// `hooks` fire around the main program exactly as [`FrameDriver`] documents.
pub fn run(config: RendererConfig, hooks: HookRegistry) -> anyhow::Result<()> {
    window::run(config, hooks)
}
