//! The seam between the renderer and the GL driver.
//!
//! - `GlBackend` is the narrow set of GL operations the frame driver and the
//!   overlay need: program compile/link, buffer upload, the two pieces of
//!   bound state the overlay saves and restores, blending and draws.
//! - `context` implements it over a live `glow::Context`.
//! - `uniforms` resolves and feeds the ShaderToy uniform set.
//!
//! Handles are raw GL object names so state queried back from the driver
//! compares equal to handles created through the backend.

mod context;
#[cfg(test)]
pub(crate) mod recording;
mod uniforms;

use std::fmt;

use thiserror::Error;

pub use context::GlowBackend;
pub(crate) use uniforms::ShadertoyUniforms;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Written once at start-up.
    Static,
    /// Rewritten every frame.
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
}

#[derive(Debug, Error)]
pub enum GpuError {
    #[error("failed to create {0}: {1}")]
    Create(&'static str, String),
    #[error("{stage} shader failed to compile:\n{log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("program failed to link:\n{log}")]
    Link { log: String },
}

/// GL operations used by the frame driver, overlay, and init/render hooks.
pub trait GlBackend {
    /// The driver's `GL_SHADING_LANGUAGE_VERSION` string.
    fn shading_language_version(&mut self) -> String;

    /// Compiles both stages and attaches them to a new program. Attribute
    /// location 0 is bound to `position` so the program can be linked next.
    fn compile_program(&mut self, vertex: &str, fragment: &str)
        -> Result<ProgramHandle, GpuError>;

    fn link_program(&mut self, program: ProgramHandle) -> Result<(), GpuError>;

    fn delete_program(&mut self, program: ProgramHandle);

    fn use_program(&mut self, program: Option<ProgramHandle>);

    fn current_program(&mut self) -> Option<ProgramHandle>;

    fn create_buffer(&mut self) -> Result<BufferHandle, GpuError>;

    fn bind_array_buffer(&mut self, buffer: Option<BufferHandle>);

    fn bound_array_buffer(&mut self) -> Option<BufferHandle>;

    /// Replaces the contents of the bound array buffer.
    fn upload_vertices(&mut self, vertices: &[f32], usage: BufferUsage);

    /// Points attribute 0 at tightly packed floats starting at offset 0 and
    /// enables it.
    fn configure_position_attribute(&mut self, components: i32);

    /// Toggles source-alpha / one-minus-source-alpha blending.
    fn set_blending(&mut self, enabled: bool);

    fn draw_triangles(&mut self, vertex_count: i32);

    fn set_viewport(&mut self, width: u32, height: u32);

    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;

    /// Writes a uniform of the currently bound program.
    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue);
}
