use std::num::NonZeroU32;

use glow::HasContext;
use tracing::debug;

use super::{
    BufferHandle, BufferUsage, GlBackend, GpuError, ProgramHandle, ShaderStage, UniformLocation,
    UniformValue,
};

/// [`GlBackend`] over a current `glow` context.
///
/// Every method assumes the context stays current on the calling thread for
/// the lifetime of the backend.
pub struct GlowBackend {
    gl: glow::Context,
    vertex_array: Option<glow::NativeVertexArray>,
}

impl GlowBackend {
    /// Wraps `gl` and binds a vertex array object when the context supports
    /// them; core profiles refuse attribute setup without one.
    pub fn new(gl: glow::Context) -> Self {
        let vertex_array = unsafe {
            match gl.create_vertex_array() {
                Ok(vao) => {
                    gl.bind_vertex_array(Some(vao));
                    Some(vao)
                }
                Err(err) => {
                    debug!(error = %err, "vertex array objects unavailable; using default state");
                    None
                }
            }
        };
        Self { gl, vertex_array }
    }

    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    fn compile_stage(
        &self,
        program: glow::NativeProgram,
        stage: ShaderStage,
        source: &str,
    ) -> Result<(), GpuError> {
        let kind = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };
        unsafe {
            let shader = self
                .gl
                .create_shader(kind)
                .map_err(|err| GpuError::Create("shader", err))?;
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            if !self.gl.get_shader_compile_status(shader) {
                let log = self.gl.get_shader_info_log(shader);
                self.gl.delete_shader(shader);
                return Err(GpuError::Compile { stage, log });
            }
            self.gl.attach_shader(program, shader);
            // Flagged for deletion; released once the program goes away.
            self.gl.delete_shader(shader);
        }
        Ok(())
    }
}

impl Drop for GlowBackend {
    fn drop(&mut self) {
        if let Some(vao) = self.vertex_array.take() {
            unsafe { self.gl.delete_vertex_array(vao) };
        }
    }
}

fn native_program(handle: ProgramHandle) -> Option<glow::NativeProgram> {
    NonZeroU32::new(handle.0).map(glow::NativeProgram)
}

fn native_buffer(handle: BufferHandle) -> Option<glow::NativeBuffer> {
    NonZeroU32::new(handle.0).map(glow::NativeBuffer)
}

impl GlBackend for GlowBackend {
    fn shading_language_version(&mut self) -> String {
        unsafe { self.gl.get_parameter_string(glow::SHADING_LANGUAGE_VERSION) }
    }

    fn compile_program(
        &mut self,
        vertex: &str,
        fragment: &str,
    ) -> Result<ProgramHandle, GpuError> {
        let program = unsafe { self.gl.create_program() }
            .map_err(|err| GpuError::Create("program", err))?;
        let stages = self
            .compile_stage(program, ShaderStage::Vertex, vertex)
            .and_then(|()| self.compile_stage(program, ShaderStage::Fragment, fragment));
        if let Err(err) = stages {
            unsafe { self.gl.delete_program(program) };
            return Err(err);
        }
        unsafe { self.gl.bind_attrib_location(program, 0, "position") };
        Ok(ProgramHandle(program.0.get()))
    }

    fn link_program(&mut self, program: ProgramHandle) -> Result<(), GpuError> {
        let native = native_program(program).ok_or_else(|| GpuError::Link {
            log: "program name 0 cannot be linked".to_string(),
        })?;
        unsafe {
            self.gl.link_program(native);
            if self.gl.get_program_link_status(native) {
                Ok(())
            } else {
                Err(GpuError::Link {
                    log: self.gl.get_program_info_log(native),
                })
            }
        }
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        if let Some(native) = native_program(program) {
            unsafe { self.gl.delete_program(native) };
        }
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) {
        unsafe { self.gl.use_program(program.and_then(native_program)) };
    }

    fn current_program(&mut self) -> Option<ProgramHandle> {
        let name = unsafe { self.gl.get_parameter_i32(glow::CURRENT_PROGRAM) };
        u32::try_from(name).ok().filter(|&name| name != 0).map(ProgramHandle)
    }

    fn create_buffer(&mut self) -> Result<BufferHandle, GpuError> {
        let buffer =
            unsafe { self.gl.create_buffer() }.map_err(|err| GpuError::Create("buffer", err))?;
        Ok(BufferHandle(buffer.0.get()))
    }

    fn bind_array_buffer(&mut self, buffer: Option<BufferHandle>) {
        unsafe {
            self.gl
                .bind_buffer(glow::ARRAY_BUFFER, buffer.and_then(native_buffer))
        };
    }

    fn bound_array_buffer(&mut self) -> Option<BufferHandle> {
        let name = unsafe { self.gl.get_parameter_i32(glow::ARRAY_BUFFER_BINDING) };
        u32::try_from(name).ok().filter(|&name| name != 0).map(BufferHandle)
    }

    fn upload_vertices(&mut self, vertices: &[f32], usage: BufferUsage) {
        let usage = match usage {
            BufferUsage::Static => glow::STATIC_DRAW,
            BufferUsage::Dynamic => glow::DYNAMIC_DRAW,
        };
        unsafe {
            self.gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(vertices),
                usage,
            )
        };
    }

    fn configure_position_attribute(&mut self, components: i32) {
        unsafe {
            self.gl
                .vertex_attrib_pointer_f32(0, components, glow::FLOAT, false, 0, 0);
            self.gl.enable_vertex_attrib_array(0);
        }
    }

    fn set_blending(&mut self, enabled: bool) {
        unsafe {
            if enabled {
                self.gl.enable(glow::BLEND);
                self.gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
            } else {
                self.gl.disable(glow::BLEND);
            }
        }
    }

    fn draw_triangles(&mut self, vertex_count: i32) {
        unsafe { self.gl.draw_arrays(glow::TRIANGLES, 0, vertex_count) };
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        let width = i32::try_from(width).unwrap_or(i32::MAX);
        let height = i32::try_from(height).unwrap_or(i32::MAX);
        unsafe { self.gl.viewport(0, 0, width, height) };
    }

    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        let native = native_program(program)?;
        unsafe { self.gl.get_uniform_location(native, name) }.map(|loc| UniformLocation(loc.0))
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        let location = glow::NativeUniformLocation(location.0);
        unsafe {
            match value {
                UniformValue::Float(v) => self.gl.uniform_1_f32(Some(&location), v),
                UniformValue::Int(v) => self.gl.uniform_1_i32(Some(&location), v),
                UniformValue::Vec3([x, y, z]) => self.gl.uniform_3_f32(Some(&location), x, y, z),
                UniformValue::Vec4([x, y, z, w]) => {
                    self.gl.uniform_4_f32(Some(&location), x, y, z, w)
                }
            }
        }
    }
}
