//! In-memory [`GlBackend`] that records every call for assertions.

use super::{
    BufferHandle, BufferUsage, GlBackend, GpuError, ProgramHandle, ShaderStage, UniformLocation,
    UniformValue,
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum GlCall {
    Compile { vertex: String, fragment: String },
    Link(ProgramHandle),
    UseProgram(Option<ProgramHandle>),
    BindArrayBuffer(Option<BufferHandle>),
    Upload { floats: usize, usage: BufferUsage },
    PositionAttribute(i32),
    Blending(bool),
    Draw(i32),
    Viewport(u32, u32),
    Uniform(String, UniformValue),
}

pub(crate) struct RecordingBackend {
    pub version: String,
    pub calls: Vec<GlCall>,
    pub uploads: Vec<Vec<f32>>,
    /// Zero-based indices of `compile_program` calls that should fail.
    pub failing_compiles: Vec<usize>,
    /// Zero-based indices of `link_program` calls that should fail.
    pub failing_links: Vec<usize>,
    compiles: usize,
    links: usize,
    next_name: u32,
    current_program: Option<ProgramHandle>,
    bound_buffer: Option<BufferHandle>,
    locations: Vec<(ProgramHandle, String)>,
}

impl RecordingBackend {
    pub fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            calls: Vec::new(),
            uploads: Vec::new(),
            failing_compiles: Vec::new(),
            failing_links: Vec::new(),
            compiles: 0,
            links: 0,
            next_name: 1,
            current_program: None,
            bound_buffer: None,
            locations: Vec::new(),
        }
    }

    fn allocate(&mut self) -> u32 {
        let name = self.next_name;
        self.next_name += 1;
        name
    }

    pub fn compiled_fragments(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                GlCall::Compile { fragment, .. } => Some(fragment.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn draws(&self) -> Vec<i32> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                GlCall::Draw(count) => Some(*count),
                _ => None,
            })
            .collect()
    }

    pub fn uniform_writes(&self, name: &str) -> Vec<UniformValue> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                GlCall::Uniform(uniform, value) if uniform == name => Some(*value),
                _ => None,
            })
            .collect()
    }
}

impl GlBackend for RecordingBackend {
    fn shading_language_version(&mut self) -> String {
        self.version.clone()
    }

    fn compile_program(
        &mut self,
        vertex: &str,
        fragment: &str,
    ) -> Result<ProgramHandle, GpuError> {
        self.calls.push(GlCall::Compile {
            vertex: vertex.to_string(),
            fragment: fragment.to_string(),
        });
        let index = self.compiles;
        self.compiles += 1;
        if self.failing_compiles.contains(&index) {
            return Err(GpuError::Compile {
                stage: ShaderStage::Fragment,
                log: "0:1: error: injected failure".to_string(),
            });
        }
        Ok(ProgramHandle(self.allocate()))
    }

    fn link_program(&mut self, program: ProgramHandle) -> Result<(), GpuError> {
        self.calls.push(GlCall::Link(program));
        let index = self.links;
        self.links += 1;
        if self.failing_links.contains(&index) {
            return Err(GpuError::Link {
                log: "injected link failure".to_string(),
            });
        }
        Ok(())
    }

    fn delete_program(&mut self, _program: ProgramHandle) {}

    fn use_program(&mut self, program: Option<ProgramHandle>) {
        self.current_program = program;
        self.calls.push(GlCall::UseProgram(program));
    }

    fn current_program(&mut self) -> Option<ProgramHandle> {
        self.current_program
    }

    fn create_buffer(&mut self) -> Result<BufferHandle, GpuError> {
        Ok(BufferHandle(self.allocate()))
    }

    fn bind_array_buffer(&mut self, buffer: Option<BufferHandle>) {
        self.bound_buffer = buffer;
        self.calls.push(GlCall::BindArrayBuffer(buffer));
    }

    fn bound_array_buffer(&mut self) -> Option<BufferHandle> {
        self.bound_buffer
    }

    fn upload_vertices(&mut self, vertices: &[f32], usage: BufferUsage) {
        self.uploads.push(vertices.to_vec());
        self.calls.push(GlCall::Upload {
            floats: vertices.len(),
            usage,
        });
    }

    fn configure_position_attribute(&mut self, components: i32) {
        self.calls.push(GlCall::PositionAttribute(components));
    }

    fn set_blending(&mut self, enabled: bool) {
        self.calls.push(GlCall::Blending(enabled));
    }

    fn draw_triangles(&mut self, vertex_count: i32) {
        self.calls.push(GlCall::Draw(vertex_count));
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.calls.push(GlCall::Viewport(width, height));
    }

    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        self.locations.push((program, name.to_string()));
        Some(UniformLocation(self.locations.len() as u32 - 1))
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        let name = self
            .locations
            .get(location.0 as usize)
            .map(|(_, name)| name.clone())
            .unwrap_or_default();
        self.calls.push(GlCall::Uniform(name, value));
    }
}
