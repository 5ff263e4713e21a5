//! Per-run render state and the per-frame sequence.
//!
//! [`FrameDriver::init`] resolves the directive, builds the main program and
//! fires init hooks. [`FrameDriver::render`] then runs once per frame:
//!
//! ```text
//!   time uniforms ─▶ render hooks ─▶ main draw ─▶ overlay (optional)
//! ```

use shadertoy::{resolve_directive, ShaderSource, ShaderTemplateFamily, VersionDirective};
use tracing::{debug, info, warn};

use crate::compile::build_main_program;
use crate::gpu::{BufferHandle, BufferUsage, GlBackend, ProgramHandle, ShadertoyUniforms};
use crate::hooks::HookRegistry;
use crate::overlay::{OverlayCompositor, Viewport};
use crate::runtime::TimeSample;
use crate::telemetry::PowerSensor;
use crate::types::RendererConfig;
use crate::RenderError;

/// Two triangles covering clip space, two floats per vertex.
const FULLSCREEN_QUAD: [f32; 12] = [
    1.0, 1.0, -1.0, 1.0, -1.0, -1.0, //
    -1.0, -1.0, 1.0, -1.0, 1.0, 1.0,
];
const QUAD_VERTICES: i32 = 6;
const POSITION_COMPONENTS: i32 = 2;

/// GL objects and parameters of the main pipeline.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub program: ProgramHandle,
    pub buffer: BufferHandle,
    pub viewport: Viewport,
    pub directive: VersionDirective,
    uniforms: ShadertoyUniforms,
}

pub struct FrameDriver<B: GlBackend> {
    gl: B,
    context: RenderContext,
    overlay: Option<OverlayCompositor>,
    hooks: HookRegistry,
    sensor: Box<dyn PowerSensor>,
}

impl<B: GlBackend> FrameDriver<B> {
    /// Builds the main pipeline for `source` and, when enabled, the overlay.
    ///
    /// Version and main-program failures are returned. An overlay that cannot
    /// be built is logged and left off for the rest of the run.
    pub fn init(
        mut gl: B,
        source: &ShaderSource,
        config: &RendererConfig,
        mut hooks: HookRegistry,
        sensor: Box<dyn PowerSensor>,
    ) -> Result<Self, RenderError> {
        let directive = match config.glsl_version.as_deref() {
            Some(raw) => {
                let directive = VersionDirective::from_override(raw);
                info!(directive = %directive, "using configured GLSL version");
                directive
            }
            None => resolve_directive(&gl.shading_language_version()),
        };
        let family = ShaderTemplateFamily::for_directive(&directive)?;
        debug!(?family, shader = %source.path().display(), "building main program");

        let program = build_main_program(&mut gl, &directive, source.body())?;

        let (width, height) = config.surface_size;
        let viewport = Viewport::new(width, height);
        gl.set_viewport(viewport.width, viewport.height);
        gl.use_program(Some(program));
        let uniforms = ShadertoyUniforms::locate(&mut gl, program);
        uniforms.set_resolution(&mut gl, viewport.width, viewport.height);
        uniforms.reset_mouse(&mut gl);

        hooks.fire_init(&mut gl, program, viewport.width, viewport.height);
        // Hooks may have bound programs of their own.
        gl.use_program(Some(program));

        let buffer = gl.create_buffer()?;
        gl.bind_array_buffer(Some(buffer));
        gl.upload_vertices(&FULLSCREEN_QUAD, BufferUsage::Static);
        gl.configure_position_attribute(POSITION_COMPONENTS);

        let overlay = if config.overlay.enabled {
            match OverlayCompositor::create(
                &mut gl,
                &directive,
                Some(source.label()),
                config.overlay.scale,
            ) {
                Ok(overlay) => Some(overlay),
                Err(err) => {
                    warn!(error = %err, "overlay unavailable; continuing without it");
                    None
                }
            }
        } else {
            None
        };

        Ok(Self {
            gl,
            context: RenderContext {
                program,
                buffer,
                viewport,
                directive,
                uniforms,
            },
            overlay,
            hooks,
            sensor,
        })
    }

    /// Draws one frame. `fps` feeds the overlay; a non-positive value hides it.
    pub fn render(&mut self, sample: TimeSample, fps: f32) {
        self.context.uniforms.update_time(&mut self.gl, sample);
        self.hooks
            .fire_render(&mut self.gl, sample.frame_index, sample.seconds);
        self.gl.draw_triangles(QUAD_VERTICES);

        if let Some(overlay) = self.overlay.as_mut() {
            let power_mw = if fps > 0.0 {
                self.sensor.read_power_mw()
            } else {
                None
            };
            overlay.draw(&mut self.gl, self.context.viewport, fps, power_mw);
        }
    }

    /// Applies a new drawable size. Zero dimensions are clamped to 1.
    pub fn resize(&mut self, width: u32, height: u32) {
        let viewport = Viewport::new(width, height);
        if viewport == self.context.viewport {
            return;
        }
        debug!(width = viewport.width, height = viewport.height, "resizing");
        self.context.viewport = viewport;
        self.gl.set_viewport(viewport.width, viewport.height);
        self.context
            .uniforms
            .set_resolution(&mut self.gl, viewport.width, viewport.height);
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    pub fn overlay_enabled(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn overlay(&self) -> Option<&OverlayCompositor> {
        self.overlay.as_ref()
    }

    pub fn gl(&self) -> &B {
        &self.gl
    }

    pub fn gl_mut(&mut self) -> &mut B {
        &mut self.gl
    }
}
