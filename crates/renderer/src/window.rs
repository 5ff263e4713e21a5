use std::num::NonZeroU32;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use glutin::config::{Config, ConfigTemplateBuilder};
use glutin::context::{ContextApi, ContextAttributesBuilder, PossiblyCurrentContext};
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use glutin_winit::DisplayBuilder;
use raw_window_handle::HasRawWindowHandle;
use shadertoy::ShaderSource;
use tracing::{debug, error, info};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

use crate::driver::FrameDriver;
use crate::gpu::{GlBackend, GlowBackend};
use crate::hooks::HookRegistry;
use crate::runtime::{time_source_for, BoxedTimeSource, FpsCounter};
use crate::telemetry::{default_sensor, NoPowerSensor, PowerSensor};
use crate::types::RendererConfig;

/// A window with a current GL context and its presentable surface.
struct GlWindow {
    window: Window,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
}

impl GlWindow {
    /// Opens the window and makes a context current on it, asking for desktop
    /// GL first and falling back to GLES.
    fn create(
        event_loop: &EventLoop<()>,
        config: &RendererConfig,
        title: &str,
    ) -> Result<(Self, glow::Context)> {
        let (width, height) = config.surface_size;
        let window_builder = WindowBuilder::new()
            .with_title(title)
            .with_inner_size(PhysicalSize::new(width.max(1), height.max(1)));

        let template = ConfigTemplateBuilder::new().with_alpha_size(8);
        let (window, gl_config) = DisplayBuilder::new()
            .with_window_builder(Some(window_builder))
            .build(event_loop, template, pick_config)
            .map_err(|err| anyhow!("failed to create GL display: {err}"))?;
        let window = window.context("GL display did not create a window")?;

        let raw_window_handle = window.raw_window_handle();
        let gl_display = gl_config.display();
        let desktop = ContextAttributesBuilder::new().build(Some(raw_window_handle));
        let embedded = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::Gles(None))
            .build(Some(raw_window_handle));
        let not_current = unsafe {
            gl_display
                .create_context(&gl_config, &desktop)
                .or_else(|err| {
                    debug!(error = %err, "desktop GL context unavailable; trying GLES");
                    gl_display.create_context(&gl_config, &embedded)
                })
                .context("failed to create GL context")?
        };

        let size = window.inner_size();
        let surface_attributes = SurfaceAttributesBuilder::<WindowSurface>::new().build(
            raw_window_handle,
            non_zero(size.width),
            non_zero(size.height),
        );
        let surface = unsafe {
            gl_display
                .create_window_surface(&gl_config, &surface_attributes)
                .context("failed to create window surface")?
        };
        let context = not_current
            .make_current(&surface)
            .context("failed to make GL context current")?;

        let interval = if config.vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Err(err) = surface.set_swap_interval(&context, interval) {
            debug!(error = %err, vsync = config.vsync, "could not set swap interval");
        }

        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|symbol| {
                gl_display.get_proc_address(symbol) as *const _
            })
        };

        Ok((
            Self {
                window,
                surface,
                context,
            },
            gl,
        ))
    }

    fn resize(&self, size: PhysicalSize<u32>) {
        self.surface
            .resize(&self.context, non_zero(size.width), non_zero(size.height));
    }

    fn swap_buffers(&self) -> Result<()> {
        self.surface
            .swap_buffers(&self.context)
            .context("failed to present frame")
    }
}

/// Prefers the config with the most samples.
fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    configs
        .reduce(|best, candidate| {
            if candidate.num_samples() > best.num_samples() {
                candidate
            } else {
                best
            }
        })
        .expect("glutin offers at least one matching config")
}

fn non_zero(value: u32) -> NonZeroU32 {
    NonZeroU32::new(value).unwrap_or(NonZeroU32::MIN)
}

/// Opens the window and renders until it is closed or Escape is pressed.
pub(crate) fn run(config: RendererConfig, hooks: HookRegistry) -> Result<()> {
    let source = ShaderSource::load(&config.shader_source)
        .with_context(|| format!("failed to load shader {}", config.shader_source.display()))?;

    let event_loop = EventLoop::new().context("failed to initialize event loop")?;
    let title = format!("glsltoy - {}", source.label());
    let (gl_window, gl) = GlWindow::create(&event_loop, &config, &title)?;

    let size = gl_window.window.inner_size();
    let mut driver_config = config.clone();
    driver_config.surface_size = (size.width, size.height);

    let sensor: Box<dyn PowerSensor> = if config.overlay.enabled {
        default_sensor(config.overlay.telemetry)
    } else {
        Box::new(NoPowerSensor)
    };
    let mut driver = FrameDriver::init(
        GlowBackend::new(gl),
        &source,
        &driver_config,
        hooks,
        sensor,
    )
    .context("failed to initialize renderer")?;
    info!(
        shader = %source.path().display(),
        width = size.width,
        height = size.height,
        overlay = driver.overlay_enabled(),
        "renderer ready"
    );

    let mut session = Session {
        driver,
        window: gl_window,
        time_source: time_source_for(config.fixed_time),
        fps: FpsCounter::new(),
    };
    session.window.window.request_redraw();

    event_loop
        .run(move |event, elwt| session.handle(event, elwt))
        .context("event loop terminated with an error")
}

/// Everything the event loop owns.
///
/// Fields drop in declaration order: the driver deletes its GL objects before
/// the window tears down the context they belong to. The loop closure calls a
/// method on the whole session so it is captured as one value.
struct Session<B: GlBackend, W> {
    driver: FrameDriver<B>,
    window: W,
    time_source: BoxedTimeSource,
    fps: FpsCounter,
}

impl Session<GlowBackend, GlWindow> {
    fn handle(&mut self, event: Event<()>, elwt: &EventLoopWindowTarget<()>) {
        elwt.set_control_flow(ControlFlow::Poll);
        match event {
            Event::WindowEvent { window_id, event } if window_id == self.window.window.id() => {
                self.handle_window_event(event, elwt)
            }
            Event::AboutToWait => self.window.window.request_redraw(),
            _ => {}
        }
    }

    fn handle_window_event(&mut self, event: WindowEvent, elwt: &EventLoopWindowTarget<()>) {
        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => elwt.exit(),
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed
                    && matches!(event.logical_key, Key::Named(NamedKey::Escape))
                {
                    elwt.exit();
                }
            }
            WindowEvent::Resized(new_size) => {
                self.window.resize(new_size);
                self.driver.resize(new_size.width, new_size.height);
                self.window.window.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                self.driver.render(self.time_source.sample(), self.fps.fps());
                if let Err(err) = self.window.swap_buffers() {
                    error!("{err:?}");
                    elwt.exit();
                    return;
                }
                self.fps.tick(Instant::now());
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::gpu::recording::RecordingBackend;

    type DropLog = Rc<RefCell<Vec<&'static str>>>;

    struct DropMarker {
        name: &'static str,
        log: DropLog,
    }

    impl Drop for DropMarker {
        fn drop(&mut self) {
            self.log.borrow_mut().push(self.name);
        }
    }

    fn marker(name: &'static str, log: &DropLog) -> DropMarker {
        DropMarker {
            name,
            log: Rc::clone(log),
        }
    }

    #[test]
    fn session_releases_driver_before_window() {
        let log = DropLog::default();
        let mut hooks = HookRegistry::new();
        let driver_marker = marker("driver", &log);
        hooks.on_render(move |_, _, _| {
            let _held = &driver_marker;
        });

        let source = ShaderSource::from_parts(
            "wave.frag",
            "void mainImage(out vec4 c, in vec2 p) { c = vec4(1.0); }",
        );
        let driver = FrameDriver::init(
            RecordingBackend::new("4.60"),
            &source,
            &RendererConfig::default(),
            hooks,
            Box::new(NoPowerSensor),
        )
        .unwrap();

        let session = Session {
            driver,
            window: marker("window", &log),
            time_source: time_source_for(Some(1.0)),
            fps: FpsCounter::new(),
        };
        drop(session);

        assert_eq!(*log.borrow(), ["driver", "window"]);
    }
}
