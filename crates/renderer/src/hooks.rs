//! Extension points for code that needs to act when the main program comes up
//! or before each frame is drawn, without touching the frame driver itself.
//!
//! Hooks run in registration order, every time, and receive the GL backend so
//! they can bind textures or write extra uniforms. Registration needs
//! `&mut HookRegistry`, which the driver never hands out while it is firing
//! hooks, so a hook cannot add hooks mid-iteration.

use crate::gpu::{GlBackend, ProgramHandle};

/// Fired once, after the main program is linked, bound, and has its viewport
/// and resolution set.
pub trait InitHook {
    fn on_init(&mut self, gl: &mut dyn GlBackend, program: ProgramHandle, width: u32, height: u32);
}

/// Fired every frame after the time uniforms are written and before the main
/// draw call.
pub trait RenderHook {
    fn on_render(&mut self, gl: &mut dyn GlBackend, frame: u64, time: f32);
}

impl<F> InitHook for F
where
    F: FnMut(&mut dyn GlBackend, ProgramHandle, u32, u32),
{
    fn on_init(&mut self, gl: &mut dyn GlBackend, program: ProgramHandle, width: u32, height: u32) {
        self(gl, program, width, height)
    }
}

impl<F> RenderHook for F
where
    F: FnMut(&mut dyn GlBackend, u64, f32),
{
    fn on_render(&mut self, gl: &mut dyn GlBackend, frame: u64, time: f32) {
        self(gl, frame, time)
    }
}

/// Append-only, ordered hook lists.
#[derive(Default)]
pub struct HookRegistry {
    init: Vec<Box<dyn InitHook>>,
    render: Vec<Box<dyn RenderHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_init_hook(&mut self, hook: Box<dyn InitHook>) {
        self.init.push(hook);
    }

    pub fn add_render_hook(&mut self, hook: Box<dyn RenderHook>) {
        self.render.push(hook);
    }

    /// Registers a closure as an init hook.
    pub fn on_init<F>(&mut self, hook: F)
    where
        F: FnMut(&mut dyn GlBackend, ProgramHandle, u32, u32) + 'static,
    {
        self.add_init_hook(Box::new(hook));
    }

    /// Registers a closure as a render hook.
    pub fn on_render<F>(&mut self, hook: F)
    where
        F: FnMut(&mut dyn GlBackend, u64, f32) + 'static,
    {
        self.add_render_hook(Box::new(hook));
    }

    pub fn init_len(&self) -> usize {
        self.init.len()
    }

    pub fn render_len(&self) -> usize {
        self.render.len()
    }

    pub fn fire_init(
        &mut self,
        gl: &mut dyn GlBackend,
        program: ProgramHandle,
        width: u32,
        height: u32,
    ) {
        for hook in &mut self.init {
            hook.on_init(gl, program, width, height);
        }
    }

    pub fn fire_render(&mut self, gl: &mut dyn GlBackend, frame: u64, time: f32) {
        for hook in &mut self.render {
            hook.on_render(gl, frame, time);
        }
    }
}
