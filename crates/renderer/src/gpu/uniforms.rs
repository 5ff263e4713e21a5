use chrono::{Datelike, Local, Timelike};

use super::{GlBackend, ProgramHandle, UniformLocation, UniformValue};
use crate::runtime::TimeSample;

/// Locations of the ShaderToy uniforms in the main program.
///
/// Any uniform the user body never reads is optimized out by the driver; its
/// location is `None` and writes to it are skipped.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ShadertoyUniforms {
    resolution: Option<UniformLocation>,
    time: Option<UniformLocation>,
    frame: Option<UniformLocation>,
    mouse: Option<UniformLocation>,
    date: Option<UniformLocation>,
}

impl ShadertoyUniforms {
    pub fn locate(gl: &mut dyn GlBackend, program: ProgramHandle) -> Self {
        Self {
            resolution: gl.uniform_location(program, "iResolution"),
            time: gl.uniform_location(program, "iTime"),
            frame: gl.uniform_location(program, "iFrame"),
            mouse: gl.uniform_location(program, "iMouse"),
            date: gl.uniform_location(program, "iDate"),
        }
    }

    /// Expects the main program to be bound.
    pub fn set_resolution(&self, gl: &mut dyn GlBackend, width: u32, height: u32) {
        write(
            gl,
            self.resolution,
            UniformValue::Vec3([width as f32, height as f32, 0.0]),
        );
    }

    /// Zeroes the reserved mouse input.
    pub fn reset_mouse(&self, gl: &mut dyn GlBackend) {
        write(gl, self.mouse, UniformValue::Vec4([0.0; 4]));
    }

    /// Expects the main program to be bound.
    pub fn update_time(&self, gl: &mut dyn GlBackend, sample: TimeSample) {
        write(gl, self.time, UniformValue::Float(sample.seconds));
        // Declared `int` in the templates.
        let frame = sample.frame_index.min(i32::MAX as u64) as i32;
        write(gl, self.frame, UniformValue::Int(frame));
        if self.date.is_some() {
            write(gl, self.date, UniformValue::Vec4(local_date()));
        }
    }
}

fn write(gl: &mut dyn GlBackend, location: Option<UniformLocation>, value: UniformValue) {
    if let Some(location) = location {
        gl.set_uniform(location, value);
    }
}

/// `(year, month, day, seconds since midnight)` in local time.
fn local_date() -> [f32; 4] {
    let now = Local::now();
    let seconds_since_midnight =
        now.num_seconds_from_midnight() as f32 + now.nanosecond() as f32 / 1_000_000_000.0;
    [
        now.year() as f32,
        now.month() as f32,
        now.day() as f32,
        seconds_since_midnight,
    ]
}
