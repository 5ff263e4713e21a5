use shadertoy::{synthesize, VersionDirective};
use tracing::debug;

use crate::gpu::{GlBackend, ProgramHandle};
use crate::RenderError;

/// Wraps `body` for `directive`, then compiles and links the main program.
///
/// Compile and link failures come back as [`RenderError::MainProgram`]; a
/// program that compiled but failed to link is deleted first.
pub(crate) fn build_main_program(
    gl: &mut dyn GlBackend,
    directive: &VersionDirective,
    body: &str,
) -> Result<ProgramHandle, RenderError> {
    let sources = synthesize(directive, body)?;
    debug!(
        family = ?sources.family,
        directive = %directive,
        fragment_len = sources.fragment.len(),
        "synthesized main program"
    );

    let program = gl
        .compile_program(&sources.vertex, &sources.fragment)
        .map_err(RenderError::MainProgram)?;
    if let Err(err) = gl.link_program(program) {
        gl.delete_program(program);
        return Err(RenderError::MainProgram(err));
    }
    Ok(program)
}
