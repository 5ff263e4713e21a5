//! ShaderToy-convention shader preparation: works out which GLSL dialect the
//! driver speaks and wraps a `mainImage` body into sources for it.
//!
//! ```text
//!   GL_SHADING_LANGUAGE_VERSION ──▶ version::resolve_directive ──▶ VersionDirective
//!                                                                    │
//!   shader file ──▶ ShaderSource ──────────────────────▶ template::synthesize ──▶ ShaderSources
//! ```
mod path;
mod source;
mod template;
mod version;

pub use path::PathResolver;
pub use source::{ShaderSource, SourceError};
pub use template::{
    overlay_sources, synthesize, ShaderSources, ShaderTemplateFamily, BODY_MARKER,
    MODERN_THRESHOLD,
};
pub use version::{
    resolve_directive, Profile, ShadingLanguageVersion, VersionDirective, VersionError,
};
