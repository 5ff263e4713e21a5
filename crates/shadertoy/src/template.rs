//! Wraps a `mainImage` body into complete vertex and fragment sources for the
//! dialect picked by `version`.
//!
//! The legacy family (`attribute`, `gl_FragColor`) covers GLSL 1.x and GLSL ES
//! 1.00 as well as contexts whose version could not be detected. The modern
//! family (`in`/`out`, a declared color output) is used from 300 upwards.
use crate::version::{VersionDirective, VersionError};

/// Directive values at or above this number use `in`/`out` qualifiers.
pub const MODERN_THRESHOLD: i64 = 300;

/// Marker line written immediately before the embedded user body.
pub const BODY_MARKER: &str = "// Shader body";

const PRECISION_BLOCK: &str = "#ifdef GL_FRAGMENT_PRECISION_HIGH
precision highp float;
#else
precision mediump float;
#endif
";

const UNIFORM_BLOCK: &str = "uniform vec3      iResolution;           // viewport resolution (in pixels)
uniform float     iTime;                 // shader playback time (in seconds)
uniform int       iFrame;                // current frame number
uniform vec4      iMouse;                // mouse pixel coords
uniform vec4      iDate;                 // (year, month, day, time in seconds)
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderTemplateFamily {
    Legacy,
    Modern,
}

impl ShaderTemplateFamily {
    /// Picks the family from the directive's leading number.
    ///
    /// An empty directive selects [`ShaderTemplateFamily::Legacy`]; a directive
    /// that is present but not numeric is an error.
    pub fn for_directive(directive: &VersionDirective) -> Result<Self, VersionError> {
        Ok(match directive.number()? {
            Some(number) if number >= MODERN_THRESHOLD => Self::Modern,
            _ => Self::Legacy,
        })
    }

    fn input_keyword(self) -> &'static str {
        match self {
            Self::Legacy => "attribute",
            Self::Modern => "in",
        }
    }
}

/// A vertex/fragment pair ready for the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    pub family: ShaderTemplateFamily,
    pub vertex: String,
    pub fragment: String,
}

/// Builds the full-screen program around the user's `mainImage` body.
///
/// The body is embedded verbatim after [`BODY_MARKER`]; nothing here checks
/// that it actually defines `mainImage(out vec4, in vec2)`.
pub fn synthesize(directive: &VersionDirective, body: &str) -> Result<ShaderSources, VersionError> {
    let family = ShaderTemplateFamily::for_directive(directive)?;
    let version_line = directive.line();

    let vertex = format!(
        "{version_line}

{input} vec3 position;

void main()
{{
    gl_Position = vec4(position, 1.0);
}}
",
        input = family.input_keyword(),
    );

    let (output_decl, output_target) = match family {
        ShaderTemplateFamily::Legacy => ("", "gl_FragColor"),
        ShaderTemplateFamily::Modern => ("out vec4 outColor;\n\n", "outColor"),
    };

    let fragment = format!(
        "{version_line}

{PRECISION_BLOCK}
{output_decl}{UNIFORM_BLOCK}
{BODY_MARKER}
{body}

void main()
{{
    mainImage({output_target}, gl_FragCoord.xy);
}}
"
    );

    Ok(ShaderSources {
        family,
        vertex,
        fragment,
    })
}

/// Builds the flat white program used to draw overlay text.
pub fn overlay_sources(directive: &VersionDirective) -> Result<ShaderSources, VersionError> {
    let family = ShaderTemplateFamily::for_directive(directive)?;
    let version_line = directive.line();

    let vertex = format!(
        "{version_line}
{input} vec2 position;
void main() {{ gl_Position = vec4(position, 0.0, 1.0); }}
",
        input = family.input_keyword(),
    );

    let fragment = match family {
        ShaderTemplateFamily::Legacy => format!(
            "{version_line}
{PRECISION_BLOCK}void main() {{ gl_FragColor = vec4(1.0, 1.0, 1.0, 1.0); }}
"
        ),
        ShaderTemplateFamily::Modern => format!(
            "{version_line}
precision mediump float;
out vec4 outColor;
void main() {{ outColor = vec4(1.0, 1.0, 1.0, 1.0); }}
"
        ),
    };

    Ok(ShaderSources {
        family,
        vertex,
        fragment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = "void mainImage(out vec4 fragColor, in vec2 fragCoord)
{
    vec2 uv = fragCoord / iResolution.xy;
    fragColor = vec4(uv, 0.5 + 0.5 * sin(iTime), 1.0);
}";

    fn family_for(value: &str) -> ShaderTemplateFamily {
        ShaderTemplateFamily::for_directive(&VersionDirective::from_override(value)).unwrap()
    }

    /// Text between the body marker and the generated `main`.
    fn embedded_body(fragment: &str) -> &str {
        let start = fragment.find(BODY_MARKER).unwrap() + BODY_MARKER.len() + 1;
        let end = fragment.rfind("\n\nvoid main()").unwrap();
        &fragment[start..end]
    }

    #[test]
    fn family_follows_directive_number() {
        assert_eq!(family_for("100"), ShaderTemplateFamily::Legacy);
        assert_eq!(family_for("150"), ShaderTemplateFamily::Legacy);
        assert_eq!(family_for("300 es"), ShaderTemplateFamily::Modern);
        assert_eq!(family_for("310 es"), ShaderTemplateFamily::Modern);
        assert_eq!(
            ShaderTemplateFamily::for_directive(&VersionDirective::none()).unwrap(),
            ShaderTemplateFamily::Legacy
        );
    }

    #[test]
    fn garbage_directive_is_rejected() {
        let directive = VersionDirective::from_override("core");
        assert!(synthesize(&directive, BODY).is_err());
        assert!(overlay_sources(&directive).is_err());
    }

    #[test]
    fn body_is_embedded_verbatim() {
        for directive in ["", "100", "300 es", "450"] {
            let sources = synthesize(&VersionDirective::from_override(directive), BODY).unwrap();
            assert_eq!(embedded_body(&sources.fragment), BODY);
        }
    }

    #[test]
    fn legacy_sources_use_attribute_and_builtin_output() {
        let sources = synthesize(&VersionDirective::from_override("100"), BODY).unwrap();
        assert!(sources.vertex.starts_with("#version 100\n"));
        assert!(sources.vertex.contains("attribute vec3 position;"));
        assert!(sources.fragment.contains("mainImage(gl_FragColor, gl_FragCoord.xy);"));
        assert!(!sources.fragment.contains("out vec4 outColor;"));
    }

    #[test]
    fn modern_sources_declare_output() {
        let sources = synthesize(&VersionDirective::from_override("310 es"), BODY).unwrap();
        assert!(sources.vertex.starts_with("#version 310 es\n"));
        assert!(sources.vertex.contains("in vec3 position;"));
        assert!(sources.fragment.contains("out vec4 outColor;"));
        assert!(sources.fragment.contains("mainImage(outColor, gl_FragCoord.xy);"));
    }

    #[test]
    fn fragment_declares_uniform_set() {
        let sources = synthesize(&VersionDirective::none(), BODY).unwrap();
        for uniform in [
            "uniform vec3      iResolution;",
            "uniform float     iTime;",
            "uniform int       iFrame;",
            "uniform vec4      iMouse;",
            "uniform vec4      iDate;",
        ] {
            assert!(sources.fragment.contains(uniform), "missing {uniform}");
        }
        assert!(sources.fragment.contains("precision mediump float;"));
    }

    #[test]
    fn missing_directive_leaves_no_version_line() {
        let sources = synthesize(&VersionDirective::none(), BODY).unwrap();
        assert!(!sources.vertex.contains("#version"));
        assert!(!sources.fragment.contains("#version"));
        assert_eq!(sources.family, ShaderTemplateFamily::Legacy);
    }

    #[test]
    fn overlay_sources_follow_family() {
        let legacy = overlay_sources(&VersionDirective::none()).unwrap();
        assert!(legacy.vertex.contains("attribute vec2 position;"));
        assert!(legacy.fragment.contains("gl_FragColor"));

        let modern = overlay_sources(&VersionDirective::from_override("300 es")).unwrap();
        assert!(modern.vertex.starts_with("#version 300 es\n"));
        assert!(modern.vertex.contains("in vec2 position;"));
        assert!(modern.fragment.contains("out vec4 outColor;"));
    }
}
