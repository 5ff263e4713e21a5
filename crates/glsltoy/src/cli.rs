use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::ENV_CONFIG;

#[derive(Parser, Debug)]
#[command(
    name = "glsltoy",
    author,
    version,
    about = "Renders a ShaderToy-style GLSL fragment shader in a window",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Shader body defining `mainImage(out vec4, in vec2)`.
    #[arg(value_name = "SHADER")]
    pub shader: Option<String>,

    /// Draw the file name and frame rate over the shader.
    #[arg(long, visible_alias = "hud")]
    pub overlay: bool,

    /// Window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Use this `#version` value instead of asking the driver (e.g. `300 es`).
    #[arg(long, value_name = "VERSION")]
    pub glsl_version: Option<String>,

    /// Overlay text scale.
    #[arg(long, value_name = "SCALE", value_parser = parse_scale)]
    pub overlay_scale: Option<f32>,

    /// Present frames as fast as possible instead of waiting for vblank.
    #[arg(long)]
    pub no_vsync: bool,

    /// Leave GPU power out of the overlay.
    #[arg(long)]
    pub no_telemetry: bool,

    /// Freeze `iTime` at the given number of seconds.
    #[arg(long, value_name = "SECONDS")]
    pub time: Option<f32>,

    /// Configuration file to load instead of the default location.
    #[arg(long, value_name = "FILE", env = ENV_CONFIG)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the synthesized shader source without opening a window.
    Wrap(WrapArgs),
}

#[derive(Parser, Debug)]
pub struct WrapArgs {
    #[arg(value_name = "SHADER")]
    pub shader: String,

    /// `#version` value to synthesize for; omit for the legacy template.
    #[arg(long, value_name = "VERSION")]
    pub glsl_version: Option<String>,

    #[arg(long, value_enum, default_value_t = Stage::Fragment)]
    pub stage: Stage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Stage {
    Fragment,
    Vertex,
    OverlayVertex,
    OverlayFragment,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let trimmed = value.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X', '×'])
        .ok_or_else(|| "expected WxH format, e.g. 1280x720".to_string())?;

    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width in size '{trimmed}'"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height in size '{trimmed}'"))?;

    if width == 0 || height == 0 {
        return Err("window dimensions must be greater than zero".to_string());
    }
    Ok((width, height))
}

pub fn parse_scale(value: &str) -> Result<f32, String> {
    let scale: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid overlay scale '{value}'"))?;
    if !scale.is_finite() || scale <= 0.0 {
        return Err(format!("overlay scale must be positive, got {scale}"));
    }
    Ok(scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_accepts_common_separators() {
        assert_eq!(parse_size("1280x720"), Ok((1280, 720)));
        assert_eq!(parse_size(" 640 X 480 "), Ok((640, 480)));
        assert_eq!(parse_size("800×600"), Ok((800, 600)));
    }

    #[test]
    fn size_rejects_bad_input() {
        assert!(parse_size("1280").is_err());
        assert!(parse_size("0x720").is_err());
        assert!(parse_size("widexhigh").is_err());
    }

    #[test]
    fn scale_must_be_positive() {
        assert_eq!(parse_scale("3"), Ok(3.0));
        assert!(parse_scale("0").is_err());
        assert!(parse_scale("-1.5").is_err());
        assert!(parse_scale("NaN").is_err());
    }

    #[test]
    fn run_flags_parse() {
        let cli = Cli::try_parse_from([
            "glsltoy",
            "wave.frag",
            "--hud",
            "--size",
            "640x360",
            "--glsl-version",
            "300 es",
            "--no-vsync",
            "--time",
            "1.5",
        ])
        .unwrap();
        assert!(cli.command.is_none());
        let run = cli.run;
        assert_eq!(run.shader.as_deref(), Some("wave.frag"));
        assert!(run.overlay);
        assert_eq!(run.size, Some((640, 360)));
        assert_eq!(run.glsl_version.as_deref(), Some("300 es"));
        assert!(run.no_vsync);
        assert!(!run.no_telemetry);
        assert_eq!(run.time, Some(1.5));
    }

    #[test]
    fn wrap_subcommand_parses_stage() {
        let cli = Cli::try_parse_from(["glsltoy", "wrap", "wave.frag", "--stage", "overlay-vertex"])
            .unwrap();
        match cli.command {
            Some(Command::Wrap(args)) => {
                assert_eq!(args.shader, "wave.frag");
                assert_eq!(args.stage, Stage::OverlayVertex);
                assert!(args.glsl_version.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
