use std::io::{self, Write};

use anyhow::{anyhow, Context, Result};
use renderer::HookRegistry;
use shadertoy::{overlay_sources, synthesize, PathResolver, ShaderSource, VersionDirective};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, RunArgs, Stage, WrapArgs};
use crate::config;

const DEFAULT_FILTER: &str = "warn,glsltoy=info,renderer=info,shadertoy=info";

pub fn run(cli: Cli) -> Result<()> {
    initialise_tracing();

    match cli.command {
        Some(Command::Wrap(args)) => wrap(&args),
        None => run_window(&cli.run),
    }
}

fn initialise_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run_window(args: &RunArgs) -> Result<()> {
    let shader = args
        .shader
        .as_deref()
        .ok_or_else(|| anyhow!("no shader given; see `glsltoy --help`"))?;
    let resolver = PathResolver::new()?;
    let shader_path = resolver
        .resolve(shader)
        .with_context(|| format!("failed to resolve shader path '{shader}'"))?;

    let file_config =
        config::load(args.config.as_deref()).context("failed to load configuration")?;
    let renderer_config = file_config.renderer_config(args, shader_path)?;
    tracing::info!(
        shader = %renderer_config.shader_source.display(),
        width = renderer_config.surface_size.0,
        height = renderer_config.surface_size.1,
        overlay = renderer_config.overlay.enabled,
        "starting glsltoy"
    );

    renderer::run(renderer_config, HookRegistry::new())
}

/// Prints one synthesized stage for `args.shader` to stdout.
fn wrap(args: &WrapArgs) -> Result<()> {
    let resolver = PathResolver::new()?;
    let path = resolver.resolve(&args.shader)?;
    let source = ShaderSource::load(&path)?;
    let directive = args
        .glsl_version
        .as_deref()
        .map(VersionDirective::from_override)
        .unwrap_or_default();

    let text = match args.stage {
        Stage::Fragment | Stage::Vertex => {
            let sources = synthesize(&directive, source.body())?;
            tracing::debug!(family = ?sources.family, "synthesized main program");
            if args.stage == Stage::Fragment {
                sources.fragment
            } else {
                sources.vertex
            }
        }
        Stage::OverlayVertex => overlay_sources(&directive)?.vertex,
        Stage::OverlayFragment => overlay_sources(&directive)?.fragment,
    };

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .context("failed to write shader source")?;
    stdout.flush().context("failed to write shader source")
}
