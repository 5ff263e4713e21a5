//! Optional TOML settings merged under the command line.
//!
//! ```toml
//! show_overlay = true
//! size = "1280x720"
//! glsl_version = "300 es"
//! overlay_scale = 2.0
//! vsync = true
//! telemetry = false
//! ```
//!
//! The file lives at `<config dir>/glsltoy/config.toml` unless `--config` or
//! `GLSLTOY_CONFIG` names another one. Flags given on the command line win.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories_next::BaseDirs;
use renderer::{OverlayOptions, RendererConfig};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::cli::{parse_scale, parse_size, RunArgs};

pub const ENV_CONFIG: &str = "GLSLTOY_CONFIG";
pub const DEFAULT_WINDOW_SIZE: (u32, u32) = (1280, 720);

const APPLICATION_DIR: &str = "glsltoy";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub show_overlay: Option<bool>,
    pub size: Option<String>,
    pub glsl_version: Option<String>,
    pub overlay_scale: Option<f32>,
    pub vsync: Option<bool>,
    pub telemetry: Option<bool>,
}

impl FileConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: FileConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(size) = self.size.as_deref() {
            parse_size(size).map_err(ConfigError::Invalid)?;
        }
        if let Some(scale) = self.overlay_scale {
            parse_scale(&scale.to_string()).map_err(ConfigError::Invalid)?;
        }
        Ok(())
    }

    /// Combines the file with `args`; any flag present on the command line
    /// takes precedence.
    pub fn renderer_config(
        &self,
        args: &RunArgs,
        shader_source: PathBuf,
    ) -> Result<RendererConfig, ConfigError> {
        let surface_size = match (args.size, self.size.as_deref()) {
            (Some(size), _) => size,
            (None, Some(size)) => parse_size(size).map_err(ConfigError::Invalid)?,
            (None, None) => DEFAULT_WINDOW_SIZE,
        };
        let defaults = OverlayOptions::default();
        let overlay = OverlayOptions {
            enabled: args.overlay || self.show_overlay.unwrap_or(defaults.enabled),
            scale: args
                .overlay_scale
                .or(self.overlay_scale)
                .unwrap_or(defaults.scale),
            telemetry: !args.no_telemetry && self.telemetry.unwrap_or(defaults.telemetry),
        };

        Ok(RendererConfig {
            surface_size,
            shader_source,
            glsl_version: args.glsl_version.clone().or_else(|| self.glsl_version.clone()),
            overlay,
            fixed_time: args.time,
            vsync: !args.no_vsync && self.vsync.unwrap_or(true),
        })
    }
}

/// `<config dir>/glsltoy/config.toml`, when the platform has a config dir.
pub fn default_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.config_dir().join(APPLICATION_DIR).join(CONFIG_FILE))
}

/// Loads `explicit` (which must exist) or else the default file if present.
pub fn load(explicit: Option<&Path>) -> Result<FileConfig, ConfigError> {
    load_from(explicit, default_path())
}

fn load_from(explicit: Option<&Path>, default: Option<PathBuf>) -> Result<FileConfig, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default {
            Some(path) if path.is_file() => path,
            _ => {
                debug!("no configuration file; using defaults");
                return Ok(FileConfig::default());
            }
        },
    };
    debug!(path = %path.display(), "loading configuration");
    let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    FileConfig::from_toml_str(&contents)
}
