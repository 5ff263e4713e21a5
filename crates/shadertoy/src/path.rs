//! Expands user-supplied shader and config paths so the CLI, the config file,
//! and the renderer agree on where a file lives.
//!
//! `PathResolver` remembers the working directory the process started in and
//! applies `$VAR`/`${VAR}` expansion followed by `~` expansion before joining
//! relative paths onto that directory.
use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use directories_next::BaseDirs;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct PathResolver {
    cwd: PathBuf,
}

impl PathResolver {
    pub fn new() -> Result<Self> {
        let cwd = env::current_dir().context("failed to resolve current working directory")?;
        Ok(Self { cwd })
    }

    pub fn with_cwd<P: Into<PathBuf>>(cwd: P) -> Self {
        Self { cwd: cwd.into() }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Expands variables and `~` without touching the filesystem.
    pub fn expand(&self, input: &str) -> Result<PathBuf> {
        let with_vars = expand_variables(input)?;
        let path = expand_tilde(&with_vars)?;
        debug!(original = %input, expanded = %path.display(), "expanded path");
        Ok(path)
    }

    /// Expands `input` and anchors relative results at the working directory.
    pub fn resolve(&self, input: &str) -> Result<PathBuf> {
        if input.trim().is_empty() {
            bail!("path must not be empty");
        }
        let expanded = self.expand(input)?;
        if expanded.is_absolute() {
            return Ok(expanded);
        }
        let anchored = self.cwd.join(&expanded);
        debug!(original = %input, resolved = %anchored.display(), "anchored relative path");
        Ok(anchored)
    }
}

fn expand_tilde(input: &str) -> Result<PathBuf> {
    let rest = match input.strip_prefix('~') {
        Some(rest) => rest,
        None => return Ok(PathBuf::from(input)),
    };
    if !rest.is_empty() && !rest.starts_with('/') {
        bail!("'~user' expansion is not supported in '{input}'");
    }
    let dirs = BaseDirs::new().ok_or_else(|| anyhow!("unable to determine home directory"))?;
    let home = dirs.home_dir();
    Ok(match rest.strip_prefix('/') {
        Some(tail) if !tail.is_empty() => home.join(tail),
        _ => home.to_path_buf(),
    })
}

fn expand_variables(input: &str) -> Result<String> {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find(['$', '\\']) {
        output.push_str(&rest[..pos]);
        let marker = rest.as_bytes()[pos];
        rest = &rest[pos + 1..];

        if marker == b'\\' {
            // Escaped character is copied as-is; a trailing backslash is kept.
            match rest.chars().next() {
                Some(ch) => {
                    output.push(ch);
                    rest = &rest[ch.len_utf8()..];
                }
                None => output.push('\\'),
            }
            continue;
        }

        let (name, remainder) = if let Some(braced) = rest.strip_prefix('{') {
            let close = braced
                .find('}')
                .ok_or_else(|| anyhow!("missing closing '}}' in '{input}'"))?;
            if close == 0 {
                bail!("empty variable name in '{input}'");
            }
            (&braced[..close], &braced[close + 1..])
        } else {
            let len = rest
                .find(|ch: char| !(ch == '_' || ch.is_ascii_alphanumeric()))
                .unwrap_or(rest.len());
            (&rest[..len], &rest[len..])
        };

        if name.is_empty() {
            output.push('$');
        } else {
            let value =
                env::var(name).map_err(|_| anyhow!("environment variable '{name}' is not set"))?;
            output.push_str(&value);
        }
        rest = remainder;
    }

    output.push_str(rest);
    Ok(output)
}
