use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("could not read shader '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A `mainImage` body read fully into memory.
#[derive(Debug, Clone)]
pub struct ShaderSource {
    path: PathBuf,
    body: String,
}

impl ShaderSource {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();
        let body = fs::read_to_string(&path).map_err(|source| SourceError::Read {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), bytes = body.len(), "loaded shader body");
        Ok(Self { path, body })
    }

    /// Builds a source from text already in memory; `path` is only used for
    /// labelling.
    pub fn from_parts(path: impl Into<PathBuf>, body: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            body: body.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// File name shown by the overlay, falling back to the full path.
    pub fn label(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_reads_entire_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("wave.frag");
        let body = "void mainImage(out vec4 c, in vec2 p) { c = vec4(1.0); }\n// tail\n";
        fs::write(&path, body).unwrap();

        let source = ShaderSource::load(&path).unwrap();
        assert_eq!(source.body(), body);
        assert_eq!(source.path(), path.as_path());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ShaderSource::load("/nonexistent/glsltoy/missing.frag").unwrap_err();
        assert!(err.to_string().contains("missing.frag"));
    }

    #[test]
    fn label_is_basename() {
        let source = ShaderSource::from_parts("/home/me/shaders/wave.frag", "");
        assert_eq!(source.label(), "wave.frag");
        let bare = ShaderSource::from_parts("wave.frag", "");
        assert_eq!(bare.label(), "wave.frag");
    }
}
