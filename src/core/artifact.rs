//! The uploaded artifact every analyzer reads.

use crate::error::Result;
use crate::io::{IOLimits, SafeReader};
use crate::triage::config::IOConfig;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Format tag derived from the artifact's file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Png,
    Jpeg,
    Bmp,
    Other,
}

impl ArtifactKind {
    pub fn from_extension(ext: &str) -> Self {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "png" => ArtifactKind::Png,
            "jpg" | "jpeg" => ArtifactKind::Jpeg,
            "bmp" => ArtifactKind::Bmp,
            _ => ArtifactKind::Other,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        Self::from_extension(&dotted_extension(path))
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, ArtifactKind::Other)
    }
}

/// Lowercased extension including the leading dot, or empty.
pub fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_ascii_lowercase()))
        .unwrap_or_default()
}

/// Immutable artifact: on-disk location (for external tools) plus content bytes.
#[derive(Debug, Clone)]
pub struct Artifact {
    path: PathBuf,
    bytes: Vec<u8>,
    kind: ArtifactKind,
}

impl Artifact {
    /// Read an artifact from disk, bounded by the configured size ceiling.
    pub fn load<P: AsRef<Path>>(path: P, io: &IOConfig) -> Result<Self> {
        let path = path.as_ref();
        let reader = SafeReader::open(path, IOLimits::whole_file(io.max_file_size))?;
        let bytes = reader.read_all()?;
        debug!(path = %path.display(), size = bytes.len(), "artifact loaded");
        Ok(Self::from_parts(path, bytes))
    }

    /// Wrap bytes already known to live at `path`.
    pub fn from_parts<P: AsRef<Path>>(path: P, bytes: Vec<u8>) -> Self {
        let path = path.as_ref().to_path_buf();
        let kind = ArtifactKind::from_path(&path);
        Self { path, bytes, kind }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// Lowercased extension with its dot, e.g. ".png".
    pub fn extension(&self) -> String {
        dotted_extension(&self.path)
    }
}
