//! Session working directories.
//!
//! One artifact maps to one session directory. Analyzers write their side
//! effects there, and retrieval only ever resolves paths that stay inside it.

use crate::core::artifact::ArtifactKind;
use crate::core::report::ImageRef;
use crate::error::{Result, StegError};
use crate::io::{IOLimits, SafeReader};
use crate::triage::config::IOConfig;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

/// Extensions accepted for ingestion.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// A session-scoped working directory.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    dir: PathBuf,
}

impl Session {
    /// Create a fresh session directory under `root`.
    pub fn create<P: AsRef<Path>>(root: P) -> Result<Self> {
        let id = Uuid::new_v4().simple().to_string();
        let dir = root.as_ref().join(&id);
        fs::create_dir_all(&dir)
            .map_err(|e| StegError::Session(format!("cannot create {}: {}", dir.display(), e)))?;
        info!(session_id = %id, dir = %dir.display(), "session created");
        Ok(Self { id, dir })
    }

    /// Reopen an existing session.
    pub fn open<P: AsRef<Path>>(root: P, id: &str) -> Result<Self> {
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(StegError::Session(format!("invalid session id {:?}", id)));
        }
        let dir = root.as_ref().join(id);
        if !dir.is_dir() {
            return Err(StegError::Session(format!("unknown session {}", id)));
        }
        Ok(Self {
            id: id.to_string(),
            dir,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Store uploaded bytes as `input.<ext>` and return the stored path.
    pub fn ingest(&self, original_name: &str, bytes: &[u8], io: &IOConfig) -> Result<PathBuf> {
        let ext = Path::new(original_name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(StegError::InvalidInput(format!(
                "unsupported file type {:?}",
                original_name
            )));
        }
        debug_assert!(ArtifactKind::from_extension(&ext).is_supported());
        if bytes.len() as u64 > io.max_file_size {
            return Err(StegError::InvalidInput(format!(
                "upload of {} bytes exceeds limit of {} bytes",
                bytes.len(),
                io.max_file_size
            )));
        }
        let dest = self.dir.join(format!("input.{}", ext));
        fs::write(&dest, bytes)?;
        debug!(session_id = %self.id, dest = %dest.display(), "artifact ingested");
        Ok(dest)
    }

    /// Copy a file from disk into the session.
    pub fn ingest_file<P: AsRef<Path>>(&self, source: P, io: &IOConfig) -> Result<PathBuf> {
        let source = source.as_ref();
        let bytes = SafeReader::open(source, IOLimits::whole_file(io.max_file_size))?.read_all()?;
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.ingest(&name, &bytes, io)
    }

    /// Resolve a retrieval path, refusing anything that leaves the session.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let rel = Path::new(relative);
        if relative.is_empty()
            || !rel
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(StegError::UnsafePath(relative.to_string()));
        }
        let root = self.dir.canonicalize()?;
        let candidate = root.join(rel).canonicalize()?;
        // Canonical comparison also rejects symlinks carved out of the artifact.
        if !candidate.starts_with(&root) {
            return Err(StegError::UnsafePath(relative.to_string()));
        }
        Ok(candidate)
    }

    /// Retrieval URL for a session-relative, forward-slash path.
    pub fn file_url(&self, relative: &str) -> String {
        format!("/api/session/{}/files/{}", self.id, relative)
    }

    pub fn image_ref(&self, filename: &str) -> ImageRef {
        ImageRef {
            filename: filename.to_string(),
            url: self.file_url(filename),
        }
    }
}
