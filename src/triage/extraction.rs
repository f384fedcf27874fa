//! Extraction surface: every side-effect file left in the session.

use crate::core::report::SideEffectFile;
use crate::core::session::Session;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Join path components with '/' regardless of host separator.
pub fn forward_slashes(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// List regular files under the session directory, sorted by path.
///
/// Symlinks are neither followed nor listed.
pub fn scan(session: &Session) -> Vec<SideEffectFile> {
    let root = session.dir();
    let files: Vec<SideEffectFile> = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let rel = e.path().strip_prefix(root).ok()?;
            let name = forward_slashes(rel);
            Some(SideEffectFile {
                url: session.file_url(&name),
                name,
            })
        })
        .collect();
    debug!(count = files.len(), "extraction surface scanned");
    files
}
