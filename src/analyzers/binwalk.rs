//! Embedded file carving with `binwalk -e`.

use super::AnalysisContext;
use crate::error::Result;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};
use walkdir::WalkDir;

const EXTRACTED_SUFFIX: &str = ".extracted";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BinwalkReport {
    pub summary: String,
    pub stderr: String,
    pub returncode: Option<i32>,
    pub available: bool,
    /// Carved files, session-relative with forward slashes.
    pub extracted_paths: Vec<String>,
}

pub async fn analyze(ctx: Arc<AnalysisContext>) -> Result<BinwalkReport> {
    let session_dir = ctx.session.dir();
    // Stale carve output from an earlier run would otherwise be re-reported.
    remove_extracted_dirs(session_dir)?;

    let tools = &ctx.config.tools;
    let inv = tools
        .command("binwalk")
        .args(["-e", "-q"])
        .path_arg(ctx.artifact.path())
        .current_dir(session_dir)
        .timeout_secs(tools.binwalk_secs)
        .run()
        .await;

    if inv.is_unavailable() {
        warn!(status = ?inv.status, "binwalk unavailable");
        return Ok(BinwalkReport {
            summary: "binwalk not installed on server".to_string(),
            stderr: inv.stderr,
            returncode: inv.returncode,
            available: false,
            extracted_paths: Vec::new(),
        });
    }

    let extracted_paths = list_extracted(session_dir);
    debug!(carved = extracted_paths.len(), "binwalk finished");
    Ok(BinwalkReport {
        summary: inv.stdout,
        stderr: inv.stderr,
        returncode: inv.returncode,
        available: true,
        extracted_paths,
    })
}

fn extracted_dirs(session_dir: &Path) -> Vec<std::path::PathBuf> {
    let Ok(entries) = fs::read_dir(session_dir) else {
        return Vec::new();
    };
    let mut dirs: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(EXTRACTED_SUFFIX))
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .map(|e| e.path())
        .collect();
    dirs.sort();
    dirs
}

fn remove_extracted_dirs(session_dir: &Path) -> Result<()> {
    for dir in extracted_dirs(session_dir) {
        debug!(dir = %dir.display(), "removing stale carve output");
        fs::remove_dir_all(&dir)?;
    }
    Ok(())
}

/// Files under every `*.extracted` directory, relative to the session.
pub fn list_extracted(session_dir: &Path) -> Vec<String> {
    let mut out = Vec::new();
    for dir in extracted_dirs(session_dir) {
        for entry in WalkDir::new(&dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            if let Ok(rel) = entry.path().strip_prefix(session_dir) {
                out.push(crate::triage::extraction::forward_slashes(rel));
            }
        }
    }
    out
}
