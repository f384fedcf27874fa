//! zsteg sweep over PNG artifacts.

use super::AnalysisContext;
use crate::error::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

/// Skip reason recorded for non-PNG artifacts.
pub const PNG_ONLY: &str = "zsteg is PNG-only";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZstegReport {
    pub available: bool,
    pub returncode: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

pub async fn analyze(ctx: Arc<AnalysisContext>) -> Result<ZstegReport> {
    let tools = &ctx.config.tools;
    let inv = tools
        .command("zsteg")
        .arg("-a")
        .path_arg(ctx.artifact.path())
        .timeout_secs(tools.zsteg_secs)
        .run()
        .await;
    let available = !inv.is_unavailable();
    if !available {
        warn!(status = ?inv.status, "zsteg unavailable");
    }
    Ok(ZstegReport {
        available,
        returncode: inv.returncode,
        stdout: inv.stdout,
        stderr: inv.stderr,
    })
}
