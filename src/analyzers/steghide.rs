//! steghide info check and empty-passphrase extraction.

use super::AnalysisContext;
use crate::error::Result;
use crate::tools::ToolInvocation;
use serde::Serialize;
use std::fs;
use std::sync::Arc;
use tracing::{debug, warn};

/// Output file written by `steghide extract`, relative to the session.
pub const EXTRACTED_NAME: &str = "steghide_extracted";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SteghideStep {
    pub returncode: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_file: Option<String>,
}

impl From<ToolInvocation> for SteghideStep {
    fn from(inv: ToolInvocation) -> Self {
        Self {
            returncode: inv.returncode,
            stdout: inv.stdout,
            stderr: inv.stderr,
            extracted_file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SteghideReport {
    pub available: bool,
    pub info: SteghideStep,
    /// None when steghide is unavailable.
    pub extract: Option<SteghideStep>,
}

pub async fn analyze(ctx: Arc<AnalysisContext>) -> Result<SteghideReport> {
    let tools = &ctx.config.tools;
    let session_dir = ctx.session.dir();

    let info = tools
        .command("steghide")
        .arg("info")
        .path_arg(ctx.artifact.path())
        .args(["-p", ""])
        .current_dir(session_dir)
        .timeout_secs(tools.steghide_info_secs)
        .run()
        .await;

    if info.is_unavailable() {
        warn!(status = ?info.status, "steghide unavailable");
        return Ok(SteghideReport {
            available: false,
            info: SteghideStep {
                returncode: info.returncode,
                stdout: String::new(),
                stderr: "steghide not installed on server".to_string(),
                extracted_file: None,
            },
            extract: None,
        });
    }

    let out_path = ctx.output_path(EXTRACTED_NAME);
    // steghide refuses to overwrite; a leftover file would fake a fresh extraction.
    if out_path.exists() {
        debug!(path = %out_path.display(), "removing stale steghide output");
        fs::remove_file(&out_path)?;
    }

    let extract = tools
        .command("steghide")
        .args(["extract", "-sf"])
        .path_arg(ctx.artifact.path())
        .args(["-p", "", "-xf", EXTRACTED_NAME])
        .current_dir(session_dir)
        .timeout_secs(tools.steghide_extract_secs)
        .run()
        .await;

    let mut extract = SteghideStep::from(extract);
    if out_path.exists() {
        extract.extracted_file = Some(EXTRACTED_NAME.to_string());
    }

    Ok(SteghideReport {
        available: true,
        info: SteghideStep::from(info),
        extract: Some(extract),
    })
}
