//! outguess and openstego extraction attempts.
//!
//! Each tool is first launched with its help flag. Only a launch failure
//! marks it unavailable, since both print usage with a non-zero exit status.

use super::AnalysisContext;
use crate::error::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LegacyToolOutcome {
    Ran {
        available: bool,
        returncode: Option<i32>,
        stdout: String,
        stderr: String,
    },
    Unavailable {
        available: bool,
        error: String,
    },
}

impl LegacyToolOutcome {
    fn unavailable(tool: &str) -> Self {
        LegacyToolOutcome::Unavailable {
            available: false,
            error: format!("{} not installed", tool),
        }
    }

    pub fn stdout(&self) -> Option<&str> {
        match self {
            LegacyToolOutcome::Ran { stdout, .. } => Some(stdout),
            LegacyToolOutcome::Unavailable { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegacyToolsReport {
    pub outguess: LegacyToolOutcome,
    pub openstego: LegacyToolOutcome,
}

pub async fn analyze(ctx: Arc<AnalysisContext>) -> Result<LegacyToolsReport> {
    let tools = &ctx.config.tools;
    let session_dir = ctx.session.dir();

    let outguess = if is_launchable(&ctx, "outguess", "-h").await {
        ran(tools
            .command("outguess")
            .arg("-r")
            .path_arg(ctx.artifact.path())
            .arg("outguess_extracted")
            .current_dir(session_dir)
            .timeout_secs(tools.outguess_secs)
            .run()
            .await)
    } else {
        LegacyToolOutcome::unavailable("outguess")
    };

    let openstego = if is_launchable(&ctx, "openstego", "-help").await {
        ran(tools
            .command("openstego")
            .args(["extract", "-sf"])
            .path_arg(ctx.artifact.path())
            .args(["-p", ""])
            .current_dir(session_dir)
            .timeout_secs(tools.openstego_secs)
            .run()
            .await)
    } else {
        LegacyToolOutcome::unavailable("openstego")
    };

    Ok(LegacyToolsReport {
        outguess,
        openstego,
    })
}

async fn is_launchable(ctx: &AnalysisContext, tool: &str, help_flag: &str) -> bool {
    let inv = ctx
        .config
        .tools
        .command(tool)
        .arg(help_flag)
        .timeout_secs(ctx.config.tools.availability_secs)
        .run()
        .await;
    if inv.is_not_found() {
        warn!(tool, "tool not installed");
        return false;
    }
    true
}

fn ran(inv: crate::tools::ToolInvocation) -> LegacyToolOutcome {
    LegacyToolOutcome::Ran {
        available: true,
        returncode: inv.returncode,
        stdout: inv.stdout,
        stderr: inv.stderr,
    }
}
