//! Printable string extraction, ASCII and UTF-16LE.
//!
//! Runs `strings -a` and `strings -a -el`. When the binary is unavailable
//! and native fallback is enabled, the in-process scanner fills the
//! section instead and the section's engine reads `native`.

use super::AnalysisContext;
use crate::error::Result;
use crate::strings::{scan_ascii, scan_utf16le};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StringsEngine {
    Strings,
    Native,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StringsSection {
    pub cmd: Vec<String>,
    pub returncode: Option<i32>,
    pub stderr: String,
    pub available: bool,
    /// Non-empty lines seen, before sampling.
    pub count: usize,
    pub sample: Vec<String>,
    pub engine: StringsEngine,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StringsReport {
    pub ascii: StringsSection,
    pub utf16: StringsSection,
}

#[derive(Debug, Clone, Copy)]
enum Encoding {
    Ascii,
    Utf16Le,
}

pub async fn analyze(ctx: Arc<AnalysisContext>) -> Result<StringsReport> {
    let ascii = run_section(&ctx, &["-a"], Encoding::Ascii).await;
    let utf16 = run_section(&ctx, &["-a", "-el"], Encoding::Utf16Le).await;
    Ok(StringsReport { ascii, utf16 })
}

async fn run_section(ctx: &AnalysisContext, flags: &[&str], encoding: Encoding) -> StringsSection {
    let cfg = &ctx.config.strings;
    let inv = ctx
        .config
        .tools
        .command("strings")
        .args(flags.iter().copied())
        .path_arg(ctx.artifact.path())
        .timeout_secs(ctx.config.tools.strings_secs)
        .run()
        .await;

    let available = !inv.is_unavailable();
    let (lines, engine) = if !available && cfg.native_fallback {
        warn!(?encoding, status = ?inv.status, "strings unavailable, scanning in-process");
        let found = match encoding {
            Encoding::Ascii => scan_ascii(ctx.artifact.bytes(), cfg.min_length),
            Encoding::Utf16Le => scan_utf16le(ctx.artifact.bytes(), cfg.min_length),
        };
        (clean_lines(found.iter().map(String::as_str)), StringsEngine::Native)
    } else {
        (clean_lines(inv.stdout.lines()), StringsEngine::Strings)
    };

    debug!(?encoding, count = lines.len(), ?engine, "strings section done");
    let count = lines.len();
    let mut sample = lines;
    sample.truncate(cfg.max_samples);
    StringsSection {
        cmd: inv.cmd,
        returncode: inv.returncode,
        stderr: inv.stderr.trim().to_string(),
        available,
        count,
        sample,
        engine,
    }
}

/// Trimmed, non-empty lines.
fn clean_lines<'a, I>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
