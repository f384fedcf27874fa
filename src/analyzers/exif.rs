//! Metadata extraction via exiftool plus the embedded EXIF block.
//!
//! The embedded block is parsed in-process with kamadak-exif and reported
//! under the `pillow` key, which downstream consumers already expect.

use super::AnalysisContext;
use crate::error::Result;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExiftoolOutcome {
    Data {
        available: bool,
        data: Map<String, Value>,
    },
    Error {
        available: bool,
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExifReport {
    /// None when exiftool exited non-zero without stderr.
    pub exiftool: Option<ExiftoolOutcome>,
    /// Embedded EXIF tags by name; None when absent or unreadable.
    pub pillow: Option<BTreeMap<String, String>>,
}

pub async fn analyze(ctx: Arc<AnalysisContext>) -> Result<ExifReport> {
    let tools = &ctx.config.tools;
    let inv = tools
        .command("exiftool")
        .arg("-json")
        .path_arg(ctx.artifact.path())
        .timeout_secs(tools.exiftool_secs)
        .run()
        .await;

    let exiftool = if inv.is_unavailable() {
        warn!(status = ?inv.status, "exiftool unavailable");
        Some(ExiftoolOutcome::Error {
            available: false,
            error: "exiftool not installed on server".to_string(),
        })
    } else if inv.succeeded() {
        Some(parse_exiftool(&inv.stdout))
    } else if !inv.stderr.is_empty() {
        Some(ExiftoolOutcome::Error {
            available: true,
            error: inv.stderr.trim().to_string(),
        })
    } else {
        None
    };

    let pillow = embedded_exif(ctx.artifact.bytes());
    Ok(ExifReport { exiftool, pillow })
}

/// exiftool -json prints an array with one object per input file.
fn parse_exiftool(stdout: &str) -> ExiftoolOutcome {
    match serde_json::from_str::<Value>(stdout) {
        Ok(Value::Array(items)) => {
            let data = items
                .into_iter()
                .next()
                .and_then(|first| match first {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .unwrap_or_default();
            ExiftoolOutcome::Data {
                available: true,
                data,
            }
        }
        Ok(_) => ExiftoolOutcome::Data {
            available: true,
            data: Map::new(),
        },
        Err(e) => {
            debug!(error = %e, "exiftool output is not JSON");
            ExiftoolOutcome::Error {
                available: true,
                error: "failed to parse exiftool output".to_string(),
            }
        }
    }
}

/// Tag name to display value; the first occurrence of a tag wins.
fn embedded_exif(bytes: &[u8]) -> Option<BTreeMap<String, String>> {
    let parsed = ::exif::Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()?;
    let mut tags = BTreeMap::new();
    for field in parsed.fields() {
        tags.entry(field.tag.to_string()).or_insert_with(|| tag_text(field, &parsed));
    }
    Some(tags)
}

/// ASCII values come back as bare text; kamadak's display form quotes them.
fn tag_text(field: &::exif::Field, parsed: &::exif::Exif) -> String {
    match &field.value {
        ::exif::Value::Ascii(parts) => parts
            .iter()
            .map(|part| String::from_utf8_lossy(part).trim_end_matches('\0').to_string())
            .collect::<Vec<_>>()
            .join(", "),
        _ => field.display_value().with_unit(parsed).to_string(),
    }
}

impl ExifReport {
    /// String values that the flag detector scans, tagged `exif.<tool>.<key>`.
    pub fn text_fields(&self) -> Vec<(String, &str)> {
        let mut out = Vec::new();
        match &self.exiftool {
            Some(ExiftoolOutcome::Error { error, .. }) => {
                out.push(("exif.exiftool.error".to_string(), error.as_str()));
            }
            Some(ExiftoolOutcome::Data { data, .. }) => {
                for (key, value) in data {
                    if let Value::String(s) = value {
                        out.push((format!("exif.exiftool.{}", key), s.as_str()));
                    }
                }
            }
            None => {}
        }
        if let Some(tags) = &self.pillow {
            for (key, value) in tags {
                out.push((format!("exif.pillow.{}", key), value.as_str()));
            }
        }
        out
    }
}
