//! Container header and trailer validation by declared extension.

use super::AnalysisContext;
use crate::error::Result;
use serde::Serialize;
use std::collections::BTreeMap;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const PNG_TRAILER_WINDOW: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderFooter {
    pub file_type: Option<String>,
    pub valid_header: Option<bool>,
    pub valid_footer: Option<bool>,
    pub details: BTreeMap<String, String>,
}

pub fn analyze(ctx: &AnalysisContext) -> Result<HeaderFooter> {
    Ok(check(&ctx.artifact.extension(), ctx.artifact.bytes()))
}

/// Validate `data` against the conventions of the extension `ext` (".png").
pub fn check(ext: &str, data: &[u8]) -> HeaderFooter {
    let (valid_header, valid_footer) = match ext {
        ".jpg" | ".jpeg" => (
            Some(data.starts_with(b"\xFF\xD8")),
            Some(data.ends_with(b"\xFF\xD9")),
        ),
        ".png" => {
            let tail = &data[data.len().saturating_sub(PNG_TRAILER_WINDOW)..];
            (
                Some(data.starts_with(PNG_SIGNATURE)),
                Some(tail.windows(4).any(|w| w == b"IEND")),
            )
        }
        // BMP has no trailer.
        ".bmp" => (Some(data.starts_with(b"BM")), Some(true)),
        _ => (None, None),
    };
    HeaderFooter {
        file_type: Some(ext.to_string()),
        valid_header,
        valid_footer,
        details: BTreeMap::new(),
    }
}
