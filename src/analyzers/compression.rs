//! Embedded compressed-stream signature scan.

use super::AnalysisContext;
use crate::error::{Result, StegError};
use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;
use serde::Serialize;

/// Signature name and magic bytes, in reporting order.
pub const SIGNATURES: &[(&str, &[u8])] = &[
    ("zip", b"\x50\x4b\x03\x04"),
    ("gzip", b"\x1f\x8b"),
    ("zlib", b"\x78\x9c"),
    ("zlib", b"\x78\x01"),
    ("zlib", b"\x78\xda"),
];

static MATCHER: Lazy<std::result::Result<AhoCorasick, String>> = Lazy::new(|| {
    AhoCorasick::new(SIGNATURES.iter().map(|(_, magic)| magic)).map_err(|e| e.to_string())
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompressionFinding {
    #[serde(rename = "type")]
    pub kind: String,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompressionReport {
    pub findings: Vec<CompressionFinding>,
}

pub fn analyze(ctx: &AnalysisContext) -> Result<CompressionReport> {
    scan(ctx.artifact.bytes())
}

/// Every offset of every signature, overlapping, grouped by signature then offset.
pub fn scan(data: &[u8]) -> Result<CompressionReport> {
    let matcher = MATCHER.as_ref().map_err(|e| StegError::Internal(e.clone()))?;
    let mut hits: Vec<(usize, usize)> = matcher
        .find_overlapping_iter(data)
        .map(|m| (m.pattern().as_usize(), m.start()))
        .collect();
    hits.sort_unstable();
    let findings = hits
        .into_iter()
        .map(|(pattern, offset)| CompressionFinding {
            kind: SIGNATURES[pattern].0.to_string(),
            offset,
        })
        .collect();
    Ok(CompressionReport { findings })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(data: &[u8]) -> Vec<(String, usize)> {
        scan(data)
            .unwrap()
            .findings
            .into_iter()
            .map(|f| (f.kind, f.offset))
            .collect()
    }

    #[test]
    fn finds_each_signature() {
        let data = b"..PK\x03\x04..\x1f\x8b..\x78\x9c..\x78\xda";
        assert_eq!(
            pairs(data),
            vec![
                ("zip".to_string(), 2),
                ("gzip".to_string(), 8),
                ("zlib".to_string(), 12),
                ("zlib".to_string(), 16),
            ]
        );
    }

    #[test]
    fn repeated_signature_every_offset() {
        let data = b"\x1f\x8b\x1f\x8b\x1f\x8b";
        let offsets: Vec<usize> = pairs(data).into_iter().map(|(_, o)| o).collect();
        assert_eq!(offsets, vec![0, 2, 4]);
    }

    #[test]
    fn overlapping_zlib_headers() {
        // 78 01 78 9C: two zlib headers, plus an overlapping "01 78" that is not one.
        let data = b"\x78\x01\x78\x9c";
        assert_eq!(
            pairs(data),
            vec![("zlib".to_string(), 2), ("zlib".to_string(), 0)]
        );
    }

    #[test]
    fn clean_data_has_no_findings() {
        assert!(pairs(b"nothing to see").is_empty());
    }
}
