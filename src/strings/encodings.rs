//! Encoding candidate detector.
//!
//! Tests sampled strings for base64, hex, binary and rot13 encodings and
//! records printable decodings. A candidate may appear in several buckets.

use crate::analyzers::strings::StringsReport;
use crate::strings::patterns::{RE_BASE64, RE_BINARY, RE_HEX};
use crate::strings::{is_printable_byte, render_printable, truncate_chars};
use crate::triage::config::EncodingsConfig;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde::Serialize;

/// Strict alphabet over unpadded input, tolerant of non-zero trailing bits.
const LENIENT_B64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone),
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedCandidate {
    pub source: String,
    pub decoded: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EncodingsReport {
    pub base64: Vec<DecodedCandidate>,
    pub hex: Vec<DecodedCandidate>,
    pub binary: Vec<DecodedCandidate>,
    pub rot13: Vec<DecodedCandidate>,
}

impl EncodingsReport {
    pub fn is_empty(&self) -> bool {
        self.base64.is_empty() && self.hex.is_empty() && self.binary.is_empty() && self.rot13.is_empty()
    }

    /// Buckets with their names, in report order.
    pub fn buckets(&self) -> [(&'static str, &[DecodedCandidate]); 4] {
        [
            ("base64", &self.base64),
            ("hex", &self.hex),
            ("binary", &self.binary),
            ("rot13", &self.rot13),
        ]
    }
}

/// Run the detector over a strings report; a missing report yields empty buckets.
pub fn detect(strings: Option<&StringsReport>, cfg: &EncodingsConfig) -> EncodingsReport {
    let Some(strings) = strings else {
        return EncodingsReport::default();
    };
    let limit = cfg.max_candidates_per_section;
    let candidates = strings
        .ascii
        .sample
        .iter()
        .take(limit)
        .chain(strings.utf16.sample.iter().take(limit))
        .map(String::as_str);
    detect_candidates(candidates, cfg)
}

/// Run the detector over arbitrary candidate strings.
pub fn detect_candidates<'a, I>(candidates: I, cfg: &EncodingsConfig) -> EncodingsReport
where
    I: IntoIterator<Item = &'a str>,
{
    let mut report = EncodingsReport::default();
    let preview = cfg.max_preview_chars;
    for raw in candidates {
        let s = raw.trim();
        if s.is_empty() {
            continue;
        }

        if looks_base64(s, cfg) {
            if let Some(decoded) = decode_base64(s) {
                push(&mut report.base64, s, &decoded, preview);
            }
        }
        if looks_hex(s, cfg) {
            if let Some(decoded) = decode_hex(s) {
                push(&mut report.hex, s, &decoded, preview);
            }
        }
        if looks_binary(s, cfg) {
            let decoded = decode_binary(s);
            push(&mut report.binary, s, &decoded, preview);
        }
        let rotated = rot13(s);
        if rotated != s {
            push(&mut report.rot13, s, &rotated, preview);
        }
    }
    report
}

fn push(bucket: &mut Vec<DecodedCandidate>, source: &str, decoded: &str, preview: usize) {
    if decoded.is_empty() {
        return;
    }
    bucket.push(DecodedCandidate {
        source: source.to_string(),
        decoded: truncate_chars(decoded, preview),
    });
}

fn looks_base64(s: &str, cfg: &EncodingsConfig) -> bool {
    s.len() >= cfg.min_base64_len && s.len() % 4 == 0 && RE_BASE64.is_match(s)
}

fn looks_hex(s: &str, cfg: &EncodingsConfig) -> bool {
    s.len() >= cfg.min_hex_len && s.len() % 2 == 0 && RE_HEX.is_match(s)
}

fn looks_binary(s: &str, cfg: &EncodingsConfig) -> bool {
    s.len() >= cfg.min_binary_len && RE_BINARY.is_match(s)
}

/// A complete final quantum accepts any run of `=`; a partial one needs
/// exactly its own padding.
fn decode_base64(s: &str) -> Option<String> {
    let data = s.trim_end_matches('=');
    let padding = s.len() - data.len();
    let partial = data.len() % 4;
    if data.is_empty() || (partial != 0 && padding != 4 - partial) {
        return None;
    }
    LENIENT_B64.decode(data).ok().map(|bytes| render_printable(&bytes))
}

fn decode_hex(s: &str) -> Option<String> {
    hex::decode(s).ok().map(|bytes| render_printable(&bytes))
}

/// Decode complete 8-bit groups, MSB first; a trailing partial group is dropped.
pub fn decode_binary(bits: &str) -> String {
    bits.as_bytes()
        .chunks_exact(8)
        .map(|chunk| {
            let byte = chunk
                .iter()
                .fold(0u8, |acc, &c| (acc << 1) | u8::from(c == b'1'));
            if is_printable_byte(byte) {
                byte as char
            } else {
                '.'
            }
        })
        .collect()
}

/// Rotate ASCII letters by 13 places; everything else passes through.
pub fn rot13(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'a'..='z' => (((c as u8 - b'a' + 13) % 26) + b'a') as char,
            'A'..='Z' => (((c as u8 - b'A' + 13) % 26) + b'A') as char,
            _ => c,
        })
        .collect()
}
