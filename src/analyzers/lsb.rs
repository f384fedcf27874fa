//! Least-significant-bit text extraction.
//!
//! Each channel's LSBs are read in row-major order and packed MSB-first
//! into bytes. `combined` interleaves the R, G and B bits of each pixel.

use super::{AnalysisContext, CHANNELS};
use crate::error::Result;
use crate::strings::{is_printable_byte, truncate_chars};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LsbText {
    pub preview: String,
    /// Characters decoded from the full bit stream.
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LsbReport {
    pub channels: BTreeMap<String, LsbText>,
    pub combined: LsbText,
}

pub fn analyze(ctx: &AnalysisContext) -> Result<LsbReport> {
    let rgba = ctx.rgba()?;
    let raw = rgba.as_raw();
    let preview = ctx.config.lsb.max_preview_chars;

    let mut channels = BTreeMap::new();
    for (idx, name) in CHANNELS.iter().enumerate() {
        let bits = raw.chunks_exact(4).map(|px| px[idx] & 1);
        channels.insert(name.to_string(), summarize(&bits_to_text(bits), preview));
    }

    let interleaved = raw
        .chunks_exact(4)
        .flat_map(|px| [px[0] & 1, px[1] & 1, px[2] & 1]);
    let combined = summarize(&bits_to_text(interleaved), preview);

    Ok(LsbReport { channels, combined })
}

fn summarize(text: &str, preview: usize) -> LsbText {
    LsbText {
        preview: truncate_chars(text, preview),
        length: text.len(),
    }
}

/// Pack bits MSB-first; a trailing partial byte is dropped.
pub fn bits_to_text<I>(bits: I) -> String
where
    I: IntoIterator<Item = u8>,
{
    let mut out = String::new();
    let (mut byte, mut filled) = (0u8, 0u8);
    for bit in bits {
        byte = (byte << 1) | (bit & 1);
        filled += 1;
        if filled == 8 {
            out.push(if is_printable_byte(byte) { byte as char } else { '.' });
            byte = 0;
            filled = 0;
        }
    }
    out
}
