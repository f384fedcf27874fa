//! Text-level analysis over extracted strings and the assembled report.
//!
//! Holds the in-process string scanners, the encoding candidate detector
//! and the flag detector, plus the shared printable rendering rule.

pub mod encodings;
pub mod flags;
pub mod patterns;
mod scan;

pub use scan::{scan_ascii, scan_utf16le};

/// Byte rendered as itself in previews: 32..=126, tab, LF or CR.
pub fn is_printable_byte(b: u8) -> bool {
    (32..=126).contains(&b) || matches!(b, 9 | 10 | 13)
}

/// Render bytes as text, replacing non-printable bytes with '.'.
pub fn render_printable(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| if is_printable_byte(b) { b as char } else { '.' })
        .collect()
}

/// First `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
