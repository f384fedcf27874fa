//! Precompiled regex patterns for encoding candidates and flags.
//!
//! Candidate patterns are anchored and match the whole trimmed string.

use crate::error::{Result, StegError};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

pub static RE_BASE64: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9+/]+=*$").expect("valid base64 regex"));

pub static RE_HEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9a-fA-F]+$").expect("valid hex regex"));

pub static RE_BINARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[01]+$").expect("valid binary regex"));

/// `<prefix>{...}` with a non-greedy body, case-insensitive.
pub fn flag_regex(prefix: &str) -> Result<Regex> {
    let pattern = format!(r"{}\{{.*?\}}", regex::escape(prefix));
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| StegError::InvalidInput(format!("bad flag prefix {:?}: {}", prefix, e)))
}

/// Compile a user-supplied search pattern.
///
/// A pattern containing `{}` is a template: the text before the first `{}`
/// is the prefix, the text after it (up to any further `{}`) the suffix, and
/// both are matched literally around a non-greedy `{...}` body. Anything
/// else is used as a raw regular expression. Matching is case-insensitive.
pub fn custom_regex(raw: &str) -> Result<Regex> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(StegError::InvalidInput("empty search pattern".into()));
    }
    let pattern = if raw.contains("{}") {
        let mut parts = raw.split("{}");
        let prefix = parts.next().unwrap_or_default();
        let suffix = parts.next().unwrap_or_default();
        format!(
            r"{}\{{.*?\}}{}",
            regex::escape(prefix),
            regex::escape(suffix)
        )
    } else {
        raw.to_string()
    };
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| StegError::InvalidInput(format!("invalid search pattern: {}", e)))
}
