//! Flag detector and custom pattern search.
//!
//! The detector scans a fixed, enumerated set of report fields. Each match
//! carries a dotted provenance path naming the field it came from:
//!
//! | provenance                                   | field                                  |
//! |----------------------------------------------|----------------------------------------|
//! | `file_info.<key>`                            | sha256, md5, mime, format, mode        |
//! | `exif.exiftool.error`                        | exiftool error text                    |
//! | `exif.exiftool.<key>`                        | string values of exiftool data         |
//! | `exif.pillow.<tag>`                          | embedded EXIF display values           |
//! | `strings.ascii`, `strings.utf16`             | every sampled line                     |
//! | `binwalk.summary`                            | binwalk stdout                         |
//! | `zsteg.stdout`                               | zsteg stdout                           |
//! | `steghide.{info,extract}.{stdout,stderr}`    | steghide streams                       |
//! | `outguess_openstego.{outguess,openstego}.stdout` | legacy tool stdout                 |
//! | `encodings.<bucket>`                         | every decoded candidate                |
//! | `lsb.channels.<c>`, `lsb.combined`           | LSB previews                           |
//!
//! A new analyzer is only scanned once a rule for it is added here.

use crate::core::report::{AnalyzerSlots, UnifiedReport};
use crate::error::Result;
use crate::strings::patterns::{custom_regex, flag_regex};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::borrow::Cow;

/// Provenance recorded for matches merged from a custom search.
pub const CUSTOM_SOURCE: &str = "custom pattern";

/// Prefixes of the default flag convention.
pub const DEFAULT_PREFIXES: [&str; 3] = ["flag", "ctf", "genzipher"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlagMatch {
    pub flag: String,
    pub source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlagsReport {
    pub count: usize,
    pub flags: Vec<FlagMatch>,
}

/// Compiled `<prefix>{...}` patterns.
#[derive(Debug, Clone)]
pub struct FlagMatcher {
    patterns: Vec<Regex>,
}

static DEFAULT_MATCHER: Lazy<FlagMatcher> = Lazy::new(|| FlagMatcher {
    patterns: DEFAULT_PREFIXES
        .iter()
        .map(|p| flag_regex(p).expect("valid default flag prefix"))
        .collect(),
});

impl FlagMatcher {
    pub fn new<S: AsRef<str>>(prefixes: &[S]) -> Result<Self> {
        let patterns = prefixes
            .iter()
            .map(|p| flag_regex(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn patterns_len(&self) -> usize {
        self.patterns.len()
    }

    pub fn builtin() -> &'static FlagMatcher {
        &DEFAULT_MATCHER
    }

    /// Append every match in `text`, pattern by pattern, tagged with `source`.
    pub fn scan_into(&self, text: &str, source: &str, out: &mut Vec<FlagMatch>) {
        if text.is_empty() {
            return;
        }
        for re in &self.patterns {
            for m in re.find_iter(text) {
                out.push(FlagMatch {
                    flag: m.as_str().to_string(),
                    source: source.to_string(),
                });
            }
        }
    }
}

/// Every scanned field with its provenance, in traversal order.
pub fn text_fields(slots: &AnalyzerSlots) -> Vec<(Cow<'static, str>, &str)> {
    let mut out: Vec<(Cow<'static, str>, &str)> = Vec::new();

    if let Some(info) = slots.file_info.ready() {
        let fields = [
            ("file_info.sha256", &info.sha256),
            ("file_info.md5", &info.md5),
            ("file_info.mime", &info.mime),
            ("file_info.format", &info.format),
            ("file_info.mode", &info.mode),
        ];
        for (source, value) in fields {
            if let Some(v) = value {
                out.push((Cow::Borrowed(source), v.as_str()));
            }
        }
    }

    if let Some(exif) = slots.exif.ready() {
        out.extend(
            exif.text_fields()
                .into_iter()
                .map(|(source, v)| (Cow::Owned(source), v)),
        );
    }

    if let Some(strings) = slots.strings.ready() {
        for (source, section) in [("strings.ascii", &strings.ascii), ("strings.utf16", &strings.utf16)] {
            for line in &section.sample {
                out.push((Cow::Borrowed(source), line.as_str()));
            }
        }
    }

    if let Some(binwalk) = slots.binwalk.ready() {
        out.push((Cow::Borrowed("binwalk.summary"), binwalk.summary.as_str()));
    }

    if let Some(zsteg) = slots.zsteg.ready() {
        out.push((Cow::Borrowed("zsteg.stdout"), zsteg.stdout.as_str()));
    }

    if let Some(steghide) = slots.steghide.ready() {
        let steps = [("info", Some(&steghide.info)), ("extract", steghide.extract.as_ref())];
        for (name, step) in steps {
            if let Some(step) = step {
                out.push((Cow::Owned(format!("steghide.{}.stdout", name)), step.stdout.as_str()));
                out.push((Cow::Owned(format!("steghide.{}.stderr", name)), step.stderr.as_str()));
            }
        }
    }

    if let Some(legacy) = slots.outguess_openstego.ready() {
        for (name, outcome) in [("outguess", &legacy.outguess), ("openstego", &legacy.openstego)] {
            if let Some(stdout) = outcome.stdout() {
                out.push((
                    Cow::Owned(format!("outguess_openstego.{}.stdout", name)),
                    stdout,
                ));
            }
        }
    }

    if let Some(encodings) = slots.encodings.ready() {
        for (bucket, entries) in encodings.buckets() {
            for entry in entries {
                out.push((Cow::Owned(format!("encodings.{}", bucket)), entry.decoded.as_str()));
            }
        }
    }

    if let Some(lsb) = slots.lsb.ready() {
        for (channel, text) in &lsb.channels {
            out.push((Cow::Owned(format!("lsb.channels.{}", channel)), text.preview.as_str()));
        }
        out.push((Cow::Borrowed("lsb.combined"), lsb.combined.preview.as_str()));
    }

    out
}

/// Scan the assembled slots for flags.
pub fn detect(slots: &AnalyzerSlots, matcher: &FlagMatcher) -> FlagsReport {
    let mut flags = Vec::new();
    for (source, text) in text_fields(slots) {
        matcher.scan_into(text, &source, &mut flags);
    }
    FlagsReport {
        count: flags.len(),
        flags,
    }
}

/// Distinct matches of `pattern` over a serialized report, first-seen order.
pub fn search_custom_json(json: &str, pattern: &str, max_matches: usize) -> Result<Vec<String>> {
    let re = custom_regex(pattern)?;
    let mut found: Vec<String> = Vec::new();
    for m in re.find_iter(json) {
        if found.len() >= max_matches {
            break;
        }
        let text = m.as_str();
        if !text.is_empty() && !found.iter().any(|f| f == text) {
            found.push(text.to_string());
        }
    }
    Ok(found)
}

/// Search the JSON serialization of a whole report.
pub fn search_custom(report: &UnifiedReport, pattern: &str, max_matches: usize) -> Result<Vec<String>> {
    search_custom_json(&report.to_json()?, pattern, max_matches)
}

/// Append custom matches not already present, tagged [`CUSTOM_SOURCE`].
pub fn merge_custom(report: &mut FlagsReport, matches: &[String]) {
    for m in matches {
        if !report.flags.iter().any(|f| &f.flag == m) {
            report.flags.push(FlagMatch {
                flag: m.clone(),
                source: CUSTOM_SOURCE.to_string(),
            });
        }
    }
    report.count = report.flags.len();
}
