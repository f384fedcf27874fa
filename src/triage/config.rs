//! Configuration for the analysis pipeline.
//!
//! Provides centralized configuration for every analyzer with defaults
//! matching the reference deployment. All sections deserialize with
//! `#[serde(default)]`, so a JSON override file only needs the fields it
//! changes.

use crate::error::Result;
use crate::tools::ToolCommand;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Master configuration for the analysis pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// I/O limits for artifact ingestion.
    pub io: IOConfig,
    /// External tool timeouts and output caps.
    pub tools: ToolsConfig,
    /// String extraction configuration.
    pub strings: StringsConfig,
    /// Encoding detector configuration.
    pub encodings: EncodingsConfig,
    /// LSB extraction configuration.
    pub lsb: LsbConfig,
    /// Flag detector configuration.
    pub flags: FlagsConfig,
    /// Image enhancement configuration.
    pub enhancements: EnhancementsConfig,
    /// Whether the outguess/openstego slot runs its tools.
    pub legacy_tools: LegacyToolsConfig,
}

impl PipelineConfig {
    /// Load a configuration from a JSON file; absent fields keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parse a configuration from a JSON string.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// I/O configuration for artifact ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IOConfig {
    /// Maximum artifact size to ingest (default: 104857600 = 100MB).
    pub max_file_size: u64,
}

impl Default for IOConfig {
    fn default() -> Self {
        Self {
            max_file_size: 104857600,
        }
    }
}

/// Per-tool wall-clock budgets, in seconds, and captured output caps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// exiftool -json (default: 30).
    pub exiftool_secs: u64,
    /// strings, once per encoding (default: 60).
    pub strings_secs: u64,
    /// binwalk -e carving (default: 120).
    pub binwalk_secs: u64,
    /// steghide info (default: 60).
    pub steghide_info_secs: u64,
    /// steghide extract (default: 120).
    pub steghide_extract_secs: u64,
    /// zsteg -a (default: 300).
    pub zsteg_secs: u64,
    /// outguess -r (default: 30).
    pub outguess_secs: u64,
    /// openstego extract (default: 300).
    pub openstego_secs: u64,
    /// Availability checks such as `outguess -h` (default: 30).
    pub availability_secs: u64,
    /// Maximum bytes kept per captured stream (default: 16MB).
    pub max_output_bytes: usize,
    /// PATH used to locate external tools; None inherits the process PATH.
    pub search_path: Option<String>,
}

impl ToolsConfig {
    /// A command for `program` with this section's output cap and search path.
    pub fn command(&self, program: &str) -> ToolCommand {
        let cmd = ToolCommand::new(program).max_output(self.max_output_bytes);
        match &self.search_path {
            Some(path) => cmd.search_path(path.clone()),
            None => cmd,
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            exiftool_secs: 30,
            strings_secs: 60,
            binwalk_secs: 120,
            steghide_info_secs: 60,
            steghide_extract_secs: 120,
            zsteg_secs: 300,
            outguess_secs: 30,
            openstego_secs: 300,
            availability_secs: 30,
            max_output_bytes: 16 * 1024 * 1024,
            search_path: None,
        }
    }
}

/// String extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StringsConfig {
    /// Maximum number of lines kept per section sample (default: 500).
    pub max_samples: usize,
    /// Minimum run length for the in-process scanner (default: 4).
    pub min_length: usize,
    /// Scan in-process when the `strings` binary is unavailable (default: true).
    pub native_fallback: bool,
}

impl Default for StringsConfig {
    fn default() -> Self {
        Self {
            max_samples: 500,
            min_length: 4,
            native_fallback: true,
        }
    }
}

/// Encoding detector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingsConfig {
    /// Candidates considered from each strings section (default: 200).
    pub max_candidates_per_section: usize,
    /// Decoded preview length in characters (default: 1024).
    pub max_preview_chars: usize,
    /// Minimum base64 candidate length (default: 16).
    pub min_base64_len: usize,
    /// Minimum hex candidate length (default: 16).
    pub min_hex_len: usize,
    /// Minimum binary candidate length (default: 8).
    pub min_binary_len: usize,
}

impl Default for EncodingsConfig {
    fn default() -> Self {
        Self {
            max_candidates_per_section: 200,
            max_preview_chars: 1024,
            min_base64_len: 16,
            min_hex_len: 16,
            min_binary_len: 8,
        }
    }
}

/// LSB extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LsbConfig {
    /// Preview length in characters (default: 1024).
    pub max_preview_chars: usize,
}

impl Default for LsbConfig {
    fn default() -> Self {
        Self {
            max_preview_chars: 1024,
        }
    }
}

/// Flag detector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagsConfig {
    /// Prefixes matched as `<prefix>{...}`, case-insensitively.
    pub prefixes: Vec<String>,
    /// Additional prefixes appended to the built-in set.
    pub extra_prefixes: Vec<String>,
    /// Maximum distinct matches returned by a custom pattern search (default: 50).
    pub max_custom_matches: usize,
}

impl Default for FlagsConfig {
    fn default() -> Self {
        Self {
            prefixes: vec!["flag".into(), "ctf".into(), "genzipher".into()],
            extra_prefixes: Vec::new(),
            max_custom_matches: 50,
        }
    }
}

impl FlagsConfig {
    /// Built-in prefixes followed by the extras, without duplicates.
    pub fn all_prefixes(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for p in self.prefixes.iter().chain(self.extra_prefixes.iter()) {
            let p = p.trim();
            if !p.is_empty() && !out.iter().any(|q| q.eq_ignore_ascii_case(p)) {
                out.push(p.to_string());
            }
        }
        out
    }
}

/// Image enhancement configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhancementsConfig {
    /// Contrast enhancement factor (default: 2.0).
    pub contrast_factor: f32,
}

impl Default for EnhancementsConfig {
    fn default() -> Self {
        Self {
            contrast_factor: 2.0,
        }
    }
}

/// Outguess/openstego slot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyToolsConfig {
    /// Run outguess/openstego; when false the slot holds a skip marker (default: true).
    pub enabled: bool,
}

impl Default for LegacyToolsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}
