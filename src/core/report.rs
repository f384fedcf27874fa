//! Unified report data model.
//!
//! Every analyzer owns exactly one [`Slot`]. A slot holds the analyzer's
//! typed report, a skip marker, or a failure record; it is never absent.
//! Serialization is untagged so a consumer sees either the report object,
//! `{"skipped": true, "reason": ...}` or `{"error": ..., "module": ...}`.

use crate::analyzers::{
    bitplanes::Bitplanes, binwalk::BinwalkReport, color_channels::ColorChannels,
    compression::CompressionReport, enhancements::Enhancements, exif::ExifReport,
    file_info::FileInfo, header_footer::HeaderFooter, lsb::LsbReport,
    outguess_openstego::LegacyToolsReport, steghide::SteghideReport, strings::StringsReport,
    zsteg::ZstegReport,
};
use crate::strings::encodings::EncodingsReport;
use crate::strings::flags::FlagsReport;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Report keys in the order they appear in the unified report.
pub const SLOT_NAMES: [&str; 16] = [
    "file_info",
    "exif",
    "strings",
    "header_footer",
    "binwalk",
    "color_channels",
    "enhancements",
    "bitplanes",
    "lsb",
    "zsteg",
    "steghide",
    "outguess_openstego",
    "compression",
    "encodings",
    "flags",
    "extracted_files",
];

/// Marker stored in a slot whose analyzer did not run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkipMarker {
    pub skipped: bool,
    pub reason: String,
}

/// Marker stored in a slot whose analyzer failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyzerFailure {
    pub error: String,
    pub module: String,
}

/// One analyzer's entry in the unified report.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Slot<T> {
    Ready(T),
    Skipped(SkipMarker),
    Failed(AnalyzerFailure),
}

impl<T> Slot<T> {
    pub fn skipped(reason: impl Into<String>) -> Self {
        Slot::Skipped(SkipMarker {
            skipped: true,
            reason: reason.into(),
        })
    }

    pub fn failed(module: impl Into<String>, error: impl Into<String>) -> Self {
        Slot::Failed(AnalyzerFailure {
            error: error.into(),
            module: module.into(),
        })
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Slot::Ready(report) => Some(report),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Slot::Ready(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Slot::Skipped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Slot::Failed(_))
    }

    pub fn failure(&self) -> Option<&AnalyzerFailure> {
        match self {
            Slot::Failed(f) => Some(f),
            _ => None,
        }
    }
}

/// A derived image written into the session directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    pub filename: String,
    pub url: String,
}

/// A file found in the session directory after all analyzers finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SideEffectFile {
    /// Session-relative path with forward slashes.
    pub name: String,
    pub url: String,
}

/// Slots produced by the independent analyzers plus the encoding detector.
///
/// The flag detector reads this view; the unified report flattens it.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzerSlots {
    pub file_info: Slot<FileInfo>,
    pub exif: Slot<ExifReport>,
    pub strings: Slot<StringsReport>,
    pub header_footer: Slot<HeaderFooter>,
    pub binwalk: Slot<BinwalkReport>,
    pub color_channels: Slot<ColorChannels>,
    pub enhancements: Slot<Enhancements>,
    pub bitplanes: Slot<Bitplanes>,
    pub lsb: Slot<LsbReport>,
    pub zsteg: Slot<ZstegReport>,
    pub steghide: Slot<SteghideReport>,
    pub outguess_openstego: Slot<LegacyToolsReport>,
    pub compression: Slot<CompressionReport>,
    pub encodings: Slot<EncodingsReport>,
}

impl AnalyzerSlots {
    /// Every slot skipped with the same reason.
    pub fn skipped_all(reason: &str) -> Self {
        Self {
            file_info: Slot::skipped(reason),
            exif: Slot::skipped(reason),
            strings: Slot::skipped(reason),
            header_footer: Slot::skipped(reason),
            binwalk: Slot::skipped(reason),
            color_channels: Slot::skipped(reason),
            enhancements: Slot::skipped(reason),
            bitplanes: Slot::skipped(reason),
            lsb: Slot::skipped(reason),
            zsteg: Slot::skipped(reason),
            steghide: Slot::skipped(reason),
            outguess_openstego: Slot::skipped(reason),
            compression: Slot::skipped(reason),
            encodings: Slot::skipped(reason),
        }
    }

    /// Names of slots holding a failure record.
    pub fn failed_modules(&self) -> Vec<&str> {
        let failures = [
            self.file_info.failure(),
            self.exif.failure(),
            self.strings.failure(),
            self.header_footer.failure(),
            self.binwalk.failure(),
            self.color_channels.failure(),
            self.enhancements.failure(),
            self.bitplanes.failure(),
            self.lsb.failure(),
            self.zsteg.failure(),
            self.steghide.failure(),
            self.outguess_openstego.failure(),
            self.compression.failure(),
            self.encodings.failure(),
        ];
        failures
            .into_iter()
            .flatten()
            .map(|f| f.module.as_str())
            .collect()
    }
}

/// The single merged output of one analysis session.
#[derive(Debug, Clone, Serialize)]
pub struct UnifiedReport {
    pub session_id: String,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub slots: AnalyzerSlots,
    pub flags: Slot<FlagsReport>,
    pub extracted_files: Vec<SideEffectFile>,
}

impl UnifiedReport {
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
