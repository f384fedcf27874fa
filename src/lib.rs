//! stegtriage: steganography triage for uploaded images.
//!
//! An artifact is stored in a session directory, every analyzer runs
//! against it in isolation, and the outcomes are merged into a single
//! [`UnifiedReport`](core::report::UnifiedReport) with one slot per
//! analyzer, a flag scan over the assembled report, and a listing of every
//! file the analyzers left behind.

/// Analyzer units
pub mod analyzers;
/// Core data types module
pub mod core;
pub mod error;
pub mod hashing;
pub mod io;
pub mod logging;
/// Encoding and flag detection over extracted text
pub mod strings;
pub mod timeout;
/// External tool adapter
pub mod tools;
/// Orchestration and configuration
pub mod triage;

pub use crate::core::artifact::{Artifact, ArtifactKind};
pub use crate::core::report::{Slot, UnifiedReport};
pub use crate::core::session::Session;
pub use crate::error::{Result, StegError};
pub use crate::triage::{run_full_analysis, Pipeline, PipelineConfig};
