//! Triage runtime: configuration, orchestration and the extraction surface.

pub mod config;
pub mod extraction;
pub mod pipeline;

pub use config::PipelineConfig;
pub use pipeline::{run_full_analysis, Pipeline};
