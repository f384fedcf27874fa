//! Analysis orchestrator.
//!
//! Runs every analyzer against one artifact and merges the outcomes into a
//! [`UnifiedReport`]. Each analyzer runs as its own task; an error or a
//! panic inside it lands in that analyzer's slot and nowhere else.
//!
//! Phases:
//! 1. Independent analyzers, concurrently. Image work goes to the blocking
//!    pool, external tools run on async process handles.
//! 2. Encoding detection, once the strings slot has settled.
//! 3. Flag detection over all assembled slots.
//! 4. Extraction surface scan, after every file-writing analyzer finished.

use crate::analyzer_span;
use crate::analyzers::{
    binwalk, bitplanes, color_channels, compression, enhancements, exif, file_info,
    header_footer, lsb, outguess_openstego, steghide, strings, zsteg, AnalysisContext,
};
use crate::core::artifact::{Artifact, ArtifactKind};
use crate::core::report::{AnalyzerSlots, Slot, UnifiedReport};
use crate::core::session::Session;
use crate::error::{Result, StegError};
use crate::strings::encodings;
use crate::strings::flags::{self, FlagMatcher};
use crate::triage::config::PipelineConfig;
use crate::triage::extraction;
use chrono::Utc;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Skip reason for the legacy slot when disabled by configuration.
pub const LEGACY_DISABLED: &str = "outguess/openstego disabled by configuration";

/// Reusable orchestrator holding configuration and compiled flag patterns.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    matcher: Arc<FlagMatcher>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let matcher = FlagMatcher::new(&config.flags.all_prefixes())?;
        Ok(Self {
            config,
            matcher: Arc::new(matcher),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Analyze one artifact inside its session. Never fails as a whole.
    pub async fn analyze(&self, artifact: Artifact, session: Session) -> UnifiedReport {
        let span = info_span!(
            "analysis",
            session_id = %session.id(),
            path = %artifact.path().display()
        );
        self.run_phases(artifact, session).instrument(span).await
    }

    /// [`Self::analyze`] on a dedicated multi-threaded runtime.
    pub fn analyze_blocking(&self, artifact: Artifact, session: Session) -> Result<UnifiedReport> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        Ok(runtime.block_on(self.analyze(artifact, session)))
    }

    /// Custom pattern search over a finished report, capped by configuration.
    pub fn search(&self, report: &UnifiedReport, pattern: &str) -> Result<Vec<String>> {
        flags::search_custom(report, pattern, self.config.flags.max_custom_matches)
    }

    async fn run_phases(&self, artifact: Artifact, session: Session) -> UnifiedReport {
        let started = Instant::now();
        let ctx = Arc::new(AnalysisContext::new(artifact, session, self.config.clone()));

        debug!(phase = "independent", "spawning analyzers");
        let file_info = blocking(&ctx, "file_info", file_info::analyze);
        let exif = concurrent(&ctx, "exif", exif::analyze);
        let strings = concurrent(&ctx, "strings", strings::analyze);
        let header_footer = blocking(&ctx, "header_footer", header_footer::analyze);
        let binwalk = concurrent(&ctx, "binwalk", binwalk::analyze);
        let color_channels = blocking(&ctx, "color_channels", color_channels::analyze);
        let enhancements = blocking(&ctx, "enhancements", enhancements::analyze);
        let bitplanes = blocking(&ctx, "bitplanes", bitplanes::analyze);
        let lsb = blocking(&ctx, "lsb", lsb::analyze);
        let zsteg = (ctx.artifact.kind() == ArtifactKind::Png)
            .then(|| concurrent(&ctx, "zsteg", zsteg::analyze));
        let steghide = concurrent(&ctx, "steghide", steghide::analyze);
        let legacy = self
            .config
            .legacy_tools
            .enabled
            .then(|| concurrent(&ctx, "outguess_openstego", outguess_openstego::analyze));
        let compression = blocking(&ctx, "compression", compression::analyze);

        let strings = settle("strings", strings).await;
        debug!(phase = "encodings", strings_ready = strings.is_ready(), "detecting encodings");
        let samples = strings.ready().cloned();
        let enc_cfg = self.config.encodings.clone();
        let encodings = tokio::task::spawn_blocking(move || {
            Ok::<_, StegError>(encodings::detect(samples.as_ref(), &enc_cfg))
        });

        let slots = AnalyzerSlots {
            file_info: settle("file_info", file_info).await,
            exif: settle("exif", exif).await,
            strings,
            header_footer: settle("header_footer", header_footer).await,
            binwalk: settle("binwalk", binwalk).await,
            color_channels: settle("color_channels", color_channels).await,
            enhancements: settle("enhancements", enhancements).await,
            bitplanes: settle("bitplanes", bitplanes).await,
            lsb: settle("lsb", lsb).await,
            zsteg: match zsteg {
                Some(handle) => settle("zsteg", handle).await,
                None => Slot::skipped(zsteg::PNG_ONLY),
            },
            steghide: settle("steghide", steghide).await,
            outguess_openstego: match legacy {
                Some(handle) => settle("outguess_openstego", handle).await,
                None => Slot::skipped(LEGACY_DISABLED),
            },
            compression: settle("compression", compression).await,
            encodings: settle("encodings", encodings).await,
        };

        debug!(phase = "flags", "detecting flags");
        let slots = Arc::new(slots);
        let flags = {
            let slots = Arc::clone(&slots);
            let matcher = Arc::clone(&self.matcher);
            settle(
                "flags",
                tokio::task::spawn_blocking(move || {
                    Ok::<_, StegError>(flags::detect(&slots, &matcher))
                }),
            )
            .await
        };
        let slots = Arc::try_unwrap(slots).unwrap_or_else(|shared| (*shared).clone());

        debug!(phase = "extraction", "scanning session directory");
        let extracted_files = extraction::scan(&ctx.session);

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            failed = ?slots.failed_modules(),
            flags = flags.ready().map(|f| f.count).unwrap_or(0),
            files = extracted_files.len(),
            "analysis complete"
        );

        UnifiedReport {
            session_id: ctx.session.id().to_string(),
            generated_at: Utc::now(),
            slots,
            flags,
            extracted_files,
        }
    }
}

/// Load `path` and analyze it with a one-off pipeline.
pub async fn run_full_analysis(
    path: &Path,
    session: Session,
    config: PipelineConfig,
) -> Result<UnifiedReport> {
    let artifact = Artifact::load(path, &config.io)?;
    let pipeline = Pipeline::new(config)?;
    Ok(pipeline.analyze(artifact, session).await)
}

/// Run a CPU-bound analyzer on the blocking pool.
fn blocking<T, F>(ctx: &Arc<AnalysisContext>, name: &'static str, f: F) -> JoinHandle<Result<T>>
where
    T: Send + 'static,
    F: FnOnce(&AnalysisContext) -> Result<T> + Send + 'static,
{
    let ctx = Arc::clone(ctx);
    let span = analyzer_span!(name);
    tokio::task::spawn_blocking(move || {
        let _guard = span.enter();
        f(&ctx)
    })
}

/// Run an I/O-bound analyzer as an async task.
fn concurrent<T, F, Fut>(ctx: &Arc<AnalysisContext>, name: &'static str, f: F) -> JoinHandle<Result<T>>
where
    T: Send + 'static,
    F: FnOnce(Arc<AnalysisContext>) -> Fut,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    tokio::spawn(f(Arc::clone(ctx)).instrument(analyzer_span!(name)))
}

/// Await an analyzer task and fold its outcome into a slot.
pub(crate) async fn settle<T>(name: &'static str, handle: JoinHandle<Result<T>>) -> Slot<T> {
    match handle.await {
        Ok(Ok(report)) => Slot::Ready(report),
        Ok(Err(e)) => {
            warn!(analyzer = name, error = %e, "analyzer failed");
            Slot::failed(name, e.to_string())
        }
        Err(join) => {
            let message = join_failure(join);
            error!(analyzer = name, error = %message, "analyzer aborted");
            Slot::failed(name, message)
        }
    }
}

fn join_failure(err: JoinError) -> String {
    if !err.is_panic() {
        return "analyzer task cancelled".to_string();
    }
    let payload = err.into_panic();
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("analyzer panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("analyzer panicked: {}", s)
    } else {
        "analyzer panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn explode() -> Result<u32> {
        panic!("boom")
    }

    #[tokio::test]
    async fn panic_becomes_failure_slot() {
        let slot = settle("lsb", tokio::task::spawn_blocking(explode)).await;
        let failure = slot.failure().unwrap();
        assert_eq!(failure.module, "lsb");
        assert!(failure.error.contains("boom"));
    }

    #[tokio::test]
    async fn error_becomes_failure_slot() {
        let handle = tokio::spawn(async {
            Err::<u32, _>(StegError::ImageDecode("truncated".into()))
        });
        let slot = settle("bitplanes", handle).await;
        assert_eq!(
            slot.failure().map(|f| f.error.as_str()),
            Some("Image decode error: truncated")
        );
    }

    #[tokio::test]
    async fn success_becomes_ready_slot() {
        let slot = settle("compression", tokio::spawn(async { Ok::<_, StegError>(7u8) })).await;
        assert_eq!(slot.ready(), Some(&7));
    }

    #[test]
    fn extra_prefixes_are_escaped() {
        let mut config = PipelineConfig::default();
        config.flags.extra_prefixes.push("(weird[".into());
        let pipeline = Pipeline::new(config).unwrap();
        assert_eq!(pipeline.matcher.patterns_len(), 4);
    }
}
