//! Logging and tracing setup for stegtriage.
//!
//! Events go to stderr so that stdout stays free for the JSON report.
//! `RUST_LOG` selects levels; without it everything at `info` and above
//! is shown.

use std::sync::Once;
use tracing::info;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

static INIT: Once = Once::new();

/// Output format of the global subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines for terminals.
    Pretty,
    /// One JSON object per event, with the current span attached.
    Json,
}

/// Install the global subscriber once; later calls in the process are no-ops.
pub fn init(format: LogFormat) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let registry = tracing_subscriber::registry().with(filter);

        // try_init: a host application may already own the global subscriber.
        let installed = match format {
            LogFormat::Pretty => registry
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_span_events(FmtSpan::CLOSE)
                        .with_thread_ids(true)
                        .with_line_number(true),
                )
                .try_init(),
            LogFormat::Json => registry
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_span_events(FmtSpan::CLOSE)
                        .with_current_span(true)
                        .with_span_list(false),
                )
                .try_init(),
        };

        if installed.is_ok() {
            info!(?format, "stegtriage tracing initialized");
        }
    });
}

pub fn init_tracing() {
    init(LogFormat::Pretty);
}

pub fn init_tracing_json() {
    init(LogFormat::Json);
}

/// Span wrapping one analyzer task; extra fields are passed through.
#[macro_export]
macro_rules! analyzer_span {
    ($name:expr) => {
        tracing::info_span!("analyzer", analyzer = $name)
    };
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!("analyzer", analyzer = $name, $($field)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::warn;

    #[test]
    fn repeated_init_is_harmless() {
        init_tracing();
        init_tracing_json();
        init(LogFormat::Pretty);
    }

    #[test]
    fn analyzer_span_accepts_fields() {
        init_tracing();
        let span = analyzer_span!("bitplanes", planes = 32);
        let _guard = span.enter();
        warn!(tool = "zsteg", timeout_secs = 300, "tool timed out");
    }
}
