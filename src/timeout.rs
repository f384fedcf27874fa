//! Wall-clock budgets for external tool runs.
//!
//! Every process the pipeline starts is awaited through [`with_timeout`],
//! so a hung tool costs at most its configured budget. Killing and
//! reaping the process after expiry is the caller's job.

use crate::error::{Result, StegError};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Budget applied when a caller does not set one.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// A named budget for one bounded operation.
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    pub duration: Duration,
    /// Name used in log events, usually the tool.
    pub operation: String,
}

impl TimeoutConfig {
    pub fn new(seconds: u64, operation: impl Into<String>) -> Self {
        Self::from_duration(Duration::from_secs(seconds), operation)
    }

    /// Sub-second budgets are only useful in tests.
    pub fn from_duration(duration: Duration, operation: impl Into<String>) -> Self {
        Self {
            duration,
            operation: operation.into(),
        }
    }

    /// Whole seconds reported in [`StegError::Timeout`], rounded up.
    fn reported_seconds(&self) -> u64 {
        let secs = self.duration.as_secs();
        if self.duration.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        }
    }
}

/// Await `future` for at most `config.duration`.
///
/// An inner error passes through untouched; expiry yields
/// [`StegError::Timeout`] and drops the future.
pub async fn with_timeout<T, F>(config: TimeoutConfig, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    debug!(operation = %config.operation, budget = ?config.duration, "bounded wait");
    match timeout(config.duration, future).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation = %config.operation, budget = ?config.duration, "operation timed out");
            Err(StegError::Timeout {
                seconds: config.reported_seconds(),
            })
        }
    }
}
