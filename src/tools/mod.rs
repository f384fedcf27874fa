//! External tool adapter.
//!
//! Runs one external program with an argument vector, an optional working
//! directory and a wall-clock budget, then normalizes the outcome into a
//! [`ToolInvocation`]. Launch failure is detected at spawn time and carried
//! as [`ToolStatus::NotFound`]; the `"command not found"` stderr text is
//! still emitted so serialized reports keep their established shape, but
//! availability decisions never inspect stderr.

use crate::error::StegError;
use crate::timeout::{with_timeout, TimeoutConfig};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

/// Stderr text reported when the executable could not be started.
pub const NOT_FOUND_SENTINEL: &str = "command not found";

/// Marker appended to captured stderr when the budget expires.
pub const TIMEOUT_MARKER: &str = "\n[timeout]";

/// Default cap on bytes kept per captured stream.
pub const DEFAULT_MAX_OUTPUT: usize = 16 * 1024 * 1024;

/// How long stream readers may keep draining after a timed-out child is reaped.
const READER_GRACE: Duration = Duration::from_millis(500);

/// How an invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
    /// The process ran and returned an exit code.
    Exited,
    /// The process ended without an exit code (signal) or could not be awaited.
    Terminated,
    /// The executable could not be located or started.
    NotFound,
    /// The process exceeded its budget and was killed.
    TimedOut,
}

/// Normalized result of running an external binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolInvocation {
    pub cmd: Vec<String>,
    pub status: ToolStatus,
    pub returncode: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolInvocation {
    fn not_found(cmd: Vec<String>) -> Self {
        Self {
            cmd,
            status: ToolStatus::NotFound,
            returncode: None,
            stdout: String::new(),
            stderr: NOT_FOUND_SENTINEL.to_string(),
        }
    }

    /// The executable could not be started.
    pub fn is_not_found(&self) -> bool {
        self.status == ToolStatus::NotFound
    }

    /// The process never completed: not found, timed out, or killed.
    ///
    /// This is the availability test most analyzers apply; a few only
    /// consult [`Self::is_not_found`].
    pub fn is_unavailable(&self) -> bool {
        self.is_not_found() || self.returncode.is_none()
    }

    pub fn timed_out(&self) -> bool {
        self.status == ToolStatus::TimedOut
    }

    pub fn succeeded(&self) -> bool {
        self.returncode == Some(0)
    }
}

/// Builder for one external invocation.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    argv: Vec<String>,
    cwd: Option<PathBuf>,
    timeout: Duration,
    max_output: usize,
    search_path: Option<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            argv: vec![program.into()],
            cwd: None,
            timeout: Duration::from_secs(crate::timeout::DEFAULT_TIMEOUT_SECONDS),
            max_output: DEFAULT_MAX_OUTPUT,
            search_path: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.argv.push(arg.into());
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        let arg = path.to_string_lossy().into_owned();
        self.arg(arg)
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.argv.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout_secs(self, secs: u64) -> Self {
        self.timeout(Duration::from_secs(secs))
    }

    pub fn max_output(mut self, bytes: usize) -> Self {
        self.max_output = bytes;
        self
    }

    /// Replace the child's PATH, which also governs where the program is looked up.
    pub fn search_path(mut self, path: impl Into<String>) -> Self {
        self.search_path = Some(path.into());
        self
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Run the command to completion or until the budget expires.
    ///
    /// Never fails: every outcome is folded into the returned invocation.
    pub async fn run(self) -> ToolInvocation {
        let program = self.argv[0].clone();
        let mut command = Command::new(&program);
        command
            .args(&self.argv[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.cwd {
            command.current_dir(dir);
        }
        if let Some(path) = &self.search_path {
            command.env("PATH", path);
        }

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                debug!(tool = %program, error = %e, "failed to launch tool");
                return ToolInvocation::not_found(self.argv);
            }
        };

        let stdout_buf = Arc::new(Mutex::new(Vec::new()));
        let stderr_buf = Arc::new(Mutex::new(Vec::new()));
        let mut readers: Vec<JoinHandle<()>> = Vec::with_capacity(2);
        if let Some(out) = child.stdout.take() {
            readers.push(tokio::spawn(drain(out, Arc::clone(&stdout_buf), self.max_output)));
        }
        if let Some(err) = child.stderr.take() {
            readers.push(tokio::spawn(drain(err, Arc::clone(&stderr_buf), self.max_output)));
        }

        // One deadline covers both the wait and the stream drain.
        let deadline = Instant::now() + self.timeout;
        let budget = TimeoutConfig::from_duration(self.timeout, program.clone());
        let waited = with_timeout(budget, async {
            child.wait().await.map_err(|e| StegError::Tool {
                tool: program.clone(),
                message: e.to_string(),
            })
        })
        .await;

        let (status, returncode) = match waited {
            Ok(exit) => {
                // Background children inherit the pipes and may keep them open.
                if !drain_until(readers, deadline).await {
                    warn!(tool = %program, "output still open at deadline, stopped reading");
                }
                match exit.code() {
                    Some(code) => (ToolStatus::Exited, Some(code)),
                    None => (ToolStatus::Terminated, None),
                }
            }
            Err(StegError::Timeout { .. }) => {
                if let Err(e) = child.start_kill() {
                    warn!(tool = %program, error = %e, "failed to kill timed-out tool");
                }
                // Reap so no zombie outlives the invocation.
                let _ = child.wait().await;
                settle_readers(readers).await;
                (ToolStatus::TimedOut, None)
            }
            Err(e) => {
                warn!(tool = %program, error = %e, "failed to await tool");
                let _ = child.start_kill();
                let _ = child.wait().await;
                settle_readers(readers).await;
                (ToolStatus::Terminated, None)
            }
        };

        let stdout = take_text(&stdout_buf);
        let mut stderr = take_text(&stderr_buf);
        if status == ToolStatus::TimedOut {
            stderr.push_str(TIMEOUT_MARKER);
        }

        debug!(tool = %program, ?status, ?returncode, "tool finished");
        ToolInvocation {
            cmd: self.argv,
            status,
            returncode,
            stdout,
            stderr,
        }
    }
}

/// Copy a child stream into a shared buffer so partial output survives a kill.
async fn drain<R>(mut reader: R, sink: Arc<Mutex<Vec<u8>>>, cap: usize)
where
    R: AsyncRead + Unpin,
{
    let mut chunk = [0u8; 8192];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if let Ok(mut buf) = sink.lock() {
                    let room = cap.saturating_sub(buf.len());
                    buf.extend_from_slice(&chunk[..n.min(room)]);
                }
            }
        }
    }
}

/// Join readers until `deadline`; the rest are aborted. False if any was cut off.
async fn drain_until(readers: Vec<JoinHandle<()>>, deadline: Instant) -> bool {
    let mut complete = true;
    for mut reader in readers {
        if timeout_at(deadline, &mut reader).await.is_err() {
            reader.abort();
            complete = false;
        }
    }
    complete
}

/// Give readers a short window after a kill; grandchildren may hold pipes open.
async fn settle_readers(readers: Vec<JoinHandle<()>>) {
    for mut reader in readers {
        if tokio::time::timeout(READER_GRACE, &mut reader).await.is_err() {
            reader.abort();
        }
    }
}

fn take_text(buf: &Arc<Mutex<Vec<u8>>>) -> String {
    match buf.lock() {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(poisoned) => String::from_utf8_lossy(&poisoned.into_inner()).into_owned(),
    }
}
