//! Bounded I/O for artifact ingestion.
//!
//! Uploaded artifacts are read fully into memory once, so every analyzer
//! sees the same immutable bytes. The reader enforces a file-size ceiling
//! before allocating and a read budget while copying.

pub mod error;

use crate::io::error::{IoError, Result};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Defines the resource limits for I/O operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IOLimits {
    /// The absolute maximum file size that can be opened.
    pub max_file_size: u64,
    /// The maximum total number of bytes that can be read from the file.
    pub max_read_bytes: u64,
}

impl Default for IOLimits {
    fn default() -> Self {
        Self {
            max_file_size: 100 * 1024 * 1024, // 100MB
            max_read_bytes: 100 * 1024 * 1024,
        }
    }
}

impl IOLimits {
    /// Limits that allow reading a whole file of at most `max` bytes.
    pub fn whole_file(max: u64) -> Self {
        Self {
            max_file_size: max,
            max_read_bytes: max,
        }
    }
}

/// A bounded file reader.
pub struct SafeReader {
    path: PathBuf,
    file: File,
    limits: IOLimits,
    file_size: u64,
}

impl SafeReader {
    /// Opens a file and checks its size against `limits.max_file_size`.
    pub fn open<P: AsRef<Path>>(path: P, limits: IOLimits) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();

        debug!(
            path = %path.display(),
            size = file_size,
            limits.max_file_size = limits.max_file_size,
            "Opening file for safe reading"
        );

        if file_size > limits.max_file_size {
            warn!(
                path = %path.display(),
                size = file_size,
                limit = limits.max_file_size,
                "File is too large"
            );
            return Err(IoError::FileTooLarge {
                limit: limits.max_file_size,
                found: file_size,
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            file,
            limits,
            file_size,
        })
    }

    /// Returns the total size of the underlying file in bytes.
    pub fn size(&self) -> u64 {
        self.file_size
    }

    /// Reads the whole file, failing if it is larger than the read budget.
    pub fn read_all(mut self) -> Result<Vec<u8>> {
        if self.file_size > self.limits.max_read_bytes {
            return Err(IoError::ReadLimitExceeded {
                limit: self.limits.max_read_bytes,
                current: 0,
            });
        }
        let mut data = Vec::with_capacity(self.file_size as usize);
        // +1 so a file that grew after open() is detected rather than truncated
        let mut bounded = (&mut self.file).take(self.limits.max_read_bytes + 1);
        bounded.read_to_end(&mut data)?;
        if data.len() as u64 > self.limits.max_read_bytes {
            warn!(path = %self.path.display(), "File grew past read budget while reading");
            return Err(IoError::ReadLimitExceeded {
                limit: self.limits.max_read_bytes,
                current: data.len() as u64,
            });
        }
        Ok(data)
    }
}
