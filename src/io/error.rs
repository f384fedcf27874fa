//! Error types for bounded artifact reads.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IoError {
    #[error("Artifact size of {found} bytes exceeds the maximum allowed size of {limit} bytes.")]
    FileTooLarge { limit: u64, found: u64 },

    #[error("Reading the artifact would exceed the read budget of {limit} bytes (read: {current})")]
    ReadLimitExceeded { limit: u64, current: u64 },

    #[error("An underlying I/O error occurred: {0}")]
    StdIo(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IoError>;
