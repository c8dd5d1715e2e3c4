//! Error types for job-lock.
//!
//! Rejections are ordinary outcomes and never surface here. Only genuine
//! failures do: bad configuration, unexpected I/O on the acquisition path,
//! and an exhausted retry ceiling.

use crate::exit_codes;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for job-lock operations.
#[derive(Error, Debug)]
pub enum JobLockError {
    /// Invalid configuration or arguments.
    #[error("{0}")]
    UserError(String),

    /// The filesystem refused an operation the protocol depends on.
    #[error("I/O failure: {0}")]
    IoError(String),

    /// A waiting lock was rejected on every attempt up to its ceiling.
    #[error(
        "lock '{}' still not acquired after {max_iterations} iterations",
        .path.display()
    )]
    RetryCeilingExceeded { path: PathBuf, max_iterations: u32 },
}

impl JobLockError {
    /// Returns the process exit code a host binary should use for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            JobLockError::UserError(_) => exit_codes::USER_ERROR,
            JobLockError::IoError(_) => exit_codes::IO_FAILURE,
            JobLockError::RetryCeilingExceeded { .. } => exit_codes::LOCK_FAILURE,
        }
    }

    pub(crate) fn io(action: &str, path: &std::path::Path, err: std::io::Error) -> Self {
        JobLockError::IoError(format!("failed to {} '{}': {}", action, path.display(), err))
    }
}

/// Result type alias for job-lock operations.
pub type Result<T> = std::result::Result<T, JobLockError>;
