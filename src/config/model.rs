//! Config struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};

/// Configuration for job-lock.
///
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Lock settings
    // =========================================================================
    /// Seconds after which an unparsable claim is treated as abandoned.
    /// `None` leaves corrupt claims locked forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrupt_file_timeout_secs: Option<u64>,

    // =========================================================================
    // Waiting lock settings
    // =========================================================================
    /// Delay between attempts of a waiting lock, in milliseconds.
    #[serde(default = "default_wait_delay_ms")]
    pub wait_delay_ms: u64,

    /// Attempts a waiting lock makes before giving up with a fatal error.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    // =========================================================================
    // Cleanup settings
    // =========================================================================
    /// Age in seconds after which an iterative lock chain may be reaped.
    #[serde(default = "default_cleanup_max_age_secs")]
    pub cleanup_max_age_secs: u64,

    /// File-name glob selecting iterative lock files during cleanup.
    #[serde(default = "default_cleanup_glob")]
    pub cleanup_glob: String,

    // =========================================================================
    // Scheduler settings
    // =========================================================================
    /// Environment variable holding the scheduler job id inside a cluster job.
    #[serde(default = "default_scheduler_job_env")]
    pub scheduler_job_env: String,

    /// Executable used to query scheduler job state.
    #[serde(default = "default_squeue_command")]
    pub squeue_command: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            corrupt_file_timeout_secs: None,
            wait_delay_ms: default_wait_delay_ms(),
            max_iterations: default_max_iterations(),
            cleanup_max_age_secs: default_cleanup_max_age_secs(),
            cleanup_glob: default_cleanup_glob(),
            scheduler_job_env: default_scheduler_job_env(),
            squeue_command: default_squeue_command(),
        }
    }
}
