//! Config loading, validation, and utility operations.

use super::model::Config;
use crate::error::{JobLockError, Result};
use globset::Glob;
use std::path::Path;
use std::time::Duration;

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(JobLockError::UserError)` - Read error, parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            JobLockError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| JobLockError::UserError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            JobLockError::UserError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `max_iterations` must be positive
    /// - `scheduler_job_env` and `squeue_command` must be non-empty
    /// - `cleanup_glob` must be a valid glob
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(JobLockError::UserError(
                "config validation failed: max_iterations must be greater than 0".to_string(),
            ));
        }

        if self.scheduler_job_env.trim().is_empty() {
            return Err(JobLockError::UserError(
                "config validation failed: scheduler_job_env must be non-empty".to_string(),
            ));
        }

        if self.squeue_command.trim().is_empty() {
            return Err(JobLockError::UserError(
                "config validation failed: squeue_command must be non-empty".to_string(),
            ));
        }

        Glob::new(&self.cleanup_glob).map_err(|e| {
            JobLockError::UserError(format!(
                "config validation failed: invalid cleanup_glob '{}': {}",
                self.cleanup_glob, e
            ))
        })?;

        Ok(())
    }

    /// Corrupt-file timeout as a `Duration`, if configured.
    pub fn corrupt_file_timeout(&self) -> Option<Duration> {
        self.corrupt_file_timeout_secs.map(Duration::from_secs)
    }

    /// Delay between waiting-lock attempts.
    pub fn wait_delay(&self) -> Duration {
        Duration::from_millis(self.wait_delay_ms)
    }

    /// Minimum age of a lock chain before cleanup reaps it.
    pub fn cleanup_max_age(&self) -> Duration {
        Duration::from_secs(self.cleanup_max_age_secs)
    }
}
