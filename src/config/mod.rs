//! Configuration model for job-lock.
//!
//! This module defines the Config struct that a host program may keep in a
//! YAML file (for example `job_lock.yaml`). It supports forward-compatible
//! parsing (unknown fields are ignored), sensible defaults for every field,
//! and validation of config values.

mod model;
mod operations;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export public API
pub use model::Config;
