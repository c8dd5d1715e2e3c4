//! job-lock: file-based mutual exclusion for independent processes.
//!
//! Processes (possibly on different machines, possibly submitted through a
//! SLURM cluster) that share a filesystem use this crate to make sure only
//! one of them at a time performs the unit of work named by a lock path, and
//! to take over automatically when the previous holder died without
//! releasing its lock.

pub mod config;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod identity;
pub mod locks;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use error::{JobLockError, Result};
pub use identity::{IdentityOracle, IdentityRecord, Liveness, SystemOracle};
pub use locks::{
    Acquisition, CleanUpOptions, CleanUpReport, JobLock, JobOutcome, LockGuard,
    MultiAcquisition, MultiJobLock, Rejection, WaitingLock, clean_up_old_job_locks,
};
