//! The single-lock acquire/release protocol.

use super::chain::{chain_index, chain_root, iterative_lock_path, jitter, members_after};
use super::guard::LockGuard;
use super::types::{Acquisition, ClaimState, JobOutcome, PathStatus, Rejection};
use crate::config::Config;
use crate::error::{JobLockError, Result};
use crate::fs::{all_exist, create_exclusive, modified_age, remove_best_effort, write_best_effort};
use crate::identity::{IdentityOracle, Liveness};
use chrono::TimeDelta;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// A lock on a claim path, with optional input/output preconditions.
///
/// `JobLock` only describes the lock. Each successful [`JobLock::try_acquire`]
/// yields a [`LockGuard`] that owns the claim until it is released.
///
/// ```no_run
/// use job_lock::identity::SystemOracle;
/// use job_lock::locks::{Acquisition, JobLock, JobOutcome};
/// use std::sync::Arc;
///
/// let lock = JobLock::new("/shared/run42.lock", Arc::new(SystemOracle::default()))
///     .output_files(["/shared/run42.out"]);
/// if let Acquisition::Acquired(guard) = lock.try_acquire()? {
///     // ... produce /shared/run42.out ...
///     guard.release(JobOutcome::Success);
/// }
/// # Ok::<(), job_lock::error::JobLockError>(())
/// ```
#[derive(Clone)]
pub struct JobLock {
    path: PathBuf,
    output_files: Vec<PathBuf>,
    input_files: Vec<PathBuf>,
    check_output_files: bool,
    check_input_files: bool,
    corrupt_file_timeout: Option<Duration>,
    oracle: Arc<dyn IdentityOracle>,
}

impl std::fmt::Debug for JobLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobLock")
            .field("path", &self.path)
            .field("output_files", &self.output_files)
            .field("input_files", &self.input_files)
            .field("check_output_files", &self.check_output_files)
            .field("check_input_files", &self.check_input_files)
            .field("corrupt_file_timeout", &self.corrupt_file_timeout)
            .finish_non_exhaustive()
    }
}

impl JobLock {
    pub fn new(path: impl Into<PathBuf>, oracle: Arc<dyn IdentityOracle>) -> Self {
        Self {
            path: path.into(),
            output_files: Vec::new(),
            input_files: Vec::new(),
            check_output_files: true,
            check_input_files: true,
            corrupt_file_timeout: None,
            oracle,
        }
    }

    /// A lock using the configured default corrupt-file timeout.
    pub fn from_config(
        path: impl Into<PathBuf>,
        oracle: Arc<dyn IdentityOracle>,
        config: &Config,
    ) -> Self {
        Self::new(path, oracle).corrupt_file_timeout(config.corrupt_file_timeout())
    }

    /// Files the guarded work produces.
    pub fn output_files<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.output_files = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Files the guarded work needs before it can start.
    pub fn input_files<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.input_files = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Whether existing outputs make acquisition pointless (default true).
    pub fn check_output_files(mut self, check: bool) -> Self {
        self.check_output_files = check;
        self
    }

    /// Whether missing inputs block acquisition (default true).
    pub fn check_input_files(mut self, check: bool) -> Self {
        self.check_input_files = check;
        self
    }

    /// Age after which an unparsable claim counts as abandoned.
    pub fn corrupt_file_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.corrupt_file_timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn declared_outputs(&self) -> &[PathBuf] {
        &self.output_files
    }

    /// The chain step that guards stale-lock checks of this claim.
    pub fn iterative_lock_path(&self) -> PathBuf {
        iterative_lock_path(&self.path)
    }

    /// Try once to acquire the claim.
    ///
    /// # Returns
    ///
    /// * `Ok(Acquisition::Acquired)` - The claim now records the caller as owner
    /// * `Ok(Acquisition::Rejected)` - Not acquired; the rejection says why
    /// * `Err(JobLockError::IoError)` - The claim could not be created or inspected
    pub fn try_acquire(&self) -> Result<Acquisition> {
        if let Some(rejection) = self.check_preconditions() {
            tracing::debug!(path = %self.path.display(), reason = %rejection, "lock rejected");
            return Ok(Acquisition::Rejected(rejection));
        }

        if let Some(file) = self.create_claim()? {
            return Ok(Acquisition::Acquired(self.claim(file, false)));
        }

        let acquisition = self.check_stale()?;
        if let Acquisition::Rejected(rejection) = &acquisition {
            tracing::debug!(path = %self.path.display(), reason = %rejection, "lock rejected");
        }
        Ok(acquisition)
    }

    /// Whether the lock could be acquired right now.
    ///
    /// Acquires and immediately releases the claim, so this has the same side
    /// effects as a successful acquisition (including reclaiming a dead owner).
    pub fn would_acquire(&self) -> Result<bool> {
        match self.try_acquire()? {
            Acquisition::Acquired(guard) => {
                guard.release(JobOutcome::Success);
                Ok(true)
            }
            Acquisition::Rejected(_) => Ok(false),
        }
    }

    /// Read who currently holds the claim, without acquiring it.
    pub fn read_owner(&self) -> Result<ClaimState> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(match content.parse() {
                Ok(owner) => ClaimState::Owned(owner),
                Err(_) => ClaimState::Corrupt(content),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(ClaimState::Unclaimed),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                Ok(ClaimState::Corrupt(String::new()))
            }
            Err(e) => Err(JobLockError::io("read lock file", &self.path, e)),
        }
    }

    fn check_preconditions(&self) -> Option<Rejection> {
        if self.check_output_files
            && !self.output_files.is_empty()
            && all_exist(&self.output_files)
            && !self.path.exists()
        {
            return Some(Rejection::OutputsPresent {
                outputs: PathStatus::of(&self.output_files),
            });
        }

        if self.check_input_files
            && !self.input_files.is_empty()
            && !all_exist(&self.input_files)
        {
            return Some(Rejection::InputsMissing {
                inputs: PathStatus::of(&self.input_files),
            });
        }

        None
    }

    fn create_claim(&self) -> Result<Option<File>> {
        create_exclusive(&self.path).map_err(|e| JobLockError::io("create lock file", &self.path, e))
    }

    fn claim(&self, file: File, removed_failed_job: bool) -> LockGuard {
        let owner = self.oracle.current_identity();
        write_best_effort(file, &self.path, &owner.to_claim_line());

        tracing::debug!(
            path = %self.path.display(),
            owner = %owner,
            removed_failed_job,
            "acquired lock"
        );
        LockGuard::new(self.clone(), removed_failed_job)
    }

    /// A bare lock on another step of this claim's chain.
    fn chain_step(&self, path: PathBuf) -> JobLock {
        JobLock::new(path, Arc::clone(&self.oracle)).corrupt_file_timeout(self.corrupt_file_timeout)
    }

    /// Decide, under the next chain step, whether the existing claim is abandoned.
    fn check_stale(&self) -> Result<Acquisition> {
        if chain_index(&self.path).is_some_and(|n| n > 1) {
            std::thread::sleep(jitter());
        }

        let step = self.chain_step(self.iterative_lock_path());
        let step_guard = match step.try_acquire()? {
            Acquisition::Acquired(guard) => guard,
            Acquisition::Rejected(_) => {
                return Ok(Acquisition::Rejected(Rejection::CheckInProgress {
                    chain_path: step.path,
                }));
            }
        };

        let result = self.reclaim_if_abandoned();
        step_guard.release(JobOutcome::Success);
        result
    }

    fn reclaim_if_abandoned(&self) -> Result<Acquisition> {
        match self.read_owner()? {
            // Released between our create attempt and the check.
            ClaimState::Unclaimed => self.retry_create(false),

            ClaimState::Corrupt(_) => {
                let Some(timeout) = self.corrupt_file_timeout else {
                    return Ok(Acquisition::Rejected(Rejection::Corrupt {
                        age: None,
                        timeout: None,
                    }));
                };

                let age = match modified_age(&self.path) {
                    Ok(age) => age,
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {
                        return self.retry_create(false);
                    }
                    Err(e) => return Err(JobLockError::io("stat lock file", &self.path, e)),
                };

                let expired = TimeDelta::from_std(timeout).is_ok_and(|timeout| age >= timeout);
                if expired {
                    tracing::info!(
                        path = %self.path.display(),
                        age_secs = age.num_seconds(),
                        "removing corrupt lock file past its timeout"
                    );
                    self.reclaim()
                } else {
                    Ok(Acquisition::Rejected(Rejection::Corrupt {
                        age: Some(age),
                        timeout: Some(timeout),
                    }))
                }
            }

            ClaimState::Owned(owner) => {
                if owner == self.oracle.current_identity() {
                    return Ok(Acquisition::Rejected(Rejection::HeldBySelf { owner }));
                }

                match self.oracle.liveness(&owner) {
                    Liveness::Dead => {
                        tracing::info!(
                            path = %self.path.display(),
                            owner = %owner,
                            "removing lock of dead owner"
                        );
                        self.reclaim()
                    }
                    liveness @ (Liveness::Alive | Liveness::Unknown) => {
                        Ok(Acquisition::Rejected(Rejection::Held { owner, liveness }))
                    }
                }
            }
        }
    }

    /// Delete an abandoned claim with its outputs and claim it afresh.
    fn reclaim(&self) -> Result<Acquisition> {
        for output in &self.output_files {
            remove_best_effort(output);
        }
        remove_best_effort(&self.path);
        self.retry_create(true)
    }

    fn retry_create(&self, removed_failed_job: bool) -> Result<Acquisition> {
        Ok(match self.create_claim()? {
            Some(file) => Acquisition::Acquired(self.claim(file, removed_failed_job)),
            None => Acquisition::Rejected(Rejection::LostRace { removed_failed_job }),
        })
    }

    /// Remove chain steps left behind by checkers that died mid-check.
    ///
    /// Only the claim itself (and a first `.lock` step) sweeps; deeper steps
    /// are covered when their base is released. The sweep walks from the
    /// highest index down and stops at the first step that is still held.
    pub(crate) fn clean_up_iterative_locks(&self) {
        let my_index = chain_index(&self.path).unwrap_or(0);
        if my_index > 1 {
            return;
        }

        let members = match members_after(&chain_root(&self.path), my_index) {
            Ok(members) => members,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to list iterative locks");
                return;
            }
        };

        for member in members {
            match self.chain_step(member.clone()).try_acquire() {
                Ok(Acquisition::Acquired(guard)) => guard.release(JobOutcome::Success),
                Ok(Acquisition::Rejected(rejection)) => {
                    tracing::debug!(path = %member.display(), reason = %rejection, "iterative lock still held");
                    break;
                }
                Err(e) => {
                    tracing::warn!(path = %member.display(), error = %e, "failed to clean up iterative lock");
                    break;
                }
            }
        }
    }
}
