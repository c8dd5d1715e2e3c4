//! RAII lock guard implementation.

use super::job_lock::JobLock;
use super::types::JobOutcome;
use crate::fs::remove_best_effort;
use std::path::Path;

/// RAII guard for an acquired claim.
///
/// Releasing deletes the claim after sweeping abandoned steps of its
/// iterative chain. On [`JobOutcome::Failure`] the declared outputs are
/// deleted first. Dropping the guard releases it as a success, or as a
/// failure while the thread is panicking. Release never fails: problems
/// are logged as warnings.
#[derive(Debug)]
pub struct LockGuard {
    /// The lock that was acquired.
    lock: JobLock,

    /// Whether an abandoned claim was removed to make this acquisition.
    removed_failed_job: bool,

    /// Whether the lock has been released manually.
    released: bool,
}

impl LockGuard {
    pub(super) fn new(lock: JobLock, removed_failed_job: bool) -> Self {
        Self {
            lock,
            removed_failed_job,
            released: false,
        }
    }

    /// Get the path to the claim file.
    pub fn path(&self) -> &Path {
        self.lock.path()
    }

    /// Whether a dead owner's claim (and outputs) were removed to acquire this lock.
    pub fn removed_failed_job(&self) -> bool {
        self.removed_failed_job
    }

    /// Release the lock, reporting how the guarded work ended.
    pub fn release(mut self, outcome: JobOutcome) {
        self.released = true;
        self.release_claim(outcome);
    }

    fn release_claim(&self, outcome: JobOutcome) {
        if outcome == JobOutcome::Failure {
            for output in self.lock.declared_outputs() {
                remove_best_effort(output);
            }
        }

        self.lock.clean_up_iterative_locks();
        remove_best_effort(self.lock.path());

        tracing::debug!(
            path = %self.lock.path().display(),
            outcome = ?outcome,
            "released lock"
        );
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if !self.released {
            let outcome = if std::thread::panicking() {
                JobOutcome::Failure
            } else {
                JobOutcome::Success
            };
            self.release_claim(outcome);
        }
    }
}
