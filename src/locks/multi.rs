//! All-or-nothing acquisition over an ordered set of locks.

use super::guard::LockGuard;
use super::job_lock::JobLock;
use super::types::{Acquisition, JobOutcome, Rejection};
use crate::error::Result;
use crate::identity::IdentityOracle;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Several locks that are held together or not at all.
#[derive(Debug, Clone)]
pub struct MultiJobLock {
    locks: Vec<JobLock>,
}

/// Result of a multi-lock acquisition attempt.
#[derive(Debug)]
pub enum MultiAcquisition {
    /// Every lock is held.
    Acquired(MultiLockGuard),
    /// The lock at `index` was rejected; locks before it were rolled back.
    Rejected {
        index: usize,
        path: PathBuf,
        rejection: Rejection,
    },
}

impl MultiAcquisition {
    pub fn is_acquired(&self) -> bool {
        matches!(self, MultiAcquisition::Acquired(_))
    }

    pub fn guard(self) -> Option<MultiLockGuard> {
        match self {
            MultiAcquisition::Acquired(guard) => Some(guard),
            MultiAcquisition::Rejected { .. } => None,
        }
    }
}

impl MultiJobLock {
    pub fn new(locks: Vec<JobLock>) -> Self {
        Self { locks }
    }

    /// Plain locks (no preconditions) on each of `paths`.
    pub fn from_paths<I, P>(paths: I, oracle: Arc<dyn IdentityOracle>) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::new(
            paths
                .into_iter()
                .map(|p| JobLock::new(p, Arc::clone(&oracle)))
                .collect(),
        )
    }

    pub fn locks(&self) -> &[JobLock] {
        &self.locks
    }

    /// Acquire every lock in order.
    ///
    /// On the first rejection (or error) the locks already acquired are
    /// released as failures in reverse order.
    pub fn try_acquire(&self) -> Result<MultiAcquisition> {
        let mut guards: Vec<LockGuard> = Vec::with_capacity(self.locks.len());

        for (index, lock) in self.locks.iter().enumerate() {
            match lock.try_acquire() {
                Ok(Acquisition::Acquired(guard)) => guards.push(guard),
                Ok(Acquisition::Rejected(rejection)) => {
                    tracing::debug!(
                        path = %lock.path().display(),
                        index,
                        reason = %rejection,
                        "multi-lock rejected, rolling back"
                    );
                    roll_back(guards);
                    return Ok(MultiAcquisition::Rejected {
                        index,
                        path: lock.path().to_path_buf(),
                        rejection,
                    });
                }
                Err(e) => {
                    roll_back(guards);
                    return Err(e);
                }
            }
        }

        Ok(MultiAcquisition::Acquired(MultiLockGuard { guards }))
    }
}

fn roll_back(mut guards: Vec<LockGuard>) {
    while let Some(guard) = guards.pop() {
        guard.release(JobOutcome::Failure);
    }
}

/// Guard over every lock of a [`MultiJobLock`].
///
/// Members are released in reverse acquisition order, all with the same
/// outcome. Dropping behaves like dropping each member guard.
#[derive(Debug)]
pub struct MultiLockGuard {
    guards: Vec<LockGuard>,
}

impl MultiLockGuard {
    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.guards.iter().map(LockGuard::path)
    }

    /// Whether any member reclaimed a dead owner's claim.
    pub fn removed_failed_job(&self) -> bool {
        self.guards.iter().any(LockGuard::removed_failed_job)
    }

    pub fn release(mut self, outcome: JobOutcome) {
        while let Some(guard) = self.guards.pop() {
            guard.release(outcome);
        }
    }
}

impl Drop for MultiLockGuard {
    fn drop(&mut self) {
        while let Some(guard) = self.guards.pop() {
            drop(guard);
        }
    }
}
