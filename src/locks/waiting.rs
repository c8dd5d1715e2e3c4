//! Retry-with-delay acquisition.

use super::guard::LockGuard;
use super::job_lock::JobLock;
use super::types::Acquisition;
use crate::config::Config;
use crate::error::{JobLockError, Result};
use std::time::Duration;

/// A lock that is retried until acquired, up to an iteration ceiling.
#[derive(Debug, Clone)]
pub struct WaitingLock {
    lock: JobLock,
    delay: Duration,
    max_iterations: u32,
    task: String,
}

/// A lock acquired by [`WaitingLock::acquire`].
#[derive(Debug)]
pub struct Waited {
    pub guard: LockGuard,
    /// Attempts made, counting the successful one.
    pub iterations: u32,
}

impl WaitingLock {
    pub fn new(lock: JobLock, delay: Duration) -> Self {
        Self {
            lock,
            delay,
            max_iterations: 1000,
            task: "doing this".to_string(),
        }
    }

    /// A waiting lock with the configured delay and ceiling.
    pub fn from_config(lock: JobLock, config: &Config) -> Self {
        Self::new(lock, config.wait_delay()).max_iterations(config.max_iterations)
    }

    /// Attempts made before giving up. At least one attempt is always made.
    pub fn max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// What the lock protects, for the waiting message.
    pub fn task(mut self, task: impl Into<String>) -> Self {
        self.task = task.into();
        self
    }

    /// Attempt acquisition until it succeeds, sleeping between attempts.
    ///
    /// # Returns
    ///
    /// * `Ok(Waited)` - The guard and the number of attempts made
    /// * `Err(JobLockError::RetryCeilingExceeded)` - Every one of `max_iterations` attempts was rejected
    /// * `Err(JobLockError::IoError)` - An attempt failed outright
    pub fn acquire(&self) -> Result<Waited> {
        let mut iterations = 0;
        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(JobLockError::RetryCeilingExceeded {
                    path: self.lock.path().to_path_buf(),
                    max_iterations: self.max_iterations,
                });
            }

            match self.lock.try_acquire()? {
                Acquisition::Acquired(guard) => return Ok(Waited { guard, iterations }),
                Acquisition::Rejected(rejection) => {
                    tracing::info!(
                        path = %self.lock.path().display(),
                        iteration = iterations,
                        reason = %rejection,
                        "Another process is already {}. Waiting {:?}.",
                        self.task,
                        self.delay
                    );
                    std::thread::sleep(self.delay);
                }
            }
        }
    }
}
