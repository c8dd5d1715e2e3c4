//! Outcome and diagnostic types for lock acquisition.

use super::guard::LockGuard;
use crate::identity::{IdentityRecord, Liveness};
use chrono::TimeDelta;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// How the work guarded by a lock ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// Outputs are kept.
    Success,
    /// Declared outputs are deleted as partial work.
    Failure,
}

/// A declared input or output path and whether it existed when checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStatus {
    pub path: PathBuf,
    pub exists: bool,
}

impl PathStatus {
    pub(crate) fn of(paths: &[PathBuf]) -> Vec<PathStatus> {
        paths
            .iter()
            .map(|p| PathStatus {
                path: p.clone(),
                exists: p.exists(),
            })
            .collect()
    }
}

/// What is currently recorded at a claim path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimState {
    /// Nobody holds the claim.
    Unclaimed,
    /// The claim names its owner.
    Owned(IdentityRecord),
    /// The claim exists but its content is not an identity.
    Corrupt(String),
}

/// Why a lock was not acquired.
///
/// Every variant is an expected outcome; none of them is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// All declared outputs exist and nobody holds the claim: the work is done.
    OutputsPresent { outputs: Vec<PathStatus> },
    /// Some declared inputs are missing: the work cannot start yet.
    InputsMissing { inputs: Vec<PathStatus> },
    /// Another process is already deciding whether the claim is abandoned.
    CheckInProgress { chain_path: PathBuf },
    /// The claim is held by the calling process or job itself.
    HeldBySelf { owner: IdentityRecord },
    /// The owner is running, or its liveness cannot be established.
    Held {
        owner: IdentityRecord,
        liveness: Liveness,
    },
    /// The claim content is unparsable and not (yet) past the corrupt-file timeout.
    Corrupt {
        age: Option<TimeDelta>,
        timeout: Option<Duration>,
    },
    /// The claim was cleared but another process created it first.
    LostRace { removed_failed_job: bool },
}

impl Rejection {
    /// The recorded owner of the claim, if it was parsed.
    pub fn owner(&self) -> Option<&IdentityRecord> {
        match self {
            Rejection::HeldBySelf { owner } | Rejection::Held { owner, .. } => Some(owner),
            _ => None,
        }
    }

    /// Whether an abandoned claim and its outputs were deleted on the way.
    pub fn removed_failed_job(&self) -> bool {
        matches!(
            self,
            Rejection::LostRace {
                removed_failed_job: true
            }
        )
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::OutputsPresent { .. } => write!(f, "all output files already exist"),
            Rejection::InputsMissing { inputs } => {
                let missing: Vec<String> = inputs
                    .iter()
                    .filter(|s| !s.exists)
                    .map(|s| s.path.display().to_string())
                    .collect();
                write!(f, "input files missing: {}", missing.join(", "))
            }
            Rejection::CheckInProgress { chain_path } => write!(
                f,
                "another process is checking the lock (holds '{}')",
                chain_path.display()
            ),
            Rejection::HeldBySelf { owner } => write!(f, "held by this process ({})", owner),
            Rejection::Held { owner, liveness } => {
                write!(f, "held by {} (owner {})", owner, liveness.as_str())
            }
            Rejection::Corrupt { age, timeout } => match (age, timeout) {
                (Some(age), Some(timeout)) => write!(
                    f,
                    "lock file is corrupt ({}s old, timeout {}s)",
                    age.num_seconds(),
                    timeout.as_secs()
                ),
                _ => write!(f, "lock file is corrupt (no timeout configured)"),
            },
            Rejection::LostRace { .. } => write!(f, "another process claimed the lock first"),
        }
    }
}

/// Result of a single acquisition attempt.
#[derive(Debug)]
pub enum Acquisition {
    Acquired(LockGuard),
    Rejected(Rejection),
}

impl Acquisition {
    pub fn is_acquired(&self) -> bool {
        matches!(self, Acquisition::Acquired(_))
    }

    /// The guard, if the lock was acquired.
    pub fn guard(self) -> Option<LockGuard> {
        match self {
            Acquisition::Acquired(guard) => Some(guard),
            Acquisition::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Acquisition::Acquired(_) => None,
            Acquisition::Rejected(rejection) => Some(rejection),
        }
    }
}
