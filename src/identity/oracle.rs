//! The liveness oracle seam.

use super::record::IdentityRecord;

/// Whether the owner recorded in a claim is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// The owner is running.
    Alive,
    /// The owner is provably gone; its claim may be reclaimed.
    Dead,
    /// Liveness could not be established. Never grounds for reclamation.
    Unknown,
}

impl Liveness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Liveness::Alive => "alive",
            Liveness::Dead => "dead",
            Liveness::Unknown => "unknown",
        }
    }
}

/// Capability that knows who the caller is and whether recorded owners live.
///
/// Locks take this as an explicit collaborator so liveness decisions can be
/// tested without real processes or scheduler jobs.
pub trait IdentityOracle: Send + Sync {
    /// Identity of the calling process or job.
    fn current_identity(&self) -> IdentityRecord;

    /// Whether the owner described by `record` is still running.
    fn liveness(&self, record: &IdentityRecord) -> Liveness;
}
