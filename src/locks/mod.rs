//! Locking subsystem for job-lock.
//!
//! This module implements mutual exclusion between processes that share
//! nothing but a filesystem:
//! - [`JobLock`]: one claim file, with optional input/output preconditions
//! - [`MultiJobLock`]: an ordered set of claims held together or not at all
//! - [`WaitingLock`]: retry with delay up to an iteration ceiling
//! - [`clean_up_old_job_locks`]: batch removal of abandoned lock chains
//!
//! # Claim Files
//!
//! A claim is created with **create_new** semantics (exclusive create), so at
//! most one racing process can acquire a given path. Its content is one line
//! naming the owner (see [`crate::identity`]).
//!
//! # Stale Claims
//!
//! When a claim already exists, the owner may have died without releasing
//! it. The check and the reclamation run while holding the next step of the
//! claim's iterative chain (`job.lock` -> `job.lock_2` -> ...), so only one
//! process at a time decides. A process that loses the race for the chain
//! step is rejected rather than waiting. Reclamation happens only when the
//! owner is provably dead, or when an unparsable claim is older than the
//! corrupt-file timeout.
//!
//! Timeouts compare file modification times with the local clock. Hosts
//! with skewed clocks can judge a live owner's fresh claim as expired.
//!
//! # RAII Guards
//!
//! Claims are released through [`LockGuard`], which releases on drop. If
//! deletion fails, a warning is logged but the program does not crash.

mod chain;
mod guard;
mod job_lock;
mod multi;
mod reaper;
mod types;
mod waiting;


// Re-export public API
pub use chain::{chain_base, chain_index, iterative_lock_path};
pub use guard::LockGuard;
pub use job_lock::JobLock;
pub use multi::{MultiAcquisition, MultiJobLock, MultiLockGuard};
pub use reaper::{CleanUpOptions, CleanUpReport, clean_up_old_job_locks};
pub use types::{Acquisition, ClaimState, JobOutcome, PathStatus, Rejection};
pub use waiting::{Waited, WaitingLock};
