//! Owner identity and liveness for job-lock.
//!
//! Every claim file records who holds it: a scheduler job (`SLURM 0 <jobid>`)
//! or a local process (`<platform> <node-id> <pid>`). When a claim is found
//! already held, the [`IdentityOracle`] decides whether the recorded owner is
//! still running.
//!
//! # Liveness
//!
//! Liveness is tri-state. [`Liveness::Unknown`] is returned whenever the
//! oracle cannot prove death (scheduler unavailable, unparsable output,
//! identity from another machine) and callers must treat it like
//! [`Liveness::Alive`]. Only [`Liveness::Dead`] permits reclamation.

mod local;
mod oracle;
mod record;
mod slurm;
mod system;


// Re-export public API
pub use oracle::{IdentityOracle, Liveness};
pub use record::{IdentityRecord, ParseIdentityError, SLURM_TAG, System};
pub use system::SystemOracle;
