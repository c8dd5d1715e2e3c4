//! The production oracle: environment, process table and scheduler.

use super::local::{node_id, process_liveness};
use super::oracle::{IdentityOracle, Liveness};
use super::record::{IdentityRecord, System};
use super::slurm::job_liveness;
use crate::config::Config;

/// Oracle backed by the real environment.
///
/// Inside a scheduler job (the job-id environment variable is set) the caller
/// is identified by its job id; otherwise by this machine's node id and the
/// process id.
#[derive(Debug, Clone)]
pub struct SystemOracle {
    scheduler_job_env: String,
    squeue_command: String,
}

impl Default for SystemOracle {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl SystemOracle {
    pub fn from_config(config: &Config) -> Self {
        Self {
            scheduler_job_env: config.scheduler_job_env.clone(),
            squeue_command: config.squeue_command.clone(),
        }
    }

    /// The scheduler job id of the calling process, if it runs inside a job.
    pub fn scheduler_job_id(&self) -> Option<u64> {
        let raw = std::env::var(&self.scheduler_job_env).ok()?;
        match raw.trim().parse() {
            Ok(id) => Some(id),
            Err(_) => {
                tracing::warn!(
                    variable = %self.scheduler_job_env,
                    value = %raw,
                    "ignoring non-numeric scheduler job id"
                );
                None
            }
        }
    }

    fn local_liveness(&self, record: &IdentityRecord) -> Liveness {
        let me = self.current_identity();
        if me.system != record.system || me.node_id != record.node_id {
            return Liveness::Unknown;
        }
        if me.owner_id == record.owner_id {
            return Liveness::Alive;
        }
        process_liveness(record.owner_id)
    }
}

impl IdentityOracle for SystemOracle {
    fn current_identity(&self) -> IdentityRecord {
        match self.scheduler_job_id() {
            Some(job_id) => IdentityRecord::cluster(job_id),
            None => IdentityRecord::local(node_id(), u64::from(std::process::id())),
        }
    }

    fn liveness(&self, record: &IdentityRecord) -> Liveness {
        let liveness = match record.system {
            System::Cluster => job_liveness(&self.squeue_command, record.owner_id),
            System::Local(_) => self.local_liveness(record),
        };
        tracing::debug!(owner = %record, liveness = liveness.as_str(), "checked lock owner");
        liveness
    }
}
