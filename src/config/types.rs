//! Default value functions for the Config struct.

// Default value functions for serde
pub(crate) fn default_wait_delay_ms() -> u64 {
    1000
}
pub(crate) fn default_max_iterations() -> u32 {
    1000
}
pub(crate) fn default_cleanup_max_age_secs() -> u64 {
    7 * 24 * 60 * 60
}
pub(crate) fn default_cleanup_glob() -> String {
    "*.lock_*".to_string()
}
pub(crate) fn default_scheduler_job_env() -> String {
    "SLURM_JOBID".to_string()
}
pub(crate) fn default_squeue_command() -> String {
    "squeue".to_string()
}
