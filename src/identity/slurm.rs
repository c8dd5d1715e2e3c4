//! SLURM job-state queries.

use super::oracle::Liveness;
use std::io;
use std::process::Command;

/// Message squeue prints for a job id it no longer knows about.
const INVALID_JOB_ID: &str = "Invalid job id specified";

/// Ask the scheduler whether `job_id` is running.
pub(crate) fn job_liveness(squeue: &str, job_id: u64) -> Liveness {
    let job = job_id.to_string();
    let output = match Command::new(squeue)
        .args(["--job", &job, "--Format", "jobid,state", "--noheader"])
        .output()
    {
        Ok(output) => output,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(command = squeue, job_id, "scheduler query tool not found");
            return Liveness::Unknown;
        }
        Err(e) => {
            tracing::warn!(command = squeue, job_id, error = %e, "failed to run scheduler query");
            return Liveness::Unknown;
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout);

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains(INVALID_JOB_ID) || stdout.contains(INVALID_JOB_ID) {
            return Liveness::Dead;
        }
        tracing::warn!(
            command = squeue,
            job_id,
            exit_code = ?output.status.code(),
            stderr = %stderr.trim(),
            "scheduler query failed"
        );
        return Liveness::Unknown;
    }

    parse_job_state(&stdout, job_id)
}

/// Interpret `squeue` output of `<jobid> <state>` lines.
///
/// A pending job is not running: it was requeued (e.g. after node failure)
/// and its previous incarnation is gone. A job that is not listed has
/// finished. Any malformed line makes the whole answer unknown.
pub(crate) fn parse_job_state(output: &str, job_id: u64) -> Liveness {
    for line in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [listed_id, state] = fields.as_slice() else {
            tracing::warn!(line, "unparsable scheduler output");
            return Liveness::Unknown;
        };
        let Ok(listed_id) = listed_id.parse::<u64>() else {
            tracing::warn!(line, "unparsable job id in scheduler output");
            return Liveness::Unknown;
        };

        if listed_id == job_id {
            return match *state {
                "PENDING" | "PD" => Liveness::Dead,
                _ => Liveness::Alive,
            };
        }
    }

    Liveness::Dead
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_job_is_alive() {
        let output = "\n     1234567   RUNNING\n     1234568   PENDING\n";
        assert_eq!(parse_job_state(output, 1234567), Liveness::Alive);
    }

    #[test]
    fn test_pending_job_is_dead() {
        let output = "1234567 RUNNING\n1234568 PENDING\n";
        assert_eq!(parse_job_state(output, 1234568), Liveness::Dead);
        assert_eq!(parse_job_state("42 PD", 42), Liveness::Dead);
    }

    #[test]
    fn test_unlisted_job_is_dead() {
        assert_eq!(parse_job_state("1234567 RUNNING\n", 12345678), Liveness::Dead);
        assert_eq!(parse_job_state("", 1), Liveness::Dead);
    }

    #[test]
    fn test_other_states_are_alive() {
        assert_eq!(parse_job_state("7 COMPLETING", 7), Liveness::Alive);
        assert_eq!(parse_job_state("7 SUSPENDED", 7), Liveness::Alive);
    }

    #[test]
    fn test_malformed_line_is_unknown() {
        assert_eq!(parse_job_state("7 RUNNING extra\n", 7), Liveness::Unknown);
        assert_eq!(parse_job_state("RUNNING\n", 7), Liveness::Unknown);
        assert_eq!(parse_job_state("7_1 RUNNING\n", 7), Liveness::Unknown);
    }

    #[test]
    fn test_missing_command_is_unknown() {
        assert_eq!(
            job_liveness("/nonexistent/definitely-not-squeue", 1),
            Liveness::Unknown
        );
    }
}
