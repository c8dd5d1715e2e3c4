//! Local process identity and process-table probing.

use super::oracle::Liveness;
use std::hash::Hasher;
use twox_hash::XxHash64;

/// Stable identifier for this machine: xxHash64 (seed 0) of the host name.
pub(crate) fn node_id() -> u64 {
    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    host_hash(&host)
}

fn host_hash(host: &str) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(host.as_bytes());
    hasher.finish()
}

/// Look `pid` up in the local process table.
#[cfg(unix)]
pub(crate) fn process_liveness(pid: u64) -> Liveness {
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        // Larger than any pid the kernel hands out.
        return Liveness::Dead;
    };
    if pid <= 0 {
        return Liveness::Unknown;
    }

    // SAFETY: kill(pid, 0) performs the existence and permission checks of
    // kill(2) without delivering a signal.
    let result = unsafe { libc::kill(pid, 0) };
    if result == 0 {
        return Liveness::Alive;
    }

    match std::io::Error::last_os_error().raw_os_error() {
        Some(libc::ESRCH) => Liveness::Dead,
        // The process exists but belongs to someone else.
        Some(libc::EPERM) => Liveness::Alive,
        _ => Liveness::Unknown,
    }
}

#[cfg(not(unix))]
pub(crate) fn process_liveness(_pid: u64) -> Liveness {
    Liveness::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_is_stable() {
        assert_eq!(node_id(), node_id());
    }

    #[test]
    fn test_host_hash_known_values() {
        assert_eq!(host_hash(""), 0xef46_db37_51d8_e999);
        assert_eq!(host_hash("node-a"), host_hash("node-a"));
        assert_ne!(host_hash("node-a"), host_hash("node-b"));
    }

    #[cfg(unix)]
    #[test]
    fn test_own_process_is_alive() {
        assert_eq!(
            process_liveness(u64::from(std::process::id())),
            Liveness::Alive
        );
    }

    #[cfg(unix)]
    #[test]
    #[serial_test::serial]
    fn test_reaped_child_is_dead() {
        let mut child = std::process::Command::new("true").spawn().unwrap();
        let pid = u64::from(child.id());
        child.wait().unwrap();

        assert_eq!(process_liveness(pid), Liveness::Dead);
    }

    #[cfg(unix)]
    #[test]
    fn test_out_of_range_pid_is_dead() {
        assert_eq!(process_liveness(u64::MAX), Liveness::Dead);
    }
}
