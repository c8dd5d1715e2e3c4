//! Naming and traversal of iterative lock chains.
//!
//! Checking whether a held claim is abandoned is itself guarded by a lock one
//! step further along a chain of sibling files:
//!
//! ```text
//! job.txt -> job.txt.lock -> job.txt.lock_2 -> job.txt.lock_3 -> ...
//! job.lock -> job.lock_2 -> job.lock_3 -> ...
//! ```
//!
//! Racing checkers serialize on the first unused step.

use rand::Rng;
use regex::Regex;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

static CHAIN_EXTENSION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^lock(?:_([0-9]+))?$").expect("Invalid chain extension regex"));

/// Position of `path` in its chain: 1 for `.lock`, N for `.lock_N`.
///
/// Paths without a lock extension are chain bases and return `None`.
pub fn chain_index(path: &Path) -> Option<u64> {
    let extension = path.extension()?.to_str()?;
    let captures = CHAIN_EXTENSION_REGEX.captures(extension)?;
    match captures.get(1) {
        Some(n) => n.as_str().parse().ok(),
        None => Some(1),
    }
}

/// The next step in the chain after `path`.
pub fn iterative_lock_path(path: &Path) -> PathBuf {
    match chain_index(path) {
        Some(n) => path.with_extension(format!("lock_{}", n + 1)),
        None => {
            let mut name = OsString::from(path.as_os_str());
            name.push(".lock");
            PathBuf::from(name)
        }
    }
}

/// The `.lock` file every later step of `path`'s chain shares a stem with.
pub fn chain_root(path: &Path) -> PathBuf {
    iterative_lock_path(path).with_extension("lock")
}

/// The claim a chain file belongs to, for grouping during cleanup.
///
/// `job.lock_5` and `job.lock_12` both map to `job.lock`.
pub fn chain_base(path: &Path) -> Option<PathBuf> {
    let extension = path.extension()?.to_str()?;
    let head = extension.split('_').next()?;
    Some(path.with_extension(head))
}

/// Existing chain members sharing `root` with an index above `after`,
/// highest index first.
pub fn members_after(root: &Path, after: u64) -> io::Result<Vec<PathBuf>> {
    let parent = root.parent().unwrap_or(Path::new(""));
    let listing_dir = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };

    let mut members = Vec::new();
    for entry in std::fs::read_dir(listing_dir)? {
        let candidate = parent.join(entry?.file_name());
        if candidate.with_extension("lock") != root {
            continue;
        }
        if let Some(n) = chain_index(&candidate)
            && n > after
        {
            members.push((n, candidate));
        }
    }

    members.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(members.into_iter().map(|(_, path)| path).collect())
}

/// A random pause below 10ms, taken before competing for deep
/// chain steps so that two checkers do not keep colliding.
pub(crate) fn jitter() -> Duration {
    Duration::from_nanos(rand::thread_rng().gen_range(0..10_000_000))
}
