//! Batch cleanup of abandoned iterative lock chains.
//!
//! Chain steps normally vanish when their checker finishes. A checker that
//! dies mid-check leaves its step behind, and the step is only swept the next
//! time someone releases the base claim. For claims nobody touches again,
//! [`clean_up_old_job_locks`] finds chains whose newest file is older than a
//! threshold and runs one ordinary acquire/release cycle on the base claim,
//! with the threshold as corrupt-file timeout.

use super::chain::chain_base;
use super::job_lock::JobLock;
use super::types::{Acquisition, JobOutcome};
use crate::config::Config;
use crate::error::{JobLockError, Result};
use crate::fs::modified_age;
use crate::identity::IdentityOracle;
use chrono::TimeDelta;
use globset::{Glob, GlobMatcher};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use walkdir::WalkDir;

/// Options for [`clean_up_old_job_locks`].
#[derive(Debug, Clone)]
pub struct CleanUpOptions {
    /// Chains modified more recently than this are kept.
    pub max_age: Duration,
    /// File-name glob selecting chain files.
    pub glob: String,
    /// Report what would be removed without touching anything.
    pub dry_run: bool,
}

impl Default for CleanUpOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl CleanUpOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_age: config.cleanup_max_age(),
            glob: config.cleanup_glob.clone(),
            dry_run: false,
        }
    }
}

/// Base claims grouped by what cleanup did (or would do) with their chains.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanUpReport {
    /// Base claims whose chains were (or would be) removed.
    pub removed: Vec<PathBuf>,
    /// Base claims whose chains were kept.
    pub kept: Vec<PathBuf>,
}

/// Remove iterative lock chains under `root` older than `options.max_age`.
///
/// # Returns
///
/// * `Ok(CleanUpReport)` - What was removed and kept (planned, in a dry run)
/// * `Err(JobLockError::UserError)` - The glob does not compile
/// * `Err(JobLockError::IoError)` - `root` cannot be read
pub fn clean_up_old_job_locks(
    root: &Path,
    options: &CleanUpOptions,
    oracle: Arc<dyn IdentityOracle>,
) -> Result<CleanUpReport> {
    let matcher = Glob::new(&options.glob)
        .map_err(|e| {
            JobLockError::UserError(format!("invalid cleanup glob '{}': {}", options.glob, e))
        })?
        .compile_matcher();

    let chain_files = collect_matching(root, &matcher)?;

    let mut chains: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
    for file in chain_files {
        if let Some(base) = chain_base(&file) {
            chains.entry(base).or_default().push(file);
        }
    }

    let threshold = TimeDelta::from_std(options.max_age).unwrap_or(TimeDelta::MAX);
    let mut report = CleanUpReport::default();
    for (base, files) in chains {
        match newest_age(&files) {
            Some(age) if age >= threshold => report.removed.push(base),
            _ => report.kept.push(base),
        }
    }

    let (verb, dont_verb) = if options.dry_run {
        ("Would remove", "Would not remove")
    } else {
        ("Removing", "Keeping")
    };

    tracing::info!("{} the following locks (and their iterations):", verb);
    for base in &report.removed {
        tracing::info!(path = %base.display(), "{}", verb);
    }

    if !options.dry_run {
        let planned = std::mem::take(&mut report.removed);
        for base in planned {
            if reap(&base, options.max_age, &oracle) {
                report.removed.push(base);
            } else {
                report.kept.push(base);
            }
        }
        report.kept.sort();
    }

    tracing::info!("{} the following locks (and their iterations):", dont_verb);
    for base in &report.kept {
        tracing::info!(path = %base.display(), "{}", dont_verb);
    }

    Ok(report)
}

/// One acquire/release cycle on `base`; releasing sweeps the chain.
fn reap(base: &Path, max_age: Duration, oracle: &Arc<dyn IdentityOracle>) -> bool {
    let lock = JobLock::new(base, Arc::clone(oracle)).corrupt_file_timeout(Some(max_age));
    match lock.try_acquire() {
        Ok(Acquisition::Acquired(guard)) => {
            guard.release(JobOutcome::Success);
            true
        }
        Ok(Acquisition::Rejected(rejection)) => {
            tracing::info!(path = %base.display(), reason = %rejection, "lock still held, keeping");
            false
        }
        Err(e) => {
            tracing::warn!(path = %base.display(), error = %e, "failed to clean up lock");
            false
        }
    }
}

/// Age of the most recently modified file, or `None` if any is gone.
fn newest_age(files: &[PathBuf]) -> Option<TimeDelta> {
    let mut newest: Option<TimeDelta> = None;
    for file in files {
        let age = match modified_age(file) {
            Ok(age) => age,
            Err(e) => {
                tracing::debug!(path = %file.display(), error = %e, "chain file vanished during scan");
                return None;
            }
        };
        newest = Some(newest.map_or(age, |n| n.min(age)));
    }
    newest
}

/// Recursively collect files whose name matches `matcher`. Symlinked
/// directories are not followed; unreadable entries below `root` are skipped.
fn collect_matching(root: &Path, matcher: &GlobMatcher) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(JobLockError::io("read directory", root, e.into()));
            }
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_dir() && matcher.is_match(entry.file_name()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
