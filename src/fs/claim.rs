//! Exclusive-create and missing-ok primitives for claim files.

use chrono::{DateTime, TimeDelta, Utc};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Create `path` exclusively.
///
/// At most one of several racing creators observes `Ok(Some(_))` for a given
/// path. `Ok(None)` means the path already exists. Missing parent directories
/// are created first.
pub fn create_exclusive(path: &Path) -> io::Result<Option<File>> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)?;
    }

    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => Ok(Some(file)),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(None),
        Err(e) => Err(e),
    }
}

/// Write `content` into a freshly created claim and sync it.
///
/// Failures are logged and swallowed: a claim whose content never made it to
/// disk is still a valid mutual-exclusion token, it merely reads as corrupt.
pub fn write_best_effort(mut file: File, path: &Path, content: &str) {
    if let Err(e) = file.write_all(content.as_bytes()) {
        tracing::warn!(path = %path.display(), error = %e, "failed to write lock owner");
        return;
    }
    if let Err(e) = file.sync_all() {
        tracing::warn!(path = %path.display(), error = %e, "failed to sync lock file");
    }
}

/// Remove a file, treating "not found" as success.
pub fn remove_missing_ok(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Remove a file, logging anything other than "not found" instead of failing.
pub fn remove_best_effort(path: &Path) {
    if let Err(e) = remove_missing_ok(path) {
        tracing::warn!(path = %path.display(), error = %e, "failed to remove file");
    }
}

/// Time elapsed since `path` was last modified, by the local wall clock.
///
/// A modification time in the future (clock skew between hosts) yields a
/// negative age.
pub fn modified_age(path: &Path) -> io::Result<TimeDelta> {
    let modified: DateTime<Utc> = fs::metadata(path)?.modified()?.into();
    Ok(Utc::now().signed_duration_since(modified))
}

/// Whether every path in `paths` currently exists.
pub fn all_exist(paths: &[PathBuf]) -> bool {
    paths.iter().all(|p| p.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_exclusive_only_once() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("job.lock");

        let first = create_exclusive(&path).unwrap();
        assert!(first.is_some());

        let second = create_exclusive(&path).unwrap();
        assert!(second.is_none());
    }

    #[test]
    fn test_create_exclusive_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a").join("b").join("job.lock");

        assert!(create_exclusive(&path).unwrap().is_some());
        assert!(path.exists());
    }

    #[test]
    fn test_write_best_effort_writes_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("job.lock");

        let file = create_exclusive(&path).unwrap().unwrap();
        write_best_effort(file, &path, "SLURM 0 42\n");

        assert_eq!(fs::read_to_string(&path).unwrap(), "SLURM 0 42\n");
    }

    #[test]
    fn test_remove_missing_ok() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gone.txt");

        // Missing file is not an error
        remove_missing_ok(&path).unwrap();

        fs::write(&path, "x").unwrap();
        remove_missing_ok(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_modified_age_is_small_for_fresh_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fresh.txt");
        fs::write(&path, "x").unwrap();

        let age = modified_age(&path).unwrap();
        assert!(age < TimeDelta::minutes(1));
    }

    #[test]
    fn test_modified_age_missing_file_errors() {
        let temp_dir = TempDir::new().unwrap();
        let err = modified_age(&temp_dir.path().join("missing")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_all_exist() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a");
        let b = temp_dir.path().join("b");
        fs::write(&a, "").unwrap();

        assert!(all_exist(&[]));
        assert!(all_exist(std::slice::from_ref(&a)));
        assert!(!all_exist(&[a.clone(), b.clone()]));
    }
}
