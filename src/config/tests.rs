//! Tests for config functionality.

use crate::config::Config;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.corrupt_file_timeout_secs, None);
    assert_eq!(config.wait_delay_ms, 1000);
    assert_eq!(config.max_iterations, 1000);
    assert_eq!(config.cleanup_max_age_secs, 604_800);
    assert_eq!(config.cleanup_glob, "*.lock_*");
    assert_eq!(config.scheduler_job_env, "SLURM_JOBID");
    assert_eq!(config.squeue_command, "squeue");
    assert!(config.validate().is_ok());
}

#[test]
fn test_parse_minimal_yaml() {
    let config = Config::from_yaml("{}").unwrap();

    // Should use all defaults
    assert_eq!(config.max_iterations, 1000);
    assert_eq!(config.corrupt_file_timeout(), None);
}

#[test]
fn test_parse_partial_yaml() {
    let yaml = r#"
corrupt_file_timeout_secs: 3600
max_iterations: 10
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.corrupt_file_timeout(), Some(Duration::from_secs(3600)));
    assert_eq!(config.max_iterations, 10);

    // Unspecified values should use defaults
    assert_eq!(config.wait_delay(), Duration::from_secs(1));
    assert_eq!(config.squeue_command, "squeue");
}

#[test]
fn test_parse_full_yaml() {
    let yaml = r#"
corrupt_file_timeout_secs: 60
wait_delay_ms: 250
max_iterations: 5
cleanup_max_age_secs: 86400
cleanup_glob: "*.lock_[0-9]*"
scheduler_job_env: MY_JOB_ID
squeue_command: /opt/slurm/bin/squeue
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.corrupt_file_timeout(), Some(Duration::from_secs(60)));
    assert_eq!(config.wait_delay(), Duration::from_millis(250));
    assert_eq!(config.max_iterations, 5);
    assert_eq!(config.cleanup_max_age(), Duration::from_secs(86400));
    assert_eq!(config.cleanup_glob, "*.lock_[0-9]*");
    assert_eq!(config.scheduler_job_env, "MY_JOB_ID");
    assert_eq!(config.squeue_command, "/opt/slurm/bin/squeue");
}

#[test]
fn test_unknown_fields_are_ignored() {
    let yaml = r#"
max_iterations: 7
some_future_option: true
"#;
    let config = Config::from_yaml(yaml).unwrap();
    assert_eq!(config.max_iterations, 7);
}

#[test]
fn test_zero_max_iterations_rejected() {
    let err = Config::from_yaml("max_iterations: 0").unwrap_err();
    assert!(err.to_string().contains("max_iterations must be greater than 0"));
}

#[test]
fn test_empty_squeue_command_rejected() {
    let err = Config::from_yaml("squeue_command: \"  \"").unwrap_err();
    assert!(err.to_string().contains("squeue_command"));
}

#[test]
fn test_invalid_glob_rejected() {
    let err = Config::from_yaml("cleanup_glob: \"[unclosed\"").unwrap_err();
    assert!(err.to_string().contains("invalid cleanup_glob"));
}

#[test]
fn test_invalid_yaml_rejected() {
    let err = Config::from_yaml("max_iterations: [not, a, number]").unwrap_err();
    assert!(err.to_string().contains("failed to parse config YAML"));
}

#[test]
fn test_yaml_roundtrip_preserves_timeout() {
    let config = Config {
        corrupt_file_timeout_secs: Some(90),
        ..Config::default()
    };
    let yaml = config.to_yaml().unwrap();
    let parsed = Config::from_yaml(&yaml).unwrap();
    assert_eq!(parsed.corrupt_file_timeout_secs, Some(90));
}

#[test]
fn test_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("job_lock.yaml");
    std::fs::write(&path, "wait_delay_ms: 5\n").unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.wait_delay_ms, 5);
}

#[test]
fn test_load_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let err = Config::load(dir.path().join("missing.yaml")).unwrap_err();
    assert!(err.to_string().contains("failed to read config file"));
}
