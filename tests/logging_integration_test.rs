//! Integration tests for logging functionality
//!
//! The global subscriber can only be installed once per process, so a
//! single test covers initialization end to end.

use release_publisher::config::LoggingConfig;
use release_publisher::logging::init_logging;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(config.local_enabled);
    assert_eq!(config.local_rotation, "daily");
    assert_eq!(config.file_prefix, "release-publisher.log");
}

#[test]
fn test_init_logging_rejects_unknown_level() {
    let config = LoggingConfig {
        local_enabled: false,
        ..LoggingConfig::default()
    };

    let result = init_logging("chatty", &config);
    assert!(result.is_err());
}

#[test]
fn test_init_logging_creates_log_directory() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
        file_prefix: "publisher-test.log".to_string(),
    };

    let guard = init_logging("debug", &config).expect("Failed to initialize logging");
    tracing::info!(release_version_id = "test", "Logging smoke test");
    drop(guard);

    assert!(log_path.exists());
}
