//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::PublisherConfig;
use super::secret::secret_string;
use crate::domain::errors::PublisherError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`PublisherConfig`]
/// 4. Applies environment variable overrides (`PUBLISHER_*` prefix)
/// 5. Validates the configuration
///
/// # Examples
///
/// ```no_run
/// use release_publisher::config::loader::load_config;
///
/// let config = load_config("publisher.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<PublisherConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(PublisherError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        PublisherError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration from TOML text
///
/// Runs the same substitution, override and validation steps as
/// [`load_config`].
pub fn parse_config(contents: &str) -> Result<PublisherConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: PublisherConfig = toml::from_str(&contents)
        .map_err(|e| PublisherError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        PublisherError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

impl PublisherConfig {
    /// Load and validate configuration from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        load_config(path)
    }
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| PublisherError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|name| name == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(PublisherError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn env(name: &str) -> Option<String> {
    std::env::var(format!("PUBLISHER_{name}")).ok()
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env(name).and_then(|value| value.parse().ok())
}

/// Applies environment variable overrides using the `PUBLISHER_*` prefix
///
/// Variables follow the pattern `PUBLISHER_<SECTION>_<KEY>`, for example
/// `PUBLISHER_POSTGRESQL_CONNECTION_STRING` or
/// `PUBLISHER_PUBLISHER_MAX_CONCURRENT_RELEASES`. Values that fail to parse
/// are ignored.
fn apply_env_overrides(config: &mut PublisherConfig) {
    // Application
    if let Some(val) = env("APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = env_parse("APPLICATION_DRY_RUN") {
        config.application.dry_run = val;
    }

    // Pipeline
    if let Some(val) = env_parse("PUBLISHER_MAX_CONCURRENT_RELEASES") {
        config.publisher.max_concurrent_releases = val;
    }
    if let Some(val) = env_parse("PUBLISHER_STEP_TIMEOUT_SECONDS") {
        config.publisher.step_timeout_seconds = val;
    }
    if let Some(val) = env_parse("PUBLISHER_SHUTDOWN_TIMEOUT_SECS") {
        config.publisher.shutdown_timeout_secs = val;
    }

    // PostgreSQL
    if let Some(val) = env("POSTGRESQL_CONNECTION_STRING") {
        config.postgresql.connection_string = secret_string(val);
    }
    if let Some(val) = env_parse("POSTGRESQL_MAX_CONNECTIONS") {
        config.postgresql.max_connections = val;
    }
    if let Some(val) = env("POSTGRESQL_SSL_MODE") {
        config.postgresql.ssl_mode = val;
    }

    // Storage
    if let Some(val) = env("STORAGE_ENDPOINT") {
        config.storage.endpoint = val;
    }
    if let Some(val) = env("STORAGE_SAS_TOKEN") {
        config.storage.sas_token = secret_string(val);
    }
    if let Some(val) = env("STORAGE_PUBLIC_CONTENT_CONTAINER") {
        config.storage.public_content_container = val;
    }
    if let Some(val) = env("STORAGE_PUBLIC_RELEASE_FILES_CONTAINER") {
        config.storage.public_release_files_container = val;
    }

    // Notifier
    if let Some(val) = env("NOTIFIER_BASE_URL") {
        config.notifier.base_url = val;
    }
    if let Some(val) = env("NOTIFIER_API_KEY") {
        config.notifier.api_key = secret_string(val);
    }

    // Event bus
    if let Some(val) = env("EVENT_BUS_TOPIC_ENDPOINT") {
        config.event_bus.topic_endpoint = val;
    }
    if let Some(val) = env("EVENT_BUS_ACCESS_KEY") {
        config.event_bus.access_key = secret_string(val);
    }

    // Logging
    if let Some(val) = env_parse("LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val;
    }
    if let Some(val) = env("LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = env("LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }
}
