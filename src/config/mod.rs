//! Configuration management for the release publisher.
//!
//! Configuration lives in a TOML file (`publisher.toml` by default) with:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `PUBLISHER_<SECTION>_<KEY>` environment overrides
//! - Defaults for every optional setting
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use release_publisher::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("publisher.toml")?;
//! println!("Concurrency: {}", config.publisher.max_concurrent_releases);
//! println!("Storage: {}", config.storage.endpoint);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level and dry run
//! - [`PipelineConfig`] - concurrency, step timeout, shutdown grace period
//! - [`PostgreSQLConfig`] - relational store connection
//! - [`StorageConfig`] - blob storage endpoint, SAS token and containers
//! - [`NotifierConfig`] - subscriber notification API
//! - [`EventBusConfig`] - event topic
//! - [`LoggingConfig`] - file logging
//!
//! # Example Configuration
//!
//! ```toml
//! environment = "production"
//!
//! [publisher]
//! max_concurrent_releases = 4
//! step_timeout_seconds = 60
//!
//! [postgresql]
//! connection_string = "${PUBLISHER_DATABASE_URL}"
//!
//! [storage]
//! endpoint = "https://account.blob.core.windows.net"
//! sas_token = "${PUBLISHER_STORAGE_SAS}"
//!
//! [notifier]
//! base_url = "https://notifier.example.com/api"
//! api_key = "${PUBLISHER_NOTIFIER_KEY}"
//!
//! [event_bus]
//! topic_endpoint = "https://topic.westeurope-1.eventgrid.azure.net/api/events"
//! access_key = "${PUBLISHER_TOPIC_KEY}"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, Environment, EventBusConfig, LoggingConfig, NotifierConfig,
    PipelineConfig, PostgreSQLConfig, PublisherConfig, StorageConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
