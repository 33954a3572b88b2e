//! External system integrations for the release publisher.
//!
//! - [`gateways`] - Gateway traits and the factory that builds them
//! - [`postgresql`] - Content database: status rows, release metadata, data
//!   sets, methodologies and subscribers
//! - [`http`] - Blob storage, notification API and event topic clients
//! - [`memory`] - In-memory status storage used for dry runs
//!
//! # Example
//!
//! ```rust,no_run
//! use release_publisher::adapters::gateways::create_gateways;
//! use release_publisher::config::load_config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("publisher.toml")?;
//! let gateways = create_gateways(&config).await?;
//! let _status = gateways.status_storage.clone();
//! # Ok(())
//! # }
//! ```

pub mod gateways;
pub mod http;
pub mod memory;
pub mod postgresql;
