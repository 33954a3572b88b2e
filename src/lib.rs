// Release Publisher - Release publishing completion pipeline
// Copyright (c) 2025 Release Publisher Contributors
// Licensed under the MIT License

//! # Release Publisher
//!
//! Takes a batch of approved release versions live. For each release version
//! the publisher stamps it as published, points its publication at the right
//! latest release, promotes staged data sets, publishes methodologies
//! scheduled with the release and removes superseded download files. For the
//! batch as a whole it then refreshes the public content cache, emails each
//! publication's subscribers once and raises one published event per
//! release version.
//!
//! Every attempt is tracked as a status row keyed by release version and
//! attempt id, so a run can be inspected and safely repeated.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Orchestration, publishing services and attempt state
//! - [`adapters`] - PostgreSQL, blob storage, notification and event clients
//! - [`domain`] - Identifiers, release and methodology models, errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use release_publisher::adapters::gateways::create_gateways;
//! use release_publisher::config::PublisherConfig;
//! use release_publisher::core::publish::{
//!     OrchestratorOptions, PublishRequest, PublishingCompletionOrchestrator,
//! };
//! use release_publisher::domain::ReleaseVersionId;
//! use tokio::sync::watch;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PublisherConfig::from_file("publisher.toml")?;
//!     let gateways = create_gateways(&config).await?;
//!     let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//!
//!     let orchestrator = PublishingCompletionOrchestrator::new(
//!         &gateways,
//!         OrchestratorOptions::from_config(&config),
//!         shutdown_rx,
//!     );
//!
//!     let id: ReleaseVersionId = "7d44b88c-4199-4bad-97dc-d78268e01398".parse()?;
//!     let summary = orchestrator
//!         .complete_publishing(PublishRequest::new(vec![id]))
//!         .await?;
//!
//!     println!("{} complete, {} failed", summary.complete_count(), summary.failed_count());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Fallible operations return [`domain::Result`], whose error type is
//! [`domain::PublisherError`]. A failure inside one release version is
//! recorded against that release's attempt and reported in the summary; only
//! a batch in which every release failed is returned as an error.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
