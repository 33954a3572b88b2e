//! Core business logic for the release publisher.
//!
//! # Modules
//!
//! - [`publish`] - Batch orchestration, latest-version resolution and reporting
//! - [`services`] - Data sets, methodologies, content, cache, notifications, events
//! - [`state`] - Publishing state machine and status store
//!
//! # Publishing Workflow
//!
//! 1. **Start**: Skip completed release versions, supersede stale attempts, record `Started`
//! 2. **Stamp**: Mark each release version published in the metadata store
//! 3. **Resolve**: Move each publication's latest published release version pointer
//! 4. **Fan out**: Promote data sets, publish methodologies, remove superseded artifacts
//! 5. **Cache**: Refresh taxonomy, publication cache entries and redirects
//! 6. **Notify**: One notification call per publication
//! 7. **Events**: One event call for the whole batch, then `Complete`
//!
//! # Example
//!
//! ```rust,no_run
//! use release_publisher::adapters::gateways::create_gateways;
//! use release_publisher::config::load_config;
//! use release_publisher::core::publish::{
//!     OrchestratorOptions, PublishRequest, PublishingCompletionOrchestrator,
//! };
//! use release_publisher::domain::ReleaseVersionId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("publisher.toml")?;
//! let gateways = create_gateways(&config).await?;
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let orchestrator = PublishingCompletionOrchestrator::new(
//!     &gateways,
//!     OrchestratorOptions::from_config(&config),
//!     shutdown_rx,
//! );
//!
//! let request = PublishRequest::new(vec![ReleaseVersionId::new_v4()]);
//! let summary = orchestrator.complete_publishing(request).await?;
//!
//! println!("Complete: {}", summary.complete_count());
//! println!("Failed: {}", summary.failed_count());
//! # Ok(())
//! # }
//! ```

pub mod publish;
pub mod services;
pub mod state;
