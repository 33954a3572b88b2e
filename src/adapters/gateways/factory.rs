//! Gateway factory
//!
//! Builds the production adapters from configuration.

use super::traits::StatusStorage;
use super::Gateways;
use crate::adapters::http::{HttpBlobStorage, HttpEventBus, HttpNotificationChannel};
use crate::adapters::memory::InMemoryStatusStorage;
use crate::adapters::postgresql::{PostgreSQLAdapter, PostgreSQLClient};
use crate::config::PublisherConfig;
use crate::domain::Result;
use std::sync::Arc;

/// Create the PostgreSQL client for the content database
///
/// # Errors
///
/// Returns an error if the connection string is invalid or the pool cannot
/// be built.
pub async fn create_postgresql_client(config: &PublisherConfig) -> Result<Arc<PostgreSQLClient>> {
    tracing::info!("Creating PostgreSQL client");
    let client = PostgreSQLClient::new(config.postgresql.clone()).await?;
    Ok(Arc::new(client))
}

/// Create every gateway from configuration
///
/// In dry-run mode every adapter skips its writes, and publishing status is
/// kept in memory so attempts still move through their stages.
///
/// # Errors
///
/// Returns an error if any adapter cannot be constructed.
pub async fn create_gateways(config: &PublisherConfig) -> Result<Gateways> {
    let client = create_postgresql_client(config).await?;
    gateways_with_client(config, client)
}

/// Create every gateway over an existing PostgreSQL client
pub fn gateways_with_client(
    config: &PublisherConfig,
    client: Arc<PostgreSQLClient>,
) -> Result<Gateways> {
    let dry_run = config.application.dry_run;
    let database = Arc::new(PostgreSQLAdapter::new_with_arc(client, dry_run));

    let status_storage: Arc<dyn StatusStorage + Send + Sync> = if dry_run {
        tracing::info!("Dry run: publishing status kept in memory");
        Arc::new(InMemoryStatusStorage::new())
    } else {
        database.clone()
    };

    Ok(Gateways {
        status_storage,
        metadata: database.clone(),
        data_sets: database.clone(),
        methodologies: database.clone(),
        subscribers: database,
        blob_storage: Arc::new(HttpBlobStorage::new(&config.storage, dry_run)?),
        notifications: Arc::new(HttpNotificationChannel::new(&config.notifier, dry_run)?),
        event_bus: Arc::new(HttpEventBus::new(&config.event_bus, dry_run)?),
    })
}
