//! Gateways to the systems the publisher talks to
//!
//! Each external concern sits behind a trait in [`traits`]. [`Gateways`]
//! bundles one implementation of each so the orchestrator can be built
//! from the production adapters or from test doubles alike.

pub mod factory;
pub mod traits;

pub use factory::{create_gateways, create_postgresql_client, gateways_with_client};
pub use traits::{
    BlobStorage, DataSetRepository, EventBus, MethodologyRepository, NotificationChannel,
    ReleaseMetadataGateway, StatusStorage, SubscriberDirectory,
};

use std::sync::Arc;

/// One implementation of every gateway trait
#[derive(Clone)]
pub struct Gateways {
    pub status_storage: Arc<dyn StatusStorage + Send + Sync>,
    pub metadata: Arc<dyn ReleaseMetadataGateway + Send + Sync>,
    pub data_sets: Arc<dyn DataSetRepository + Send + Sync>,
    pub methodologies: Arc<dyn MethodologyRepository + Send + Sync>,
    pub subscribers: Arc<dyn SubscriberDirectory + Send + Sync>,
    pub blob_storage: Arc<dyn BlobStorage + Send + Sync>,
    pub notifications: Arc<dyn NotificationChannel + Send + Sync>,
    pub event_bus: Arc<dyn EventBus + Send + Sync>,
}
