//! Gateway traits
//!
//! Every external collaborator of the publishing pipeline sits behind one of
//! these traits. The PostgreSQL and HTTP adapters implement them for
//! production; tests swap in in-memory fakes.

use crate::core::services::events::ReleaseVersionPublishedEvent;
use crate::core::services::notifications::NotificationMessage;
use crate::core::state::status::ReleasePublishingStatus;
use crate::domain::ids::{
    DataSetId, MethodologyVersionId, PublicationId, ReleasePublishingKey, ReleaseVersionId,
    SubscriberId,
};
use crate::domain::{MethodologyVersion, Publication, Redirect, ReleaseVersion, Result, Subscriber};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Persistence for publishing status rows
#[async_trait]
pub trait StatusStorage: Send + Sync {
    /// Load the row for one attempt
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(status))` if found, `Ok(None)` if not found.
    async fn load_status(&self, key: &ReleasePublishingKey)
        -> Result<Option<ReleasePublishingStatus>>;

    /// Insert or replace the row for an attempt
    async fn save_status(&self, status: &ReleasePublishingStatus) -> Result<()>;

    /// Every attempt recorded for a release version, oldest first
    async fn statuses_for_release(
        &self,
        release_version_id: ReleaseVersionId,
    ) -> Result<Vec<ReleasePublishingStatus>>;
}

/// Release and publication metadata in the relational store
#[async_trait]
pub trait ReleaseMetadataGateway: Send + Sync {
    /// Load a release version
    ///
    /// # Errors
    ///
    /// Returns [`PublisherError::NotFound`](crate::domain::PublisherError::NotFound)
    /// if the release version does not exist.
    async fn get_release_version(&self, id: ReleaseVersionId) -> Result<ReleaseVersion>;

    /// Stamp the release version as published
    async fn complete_publishing(
        &self,
        id: ReleaseVersionId,
        published_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Latest published version of a publication, ignoring `exclude`
    ///
    /// Recency is year, then time period coverage, then creation time.
    async fn get_latest_published_release_version(
        &self,
        publication_id: PublicationId,
        exclude: &[ReleaseVersionId],
    ) -> Result<Option<ReleaseVersion>>;

    /// Point the publication at a new latest published release version
    async fn update_latest_published_release_version(
        &self,
        publication_id: PublicationId,
        release_version_id: ReleaseVersionId,
    ) -> Result<()>;

    /// Load a publication
    async fn get_publication(&self, publication_id: PublicationId) -> Result<Publication>;

    /// Find a publication by its slug
    async fn find_publication_by_slug(&self, slug: &str) -> Result<Option<Publication>>;

    /// Older versions of the same release as `release_version`
    async fn get_previous_release_versions(
        &self,
        release_version: &ReleaseVersion,
    ) -> Result<Vec<ReleaseVersionId>>;

    /// Publications with at least one published release
    async fn list_published_publications(&self) -> Result<Vec<Publication>>;

    /// Every publication and release slug redirect
    async fn list_redirects(&self) -> Result<Vec<Redirect>>;
}

/// Data sets owned by releases
#[async_trait]
pub trait DataSetRepository: Send + Sync {
    /// Data sets attached to a release version
    async fn data_set_ids_for_release(
        &self,
        release_version_id: ReleaseVersionId,
    ) -> Result<Vec<DataSetId>>;

    /// Promote the staged version of a data set to live in one transaction
    ///
    /// A data set without a staged version is left untouched.
    async fn promote_staged_version(
        &self,
        data_set_id: DataSetId,
        published_at: DateTime<Utc>,
    ) -> Result<()>;
}

/// Methodology versions linked to publications
#[async_trait]
pub trait MethodologyRepository: Send + Sync {
    /// Latest version of every methodology owned by or adopted into a publication
    async fn latest_versions_for_publication(
        &self,
        publication_id: PublicationId,
    ) -> Result<Vec<MethodologyVersion>>;

    /// Stamp a methodology version as published
    async fn mark_published(
        &self,
        id: MethodologyVersionId,
        published_at: DateTime<Utc>,
    ) -> Result<()>;
}

/// Subscribers and the ledger of notifications already sent
#[async_trait]
pub trait SubscriberDirectory: Send + Sync {
    /// Verified subscribers of a publication
    async fn verified_subscribers(&self, publication_id: PublicationId) -> Result<Vec<Subscriber>>;

    /// Subscribers already notified about a release version
    async fn notified_subscribers(
        &self,
        release_version_id: ReleaseVersionId,
    ) -> Result<Vec<SubscriberId>>;

    /// Record that a subscriber was notified about the given release versions
    async fn record_notified(
        &self,
        subscriber_id: SubscriberId,
        release_version_ids: &[ReleaseVersionId],
    ) -> Result<()>;
}

/// Object storage holding rendered content and download files
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Write a JSON document, replacing any existing blob
    async fn upload_json(
        &self,
        container: &str,
        path: &str,
        content: &serde_json::Value,
    ) -> Result<()>;

    /// Delete every blob under a prefix
    ///
    /// # Returns
    ///
    /// Number of blobs deleted. A prefix with no blobs is not an error.
    async fn delete_prefix(&self, container: &str, prefix: &str) -> Result<usize>;
}

/// Delivery channel for subscriber emails
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Send one message
    async fn send(&self, message: &NotificationMessage) -> Result<()>;
}

/// Downstream event bus
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publish a batch of events in one outbound call
    async fn publish_batch(&self, events: &[ReleaseVersionPublishedEvent]) -> Result<()>;
}
