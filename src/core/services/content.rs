//! Content artifact maintenance
//!
//! When an amendment goes live, the rendered content and download files of
//! the versions it supersedes are removed from object storage. The
//! publication taxonomy (`publications/tree.json`) is rebuilt once per batch.

use crate::adapters::gateways::traits::{BlobStorage, ReleaseMetadataGateway};
use crate::core::publish::timeout::{with_timeout, DEFAULT_STEP_TIMEOUT};
use crate::domain::ids::{PublicationId, ReleaseVersionId};
use crate::domain::{ReleaseVersion, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Path of the publication taxonomy in the content container
pub const TAXONOMY_PATH: &str = "publications/tree.json";

/// Container names used for public artifacts
#[derive(Debug, Clone)]
pub struct ContentContainers {
    /// Rendered publication and release content
    pub content: String,

    /// Release download files
    pub release_files: String,
}

/// One entry in the publication taxonomy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyEntry {
    pub id: PublicationId,
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub latest_release_version_id: Option<ReleaseVersionId>,
}

/// Removes superseded artifacts and refreshes cached taxonomy
pub struct ContentArtifactService {
    storage: Arc<dyn BlobStorage + Send + Sync>,
    metadata: Arc<dyn ReleaseMetadataGateway + Send + Sync>,
    containers: ContentContainers,
    step_timeout: Duration,
}

impl ContentArtifactService {
    /// Create a new service
    pub fn new(
        storage: Arc<dyn BlobStorage + Send + Sync>,
        metadata: Arc<dyn ReleaseMetadataGateway + Send + Sync>,
        containers: ContentContainers,
    ) -> Self {
        Self {
            storage,
            metadata,
            containers,
            step_timeout: DEFAULT_STEP_TIMEOUT,
        }
    }

    /// Deadline applied to each storage and metadata call
    pub fn with_step_timeout(mut self, step_timeout: Duration) -> Self {
        self.step_timeout = step_timeout;
        self
    }

    /// Delete download files and rendered content of every earlier version
    /// of the same release
    ///
    /// # Returns
    ///
    /// Number of blobs deleted across both containers.
    pub async fn remove_superseded_artifacts(&self, release: &ReleaseVersion) -> Result<usize> {
        let previous = with_timeout(
            "get_previous_release_versions",
            self.step_timeout,
            self.metadata.get_previous_release_versions(release),
        )
        .await?;
        let mut deleted = 0;

        for previous_id in &previous {
            let files_prefix = format!("{previous_id}/");
            deleted += with_timeout(
                "delete_prefix",
                self.step_timeout,
                self.storage
                    .delete_prefix(&self.containers.release_files, &files_prefix),
            )
            .await?;

            let content_prefix = format!("releases/{previous_id}/");
            deleted += with_timeout(
                "delete_prefix",
                self.step_timeout,
                self.storage
                    .delete_prefix(&self.containers.content, &content_prefix),
            )
            .await?;
        }

        if !previous.is_empty() {
            tracing::info!(
                release_version_id = %release.id,
                superseded_versions = previous.len(),
                blobs_deleted = deleted,
                "Removed superseded release artifacts"
            );
        }

        Ok(deleted)
    }

    /// Rebuild the publication taxonomy
    pub async fn refresh_taxonomy(&self) -> Result<Vec<TaxonomyEntry>> {
        let mut entries: Vec<TaxonomyEntry> = with_timeout(
            "list_published_publications",
            self.step_timeout,
            self.metadata.list_published_publications(),
        )
        .await?
        .into_iter()
            .map(|publication| TaxonomyEntry {
                id: publication.id,
                slug: publication.slug,
                title: publication.title,
                summary: publication.summary,
                latest_release_version_id: publication.latest_published_release_version_id,
            })
            .collect();
        entries.sort_by(|a, b| a.title.cmp(&b.title));

        let body = serde_json::to_value(&entries)?;
        with_timeout(
            "upload_json",
            self.step_timeout,
            self.storage
                .upload_json(&self.containers.content, TAXONOMY_PATH, &body),
        )
        .await?;

        tracing::debug!(publications = entries.len(), "Refreshed publication taxonomy");
        Ok(entries)
    }
}
