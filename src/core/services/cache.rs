//! Public cache invalidation
//!
//! Recomputes the cached view models the public site reads, so readers do
//! not see a stale publication page after a release goes live.

use crate::adapters::gateways::traits::{BlobStorage, ReleaseMetadataGateway};
use crate::core::publish::timeout::{with_timeout, DEFAULT_STEP_TIMEOUT};
use crate::domain::ids::{PublicationId, ReleaseVersionId};
use crate::domain::{PublisherError, RedirectKind, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Path of the redirect table in the content container
pub const REDIRECTS_PATH: &str = "redirects.json";

/// Path of a publication's cached view model
pub fn publication_cache_path(slug: &str) -> String {
    format!("publications/{slug}/publication.json")
}

/// Latest release summary embedded in a publication's cache entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestReleaseViewModel {
    pub id: ReleaseVersionId,
    pub slug: String,
    pub title: String,
    pub published: Option<DateTime<Utc>>,
}

/// Cached publication page model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicationCacheViewModel {
    pub id: PublicationId,
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub latest_release: Option<LatestReleaseViewModel>,
}

/// One slug redirect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectViewModel {
    pub from_slug: String,
    pub to_slug: String,
}

/// Redirect table served by the public site
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectsViewModel {
    /// Renamed publication slugs
    pub publications: Vec<RedirectViewModel>,

    /// Renamed release slugs, keyed by owning publication slug
    pub releases: BTreeMap<String, Vec<RedirectViewModel>>,
}

/// Writes publication and redirect view models into the public cache
pub struct CacheInvalidationService {
    storage: Arc<dyn BlobStorage + Send + Sync>,
    metadata: Arc<dyn ReleaseMetadataGateway + Send + Sync>,
    container: String,
    step_timeout: Duration,
}

impl CacheInvalidationService {
    /// Create a new service writing to `container`
    pub fn new(
        storage: Arc<dyn BlobStorage + Send + Sync>,
        metadata: Arc<dyn ReleaseMetadataGateway + Send + Sync>,
        container: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            metadata,
            container: container.into(),
            step_timeout: DEFAULT_STEP_TIMEOUT,
        }
    }

    /// Deadline applied to each storage and metadata call
    pub fn with_step_timeout(mut self, step_timeout: Duration) -> Self {
        self.step_timeout = step_timeout;
        self
    }

    /// Recompute and store the cache entry for a publication
    ///
    /// # Errors
    ///
    /// Returns [`PublisherError::NotFound`] if no publication has this slug.
    pub async fn update_publication(&self, slug: &str) -> Result<PublicationCacheViewModel> {
        let publication = with_timeout(
            "find_publication_by_slug",
            self.step_timeout,
            self.metadata.find_publication_by_slug(slug),
        )
        .await?
        .ok_or_else(|| PublisherError::not_found("Publication", slug))?;

        let latest_release = match publication.latest_published_release_version_id {
            Some(id) => {
                let release = with_timeout(
                    "get_release_version",
                    self.step_timeout,
                    self.metadata.get_release_version(id),
                )
                .await?;
                Some(LatestReleaseViewModel {
                    id: release.id,
                    slug: release.slug,
                    title: release.title,
                    published: release.published,
                })
            }
            None => None,
        };

        let view_model = PublicationCacheViewModel {
            id: publication.id,
            slug: publication.slug,
            title: publication.title,
            summary: publication.summary,
            latest_release,
        };

        let path = publication_cache_path(slug);
        let body = serde_json::to_value(&view_model)?;
        with_timeout(
            "upload_json",
            self.step_timeout,
            self.storage.upload_json(&self.container, &path, &body),
        )
        .await?;

        tracing::debug!(publication_slug = %slug, "Updated publication cache");
        Ok(view_model)
    }

    /// Recompute and store the whole redirect table
    pub async fn update_redirects(&self) -> Result<RedirectsViewModel> {
        let mut view_model = RedirectsViewModel::default();

        let redirects = with_timeout(
            "list_redirects",
            self.step_timeout,
            self.metadata.list_redirects(),
        )
        .await?;
        for redirect in redirects {
            let entry = RedirectViewModel {
                from_slug: redirect.from_slug,
                to_slug: redirect.to_slug,
            };
            match (redirect.kind, redirect.publication_slug) {
                (RedirectKind::Publication, _) => view_model.publications.push(entry),
                (RedirectKind::Release, Some(publication_slug)) => view_model
                    .releases
                    .entry(publication_slug)
                    .or_default()
                    .push(entry),
                (RedirectKind::Release, None) => {
                    tracing::warn!(
                        from_slug = %entry.from_slug,
                        "Release redirect without a publication slug, skipping"
                    );
                }
            }
        }

        let body = serde_json::to_value(&view_model)?;
        with_timeout(
            "upload_json",
            self.step_timeout,
            self.storage.upload_json(&self.container, REDIRECTS_PATH, &body),
        )
        .await?;

        Ok(view_model)
    }
}
