//! Methodology publishing
//!
//! Methodologies can be scheduled to go live together with a particular
//! release version. When that release version publishes, any approved and
//! not yet live methodology version tied to it is published too.

use crate::adapters::gateways::traits::MethodologyRepository;
use crate::core::publish::timeout::{with_timeout, DEFAULT_STEP_TIMEOUT};
use crate::domain::{MethodologyVersion, ReleaseVersion, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Publishes methodologies scheduled alongside a release
pub struct MethodologyPublishingService {
    repository: Arc<dyn MethodologyRepository + Send + Sync>,
    step_timeout: Duration,
}

impl MethodologyPublishingService {
    /// Create a new service over a methodology repository
    pub fn new(repository: Arc<dyn MethodologyRepository + Send + Sync>) -> Self {
        Self {
            repository,
            step_timeout: DEFAULT_STEP_TIMEOUT,
        }
    }

    /// Deadline applied to each repository call
    pub fn with_step_timeout(mut self, step_timeout: Duration) -> Self {
        self.step_timeout = step_timeout;
        self
    }

    /// Latest methodology versions linked to the release's publication,
    /// owned or adopted
    pub async fn get_latest_versions_by_release(
        &self,
        release: &ReleaseVersion,
    ) -> Result<Vec<MethodologyVersion>> {
        with_timeout(
            "latest_versions_for_publication",
            self.step_timeout,
            self.repository
                .latest_versions_for_publication(release.publication_id),
        )
        .await
    }

    /// Whether `methodology` is scheduled to go live with `release` and is
    /// not live yet
    pub fn is_being_published_alongside_release(
        &self,
        methodology: &MethodologyVersion,
        release: &ReleaseVersion,
    ) -> bool {
        methodology.is_being_published_alongside(release.id)
    }

    /// Publish a methodology version
    ///
    /// Publishing a version that is already live does nothing.
    pub async fn publish(
        &self,
        methodology: &MethodologyVersion,
        published_at: DateTime<Utc>,
    ) -> Result<()> {
        if methodology.published.is_some() {
            tracing::debug!(
                methodology_version_id = %methodology.id,
                "Methodology version already published"
            );
            return Ok(());
        }

        with_timeout(
            "mark_published",
            self.step_timeout,
            self.repository.mark_published(methodology.id, published_at),
        )
        .await?;

        tracing::info!(
            methodology_version_id = %methodology.id,
            slug = %methodology.slug,
            "Published methodology version"
        );
        Ok(())
    }

    /// Publish every methodology version scheduled alongside `release`
    ///
    /// # Returns
    ///
    /// Number of methodology versions published. A release with no linked
    /// methodologies publishes none.
    pub async fn publish_for_release(
        &self,
        release: &ReleaseVersion,
        published_at: DateTime<Utc>,
    ) -> Result<usize> {
        let mut published = 0;

        for methodology in self.get_latest_versions_by_release(release).await? {
            if self.is_being_published_alongside_release(&methodology, release) {
                self.publish(&methodology, published_at).await?;
                published += 1;
            }
        }

        Ok(published)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::{
        MethodologyId, MethodologyVersionId, PublicationId, ReleaseId, ReleaseVersionId,
    };
    use crate::domain::{MethodologyStatus, PublishingStrategy};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Repository {
        versions: Vec<MethodologyVersion>,
        published: Mutex<Vec<MethodologyVersionId>>,
    }

    #[async_trait]
    impl MethodologyRepository for Repository {
        async fn latest_versions_for_publication(
            &self,
            _publication_id: PublicationId,
        ) -> Result<Vec<MethodologyVersion>> {
            Ok(self.versions.clone())
        }

        async fn mark_published(
            &self,
            id: MethodologyVersionId,
            _published_at: DateTime<Utc>,
        ) -> Result<()> {
            self.published.lock().unwrap().push(id);
            Ok(())
        }
    }

    fn release() -> ReleaseVersion {
        ReleaseVersion::builder(
            ReleaseVersionId::new_v4(),
            ReleaseId::new_v4(),
            PublicationId::new_v4(),
        )
        .build()
    }

    fn methodology(
        strategy: PublishingStrategy,
        published: Option<DateTime<Utc>>,
    ) -> MethodologyVersion {
        MethodologyVersion {
            id: MethodologyVersionId::new_v4(),
            methodology_id: MethodologyId::new_v4(),
            owning_publication_id: PublicationId::new_v4(),
            slug: "methodology".to_string(),
            title: "Methodology".to_string(),
            version: 1,
            status: MethodologyStatus::Approved,
            publishing_strategy: strategy,
            published,
        }
    }

    #[tokio::test]
    async fn test_publishes_only_versions_scheduled_with_release() {
        let release = release();
        let scheduled = methodology(PublishingStrategy::WithRelease(release.id), None);
        let other = methodology(
            PublishingStrategy::WithRelease(ReleaseVersionId::new_v4()),
            None,
        );
        let live = methodology(PublishingStrategy::WithRelease(release.id), Some(Utc::now()));
        let repository = Arc::new(Repository {
            versions: vec![scheduled.clone(), other, live],
            published: Mutex::new(Vec::new()),
        });
        let service = MethodologyPublishingService::new(repository.clone());

        let count = service.publish_for_release(&release, Utc::now()).await.unwrap();

        assert_eq!(count, 1);
        assert_eq!(*repository.published.lock().unwrap(), vec![scheduled.id]);
    }

    #[tokio::test]
    async fn test_no_linked_methodologies_is_noop() {
        let repository = Arc::new(Repository {
            versions: Vec::new(),
            published: Mutex::new(Vec::new()),
        });
        let service = MethodologyPublishingService::new(repository.clone());

        let count = service.publish_for_release(&release(), Utc::now()).await.unwrap();

        assert_eq!(count, 0);
        assert!(repository.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_publish_is_idempotent() {
        let repository = Arc::new(Repository {
            versions: Vec::new(),
            published: Mutex::new(Vec::new()),
        });
        let service = MethodologyPublishingService::new(repository.clone());
        let live = methodology(PublishingStrategy::Immediately, Some(Utc::now()));

        service.publish(&live, Utc::now()).await.unwrap();

        assert!(repository.published.lock().unwrap().is_empty());
    }
}
