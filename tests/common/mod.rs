//! In-memory gateways for orchestrator integration tests
//!
//! Each fake records the calls it receives so tests can assert on what the
//! orchestrator did to the outside world, and exposes switches to make
//! individual calls fail or stall.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use fake::faker::lorem::en::{Sentence, Words};
use fake::Fake;
use release_publisher::adapters::gateways::traits::{
    BlobStorage, DataSetRepository, EventBus, MethodologyRepository, NotificationChannel,
    ReleaseMetadataGateway, SubscriberDirectory,
};
use release_publisher::adapters::gateways::Gateways;
use release_publisher::adapters::memory::InMemoryStatusStorage;
use release_publisher::core::publish::{OrchestratorOptions, PublishingCompletionOrchestrator};
use release_publisher::core::services::events::ReleaseVersionPublishedEvent;
use release_publisher::core::services::notifications::NotificationMessage;
use release_publisher::domain::ids::{
    DataSetId, MethodologyId, MethodologyVersionId, PublicationId, ReleaseId, ReleaseVersionId,
    SubscriberId,
};
use release_publisher::domain::{
    MethodologyStatus, MethodologyVersion, Publication, PublisherError, PublishingStrategy,
    Redirect, ReleaseVersion, Result, Subscriber, TimePeriodCoverage,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

/// Release metadata held in maps
#[derive(Default)]
pub struct FakeMetadata {
    pub publications: Mutex<HashMap<PublicationId, Publication>>,
    pub releases: Mutex<HashMap<ReleaseVersionId, ReleaseVersion>>,
    pub redirects: Mutex<Vec<Redirect>>,
    /// Release versions stamped as published, in call order
    pub stamped: Mutex<Vec<ReleaseVersionId>>,
    /// Latest pointer updates, in call order
    pub latest_updates: Mutex<Vec<(PublicationId, ReleaseVersionId)>>,
    /// Slugs that `find_publication_by_slug` pretends not to know
    pub hidden_slugs: Mutex<HashSet<String>>,
    pub fail_taxonomy: AtomicBool,
}

#[async_trait]
impl ReleaseMetadataGateway for FakeMetadata {
    async fn get_release_version(&self, id: ReleaseVersionId) -> Result<ReleaseVersion> {
        self.releases
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| PublisherError::not_found("Release version", id))
    }

    async fn complete_publishing(
        &self,
        id: ReleaseVersionId,
        published_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut releases = self.releases.lock().unwrap();
        let release = releases
            .get_mut(&id)
            .ok_or_else(|| PublisherError::not_found("Release version", id))?;
        release.published = Some(published_at);
        self.stamped.lock().unwrap().push(id);
        Ok(())
    }

    async fn get_latest_published_release_version(
        &self,
        publication_id: PublicationId,
        exclude: &[ReleaseVersionId],
    ) -> Result<Option<ReleaseVersion>> {
        Ok(self
            .releases
            .lock()
            .unwrap()
            .values()
            .filter(|release| release.publication_id == publication_id)
            .filter(|release| release.is_published() && !exclude.contains(&release.id))
            .max_by(|a, b| a.compare_recency(b))
            .cloned())
    }

    async fn update_latest_published_release_version(
        &self,
        publication_id: PublicationId,
        release_version_id: ReleaseVersionId,
    ) -> Result<()> {
        let mut publications = self.publications.lock().unwrap();
        let publication = publications
            .get_mut(&publication_id)
            .ok_or_else(|| PublisherError::not_found("Publication", publication_id))?;
        publication.latest_published_release_version_id = Some(release_version_id);
        self.latest_updates
            .lock()
            .unwrap()
            .push((publication_id, release_version_id));
        Ok(())
    }

    async fn get_publication(&self, publication_id: PublicationId) -> Result<Publication> {
        self.publications
            .lock()
            .unwrap()
            .get(&publication_id)
            .cloned()
            .ok_or_else(|| PublisherError::not_found("Publication", publication_id))
    }

    async fn find_publication_by_slug(&self, slug: &str) -> Result<Option<Publication>> {
        if self.hidden_slugs.lock().unwrap().contains(slug) {
            return Ok(None);
        }
        Ok(self
            .publications
            .lock()
            .unwrap()
            .values()
            .find(|publication| publication.slug == slug)
            .cloned())
    }

    async fn get_previous_release_versions(
        &self,
        release_version: &ReleaseVersion,
    ) -> Result<Vec<ReleaseVersionId>> {
        Ok(self
            .releases
            .lock()
            .unwrap()
            .values()
            .filter(|release| {
                release.release_id == release_version.release_id
                    && release.id != release_version.id
                    && release.version < release_version.version
            })
            .map(|release| release.id)
            .collect())
    }

    async fn list_published_publications(&self) -> Result<Vec<Publication>> {
        if self.fail_taxonomy.load(Ordering::SeqCst) {
            return Err(PublisherError::Database("publications view unavailable".to_string()));
        }
        Ok(self
            .publications
            .lock()
            .unwrap()
            .values()
            .filter(|publication| publication.latest_published_release_version_id.is_some())
            .cloned()
            .collect())
    }

    async fn list_redirects(&self) -> Result<Vec<Redirect>> {
        Ok(self.redirects.lock().unwrap().clone())
    }
}

/// Data sets per release version
#[derive(Default)]
pub struct FakeDataSets {
    pub by_release: Mutex<HashMap<ReleaseVersionId, Vec<DataSetId>>>,
    pub promoted: Mutex<Vec<DataSetId>>,
    pub failing: Mutex<HashSet<DataSetId>>,
    /// Delay applied to every promotion
    pub delay: Mutex<Option<Duration>>,
}

#[async_trait]
impl DataSetRepository for FakeDataSets {
    async fn data_set_ids_for_release(
        &self,
        release_version_id: ReleaseVersionId,
    ) -> Result<Vec<DataSetId>> {
        Ok(self
            .by_release
            .lock()
            .unwrap()
            .get(&release_version_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn promote_staged_version(
        &self,
        data_set_id: DataSetId,
        _published_at: DateTime<Utc>,
    ) -> Result<()> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().unwrap().contains(&data_set_id) {
            return Err(PublisherError::Database(format!(
                "no staged version for data set {data_set_id}"
            )));
        }
        self.promoted.lock().unwrap().push(data_set_id);
        Ok(())
    }
}

/// Methodology versions
#[derive(Default)]
pub struct FakeMethodologies {
    pub versions: Mutex<Vec<MethodologyVersion>>,
    pub published: Mutex<Vec<MethodologyVersionId>>,
}

#[async_trait]
impl MethodologyRepository for FakeMethodologies {
    async fn latest_versions_for_publication(
        &self,
        publication_id: PublicationId,
    ) -> Result<Vec<MethodologyVersion>> {
        Ok(self
            .versions
            .lock()
            .unwrap()
            .iter()
            .filter(|version| version.owning_publication_id == publication_id)
            .cloned()
            .collect())
    }

    async fn mark_published(
        &self,
        id: MethodologyVersionId,
        published_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut versions = self.versions.lock().unwrap();
        if let Some(version) = versions.iter_mut().find(|version| version.id == id) {
            version.published = Some(published_at);
        }
        self.published.lock().unwrap().push(id);
        Ok(())
    }
}

/// Subscribers and the notification ledger
#[derive(Default)]
pub struct FakeSubscribers {
    pub subscribers: Mutex<Vec<Subscriber>>,
    pub ledger: Mutex<HashMap<ReleaseVersionId, HashSet<SubscriberId>>>,
}

#[async_trait]
impl SubscriberDirectory for FakeSubscribers {
    async fn verified_subscribers(&self, publication_id: PublicationId) -> Result<Vec<Subscriber>> {
        Ok(self
            .subscribers
            .lock()
            .unwrap()
            .iter()
            .filter(|subscriber| subscriber.publication_id == publication_id)
            .cloned()
            .collect())
    }

    async fn notified_subscribers(
        &self,
        release_version_id: ReleaseVersionId,
    ) -> Result<Vec<SubscriberId>> {
        Ok(self
            .ledger
            .lock()
            .unwrap()
            .get(&release_version_id)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn record_notified(
        &self,
        subscriber_id: SubscriberId,
        release_version_ids: &[ReleaseVersionId],
    ) -> Result<()> {
        let mut ledger = self.ledger.lock().unwrap();
        for id in release_version_ids {
            ledger.entry(*id).or_default().insert(subscriber_id);
        }
        Ok(())
    }
}

/// Blob writes and deletes
#[derive(Default)]
pub struct FakeBlobStorage {
    pub uploads: Mutex<Vec<(String, String, serde_json::Value)>>,
    pub deleted_prefixes: Mutex<Vec<(String, String)>>,
}

impl FakeBlobStorage {
    pub fn uploaded_paths(&self) -> Vec<String> {
        self.uploads
            .lock()
            .unwrap()
            .iter()
            .map(|(_, path, _)| path.clone())
            .collect()
    }
}

#[async_trait]
impl BlobStorage for FakeBlobStorage {
    async fn upload_json(
        &self,
        container: &str,
        path: &str,
        content: &serde_json::Value,
    ) -> Result<()> {
        self.uploads
            .lock()
            .unwrap()
            .push((container.to_string(), path.to_string(), content.clone()));
        Ok(())
    }

    async fn delete_prefix(&self, container: &str, prefix: &str) -> Result<usize> {
        self.deleted_prefixes
            .lock()
            .unwrap()
            .push((container.to_string(), prefix.to_string()));
        Ok(1)
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<NotificationMessage>>,
    /// Delay applied to every send
    pub delay: Mutex<Option<Duration>>,
}

#[async_trait]
impl NotificationChannel for RecordingNotifier {
    async fn send(&self, message: &NotificationMessage) -> Result<()> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingEventBus {
    pub batches: Mutex<Vec<Vec<ReleaseVersionPublishedEvent>>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl EventBus for RecordingEventBus {
    async fn publish_batch(&self, events: &[ReleaseVersionPublishedEvent]) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PublisherError::EventBus("topic unavailable".to_string()));
        }
        self.batches.lock().unwrap().push(events.to_vec());
        Ok(())
    }
}

/// Every fake, wired together
#[derive(Default)]
pub struct World {
    pub statuses: Arc<InMemoryStatusStorage>,
    pub metadata: Arc<FakeMetadata>,
    pub data_sets: Arc<FakeDataSets>,
    pub methodologies: Arc<FakeMethodologies>,
    pub subscribers: Arc<FakeSubscribers>,
    pub blobs: Arc<FakeBlobStorage>,
    pub notifier: Arc<RecordingNotifier>,
    pub events: Arc<RecordingEventBus>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gateways(&self) -> Gateways {
        Gateways {
            status_storage: self.statuses.clone(),
            metadata: self.metadata.clone(),
            data_sets: self.data_sets.clone(),
            methodologies: self.methodologies.clone(),
            subscribers: self.subscribers.clone(),
            blob_storage: self.blobs.clone(),
            notifications: self.notifier.clone(),
            event_bus: self.events.clone(),
        }
    }

    pub fn options() -> OrchestratorOptions {
        OrchestratorOptions {
            step_timeout: Duration::from_secs(2),
            ..OrchestratorOptions::default()
        }
    }

    pub fn orchestrator(&self) -> PublishingCompletionOrchestrator {
        let (_tx, rx) = watch::channel(false);
        self.orchestrator_with(Self::options(), rx)
    }

    pub fn orchestrator_with(
        &self,
        options: OrchestratorOptions,
        shutdown: watch::Receiver<bool>,
    ) -> PublishingCompletionOrchestrator {
        PublishingCompletionOrchestrator::new(&self.gateways(), options, shutdown)
    }

    pub fn add_publication(&self, slug: &str) -> PublicationId {
        let id = PublicationId::new_v4();
        let title: String = Sentence(3..6).fake();
        let summary: Vec<String> = Words(5..10).fake();
        self.metadata.publications.lock().unwrap().insert(
            id,
            Publication {
                id,
                slug: slug.to_string(),
                title,
                summary: summary.join(" "),
                latest_published_release_version_id: None,
            },
        );
        id
    }

    /// An approved, unpublished release version
    pub fn add_release(
        &self,
        publication_id: PublicationId,
        year: i32,
        coverage: TimePeriodCoverage,
    ) -> ReleaseVersion {
        let release = ReleaseVersion::builder(
            ReleaseVersionId::new_v4(),
            ReleaseId::new_v4(),
            publication_id,
        )
        .period(year, coverage)
        .created(Utc::now() - ChronoDuration::days(1))
        .build();
        self.put_release(release.clone());
        release
    }

    /// A release version that is already live and the publication's latest
    pub fn add_published_release(
        &self,
        publication_id: PublicationId,
        year: i32,
        coverage: TimePeriodCoverage,
    ) -> ReleaseVersion {
        let release = ReleaseVersion::builder(
            ReleaseVersionId::new_v4(),
            ReleaseId::new_v4(),
            publication_id,
        )
        .period(year, coverage)
        .created(Utc::now() - ChronoDuration::days(30))
        .published(Utc::now() - ChronoDuration::days(29))
        .build();
        self.put_release(release.clone());
        if let Some(publication) = self
            .metadata
            .publications
            .lock()
            .unwrap()
            .get_mut(&publication_id)
        {
            publication.latest_published_release_version_id = Some(release.id);
        }
        release
    }

    pub fn put_release(&self, release: ReleaseVersion) {
        self.metadata
            .releases
            .lock()
            .unwrap()
            .insert(release.id, release);
    }

    pub fn add_data_sets(&self, release_version_id: ReleaseVersionId, count: usize) -> Vec<DataSetId> {
        let ids: Vec<DataSetId> = (0..count).map(|_| DataSetId::new_v4()).collect();
        self.data_sets
            .by_release
            .lock()
            .unwrap()
            .insert(release_version_id, ids.clone());
        ids
    }

    pub fn add_subscriber(&self, publication_id: PublicationId) -> SubscriberId {
        let id = SubscriberId::new_v4();
        self.subscribers.subscribers.lock().unwrap().push(Subscriber {
            id,
            publication_id,
            email: format!("{id}@example.com"),
        });
        id
    }

    pub fn add_methodology(
        &self,
        publication_id: PublicationId,
        strategy: PublishingStrategy,
    ) -> MethodologyVersionId {
        let id = MethodologyVersionId::new_v4();
        let title: String = Sentence(2..4).fake();
        self.methodologies
            .versions
            .lock()
            .unwrap()
            .push(MethodologyVersion {
                id,
                methodology_id: MethodologyId::new_v4(),
                owning_publication_id: publication_id,
                slug: format!("methodology-{id}"),
                title,
                version: 0,
                status: MethodologyStatus::Approved,
                publishing_strategy: strategy,
                published: None,
            });
        id
    }

    pub fn publication(&self, publication_id: PublicationId) -> Publication {
        self.metadata.publications.lock().unwrap()[&publication_id].clone()
    }

    pub fn event_batches(&self) -> Vec<Vec<ReleaseVersionPublishedEvent>> {
        self.events.batches.lock().unwrap().clone()
    }

    pub fn notifications(&self) -> Vec<NotificationMessage> {
        self.notifier.sent.lock().unwrap().clone()
    }
}
