//! Publishing completion orchestrator
//!
//! Drives a batch of release versions from `Started` to a terminal state:
//!
//! 1. Sequentially, per release: skip if already complete, supersede stale
//!    attempts, record `Started`, load metadata and stamp it published.
//! 2. Per publication: resolve the latest published release version with
//!    every batch version of that publication in view.
//! 3. Fan out per release (bounded): data sets, methodologies, superseded
//!    artifacts.
//! 4. After a barrier: taxonomy and cache refresh, one notification call per
//!    publication, one event call for the whole batch.
//!
//! A failing release is recorded `Failed` at the step that broke and drops
//! out of every later step; the rest of the batch carries on.

use crate::adapters::gateways::traits::ReleaseMetadataGateway;
use crate::adapters::gateways::Gateways;
use crate::config::PublisherConfig;
use crate::core::publish::latest::{decide, latest_in_batch, LatestDecision};
use crate::core::publish::summary::{CompletionSummary, ReleaseOutcome};
use crate::core::publish::timeout::{with_timeout, DEFAULT_STEP_TIMEOUT};
use crate::core::services::{
    CacheInvalidationService, ContentArtifactService, ContentContainers,
    DataSetPublishingService, EventRaiserService, MethodologyPublishingService,
    NotificationService,
};
use crate::core::state::{OverallStage, PipelineStage, PublishingStatusStore, PublishingStep};
use crate::domain::ids::{PublicationId, ReleasePublishingKey, ReleaseVersionId};
use crate::domain::{PublishedReleaseVersionInfo, PublisherError, ReleaseVersion, Result};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Input to one orchestrator run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    /// Release versions to publish, in the order events should be raised
    pub release_version_ids: Vec<ReleaseVersionId>,

    /// Attempt keys chosen by the caller; release versions without one get
    /// a fresh attempt id
    #[serde(default)]
    pub attempts: Vec<ReleasePublishingKey>,
}

impl PublishRequest {
    /// Request for the given release versions
    pub fn new(release_version_ids: Vec<ReleaseVersionId>) -> Self {
        Self {
            release_version_ids,
            attempts: Vec::new(),
        }
    }

    /// Use the given attempt keys
    pub fn with_attempts(mut self, attempts: Vec<ReleasePublishingKey>) -> Self {
        self.attempts = attempts;
        self
    }

    /// Attempt key for a release version
    pub fn key_for(&self, release_version_id: ReleaseVersionId) -> ReleasePublishingKey {
        self.attempts
            .iter()
            .find(|key| key.release_version_id == release_version_id)
            .copied()
            .unwrap_or_else(|| ReleasePublishingKey::new_attempt(release_version_id))
    }

    /// Release version ids with duplicates removed, first occurrence kept
    pub fn distinct_ids(&self) -> Vec<ReleaseVersionId> {
        let mut ids: Vec<ReleaseVersionId> = Vec::with_capacity(self.release_version_ids.len());
        for id in &self.release_version_ids {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        ids
    }
}

/// Tuning for the orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    /// Releases processed at once during fan-out
    pub max_concurrent_releases: usize,

    /// Deadline for each external call
    pub step_timeout: Duration,

    /// Object storage containers
    pub containers: ContentContainers,

    /// `dataVersion` stamped on raised events
    pub event_data_version: String,
}

impl OrchestratorOptions {
    /// Options from the loaded configuration
    pub fn from_config(config: &PublisherConfig) -> Self {
        Self {
            max_concurrent_releases: config.publisher.max_concurrent_releases,
            step_timeout: Duration::from_secs(config.publisher.step_timeout_seconds),
            containers: ContentContainers {
                content: config.storage.public_content_container.clone(),
                release_files: config.storage.public_release_files_container.clone(),
            },
            event_data_version: config.event_bus.data_version.clone(),
        }
    }
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            max_concurrent_releases: 4,
            step_timeout: DEFAULT_STEP_TIMEOUT,
            containers: ContentContainers {
                content: "cache".to_string(),
                release_files: "downloads".to_string(),
            },
            event_data_version: "1.0".to_string(),
        }
    }
}

/// A release that has been stamped published
struct Stamped {
    position: usize,
    key: ReleasePublishingKey,
    release: ReleaseVersion,
    published_at: DateTime<Utc>,
}

/// A release still in the batch after latest-version resolution
struct ReleaseRun {
    position: usize,
    key: ReleasePublishingKey,
    release: ReleaseVersion,
    published_at: DateTime<Utc>,
    info: PublishedReleaseVersionInfo,
    warnings: Vec<String>,
}

enum Start {
    Stamped(Stamped),
    Skipped,
    Failed(ReleaseOutcome),
}

/// Orchestrates the completion of a publishing batch
pub struct PublishingCompletionOrchestrator {
    status: PublishingStatusStore,
    metadata: Arc<dyn ReleaseMetadataGateway + Send + Sync>,
    data_sets: DataSetPublishingService,
    methodologies: MethodologyPublishingService,
    content: ContentArtifactService,
    cache: CacheInvalidationService,
    notifications: NotificationService,
    events: EventRaiserService,
    options: OrchestratorOptions,
    shutdown: watch::Receiver<bool>,
}

impl PublishingCompletionOrchestrator {
    /// Wire the orchestrator and its services over a set of gateways
    pub fn new(
        gateways: &Gateways,
        options: OrchestratorOptions,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            status: PublishingStatusStore::new_with_storage(gateways.status_storage.clone()),
            metadata: gateways.metadata.clone(),
            data_sets: DataSetPublishingService::new(gateways.data_sets.clone())
                .with_step_timeout(options.step_timeout),
            methodologies: MethodologyPublishingService::new(gateways.methodologies.clone())
                .with_step_timeout(options.step_timeout),
            content: ContentArtifactService::new(
                gateways.blob_storage.clone(),
                gateways.metadata.clone(),
                options.containers.clone(),
            )
            .with_step_timeout(options.step_timeout),
            cache: CacheInvalidationService::new(
                gateways.blob_storage.clone(),
                gateways.metadata.clone(),
                options.containers.content.clone(),
            )
            .with_step_timeout(options.step_timeout),
            notifications: NotificationService::new(
                gateways.metadata.clone(),
                gateways.subscribers.clone(),
                gateways.notifications.clone(),
            )
            .with_step_timeout(options.step_timeout),
            events: EventRaiserService::new(
                gateways.event_bus.clone(),
                options.event_data_version.clone(),
            ),
            options,
            shutdown,
        }
    }

    /// Publish a batch of release versions
    ///
    /// # Returns
    ///
    /// A summary with one outcome per distinct release version, in input
    /// order. Partial failure is reported through the summary.
    ///
    /// # Errors
    ///
    /// Returns [`PublisherError::AllReleasesFailed`] when every release
    /// version in the batch failed.
    pub async fn complete_publishing(&self, request: PublishRequest) -> Result<CompletionSummary> {
        let start_time = Instant::now();
        let ids = request.distinct_ids();
        let mut outcomes: Vec<ReleaseOutcome> = Vec::with_capacity(ids.len());
        let mut batch_warnings: Vec<String> = Vec::new();

        tracing::info!(
            release_versions = ids.len(),
            max_concurrent = self.options.max_concurrent_releases,
            "Starting publishing completion"
        );

        // Stamp each release in turn
        let mut stamped: Vec<Stamped> = Vec::new();
        for (position, id) in ids.iter().enumerate() {
            if self.is_cancelled() {
                tracing::warn!(release_version_id = %id, "Shutdown requested, release not started");
                outcomes.push(ReleaseOutcome::not_started(*id));
                continue;
            }

            match self.start_release(position, request.key_for(*id)).await {
                Start::Stamped(release) => stamped.push(release),
                Start::Skipped => outcomes.push(ReleaseOutcome::skipped(*id)),
                Start::Failed(outcome) => outcomes.push(outcome),
            }
        }

        // Latest version per publication, with the whole batch in view
        let mut runs: Vec<ReleaseRun> = Vec::new();
        for (_, group) in group_by_publication(stamped, |s| s.release.publication_id) {
            let resolved = self.resolve_latest(&group).await;
            for release in group {
                let info = match &resolved {
                    Ok(infos) => infos
                        .iter()
                        .find(|info| info.release_version_id == release.release.id)
                        .cloned(),
                    Err(e) => {
                        outcomes.push(
                            self.fail(release.key, PublishingStep::ResolveLatestVersion, e, Vec::new())
                                .await,
                        );
                        continue;
                    }
                };

                let Some(info) = info else {
                    let e = PublisherError::not_found("Published release version info", release.key);
                    outcomes.push(
                        self.fail(release.key, PublishingStep::ResolveLatestVersion, &e, Vec::new())
                            .await,
                    );
                    continue;
                };

                let recorded = self
                    .timed(
                        "update_stage",
                        self.status
                            .update_stage(&release.key, PipelineStage::ContentPublished, None),
                    )
                    .await;
                match recorded {
                    Ok(_) => runs.push(ReleaseRun {
                        position: release.position,
                        key: release.key,
                        release: release.release,
                        published_at: release.published_at,
                        info,
                        warnings: Vec::new(),
                    }),
                    Err(e) => outcomes.push(
                        self.fail(release.key, PublishingStep::ResolveLatestVersion, &e, Vec::new())
                            .await,
                    ),
                }
            }
        }

        // Per-release fan-out, joined before any batch-level step
        let results: Vec<std::result::Result<ReleaseRun, ReleaseOutcome>> = stream::iter(runs)
            .map(|run| self.publish_release(run))
            .buffer_unordered(self.options.max_concurrent_releases.max(1))
            .collect()
            .await;

        let mut survivors: Vec<ReleaseRun> = Vec::new();
        for result in results {
            match result {
                Ok(run) => survivors.push(run),
                Err(outcome) => outcomes.push(outcome),
            }
        }
        survivors.sort_by_key(|run| run.position);

        if !survivors.is_empty() {
            self.refresh_cache(&mut survivors, &mut batch_warnings, &mut outcomes)
                .await;
        }
        if !survivors.is_empty() {
            survivors = self.notify_subscribers(survivors, &mut outcomes).await;
        }
        if !survivors.is_empty() {
            self.raise_events(survivors, &mut outcomes).await;
        }

        let summary = CompletionSummary::new(outcomes, &ids, batch_warnings, start_time.elapsed());

        if summary.all_failed() {
            summary.log_summary();
            return Err(PublisherError::AllReleasesFailed {
                count: summary.failed_count(),
            });
        }

        Ok(summary)
    }

    /// Record `Started`, load and stamp one release
    async fn start_release(&self, position: usize, key: ReleasePublishingKey) -> Start {
        let id = key.release_version_id;

        let completed = match self
            .timed(
                "get_all_by_overall_stage",
                self.status
                    .get_all_by_overall_stage(id, &[OverallStage::Complete]),
            )
            .await
        {
            Ok(completed) => completed,
            Err(e) => {
                crate::log_release_failed!(key, PublishingStep::LoadMetadata, e);
                return Start::Failed(ReleaseOutcome::failed(
                    id,
                    None,
                    PublishingStep::LoadMetadata,
                    e.to_string(),
                    Vec::new(),
                ));
            }
        };

        if let Some(done) = completed.first() {
            tracing::info!(
                release_version_id = %id,
                attempt_id = %done.key.attempt_id,
                "Release version already published, skipping"
            );
            return Start::Skipped;
        }

        self.supersede_stale_attempts(&key).await;

        if let Err(e) = self
            .timed(
                "create",
                self.status
                    .create(key, Some("Publishing completion started".to_string())),
            )
            .await
        {
            crate::log_release_failed!(key, PublishingStep::LoadMetadata, e);
            return Start::Failed(ReleaseOutcome::failed(
                id,
                None,
                PublishingStep::LoadMetadata,
                e.to_string(),
                Vec::new(),
            ));
        }

        let mut release = match self
            .timed("get_release_version", self.metadata.get_release_version(id))
            .await
        {
            Ok(release) => release,
            Err(e) => {
                return Start::Failed(
                    self.fail(key, PublishingStep::LoadMetadata, &e, Vec::new())
                        .await,
                )
            }
        };

        let published_at = Utc::now();
        if let Err(e) = self
            .timed(
                "complete_publishing",
                self.metadata.complete_publishing(id, published_at),
            )
            .await
        {
            return Start::Failed(
                self.fail(key, PublishingStep::StampPublished, &e, Vec::new())
                    .await,
            );
        }
        release.published = Some(published_at);

        tracing::debug!(
            release_version_id = %id,
            published_at = %published_at,
            "Stamped release version as published"
        );

        Start::Stamped(Stamped {
            position,
            key,
            release,
            published_at,
        })
    }

    /// Mark older unfinished attempts of the same release version `Superseded`
    async fn supersede_stale_attempts(&self, key: &ReleasePublishingKey) {
        let stale = match self
            .timed(
                "get_all_by_overall_stage",
                self.status
                    .get_all_by_overall_stage(key.release_version_id, &OverallStage::in_progress()),
            )
            .await
        {
            Ok(stale) => stale,
            Err(e) => {
                tracing::warn!(
                    release_version_id = %key.release_version_id,
                    error = %e,
                    "Could not look up earlier attempts"
                );
                return;
            }
        };

        for status in stale.iter().filter(|status| status.key != *key) {
            if let Err(e) = self
                .timed("mark_superseded", self.status.mark_superseded(&status.key, key))
                .await
            {
                tracing::warn!(
                    release_version_id = %key.release_version_id,
                    attempt_id = %status.key.attempt_id,
                    error = %e,
                    "Could not supersede earlier attempt"
                );
            }
        }
    }

    /// Settle the latest published release version of one publication
    async fn resolve_latest(&self, group: &[Stamped]) -> Result<Vec<PublishedReleaseVersionInfo>> {
        let Some(first) = group.first() else {
            return Ok(Vec::new());
        };
        let publication_id = first.release.publication_id;

        let publication = self
            .timed("get_publication", self.metadata.get_publication(publication_id))
            .await?;

        let batch: Vec<&ReleaseVersion> = group.iter().map(|s| &s.release).collect();
        let exclude: Vec<ReleaseVersionId> = batch.iter().map(|release| release.id).collect();
        let Some(candidate) = latest_in_batch(&batch) else {
            return Ok(Vec::new());
        };

        let existing = self
            .timed(
                "get_latest_published_release_version",
                self.metadata
                    .get_latest_published_release_version(publication_id, &exclude),
            )
            .await?;

        let decision = decide(candidate, existing.as_ref());
        if let LatestDecision::Promote(latest_id) = decision {
            self.timed(
                "update_latest_published_release_version",
                self.metadata
                    .update_latest_published_release_version(publication_id, latest_id),
            )
            .await?;
        }

        let latest_id = decision.latest_id();
        tracing::info!(
            publication = %publication.slug,
            latest_release_version_id = %latest_id,
            promoted = matches!(decision, LatestDecision::Promote(_)),
            "Resolved latest published release version"
        );

        Ok(batch
            .iter()
            .map(|release| PublishedReleaseVersionInfo {
                release_version_id: release.id,
                release_id: release.release_id,
                release_slug: release.slug.clone(),
                publication_id,
                publication_slug: publication.slug.clone(),
                publication_title: publication.title.clone(),
                publication_latest_published_release_version_id: Some(latest_id),
                is_amendment: release.is_amendment(),
                is_latest_version: release.id == latest_id,
            })
            .collect())
    }

    /// Data sets, methodologies and superseded artifacts for one release
    async fn publish_release(
        &self,
        run: ReleaseRun,
    ) -> std::result::Result<ReleaseRun, ReleaseOutcome> {
        let id = run.key.release_version_id;

        let data_published = async {
            let data_set_ids = self.data_sets.data_set_ids_for_release(id).await?;
            self.data_sets
                .publish_data_sets(&data_set_ids, run.published_at)
                .await?;
            self.timed(
                "update_stage",
                self.status.update_stage(
                    &run.key,
                    PipelineStage::DataPublished,
                    Some(format!("Published {} data set(s)", data_set_ids.len())),
                ),
            )
            .await
        }
        .await;
        if let Err(e) = data_published {
            return Err(self
                .fail(run.key, PublishingStep::PublishDataSets, &e, run.warnings)
                .await);
        }

        let methodologies_published = async {
            let published = self
                .methodologies
                .publish_for_release(&run.release, run.published_at)
                .await?;
            self.timed(
                "update_stage",
                self.status.update_stage(
                    &run.key,
                    PipelineStage::MethodologyPublished,
                    Some(format!("Published {published} methodology version(s)")),
                ),
            )
            .await
        }
        .await;
        if let Err(e) = methodologies_published {
            return Err(self
                .fail(run.key, PublishingStep::PublishMethodologies, &e, run.warnings)
                .await);
        }

        let removed = self.content.remove_superseded_artifacts(&run.release).await;
        match removed {
            Ok(deleted) => {
                tracing::debug!(
                    release_version_id = %id,
                    deleted,
                    "Removed superseded artifacts"
                );
                Ok(run)
            }
            Err(e) => Err(self
                .fail(run.key, PublishingStep::RemoveSupersededArtifacts, &e, run.warnings)
                .await),
        }
    }

    /// Taxonomy, publication cache and redirects
    ///
    /// Failures here are warnings. Only a failed status write removes a
    /// release from the batch.
    async fn refresh_cache(
        &self,
        survivors: &mut Vec<ReleaseRun>,
        batch_warnings: &mut Vec<String>,
        outcomes: &mut Vec<ReleaseOutcome>,
    ) {
        if let Err(e) = self.content.refresh_taxonomy().await {
            let message = format!("Taxonomy refresh failed: {e}");
            self.warn_all(survivors, PublishingStep::RefreshTaxonomy, &message)
                .await;
            batch_warnings.push(message);
        }

        let mut slugs: Vec<String> = Vec::new();
        for run in survivors.iter() {
            if !slugs.contains(&run.info.publication_slug) {
                slugs.push(run.info.publication_slug.clone());
            }
        }

        for slug in &slugs {
            if let Err(e) = self.cache.update_publication(slug).await {
                let message = format!("Cache update for publication {slug} failed: {e}");
                for run in survivors
                    .iter_mut()
                    .filter(|run| run.info.publication_slug == *slug)
                {
                    self.warn(&run.key, PublishingStep::UpdateCache, &message)
                        .await;
                    run.warnings.push(message.clone());
                }
            }
        }

        if let Err(e) = self.cache.update_redirects().await {
            let message = format!("Redirects update failed: {e}");
            self.warn_all(survivors, PublishingStep::UpdateCache, &message)
                .await;
            batch_warnings.push(message);
        }

        let mut cached = Vec::with_capacity(survivors.len());
        for run in survivors.drain(..) {
            let recorded = self
                .timed(
                    "update_stage",
                    self.status
                        .update_stage(&run.key, PipelineStage::CachePublished, None),
                )
                .await;
            match recorded {
                Ok(_) => cached.push(run),
                Err(e) => outcomes.push(
                    self.fail(run.key, PublishingStep::UpdateCache, &e, run.warnings)
                        .await,
                ),
            }
        }
        *survivors = cached;
    }

    /// One notification call per publication
    async fn notify_subscribers(
        &self,
        survivors: Vec<ReleaseRun>,
        outcomes: &mut Vec<ReleaseOutcome>,
    ) -> Vec<ReleaseRun> {
        let mut notified = Vec::with_capacity(survivors.len());

        let groups = group_by_publication(survivors, |run| run.info.publication_id);
        for (publication_id, group) in groups {
            let ids: Vec<ReleaseVersionId> =
                group.iter().map(|run| run.key.release_version_id).collect();

            let sent = self.notifications.notify_subscribers_if_applicable(&ids).await;
            match sent {
                Ok(outcome) => {
                    tracing::info!(
                        publication_id = %publication_id,
                        release_versions = ids.len(),
                        sent = outcome.sent,
                        already_notified = outcome.already_notified,
                        "Notified subscribers"
                    );
                    for run in group {
                        let recorded = self
                            .timed(
                                "update_stage",
                                self.status.update_stage(
                                    &run.key,
                                    PipelineStage::NotificationsSent,
                                    None,
                                ),
                            )
                            .await;
                        match recorded {
                            Ok(_) => notified.push(run),
                            Err(e) => outcomes.push(
                                self.fail(run.key, PublishingStep::NotifySubscribers, &e, run.warnings)
                                    .await,
                            ),
                        }
                    }
                }
                Err(e) => {
                    for run in group {
                        outcomes.push(
                            self.fail(run.key, PublishingStep::NotifySubscribers, &e, run.warnings)
                                .await,
                        );
                    }
                }
            }
        }

        notified.sort_by_key(|run| run.position);
        notified
    }

    /// One event call for every release still in the batch, then `Complete`
    async fn raise_events(&self, survivors: Vec<ReleaseRun>, outcomes: &mut Vec<ReleaseOutcome>) {
        let infos: Vec<PublishedReleaseVersionInfo> =
            survivors.iter().map(|run| run.info.clone()).collect();

        if let Err(e) = self
            .timed(
                "raise_release_version_published_events",
                self.events.raise_release_version_published_events(&infos),
            )
            .await
        {
            for run in survivors {
                outcomes.push(
                    self.fail(run.key, PublishingStep::RaiseEvents, &e, run.warnings)
                        .await,
                );
            }
            return;
        }

        for run in survivors {
            let completed = async {
                self.timed(
                    "update_stage",
                    self.status
                        .update_stage(&run.key, PipelineStage::EventsRaised, None),
                )
                .await?;
                self.timed("mark_complete", self.status.mark_complete(&run.key))
                    .await
            }
            .await;

            match completed {
                Ok(_) => {
                    tracing::info!(
                        release_version_id = %run.key.release_version_id,
                        attempt_id = %run.key.attempt_id,
                        warnings = run.warnings.len(),
                        "Release version published"
                    );
                    outcomes.push(ReleaseOutcome::complete(run.key, run.warnings));
                }
                Err(e) => outcomes.push(
                    self.fail(run.key, PublishingStep::RaiseEvents, &e, run.warnings)
                        .await,
                ),
            }
        }
    }

    /// Record a failure and build the outcome
    ///
    /// A failure to write the failure itself is logged; the outcome still
    /// reports the original error.
    async fn fail(
        &self,
        key: ReleasePublishingKey,
        step: PublishingStep,
        error: &PublisherError,
        warnings: Vec<String>,
    ) -> ReleaseOutcome {
        crate::log_release_failed!(key, step, error);
        let message = error.to_string();

        if let Err(e) = self
            .timed(
                "record_failure",
                self.status.record_failure(&key, step, message.clone()),
            )
            .await
        {
            tracing::error!(
                release_version_id = %key.release_version_id,
                attempt_id = %key.attempt_id,
                error = %e,
                "Failed to record publishing failure"
            );
        }

        ReleaseOutcome::failed(
            key.release_version_id,
            Some(key.attempt_id),
            step,
            message,
            warnings,
        )
    }

    async fn warn(&self, key: &ReleasePublishingKey, step: PublishingStep, message: &str) {
        crate::log_step_warning!(key, step, message);
        if let Err(e) = self
            .timed("record_warning", self.status.record_warning(key, message))
            .await
        {
            tracing::warn!(
                release_version_id = %key.release_version_id,
                error = %e,
                "Failed to record warning"
            );
        }
    }

    async fn warn_all(&self, runs: &[ReleaseRun], step: PublishingStep, message: &str) {
        for run in runs {
            self.warn(&run.key, step, message).await;
        }
    }

    async fn timed<T>(
        &self,
        operation: &'static str,
        future: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        with_timeout(operation, self.options.step_timeout, future).await
    }

    fn is_cancelled(&self) -> bool {
        *self.shutdown.borrow()
    }
}

/// Group items by publication, keeping first-appearance order of groups
/// and input order within each group
fn group_by_publication<T>(
    items: Vec<T>,
    publication_of: impl Fn(&T) -> PublicationId,
) -> Vec<(PublicationId, Vec<T>)> {
    let mut groups: Vec<(PublicationId, Vec<T>)> = Vec::new();
    for item in items {
        let publication_id = publication_of(&item);
        match groups.iter_mut().find(|(id, _)| *id == publication_id) {
            Some((_, group)) => group.push(item),
            None => groups.push((publication_id, vec![item])),
        }
    }
    groups
}
