//! Subscriber notifications
//!
//! Subscribers hear about a publication once per batch, however many of its
//! release versions go live together. Versions flagged as not notifying
//! subscribers (non-substantive amendments) are left out, and a subscriber
//! already in the ledger for every remaining version is skipped.

use crate::adapters::gateways::traits::{
    NotificationChannel, ReleaseMetadataGateway, SubscriberDirectory,
};
use crate::core::publish::timeout::{with_timeout, DEFAULT_STEP_TIMEOUT};
use crate::domain::ids::{PublicationId, ReleaseVersionId, SubscriberId};
use crate::domain::{ReleaseVersion, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// A release version mentioned in a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifiedRelease {
    pub release_version_id: ReleaseVersionId,
    pub release_slug: String,
    pub release_title: String,
    pub is_amendment: bool,
}

/// One email to one subscriber about one publication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationMessage {
    pub subscriber_id: SubscriberId,
    pub email: String,
    pub publication_id: PublicationId,
    pub publication_slug: String,
    pub publication_title: String,
    pub releases: Vec<NotifiedRelease>,
}

/// Counts from one notification run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationOutcome {
    /// Messages sent
    pub sent: usize,

    /// Subscribers skipped because they were already notified
    pub already_notified: usize,
}

/// Dispatches release notifications to subscribers
pub struct NotificationService {
    metadata: Arc<dyn ReleaseMetadataGateway + Send + Sync>,
    directory: Arc<dyn SubscriberDirectory + Send + Sync>,
    channel: Arc<dyn NotificationChannel + Send + Sync>,
    step_timeout: Duration,
}

impl NotificationService {
    /// Create a new service
    pub fn new(
        metadata: Arc<dyn ReleaseMetadataGateway + Send + Sync>,
        directory: Arc<dyn SubscriberDirectory + Send + Sync>,
        channel: Arc<dyn NotificationChannel + Send + Sync>,
    ) -> Self {
        Self {
            metadata,
            directory,
            channel,
            step_timeout: DEFAULT_STEP_TIMEOUT,
        }
    }

    /// Deadline applied to each call to the metadata store, the subscriber
    /// directory and the notification channel
    pub fn with_step_timeout(mut self, step_timeout: Duration) -> Self {
        self.step_timeout = step_timeout;
        self
    }

    /// Notify subscribers about the given release versions
    ///
    /// Release versions are grouped by publication and each subscriber of a
    /// publication gets at most one message for the whole group.
    pub async fn notify_subscribers_if_applicable(
        &self,
        release_version_ids: &[ReleaseVersionId],
    ) -> Result<NotificationOutcome> {
        let mut groups: Vec<(PublicationId, Vec<ReleaseVersion>)> = Vec::new();

        for id in release_version_ids {
            let release = with_timeout(
                "get_release_version",
                self.step_timeout,
                self.metadata.get_release_version(*id),
            )
            .await?;
            if !release.notify_subscribers {
                tracing::debug!(
                    release_version_id = %release.id,
                    "Release version does not notify subscribers"
                );
                continue;
            }

            match groups
                .iter_mut()
                .find(|(publication_id, _)| *publication_id == release.publication_id)
            {
                Some((_, releases)) => releases.push(release),
                None => groups.push((release.publication_id, vec![release])),
            }
        }

        let mut outcome = NotificationOutcome::default();
        for (publication_id, releases) in groups {
            let group = self.notify_publication(publication_id, &releases).await?;
            outcome.sent += group.sent;
            outcome.already_notified += group.already_notified;
        }

        Ok(outcome)
    }

    async fn notify_publication(
        &self,
        publication_id: PublicationId,
        releases: &[ReleaseVersion],
    ) -> Result<NotificationOutcome> {
        let publication = with_timeout(
            "get_publication",
            self.step_timeout,
            self.metadata.get_publication(publication_id),
        )
        .await?;
        let subscribers = with_timeout(
            "verified_subscribers",
            self.step_timeout,
            self.directory.verified_subscribers(publication_id),
        )
        .await?;

        let mut ledger: Vec<(ReleaseVersionId, HashSet<SubscriberId>)> = Vec::new();
        for release in releases {
            let notified = with_timeout(
                "notified_subscribers",
                self.step_timeout,
                self.directory.notified_subscribers(release.id),
            )
            .await?;
            ledger.push((release.id, notified.into_iter().collect()));
        }

        let mut outcome = NotificationOutcome::default();
        for subscriber in subscribers {
            let pending: Vec<&ReleaseVersion> = releases
                .iter()
                .zip(&ledger)
                .filter(|(_, (_, notified))| !notified.contains(&subscriber.id))
                .map(|(release, _)| release)
                .collect();

            if pending.is_empty() {
                outcome.already_notified += 1;
                continue;
            }

            let message = NotificationMessage {
                subscriber_id: subscriber.id,
                email: subscriber.email.clone(),
                publication_id,
                publication_slug: publication.slug.clone(),
                publication_title: publication.title.clone(),
                releases: pending
                    .iter()
                    .map(|release| NotifiedRelease {
                        release_version_id: release.id,
                        release_slug: release.slug.clone(),
                        release_title: release.title.clone(),
                        is_amendment: release.is_amendment(),
                    })
                    .collect(),
            };

            with_timeout("send", self.step_timeout, self.channel.send(&message)).await?;

            let notified_ids: Vec<ReleaseVersionId> =
                pending.iter().map(|release| release.id).collect();
            with_timeout(
                "record_notified",
                self.step_timeout,
                self.directory.record_notified(subscriber.id, &notified_ids),
            )
            .await?;
            outcome.sent += 1;
        }

        tracing::info!(
            publication_id = %publication_id,
            publication_slug = %publication.slug,
            release_versions = releases.len(),
            sent = outcome.sent,
            already_notified = outcome.already_notified,
            "Notified subscribers"
        );

        Ok(outcome)
    }
}
