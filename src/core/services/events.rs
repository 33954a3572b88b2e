//! Release version published events
//!
//! One event per release version, sent to the event bus in a single batch.
//! The envelope follows the Event Grid schema so the topic can fan the
//! batch out to subscribers (search indexing, analytics) on its own.

use crate::adapters::gateways::traits::EventBus;
use crate::domain::ids::{PublicationId, ReleaseId, ReleaseVersionId};
use crate::domain::{PublishedReleaseVersionInfo, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Event type of every event raised here
pub const RELEASE_VERSION_PUBLISHED: &str = "ReleaseVersionPublished";

/// Payload of a [`ReleaseVersionPublishedEvent`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseVersionPublishedEventData {
    pub release_id: ReleaseId,
    pub release_slug: String,
    pub publication_id: PublicationId,
    pub publication_slug: String,
    pub publication_latest_published_release_version_id: Option<ReleaseVersionId>,
    pub is_latest_published_release_version: bool,
}

/// Event envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseVersionPublishedEvent {
    pub id: Uuid,
    pub event_type: String,
    pub subject: String,
    pub data: ReleaseVersionPublishedEventData,
    pub event_time: DateTime<Utc>,
    pub data_version: String,
}

impl ReleaseVersionPublishedEvent {
    /// Build the event for one published release version
    pub fn from_info(
        info: &PublishedReleaseVersionInfo,
        event_time: DateTime<Utc>,
        data_version: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type: RELEASE_VERSION_PUBLISHED.to_string(),
            subject: info.release_version_id.to_string(),
            data: ReleaseVersionPublishedEventData {
                release_id: info.release_id,
                release_slug: info.release_slug.clone(),
                publication_id: info.publication_id,
                publication_slug: info.publication_slug.clone(),
                publication_latest_published_release_version_id: info
                    .publication_latest_published_release_version_id,
                is_latest_published_release_version: info.is_latest_version,
            },
            event_time,
            data_version: data_version.to_string(),
        }
    }
}

/// Raises "release version published" events
pub struct EventRaiserService {
    bus: Arc<dyn EventBus + Send + Sync>,
    data_version: String,
}

impl EventRaiserService {
    /// Create a new service
    pub fn new(bus: Arc<dyn EventBus + Send + Sync>, data_version: impl Into<String>) -> Self {
        Self {
            bus,
            data_version: data_version.into(),
        }
    }

    /// Publish one event per entry in `infos`, in input order, in one call
    ///
    /// An empty list makes no call.
    ///
    /// # Returns
    ///
    /// Number of events published.
    pub async fn raise_release_version_published_events(
        &self,
        infos: &[PublishedReleaseVersionInfo],
    ) -> Result<usize> {
        if infos.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        let events: Vec<ReleaseVersionPublishedEvent> = infos
            .iter()
            .map(|info| ReleaseVersionPublishedEvent::from_info(info, now, &self.data_version))
            .collect();

        self.bus.publish_batch(&events).await?;

        tracing::info!(events = events.len(), "Raised release version published events");
        Ok(events.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingBus {
        batches: Mutex<Vec<Vec<ReleaseVersionPublishedEvent>>>,
    }

    #[async_trait]
    impl EventBus for RecordingBus {
        async fn publish_batch(&self, events: &[ReleaseVersionPublishedEvent]) -> Result<()> {
            self.batches.lock().unwrap().push(events.to_vec());
            Ok(())
        }
    }

    fn info(slug: &str) -> PublishedReleaseVersionInfo {
        let release_version_id = ReleaseVersionId::new_v4();
        PublishedReleaseVersionInfo {
            release_version_id,
            release_id: ReleaseId::new_v4(),
            release_slug: slug.to_string(),
            publication_id: PublicationId::new_v4(),
            publication_slug: "pupil-absence".to_string(),
            publication_title: "Pupil absence".to_string(),
            publication_latest_published_release_version_id: Some(release_version_id),
            is_amendment: false,
            is_latest_version: true,
        }
    }

    #[tokio::test]
    async fn test_one_call_in_input_order() {
        let bus = Arc::new(RecordingBus::default());
        let service = EventRaiserService::new(bus.clone(), "1.0");
        let infos = vec![info("2021-22"), info("2022-23"), info("2023-24")];

        let count = service
            .raise_release_version_published_events(&infos)
            .await
            .unwrap();

        assert_eq!(count, 3);
        let batches = bus.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        let slugs: Vec<&str> = batches[0]
            .iter()
            .map(|event| event.data.release_slug.as_str())
            .collect();
        assert_eq!(slugs, vec!["2021-22", "2022-23", "2023-24"]);
        assert!(batches[0]
            .iter()
            .all(|event| event.event_type == RELEASE_VERSION_PUBLISHED && event.data_version == "1.0"));
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_call() {
        let bus = Arc::new(RecordingBus::default());
        let service = EventRaiserService::new(bus.clone(), "1.0");

        assert_eq!(
            service.raise_release_version_published_events(&[]).await.unwrap(),
            0
        );
        assert!(bus.batches.lock().unwrap().is_empty());
    }

    #[test]
    fn test_envelope_serializes_camel_case() {
        let event = ReleaseVersionPublishedEvent::from_info(&info("2023-24"), Utc::now(), "1.0");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["eventType"], "ReleaseVersionPublished");
        assert_eq!(json["data"]["releaseSlug"], "2023-24");
        assert!(json.get("dataVersion").is_some());
    }
}
