//! Event topic client
//!
//! Posts a batch of events to the topic endpoint as one JSON array,
//! authenticated with the topic access key.

use super::client::{build_http_client, error_for_status};
use crate::adapters::gateways::traits::EventBus;
use crate::config::EventBusConfig;
use crate::core::services::events::ReleaseVersionPublishedEvent;
use crate::domain::{PublisherError, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;

/// Header carrying the topic access key
const ACCESS_KEY_HEADER: &str = "aeg-sas-key";

/// Event topic publisher
pub struct HttpEventBus {
    client: Client,
    topic_endpoint: String,
    access_key: String,
    dry_run: bool,
}

impl HttpEventBus {
    /// Create a publisher for the configured topic
    pub fn new(config: &EventBusConfig, dry_run: bool) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config.timeout_seconds)?,
            topic_endpoint: config.topic_endpoint.clone(),
            access_key: config.access_key.expose_secret().as_ref().to_string(),
            dry_run,
        })
    }
}

#[async_trait]
impl EventBus for HttpEventBus {
    async fn publish_batch(&self, events: &[ReleaseVersionPublishedEvent]) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }

        if self.dry_run {
            tracing::info!(count = events.len(), "DRY RUN: Would publish events");
            return Ok(());
        }

        let response = self
            .client
            .post(&self.topic_endpoint)
            .header(ACCESS_KEY_HEADER, &self.access_key)
            .json(events)
            .send()
            .await
            .map_err(|e| PublisherError::EventBus(format!("Failed to publish events: {e}")))?;

        error_for_status(response)
            .await
            .map_err(|e| PublisherError::EventBus(format!("Event batch {e}")))?;

        tracing::debug!(count = events.len(), "Published events");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use crate::core::services::events::{
        ReleaseVersionPublishedEventData, RELEASE_VERSION_PUBLISHED,
    };
    use crate::domain::ids::{PublicationId, ReleaseId, ReleaseVersionId};
    use chrono::Utc;
    use mockito::{Matcher, Server};
    use uuid::Uuid;

    fn bus(topic_endpoint: String, dry_run: bool) -> HttpEventBus {
        let config = EventBusConfig {
            topic_endpoint,
            access_key: secret_string("topic-key".to_string()),
            data_version: "1.0".to_string(),
            timeout_seconds: 5,
        };
        HttpEventBus::new(&config, dry_run).unwrap()
    }

    fn event(release_slug: &str) -> ReleaseVersionPublishedEvent {
        let release_version_id = ReleaseVersionId::new_v4();
        ReleaseVersionPublishedEvent {
            id: Uuid::new_v4(),
            event_type: RELEASE_VERSION_PUBLISHED.to_string(),
            subject: release_version_id.to_string(),
            data: ReleaseVersionPublishedEventData {
                release_id: ReleaseId::new_v4(),
                release_slug: release_slug.to_string(),
                publication_id: PublicationId::new_v4(),
                publication_slug: "pupil-absence".to_string(),
                publication_latest_published_release_version_id: Some(release_version_id),
                is_latest_published_release_version: true,
            },
            event_time: Utc::now(),
            data_version: "1.0".to_string(),
        }
    }

    #[tokio::test]
    async fn test_publish_batch_posts_array_in_order() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/events")
            .match_header(ACCESS_KEY_HEADER, "topic-key")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Regex(
                r#"^\[\{.*"releaseSlug":"2023-24".*\},\{.*"releaseSlug":"2024-25".*\}\]$"#.to_string(),
            ))
            .with_status(200)
            .create_async()
            .await;

        bus(format!("{}/api/events", server.url()), false)
            .publish_batch(&[event("2023-24"), event("2024-25")])
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_publish_batch_failure_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/events")
            .with_status(401)
            .create_async()
            .await;

        let err = bus(format!("{}/api/events", server.url()), false)
            .publish_batch(&[event("2024-25")])
            .await
            .unwrap_err();

        assert!(matches!(err, PublisherError::EventBus(_)));
    }

    #[tokio::test]
    async fn test_empty_batch_is_not_sent() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        bus(server.url(), false).publish_batch(&[]).await.unwrap();
        bus(server.url(), true)
            .publish_batch(&[event("2024-25")])
            .await
            .unwrap();

        mock.assert_async().await;
    }
}
