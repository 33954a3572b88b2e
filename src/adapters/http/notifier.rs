//! Notification API client

use super::client::{build_http_client, error_for_status, join_url};
use crate::adapters::gateways::traits::NotificationChannel;
use crate::config::NotifierConfig;
use crate::core::services::notifications::NotificationMessage;
use crate::domain::{PublisherError, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;

/// Sends subscriber emails through the notification API
pub struct HttpNotificationChannel {
    client: Client,
    url: String,
    api_key: String,
    dry_run: bool,
}

impl HttpNotificationChannel {
    pub fn new(config: &NotifierConfig, dry_run: bool) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config.timeout_seconds)?,
            url: join_url(&config.base_url, "notifications"),
            api_key: config.api_key.expose_secret().as_ref().to_string(),
            dry_run,
        })
    }
}

#[async_trait]
impl NotificationChannel for HttpNotificationChannel {
    async fn send(&self, message: &NotificationMessage) -> Result<()> {
        if self.dry_run {
            tracing::info!(
                subscriber_id = %message.subscriber_id,
                publication = %message.publication_slug,
                releases = message.releases.len(),
                "DRY RUN: Would send notification"
            );
            return Ok(());
        }

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(message)
            .send()
            .await
            .map_err(|e| PublisherError::Notification(format!("Failed to send notification: {e}")))?;

        error_for_status(response).await.map_err(|e| {
            PublisherError::Notification(format!(
                "Notification to subscriber {} {e}",
                message.subscriber_id
            ))
        })?;

        tracing::debug!(
            subscriber_id = %message.subscriber_id,
            publication = %message.publication_slug,
            "Notification sent"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use crate::core::services::notifications::NotifiedRelease;
    use crate::domain::ids::{PublicationId, ReleaseVersionId, SubscriberId};
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn channel(base_url: String, dry_run: bool) -> HttpNotificationChannel {
        let config = NotifierConfig {
            base_url,
            api_key: secret_string("notify-key".to_string()),
            timeout_seconds: 5,
        };
        HttpNotificationChannel::new(&config, dry_run).unwrap()
    }

    fn message() -> NotificationMessage {
        NotificationMessage {
            subscriber_id: SubscriberId::new_v4(),
            email: "reader@example.com".to_string(),
            publication_id: PublicationId::new_v4(),
            publication_slug: "pupil-absence".to_string(),
            publication_title: "Pupil absence in schools".to_string(),
            releases: vec![NotifiedRelease {
                release_version_id: ReleaseVersionId::new_v4(),
                release_slug: "2024-25".to_string(),
                release_title: "Academic year 2024/25".to_string(),
                is_amendment: false,
            }],
        }
    }

    #[tokio::test]
    async fn test_send_posts_message_with_bearer_token() {
        let mut server = Server::new_async().await;
        let message = message();
        let mock = server
            .mock("POST", "/api/notifications")
            .match_header("authorization", "Bearer notify-key")
            .match_body(Matcher::PartialJson(json!({
                "email": "reader@example.com",
                "publicationSlug": "pupil-absence",
                "publicationTitle": "Pupil absence in schools"
            })))
            .with_status(202)
            .create_async()
            .await;

        channel(format!("{}/api", server.url()), false)
            .send(&message)
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_maps_failure_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/notifications")
            .with_status(500)
            .with_body("template missing")
            .create_async()
            .await;

        let err = channel(server.url(), false)
            .send(&message())
            .await
            .unwrap_err();

        assert!(matches!(err, PublisherError::Notification(_)));
        assert!(err.to_string().contains("template missing"));
    }

    #[tokio::test]
    async fn test_dry_run_sends_nothing() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        channel(server.url(), true).send(&message()).await.unwrap();

        mock.assert_async().await;
    }
}
