//! Publishing status record
//!
//! One row per [`ReleasePublishingKey`]. Rows are never deleted; they are the
//! audit trail of every attempt made for a release version.

use crate::core::state::stage::{OverallStage, PublishingState, PublishingStep};
use crate::domain::ids::ReleasePublishingKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Progress of one publishing attempt
///
/// # Examples
///
/// ```
/// use release_publisher::core::state::{OverallStage, ReleasePublishingStatusBuilder};
/// use release_publisher::domain::{ReleasePublishingKey, ReleaseVersionId};
///
/// let key = ReleasePublishingKey::new_attempt(ReleaseVersionId::new_v4());
/// let status = ReleasePublishingStatusBuilder::new(key)
///     .log_message("Scheduled publish")
///     .build();
///
/// assert_eq!(status.overall_stage(), OverallStage::Started);
/// assert!(!status.is_terminal());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleasePublishingStatus {
    /// Attempt this row tracks
    pub key: ReleasePublishingKey,

    /// Current state
    pub state: PublishingState,

    /// When the attempt was started
    pub created: DateTime<Utc>,

    /// When the row was last written
    pub last_updated: DateTime<Utc>,

    /// Most recent log message (failure reason, stage note)
    pub log_message: Option<String>,

    /// Non-fatal warnings recorded against the attempt
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl ReleasePublishingStatus {
    /// Flattened stage
    pub fn overall_stage(&self) -> OverallStage {
        self.state.overall_stage()
    }

    /// Step the attempt failed at, if it failed
    pub fn publishing_step(&self) -> Option<PublishingStep> {
        self.state.publishing_step()
    }

    /// Whether the attempt has finished
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Whether the attempt finished successfully
    pub fn is_complete(&self) -> bool {
        self.state == PublishingState::Complete
    }

    /// Whether the attempt failed
    pub fn is_failed(&self) -> bool {
        matches!(self.state, PublishingState::Failed { .. })
    }

    /// Time between start and last update
    pub fn elapsed(&self) -> chrono::Duration {
        self.last_updated - self.created
    }
}

/// Builder for [`ReleasePublishingStatus`]
pub struct ReleasePublishingStatusBuilder {
    key: ReleasePublishingKey,
    state: PublishingState,
    created: Option<DateTime<Utc>>,
    last_updated: Option<DateTime<Utc>>,
    log_message: Option<String>,
    warnings: Vec<String>,
}

impl ReleasePublishingStatusBuilder {
    /// Create a builder for a freshly started attempt
    pub fn new(key: ReleasePublishingKey) -> Self {
        Self {
            key,
            state: PublishingState::STARTED,
            created: None,
            last_updated: None,
            log_message: None,
            warnings: Vec::new(),
        }
    }

    /// Set the state
    pub fn state(mut self, state: PublishingState) -> Self {
        self.state = state;
        self
    }

    /// Set the creation timestamp
    pub fn created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    /// Set the last updated timestamp
    pub fn last_updated(mut self, last_updated: DateTime<Utc>) -> Self {
        self.last_updated = Some(last_updated);
        self
    }

    /// Set the log message
    pub fn log_message(mut self, message: impl Into<String>) -> Self {
        self.log_message = Some(message.into());
        self
    }

    /// Set the warnings
    pub fn warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    /// Build the status
    pub fn build(self) -> ReleasePublishingStatus {
        let now = Utc::now();
        let created = self.created.unwrap_or(now);

        ReleasePublishingStatus {
            key: self.key,
            state: self.state,
            created,
            last_updated: self.last_updated.unwrap_or(created),
            log_message: self.log_message,
            warnings: self.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::stage::PipelineStage;
    use crate::domain::ids::ReleaseVersionId;

    fn key() -> ReleasePublishingKey {
        ReleasePublishingKey::new_attempt(ReleaseVersionId::new_v4())
    }

    #[test]
    fn test_builder_defaults_to_started() {
        let status = ReleasePublishingStatusBuilder::new(key()).build();
        assert_eq!(status.overall_stage(), OverallStage::Started);
        assert_eq!(status.created, status.last_updated);
        assert!(status.warnings.is_empty());
        assert!(status.log_message.is_none());
    }

    #[test]
    fn test_failed_status_exposes_step() {
        let status = ReleasePublishingStatusBuilder::new(key())
            .state(PublishingState::failed_at(PublishingStep::PublishMethodologies))
            .log_message("methodology store unavailable")
            .build();

        assert!(status.is_failed());
        assert!(status.is_terminal());
        assert!(!status.is_complete());
        assert_eq!(
            status.publishing_step(),
            Some(PublishingStep::PublishMethodologies)
        );
    }

    #[test]
    fn test_elapsed() {
        let created = Utc::now();
        let status = ReleasePublishingStatusBuilder::new(key())
            .state(PublishingState::InProgress {
                stage: PipelineStage::CachePublished,
            })
            .created(created)
            .last_updated(created + chrono::Duration::seconds(5))
            .build();

        assert_eq!(status.elapsed().num_seconds(), 5);
    }

    #[test]
    fn test_status_serialization() {
        let status = ReleasePublishingStatusBuilder::new(key())
            .state(PublishingState::Complete)
            .warnings(vec!["cache miss".to_string()])
            .build();

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["state"]["state"], "complete");
        assert_eq!(json["warnings"][0], "cache miss");

        let back: ReleasePublishingStatus = serde_json::from_value(json).unwrap();
        assert_eq!(back, status);
    }
}
