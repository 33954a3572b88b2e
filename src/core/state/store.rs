//! Publishing status store
//!
//! Wraps a [`StatusStorage`] backend with the state machine: every write is
//! a read-modify-write of one row, validated against the transition table.
//! Storage errors are returned to the caller untouched; the store never
//! retries.

use crate::adapters::gateways::traits::StatusStorage;
use crate::core::state::stage::{OverallStage, PipelineStage, PublishingState, PublishingStep};
use crate::core::state::status::{ReleasePublishingStatus, ReleasePublishingStatusBuilder};
use crate::domain::ids::{ReleasePublishingKey, ReleaseVersionId};
use crate::domain::{PublisherError, Result};
use chrono::Utc;
use std::sync::Arc;

/// Status store for publishing attempts
pub struct PublishingStatusStore {
    storage: Arc<dyn StatusStorage + Send + Sync>,
}

impl PublishingStatusStore {
    /// Create a new store over a storage backend
    pub fn new_with_storage(storage: Arc<dyn StatusStorage + Send + Sync>) -> Self {
        Self { storage }
    }

    /// Load the status of one attempt
    ///
    /// # Errors
    ///
    /// Returns [`PublisherError::NotFound`] if the attempt was never started.
    pub async fn get(&self, key: &ReleasePublishingKey) -> Result<ReleasePublishingStatus> {
        self.storage
            .load_status(key)
            .await?
            .ok_or_else(|| PublisherError::not_found("Publishing status", key))
    }

    /// Record `Started` for an attempt
    ///
    /// Re-creating an attempt that is still at `Started` refreshes it. An
    /// attempt that has moved on, or finished, is rejected: a retry must use
    /// a fresh attempt id.
    pub async fn create(
        &self,
        key: ReleasePublishingKey,
        log_message: Option<String>,
    ) -> Result<ReleasePublishingStatus> {
        let status = match self.storage.load_status(&key).await? {
            Some(existing) => self.advance(existing, PublishingState::STARTED, log_message)?,
            None => {
                let mut builder = ReleasePublishingStatusBuilder::new(key);
                if let Some(message) = log_message {
                    builder = builder.log_message(message);
                }
                builder.build()
            }
        };

        self.storage.save_status(&status).await?;
        crate::log_stage_recorded!(key, status.state);
        Ok(status)
    }

    /// Move an attempt to an in-progress stage
    ///
    /// Calling this twice with the same stage only refreshes the timestamp;
    /// the log message from the first call is kept.
    pub async fn update_stage(
        &self,
        key: &ReleasePublishingKey,
        stage: PipelineStage,
        log_message: Option<String>,
    ) -> Result<ReleasePublishingStatus> {
        self.apply(key, PublishingState::InProgress { stage }, log_message)
            .await
    }

    /// Mark an attempt `Complete`
    pub async fn mark_complete(
        &self,
        key: &ReleasePublishingKey,
    ) -> Result<ReleasePublishingStatus> {
        self.apply(key, PublishingState::Complete, None).await
    }

    /// Mark an attempt `Failed` at the given step
    pub async fn record_failure(
        &self,
        key: &ReleasePublishingKey,
        step: PublishingStep,
        message: impl Into<String>,
    ) -> Result<ReleasePublishingStatus> {
        self.apply(key, PublishingState::failed_at(step), Some(message.into()))
            .await
    }

    /// Mark an attempt `Superseded` by a newer attempt
    pub async fn mark_superseded(
        &self,
        key: &ReleasePublishingKey,
        superseded_by: &ReleasePublishingKey,
    ) -> Result<ReleasePublishingStatus> {
        self.apply(
            key,
            PublishingState::Superseded,
            Some(format!("Superseded by attempt {}", superseded_by.attempt_id)),
        )
        .await
    }

    /// Append a non-fatal warning without changing the state
    pub async fn record_warning(
        &self,
        key: &ReleasePublishingKey,
        message: impl Into<String>,
    ) -> Result<ReleasePublishingStatus> {
        let mut status = self.get(key).await?;
        status.warnings.push(message.into());
        status.last_updated = Utc::now();
        self.storage.save_status(&status).await?;
        Ok(status)
    }

    /// Every attempt for a release version whose stage is one of `stages`
    pub async fn get_all_by_overall_stage(
        &self,
        release_version_id: ReleaseVersionId,
        stages: &[OverallStage],
    ) -> Result<Vec<ReleasePublishingStatus>> {
        let statuses = self.storage.statuses_for_release(release_version_id).await?;
        Ok(statuses
            .into_iter()
            .filter(|status| stages.contains(&status.overall_stage()))
            .collect())
    }

    /// Every attempt for a release version
    pub async fn get_all(
        &self,
        release_version_id: ReleaseVersionId,
    ) -> Result<Vec<ReleasePublishingStatus>> {
        self.storage.statuses_for_release(release_version_id).await
    }

    async fn apply(
        &self,
        key: &ReleasePublishingKey,
        next: PublishingState,
        log_message: Option<String>,
    ) -> Result<ReleasePublishingStatus> {
        let current = self.get(key).await?;
        let status = self.advance(current, next, log_message)?;
        self.storage.save_status(&status).await?;
        crate::log_stage_recorded!(*key, status.state);
        Ok(status)
    }

    fn advance(
        &self,
        mut status: ReleasePublishingStatus,
        next: PublishingState,
        log_message: Option<String>,
    ) -> Result<ReleasePublishingStatus> {
        let repeated = status.state == next;
        status.state = status.state.transition(next)?;
        status.last_updated = Utc::now();
        if !repeated && log_message.is_some() {
            status.log_message = log_message;
        }
        Ok(status)
    }
}
