//! Data set publishing
//!
//! Promotes the staged version of each data set owned by a release to its
//! live, queryable form. Each data set is promoted in its own transaction;
//! one failing does not stop the others.

use crate::adapters::gateways::traits::DataSetRepository;
use crate::core::publish::timeout::{with_timeout, DEFAULT_STEP_TIMEOUT};
use crate::domain::errors::DataSetFailure;
use crate::domain::ids::{DataSetId, ReleaseVersionId};
use crate::domain::{PublisherError, Result};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

/// Promotes staged data sets to live
pub struct DataSetPublishingService {
    repository: Arc<dyn DataSetRepository + Send + Sync>,
    step_timeout: Duration,
}

impl DataSetPublishingService {
    /// Create a new service over a data set repository
    pub fn new(repository: Arc<dyn DataSetRepository + Send + Sync>) -> Self {
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

    /// Data sets owned by a release version
    pub async fn data_set_ids_for_release(
        &self,
        release_version_id: ReleaseVersionId,
    ) -> Result<Vec<DataSetId>> {
        with_timeout(
            "data_set_ids_for_release",
            self.step_timeout,
            self.repository.data_set_ids_for_release(release_version_id),
        )
        .await
    }

    /// Promote every data set in `data_set_ids`
    ///
    /// An empty list is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`PublisherError::DataSetPublishing`] listing every data set
    /// that failed once all promotions have finished.
    pub async fn publish_data_sets(
        &self,
        data_set_ids: &[DataSetId],
        published_at: DateTime<Utc>,
    ) -> Result<()> {
        if data_set_ids.is_empty() {
            return Ok(());
        }

        let results = join_all(data_set_ids.iter().map(|id| async move {
            (
                *id,
                with_timeout(
                    "promote_staged_version",
                    self.step_timeout,
                    self.repository.promote_staged_version(*id, published_at),
                )
                .await,
            )
        }))
        .await;

        let failures: Vec<DataSetFailure> = results
            .into_iter()
            .filter_map(|(id, result)| {
                result.err().map(|e| {
                    tracing::warn!(data_set_id = %id, error = %e, "Data set failed to publish");
                    DataSetFailure {
                        data_set_id: id.to_string(),
                        message: e.to_string(),
                    }
                })
            })
            .collect();

        tracing::debug!(
            total = data_set_ids.len(),
            failed = failures.len(),
            "Promoted staged data sets"
        );

        if failures.is_empty() {
            Ok(())
        } else {
            Err(PublisherError::DataSetPublishing { failures })
        }
    }
}
