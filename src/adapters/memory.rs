//! In-memory status storage
//!
//! Backs the status store during dry runs, so an attempt can move through
//! its stages without writing to the database.

use crate::adapters::gateways::traits::StatusStorage;
use crate::core::state::status::ReleasePublishingStatus;
use crate::domain::ids::{ReleasePublishingKey, ReleaseVersionId};
use crate::domain::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Status rows held in a map keyed by attempt
#[derive(Debug, Default)]
pub struct InMemoryStatusStorage {
    rows: RwLock<HashMap<ReleasePublishingKey, ReleasePublishingStatus>>,
}

impl InMemoryStatusStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with existing rows
    pub fn with_statuses(statuses: impl IntoIterator<Item = ReleasePublishingStatus>) -> Self {
        let rows = statuses
            .into_iter()
            .map(|status| (status.key, status))
            .collect();
        Self {
            rows: RwLock::new(rows),
        }
    }

    /// Number of rows held
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl StatusStorage for InMemoryStatusStorage {
    async fn load_status(
        &self,
        key: &ReleasePublishingKey,
    ) -> Result<Option<ReleasePublishingStatus>> {
        Ok(self.rows.read().await.get(key).cloned())
    }

    async fn save_status(&self, status: &ReleasePublishingStatus) -> Result<()> {
        self.rows.write().await.insert(status.key, status.clone());
        Ok(())
    }

    async fn statuses_for_release(
        &self,
        release_version_id: ReleaseVersionId,
    ) -> Result<Vec<ReleasePublishingStatus>> {
        let mut statuses: Vec<_> = self
            .rows
            .read()
            .await
            .values()
            .filter(|status| status.key.release_version_id == release_version_id)
            .cloned()
            .collect();
        statuses.sort_by_key(|status| status.created);
        Ok(statuses)
    }
}
