//! PostgreSQL adapter implementing the relational gateway traits
//!
//! One adapter serves status rows, release metadata, data sets,
//! methodologies and subscribers from the same pool. With `dry_run` set,
//! reads run normally and every write is logged and skipped.

use crate::adapters::gateways::traits::{
    DataSetRepository, MethodologyRepository, ReleaseMetadataGateway, StatusStorage,
    SubscriberDirectory,
};
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::postgresql::models::{
    column, publication_from_row, redirect_from_row, subscriber_from_row,
    PostgreSQLMethodologyVersion, PostgreSQLReleaseVersion, PostgreSQLStatus,
};
use crate::core::state::ReleasePublishingStatus;
use crate::domain::ids::{
    DataSetId, MethodologyVersionId, PublicationId, ReleasePublishingKey, ReleaseVersionId,
    SubscriberId,
};
use crate::domain::{
    MethodologyVersion, Publication, PublisherError, Redirect, ReleaseVersion, Result, Subscriber,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// PostgreSQL implementation of the relational gateways
pub struct PostgreSQLAdapter {
    client: Arc<PostgreSQLClient>,
    dry_run: bool,
}

impl PostgreSQLAdapter {
    /// Create an adapter over a shared client
    pub fn new_with_arc(client: Arc<PostgreSQLClient>, dry_run: bool) -> Self {
        Self { client, dry_run }
    }

    async fn release_versions(
        &self,
        query: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<Vec<ReleaseVersion>> {
        self.client
            .query(query, params)
            .await?
            .iter()
            .map(|row| PostgreSQLReleaseVersion::from_row(row)?.to_domain())
            .collect()
    }
}

fn uuids<T: Copy + Into<Uuid>>(ids: &[T]) -> Vec<Uuid> {
    ids.iter().map(|id| (*id).into()).collect()
}

#[async_trait]
impl StatusStorage for PostgreSQLAdapter {
    async fn load_status(
        &self,
        key: &ReleasePublishingKey,
    ) -> Result<Option<ReleasePublishingStatus>> {
        let query = "SELECT * FROM release_publishing_statuses \
                     WHERE release_version_id = $1 AND attempt_id = $2";

        let row = self
            .client
            .query_opt(
                query,
                &[key.release_version_id.as_uuid(), key.attempt_id.as_uuid()],
            )
            .await?;

        row.map(|row| PostgreSQLStatus::from_row(&row)?.to_domain())
            .transpose()
    }

    async fn save_status(&self, status: &ReleasePublishingStatus) -> Result<()> {
        if self.dry_run {
            tracing::info!(
                release_version_id = %status.key.release_version_id,
                attempt_id = %status.key.attempt_id,
                stage = %status.state,
                "DRY RUN: Would save publishing status to PostgreSQL"
            );
            return Ok(());
        }

        let row = PostgreSQLStatus::from_domain(status);
        let upsert_query = r#"
            INSERT INTO release_publishing_statuses (
                release_version_id, attempt_id, overall_stage, publishing_step,
                log_message, warnings, created, last_updated
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (release_version_id, attempt_id) DO UPDATE SET
                overall_stage = EXCLUDED.overall_stage,
                publishing_step = EXCLUDED.publishing_step,
                log_message = EXCLUDED.log_message,
                warnings = EXCLUDED.warnings,
                last_updated = EXCLUDED.last_updated
        "#;

        self.client
            .execute(
                upsert_query,
                &[
                    &row.release_version_id,
                    &row.attempt_id,
                    &row.overall_stage,
                    &row.publishing_step,
                    &row.log_message,
                    &row.warnings,
                    &row.created,
                    &row.last_updated,
                ],
            )
            .await?;

        Ok(())
    }

    async fn statuses_for_release(
        &self,
        release_version_id: ReleaseVersionId,
    ) -> Result<Vec<ReleasePublishingStatus>> {
        let query = "SELECT * FROM release_publishing_statuses \
                     WHERE release_version_id = $1 ORDER BY created, attempt_id";

        self.client
            .query(query, &[release_version_id.as_uuid()])
            .await?
            .iter()
            .map(|row| PostgreSQLStatus::from_row(row)?.to_domain())
            .collect()
    }
}

#[async_trait]
impl ReleaseMetadataGateway for PostgreSQLAdapter {
    async fn get_release_version(&self, id: ReleaseVersionId) -> Result<ReleaseVersion> {
        self.release_versions("SELECT * FROM release_versions WHERE id = $1", &[id.as_uuid()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| PublisherError::not_found("Release version", id))
    }

    async fn complete_publishing(
        &self,
        id: ReleaseVersionId,
        published_at: DateTime<Utc>,
    ) -> Result<()> {
        if self.dry_run {
            tracing::info!(
                release_version_id = %id,
                published_at = %published_at,
                "DRY RUN: Would stamp release version as published"
            );
            return Ok(());
        }

        let updated = self
            .client
            .execute(
                "UPDATE release_versions SET published = $2 WHERE id = $1",
                &[id.as_uuid(), &published_at],
            )
            .await?;

        if updated == 0 {
            return Err(PublisherError::not_found("Release version", id));
        }
        Ok(())
    }

    async fn get_latest_published_release_version(
        &self,
        publication_id: PublicationId,
        exclude: &[ReleaseVersionId],
    ) -> Result<Option<ReleaseVersion>> {
        let query = "SELECT * FROM release_versions \
                     WHERE publication_id = $1 AND published IS NOT NULL \
                     AND NOT (id = ANY($2))";
        let excluded = uuids(exclude);

        let published = self
            .release_versions(query, &[publication_id.as_uuid(), &excluded])
            .await?;

        // Coverage order is not sortable in SQL
        Ok(published
            .into_iter()
            .max_by(|a, b| a.compare_recency(b)))
    }

    async fn update_latest_published_release_version(
        &self,
        publication_id: PublicationId,
        release_version_id: ReleaseVersionId,
    ) -> Result<()> {
        if self.dry_run {
            tracing::info!(
                publication_id = %publication_id,
                release_version_id = %release_version_id,
                "DRY RUN: Would update latest published release version"
            );
            return Ok(());
        }

        let updated = self
            .client
            .execute(
                "UPDATE publications SET latest_published_release_version_id = $2 WHERE id = $1",
                &[publication_id.as_uuid(), release_version_id.as_uuid()],
            )
            .await?;

        if updated == 0 {
            return Err(PublisherError::not_found("Publication", publication_id));
        }
        Ok(())
    }

    async fn get_publication(&self, publication_id: PublicationId) -> Result<Publication> {
        let row = self
            .client
            .query_opt(
                "SELECT * FROM publications WHERE id = $1",
                &[publication_id.as_uuid()],
            )
            .await?
            .ok_or_else(|| PublisherError::not_found("Publication", publication_id))?;

        publication_from_row(&row)
    }

    async fn find_publication_by_slug(&self, slug: &str) -> Result<Option<Publication>> {
        self.client
            .query_opt("SELECT * FROM publications WHERE slug = $1", &[&slug])
            .await?
            .map(|row| publication_from_row(&row))
            .transpose()
    }

    async fn get_previous_release_versions(
        &self,
        release_version: &ReleaseVersion,
    ) -> Result<Vec<ReleaseVersionId>> {
        let query = "SELECT id FROM release_versions \
                     WHERE release_id = $1 AND id <> $2 AND version < $3 \
                     ORDER BY version";
        let version = i32::try_from(release_version.version).map_err(|_| {
            PublisherError::Validation(format!(
                "Release version number out of range: {}",
                release_version.version
            ))
        })?;

        self.client
            .query(
                query,
                &[
                    release_version.release_id.as_uuid(),
                    release_version.id.as_uuid(),
                    &version,
                ],
            )
            .await?
            .iter()
            .map(|row| -> Result<ReleaseVersionId> { Ok(column::<Uuid>(row, "id")?.into()) })
            .collect()
    }

    async fn list_published_publications(&self) -> Result<Vec<Publication>> {
        let query = "SELECT * FROM publications \
                     WHERE latest_published_release_version_id IS NOT NULL \
                     ORDER BY title";

        self.client
            .query(query, &[])
            .await?
            .iter()
            .map(publication_from_row)
            .collect()
    }

    async fn list_redirects(&self) -> Result<Vec<Redirect>> {
        self.client
            .query(
                "SELECT kind, publication_slug, from_slug, to_slug FROM redirects ORDER BY id",
                &[],
            )
            .await?
            .iter()
            .map(redirect_from_row)
            .collect()
    }
}

#[async_trait]
impl DataSetRepository for PostgreSQLAdapter {
    async fn data_set_ids_for_release(
        &self,
        release_version_id: ReleaseVersionId,
    ) -> Result<Vec<DataSetId>> {
        self.client
            .query(
                "SELECT id FROM data_sets WHERE release_version_id = $1 ORDER BY id",
                &[release_version_id.as_uuid()],
            )
            .await?
            .iter()
            .map(|row| -> Result<DataSetId> { Ok(column::<Uuid>(row, "id")?.into()) })
            .collect()
    }

    async fn promote_staged_version(
        &self,
        data_set_id: DataSetId,
        published_at: DateTime<Utc>,
    ) -> Result<()> {
        if self.dry_run {
            tracing::info!(
                data_set_id = %data_set_id,
                "DRY RUN: Would promote staged data set version"
            );
            return Ok(());
        }

        let mut client = self.client.get_connection().await?;
        let tx = client
            .transaction()
            .await
            .map_err(|e| PublisherError::Database(format!("Failed to begin transaction: {e}")))?;

        let staged = tx
            .query_opt(
                "SELECT id FROM data_set_versions \
                 WHERE data_set_id = $1 AND status = 'staged' FOR UPDATE",
                &[data_set_id.as_uuid()],
            )
            .await
            .map_err(|e| PublisherError::Database(format!("Query failed: {e}")))?;

        let Some(staged) = staged else {
            tracing::debug!(data_set_id = %data_set_id, "No staged data set version");
            return Ok(());
        };
        let staged_id: Uuid = column(&staged, "id")?;

        tx.execute(
            "UPDATE data_set_versions SET status = 'deprecated' \
             WHERE data_set_id = $1 AND status = 'published'",
            &[data_set_id.as_uuid()],
        )
        .await
        .map_err(|e| PublisherError::Database(format!("Statement execution failed: {e}")))?;

        tx.execute(
            "UPDATE data_set_versions SET status = 'published', published = $2 WHERE id = $1",
            &[&staged_id, &published_at],
        )
        .await
        .map_err(|e| PublisherError::Database(format!("Statement execution failed: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| PublisherError::Database(format!("Failed to commit transaction: {e}")))?;

        tracing::debug!(
            data_set_id = %data_set_id,
            data_set_version_id = %staged_id,
            "Promoted staged data set version"
        );
        Ok(())
    }
}

#[async_trait]
impl MethodologyRepository for PostgreSQLAdapter {
    async fn latest_versions_for_publication(
        &self,
        publication_id: PublicationId,
    ) -> Result<Vec<MethodologyVersion>> {
        let query = r#"
            SELECT DISTINCT ON (mv.methodology_id) mv.*
            FROM methodology_versions mv
            JOIN publication_methodologies pm ON pm.methodology_id = mv.methodology_id
            WHERE pm.publication_id = $1
            ORDER BY mv.methodology_id, mv.version DESC
        "#;

        self.client
            .query(query, &[publication_id.as_uuid()])
            .await?
            .iter()
            .map(|row| PostgreSQLMethodologyVersion::from_row(row)?.to_domain())
            .collect()
    }

    async fn mark_published(
        &self,
        id: MethodologyVersionId,
        published_at: DateTime<Utc>,
    ) -> Result<()> {
        if self.dry_run {
            tracing::info!(
                methodology_version_id = %id,
                "DRY RUN: Would publish methodology version"
            );
            return Ok(());
        }

        self.client
            .execute(
                "UPDATE methodology_versions SET published = $2 \
                 WHERE id = $1 AND published IS NULL",
                &[id.as_uuid(), &published_at],
            )
            .await?;

        Ok(())
    }
}

#[async_trait]
impl SubscriberDirectory for PostgreSQLAdapter {
    async fn verified_subscribers(&self, publication_id: PublicationId) -> Result<Vec<Subscriber>> {
        self.client
            .query(
                "SELECT id, publication_id, email FROM subscribers \
                 WHERE publication_id = $1 AND verified ORDER BY email",
                &[publication_id.as_uuid()],
            )
            .await?
            .iter()
            .map(subscriber_from_row)
            .collect()
    }

    async fn notified_subscribers(
        &self,
        release_version_id: ReleaseVersionId,
    ) -> Result<Vec<SubscriberId>> {
        self.client
            .query(
                "SELECT subscriber_id FROM subscriber_notifications WHERE release_version_id = $1",
                &[release_version_id.as_uuid()],
            )
            .await?
            .iter()
            .map(|row| -> Result<SubscriberId> { Ok(column::<Uuid>(row, "subscriber_id")?.into()) })
            .collect()
    }

    async fn record_notified(
        &self,
        subscriber_id: SubscriberId,
        release_version_ids: &[ReleaseVersionId],
    ) -> Result<()> {
        if self.dry_run {
            tracing::info!(
                subscriber_id = %subscriber_id,
                release_versions = release_version_ids.len(),
                "DRY RUN: Would record subscriber notification"
            );
            return Ok(());
        }

        let now = Utc::now();
        for release_version_id in release_version_ids {
            self.client
                .execute(
                    "INSERT INTO subscriber_notifications \
                     (subscriber_id, release_version_id, notified_at) \
                     VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
                    &[subscriber_id.as_uuid(), release_version_id.as_uuid(), &now],
                )
                .await?;
        }

        Ok(())
    }
}
