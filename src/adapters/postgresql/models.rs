//! PostgreSQL row models
//!
//! Each struct mirrors one table (or query projection) column for column.
//! `from_row` reads a row; `to_domain` does the fallible conversion into the
//! domain type so it can be tested without a database.

use crate::core::state::{
    OverallStage, PublishingState, PublishingStep, ReleasePublishingStatus,
    ReleasePublishingStatusBuilder,
};
use crate::domain::ids::ReleasePublishingKey;
use crate::domain::{
    MethodologyStatus, MethodologyVersion, PublisherError, PublishingStrategy, Publication,
    Redirect, RedirectKind, ReleaseVersion, Result, Subscriber, TimePeriodCoverage,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio_postgres::types::FromSql;
use tokio_postgres::Row;
use uuid::Uuid;

/// Read one column, mapping type errors to [`PublisherError::Database`]
pub(crate) fn column<'a, T: FromSql<'a>>(row: &'a Row, name: &str) -> Result<T> {
    row.try_get(name)
        .map_err(|e| PublisherError::Database(format!("Failed to read column '{name}': {e}")))
}

fn version_number(value: i32, entity: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| PublisherError::Database(format!("Negative {entity} version: {value}")))
}

/// Row of `release_publishing_statuses`
#[derive(Debug, Clone, PartialEq)]
pub struct PostgreSQLStatus {
    pub release_version_id: Uuid,
    pub attempt_id: Uuid,
    pub overall_stage: String,
    pub publishing_step: Option<String>,
    pub log_message: Option<String>,
    pub warnings: Value,
    pub created: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl PostgreSQLStatus {
    /// Flatten a status into columns
    pub fn from_domain(status: &ReleasePublishingStatus) -> Self {
        Self {
            release_version_id: status.key.release_version_id.into_inner(),
            attempt_id: status.key.attempt_id.into_inner(),
            overall_stage: status.overall_stage().as_str().to_string(),
            publishing_step: status.publishing_step().map(|step| step.as_str().to_string()),
            log_message: status.log_message.clone(),
            warnings: Value::from(status.warnings.clone()),
            created: status.created,
            last_updated: status.last_updated,
        }
    }

    /// Read a status row
    pub fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            release_version_id: column(row, "release_version_id")?,
            attempt_id: column(row, "attempt_id")?,
            overall_stage: column(row, "overall_stage")?,
            publishing_step: column(row, "publishing_step")?,
            log_message: column(row, "log_message")?,
            warnings: column(row, "warnings")?,
            created: column(row, "created")?,
            last_updated: column(row, "last_updated")?,
        })
    }

    /// Rebuild the status, rejecting stage/step pairs the state machine cannot produce
    pub fn to_domain(&self) -> Result<ReleasePublishingStatus> {
        let overall: OverallStage = self
            .overall_stage
            .parse()
            .map_err(PublisherError::Database)?;
        let step = self
            .publishing_step
            .as_deref()
            .map(str::parse::<PublishingStep>)
            .transpose()
            .map_err(PublisherError::Database)?;
        let state = PublishingState::from_parts(overall, step)?;

        let warnings: Vec<String> = serde_json::from_value(self.warnings.clone())?;
        let key = ReleasePublishingKey::new(self.release_version_id.into(), self.attempt_id.into());

        let mut builder = ReleasePublishingStatusBuilder::new(key)
            .state(state)
            .created(self.created)
            .last_updated(self.last_updated)
            .warnings(warnings);
        if let Some(message) = &self.log_message {
            builder = builder.log_message(message.clone());
        }

        Ok(builder.build())
    }
}

/// Row of `release_versions`
#[derive(Debug, Clone, PartialEq)]
pub struct PostgreSQLReleaseVersion {
    pub id: Uuid,
    pub release_id: Uuid,
    pub publication_id: Uuid,
    pub slug: String,
    pub title: String,
    pub year: i32,
    pub time_period_coverage: String,
    pub version: i32,
    pub created: DateTime<Utc>,
    pub published: Option<DateTime<Utc>>,
    pub previous_version_id: Option<Uuid>,
    pub notify_subscribers: bool,
}

impl PostgreSQLReleaseVersion {
    /// Read a release version row
    pub fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: column(row, "id")?,
            release_id: column(row, "release_id")?,
            publication_id: column(row, "publication_id")?,
            slug: column(row, "slug")?,
            title: column(row, "title")?,
            year: column(row, "year")?,
            time_period_coverage: column(row, "time_period_coverage")?,
            version: column(row, "version")?,
            created: column(row, "created")?,
            published: column(row, "published")?,
            previous_version_id: column(row, "previous_version_id")?,
            notify_subscribers: column(row, "notify_subscribers")?,
        })
    }

    /// Convert to the domain model
    pub fn to_domain(&self) -> Result<ReleaseVersion> {
        let coverage: TimePeriodCoverage = self
            .time_period_coverage
            .parse()
            .map_err(PublisherError::Database)?;

        Ok(ReleaseVersion {
            id: self.id.into(),
            release_id: self.release_id.into(),
            publication_id: self.publication_id.into(),
            slug: self.slug.clone(),
            title: self.title.clone(),
            year: self.year,
            time_period_coverage: coverage,
            version: version_number(self.version, "release")?,
            created: self.created,
            published: self.published,
            previous_version_id: self.previous_version_id.map(Into::into),
            notify_subscribers: self.notify_subscribers,
        })
    }
}

/// Read a `publications` row
pub fn publication_from_row(row: &Row) -> Result<Publication> {
    Ok(Publication {
        id: column::<Uuid>(row, "id")?.into(),
        slug: column(row, "slug")?,
        title: column(row, "title")?,
        summary: column(row, "summary")?,
        latest_published_release_version_id: column::<Option<Uuid>>(
            row,
            "latest_published_release_version_id",
        )?
        .map(Into::into),
    })
}

/// Row of `methodology_versions`
#[derive(Debug, Clone, PartialEq)]
pub struct PostgreSQLMethodologyVersion {
    pub id: Uuid,
    pub methodology_id: Uuid,
    pub owning_publication_id: Uuid,
    pub slug: String,
    pub title: String,
    pub version: i32,
    pub status: String,
    pub scheduled_with_release_version_id: Option<Uuid>,
    pub published: Option<DateTime<Utc>>,
}

impl PostgreSQLMethodologyVersion {
    /// Read a methodology version row
    pub fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: column(row, "id")?,
            methodology_id: column(row, "methodology_id")?,
            owning_publication_id: column(row, "owning_publication_id")?,
            slug: column(row, "slug")?,
            title: column(row, "title")?,
            version: column(row, "version")?,
            status: column(row, "status")?,
            scheduled_with_release_version_id: column(row, "scheduled_with_release_version_id")?,
            published: column(row, "published")?,
        })
    }

    /// Convert to the domain model
    ///
    /// A version with no scheduled release publishes immediately.
    pub fn to_domain(&self) -> Result<MethodologyVersion> {
        let status = MethodologyStatus::parse(&self.status).ok_or_else(|| {
            PublisherError::Database(format!("Unknown methodology status: {}", self.status))
        })?;
        let publishing_strategy = match self.scheduled_with_release_version_id {
            Some(id) => PublishingStrategy::WithRelease(id.into()),
            None => PublishingStrategy::Immediately,
        };

        Ok(MethodologyVersion {
            id: self.id.into(),
            methodology_id: self.methodology_id.into(),
            owning_publication_id: self.owning_publication_id.into(),
            slug: self.slug.clone(),
            title: self.title.clone(),
            version: version_number(self.version, "methodology")?,
            status,
            publishing_strategy,
            published: self.published,
        })
    }
}

/// Read a `subscribers` row
pub fn subscriber_from_row(row: &Row) -> Result<Subscriber> {
    Ok(Subscriber {
        id: column::<Uuid>(row, "id")?.into(),
        publication_id: column::<Uuid>(row, "publication_id")?.into(),
        email: column(row, "email")?,
    })
}

/// Parse a `redirects.kind` value
pub fn redirect_kind(value: &str) -> Result<RedirectKind> {
    match value {
        "publication" => Ok(RedirectKind::Publication),
        "release" => Ok(RedirectKind::Release),
        other => Err(PublisherError::Database(format!(
            "Unknown redirect kind: {other}"
        ))),
    }
}

/// Read a `redirects` row
pub fn redirect_from_row(row: &Row) -> Result<Redirect> {
    let kind: String = column(row, "kind")?;
    Ok(Redirect {
        kind: redirect_kind(&kind)?,
        publication_slug: column(row, "publication_slug")?,
        from_slug: column(row, "from_slug")?,
        to_slug: column(row, "to_slug")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::PipelineStage;
    use crate::domain::ids::ReleaseVersionId;
    use chrono::TimeZone;
    use serde_json::json;

    fn status_row(overall_stage: &str, publishing_step: Option<&str>) -> PostgreSQLStatus {
        PostgreSQLStatus {
            release_version_id: Uuid::new_v4(),
            attempt_id: Uuid::new_v4(),
            overall_stage: overall_stage.to_string(),
            publishing_step: publishing_step.map(str::to_string),
            log_message: Some("Published 2 data set(s)".to_string()),
            warnings: json!(["Cache update for publication pupil-absence failed"]),
            created: Utc.with_ymd_and_hms(2024, 6, 13, 9, 30, 0).unwrap(),
            last_updated: Utc.with_ymd_and_hms(2024, 6, 13, 9, 31, 0).unwrap(),
        }
    }

    #[test]
    fn test_status_failed_row_to_domain() {
        let status = status_row("Failed", Some("PublishDataSets")).to_domain().unwrap();
        assert_eq!(
            status.state,
            PublishingState::Failed {
                stage: PipelineStage::DataPublished,
                step: PublishingStep::PublishDataSets,
            }
        );
        assert_eq!(status.warnings.len(), 1);
    }

    #[test]
    fn test_status_columns_survive_conversion() {
        let row = status_row("CachePublished", None);
        let status = row.to_domain().unwrap();

        assert_eq!(PostgreSQLStatus::from_domain(&status), row);
    }

    #[test]
    fn test_status_failed_without_step_is_rejected() {
        assert!(status_row("Failed", None).to_domain().is_err());
    }

    #[test]
    fn test_status_unknown_stage_is_rejected() {
        let err = status_row("Archived", None).to_domain().unwrap_err();
        assert!(matches!(err, PublisherError::Database(_)));
    }

    #[test]
    fn test_release_version_row_to_domain() {
        let previous = Uuid::new_v4();
        let row = PostgreSQLReleaseVersion {
            id: Uuid::new_v4(),
            release_id: Uuid::new_v4(),
            publication_id: Uuid::new_v4(),
            slug: "2023-24".to_string(),
            title: "Academic year 2023/24".to_string(),
            year: 2023,
            time_period_coverage: "AY".to_string(),
            version: 1,
            created: Utc.with_ymd_and_hms(2024, 3, 21, 9, 30, 0).unwrap(),
            published: None,
            previous_version_id: Some(previous),
            notify_subscribers: false,
        };

        let release = row.to_domain().unwrap();
        assert!(release.is_amendment());
        assert_eq!(release.time_period_coverage, TimePeriodCoverage::AcademicYear);
        assert_eq!(release.previous_version_id, Some(ReleaseVersionId::from(previous)));
    }

    #[test]
    fn test_release_version_negative_version_is_rejected() {
        let row = PostgreSQLReleaseVersion {
            id: Uuid::new_v4(),
            release_id: Uuid::new_v4(),
            publication_id: Uuid::new_v4(),
            slug: "2023".to_string(),
            title: "Calendar year 2023".to_string(),
            year: 2023,
            time_period_coverage: "CY".to_string(),
            version: -1,
            created: Utc::now(),
            published: None,
            previous_version_id: None,
            notify_subscribers: true,
        };
        assert!(row.to_domain().is_err());
    }

    #[test]
    fn test_methodology_row_strategy() {
        let release_version_id = Uuid::new_v4();
        let mut row = PostgreSQLMethodologyVersion {
            id: Uuid::new_v4(),
            methodology_id: Uuid::new_v4(),
            owning_publication_id: Uuid::new_v4(),
            slug: "pupil-absence-methodology".to_string(),
            title: "Pupil absence methodology".to_string(),
            version: 0,
            status: "approved".to_string(),
            scheduled_with_release_version_id: Some(release_version_id),
            published: None,
        };

        let methodology = row.to_domain().unwrap();
        assert!(methodology.is_being_published_alongside(release_version_id.into()));

        row.scheduled_with_release_version_id = None;
        assert_eq!(
            row.to_domain().unwrap().publishing_strategy,
            PublishingStrategy::Immediately
        );

        row.status = "archived".to_string();
        assert!(row.to_domain().is_err());
    }

    #[test]
    fn test_redirect_kind() {
        assert_eq!(redirect_kind("release").unwrap(), RedirectKind::Release);
        assert!(redirect_kind("methodology").is_err());
    }
}
