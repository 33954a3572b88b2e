//! Methodology domain models

use super::ids::{MethodologyId, MethodologyVersionId, PublicationId, ReleaseVersionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Approval status of a methodology version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodologyStatus {
    /// Being written
    Draft,
    /// Waiting on higher level review
    HigherLevelReview,
    /// Approved and ready to go live
    Approved,
}

impl MethodologyStatus {
    /// Column value used by the relational store
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::HigherLevelReview => "higher_level_review",
            Self::Approved => "approved",
        }
    }

    /// Parse a column value
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "higher_level_review" => Some(Self::HigherLevelReview),
            "approved" => Some(Self::Approved),
            _ => None,
        }
    }
}

/// When an approved methodology version goes live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "releaseVersionId", rename_all = "snake_case")]
pub enum PublishingStrategy {
    /// Live as soon as it is approved
    Immediately,
    /// Live together with the given release version
    WithRelease(ReleaseVersionId),
}

/// One version of a methodology owned by or adopted into a publication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodologyVersion {
    /// Methodology version identifier
    pub id: MethodologyVersionId,

    /// Methodology shared by all versions
    pub methodology_id: MethodologyId,

    /// Publication that owns the methodology
    pub owning_publication_id: PublicationId,

    /// URL slug
    pub slug: String,

    /// Title
    pub title: String,

    /// Version number
    pub version: u32,

    /// Approval status
    pub status: MethodologyStatus,

    /// When this version goes live
    pub publishing_strategy: PublishingStrategy,

    /// When this version went live, if it has
    pub published: Option<DateTime<Utc>>,
}

impl MethodologyVersion {
    /// Whether this version is scheduled to go live with the given release version
    ///
    /// Only approved, not yet published versions tied to exactly this release
    /// version qualify. Versions set to publish immediately were already
    /// published at approval time.
    pub fn is_being_published_alongside(&self, release_version_id: ReleaseVersionId) -> bool {
        self.status == MethodologyStatus::Approved
            && self.published.is_none()
            && self.publishing_strategy == PublishingStrategy::WithRelease(release_version_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn methodology(status: MethodologyStatus, strategy: PublishingStrategy) -> MethodologyVersion {
        MethodologyVersion {
            id: MethodologyVersionId::new_v4(),
            methodology_id: MethodologyId::new_v4(),
            owning_publication_id: PublicationId::new_v4(),
            slug: "pupil-absence-methodology".to_string(),
            title: "Pupil absence methodology".to_string(),
            version: 0,
            status,
            publishing_strategy: strategy,
            published: None,
        }
    }

    #[test]
    fn test_approved_with_matching_release_is_published_alongside() {
        let rv = ReleaseVersionId::new_v4();
        let m = methodology(MethodologyStatus::Approved, PublishingStrategy::WithRelease(rv));
        assert!(m.is_being_published_alongside(rv));
    }

    #[test]
    fn test_other_release_is_not_published_alongside() {
        let m = methodology(
            MethodologyStatus::Approved,
            PublishingStrategy::WithRelease(ReleaseVersionId::new_v4()),
        );
        assert!(!m.is_being_published_alongside(ReleaseVersionId::new_v4()));
    }

    #[test]
    fn test_draft_or_immediate_is_not_published_alongside() {
        let rv = ReleaseVersionId::new_v4();
        let draft = methodology(MethodologyStatus::Draft, PublishingStrategy::WithRelease(rv));
        assert!(!draft.is_being_published_alongside(rv));

        let immediate = methodology(MethodologyStatus::Approved, PublishingStrategy::Immediately);
        assert!(!immediate.is_being_published_alongside(rv));
    }

    #[test]
    fn test_already_published_is_not_published_alongside() {
        let rv = ReleaseVersionId::new_v4();
        let mut m = methodology(MethodologyStatus::Approved, PublishingStrategy::WithRelease(rv));
        m.published = Some(Utc::now());
        assert!(!m.is_being_published_alongside(rv));
    }

    #[test]
    fn test_status_column_values() {
        for status in [
            MethodologyStatus::Draft,
            MethodologyStatus::HigherLevelReview,
            MethodologyStatus::Approved,
        ] {
            assert_eq!(MethodologyStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(MethodologyStatus::parse("archived"), None);
    }
}
