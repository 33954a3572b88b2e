//! Release and publication domain models
//!
//! Read-only projections of the relational metadata the publisher needs,
//! plus the transient [`PublishedReleaseVersionInfo`] produced once a
//! release version has been stamped as published.

use super::ids::{PublicationId, ReleaseId, ReleaseVersionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Time period a release covers within its year
///
/// Declaration order is the chronological order used when deciding which
/// release version is the latest for a publication, so new variants must be
/// inserted in the right place rather than appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimePeriodCoverage {
    #[serde(rename = "AY")]
    AcademicYear,
    #[serde(rename = "AYQ1")]
    AcademicYearQ1,
    #[serde(rename = "AYQ2")]
    AcademicYearQ2,
    #[serde(rename = "AYQ3")]
    AcademicYearQ3,
    #[serde(rename = "AYQ4")]
    AcademicYearQ4,
    #[serde(rename = "T1")]
    AutumnTerm,
    #[serde(rename = "T2")]
    SpringTerm,
    #[serde(rename = "T3")]
    SummerTerm,
    #[serde(rename = "CY")]
    CalendarYear,
    #[serde(rename = "CYQ1")]
    CalendarYearQ1,
    #[serde(rename = "CYQ2")]
    CalendarYearQ2,
    #[serde(rename = "CYQ3")]
    CalendarYearQ3,
    #[serde(rename = "CYQ4")]
    CalendarYearQ4,
    #[serde(rename = "FY")]
    FinancialYear,
    #[serde(rename = "FYQ1")]
    FinancialYearQ1,
    #[serde(rename = "FYQ2")]
    FinancialYearQ2,
    #[serde(rename = "FYQ3")]
    FinancialYearQ3,
    #[serde(rename = "FYQ4")]
    FinancialYearQ4,
    #[serde(rename = "TY")]
    TaxYear,
    #[serde(rename = "M1")]
    January,
    #[serde(rename = "M2")]
    February,
    #[serde(rename = "M3")]
    March,
    #[serde(rename = "M4")]
    April,
    #[serde(rename = "M5")]
    May,
    #[serde(rename = "M6")]
    June,
    #[serde(rename = "M7")]
    July,
    #[serde(rename = "M8")]
    August,
    #[serde(rename = "M9")]
    September,
    #[serde(rename = "M10")]
    October,
    #[serde(rename = "M11")]
    November,
    #[serde(rename = "M12")]
    December,
}

impl TimePeriodCoverage {
    const CODES: [(&'static str, TimePeriodCoverage); 31] = [
        ("AY", Self::AcademicYear),
        ("AYQ1", Self::AcademicYearQ1),
        ("AYQ2", Self::AcademicYearQ2),
        ("AYQ3", Self::AcademicYearQ3),
        ("AYQ4", Self::AcademicYearQ4),
        ("T1", Self::AutumnTerm),
        ("T2", Self::SpringTerm),
        ("T3", Self::SummerTerm),
        ("CY", Self::CalendarYear),
        ("CYQ1", Self::CalendarYearQ1),
        ("CYQ2", Self::CalendarYearQ2),
        ("CYQ3", Self::CalendarYearQ3),
        ("CYQ4", Self::CalendarYearQ4),
        ("FY", Self::FinancialYear),
        ("FYQ1", Self::FinancialYearQ1),
        ("FYQ2", Self::FinancialYearQ2),
        ("FYQ3", Self::FinancialYearQ3),
        ("FYQ4", Self::FinancialYearQ4),
        ("TY", Self::TaxYear),
        ("M1", Self::January),
        ("M2", Self::February),
        ("M3", Self::March),
        ("M4", Self::April),
        ("M5", Self::May),
        ("M6", Self::June),
        ("M7", Self::July),
        ("M8", Self::August),
        ("M9", Self::September),
        ("M10", Self::October),
        ("M11", Self::November),
        ("M12", Self::December),
    ];

    /// Short code stored in the relational store (e.g. `AY`, `M10`)
    pub fn code(&self) -> &'static str {
        Self::CODES
            .iter()
            .find(|(_, coverage)| coverage == self)
            .map(|(code, _)| *code)
            .unwrap_or("AY")
    }
}

impl fmt::Display for TimePeriodCoverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for TimePeriodCoverage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::CODES
            .iter()
            .find(|(code, _)| code.eq_ignore_ascii_case(s.trim()))
            .map(|(_, coverage)| *coverage)
            .ok_or_else(|| format!("Unknown time period coverage code: {s}"))
    }
}

/// One publishable snapshot of a release
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseVersion {
    /// Release version identifier
    pub id: ReleaseVersionId,

    /// Logical release shared by every version
    pub release_id: ReleaseId,

    /// Owning publication
    pub publication_id: PublicationId,

    /// Release slug (e.g. `2023-24`)
    pub slug: String,

    /// Release title (e.g. `Academic year 2023/24`)
    pub title: String,

    /// Year the release covers
    pub year: i32,

    /// Time period the release covers within its year
    pub time_period_coverage: TimePeriodCoverage,

    /// Version number, zero for the original release
    pub version: u32,

    /// When this version was created
    pub created: DateTime<Utc>,

    /// When this version went live, if it has
    pub published: Option<DateTime<Utc>>,

    /// Version this one amends
    pub previous_version_id: Option<ReleaseVersionId>,

    /// Whether subscribers should hear about this version going live
    pub notify_subscribers: bool,
}

impl ReleaseVersion {
    /// Creates a builder for a release version
    pub fn builder(
        id: ReleaseVersionId,
        release_id: ReleaseId,
        publication_id: PublicationId,
    ) -> ReleaseVersionBuilder {
        ReleaseVersionBuilder::new(id, release_id, publication_id)
    }

    /// Whether this version amends a previously published one
    pub fn is_amendment(&self) -> bool {
        self.version > 0
    }

    /// Whether this version has gone live
    pub fn is_published(&self) -> bool {
        self.published.is_some()
    }

    /// Orders two release versions by year, then time period, then creation
    pub fn compare_recency(&self, other: &ReleaseVersion) -> Ordering {
        self.year
            .cmp(&other.year)
            .then(self.time_period_coverage.cmp(&other.time_period_coverage))
            .then(self.created.cmp(&other.created))
    }
}

/// Builder for [`ReleaseVersion`]
pub struct ReleaseVersionBuilder {
    id: ReleaseVersionId,
    release_id: ReleaseId,
    publication_id: PublicationId,
    slug: Option<String>,
    title: Option<String>,
    year: i32,
    time_period_coverage: TimePeriodCoverage,
    version: u32,
    created: Option<DateTime<Utc>>,
    published: Option<DateTime<Utc>>,
    previous_version_id: Option<ReleaseVersionId>,
    notify_subscribers: bool,
}

impl ReleaseVersionBuilder {
    /// Create a new builder
    pub fn new(id: ReleaseVersionId, release_id: ReleaseId, publication_id: PublicationId) -> Self {
        Self {
            id,
            release_id,
            publication_id,
            slug: None,
            title: None,
            year: 2000,
            time_period_coverage: TimePeriodCoverage::AcademicYear,
            version: 0,
            created: None,
            published: None,
            previous_version_id: None,
            notify_subscribers: true,
        }
    }

    /// Set the release slug
    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// Set the release title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the year and time period the release covers
    pub fn period(mut self, year: i32, coverage: TimePeriodCoverage) -> Self {
        self.year = year;
        self.time_period_coverage = coverage;
        self
    }

    /// Mark this version as an amendment of `previous`
    pub fn amends(mut self, previous: ReleaseVersionId, version: u32) -> Self {
        self.previous_version_id = Some(previous);
        self.version = version;
        self
    }

    /// Set the creation timestamp
    pub fn created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    /// Set the published timestamp
    pub fn published(mut self, published: DateTime<Utc>) -> Self {
        self.published = Some(published);
        self
    }

    /// Set whether subscribers are notified
    pub fn notify_subscribers(mut self, notify: bool) -> Self {
        self.notify_subscribers = notify;
        self
    }

    /// Build the release version
    pub fn build(self) -> ReleaseVersion {
        let slug = self
            .slug
            .unwrap_or_else(|| format!("{}-{}", self.year, self.time_period_coverage.code()));
        ReleaseVersion {
            id: self.id,
            release_id: self.release_id,
            publication_id: self.publication_id,
            title: self.title.unwrap_or_else(|| slug.clone()),
            slug,
            year: self.year,
            time_period_coverage: self.time_period_coverage,
            version: self.version,
            created: self.created.unwrap_or_else(Utc::now),
            published: self.published,
            previous_version_id: self.previous_version_id,
            notify_subscribers: self.notify_subscribers,
        }
    }
}

/// Publication projection used by the publishing pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    /// Publication identifier
    pub id: PublicationId,

    /// URL slug
    pub slug: String,

    /// Title
    pub title: String,

    /// Short summary shown on the public site
    pub summary: String,

    /// Pointer to the latest published release version
    pub latest_published_release_version_id: Option<ReleaseVersionId>,
}

/// Kind of slug redirect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectKind {
    /// A publication slug was renamed
    Publication,
    /// A release slug was renamed within a publication
    Release,
}

/// One slug redirect served by the public site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    /// What kind of slug moved
    pub kind: RedirectKind,

    /// Owning publication slug for release redirects
    pub publication_slug: Option<String>,

    /// Old slug
    pub from_slug: String,

    /// New slug
    pub to_slug: String,
}

/// Summary of a release version whose metadata update succeeded
///
/// Lives only for the duration of a run and feeds the batched notification
/// and event steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedReleaseVersionInfo {
    /// Release version identifier
    pub release_version_id: ReleaseVersionId,

    /// Logical release identifier
    pub release_id: ReleaseId,

    /// Release slug
    pub release_slug: String,

    /// Owning publication identifier
    pub publication_id: PublicationId,

    /// Owning publication slug
    pub publication_slug: String,

    /// Owning publication title
    pub publication_title: String,

    /// Latest published release version of the publication after this run
    pub publication_latest_published_release_version_id: Option<ReleaseVersionId>,

    /// Whether this version amends a previously published one
    pub is_amendment: bool,

    /// Whether this version is now the publication's latest
    pub is_latest_version: bool,
}
