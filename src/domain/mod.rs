//! Domain models and types for the release publisher.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`ReleaseVersionId`], [`PublicationId`], [`ReleasePublishingKey`])
//! - **Domain models** ([`ReleaseVersion`], [`Publication`], [`MethodologyVersion`])
//! - **Error types** ([`PublisherError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Identifiers are UUID newtypes, so ids of different entities can't be mixed:
//!
//! ```rust
//! use release_publisher::domain::{PublicationId, ReleaseVersionId};
//! use std::str::FromStr;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let release_version_id = ReleaseVersionId::from_str("7d44b88c-4199-4bad-97dc-d78268e01398")?;
//! let publication_id = PublicationId::new_v4();
//!
//! // This won't compile
//! // let wrong: ReleaseVersionId = publication_id;
//! # let _ = (release_version_id, publication_id);
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, PublisherError>`]:
//!
//! ```rust
//! use release_publisher::domain::Result;
//!
//! fn example() -> Result<()> {
//!     let config = release_publisher::config::PublisherConfig::from_file("publisher.toml")?;
//!     # let _ = config;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod ids;
pub mod methodology;
pub mod release;
pub mod result;
pub mod subscriber;

// Re-export commonly used types for convenience
pub use errors::{DataSetFailure, PublisherError};
pub use ids::{
    AttemptId, DataSetId, MethodologyId, MethodologyVersionId, PublicationId, ReleaseId,
    ReleasePublishingKey, ReleaseVersionId, SubscriberId,
};
pub use methodology::{MethodologyStatus, MethodologyVersion, PublishingStrategy};
pub use release::{
    PublishedReleaseVersionInfo, Publication, Redirect, RedirectKind, ReleaseVersion,
    ReleaseVersionBuilder, TimePeriodCoverage,
};
pub use result::Result;
pub use subscriber::Subscriber;
