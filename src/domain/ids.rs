//! Domain identifier types
//!
//! Newtype wrappers around [`Uuid`] so a release version id can never be
//! passed where a publication id is expected. Each wrapper parses from and
//! displays as the hyphenated UUID form used by the relational store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Wraps an existing UUID
            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Generates a fresh random identifier
            pub fn new_v4() -> Self {
                Self(Uuid::new_v4())
            }

            /// Returns the inner UUID
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Consumes self and returns the inner UUID
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0.hyphenated())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|e| format!("Invalid {} '{}': {}", $label, s, e))
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_id!(
    /// Identifies one immutable, publishable snapshot of a release
    ReleaseVersionId,
    "release version id"
);

uuid_id!(
    /// Identifies the logical release shared by all of its versions
    ReleaseId,
    "release id"
);

uuid_id!(
    /// Identifies a publication
    PublicationId,
    "publication id"
);

uuid_id!(
    /// Identifies one execution of the completion pipeline
    AttemptId,
    "attempt id"
);

uuid_id!(
    /// Identifies a data set owned by a release
    DataSetId,
    "data set id"
);

uuid_id!(
    /// Identifies a methodology shared by all of its versions
    MethodologyId,
    "methodology id"
);

uuid_id!(
    /// Identifies a methodology version
    MethodologyVersionId,
    "methodology version id"
);

uuid_id!(
    /// Identifies an email subscriber
    SubscriberId,
    "subscriber id"
);

/// Identifies one publishing attempt for one release version
///
/// Retries of the same release version get a new [`AttemptId`] so each
/// attempt keeps its own status row.
///
/// # Examples
///
/// ```
/// use release_publisher::domain::ids::{ReleasePublishingKey, ReleaseVersionId};
///
/// let release_version_id = ReleaseVersionId::new_v4();
/// let key = ReleasePublishingKey::new_attempt(release_version_id);
/// assert_eq!(key.release_version_id, release_version_id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleasePublishingKey {
    /// Release version being published
    pub release_version_id: ReleaseVersionId,

    /// Attempt identifier
    pub attempt_id: AttemptId,
}

impl ReleasePublishingKey {
    /// Creates a key from both parts
    pub const fn new(release_version_id: ReleaseVersionId, attempt_id: AttemptId) -> Self {
        Self {
            release_version_id,
            attempt_id,
        }
    }

    /// Mints a key with a fresh attempt id
    pub fn new_attempt(release_version_id: ReleaseVersionId) -> Self {
        Self::new(release_version_id, AttemptId::new_v4())
    }
}

impl fmt::Display for ReleasePublishingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.release_version_id, self.attempt_id)
    }
}
