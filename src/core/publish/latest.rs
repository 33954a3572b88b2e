//! Latest published release version resolution
//!
//! A publication's "latest published release version" pointer must end up
//! on the most recent version by year, then time period coverage, then
//! creation time. Every version of the publication in the batch is
//! considered before the pointer moves, so the answer does not depend on
//! processing order.

use crate::domain::{ReleaseVersion, ReleaseVersionId};
use std::cmp::Ordering;

/// Outcome of comparing the batch against existing published versions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatestDecision {
    /// Move the pointer to this batch version
    Promote(ReleaseVersionId),
    /// Keep the existing latest version
    KeepExisting(ReleaseVersionId),
}

impl LatestDecision {
    /// Latest published release version after the decision
    pub fn latest_id(&self) -> ReleaseVersionId {
        match self {
            Self::Promote(id) | Self::KeepExisting(id) => *id,
        }
    }
}

/// Most recent version among `batch`
///
/// Ties go to the version that appears later in the batch.
pub fn latest_in_batch<'a>(batch: &[&'a ReleaseVersion]) -> Option<&'a ReleaseVersion> {
    batch.iter().copied().fold(None, |best, candidate| match best {
        Some(best) if candidate.compare_recency(best) == Ordering::Less => Some(best),
        _ => Some(candidate),
    })
}

/// Decide whether `candidate` replaces `existing` as the latest version
///
/// Ties with an existing version go to the candidate.
pub fn decide(candidate: &ReleaseVersion, existing: Option<&ReleaseVersion>) -> LatestDecision {
    match existing {
        Some(existing) if candidate.compare_recency(existing) == Ordering::Less => {
            LatestDecision::KeepExisting(existing.id)
        }
        _ => LatestDecision::Promote(candidate.id),
    }
}
