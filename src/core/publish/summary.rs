//! Completion summary and reporting
//!
//! One [`ReleaseOutcome`] per release version handed to the orchestrator,
//! in input order, plus the batch-level warnings.

use crate::core::state::PublishingStep;
use crate::domain::ids::{AttemptId, ReleasePublishingKey, ReleaseVersionId};
use serde::Serialize;
use std::time::Duration;

/// How a release version left the batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Every step succeeded
    Complete,
    /// Stopped at `step`
    Failed {
        step: PublishingStep,
        message: String,
    },
    /// An earlier attempt already completed; nothing was done
    Skipped,
    /// Cancelled before publishing began
    NotStarted,
}

/// Result for one release version in the batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseOutcome {
    /// Release version
    pub release_version_id: ReleaseVersionId,

    /// Attempt used, if a status row was written
    pub attempt_id: Option<AttemptId>,

    /// Result
    #[serde(flatten)]
    pub kind: OutcomeKind,

    /// Non-fatal warnings recorded against the attempt
    pub warnings: Vec<String>,
}

impl ReleaseOutcome {
    /// A release that reached `Complete`
    pub fn complete(key: ReleasePublishingKey, warnings: Vec<String>) -> Self {
        Self {
            release_version_id: key.release_version_id,
            attempt_id: Some(key.attempt_id),
            kind: OutcomeKind::Complete,
            warnings,
        }
    }

    /// A release that failed at `step`
    pub fn failed(
        release_version_id: ReleaseVersionId,
        attempt_id: Option<AttemptId>,
        step: PublishingStep,
        message: impl Into<String>,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            release_version_id,
            attempt_id,
            kind: OutcomeKind::Failed {
                step,
                message: message.into(),
            },
            warnings,
        }
    }

    /// A release skipped because it already completed
    pub fn skipped(release_version_id: ReleaseVersionId) -> Self {
        Self {
            release_version_id,
            attempt_id: None,
            kind: OutcomeKind::Skipped,
            warnings: Vec::new(),
        }
    }

    /// A release left untouched after cancellation
    pub fn not_started(release_version_id: ReleaseVersionId) -> Self {
        Self {
            release_version_id,
            attempt_id: None,
            kind: OutcomeKind::NotStarted,
            warnings: Vec::new(),
        }
    }

    /// Whether the release failed
    pub fn is_failed(&self) -> bool {
        matches!(self.kind, OutcomeKind::Failed { .. })
    }
}

/// Summary of one orchestrator run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionSummary {
    /// Per-release results in input order
    pub outcomes: Vec<ReleaseOutcome>,

    /// Warnings that apply to the whole batch
    pub batch_warnings: Vec<String>,

    /// Wall-clock duration of the run
    #[serde(serialize_with = "serialize_duration_ms", rename = "durationMs")]
    pub duration: Duration,
}

fn serialize_duration_ms<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u128(duration.as_millis())
}

impl CompletionSummary {
    /// Create a summary from outcomes, ordered as `input`
    pub fn new(
        mut outcomes: Vec<ReleaseOutcome>,
        input: &[ReleaseVersionId],
        batch_warnings: Vec<String>,
        duration: Duration,
    ) -> Self {
        outcomes.sort_by_key(|outcome| {
            input
                .iter()
                .position(|id| *id == outcome.release_version_id)
                .unwrap_or(usize::MAX)
        });

        Self {
            outcomes,
            batch_warnings,
            duration,
        }
    }

    fn count(&self, predicate: impl Fn(&OutcomeKind) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| predicate(&outcome.kind))
            .count()
    }

    /// Release versions that reached `Complete`
    pub fn complete_count(&self) -> usize {
        self.count(|kind| *kind == OutcomeKind::Complete)
    }

    /// Release versions that failed
    pub fn failed_count(&self) -> usize {
        self.count(|kind| matches!(kind, OutcomeKind::Failed { .. }))
    }

    /// Release versions skipped as already complete
    pub fn skipped_count(&self) -> usize {
        self.count(|kind| *kind == OutcomeKind::Skipped)
    }

    /// Release versions never started because of cancellation
    pub fn not_started_count(&self) -> usize {
        self.count(|kind| *kind == OutcomeKind::NotStarted)
    }

    /// Release versions that were attempted in this run
    pub fn attempted_count(&self) -> usize {
        self.complete_count() + self.failed_count()
    }

    /// Whether every release in the batch failed
    ///
    /// Skipped and not started releases did not fail, so a batch holding
    /// any of them is not an all-failed batch.
    pub fn all_failed(&self) -> bool {
        self.failed_count() > 0 && self.failed_count() == self.outcomes.len()
    }

    /// Whether some releases failed and some completed
    pub fn is_partial(&self) -> bool {
        self.failed_count() > 0 && self.complete_count() > 0
    }

    /// Whether nothing failed and nothing was left unstarted
    pub fn is_successful(&self) -> bool {
        self.failed_count() == 0 && self.not_started_count() == 0
    }

    /// Outcomes that failed
    pub fn failures(&self) -> impl Iterator<Item = &ReleaseOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.is_failed())
    }

    /// Total warnings, per release and batch-level
    pub fn warning_count(&self) -> usize {
        self.batch_warnings.len()
            + self
                .outcomes
                .iter()
                .map(|outcome| outcome.warnings.len())
                .sum::<usize>()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            total = self.outcomes.len(),
            complete = self.complete_count(),
            failed = self.failed_count(),
            skipped = self.skipped_count(),
            not_started = self.not_started_count(),
            warnings = self.warning_count(),
            duration_ms = self.duration.as_millis() as u64,
            "Publishing completion finished"
        );

        for outcome in self.failures() {
            if let OutcomeKind::Failed { step, message } = &outcome.kind {
                tracing::warn!(
                    release_version_id = %outcome.release_version_id,
                    step = %step,
                    error = %message,
                    "Release version failed"
                );
            }
        }
    }
}
