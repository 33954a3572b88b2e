//! Publishing state machine
//!
//! A publishing attempt is modelled as a tagged union ([`PublishingState`])
//! rather than two independently settable fields, so an illegal combination
//! such as "complete but failed at the data step" cannot be represented.
//! [`OverallStage`] is the flattened projection used for queries and for the
//! `overall_stage` column.

use crate::domain::{PublisherError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordered milestones of a publishing attempt that is still running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PipelineStage {
    Started,
    ContentPublished,
    DataPublished,
    MethodologyPublished,
    CachePublished,
    NotificationsSent,
    EventsRaised,
}

impl PipelineStage {
    /// All stages in pipeline order
    pub const ALL: [PipelineStage; 7] = [
        Self::Started,
        Self::ContentPublished,
        Self::DataPublished,
        Self::MethodologyPublished,
        Self::CachePublished,
        Self::NotificationsSent,
        Self::EventsRaised,
    ];

    /// Name used in logs and in the status table
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "Started",
            Self::ContentPublished => "ContentPublished",
            Self::DataPublished => "DataPublished",
            Self::MethodologyPublished => "MethodologyPublished",
            Self::CachePublished => "CachePublished",
            Self::NotificationsSent => "NotificationsSent",
            Self::EventsRaised => "EventsRaised",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Granular step within the pipeline
///
/// Each step belongs to the stage it completes. A failing step marks the
/// attempt `Failed` at that stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PublishingStep {
    LoadMetadata,
    StampPublished,
    ResolveLatestVersion,
    PublishDataSets,
    PublishMethodologies,
    RemoveSupersededArtifacts,
    RefreshTaxonomy,
    UpdateCache,
    NotifySubscribers,
    RaiseEvents,
}

impl PublishingStep {
    /// Stage this step completes
    pub fn target_stage(&self) -> PipelineStage {
        match self {
            Self::LoadMetadata | Self::StampPublished | Self::ResolveLatestVersion => {
                PipelineStage::ContentPublished
            }
            Self::PublishDataSets => PipelineStage::DataPublished,
            Self::PublishMethodologies => PipelineStage::MethodologyPublished,
            Self::RemoveSupersededArtifacts | Self::RefreshTaxonomy | Self::UpdateCache => {
                PipelineStage::CachePublished
            }
            Self::NotifySubscribers => PipelineStage::NotificationsSent,
            Self::RaiseEvents => PipelineStage::EventsRaised,
        }
    }

    /// Name used in logs and in the status table
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoadMetadata => "LoadMetadata",
            Self::StampPublished => "StampPublished",
            Self::ResolveLatestVersion => "ResolveLatestVersion",
            Self::PublishDataSets => "PublishDataSets",
            Self::PublishMethodologies => "PublishMethodologies",
            Self::RemoveSupersededArtifacts => "RemoveSupersededArtifacts",
            Self::RefreshTaxonomy => "RefreshTaxonomy",
            Self::UpdateCache => "UpdateCache",
            Self::NotifySubscribers => "NotifySubscribers",
            Self::RaiseEvents => "RaiseEvents",
        }
    }
}

impl fmt::Display for PublishingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PublishingStep {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        const STEPS: [PublishingStep; 10] = [
            PublishingStep::LoadMetadata,
            PublishingStep::StampPublished,
            PublishingStep::ResolveLatestVersion,
            PublishingStep::PublishDataSets,
            PublishingStep::PublishMethodologies,
            PublishingStep::RemoveSupersededArtifacts,
            PublishingStep::RefreshTaxonomy,
            PublishingStep::UpdateCache,
            PublishingStep::NotifySubscribers,
            PublishingStep::RaiseEvents,
        ];
        STEPS
            .into_iter()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| format!("Unknown publishing step: {s}"))
    }
}

/// Flattened overall stage of an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverallStage {
    Started,
    ContentPublished,
    DataPublished,
    MethodologyPublished,
    CachePublished,
    NotificationsSent,
    EventsRaised,
    Complete,
    Failed,
    Superseded,
}

impl OverallStage {
    /// Name used in logs and in the status table
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "Complete",
            Self::Failed => "Failed",
            Self::Superseded => "Superseded",
            other => other
                .in_progress_stage()
                .map(|stage| stage.as_str())
                .unwrap_or("Started"),
        }
    }

    /// Whether no further transitions are expected from this stage
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed | Self::Superseded)
    }

    fn in_progress_stage(&self) -> Option<PipelineStage> {
        match self {
            Self::Started => Some(PipelineStage::Started),
            Self::ContentPublished => Some(PipelineStage::ContentPublished),
            Self::DataPublished => Some(PipelineStage::DataPublished),
            Self::MethodologyPublished => Some(PipelineStage::MethodologyPublished),
            Self::CachePublished => Some(PipelineStage::CachePublished),
            Self::NotificationsSent => Some(PipelineStage::NotificationsSent),
            Self::EventsRaised => Some(PipelineStage::EventsRaised),
            Self::Complete | Self::Failed | Self::Superseded => None,
        }
    }

    /// Stages that are still in progress
    pub fn in_progress() -> Vec<OverallStage> {
        PipelineStage::ALL.into_iter().map(OverallStage::from).collect()
    }
}

impl From<PipelineStage> for OverallStage {
    fn from(stage: PipelineStage) -> Self {
        match stage {
            PipelineStage::Started => Self::Started,
            PipelineStage::ContentPublished => Self::ContentPublished,
            PipelineStage::DataPublished => Self::DataPublished,
            PipelineStage::MethodologyPublished => Self::MethodologyPublished,
            PipelineStage::CachePublished => Self::CachePublished,
            PipelineStage::NotificationsSent => Self::NotificationsSent,
            PipelineStage::EventsRaised => Self::EventsRaised,
        }
    }
}

impl fmt::Display for OverallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverallStage {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "Complete" => Ok(Self::Complete),
            "Failed" => Ok(Self::Failed),
            "Superseded" => Ok(Self::Superseded),
            other => PipelineStage::ALL
                .into_iter()
                .find(|stage| stage.as_str().eq_ignore_ascii_case(other))
                .map(Self::from)
                .ok_or_else(|| format!("Unknown overall stage: {s}")),
        }
    }
}

/// State of one publishing attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PublishingState {
    /// Running; the stage is the last milestone reached
    InProgress { stage: PipelineStage },
    /// Every step succeeded
    Complete,
    /// Stopped at `step`, which was working towards `stage`
    Failed {
        stage: PipelineStage,
        step: PublishingStep,
    },
    /// Replaced by a newer attempt for the same release version
    Superseded,
}

impl PublishingState {
    /// State of a freshly created attempt
    pub const STARTED: PublishingState = PublishingState::InProgress {
        stage: PipelineStage::Started,
    };

    /// Failure of the given step
    pub fn failed_at(step: PublishingStep) -> Self {
        Self::Failed {
            stage: step.target_stage(),
            step,
        }
    }

    /// Flattened projection
    pub fn overall_stage(&self) -> OverallStage {
        match self {
            Self::InProgress { stage } => OverallStage::from(*stage),
            Self::Complete => OverallStage::Complete,
            Self::Failed { .. } => OverallStage::Failed,
            Self::Superseded => OverallStage::Superseded,
        }
    }

    /// Granular step, only recorded for failures
    pub fn publishing_step(&self) -> Option<PublishingStep> {
        match self {
            Self::Failed { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// Whether the attempt has finished
    pub fn is_terminal(&self) -> bool {
        self.overall_stage().is_terminal()
    }

    /// Rebuild a state from its persisted columns
    pub fn from_parts(overall: OverallStage, step: Option<PublishingStep>) -> Result<Self> {
        match (overall, step) {
            (OverallStage::Complete, _) => Ok(Self::Complete),
            (OverallStage::Superseded, _) => Ok(Self::Superseded),
            (OverallStage::Failed, Some(step)) => Ok(Self::failed_at(step)),
            (OverallStage::Failed, None) => Err(PublisherError::Validation(
                "Failed status is missing its publishing step".to_string(),
            )),
            (other, _) => other
                .in_progress_stage()
                .map(|stage| Self::InProgress { stage })
                .ok_or_else(|| {
                    PublisherError::Validation(format!("Unrepresentable stage {other}"))
                }),
        }
    }

    /// Whether the transition table allows moving from `self` to `next`
    ///
    /// Same-state moves are allowed everywhere and only refresh the
    /// timestamp.
    pub fn can_transition_to(&self, next: &PublishingState) -> bool {
        use PublishingState::*;

        if self == next {
            return true;
        }

        match (self, next) {
            (InProgress { stage: from }, InProgress { stage: to }) => to >= from,
            (InProgress { stage: from }, Failed { stage: to, .. }) => to >= from,
            (InProgress { stage }, Complete) => *stage == PipelineStage::EventsRaised,
            (InProgress { .. }, Superseded) => true,
            _ => false,
        }
    }

    /// Validate and apply a transition
    pub fn transition(self, next: PublishingState) -> Result<PublishingState> {
        if self.can_transition_to(&next) {
            Ok(next)
        } else {
            Err(PublisherError::InvalidTransition {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

impl fmt::Display for PublishingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed { stage, step } => write!(f, "Failed({stage}/{step})"),
            other => f.write_str(other.overall_stage().as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn in_progress(stage: PipelineStage) -> PublishingState {
        PublishingState::InProgress { stage }
    }

    #[test_case(PipelineStage::Started, PipelineStage::ContentPublished, true; "started to content")]
    #[test_case(PipelineStage::ContentPublished, PipelineStage::EventsRaised, true; "skipping ahead")]
    #[test_case(PipelineStage::DataPublished, PipelineStage::DataPublished, true; "same stage refresh")]
    #[test_case(PipelineStage::CachePublished, PipelineStage::DataPublished, false; "backwards")]
    #[test_case(PipelineStage::ContentPublished, PipelineStage::Started, false; "back to started")]
    fn test_in_progress_transitions(from: PipelineStage, to: PipelineStage, allowed: bool) {
        assert_eq!(in_progress(from).can_transition_to(&in_progress(to)), allowed);
    }

    #[test_case(PipelineStage::ContentPublished, PublishingStep::PublishDataSets, true; "data failure after content")]
    #[test_case(PipelineStage::Started, PublishingStep::LoadMetadata, true; "metadata failure")]
    #[test_case(PipelineStage::NotificationsSent, PublishingStep::RaiseEvents, true; "event failure")]
    #[test_case(PipelineStage::CachePublished, PublishingStep::PublishDataSets, false; "failure behind current stage")]
    fn test_failure_transitions(from: PipelineStage, step: PublishingStep, allowed: bool) {
        let next = PublishingState::failed_at(step);
        assert_eq!(in_progress(from).can_transition_to(&next), allowed);
    }

    #[test_case(PipelineStage::EventsRaised, true; "after events")]
    #[test_case(PipelineStage::NotificationsSent, false; "before events")]
    #[test_case(PipelineStage::Started, false; "from started")]
    fn test_complete_requires_events_raised(from: PipelineStage, allowed: bool) {
        assert_eq!(
            in_progress(from).can_transition_to(&PublishingState::Complete),
            allowed
        );
    }

    #[test]
    fn test_any_in_progress_can_be_superseded() {
        for stage in PipelineStage::ALL {
            assert!(in_progress(stage).can_transition_to(&PublishingState::Superseded));
        }
    }

    #[test_case(PublishingState::Complete; "complete")]
    #[test_case(PublishingState::Superseded; "superseded")]
    #[test_case(PublishingState::failed_at(PublishingStep::UpdateCache); "failed")]
    fn test_terminal_states_only_refresh(state: PublishingState) {
        assert!(state.is_terminal());
        assert!(state.can_transition_to(&state));
        assert!(!state.can_transition_to(&PublishingState::STARTED));
        assert!(!state.can_transition_to(&in_progress(PipelineStage::EventsRaised)));
    }

    #[test]
    fn test_complete_cannot_be_superseded() {
        assert!(!PublishingState::Complete.can_transition_to(&PublishingState::Superseded));
        let failed = PublishingState::failed_at(PublishingStep::RaiseEvents);
        assert!(!failed.can_transition_to(&PublishingState::Complete));
    }

    #[test]
    fn test_transition_error_names_both_states() {
        let err = PublishingState::Complete
            .transition(PublishingState::STARTED)
            .unwrap_err();
        assert!(matches!(err, PublisherError::InvalidTransition { .. }));
        assert!(err.to_string().contains("Complete"));
        assert!(err.to_string().contains("Started"));
    }

    #[test]
    fn test_failed_stage_comes_from_step() {
        let state = PublishingState::failed_at(PublishingStep::PublishDataSets);
        assert_eq!(
            state,
            PublishingState::Failed {
                stage: PipelineStage::DataPublished,
                step: PublishingStep::PublishDataSets
            }
        );
        assert_eq!(state.overall_stage(), OverallStage::Failed);
        assert_eq!(state.to_string(), "Failed(DataPublished/PublishDataSets)");
    }

    #[test]
    fn test_from_parts_rebuilds_state() {
        let failed = PublishingState::failed_at(PublishingStep::NotifySubscribers);
        let rebuilt =
            PublishingState::from_parts(failed.overall_stage(), failed.publishing_step()).unwrap();
        assert_eq!(rebuilt, failed);

        let running = in_progress(PipelineStage::CachePublished);
        assert_eq!(
            PublishingState::from_parts(running.overall_stage(), None).unwrap(),
            running
        );

        assert!(PublishingState::from_parts(OverallStage::Failed, None).is_err());
    }

    #[test]
    fn test_overall_stage_parse() {
        assert_eq!(
            OverallStage::from_str("Complete").unwrap(),
            OverallStage::Complete
        );
        assert_eq!(
            OverallStage::from_str("datapublished").unwrap(),
            OverallStage::DataPublished
        );
        assert!(OverallStage::from_str("Pending").is_err());
    }

    #[test]
    fn test_step_parse() {
        assert_eq!(
            PublishingStep::from_str("RaiseEvents").unwrap(),
            PublishingStep::RaiseEvents
        );
        assert!(PublishingStep::from_str("Render").is_err());
    }

    #[test]
    fn test_in_progress_stages() {
        let stages = OverallStage::in_progress();
        assert_eq!(stages.len(), 7);
        assert!(stages.iter().all(|stage| !stage.is_terminal()));
    }
}
