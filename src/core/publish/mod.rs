//! Publishing completion
//!
//! This module provides the batch orchestration that takes approved release
//! versions live, including:
//! - The orchestrator and its request/options types
//! - Latest published release version resolution
//! - Per-call deadlines
//! - Summary and reporting

pub mod coordinator;
pub mod latest;
pub mod summary;
pub mod timeout;

pub use coordinator::{OrchestratorOptions, PublishRequest, PublishingCompletionOrchestrator};
pub use latest::{decide, latest_in_batch, LatestDecision};
pub use summary::{CompletionSummary, OutcomeKind, ReleaseOutcome};
pub use timeout::with_timeout;
