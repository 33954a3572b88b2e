// Publishing state machine and status tracking

pub mod stage;
pub mod status;
pub mod store;

pub use stage::{OverallStage, PipelineStage, PublishingState, PublishingStep};
pub use status::{ReleasePublishingStatus, ReleasePublishingStatusBuilder};
pub use store::PublishingStatusStore;
