//! Services cooperating in the publishing pipeline
//!
//! Each service owns one concern and talks to its external systems only
//! through the gateway traits in [`crate::adapters::gateways`].

pub mod cache;
pub mod content;
pub mod data_sets;
pub mod events;
pub mod methodology;
pub mod notifications;

pub use cache::{CacheInvalidationService, PublicationCacheViewModel, RedirectsViewModel};
pub use content::{ContentArtifactService, ContentContainers};
pub use data_sets::DataSetPublishingService;
pub use events::{EventRaiserService, ReleaseVersionPublishedEvent};
pub use methodology::MethodologyPublishingService;
pub use notifications::{NotificationMessage, NotificationOutcome, NotificationService};
