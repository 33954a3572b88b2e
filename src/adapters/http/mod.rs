//! HTTP adapters for blob storage, notifications and events

pub mod client;
pub mod event_bus;
pub mod notifier;
pub mod storage;

pub use event_bus::HttpEventBus;
pub use notifier::HttpNotificationChannel;
pub use storage::HttpBlobStorage;
