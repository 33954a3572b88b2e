//! Logging and observability
//!
//! Structured logging through `tracing`, with a console layer and an
//! optional JSON file layer. The macros below keep field names consistent
//! across the pipeline so log queries can filter on `release_version_id`,
//! `attempt_id` and `stage`.
//!
//! # Example
//!
//! ```no_run
//! use release_publisher::logging::init_logging;
//! use release_publisher::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Publisher started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a status row write
///
/// # Example
///
/// ```no_run
/// use release_publisher::log_stage_recorded;
/// use release_publisher::core::state::PublishingState;
/// use release_publisher::domain::{ReleasePublishingKey, ReleaseVersionId};
///
/// let key = ReleasePublishingKey::new_attempt(ReleaseVersionId::new_v4());
/// log_stage_recorded!(key, PublishingState::STARTED);
/// ```
#[macro_export]
macro_rules! log_stage_recorded {
    ($key:expr, $state:expr) => {
        tracing::debug!(
            release_version_id = %$key.release_version_id,
            attempt_id = %$key.attempt_id,
            stage = %$state,
            "Recorded publishing stage"
        );
    };
}

/// Log a release dropping out of the batch
///
/// # Example
///
/// ```no_run
/// use release_publisher::log_release_failed;
/// use release_publisher::core::state::PublishingStep;
/// use release_publisher::domain::{PublisherError, ReleasePublishingKey, ReleaseVersionId};
///
/// let key = ReleasePublishingKey::new_attempt(ReleaseVersionId::new_v4());
/// let error = PublisherError::Storage("503".to_string());
/// log_release_failed!(key, PublishingStep::PublishDataSets, &error);
/// ```
#[macro_export]
macro_rules! log_release_failed {
    ($key:expr, $step:expr, $error:expr) => {
        tracing::error!(
            release_version_id = %$key.release_version_id,
            attempt_id = %$key.attempt_id,
            step = %$step,
            error = %$error,
            "Release version failed to publish"
        );
    };
}

/// Log a non-fatal warning recorded against a release
///
/// # Example
///
/// ```no_run
/// use release_publisher::log_step_warning;
/// use release_publisher::core::state::PublishingStep;
/// use release_publisher::domain::{ReleasePublishingKey, ReleaseVersionId};
///
/// let key = ReleasePublishingKey::new_attempt(ReleaseVersionId::new_v4());
/// log_step_warning!(key, PublishingStep::UpdateCache, "publication not found");
/// ```
#[macro_export]
macro_rules! log_step_warning {
    ($key:expr, $step:expr, $message:expr) => {
        tracing::warn!(
            release_version_id = %$key.release_version_id,
            attempt_id = %$key.attempt_id,
            step = %$step,
            message = %$message,
            "Non-fatal publishing warning"
        );
    };
}
