//! Caller-imposed deadlines for external calls

use crate::domain::{PublisherError, Result};
use std::future::Future;
use std::time::Duration;

/// Deadline used when a caller does not configure one
pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(60);

/// Run `future`, failing with [`PublisherError::Timeout`] after `limit`
///
/// A timed out call is a failure of the step that made it. It is not
/// retried.
pub async fn with_timeout<T, F>(operation: &'static str, limit: Duration, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => Err(PublisherError::Timeout {
            operation,
            seconds: limit.as_secs(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fast_call_passes_through() {
        let value = with_timeout("lookup", Duration::from_secs(1), async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_inner_error_is_kept() {
        let err = with_timeout::<(), _>("lookup", Duration::from_secs(1), async {
            Err(PublisherError::Storage("503".to_string()))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, PublisherError::Storage(_)));
    }

    #[tokio::test]
    async fn test_slow_call_times_out() {
        let err = with_timeout("complete_publishing", Duration::from_millis(20), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            PublisherError::Timeout {
                operation: "complete_publishing",
                seconds: 0
            }
        ));
        assert!(err.is_transient());
    }
}
