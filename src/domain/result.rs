//! Result type alias for the publisher

use super::errors::PublisherError;

/// Result type alias for publisher operations
///
/// # Examples
///
/// ```
/// use release_publisher::domain::result::Result;
/// use release_publisher::domain::errors::PublisherError;
///
/// fn failing_function() -> Result<()> {
///     Err(PublisherError::Validation("Invalid input".to_string()))
/// }
///
/// assert!(failing_function().is_err());
/// ```
pub type Result<T> = std::result::Result<T, PublisherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Err(PublisherError::not_found("Publication", "x"))
        }

        let err = inner().unwrap_err();
        assert!(err.is_not_found());
        Ok(())
    }
}
