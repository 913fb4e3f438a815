use thiserror::Error;

/// Failure classes that come from bad user input rather than from storage.
///
/// Anything not covered here is carried as a plain `anyhow::Error` and is
/// treated as an internal failure by `main` (see `cli::error`).
#[derive(Debug, Error)]
pub enum TrackerError {
    /// A task name did not resolve to a registered task.
    #[error("task '{0}' not found")]
    NotFound(String),

    /// Registering or renaming collided with an existing task name.
    /// Name matching is case-insensitive.
    #[error("task '{0}' already exists")]
    Duplicate(String),

    /// The request was rejected before storage was touched.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = TrackerError::NotFound("writing".to_string());
        assert_eq!(err.to_string(), "task 'writing' not found");
    }

    #[test]
    fn test_duplicate_message() {
        let err = TrackerError::Duplicate("writing".to_string());
        assert_eq!(err.to_string(), "task 'writing' already exists");
    }

    #[test]
    fn test_invalid_request_message() {
        let err = TrackerError::InvalidRequest("nothing to change".to_string());
        assert_eq!(err.to_string(), "invalid request: nothing to change");
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let err: anyhow::Error = TrackerError::NotFound("x".to_string()).into();
        assert!(err.downcast_ref::<TrackerError>().is_some());
    }
}
