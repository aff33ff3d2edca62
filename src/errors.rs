use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogSliceError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for LogSliceError {
    fn from(err: std::io::Error) -> Self {
        LogSliceError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let err = LogSliceError::Validation("date must match DD-MM-YYYY".to_string());
        assert_eq!(err.to_string(), "Validation error: date must match DD-MM-YYYY");
    }

    #[test]
    fn test_not_found_display() {
        let err = LogSliceError::NotFound("job 7".to_string());
        assert_eq!(err.to_string(), "Not found: job 7");
    }

    #[test]
    fn test_storage_display() {
        let err = LogSliceError::Storage("disk full".to_string());
        assert_eq!(err.to_string(), "Storage error: disk full");
    }

    #[test]
    fn test_internal_display() {
        let err = LogSliceError::Internal("worker panicked".to_string());
        assert_eq!(err.to_string(), "Internal error: worker panicked");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "application.log missing");
        let err: LogSliceError = io_err.into();
        match err {
            LogSliceError::Storage(msg) => assert!(msg.contains("application.log missing")),
            other => panic!("Expected Storage, got: {:?}", other),
        }
    }
}
