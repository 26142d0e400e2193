//! Error types for report export.

use thiserror::Error;

/// Errors that can occur while exporting a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Failed to serialize or parse a report
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failed to write a report to disk
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for report operations.
pub type ReportResult<T> = Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReportError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only",
        ));
        assert_eq!(err.to_string(), "I/O error: read-only");
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_err: Result<(), serde_json::Error> = serde_json::from_str::<()>("invalid json");
        let err: ReportError = json_err.unwrap_err().into();
        assert!(matches!(err, ReportError::Serialization(_)));
    }
}
