//! Error types for the transformer.
//!
//! Uses the layered-error pattern: `TransformError` for run-level failures
//! that abort before or during a run, `RecordError` for a single rejected
//! record, and `FieldError` for the outcome of one field handler.

use thiserror::Error;

/// Main error type for the transformer library.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Source name is not one of the configured sources.
    #[error("Unknown source: '{0}'. Expected one of: {1}")]
    UnknownSource(String, String),

    /// Handler registry or runtime configuration is unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// XML stream could not be read.
    #[error("XML stream error at byte {position}: {message}")]
    XmlStream { position: u64, message: String },

    /// Output serialization failed.
    #[error("JSON serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for transformer operations.
pub type Result<T> = std::result::Result<T, TransformError>;

/// Reason a single record was rejected.
///
/// Record-level errors never abort the run; the runner logs them and
/// counts the record as skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// The assembled record violates a model invariant, lacks a mandatory
    /// field, or is excluded by a source rule.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The payload could not be parsed or lacks the structure its format
    /// requires.
    #[error("Malformed record: {0}")]
    Structural(String),
}

/// Outcome of a failed field handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// The field could not be extracted; it is omitted and the record
    /// continues.
    #[error("{0}")]
    Extraction(String),

    /// The payload lacks structure this source requires; the record is
    /// rejected.
    #[error("{0}")]
    Structural(String),

    /// A source rule excludes the record; the record is rejected.
    #[error("{0}")]
    Excluded(String),
}

impl FieldError {
    /// Escalate to a record-level error, if this outcome rejects the record.
    #[must_use]
    pub fn into_record_error(self) -> Option<RecordError> {
        match self {
            Self::Extraction(_) => None,
            Self::Structural(msg) => Some(RecordError::Structural(msg)),
            Self::Excluded(msg) => Some(RecordError::Validation(msg)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TransformError::UnknownSource("nope".to_string(), "alma, aspace".to_string());
        assert!(err.to_string().contains("nope"));
        assert!(err.to_string().contains("alma, aspace"));
    }

    #[test]
    fn test_xml_stream_error_display() {
        let err = TransformError::XmlStream {
            position: 42,
            message: "unexpected end".to_string(),
        };
        assert_eq!(err.to_string(), "XML stream error at byte 42: unexpected end");
    }

    #[test]
    fn test_field_error_escalation() {
        assert_eq!(FieldError::Extraction("x".into()).into_record_error(), None);
        assert_eq!(
            FieldError::Structural("no leader".into()).into_record_error(),
            Some(RecordError::Structural("no leader".into()))
        );
        assert_eq!(
            FieldError::Excluded("bad type".into()).into_record_error(),
            Some(RecordError::Validation("bad type".into()))
        );
    }
}
