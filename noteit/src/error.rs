//! Error types for noteit
//!
//! All errors use thiserror for structured error handling.
//! The orchestrator converts every variant into view state, so nothing
//! here ever reaches the render sink as a fault.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Source '{source_name}' answered with status {status}")]
    Status { source_name: String, status: u16 },

    #[error("Note not found: {0}")]
    NoteNotFound(String),

    /// Every configured read source failed
    #[error("All note sources exhausted ({attempted} attempted)")]
    Unavailable { attempted: usize },

    #[error("Failed to {op}: {reason}")]
    WriteFailed { op: &'static str, reason: String },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Wrap an adapter failure raised during a write operation
    pub fn write_failed(op: &'static str, err: AppError) -> Self {
        AppError::WriteFailed {
            op,
            reason: err.to_string(),
        }
    }
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_failed_keeps_reason() {
        let err = AppError::write_failed("create note", AppError::Generic("boom".to_string()));
        assert_eq!(err.to_string(), "Failed to create note: boom");
    }

    #[test]
    fn test_serializes_as_message() {
        let err = AppError::Unavailable { attempted: 2 };
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, "\"All note sources exhausted (2 attempted)\"");
    }
}
