//! Error types for schema frontends and the CLI.

use schema_compare_core::CompareError;

/// Errors that can occur while reading schema sources or comparing them.
#[derive(Debug, thiserror::Error)]
pub enum FrontendError {
    /// The source descriptor is empty, malformed or points nowhere.
    #[error("Invalid schema source: {0}")]
    InvalidSource(String),

    /// The source exists but no valid schema graph could be built from it.
    #[error("Failed to extract schema from '{descriptor}': {message}")]
    SchemaExtraction {
        /// The source descriptor as given.
        descriptor: String,
        /// What went wrong.
        message: String,
    },

    /// The comparison itself failed.
    #[error(transparent)]
    Compare(#[from] CompareError),

    /// IO error (reading snapshot documents).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FrontendError {
    /// Creates a [`FrontendError::SchemaExtraction`] for a descriptor.
    pub fn extraction(descriptor: impl Into<String>, message: impl ToString) -> Self {
        Self::SchemaExtraction {
            descriptor: descriptor.into(),
            message: message.to_string(),
        }
    }
}

/// Result type for frontend operations.
pub type Result<T> = std::result::Result<T, FrontendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_message_names_descriptor() {
        let err = FrontendError::extraction("sqlite:hrm.db", "no such table");
        assert_eq!(
            err.to_string(),
            "Failed to extract schema from 'sqlite:hrm.db': no such table"
        );
    }

    #[test]
    fn compare_errors_are_transparent() {
        let err: FrontendError = CompareError::InvalidGraph("x".to_string()).into();
        assert_eq!(err.to_string(), "Invalid schema graph: x");
    }
}
