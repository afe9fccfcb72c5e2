//! Error types for schema comparison.

/// Errors that can occur while validating or comparing schema graphs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompareError {
    /// A graph violates its structural invariants (a column without an
    /// owning table, a dangling foreign key endpoint, a duplicate element).
    #[error("Invalid schema graph: {0}")]
    InvalidGraph(String),

    /// The matcher could not order two candidate pairings. The tie-break
    /// order is total, so this indicates an internal-consistency bug.
    #[error("Match contradiction: {0}")]
    MatchContradiction(String),

    /// Several invariant violations were found in one graph.
    #[error("Multiple errors occurred:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Multiple(Vec<CompareError>),
}

impl CompareError {
    /// Collapses a list of errors into a single one. Returns `None` for an
    /// empty list.
    #[must_use]
    pub fn collect(mut errors: Vec<Self>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Multiple(errors)),
        }
    }
}

/// Result type for comparison operations.
pub type Result<T> = std::result::Result<T, CompareError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_single_error_is_unwrapped() {
        let err = CompareError::collect(vec![CompareError::InvalidGraph("x".into())]);
        assert_eq!(err, Some(CompareError::InvalidGraph("x".into())));
    }

    #[test]
    fn test_collect_many_errors_lists_them() {
        let err = CompareError::collect(vec![
            CompareError::InvalidGraph("a".into()),
            CompareError::InvalidGraph("b".into()),
        ])
        .unwrap();
        let msg = err.to_string();
        assert!(msg.contains("  - Invalid schema graph: a"));
        assert!(msg.contains("  - Invalid schema graph: b"));
    }

    #[test]
    fn test_collect_empty_is_none() {
        assert!(CompareError::collect(Vec::new()).is_none());
    }
}
