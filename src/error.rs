use thiserror::Error;

/// Main error type for facetq operations
#[derive(Error, Debug)]
pub enum FacetError {
    #[error("Malformed range '{token}': {reason}")]
    MalformedRange { token: String, reason: String },

    #[error("Malformed backend response: missing {0}")]
    MalformedResponse(String),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("Invalid token permissions for '{0}'")]
    InvalidToken(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for facetq operations
pub type Result<T> = std::result::Result<T, FacetError>;

impl FacetError {
    pub(crate) fn malformed_range(token: &str, reason: impl Into<String>) -> Self {
        FacetError::MalformedRange {
            token: token.to_string(),
            reason: reason.into(),
        }
    }

    /// Check if this error indicates a transient failure that could be retried
    ///
    /// The core never retries; this only informs the caller's own policy.
    pub fn is_retriable(&self) -> bool {
        matches!(self, FacetError::Execution(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FacetError::malformed_range("a..b", "lower bound is not numeric");
        assert_eq!(
            err.to_string(),
            "Malformed range 'a..b': lower bound is not numeric"
        );

        let err = FacetError::MalformedResponse("aggregations.all".to_string());
        assert_eq!(
            err.to_string(),
            "Malformed backend response: missing aggregations.all"
        );
    }

    #[test]
    fn test_retriable_errors() {
        assert!(FacetError::Execution("timeout".to_string()).is_retriable());
        assert!(!FacetError::MalformedResponse("common".to_string()).is_retriable());
        assert!(!FacetError::malformed_range("x", "bad").is_retriable());
    }
}
