//! Errors raised while fetching or processing job listings.

use thiserror::Error;

/// Failure of a single page fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Search API error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse search response: {0}")]
    Parse(String),

    #[error("Request timed out after {seconds}s")]
    Timeout { seconds: u64 },
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Parse(e.to_string())
    }
}

impl FetchError {
    /// Timed-out pages are skipped instead of failing the whole run.
    pub fn is_timeout(&self) -> bool {
        match self {
            FetchError::Timeout { .. } => true,
            FetchError::Http(e) => e.is_timeout(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_classification() {
        assert!(FetchError::Timeout { seconds: 5 }.is_timeout());
        assert!(!FetchError::Parse("bad".to_string()).is_timeout());
        assert!(!FetchError::Status {
            status: 500,
            body: String::new()
        }
        .is_timeout());
    }

    #[test]
    fn test_from_serde_error() {
        let err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let fetch: FetchError = err.into();
        assert!(matches!(fetch, FetchError::Parse(_)));
        assert!(fetch.to_string().starts_with("Failed to parse search response"));
    }
}
