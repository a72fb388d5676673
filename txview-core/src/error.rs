//! Error types for txview.
//!
//! Two families reach callers: [`TxviewError::Validation`] for malformed
//! identifiers and [`UpstreamError`] for failures of the explorer API.
//! Cache store failures are represented by [`TxviewError::CacheUnavailable`]
//! but are absorbed by the cache adapter and never surface from a lookup.

use thiserror::Error;

/// Result type alias using `TxviewError`.
pub type Result<T> = std::result::Result<T, TxviewError>;

/// Result type alias for upstream fetches.
pub type UpstreamResult<T> = std::result::Result<T, UpstreamError>;

/// Why an upstream fetch failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// The upstream could not be reached at all.
    #[error("could not connect to upstream API: {0}")]
    ConnectionFailed(String),

    /// The upstream did not answer within the configured bound.
    #[error("upstream API timed out after {seconds}s")]
    Timeout {
        /// Configured request timeout
        seconds: u64,
    },

    /// The upstream answered with a non-2xx status.
    #[error("upstream API returned HTTP {0}")]
    HttpStatus(u16),

    /// The upstream answered 2xx but the body is not a JSON document.
    #[error("upstream API returned a malformed body: {0}")]
    MalformedBody(String),
}

impl UpstreamError {
    /// Short machine-readable label, used in logs and error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::ConnectionFailed(_) => "connection_failed",
            UpstreamError::Timeout { .. } => "timeout",
            UpstreamError::HttpStatus(_) => "http_status",
            UpstreamError::MalformedBody(_) => "malformed_body",
        }
    }

    /// HTTP status preserved from the upstream response, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            UpstreamError::HttpStatus(code) => Some(*code),
            _ => None,
        }
    }
}

/// Main error type for txview operations.
#[derive(Debug, Error)]
pub enum TxviewError {
    // ═══════════════════════════════════════════════════════════════════════════
    // CLIENT ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Identifier failed its namespace format rule.
    #[error("Validation error: {0}")]
    Validation(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // UPSTREAM ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The explorer API failed.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    // ═══════════════════════════════════════════════════════════════════════════
    // CACHE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The cache store could not serve an operation.
    #[error("Cache unavailable: {0}")]
    CacheUnavailable(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION & PLUMBING
    // ═══════════════════════════════════════════════════════════════════════════

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TxviewError {
    /// Returns true if this is a client-side input error.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, TxviewError::Validation(_))
    }

    /// Returns true if the upstream API is to blame.
    pub fn is_upstream_error(&self) -> bool {
        matches!(self, TxviewError::Upstream(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TxviewError::from(UpstreamError::HttpStatus(503));
        assert!(err.to_string().contains("503"));

        let err = TxviewError::from(UpstreamError::Timeout { seconds: 10 });
        assert!(err.to_string().contains("10s"));
    }

    #[test]
    fn test_error_classification() {
        assert!(TxviewError::Validation("empty".into()).is_validation_error());
        assert!(!TxviewError::Validation("empty".into()).is_upstream_error());

        let upstream = TxviewError::from(UpstreamError::ConnectionFailed("refused".into()));
        assert!(upstream.is_upstream_error());
        assert!(!upstream.is_validation_error());
    }

    #[test]
    fn test_upstream_status_code_preserved() {
        assert_eq!(UpstreamError::HttpStatus(503).status_code(), Some(503));
        assert_eq!(UpstreamError::Timeout { seconds: 1 }.status_code(), None);
        assert_eq!(UpstreamError::HttpStatus(503).kind(), "http_status");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_result: std::result::Result<serde_json::Value, _> = serde_json::from_str("invalid");
        let result: Result<serde_json::Value> = json_result.map_err(TxviewError::from);
        assert!(matches!(result, Err(TxviewError::Json(_))));
    }
}
