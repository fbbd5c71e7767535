//! Routing error taxonomy.

use axum::http::StatusCode;
use thiserror::Error;

use crate::market::{QueryError, SymbolError};
use crate::providers::UpstreamError;

/// Failures a handler can raise. The router turns each into a reply once.
///
/// Unknown routes and wrong methods are not errors: their handlers answer
/// 404 and 405 directly.
#[derive(Debug, Error)]
pub enum RouteError {
    /// Malformed trading pair in the path.
    #[error(transparent)]
    InvalidSymbol(#[from] SymbolError),

    /// Path or request could not be understood.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A combinator was given nothing to run.
    #[error("No responders")]
    NoResponders,

    /// A combinator deadline elapsed.
    #[error("Timed out after {0} ms")]
    Timeout(u64),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A spawned handler task panicked or was aborted.
    #[error("Handler task failed: {0}")]
    Task(String),
}

impl RouteError {
    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            RouteError::InvalidSymbol(_) | RouteError::BadRequest(_) => StatusCode::BAD_REQUEST,
            RouteError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            RouteError::NoResponders
            | RouteError::Upstream(_)
            | RouteError::Serialize(_)
            | RouteError::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RouteError::InvalidSymbol(_) => "invalid_symbol",
            RouteError::BadRequest(_) => "bad_request",
            RouteError::NoResponders => "no_responders",
            RouteError::Timeout(_) => "timeout",
            RouteError::Upstream(_) => "upstream",
            RouteError::Serialize(_) => "serialize",
            RouteError::Task(_) => "task",
        }
    }
}

impl From<QueryError> for RouteError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Symbol(e) => RouteError::InvalidSymbol(e),
            other => RouteError::BadRequest(other.to_string()),
        }
    }
}

/// Result type for route handlers.
pub type RouteResult<T> = Result<T, RouteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err: RouteError = SymbolError::Invalid("btcusd".into()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Invalid symbol from btcusd");

        assert_eq!(RouteError::NoResponders.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(RouteError::Timeout(50).status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_query_error_conversion() {
        let err: RouteError = QueryError::UnsupportedKind("futures".into()).into();
        assert!(matches!(err, RouteError::BadRequest(_)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
