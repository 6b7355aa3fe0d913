//! Typed error hierarchy for the entra-ops crate.
//!
//! Every Graph call in this crate expects exactly one success status. Any
//! other status, including a different 2xx, surfaces as [`GraphError::Api`]
//! with the raw response body so Graph's diagnostic payload is not lost.
//!
//! Callers that only care about the (status, message) pair can use
//! [`GraphError::status_code`]: authentication failures report 401 and a
//! failed UPN lookup reports 400, matching the codes the rest of the
//! tooling around this library expects.

use reqwest::StatusCode;

/// Unified error type for all entra-ops operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Microsoft Graph returned a status other than the one the operation
    /// expects.
    #[error("Graph API Error {status}: {body}")]
    Api {
        /// The HTTP status code Graph actually returned.
        status: StatusCode,
        /// The raw response body text. Empty if the body could not be read.
        body: String,
    },

    /// The authentication provider failed, or returned headers that are
    /// not valid HTTP.
    #[error("Graph API Error 401: {message}")]
    Auth {
        /// Human-readable description, wrapping the provider's message.
        message: String,
        /// The provider's underlying error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A UPN was looked up successfully but the user object carried no `id`.
    #[error("Graph API Error 400: Unable to retrieve user ID for the provided UPN ({upn}).")]
    UnresolvedUser {
        /// The UPN that could not be resolved.
        upn: String,
    },

    /// A response body did not have the expected JSON shape.
    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// A configured base URL could not be used to build request URLs.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Transport-level failure (DNS, TCP, TLS, client timeout). No HTTP
    /// status is available.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl GraphError {
    /// Numeric status associated with this error, if there is one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            GraphError::Api { status, .. } => Some(status.as_u16()),
            GraphError::Auth { .. } => Some(StatusCode::UNAUTHORIZED.as_u16()),
            GraphError::UnresolvedUser { .. } => Some(StatusCode::BAD_REQUEST.as_u16()),
            GraphError::Parse(_) | GraphError::Url(_) | GraphError::Network(_) => None,
        }
    }

    /// The message half of the (status, message) pair.
    ///
    /// For API errors this is the raw response body.
    pub fn message(&self) -> String {
        match self {
            GraphError::Api { body, .. } => body.clone(),
            GraphError::Auth { message, .. } => message.clone(),
            GraphError::UnresolvedUser { .. } => {
                "Unable to retrieve user ID for the provided UPN.".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, GraphError>;
