//! Client error types

use serde::Deserialize;
use thiserror::Error;

/// Coarse classification used by callers deciding how to react to a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 401: the session must be refreshed
    Unauthorized,
    /// 403: the caller is not allowed to perform the action
    Forbidden,
    /// 409: duplicate or conflicting action
    Conflict,
    /// Everything else, including transport failures and timeouts
    NetworkOrServer,
}

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error status
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Authentication failed or the token is no longer accepted
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Conflicting request, e.g. applying twice to the same job
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

#[derive(Deserialize)]
struct ErrorPayload {
    message: Option<String>,
}

impl ClientError {
    /// Create error from HTTP status code and the raw response body
    pub fn from_status(status: reqwest::StatusCode, message: String) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest(message),
            401 => Self::Unauthorized(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            _ => Self::ServerError {
                status: status.as_u16(),
                message,
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Conflict(_) => ErrorKind::Conflict,
            _ => ErrorKind::NetworkOrServer,
        }
    }

    /// Whether the failure requires the session to be refreshed
    pub fn is_unauthorized(&self) -> bool {
        self.kind() == ErrorKind::Unauthorized
    }

    /// HTTP status of the failed response, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest(_) => Some(400),
            Self::Unauthorized(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::Conflict(_) => Some(409),
            Self::ServerError { status, .. } => Some(*status),
            Self::Request(err) => err.status().map(|s| s.as_u16()),
            Self::Serialization(_) | Self::Configuration(_) => None,
        }
    }

    /// Raw response body for status errors
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::BadRequest(body)
            | Self::Unauthorized(body)
            | Self::Forbidden(body)
            | Self::NotFound(body)
            | Self::Conflict(body)
            | Self::ServerError { message: body, .. } => Some(body),
            _ => None,
        }
    }

    /// The `message` field of a JSON error payload, when the server sent one
    pub fn payload_message(&self) -> Option<String> {
        let body = self.body()?;
        serde_json::from_str::<ErrorPayload>(body)
            .ok()
            .and_then(|payload| payload.message)
            .filter(|message| !message.trim().is_empty())
    }

    /// Whether the transport gave up waiting for the server
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Request(err) if err.is_timeout())
    }
}
