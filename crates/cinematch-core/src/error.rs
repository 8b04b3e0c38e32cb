//! Error types for the CineMatch data layer

use thiserror::Error;

/// Result type alias for data-layer operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Unified error type for the data layer.
///
/// The taxonomy mirrors how failures are handled:
/// - [`ClientError::Unauthorized`] is handled globally (forced logout plus a
///   redirect request) and still surfaced to the awaiting caller.
/// - [`ClientError::Validation`] is raised before dispatch; no request is made.
/// - Everything else propagates once to the caller. There are no retries.
#[derive(Error, Debug, Clone)]
pub enum ClientError {
    /// The server rejected the session credential (HTTP 401-equivalent)
    #[error("authentication failed: {}", detail.as_deref().unwrap_or("credentials rejected"))]
    Unauthorized { detail: Option<String> },

    /// Input rejected before dispatch, with a field-level message
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// Non-2xx response other than an authentication failure
    #[error("api error (status {status}): {}", detail.as_deref().unwrap_or("request failed"))]
    Api { status: u16, detail: Option<String> },

    /// The request never produced a response
    #[error("network error: {message}")]
    Network { message: String },

    /// A response body could not be decoded into the expected shape
    #[error("decode error: {message}")]
    Decode { message: String },

    /// Token persistence failure
    #[error("storage error: {message}")]
    Storage { message: String },
}

impl ClientError {
    /// Create an authentication-failure error
    pub fn unauthorized(detail: Option<String>) -> Self {
        Self::Unauthorized { detail }
    }

    /// Create a pre-dispatch validation error for a named field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an API error from a status code and optional server detail
    pub fn api(status: u16, detail: Option<String>) -> Self {
        Self::Api { status, detail }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Whether this error is a credential rejection
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// HTTP status associated with the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Structured detail sent by the server, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { detail } | Self::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// User-facing message: the server's detail when present, otherwise a
    /// generic fallback suitable for direct display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message, .. } => message.clone(),
            Self::Unauthorized { detail } => detail
                .clone()
                .unwrap_or_else(|| "Your session has expired. Please sign in again.".to_string()),
            Self::Api { detail, .. } => detail
                .clone()
                .unwrap_or_else(|| "Something went wrong. Please try again.".to_string()),
            Self::Network { .. } => "Could not reach the server. Please try again.".to_string(),
            Self::Decode { .. } | Self::Storage { .. } => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}
