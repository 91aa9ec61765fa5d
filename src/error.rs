//! Error types
//!
//! Classification happens in one place, [`crate::api::client::ApiClient`].
//! The façade hands these errors back to callers untouched.

use crate::api::protocol::ApiVersion;
use thiserror::Error;

/// Result type using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while talking to the DigitalOcean API
#[derive(Debug, Error)]
pub enum Error {
    /// Connection, timeout, DNS or bare HTTP status failure from the transport.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// The response body was not valid JSON.
    #[error("the API server did not respond with valid JSON: {0}")]
    Decode(#[source] serde_json::Error),

    /// The API answered with an application-level failure.
    ///
    /// `message` is the provider's text, verbatim.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The current protocol only speaks GET, POST, PUT and DELETE.
    #[error("unsupported HTTP method for the v2 API: {0}")]
    UnsupportedMethod(reqwest::Method),

    /// A required operation has no counterpart in the active protocol.
    #[error("{operation} is not supported by API {version}")]
    NotSupported {
        operation: &'static str,
        version: ApiVersion,
    },

    /// The envelope decoded fine but lacks the expected payload.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Caller-supplied argument could not be used.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Provider message for [`Error::Api`], if that is what this is
    pub fn api_message(&self) -> Option<&str> {
        match self {
            Error::Api { message, .. } => Some(message),
            _ => None,
        }
    }

    /// HTTP status attached to the failure, when one is known
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_displays_provider_message_verbatim() {
        let err = Error::Api {
            status: 403,
            message: "You do not have access for the attempted action.".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "You do not have access for the attempted action."
        );
        assert_eq!(err.status(), Some(403));
        assert_eq!(
            err.api_message(),
            Some("You do not have access for the attempted action.")
        );
    }

    #[test]
    fn test_not_supported_names_operation_and_version() {
        let err = Error::NotSupported {
            operation: "all_actions",
            version: ApiVersion::V1,
        };
        assert_eq!(err.to_string(), "all_actions is not supported by API v1");
        assert!(err.api_message().is_none());
    }
}
