//! API credentials
//!
//! The legacy API signs every request with a client id and an API key passed
//! as query parameters. The current API takes a single bearer token.

use super::protocol::ApiVersion;
use crate::error::{Error, Result};
use std::fmt;

/// Environment variable holding the legacy client id
pub const CLIENT_ID_ENV: &str = "DO_CLIENT_ID";
/// Environment variable holding the legacy API key
pub const API_KEY_ENV: &str = "DO_API_KEY";
/// Environment variable holding the v2 token
pub const API_TOKEN_ENV: &str = "DO_API_TOKEN";

/// Credentials for one client instance. Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Legacy { client_id: String, api_key: String },
    Bearer { token: String },
}

impl Credentials {
    pub fn legacy(client_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Credentials::Legacy {
            client_id: client_id.into(),
            api_key: api_key.into(),
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Credentials::Bearer {
            token: token.into(),
        }
    }

    /// Read credentials for a protocol version from the environment.
    ///
    /// v1 needs `DO_CLIENT_ID` and `DO_API_KEY`; v2 reads `DO_API_TOKEN` and
    /// falls back to `DO_API_KEY`.
    pub fn from_env(version: ApiVersion) -> Result<Self> {
        Self::from_lookup(version, |key| std::env::var(key).ok())
    }

    fn from_lookup(version: ApiVersion, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        match version {
            ApiVersion::V1 => {
                let client_id = lookup(CLIENT_ID_ENV)
                    .ok_or_else(|| Error::Config(format!("{} is not set", CLIENT_ID_ENV)))?;
                let api_key = lookup(API_KEY_ENV)
                    .ok_or_else(|| Error::Config(format!("{} is not set", API_KEY_ENV)))?;
                Ok(Self::legacy(client_id, api_key))
            },
            ApiVersion::V2 => lookup(API_TOKEN_ENV)
                .or_else(|| lookup(API_KEY_ENV))
                .map(Self::bearer)
                .ok_or_else(|| {
                    Error::Config(format!("neither {} nor {} is set", API_TOKEN_ENV, API_KEY_ENV))
                }),
        }
    }

    /// The secret half: API key or token
    pub fn api_key(&self) -> &str {
        match self {
            Credentials::Legacy { api_key, .. } => api_key,
            Credentials::Bearer { token } => token,
        }
    }
}

// Security: never print secrets, even in debug logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Legacy { client_id, .. } => f
                .debug_struct("Legacy")
                .field("client_id", client_id)
                .field("api_key", &"<redacted>")
                .finish(),
            Credentials::Bearer { .. } => f
                .debug_struct("Bearer")
                .field("token", &"<redacted>")
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_v1_requires_both_halves() {
        let vars = env(&[(API_KEY_ENV, "key")]);
        let err = Credentials::from_lookup(ApiVersion::V1, |k| vars.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains(CLIENT_ID_ENV));

        let vars = env(&[(CLIENT_ID_ENV, "id"), (API_KEY_ENV, "key")]);
        let creds = Credentials::from_lookup(ApiVersion::V1, |k| vars.get(k).cloned()).unwrap();
        assert_eq!(creds, Credentials::legacy("id", "key"));
    }

    #[test]
    fn test_v2_falls_back_to_api_key() {
        let vars = env(&[(API_KEY_ENV, "fake_token"), (API_TOKEN_ENV, "  ")]);
        let creds = Credentials::from_lookup(ApiVersion::V2, |k| vars.get(k).cloned()).unwrap();
        assert_eq!(creds.api_key(), "fake_token");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", Credentials::legacy("id-1", "secret-key"));
        assert!(rendered.contains("id-1"));
        assert!(!rendered.contains("secret-key"));
        let rendered = format!("{:?}", Credentials::bearer("secret-token"));
        assert!(!rendered.contains("secret-token"));
    }
}
