//! Configuration Management
//!
//! [`ClientConfig`] is the immutable endpoint/version/timeout value owned by
//! each client. [`FileConfig`] holds optional on-disk defaults for the CLI.

use crate::api::protocol::ApiVersion;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Default API host
pub const DEFAULT_ENDPOINT: &str = "https://api.digitalocean.com";

/// Per-request timeout applied when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub const ENDPOINT_ENV: &str = "DO_API_ENDPOINT";
pub const VERSION_ENV: &str = "DO_API_VERSION";
pub const TIMEOUT_ENV: &str = "DO_TIMEOUT_SECS";

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API host, without version suffix
    pub endpoint: Url,
    pub version: ApiVersion,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            version: ApiVersion::default(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("doapi/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

fn default_endpoint() -> Url {
    match Url::parse(DEFAULT_ENDPOINT) {
        Ok(url) => url,
        Err(_) => unreachable!("default endpoint is a valid URL"),
    }
}

impl ClientConfig {
    pub fn new(version: ApiVersion) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    /// Create a configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DO_API_ENDPOINT`: API host (default: "https://api.digitalocean.com")
    /// - `DO_API_VERSION`: 1 or 2 (default: 2)
    /// - `DO_TIMEOUT_SECS`: per-request timeout in seconds (default: 60)
    pub fn from_env() -> Result<Self> {
        Self::default().with_env()
    }

    /// Override fields with whatever the environment sets
    pub fn with_env(self) -> Result<Self> {
        let mut config = self;

        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            config = config.with_endpoint(&endpoint)?;
        }
        if let Ok(version) = std::env::var(VERSION_ENV) {
            config.version = version.parse()?;
        }
        if let Ok(timeout) = std::env::var(TIMEOUT_ENV) {
            let secs: u64 = timeout
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("invalid {}: {}", TIMEOUT_ENV, e)))?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Set the API host
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self> {
        self.endpoint = Url::parse(endpoint)
            .map_err(|e| Error::Config(format!("invalid endpoint '{}': {}", endpoint, e)))?;
        Ok(self)
    }

    pub fn with_version(mut self, version: ApiVersion) -> Self {
        self.version = version;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Endpoint plus version prefix: `/v2` for the current API, nothing for v1
    pub fn api_base(&self) -> String {
        format!(
            "{}{}",
            self.endpoint.as_str().trim_end_matches('/'),
            self.version.path_prefix()
        )
    }

    /// Full URL for an API path. A missing leading slash is added.
    pub fn url_for(&self, path: &str) -> Result<Url> {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        let raw = format!("{}{}", self.api_base(), path);
        Url::parse(&raw).map_err(|e| Error::Config(format!("invalid request URL '{}': {}", raw, e)))
    }
}

/// Defaults stored on disk for the CLI
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Preferred protocol version
    #[serde(default)]
    pub api_version: Option<ApiVersion>,
    /// API host override
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl FileConfig {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("doapi").join("config.json"))
    }

    /// Load configuration from disk. Missing or unreadable files yield defaults.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content),
            Err(_) => Self::default(),
        }
    }

    fn parse(content: &str) -> Self {
        serde_json::from_str(content).unwrap_or_else(|e| {
            tracing::warn!("Ignoring malformed config file: {}", e);
            Self::default()
        })
    }

    /// Layer these defaults under an explicit configuration
    pub fn apply(&self, mut config: ClientConfig) -> Result<ClientConfig> {
        if let Some(endpoint) = &self.endpoint {
            config = config.with_endpoint(endpoint)?;
        }
        if let Some(version) = self.api_version {
            config.version = version;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_base_per_version() {
        let config = ClientConfig::new(ApiVersion::V2);
        assert_eq!(config.api_base(), "https://api.digitalocean.com/v2");
        let config = ClientConfig::new(ApiVersion::V1);
        assert_eq!(config.api_base(), "https://api.digitalocean.com");
    }

    #[test]
    fn test_url_for_adds_leading_slash() {
        let config = ClientConfig::new(ApiVersion::V2);
        assert_eq!(
            config.url_for("droplets/").unwrap().as_str(),
            "https://api.digitalocean.com/v2/droplets/"
        );
        assert_eq!(
            config.url_for("/account/keys").unwrap().as_str(),
            "https://api.digitalocean.com/v2/account/keys"
        );
    }

    #[test]
    fn test_endpoint_override_keeps_trailing_slash_out() {
        let config = ClientConfig::new(ApiVersion::V1)
            .with_endpoint("http://127.0.0.1:8080/")
            .unwrap();
        assert_eq!(
            config.url_for("/sizes/").unwrap().as_str(),
            "http://127.0.0.1:8080/sizes/"
        );
    }

    #[test]
    fn test_invalid_endpoint_is_config_error() {
        let err = ClientConfig::default().with_endpoint("not a url").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_default_timeout() {
        assert_eq!(ClientConfig::default().timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_file_config_parse_and_apply() {
        let file = FileConfig::parse(r#"{"api_version": "1", "endpoint": "http://localhost:9000"}"#);
        assert_eq!(file.api_version, Some(ApiVersion::V1));

        let config = file.apply(ClientConfig::default()).unwrap();
        assert_eq!(config.version, ApiVersion::V1);
        assert_eq!(config.api_base(), "http://localhost:9000");
    }

    #[test]
    fn test_file_config_malformed_falls_back() {
        assert_eq!(FileConfig::parse("{not json"), FileConfig::default());
    }
}
