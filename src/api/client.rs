//! API Client
//!
//! The single chokepoint for issuing one HTTP call and classifying its
//! outcome. Combines the immutable configuration, the active [`Protocol`]
//! and the HTTP transport.

use super::auth::Credentials;
use super::http::HttpTransport;
use super::operation::{Call, Operation, Params};
use super::protocol::{self, failed_status, ApiVersion, Protocol};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;

/// Protocol adapter
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: Arc<ClientConfig>,
    protocol: Arc<dyn Protocol>,
    http: HttpTransport,
}

impl ApiClient {
    /// Create a client. The protocol is chosen here, once, from the
    /// configured version and the credentials.
    pub fn new(config: ClientConfig, credentials: Credentials) -> Result<Self> {
        let protocol = protocol::for_version(config.version, credentials)?;
        let http = HttpTransport::new(config.timeout, &config.user_agent)?;

        Ok(Self {
            config: Arc::new(config),
            protocol: Arc::from(protocol),
            http,
        })
    }

    pub fn version(&self) -> ApiVersion {
        self.protocol.version()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Descriptor for a logical operation, `None` if the active protocol
    /// has no equivalent
    pub fn describe(&self, call: &Call) -> Option<Operation> {
        self.protocol.describe(call)
    }

    /// Whether a freshly created droplet must be read back for its address
    pub fn reload_after_create(&self) -> bool {
        self.protocol.reload_after_create()
    }

    /// Issue a raw request against an API path
    pub async fn request(&self, path: &str, params: Params, method: Method) -> Result<Value> {
        self.execute(Operation {
            method,
            path: path.to_string(),
            params,
            envelope: None,
        })
        .await
    }

    /// Execute one operation and return the decoded envelope
    pub async fn execute(&self, operation: Operation) -> Result<Value> {
        let method = self.protocol.wire_method(&operation.method)?;
        let url = self.config.url_for(&operation.path)?;

        tracing::debug!("{} {}", method, url);

        let request = self.http.request(method.clone(), url);
        let request = self.protocol.authorize(request, &method, &operation.params)?;
        let raw = self.http.send(request).await?;

        let synthesized = if raw.has_empty_body() {
            self.protocol.empty_body_envelope(&method, raw.status)
        } else {
            None
        };
        let envelope = match synthesized {
            Some(envelope) => envelope,
            None => serde_json::from_str(&raw.body).map_err(Error::Decode)?,
        };

        if !raw.is_success() {
            return Err(failed_status(raw.status, &envelope, raw.http_error));
        }

        self.protocol.check_envelope(raw.status, &envelope)?;

        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_selected_at_construction() {
        let client = ApiClient::new(
            ClientConfig::new(ApiVersion::V1),
            Credentials::legacy("id", "key"),
        )
        .unwrap();
        assert_eq!(client.version(), ApiVersion::V1);
        assert!(!client.reload_after_create());
        assert!(client.describe(&Call::AllActions).is_none());

        let client =
            ApiClient::new(ClientConfig::new(ApiVersion::V2), Credentials::bearer("t")).unwrap();
        assert_eq!(client.version(), ApiVersion::V2);
        assert!(client.reload_after_create());
    }

    #[tokio::test]
    async fn test_unsupported_method_fails_before_sending() {
        // Port 9 is never contacted: the method check comes first
        let config = ClientConfig::new(ApiVersion::V2)
            .with_endpoint("http://127.0.0.1:9")
            .unwrap();
        let client = ApiClient::new(config, Credentials::bearer("t")).unwrap();

        let err = client
            .request("/droplets", Params::new(), Method::PATCH)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedMethod(_)));
    }
}
