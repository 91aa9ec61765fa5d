//! HTTP transport for DigitalOcean API calls
//!
//! One request per call: no retries, no backoff. Timeouts and connection
//! failures surface as the transport's own error.

use crate::error::Result;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use std::time::Duration;
use url::Url;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and drops control characters
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Response as read off the wire, before any classification
#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    /// The transport's own error for a non-2xx status
    pub http_error: Option<reqwest::Error>,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn has_empty_body(&self) -> bool {
        self.body.trim().is_empty()
    }
}

/// HTTP client wrapper for DigitalOcean API calls
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a new HTTP client with a fixed per-request timeout
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }

    /// Start a request
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// Send a request and read the whole body
    pub async fn send(&self, request: RequestBuilder) -> Result<RawResponse> {
        let response = request.send().await?;

        let status = response.status();
        let http_error = response.error_for_status_ref().err();
        let body = response.text().await?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
        }

        Ok(RawResponse {
            status,
            http_error,
            body,
        })
    }
}
