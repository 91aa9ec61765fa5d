//! Protocol abstraction
//!
//! The provider speaks two incompatible dialects across a major version
//! boundary. Each is one [`Protocol`] implementation, selected once when the
//! client is built:
//!
//! - [`super::v1::LegacyProtocol`] - query-string requests signed with
//!   `client_id`/`api_key`, every call a GET, `status: "OK"` envelopes
//! - [`super::v2::BearerProtocol`] - RESTful verbs, bearer token, JSON bodies,
//!   `id: "not_found"` error discriminator

use super::auth::Credentials;
use super::operation::{Call, Operation, Params};
use super::v1::LegacyProtocol;
use super::v2::BearerProtocol;
use crate::error::{Error, Result};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Protocol version selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ApiVersion {
    /// Legacy query-parameter API
    #[serde(rename = "1", alias = "v1")]
    V1,
    /// Current RESTful API
    #[default]
    #[serde(rename = "2", alias = "v2")]
    V2,
}

impl ApiVersion {
    /// Path suffix appended to the endpoint host
    pub fn path_prefix(self) -> &'static str {
        match self {
            ApiVersion::V1 => "",
            ApiVersion::V2 => "/v2",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiVersion::V1 => write!(f, "v1"),
            ApiVersion::V2 => write!(f, "v2"),
        }
    }
}

impl FromStr for ApiVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "v1" => Ok(ApiVersion::V1),
            "2" | "v2" => Ok(ApiVersion::V2),
            other => Err(Error::Config(format!(
                "unknown API version '{}', expected 1 or 2",
                other
            ))),
        }
    }
}

/// One wire dialect of the API
pub trait Protocol: Send + Sync + fmt::Debug {
    /// Version this implementation speaks
    fn version(&self) -> ApiVersion;

    /// Map a logical operation onto this dialect.
    ///
    /// Returns `None` when the dialect has no equivalent.
    fn describe(&self, call: &Call) -> Option<Operation>;

    /// Method actually put on the wire for a requested method
    fn wire_method(&self, requested: &Method) -> Result<Method>;

    /// Attach credentials and encode parameters
    fn authorize(&self, request: RequestBuilder, method: &Method, params: &Params)
        -> Result<RequestBuilder>;

    /// Envelope to use when the body is empty, if this dialect synthesizes one
    fn empty_body_envelope(&self, _method: &Method, _status: StatusCode) -> Option<Value> {
        None
    }

    /// Version-specific check of a decoded envelope on a 2xx response
    fn check_envelope(&self, status: StatusCode, envelope: &Value) -> Result<()>;

    /// Whether `new_droplet` must re-read the droplet to get its address
    fn reload_after_create(&self) -> bool {
        false
    }
}

/// Build the protocol for a version from the given credentials.
///
/// The current protocol accepts a legacy key pair and uses the key as its
/// token; the legacy protocol needs both halves of the pair.
pub fn for_version(version: ApiVersion, credentials: Credentials) -> Result<Box<dyn Protocol>> {
    match (version, credentials) {
        (ApiVersion::V1, Credentials::Legacy { client_id, api_key }) => {
            Ok(Box::new(LegacyProtocol::new(client_id, api_key)))
        },
        (ApiVersion::V1, Credentials::Bearer { .. }) => Err(Error::Config(
            "API v1 requires a client id and an API key".to_string(),
        )),
        (ApiVersion::V2, Credentials::Bearer { token }) => Ok(Box::new(BearerProtocol::new(token))),
        (ApiVersion::V2, Credentials::Legacy { api_key, .. }) => {
            Ok(Box::new(BearerProtocol::new(api_key)))
        },
    }
}

/// Message text from the first present key.
///
/// Non-string payloads are rendered as compact JSON.
pub(crate) fn envelope_message(envelope: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| envelope.get(*key))
        .find(|value| !value.is_null())
        .map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
}

/// Classify a non-2xx response.
///
/// Prefers the provider's message; otherwise hands back the transport's own
/// HTTP status error.
pub(crate) fn failed_status(
    status: StatusCode,
    envelope: &Value,
    http_error: Option<reqwest::Error>,
) -> Error {
    if let Some(message) = envelope_message(envelope, &["error_message", "message"]) {
        return Error::Api {
            status: status.as_u16(),
            message,
        };
    }
    match http_error {
        Some(err) => Error::Transport(err),
        None => Error::UnexpectedResponse(format!("HTTP {} without an error message", status)),
    }
}

/// Query-string form of a parameter mapping.
///
/// Strings verbatim, booleans as `True`/`False`, arrays comma-joined, `null`
/// dropped, everything else as its JSON text.
pub(crate) fn query_pairs(params: &Params) -> Vec<(String, String)> {
    params
        .iter()
        .filter_map(|(key, value)| query_value(value).map(|v| (key.clone(), v)))
        .collect()
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(query_value)
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Some(other.to_string()),
    }
}
