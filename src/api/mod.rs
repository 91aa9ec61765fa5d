//! DigitalOcean API interaction module
//!
//! This module provides the protocol adapter: everything needed to turn a
//! logical operation into one signed HTTP call and to classify the answer.
//!
//! # Module Structure
//!
//! - [`auth`] - Credentials for either protocol version
//! - [`client`] - The adapter itself, [`client::ApiClient`]
//! - [`http`] - HTTP transport
//! - [`operation`] - Logical operations and wire descriptors
//! - [`protocol`] - The [`protocol::Protocol`] trait shared by both versions
//! - [`v1`] / [`v2`] - Legacy and current protocol implementations
//!
//! # Example
//!
//! ```no_run
//! use doapi::api::{auth::Credentials, client::ApiClient, operation::Params};
//! use doapi::config::ClientConfig;
//! use reqwest::Method;
//!
//! async fn example() -> doapi::Result<()> {
//!     let client = ApiClient::new(ClientConfig::default(), Credentials::bearer("token"))?;
//!     let regions = client.request("/regions/", Params::new(), Method::GET).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
pub mod operation;
pub mod protocol;
pub mod v1;
pub mod v2;
