//! # doapi
//!
//! Client for the DigitalOcean control-plane API.
//!
//! The provider exposes two incompatible protocols across a major version
//! boundary: a legacy one (query parameters, `client_id` + `api_key`, every
//! call a GET) and the current one (RESTful verbs, bearer token, JSON
//! bodies). This crate puts both behind one [`Manager`], so callers see the
//! same operations and the same result shapes whichever version is active.
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Protocol adapter: descriptors, signing, transport, classification |
//! | [`resource`] | Resource façade and result normalization |
//! | [`config`] | Endpoint, version and timeout configuration |
//! | [`error`] | Error taxonomy |
//!
//! ## Quick Start
//!
//! ```no_run
//! use doapi::{ApiVersion, ClientConfig, Credentials, Manager};
//!
//! #[tokio::main]
//! async fn main() -> doapi::Result<()> {
//!     let config = ClientConfig::new(ApiVersion::V2);
//!     let manager = Manager::new(config, Credentials::bearer("your-token"))?;
//!
//!     for droplet in manager.all_active_droplets().await? {
//!         println!("{} {}", droplet["name"], droplet["ip_address"]);
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod resource;

pub use api::auth::Credentials;
pub use api::client::ApiClient;
pub use api::operation::{DomainRecord, DropletAction, FloatingIpTarget, KeyIds, NewDroplet};
pub use api::protocol::ApiVersion;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use resource::{Availability, Manager, Record};
