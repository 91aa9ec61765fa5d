//! Resource façade
//!
//! The public operation catalogue: one method per resource type and action,
//! identical for both protocol versions.
//!
//! # Architecture
//!
//! - [`manager`] - [`Manager`], the catalogue itself
//! - [`normalize`] - envelope unwrapping, `status` stripping, `ip_address` synthesis
//! - [`dispatch`] - name-based invocation from string arguments
//!
//! # Example
//!
//! ```no_run
//! use doapi::{ClientConfig, Credentials, Manager};
//!
//! async fn list_droplets() -> doapi::Result<Vec<serde_json::Value>> {
//!     let manager = Manager::new(ClientConfig::default(), Credentials::bearer("token"))?;
//!     manager.all_active_droplets().await
//! }
//! ```

pub mod dispatch;
pub mod manager;
pub mod normalize;

pub use manager::{Availability, Manager};
pub use normalize::Record;
