//! Resource façade
//!
//! One method per logical operation. Each builds a [`Call`], lets the
//! [`ApiClient`] run it through the active protocol, and reshapes the
//! result. Errors from the adapter pass through untouched.

use super::normalize::{normalize_droplet, strip_status, unwrap_envelope, unwrap_list, Record};
use crate::api::auth::Credentials;
use crate::api::client::ApiClient;
use crate::api::operation::{Call, DomainRecord, DropletAction, FloatingIpTarget, NewDroplet};
use crate::api::protocol::ApiVersion;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use serde_json::Value;
use std::fmt;

/// Result of an operation that may not exist in the active protocol
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum Availability<T> {
    Available(T),
    /// The protocol has no equivalent; no request was sent.
    NotSupported {
        operation: &'static str,
        version: ApiVersion,
    },
}

impl<T> Availability<T> {
    pub fn is_supported(&self) -> bool {
        matches!(self, Availability::Available(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Availability::Available(value) => Some(value),
            Availability::NotSupported { .. } => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Availability<U> {
        match self {
            Availability::Available(value) => Availability::Available(f(value)),
            Availability::NotSupported { operation, version } => {
                Availability::NotSupported { operation, version }
            },
        }
    }

    /// Treat unavailability as an error
    pub fn into_result(self) -> Result<T> {
        match self {
            Availability::Available(value) => Ok(value),
            Availability::NotSupported { operation, version } => {
                Err(Error::NotSupported { operation, version })
            },
        }
    }
}

/// Decoded envelope plus the key its payload lives under
struct Reply {
    envelope: Value,
    key: Option<&'static str>,
}

impl Reply {
    fn payload_key(&self) -> Result<&'static str> {
        self.key
            .ok_or_else(|| Error::UnexpectedResponse("operation has no payload key".to_string()))
    }

    fn item(self) -> Result<Value> {
        let key = self.payload_key()?;
        unwrap_envelope(self.envelope, key)
    }

    fn list(self) -> Result<Vec<Value>> {
        let key = self.payload_key()?;
        unwrap_list(self.envelope, key)
    }

    fn record(self) -> Record {
        strip_status(self.envelope)
    }
}

/// Text form of an identifier found in a response
fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// DigitalOcean resource manager
#[derive(Debug, Clone)]
pub struct Manager {
    client: ApiClient,
}

impl Manager {
    /// Build a manager for the configured protocol version
    pub fn new(config: ClientConfig, credentials: Credentials) -> Result<Self> {
        Ok(Self::from_client(ApiClient::new(config, credentials)?))
    }

    pub fn from_client(client: ApiClient) -> Self {
        Self { client }
    }

    /// The underlying adapter, for raw requests
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn version(&self) -> ApiVersion {
        self.client.version()
    }

    async fn try_reply(&self, call: &Call) -> Result<Option<Reply>> {
        let Some(operation) = self.client.describe(call) else {
            tracing::debug!("{} has no {} equivalent", call.name(), self.version());
            return Ok(None);
        };
        let key = operation.envelope;
        let envelope = self.client.execute(operation).await?;
        Ok(Some(Reply { envelope, key }))
    }

    async fn reply(&self, call: Call) -> Result<Reply> {
        self.try_reply(&call)
            .await?
            .ok_or_else(|| Error::NotSupported {
                operation: call.name(),
                version: self.version(),
            })
    }

    async fn optional<T>(
        &self,
        call: Call,
        shape: impl FnOnce(Reply) -> Result<T>,
    ) -> Result<Availability<T>> {
        match self.try_reply(&call).await? {
            Some(reply) => Ok(Availability::Available(shape(reply)?)),
            None => Ok(Availability::NotSupported {
                operation: call.name(),
                version: self.version(),
            }),
        }
    }

    // =========================================================================
    // Droplets
    // =========================================================================

    /// All droplets, each with a flat `ip_address`
    pub async fn all_active_droplets(&self) -> Result<Vec<Value>> {
        let droplets = self.reply(Call::AllActiveDroplets).await?.list()?;
        Ok(droplets.into_iter().map(normalize_droplet).collect())
    }

    /// Create a droplet.
    ///
    /// The v2 creation response does not carry an address yet, so the new
    /// droplet is read back before returning.
    pub async fn new_droplet(&self, droplet: NewDroplet) -> Result<Value> {
        tracing::info!("Creating droplet '{}' in {}", droplet.name, droplet.region);

        let created = self.reply(Call::NewDroplet(droplet)).await?.item()?;
        if !self.client.reload_after_create() {
            return Ok(normalize_droplet(created));
        }

        let id = created.get("id").and_then(id_text).ok_or_else(|| {
            Error::UnexpectedResponse("created droplet carries no id".to_string())
        })?;
        self.show_droplet(id).await
    }

    pub async fn show_droplet(&self, id: impl fmt::Display) -> Result<Value> {
        let droplet = self
            .reply(Call::ShowDroplet { id: id.to_string() })
            .await?
            .item()?;
        Ok(normalize_droplet(droplet))
    }

    /// Run any droplet action
    pub async fn droplet_action(
        &self,
        id: impl fmt::Display,
        action: DropletAction,
    ) -> Result<Record> {
        let id = id.to_string();
        tracing::info!("Droplet {}: {}", id, action.kind());
        Ok(self.reply(Call::DropletAction { id, action }).await?.record())
    }

    pub async fn reboot_droplet(&self, id: impl fmt::Display) -> Result<Record> {
        self.droplet_action(id, DropletAction::Reboot).await
    }

    pub async fn power_cycle_droplet(&self, id: impl fmt::Display) -> Result<Record> {
        self.droplet_action(id, DropletAction::PowerCycle).await
    }

    pub async fn shutdown_droplet(&self, id: impl fmt::Display) -> Result<Record> {
        self.droplet_action(id, DropletAction::Shutdown).await
    }

    pub async fn power_off_droplet(&self, id: impl fmt::Display) -> Result<Record> {
        self.droplet_action(id, DropletAction::PowerOff).await
    }

    pub async fn power_on_droplet(&self, id: impl fmt::Display) -> Result<Record> {
        self.droplet_action(id, DropletAction::PowerOn).await
    }

    pub async fn password_reset_droplet(&self, id: impl fmt::Display) -> Result<Record> {
        self.droplet_action(id, DropletAction::PasswordReset).await
    }

    pub async fn resize_droplet(
        &self,
        id: impl fmt::Display,
        size: impl Into<String>,
    ) -> Result<Record> {
        let action = DropletAction::Resize { size: size.into() };
        self.droplet_action(id, action).await
    }

    pub async fn snapshot_droplet(
        &self,
        id: impl fmt::Display,
        name: impl Into<String>,
    ) -> Result<Record> {
        let action = DropletAction::Snapshot { name: name.into() };
        self.droplet_action(id, action).await
    }

    pub async fn restore_droplet(
        &self,
        id: impl fmt::Display,
        image: impl Into<String>,
    ) -> Result<Record> {
        let action = DropletAction::Restore {
            image: image.into(),
        };
        self.droplet_action(id, action).await
    }

    pub async fn rebuild_droplet(
        &self,
        id: impl fmt::Display,
        image: impl Into<String>,
    ) -> Result<Record> {
        let action = DropletAction::Rebuild {
            image: image.into(),
        };
        self.droplet_action(id, action).await
    }

    pub async fn enable_backups_droplet(&self, id: impl fmt::Display) -> Result<Record> {
        self.droplet_action(id, DropletAction::EnableBackups).await
    }

    pub async fn disable_backups_droplet(&self, id: impl fmt::Display) -> Result<Record> {
        self.droplet_action(id, DropletAction::DisableBackups).await
    }

    pub async fn rename_droplet(
        &self,
        id: impl fmt::Display,
        name: impl Into<String>,
    ) -> Result<Record> {
        let action = DropletAction::Rename { name: name.into() };
        self.droplet_action(id, action).await
    }

    /// Destroy a droplet. `scrub_data` is only honoured by v1.
    pub async fn destroy_droplet(&self, id: impl fmt::Display, scrub_data: bool) -> Result<Record> {
        let id = id.to_string();
        tracing::info!("Destroying droplet {}", id);
        Ok(self
            .reply(Call::DestroyDroplet { id, scrub_data })
            .await?
            .record())
    }

    // =========================================================================
    // Regions, sizes
    // =========================================================================

    pub async fn all_regions(&self) -> Result<Vec<Value>> {
        self.reply(Call::AllRegions).await?.list()
    }

    pub async fn sizes(&self) -> Result<Vec<Value>> {
        self.reply(Call::Sizes).await?.list()
    }

    // =========================================================================
    // Images
    // =========================================================================

    /// List images. `filter` is `global`, `my_images`, or (v2) an image type.
    pub async fn all_images(&self, filter: &str) -> Result<Vec<Value>> {
        let call = Call::AllImages {
            filter: filter.to_string(),
        };
        self.reply(call).await?.list()
    }

    pub async fn show_image(&self, id: impl fmt::Display) -> Result<Value> {
        self.reply(Call::ShowImage { id: id.to_string() })
            .await?
            .item()
    }

    pub async fn destroy_image(&self, id: impl fmt::Display) -> Result<Record> {
        let id = id.to_string();
        tracing::info!("Destroying image {}", id);
        Ok(self.reply(Call::DestroyImage { id }).await?.record())
    }

    pub async fn transfer_image(
        &self,
        id: impl fmt::Display,
        region: impl Into<String>,
    ) -> Result<Record> {
        let call = Call::TransferImage {
            id: id.to_string(),
            region: region.into(),
        };
        Ok(self.reply(call).await?.record())
    }

    // =========================================================================
    // SSH keys
    // =========================================================================

    pub async fn all_ssh_keys(&self) -> Result<Vec<Value>> {
        self.reply(Call::AllSshKeys).await?.list()
    }

    pub async fn new_ssh_key(
        &self,
        name: impl Into<String>,
        public_key: impl Into<String>,
    ) -> Result<Value> {
        let call = Call::NewSshKey {
            name: name.into(),
            public_key: public_key.into(),
        };
        self.reply(call).await?.item()
    }

    pub async fn show_ssh_key(&self, id: impl fmt::Display) -> Result<Value> {
        self.reply(Call::ShowSshKey { id: id.to_string() })
            .await?
            .item()
    }

    /// Edit a key. v2 only renames; the public key is ignored there.
    pub async fn edit_ssh_key(
        &self,
        id: impl fmt::Display,
        name: impl Into<String>,
        public_key: impl Into<String>,
    ) -> Result<Value> {
        let call = Call::EditSshKey {
            id: id.to_string(),
            name: name.into(),
            public_key: public_key.into(),
        };
        self.reply(call).await?.item()
    }

    pub async fn destroy_ssh_key(&self, id: impl fmt::Display) -> Result<Record> {
        let call = Call::DestroySshKey { id: id.to_string() };
        Ok(self.reply(call).await?.record())
    }

    // =========================================================================
    // Domains
    // =========================================================================

    pub async fn all_domains(&self) -> Result<Vec<Value>> {
        self.reply(Call::AllDomains).await?.list()
    }

    pub async fn new_domain(
        &self,
        name: impl Into<String>,
        ip_address: impl Into<String>,
    ) -> Result<Value> {
        let call = Call::NewDomain {
            name: name.into(),
            ip_address: ip_address.into(),
        };
        self.reply(call).await?.item()
    }

    pub async fn show_domain(&self, id: impl fmt::Display) -> Result<Value> {
        self.reply(Call::ShowDomain { id: id.to_string() })
            .await?
            .item()
    }

    pub async fn destroy_domain(&self, id: impl fmt::Display) -> Result<Record> {
        let id = id.to_string();
        tracing::info!("Destroying domain {}", id);
        Ok(self.reply(Call::DestroyDomain { id }).await?.record())
    }

    pub async fn all_domain_records(&self, domain: impl fmt::Display) -> Result<Vec<Value>> {
        let call = Call::AllDomainRecords {
            domain: domain.to_string(),
        };
        self.reply(call).await?.list()
    }

    pub async fn new_domain_record(
        &self,
        domain: impl fmt::Display,
        record: DomainRecord,
    ) -> Result<Value> {
        let call = Call::NewDomainRecord {
            domain: domain.to_string(),
            record,
        };
        self.reply(call).await?.item()
    }

    pub async fn show_domain_record(
        &self,
        domain: impl fmt::Display,
        record_id: impl fmt::Display,
    ) -> Result<Value> {
        let call = Call::ShowDomainRecord {
            domain: domain.to_string(),
            record_id: record_id.to_string(),
        };
        self.reply(call).await?.item()
    }

    pub async fn edit_domain_record(
        &self,
        domain: impl fmt::Display,
        record_id: impl fmt::Display,
        record: DomainRecord,
    ) -> Result<Value> {
        let call = Call::EditDomainRecord {
            domain: domain.to_string(),
            record_id: record_id.to_string(),
            record,
        };
        self.reply(call).await?.item()
    }

    pub async fn destroy_domain_record(
        &self,
        domain: impl fmt::Display,
        record_id: impl fmt::Display,
    ) -> Result<Record> {
        let call = Call::DestroyDomainRecord {
            domain: domain.to_string(),
            record_id: record_id.to_string(),
        };
        Ok(self.reply(call).await?.record())
    }

    // =========================================================================
    // Actions (events in v1)
    // =========================================================================

    /// All actions on the account. v1 has no bulk listing.
    pub async fn all_actions(&self) -> Result<Availability<Vec<Value>>> {
        self.optional(Call::AllActions, Reply::list).await
    }

    /// One action (v2) or event (v1)
    #[doc(alias = "show_event")]
    pub async fn show_action(&self, id: impl fmt::Display) -> Result<Value> {
        self.reply(Call::ShowAction { id: id.to_string() })
            .await?
            .item()
    }

    // =========================================================================
    // Floating IPs (v2 only)
    // =========================================================================

    pub async fn all_floating_ips(&self) -> Result<Availability<Vec<Value>>> {
        self.optional(Call::AllFloatingIps, Reply::list).await
    }

    pub async fn new_floating_ip(&self, target: FloatingIpTarget) -> Result<Availability<Value>> {
        self.optional(Call::NewFloatingIp(target), Reply::item).await
    }

    pub async fn show_floating_ip(&self, ip: impl fmt::Display) -> Result<Availability<Value>> {
        let call = Call::ShowFloatingIp { ip: ip.to_string() };
        self.optional(call, Reply::item).await
    }

    pub async fn destroy_floating_ip(&self, ip: impl fmt::Display) -> Result<Availability<Record>> {
        let call = Call::DestroyFloatingIp { ip: ip.to_string() };
        self.optional(call, |reply| Ok(reply.record())).await
    }

    pub async fn assign_floating_ip(
        &self,
        ip: impl fmt::Display,
        droplet_id: impl fmt::Display,
    ) -> Result<Availability<Record>> {
        let call = Call::AssignFloatingIp {
            ip: ip.to_string(),
            droplet_id: droplet_id.to_string(),
        };
        self.optional(call, |reply| Ok(reply.record())).await
    }

    pub async fn unassign_floating_ip(&self, ip: impl fmt::Display) -> Result<Availability<Record>> {
        let call = Call::UnassignFloatingIp { ip: ip.to_string() };
        self.optional(call, |reply| Ok(reply.record())).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_availability_helpers() {
        let available: Availability<u32> = Availability::Available(3);
        assert!(available.is_supported());
        assert_eq!(available.clone().map(|v| v * 2).into_option(), Some(6));
        assert_eq!(available.into_result().unwrap(), 3);

        let missing: Availability<u32> = Availability::NotSupported {
            operation: "all_actions",
            version: ApiVersion::V1,
        };
        assert!(!missing.is_supported());
        assert!(matches!(
            missing.into_result(),
            Err(Error::NotSupported {
                operation: "all_actions",
                version: ApiVersion::V1
            })
        ));
    }

    #[test]
    fn test_reply_shapes() {
        let reply = Reply {
            envelope: json!({"status": "OK", "regions": [{"slug": "nyc1"}]}),
            key: Some("regions"),
        };
        assert_eq!(reply.list().unwrap(), vec![json!({"slug": "nyc1"})]);

        let reply = Reply {
            envelope: json!({"status": "OK", "event_id": 9}),
            key: None,
        };
        assert!(Reply {
            envelope: json!({}),
            key: None
        }
        .item()
        .is_err());
        assert_eq!(Value::Object(reply.record()), json!({"event_id": 9}));
    }

    #[test]
    fn test_id_text() {
        assert_eq!(id_text(&json!(11134178)), Some("11134178".to_string()));
        assert_eq!(id_text(&json!("abc")), Some("abc".to_string()));
        assert_eq!(id_text(&json!(null)), None);
    }
}
