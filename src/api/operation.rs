//! Logical operations and their wire descriptors
//!
//! A [`Call`] names what the caller wants done. A protocol turns it into an
//! [`Operation`]: method, path, parameters and the envelope key holding the
//! payload. Arguments arrive here already typed; per-protocol naming and
//! encoding happen in [`super::v1`] and [`super::v2`].

use reqwest::Method;
use serde_json::{Map, Value};
use std::borrow::Cow;

/// Per-call parameter mapping. Always built fresh for each request.
pub type Params = Map<String, Value>;

/// Concrete request description for one protocol version
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub method: Method,
    pub path: String,
    pub params: Params,
    /// Envelope key holding the payload; `None` for state-mutating calls
    pub envelope: Option<&'static str>,
}

impl Operation {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Params::new(),
            envelope: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Add one parameter
    pub fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    /// Add a parameter only when a value is present
    pub fn param_opt<V: Into<Value>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    /// Payload key to pull out of the response envelope
    pub fn envelope(mut self, key: &'static str) -> Self {
        self.envelope = Some(key);
        self
    }
}

/// Percent-encode a caller-supplied identifier for use as a path segment
pub(crate) fn segment(id: &str) -> Cow<'_, str> {
    urlencoding::encode(id)
}

/// Numeric identifiers travel as JSON numbers, anything else as a string
pub(crate) fn id_value(id: &str) -> Value {
    id.trim()
        .parse::<u64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::String(id.to_string()))
}

/// State changes on a droplet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropletAction {
    Reboot,
    PowerCycle,
    Shutdown,
    PowerOff,
    PowerOn,
    PasswordReset,
    EnableBackups,
    DisableBackups,
    Resize { size: String },
    Snapshot { name: String },
    Restore { image: String },
    Rebuild { image: String },
    Rename { name: String },
}

impl DropletAction {
    /// Wire name of the action, shared by both protocols
    pub fn kind(&self) -> &'static str {
        match self {
            DropletAction::Reboot => "reboot",
            DropletAction::PowerCycle => "power_cycle",
            DropletAction::Shutdown => "shutdown",
            DropletAction::PowerOff => "power_off",
            DropletAction::PowerOn => "power_on",
            DropletAction::PasswordReset => "password_reset",
            DropletAction::EnableBackups => "enable_backups",
            DropletAction::DisableBackups => "disable_backups",
            DropletAction::Resize { .. } => "resize",
            DropletAction::Snapshot { .. } => "snapshot",
            DropletAction::Restore { .. } => "restore",
            DropletAction::Rebuild { .. } => "rebuild",
            DropletAction::Rename { .. } => "rename",
        }
    }
}

/// A set of SSH key identifiers.
///
/// Accepts a scalar (`"1,2"`, `42`) or a sequence and flattens it into
/// individual ids. Legacy requests send them comma-joined, current requests
/// as a JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyIds(Vec<String>);

impl KeyIds {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids = ids
            .into_iter()
            .flat_map(|id| {
                id.as_ref()
                    .split(',')
                    .map(|part| part.trim().to_string())
                    .filter(|part| !part.is_empty())
                    .collect::<Vec<_>>()
            })
            .collect();
        Self(ids)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.0
    }

    /// Legacy encoding
    pub fn joined(&self) -> String {
        self.0.join(",")
    }

    /// Current encoding
    pub fn to_array(&self) -> Value {
        Value::Array(self.0.iter().map(|id| id_value(id)).collect())
    }
}

impl From<&str> for KeyIds {
    fn from(ids: &str) -> Self {
        Self::new([ids])
    }
}

impl From<String> for KeyIds {
    fn from(ids: String) -> Self {
        Self::new([ids])
    }
}

impl From<u64> for KeyIds {
    fn from(id: u64) -> Self {
        Self(vec![id.to_string()])
    }
}

impl From<Vec<u64>> for KeyIds {
    fn from(ids: Vec<u64>) -> Self {
        Self(ids.into_iter().map(|id| id.to_string()).collect())
    }
}

impl From<Vec<String>> for KeyIds {
    fn from(ids: Vec<String>) -> Self {
        Self::new(ids)
    }
}

impl From<Vec<&str>> for KeyIds {
    fn from(ids: Vec<&str>) -> Self {
        Self::new(ids)
    }
}

impl From<&[&str]> for KeyIds {
    fn from(ids: &[&str]) -> Self {
        Self::new(ids)
    }
}

/// Arguments for creating a droplet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDroplet {
    pub name: String,
    /// Size id (v1) or slug (v2)
    pub size: String,
    /// Image id (v1) or id/slug (v2)
    pub image: String,
    /// Region id (v1) or slug (v2)
    pub region: String,
    pub ssh_keys: KeyIds,
    pub virtio: bool,
    pub private_networking: bool,
    pub backups: bool,
    pub ipv6: bool,
    pub user_data: Option<String>,
}

impl NewDroplet {
    pub fn new(
        name: impl Into<String>,
        size: impl Into<String>,
        image: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            size: size.into(),
            image: image.into(),
            region: region.into(),
            ssh_keys: KeyIds::default(),
            virtio: false,
            private_networking: false,
            backups: false,
            ipv6: false,
            user_data: None,
        }
    }

    pub fn ssh_keys(mut self, ids: impl Into<KeyIds>) -> Self {
        self.ssh_keys = ids.into();
        self
    }

    pub fn virtio(mut self, enabled: bool) -> Self {
        self.virtio = enabled;
        self
    }

    pub fn private_networking(mut self, enabled: bool) -> Self {
        self.private_networking = enabled;
        self
    }

    pub fn backups(mut self, enabled: bool) -> Self {
        self.backups = enabled;
        self
    }

    pub fn ipv6(mut self, enabled: bool) -> Self {
        self.ipv6 = enabled;
        self
    }

    pub fn user_data(mut self, data: impl Into<String>) -> Self {
        self.user_data = Some(data.into());
        self
    }
}

/// Fields of a DNS record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRecord {
    pub record_type: String,
    pub data: String,
    pub name: Option<String>,
    pub priority: Option<u32>,
    pub port: Option<u32>,
    pub weight: Option<u32>,
}

impl DomainRecord {
    pub fn new(record_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            record_type: record_type.into(),
            data: data.into(),
            name: None,
            priority: None,
            port: None,
            weight: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn priority(mut self, priority: u32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn port(mut self, port: u32) -> Self {
        self.port = Some(port);
        self
    }

    pub fn weight(mut self, weight: u32) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Add the optional fields to an operation
    pub(crate) fn apply_optional(&self, op: Operation) -> Operation {
        op.param_opt("name", self.name.clone())
            .param_opt("priority", self.priority)
            .param_opt("port", self.port)
            .param_opt("weight", self.weight)
    }
}

/// Where a new floating IP should live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FloatingIpTarget {
    /// Assigned to a droplet right away
    Droplet(String),
    /// Reserved in a region, unassigned
    Region(String),
}

/// Every logical operation the façade exposes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    AllActiveDroplets,
    NewDroplet(NewDroplet),
    ShowDroplet { id: String },
    DropletAction { id: String, action: DropletAction },
    DestroyDroplet { id: String, scrub_data: bool },
    AllRegions,
    AllImages { filter: String },
    ShowImage { id: String },
    DestroyImage { id: String },
    TransferImage { id: String, region: String },
    AllSshKeys,
    NewSshKey { name: String, public_key: String },
    ShowSshKey { id: String },
    EditSshKey { id: String, name: String, public_key: String },
    DestroySshKey { id: String },
    Sizes,
    AllDomains,
    NewDomain { name: String, ip_address: String },
    ShowDomain { id: String },
    DestroyDomain { id: String },
    AllDomainRecords { domain: String },
    NewDomainRecord { domain: String, record: DomainRecord },
    ShowDomainRecord { domain: String, record_id: String },
    EditDomainRecord { domain: String, record_id: String, record: DomainRecord },
    DestroyDomainRecord { domain: String, record_id: String },
    AllActions,
    ShowAction { id: String },
    AllFloatingIps,
    NewFloatingIp(FloatingIpTarget),
    ShowFloatingIp { ip: String },
    DestroyFloatingIp { ip: String },
    AssignFloatingIp { ip: String, droplet_id: String },
    UnassignFloatingIp { ip: String },
}

impl Call {
    /// Operation name, as used in logs and the CLI
    pub fn name(&self) -> &'static str {
        match self {
            Call::AllActiveDroplets => "all_active_droplets",
            Call::NewDroplet(_) => "new_droplet",
            Call::ShowDroplet { .. } => "show_droplet",
            Call::DropletAction { .. } => "droplet_action",
            Call::DestroyDroplet { .. } => "destroy_droplet",
            Call::AllRegions => "all_regions",
            Call::AllImages { .. } => "all_images",
            Call::ShowImage { .. } => "show_image",
            Call::DestroyImage { .. } => "destroy_image",
            Call::TransferImage { .. } => "transfer_image",
            Call::AllSshKeys => "all_ssh_keys",
            Call::NewSshKey { .. } => "new_ssh_key",
            Call::ShowSshKey { .. } => "show_ssh_key",
            Call::EditSshKey { .. } => "edit_ssh_key",
            Call::DestroySshKey { .. } => "destroy_ssh_key",
            Call::Sizes => "sizes",
            Call::AllDomains => "all_domains",
            Call::NewDomain { .. } => "new_domain",
            Call::ShowDomain { .. } => "show_domain",
            Call::DestroyDomain { .. } => "destroy_domain",
            Call::AllDomainRecords { .. } => "all_domain_records",
            Call::NewDomainRecord { .. } => "new_domain_record",
            Call::ShowDomainRecord { .. } => "show_domain_record",
            Call::EditDomainRecord { .. } => "edit_domain_record",
            Call::DestroyDomainRecord { .. } => "destroy_domain_record",
            Call::AllActions => "all_actions",
            Call::ShowAction { .. } => "show_action",
            Call::AllFloatingIps => "all_floating_ips",
            Call::NewFloatingIp(_) => "new_floating_ip",
            Call::ShowFloatingIp { .. } => "show_floating_ip",
            Call::DestroyFloatingIp { .. } => "destroy_floating_ip",
            Call::AssignFloatingIp { .. } => "assign_floating_ip",
            Call::UnassignFloatingIp { .. } => "unassign_floating_ip",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_ids_scalar_string_with_commas() {
        let ids = KeyIds::from("12, 34,,56");
        assert_eq!(ids.ids(), &["12", "34", "56"]);
        assert_eq!(ids.joined(), "12,34,56");
    }

    #[test]
    fn test_key_ids_mixed_sequence_to_array() {
        let ids = KeyIds::from(vec!["402179", "3b:16:bf:e4:8b:00"]);
        assert_eq!(ids.to_array(), json!([402179, "3b:16:bf:e4:8b:00"]));
    }

    #[test]
    fn test_key_ids_from_numbers() {
        assert_eq!(KeyIds::from(7u64).joined(), "7");
        assert_eq!(KeyIds::from(vec![1u64, 2]).to_array(), json!([1, 2]));
        assert!(KeyIds::from("").is_empty());
    }

    #[test]
    fn test_operation_builder_skips_missing_optionals() {
        let op = Operation::post("/domains/example.com/records")
            .param("type", "A")
            .param_opt::<u32>("priority", None)
            .param_opt("port", Some(80u32))
            .envelope("domain_record");

        assert_eq!(op.method, Method::POST);
        assert_eq!(Value::Object(op.params), json!({"type": "A", "port": 80}));
        assert_eq!(op.envelope, Some("domain_record"));
    }

    #[test]
    fn test_domain_record_optional_weight_is_weight() {
        let record = DomainRecord::new("SRV", "target.example.com")
            .port(5060)
            .weight(10);
        let op = record.apply_optional(Operation::get("/"));
        assert_eq!(op.params.get("weight"), Some(&json!(10)));
        assert_eq!(op.params.get("port"), Some(&json!(5060)));
        assert!(!op.params.contains_key("name"));
    }

    #[test]
    fn test_segment_encodes_reserved_characters() {
        assert_eq!(segment("123"), "123");
        assert_eq!(segment("a/b c"), "a%2Fb%20c");
    }

    #[test]
    fn test_action_kind_names() {
        assert_eq!(DropletAction::Reboot.kind(), "reboot");
        assert_eq!(
            DropletAction::Resize {
                size: "1gb".to_string()
            }
            .kind(),
            "resize"
        );
    }
}
