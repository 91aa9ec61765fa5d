//! Current (v2) protocol
//!
//! RESTful resources under `/v2`, authenticated with a bearer token. State
//! changes go to a resource's `actions` sub-path as a `type`-discriminated
//! POST. A `{"id": "not_found"}` envelope is a failure whatever the status.

use super::operation::{id_value, segment, Call, DropletAction, FloatingIpTarget, Operation, Params};
use super::protocol::{envelope_message, query_pairs, ApiVersion, Protocol};
use crate::error::{Error, Result};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::{json, Value};

/// Error discriminator in the `id` field
const ID_NOT_FOUND: &str = "not_found";

#[derive(Debug)]
pub struct BearerProtocol {
    token: String,
}

impl BearerProtocol {
    pub fn new(token: String) -> Self {
        Self { token }
    }
}

/// Image filter of the legacy listing, expressed as v2 query parameters
fn image_filter(op: Operation, filter: &str) -> Operation {
    match filter {
        "" | "global" => op,
        "my_images" => op.param("private", "true"),
        other => op.param("type", other),
    }
}

impl Protocol for BearerProtocol {
    fn version(&self) -> ApiVersion {
        ApiVersion::V2
    }

    fn describe(&self, call: &Call) -> Option<Operation> {
        let op = match call {
            // Droplets
            Call::AllActiveDroplets => Operation::get("/droplets/").envelope("droplets"),
            Call::NewDroplet(droplet) => {
                let op = Operation::post("/droplets")
                    .param("name", droplet.name.as_str())
                    .param("size", droplet.size.as_str())
                    .param("image", id_value(&droplet.image))
                    .param("region", droplet.region.as_str())
                    .param("backups", droplet.backups)
                    .param("private_networking", droplet.private_networking)
                    .param("ipv6", droplet.ipv6)
                    .param_opt("user_data", droplet.user_data.clone())
                    .envelope("droplet");
                if droplet.ssh_keys.is_empty() {
                    op
                } else {
                    op.param("ssh_keys", droplet.ssh_keys.to_array())
                }
            },
            Call::ShowDroplet { id } => {
                Operation::get(format!("/droplets/{}", segment(id))).envelope("droplet")
            },
            Call::DropletAction { id, action } => {
                let op = Operation::post(format!("/droplets/{}/actions", segment(id)))
                    .param("type", action.kind());
                match action {
                    DropletAction::Resize { size } => op.param("size", size.as_str()),
                    DropletAction::Snapshot { name } | DropletAction::Rename { name } => {
                        op.param("name", name.as_str())
                    },
                    DropletAction::Restore { image } | DropletAction::Rebuild { image } => {
                        op.param("image", id_value(image))
                    },
                    _ => op,
                }
            },
            // No scrub flag in v2
            Call::DestroyDroplet { id, .. } => {
                Operation::delete(format!("/droplets/{}", segment(id)))
            },

            // Regions, sizes
            Call::AllRegions => Operation::get("/regions/").envelope("regions"),
            Call::Sizes => Operation::get("/sizes/").envelope("sizes"),

            // Images
            Call::AllImages { filter } => {
                image_filter(Operation::get("/images/"), filter).envelope("images")
            },
            Call::ShowImage { id } => {
                Operation::get(format!("/images/{}", segment(id))).envelope("image")
            },
            Call::DestroyImage { id } => Operation::delete(format!("/images/{}", segment(id))),
            Call::TransferImage { id, region } => {
                Operation::post(format!("/images/{}/actions", segment(id)))
                    .param("type", "transfer")
                    .param("region", region.as_str())
            },

            // SSH keys live under the account namespace
            Call::AllSshKeys => Operation::get("/account/keys").envelope("ssh_keys"),
            Call::NewSshKey { name, public_key } => Operation::post("/account/keys")
                .param("name", name.as_str())
                .param("public_key", public_key.as_str())
                .envelope("ssh_key"),
            Call::ShowSshKey { id } => {
                Operation::get(format!("/account/keys/{}", segment(id))).envelope("ssh_key")
            },
            // Keys can only be renamed in v2
            Call::EditSshKey { id, name, .. } => {
                Operation::put(format!("/account/keys/{}", segment(id)))
                    .param("name", name.as_str())
                    .envelope("ssh_key")
            },
            Call::DestroySshKey { id } => {
                Operation::delete(format!("/account/keys/{}", segment(id)))
            },

            // Domains
            Call::AllDomains => Operation::get("/domains/").envelope("domains"),
            Call::NewDomain { name, ip_address } => Operation::post("/domains")
                .param("name", name.as_str())
                .param("ip_address", ip_address.as_str())
                .envelope("domain"),
            Call::ShowDomain { id } => {
                Operation::get(format!("/domains/{}", segment(id))).envelope("domain")
            },
            Call::DestroyDomain { id } => Operation::delete(format!("/domains/{}", segment(id))),
            Call::AllDomainRecords { domain } => {
                Operation::get(format!("/domains/{}/records", segment(domain)))
                    .envelope("domain_records")
            },
            Call::NewDomainRecord { domain, record } => {
                let op = Operation::post(format!("/domains/{}/records", segment(domain)))
                    .param("type", record.record_type.as_str())
                    .param("data", record.data.as_str())
                    .envelope("domain_record");
                record.apply_optional(op)
            },
            Call::ShowDomainRecord { domain, record_id } => Operation::get(format!(
                "/domains/{}/records/{}",
                segment(domain),
                segment(record_id)
            ))
            .envelope("domain_record"),
            Call::EditDomainRecord {
                domain,
                record_id,
                record,
            } => {
                let op = Operation::put(format!(
                    "/domains/{}/records/{}",
                    segment(domain),
                    segment(record_id)
                ))
                .param("type", record.record_type.as_str())
                .param("data", record.data.as_str())
                .envelope("domain_record");
                record.apply_optional(op)
            },
            Call::DestroyDomainRecord { domain, record_id } => Operation::delete(format!(
                "/domains/{}/records/{}",
                segment(domain),
                segment(record_id)
            )),

            // Actions
            Call::AllActions => Operation::get("/actions").envelope("actions"),
            Call::ShowAction { id } => {
                Operation::get(format!("/actions/{}", segment(id))).envelope("action")
            },

            // Floating IPs
            Call::AllFloatingIps => Operation::get("/floating_ips").envelope("floating_ips"),
            Call::NewFloatingIp(target) => {
                let op = Operation::post("/floating_ips").envelope("floating_ip");
                match target {
                    FloatingIpTarget::Droplet(droplet_id) => {
                        op.param("droplet_id", id_value(droplet_id))
                    },
                    FloatingIpTarget::Region(region) => op.param("region", region.as_str()),
                }
            },
            Call::ShowFloatingIp { ip } => {
                Operation::get(format!("/floating_ips/{}", segment(ip))).envelope("floating_ip")
            },
            Call::DestroyFloatingIp { ip } => {
                Operation::delete(format!("/floating_ips/{}", segment(ip)))
            },
            Call::AssignFloatingIp { ip, droplet_id } => {
                Operation::post(format!("/floating_ips/{}/actions", segment(ip)))
                    .param("type", "assign")
                    .param("droplet_id", id_value(droplet_id))
            },
            Call::UnassignFloatingIp { ip } => {
                Operation::post(format!("/floating_ips/{}/actions", segment(ip)))
                    .param("type", "unassign")
            },
        };
        Some(op)
    }

    fn wire_method(&self, requested: &Method) -> Result<Method> {
        match *requested {
            Method::GET | Method::POST | Method::PUT | Method::DELETE => Ok(requested.clone()),
            _ => Err(Error::UnsupportedMethod(requested.clone())),
        }
    }

    fn authorize(
        &self,
        request: RequestBuilder,
        method: &Method,
        params: &Params,
    ) -> Result<RequestBuilder> {
        let request = request.bearer_auth(&self.token);
        match *method {
            Method::GET => Ok(request.query(&query_pairs(params))),
            Method::POST | Method::PUT => Ok(request.json(params)),
            _ => Ok(request),
        }
    }

    fn empty_body_envelope(&self, method: &Method, status: StatusCode) -> Option<Value> {
        (*method == Method::DELETE).then(|| json!({ "status": status.as_u16() }))
    }

    fn check_envelope(&self, status: StatusCode, envelope: &Value) -> Result<()> {
        if envelope.get("id").and_then(|v| v.as_str()) != Some(ID_NOT_FOUND) {
            return Ok(());
        }
        Err(Error::Api {
            status: status.as_u16(),
            message: envelope_message(envelope, &["message"])
                .unwrap_or_else(|| ID_NOT_FOUND.to_string()),
        })
    }

    fn reload_after_create(&self) -> bool {
        true
    }
}
