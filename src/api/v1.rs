//! Legacy (v1) protocol
//!
//! Every call is a GET against a per-action path, with `client_id` and
//! `api_key` riding along as query parameters. Success is signalled by
//! `"status": "OK"` in the envelope.

use super::operation::{segment, Call, DropletAction, Operation, Params};
use super::protocol::{envelope_message, query_pairs, ApiVersion, Protocol};
use crate::error::{Error, Result};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::Value;

/// Success sentinel of the legacy envelope
const STATUS_OK: &str = "OK";

#[derive(Debug)]
pub struct LegacyProtocol {
    client_id: String,
    api_key: String,
}

impl LegacyProtocol {
    pub fn new(client_id: String, api_key: String) -> Self {
        Self { client_id, api_key }
    }
}

impl Protocol for LegacyProtocol {
    fn version(&self) -> ApiVersion {
        ApiVersion::V1
    }

    fn describe(&self, call: &Call) -> Option<Operation> {
        let op = match call {
            // Droplets
            Call::AllActiveDroplets => Operation::get("/droplets/").envelope("droplets"),
            Call::NewDroplet(droplet) => {
                let op = Operation::get("/droplets/new")
                    .param("name", droplet.name.as_str())
                    .param("size_id", droplet.size.as_str())
                    .param("image_id", droplet.image.as_str())
                    .param("region_id", droplet.region.as_str())
                    .param("virtio", droplet.virtio)
                    .param("private_networking", droplet.private_networking)
                    .param("backups_enabled", droplet.backups)
                    .envelope("droplet");
                if droplet.ssh_keys.is_empty() {
                    op
                } else {
                    op.param("ssh_key_ids", droplet.ssh_keys.joined())
                }
            },
            Call::ShowDroplet { id } => {
                Operation::get(format!("/droplets/{}", segment(id))).envelope("droplet")
            },
            Call::DropletAction { id, action } => {
                let op = Operation::get(format!("/droplets/{}/{}/", segment(id), action.kind()));
                match action {
                    DropletAction::Resize { size } => op.param("size_id", size.as_str()),
                    DropletAction::Snapshot { name } | DropletAction::Rename { name } => {
                        op.param("name", name.as_str())
                    },
                    DropletAction::Restore { image } | DropletAction::Rebuild { image } => {
                        op.param("image_id", image.as_str())
                    },
                    _ => op,
                }
            },
            Call::DestroyDroplet { id, scrub_data } => {
                Operation::get(format!("/droplets/{}/destroy/", segment(id)))
                    .param("scrub_data", if *scrub_data { "1" } else { "0" })
            },

            // Regions, sizes
            Call::AllRegions => Operation::get("/regions/").envelope("regions"),
            Call::Sizes => Operation::get("/sizes/").envelope("sizes"),

            // Images
            Call::AllImages { filter } => Operation::get("/images/")
                .param("filter", filter.as_str())
                .envelope("images"),
            Call::ShowImage { id } => Operation::get(format!("/images/{}/", segment(id)))
                .param("image_id", id.as_str())
                .envelope("image"),
            Call::DestroyImage { id } => Operation::get(format!("/images/{}/destroy/", segment(id))),
            Call::TransferImage { id, region } => {
                Operation::get(format!("/images/{}/transfer/", segment(id)))
                    .param("region_id", region.as_str())
            },

            // SSH keys
            Call::AllSshKeys => Operation::get("/ssh_keys/").envelope("ssh_keys"),
            Call::NewSshKey { name, public_key } => Operation::get("/ssh_keys/new/")
                .param("name", name.as_str())
                .param("ssh_pub_key", public_key.as_str())
                .envelope("ssh_key"),
            Call::ShowSshKey { id } => {
                Operation::get(format!("/ssh_keys/{}/", segment(id))).envelope("ssh_key")
            },
            Call::EditSshKey {
                id,
                name,
                public_key,
            } => Operation::get(format!("/ssh_keys/{}/edit/", segment(id)))
                .param("name", name.as_str())
                .param("ssh_pub_key", public_key.as_str())
                .envelope("ssh_key"),
            Call::DestroySshKey { id } => {
                Operation::get(format!("/ssh_keys/{}/destroy/", segment(id)))
            },

            // Domains
            Call::AllDomains => Operation::get("/domains/").envelope("domains"),
            Call::NewDomain { name, ip_address } => Operation::get("/domains/new/")
                .param("name", name.as_str())
                .param("ip_address", ip_address.as_str())
                .envelope("domain"),
            Call::ShowDomain { id } => {
                Operation::get(format!("/domains/{}/", segment(id))).envelope("domain")
            },
            Call::DestroyDomain { id } => {
                Operation::get(format!("/domains/{}/destroy/", segment(id)))
            },
            Call::AllDomainRecords { domain } => {
                Operation::get(format!("/domains/{}/records/", segment(domain))).envelope("records")
            },
            Call::NewDomainRecord { domain, record } => {
                let op = Operation::get(format!("/domains/{}/records/new/", segment(domain)))
                    .param("record_type", record.record_type.as_str())
                    .param("data", record.data.as_str())
                    .envelope("record");
                record.apply_optional(op)
            },
            Call::ShowDomainRecord { domain, record_id } => Operation::get(format!(
                "/domains/{}/records/{}",
                segment(domain),
                segment(record_id)
            ))
            .envelope("record"),
            Call::EditDomainRecord {
                domain,
                record_id,
                record,
            } => {
                let op = Operation::get(format!(
                    "/domains/{}/records/{}/edit/",
                    segment(domain),
                    segment(record_id)
                ))
                .param("record_type", record.record_type.as_str())
                .param("data", record.data.as_str())
                .envelope("record");
                record.apply_optional(op)
            },
            Call::DestroyDomainRecord { domain, record_id } => Operation::get(format!(
                "/domains/{}/records/{}/destroy/",
                segment(domain),
                segment(record_id)
            )),

            // Events
            Call::ShowAction { id } => {
                Operation::get(format!("/events/{}", segment(id))).envelope("event")
            },
            Call::AllActions => return None,

            // Floating IPs only exist in v2
            Call::AllFloatingIps
            | Call::NewFloatingIp(_)
            | Call::ShowFloatingIp { .. }
            | Call::DestroyFloatingIp { .. }
            | Call::AssignFloatingIp { .. }
            | Call::UnassignFloatingIp { .. } => return None,
        };
        Some(op)
    }

    fn wire_method(&self, _requested: &Method) -> Result<Method> {
        // The legacy API mutates through query-style GETs
        Ok(Method::GET)
    }

    fn authorize(
        &self,
        request: RequestBuilder,
        _method: &Method,
        params: &Params,
    ) -> Result<RequestBuilder> {
        let mut signed = params.clone();
        signed.insert("client_id".to_string(), Value::String(self.client_id.clone()));
        signed.insert("api_key".to_string(), Value::String(self.api_key.clone()));
        Ok(request.query(&query_pairs(&signed)))
    }

    fn check_envelope(&self, status: StatusCode, envelope: &Value) -> Result<()> {
        if envelope.get("status").and_then(|v| v.as_str()) == Some(STATUS_OK) {
            return Ok(());
        }
        Err(Error::Api {
            status: status.as_u16(),
            message: envelope_message(envelope, &["error_message"])
                .unwrap_or_else(|| "request failed without an error message".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::operation::{DomainRecord, NewDroplet};
    use serde_json::json;

    fn protocol() -> LegacyProtocol {
        LegacyProtocol::new("client".to_string(), "key".to_string())
    }

    fn describe(call: Call) -> Operation {
        protocol().describe(&call).expect("operation should exist in v1")
    }

    #[test]
    fn test_new_droplet_joins_key_ids() {
        let op = describe(Call::NewDroplet(
            NewDroplet::new("web", "66", "1601", "1").ssh_keys(vec!["12", "34"]),
        ));
        assert_eq!(op.path, "/droplets/new");
        assert_eq!(op.method, Method::GET);
        assert_eq!(op.envelope, Some("droplet"));
        assert_eq!(op.params["size_id"], json!("66"));
        assert_eq!(op.params["ssh_key_ids"], json!("12,34"));
        assert_eq!(op.params["backups_enabled"], json!(false));
    }

    #[test]
    fn test_new_droplet_without_keys_omits_param() {
        let op = describe(Call::NewDroplet(NewDroplet::new("web", "66", "1601", "1")));
        assert!(!op.params.contains_key("ssh_key_ids"));
    }

    #[test]
    fn test_actions_have_distinct_paths() {
        let op = describe(Call::DropletAction {
            id: "219133".to_string(),
            action: DropletAction::PowerOff,
        });
        assert_eq!(op.path, "/droplets/219133/power_off/");
        assert!(op.params.is_empty());
        assert!(op.envelope.is_none());

        let op = describe(Call::DropletAction {
            id: "219133".to_string(),
            action: DropletAction::Rebuild {
                image: "1601".to_string(),
            },
        });
        assert_eq!(op.path, "/droplets/219133/rebuild/");
        assert_eq!(op.params["image_id"], json!("1601"));
    }

    #[test]
    fn test_destroy_droplet_scrub_flag() {
        let op = describe(Call::DestroyDroplet {
            id: "7".to_string(),
            scrub_data: true,
        });
        assert_eq!(op.path, "/droplets/7/destroy/");
        assert_eq!(op.params["scrub_data"], json!("1"));
    }

    #[test]
    fn test_edit_domain_record_builds_fresh_params() {
        let op = describe(Call::EditDomainRecord {
            domain: "100".to_string(),
            record_id: "200".to_string(),
            record: DomainRecord::new("A", "1.2.3.4").name("www"),
        });
        assert_eq!(op.path, "/domains/100/records/200/edit/");
        assert_eq!(op.params["record_type"], json!("A"));
        assert_eq!(op.params["name"], json!("www"));
        assert_eq!(op.envelope, Some("record"));
    }

    #[test]
    fn test_actions_listing_and_floating_ips_unavailable() {
        let p = protocol();
        assert!(p.describe(&Call::AllActions).is_none());
        assert!(p.describe(&Call::AllFloatingIps).is_none());
        assert!(p
            .describe(&Call::UnassignFloatingIp {
                ip: "1.2.3.4".to_string()
            })
            .is_none());
    }

    #[test]
    fn test_every_method_goes_out_as_get() {
        let p = protocol();
        assert_eq!(p.wire_method(&Method::DELETE).unwrap(), Method::GET);
        assert_eq!(p.wire_method(&Method::PATCH).unwrap(), Method::GET);
    }

    #[test]
    fn test_check_envelope() {
        let p = protocol();
        assert!(p
            .check_envelope(StatusCode::OK, &json!({"status": "OK", "droplets": []}))
            .is_ok());

        let err = p
            .check_envelope(
                StatusCode::OK,
                &json!({"status": "ERROR", "error_message": "No Droplets Found"}),
            )
            .unwrap_err();
        assert_eq!(err.api_message(), Some("No Droplets Found"));
    }
}
