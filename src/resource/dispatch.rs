//! Operation Dispatch
//!
//! Maps operation names and positional string arguments to façade calls.
//! Used by the command-line entry point.

use super::manager::{Availability, Manager};
use crate::api::operation::{DomainRecord, FloatingIpTarget, NewDroplet};
use crate::error::{Error, Result};
use serde_json::Value;

/// Every operation name with its positional arguments
pub const OPERATIONS: &[(&str, &str)] = &[
    ("all_active_droplets", ""),
    (
        "new_droplet",
        "<name> <size> <image> <region> [ssh_key_ids] [private_networking] [backups]",
    ),
    ("show_droplet", "<id>"),
    ("reboot_droplet", "<id>"),
    ("power_cycle_droplet", "<id>"),
    ("shutdown_droplet", "<id>"),
    ("power_off_droplet", "<id>"),
    ("power_on_droplet", "<id>"),
    ("password_reset_droplet", "<id>"),
    ("resize_droplet", "<id> <size>"),
    ("snapshot_droplet", "<id> <name>"),
    ("restore_droplet", "<id> <image>"),
    ("rebuild_droplet", "<id> <image>"),
    ("enable_backups_droplet", "<id>"),
    ("disable_backups_droplet", "<id>"),
    ("rename_droplet", "<id> <name>"),
    ("destroy_droplet", "<id> [scrub_data]"),
    ("all_regions", ""),
    ("sizes", ""),
    ("all_images", "[filter]"),
    ("show_image", "<id>"),
    ("destroy_image", "<id>"),
    ("transfer_image", "<id> <region>"),
    ("all_ssh_keys", ""),
    ("new_ssh_key", "<name> <public_key>"),
    ("show_ssh_key", "<id>"),
    ("edit_ssh_key", "<id> <name> <public_key>"),
    ("destroy_ssh_key", "<id>"),
    ("all_domains", ""),
    ("new_domain", "<name> <ip_address>"),
    ("show_domain", "<id>"),
    ("destroy_domain", "<id>"),
    ("all_domain_records", "<domain>"),
    (
        "new_domain_record",
        "<domain> <type> <data> [name] [priority] [port] [weight]",
    ),
    ("show_domain_record", "<domain> <record_id>"),
    (
        "edit_domain_record",
        "<domain> <record_id> <type> <data> [name] [priority] [port] [weight]",
    ),
    ("destroy_domain_record", "<domain> <record_id>"),
    ("all_actions", ""),
    ("show_action", "<id>"),
    ("all_floating_ips", ""),
    ("new_floating_ip", "<droplet_id|region>"),
    ("show_floating_ip", "<ip>"),
    ("destroy_floating_ip", "<ip>"),
    ("assign_floating_ip", "<ip> <droplet_id>"),
    ("unassign_floating_ip", "<ip>"),
];

/// Usage line for an operation
pub fn usage(operation: &str) -> Option<String> {
    OPERATIONS
        .iter()
        .find(|(name, _)| *name == operation)
        .map(|(name, args)| format!("{} {}", name, args).trim_end().to_string())
}

/// Positional arguments of one invocation
struct Args<'a> {
    operation: &'a str,
    values: &'a [String],
}

impl<'a> Args<'a> {
    fn required(&self, index: usize, name: &str) -> Result<&'a str> {
        self.values
            .get(index)
            .map(|s| s.as_str())
            .ok_or_else(|| {
                let usage = usage(self.operation).unwrap_or_default();
                Error::InvalidInput(format!("missing parameter '{}' (usage: {})", name, usage))
            })
    }

    fn optional(&self, index: usize) -> Option<&'a str> {
        self.values
            .get(index)
            .map(|s| s.as_str())
            .filter(|s| !s.is_empty())
    }

    fn flag(&self, index: usize, default: bool) -> Result<bool> {
        match self.optional(index) {
            None => Ok(default),
            Some(value) => parse_bool(value),
        }
    }

    fn number(&self, index: usize, name: &str) -> Result<Option<u32>> {
        self.optional(index)
            .map(|value| {
                value.parse::<u32>().map_err(|_| {
                    Error::InvalidInput(format!("'{}' must be a number, got '{}'", name, value))
                })
            })
            .transpose()
    }

    /// Domain record fields starting at `index`
    fn domain_record(&self, index: usize) -> Result<DomainRecord> {
        let mut record = DomainRecord::new(
            self.required(index, "type")?,
            self.required(index + 1, "data")?,
        );
        if let Some(name) = self.optional(index + 2) {
            record = record.name(name);
        }
        if let Some(priority) = self.number(index + 3, "priority")? {
            record = record.priority(priority);
        }
        if let Some(port) = self.number(index + 4, "port")? {
            record = record.port(port);
        }
        if let Some(weight) = self.number(index + 5, "weight")? {
            record = record.weight(weight);
        }
        Ok(record)
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::InvalidInput(format!(
            "expected a boolean, got '{}'",
            other
        ))),
    }
}

fn list(items: Vec<Value>) -> Value {
    Value::Array(items)
}

/// Invoke a named operation
pub async fn invoke(
    manager: &Manager,
    operation: &str,
    values: &[String],
) -> Result<Availability<Value>> {
    tracing::debug!("invoke: operation={}, args={}", operation, values.len());

    let args = Args { operation, values };
    let value = match operation {
        // Droplets
        "all_active_droplets" => list(manager.all_active_droplets().await?),
        "new_droplet" => {
            let mut droplet = NewDroplet::new(
                args.required(0, "name")?,
                args.required(1, "size")?,
                args.required(2, "image")?,
                args.required(3, "region")?,
            )
            .private_networking(args.flag(5, false)?)
            .backups(args.flag(6, false)?);
            if let Some(keys) = args.optional(4) {
                droplet = droplet.ssh_keys(keys);
            }
            manager.new_droplet(droplet).await?
        },
        "show_droplet" => manager.show_droplet(args.required(0, "id")?).await?,
        "reboot_droplet" => Value::Object(manager.reboot_droplet(args.required(0, "id")?).await?),
        "power_cycle_droplet" => {
            Value::Object(manager.power_cycle_droplet(args.required(0, "id")?).await?)
        },
        "shutdown_droplet" => {
            Value::Object(manager.shutdown_droplet(args.required(0, "id")?).await?)
        },
        "power_off_droplet" => {
            Value::Object(manager.power_off_droplet(args.required(0, "id")?).await?)
        },
        "power_on_droplet" => {
            Value::Object(manager.power_on_droplet(args.required(0, "id")?).await?)
        },
        "password_reset_droplet" => {
            Value::Object(manager.password_reset_droplet(args.required(0, "id")?).await?)
        },
        "resize_droplet" => Value::Object(
            manager
                .resize_droplet(args.required(0, "id")?, args.required(1, "size")?)
                .await?,
        ),
        "snapshot_droplet" => Value::Object(
            manager
                .snapshot_droplet(args.required(0, "id")?, args.required(1, "name")?)
                .await?,
        ),
        "restore_droplet" => Value::Object(
            manager
                .restore_droplet(args.required(0, "id")?, args.required(1, "image")?)
                .await?,
        ),
        "rebuild_droplet" => Value::Object(
            manager
                .rebuild_droplet(args.required(0, "id")?, args.required(1, "image")?)
                .await?,
        ),
        "enable_backups_droplet" => {
            Value::Object(manager.enable_backups_droplet(args.required(0, "id")?).await?)
        },
        "disable_backups_droplet" => {
            Value::Object(manager.disable_backups_droplet(args.required(0, "id")?).await?)
        },
        "rename_droplet" => Value::Object(
            manager
                .rename_droplet(args.required(0, "id")?, args.required(1, "name")?)
                .await?,
        ),
        "destroy_droplet" => Value::Object(
            manager
                .destroy_droplet(args.required(0, "id")?, args.flag(1, true)?)
                .await?,
        ),

        // Regions, sizes
        "all_regions" => list(manager.all_regions().await?),
        "sizes" => list(manager.sizes().await?),

        // Images
        "all_images" => list(
            manager
                .all_images(args.optional(0).unwrap_or("global"))
                .await?,
        ),
        "show_image" => manager.show_image(args.required(0, "id")?).await?,
        "destroy_image" => Value::Object(manager.destroy_image(args.required(0, "id")?).await?),
        "transfer_image" => Value::Object(
            manager
                .transfer_image(args.required(0, "id")?, args.required(1, "region")?)
                .await?,
        ),

        // SSH keys
        "all_ssh_keys" => list(manager.all_ssh_keys().await?),
        "new_ssh_key" => {
            manager
                .new_ssh_key(args.required(0, "name")?, args.required(1, "public_key")?)
                .await?
        },
        "show_ssh_key" => manager.show_ssh_key(args.required(0, "id")?).await?,
        "edit_ssh_key" => {
            manager
                .edit_ssh_key(
                    args.required(0, "id")?,
                    args.required(1, "name")?,
                    args.required(2, "public_key")?,
                )
                .await?
        },
        "destroy_ssh_key" => {
            Value::Object(manager.destroy_ssh_key(args.required(0, "id")?).await?)
        },

        // Domains
        "all_domains" => list(manager.all_domains().await?),
        "new_domain" => {
            manager
                .new_domain(args.required(0, "name")?, args.required(1, "ip_address")?)
                .await?
        },
        "show_domain" => manager.show_domain(args.required(0, "id")?).await?,
        "destroy_domain" => Value::Object(manager.destroy_domain(args.required(0, "id")?).await?),
        "all_domain_records" => list(
            manager
                .all_domain_records(args.required(0, "domain")?)
                .await?,
        ),
        "new_domain_record" => {
            manager
                .new_domain_record(args.required(0, "domain")?, args.domain_record(1)?)
                .await?
        },
        "show_domain_record" => {
            manager
                .show_domain_record(args.required(0, "domain")?, args.required(1, "record_id")?)
                .await?
        },
        "edit_domain_record" => {
            manager
                .edit_domain_record(
                    args.required(0, "domain")?,
                    args.required(1, "record_id")?,
                    args.domain_record(2)?,
                )
                .await?
        },
        "destroy_domain_record" => Value::Object(
            manager
                .destroy_domain_record(args.required(0, "domain")?, args.required(1, "record_id")?)
                .await?,
        ),

        // Actions
        "all_actions" => return Ok(manager.all_actions().await?.map(list)),
        "show_action" | "show_event" => manager.show_action(args.required(0, "id")?).await?,

        // Floating IPs
        "all_floating_ips" => return Ok(manager.all_floating_ips().await?.map(list)),
        "new_floating_ip" => {
            let target = args.required(0, "droplet_id|region")?;
            let target = if target.chars().all(|c| c.is_ascii_digit()) {
                FloatingIpTarget::Droplet(target.to_string())
            } else {
                FloatingIpTarget::Region(target.to_string())
            };
            return manager.new_floating_ip(target).await;
        },
        "show_floating_ip" => return manager.show_floating_ip(args.required(0, "ip")?).await,
        "destroy_floating_ip" => {
            return Ok(manager
                .destroy_floating_ip(args.required(0, "ip")?)
                .await?
                .map(Value::Object))
        },
        "assign_floating_ip" => {
            return Ok(manager
                .assign_floating_ip(args.required(0, "ip")?, args.required(1, "droplet_id")?)
                .await?
                .map(Value::Object))
        },
        "unassign_floating_ip" => {
            return Ok(manager
                .unassign_floating_ip(args.required(0, "ip")?)
                .await?
                .map(Value::Object))
        },

        _ => {
            return Err(Error::InvalidInput(format!(
                "Unknown operation: {}",
                operation
            )))
        },
    };

    Ok(Availability::Available(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_usage_lookup() {
        assert_eq!(usage("show_droplet"), Some("show_droplet <id>".to_string()));
        assert_eq!(usage("sizes"), Some("sizes".to_string()));
        assert_eq!(usage("nope"), None);
    }

    #[test]
    fn test_operation_names_are_unique() {
        let mut names: Vec<_> = OPERATIONS.iter().map(|(name, _)| *name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), OPERATIONS.len());
    }

    #[test]
    fn test_missing_required_argument_mentions_usage() {
        let values = strings(&[]);
        let args = Args {
            operation: "resize_droplet",
            values: &values,
        };
        let err = args.required(0, "id").unwrap_err();
        assert!(err.to_string().contains("resize_droplet <id> <size>"));
    }

    #[test]
    fn test_domain_record_arguments() {
        let values = strings(&["example.com", "SRV", "sip.example.com", "_sip._tcp", "", "5060", "10"]);
        let args = Args {
            operation: "new_domain_record",
            values: &values,
        };
        let record = args.domain_record(1).unwrap();
        assert_eq!(record.record_type, "SRV");
        assert_eq!(record.name.as_deref(), Some("_sip._tcp"));
        assert_eq!(record.priority, None);
        assert_eq!(record.port, Some(5060));
        assert_eq!(record.weight, Some(10));
    }

    #[test]
    fn test_bad_number_is_rejected() {
        let values = strings(&["A", "1.2.3.4", "www", "high"]);
        let args = Args {
            operation: "new_domain_record",
            values: &values,
        };
        assert!(args.domain_record(0).is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("True").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(parse_bool("maybe").is_err());
    }
}
