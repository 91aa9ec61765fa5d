//! Response normalization
//!
//! Turns decoded envelopes into what callers see: the payload under the
//! operation's envelope key, mutation results without the `status`
//! discriminator, and droplets with a flat `ip_address`.

use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// A JSON object as handed back to callers
pub type Record = Map<String, Value>;

/// Success discriminator stripped from mutation results
const STATUS_KEY: &str = "status";

/// Pull the payload out of an envelope
pub fn unwrap_envelope(envelope: Value, key: &str) -> Result<Value> {
    let Value::Object(mut map) = envelope else {
        return Err(Error::UnexpectedResponse(format!(
            "expected a JSON object carrying '{}'",
            key
        )));
    };
    map.remove(key)
        .ok_or_else(|| Error::UnexpectedResponse(format!("missing '{}' in response", key)))
}

/// Pull a list payload out of an envelope
pub fn unwrap_list(envelope: Value, key: &str) -> Result<Vec<Value>> {
    match unwrap_envelope(envelope, key)? {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        other => Err(Error::UnexpectedResponse(format!(
            "expected '{}' to be a list, got {}",
            key,
            type_name(&other)
        ))),
    }
}

/// Drop the top-level `status` key of a mutation result
pub fn strip_status(envelope: Value) -> Record {
    let mut record = match envelope {
        Value::Object(map) => map,
        _ => Record::new(),
    };
    record.remove(STATUS_KEY);
    record
}

/// Address of a droplet: the first entry of its `networks.v4` list, `""`
/// when that list is empty. `None` when the droplet carries no `networks`.
pub fn droplet_ip(droplet: &Value) -> Option<String> {
    let networks = droplet.get("networks")?.as_object()?;

    let address = networks
        .get("v4")
        .and_then(|v| v.as_array())
        .and_then(|v4| v4.first())
        .and_then(|entry| entry.get("ip_address"))
        .and_then(|v| v.as_str())
        .unwrap_or_default();

    Some(address.to_string())
}

/// Synthesize the flat `ip_address` field on a droplet
pub fn normalize_droplet(mut droplet: Value) -> Value {
    if let Some(ip) = droplet_ip(&droplet) {
        if let Some(obj) = droplet.as_object_mut() {
            obj.insert("ip_address".to_string(), Value::String(ip));
        }
    }
    droplet
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_envelope() {
        let envelope = json!({"status": "OK", "droplet": {"id": 1}});
        assert_eq!(unwrap_envelope(envelope, "droplet").unwrap(), json!({"id": 1}));

        let err = unwrap_envelope(json!({"status": "OK"}), "droplet").unwrap_err();
        assert!(err.to_string().contains("missing 'droplet'"));
    }

    #[test]
    fn test_unwrap_list_rejects_non_lists() {
        let items = unwrap_list(json!({"sizes": [{"memory": 512}]}), "sizes").unwrap();
        assert_eq!(items.len(), 1);
        assert!(unwrap_list(json!({"sizes": {}}), "sizes").is_err());
    }

    #[test]
    fn test_strip_status_from_synthesized_delete() {
        assert!(strip_status(json!({"status": 204})).is_empty());
        let record = strip_status(json!({"status": "OK", "event_id": 7}));
        assert_eq!(Value::Object(record), json!({"event_id": 7}));
    }

    #[test]
    fn test_droplet_ip_takes_first_entry_even_if_private() {
        let droplet = json!({
            "networks": {"v4": [
                {"ip_address": "10.128.0.5", "type": "private"},
                {"ip_address": "203.0.113.7", "type": "public"}
            ]}
        });
        let normalized = normalize_droplet(droplet);
        assert_eq!(normalized["ip_address"], json!("10.128.0.5"));
    }

    #[test]
    fn test_droplet_ip_single_untyped_entry() {
        let droplet = json!({"networks": {"v4": [{"ip_address": "127.0.0.1"}]}});
        assert_eq!(droplet_ip(&droplet), Some("127.0.0.1".to_string()));
    }

    #[test]
    fn test_droplet_without_v4_gets_empty_address() {
        let droplet = json!({"networks": {"v4": [], "v6": [{"ip_address": "::1"}]}});
        let normalized = normalize_droplet(droplet);
        assert_eq!(normalized["ip_address"], json!(""));
    }

    #[test]
    fn test_legacy_droplet_keeps_its_address() {
        let droplet = json!({"id": 1, "ip_address": "5.6.7.8"});
        assert_eq!(normalize_droplet(droplet.clone()), droplet);
    }
}
