//! Property-based tests using proptest
//!
//! These tests verify response normalization and SSH key id handling
//! using randomized inputs.

use doapi::resource::normalize::{droplet_ip, normalize_droplet, strip_status, unwrap_list};
use doapi::KeyIds;
use proptest::prelude::*;
use serde_json::{json, Value};

/// Generate an arbitrary IPv4 address string
fn arb_ipv4() -> impl Strategy<Value = String> {
    (any::<u8>(), any::<u8>(), any::<u8>(), any::<u8>())
        .prop_map(|(a, b, c, d)| format!("{}.{}.{}.{}", a, b, c, d))
}

/// Generate one `networks.v4` entry
fn arb_network() -> impl Strategy<Value = Value> {
    (arb_ipv4(), prop_oneof!["public", "private"])
        .prop_map(|(ip, kind)| json!({"ip_address": ip, "type": kind, "netmask": "255.255.240.0"}))
}

/// Generate a droplet carrying a networks block
fn arb_droplet() -> impl Strategy<Value = Value> {
    (
        1u64..100_000_000,
        "[a-z][a-z0-9-]{0,30}",
        prop::collection::vec(arb_network(), 0..6),
    )
        .prop_map(|(id, name, v4)| {
            json!({
                "id": id,
                "name": name,
                "status": "active",
                "networks": {"v4": v4, "v6": []}
            })
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn ip_is_first_v4_entry(droplet in arb_droplet()) {
        let expected = droplet["networks"]["v4"]
            .get(0)
            .and_then(|n| n["ip_address"].as_str())
            .unwrap_or("")
            .to_string();

        prop_assert_eq!(droplet_ip(&droplet), Some(expected));
    }

    #[test]
    fn normalize_only_adds_ip_address(droplet in arb_droplet()) {
        let normalized = normalize_droplet(droplet.clone());

        let before = droplet.as_object().unwrap();
        let after = normalized.as_object().unwrap();
        prop_assert_eq!(after.len(), before.len() + 1);
        for (key, value) in before {
            prop_assert_eq!(after.get(key), Some(value));
        }
        prop_assert!(after["ip_address"].is_string());
    }

    #[test]
    fn normalize_is_idempotent(droplet in arb_droplet()) {
        let once = normalize_droplet(droplet);
        let twice = normalize_droplet(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn droplets_without_networks_are_untouched(
        id in 1u64..1_000_000,
        ip in arb_ipv4(),
    ) {
        // Legacy droplets already carry a flat address
        let droplet = json!({"id": id, "ip_address": ip});
        prop_assert_eq!(droplet_ip(&droplet), None);
        prop_assert_eq!(normalize_droplet(droplet.clone()), droplet);
    }

    #[test]
    fn strip_status_removes_only_status(
        status in prop_oneof!["OK", "ERROR", "in-progress"],
        event_id in any::<u32>(),
    ) {
        let record = strip_status(json!({"status": status, "event_id": event_id}));
        prop_assert!(!record.contains_key("status"));
        prop_assert_eq!(record.get("event_id"), Some(&json!(event_id)));
    }

    #[test]
    fn unwrap_list_preserves_order(names in prop::collection::vec("[a-z]{1,12}", 0..20)) {
        let items: Vec<Value> = names.iter().map(|n| json!({"name": n})).collect();
        let envelope = json!({"status": "OK", "regions": items.clone()});

        prop_assert_eq!(unwrap_list(envelope, "regions").unwrap(), items);
    }
}

mod key_id_tests {
    use super::*;

    proptest! {
        #[test]
        fn comma_string_and_list_agree(ids in prop::collection::vec(1u64..10_000_000, 0..10)) {
            let joined = ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(",");

            let from_string = KeyIds::from(joined.as_str());
            let from_list = KeyIds::from(ids.clone());

            prop_assert_eq!(&from_string, &from_list);
            prop_assert_eq!(from_string.joined(), joined);
        }

        #[test]
        fn numeric_ids_become_json_numbers(ids in prop::collection::vec(1u64..10_000_000, 1..10)) {
            let array = KeyIds::from(ids.clone()).to_array();
            let expected: Vec<Value> = ids.iter().map(|id| json!(id)).collect();
            prop_assert_eq!(array, Value::Array(expected));
        }

        #[test]
        fn whitespace_and_empty_parts_are_dropped(ids in prop::collection::vec(1u64..1000, 1..8)) {
            let messy = ids
                .iter()
                .map(|id| format!(" {} ", id))
                .collect::<Vec<_>>()
                .join(",,");

            let keys = KeyIds::from(messy);
            prop_assert_eq!(keys.ids().len(), ids.len());
            prop_assert!(!keys.is_empty());
        }
    }
}
