use super::facet::FacetValue;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Health verdict derived from a single facet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Good,
    Failed,
    Healthy,
    Unhealthy,
    Unknown,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Good => "Good",
            Verdict::Failed => "Failed",
            Verdict::Healthy => "Healthy",
            Verdict::Unhealthy => "Unhealthy",
            Verdict::Unknown => "Unknown",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Verdict::Good => "state-good",
            Verdict::Failed => "state-failed",
            Verdict::Healthy => "state-healthy",
            Verdict::Unhealthy => "state-unhealthy",
            Verdict::Unknown => "state-unknown",
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Verdict::Good | Verdict::Healthy)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Verdict::Failed | Verdict::Unhealthy)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a facet by name and value.
///
/// Total over every input: unrecognized names and unexpected shapes resolve
/// to `Unknown`. String tests are case-insensitive substring matches.
pub fn classify(facet: &str, value: &FacetValue) -> Verdict {
    match facet {
        "autopilot_health" | "autopilot_state" => value
            .as_structured()
            .map(|map| match map.get("Healthy") {
                Some(Value::Bool(true)) => Verdict::Healthy,
                Some(Value::Bool(false)) => Verdict::Unhealthy,
                _ => Verdict::Unknown,
            })
            .unwrap_or(Verdict::Unknown),
        "license_report" => value
            .as_structured()
            .map(|map| match map.get("Valid") {
                Some(Value::Bool(true)) => Verdict::Good,
                Some(Value::Bool(false)) => Verdict::Failed,
                _ => Verdict::Unknown,
            })
            .unwrap_or(Verdict::Unknown),
        "raft_peers" | "members" | "catalog_nodes" | "jobs" => good_if(non_empty_list(value)),
        "leader" => classify_leader(value),
        "ha_status" => value
            .as_structured()
            .map(classify_ha_status)
            .unwrap_or(Verdict::Unknown),
        "system_health" => value
            .as_structured()
            .map(|map| {
                if truthy(map.get("initialized"))
                    && !truthy(map.get("sealed"))
                    && !truthy(map.get("standby"))
                {
                    Verdict::Good
                } else if truthy(map.get("sealed")) {
                    Verdict::Failed
                } else {
                    Verdict::Unknown
                }
            })
            .unwrap_or(Verdict::Unknown),
        "seal_status" => value
            .as_structured()
            .map(|map| match map.get("sealed") {
                Some(Value::Bool(false)) => Verdict::Good,
                Some(Value::Bool(true)) => Verdict::Failed,
                _ => Verdict::Unknown,
            })
            .unwrap_or(Verdict::Unknown),
        "license" => match value.as_structured() {
            Some(map) if map.contains_key("autoloaded") || map.contains_key("expiration_time") => {
                Verdict::Good
            }
            _ => Verdict::Unknown,
        },
        "replication_status" => value
            .as_structured()
            .map(classify_replication)
            .unwrap_or(Verdict::Unknown),
        "autopilot" => {
            if let Some(map) = value.as_structured() {
                if truthy(map.get("errors")) {
                    Verdict::Unknown
                } else {
                    Verdict::Good
                }
            } else if text_contains(value, "not enabled") {
                Verdict::Unknown
            } else if text_contains(value, "error") {
                Verdict::Failed
            } else {
                Verdict::Unknown
            }
        }
        "rate_limit_quotas" => {
            if non_empty_structured(value) {
                Verdict::Good
            } else {
                Verdict::Unknown
            }
        }
        "lease_count_quota" => {
            if text_contains(value, "no global lease count quota set") {
                Verdict::Unknown
            } else if non_empty_structured(value) {
                Verdict::Good
            } else if text_contains(value, "error") {
                Verdict::Failed
            } else {
                Verdict::Unknown
            }
        }
        "token_lookup_self" => {
            let has_id = value
                .as_structured()
                .and_then(|map| map.get("data"))
                .and_then(|data| data.get("id"))
                .map(|id| truthy(Some(id)))
                .unwrap_or(false);
            let text = value.text().to_lowercase();
            if has_id {
                Verdict::Good
            } else if text.contains("permission denied") || text.contains("invalid token") {
                Verdict::Failed
            } else {
                Verdict::Unknown
            }
        }
        "acl_bootstrap" => {
            let has_id = value
                .as_structured()
                .map(|map| truthy(map.get("ID")))
                .unwrap_or(false);
            if has_id {
                Verdict::Good
            } else if text_contains(value, "not available") {
                Verdict::Unknown
            } else if text_contains(value, "error") {
                Verdict::Failed
            } else {
                Verdict::Unknown
            }
        }
        "plugins" => {
            if text_contains(value, "not available") {
                Verdict::Unknown
            } else if non_empty_structured(value) {
                Verdict::Good
            } else {
                Verdict::Unknown
            }
        }
        "cpu_percent" => value.as_number().map(threshold).unwrap_or(Verdict::Unknown),
        "memory" | "disk" => value
            .as_structured()
            .map(|map| match map.get("percent") {
                None => Verdict::Good,
                Some(percent) => percent.as_f64().map(threshold).unwrap_or(Verdict::Unknown),
            })
            .unwrap_or(Verdict::Unknown),
        "os" => match value.as_scalar_str() {
            Some(name) if !name.is_empty() => Verdict::Good,
            _ => Verdict::Unknown,
        },
        "upgrade_precheck" => {
            if text_contains(value, "no upgrade blockers") {
                Verdict::Good
            } else {
                Verdict::Unknown
            }
        }
        "snapshot_validation" => {
            if text_contains(value, "not implemented") {
                Verdict::Unknown
            } else if text_contains(value, "valid") {
                Verdict::Good
            } else {
                Verdict::Unknown
            }
        }
        "error" => Verdict::Failed,
        _ => Verdict::Unknown,
    }
}

const USAGE_LIMIT_PERCENT: f64 = 90.0;

fn threshold(percent: f64) -> Verdict {
    if percent < USAGE_LIMIT_PERCENT {
        Verdict::Good
    } else {
        Verdict::Failed
    }
}

fn good_if(condition: bool) -> Verdict {
    if condition {
        Verdict::Good
    } else {
        Verdict::Failed
    }
}

fn classify_leader(value: &FacetValue) -> Verdict {
    if let Some(address) = value.as_scalar_str() {
        return good_if(!address.is_empty());
    }
    match value.as_structured() {
        Some(map)
            if map.get("ha_enabled") == Some(&Value::Bool(false))
                || truthy(map.get("is_self"))
                || truthy(map.get("leader_address")) =>
        {
            Verdict::Good
        }
        _ => Verdict::Failed,
    }
}

fn classify_ha_status(map: &Map<String, Value>) -> Verdict {
    let nodes = map
        .get("nodes")
        .filter(|nodes| truthy(Some(nodes)))
        .or_else(|| map.get("data").and_then(|data| data.get("nodes")));
    let has_active = nodes
        .and_then(Value::as_array)
        .map(|nodes| {
            nodes
                .iter()
                .filter_map(Value::as_object)
                .any(|node| truthy(node.get("active_node")))
        })
        .unwrap_or(false);
    good_if(has_active)
}

fn classify_replication(map: &Map<String, Value>) -> Verdict {
    let active = ["dr", "performance", "summary"].iter().any(|key| {
        map.get(*key)
            .and_then(Value::as_object)
            .and_then(|sub| sub.get("mode"))
            .map(|mode| !mode.is_null() && mode.as_str() != Some("unsupported"))
            .unwrap_or(false)
    });
    if active {
        Verdict::Good
    } else {
        Verdict::Unknown
    }
}

fn non_empty_list(value: &FacetValue) -> bool {
    value.as_list().map(|items| !items.is_empty()).unwrap_or(false)
}

fn non_empty_structured(value: &FacetValue) -> bool {
    value.as_structured().map(|map| !map.is_empty()).unwrap_or(false)
}

fn text_contains(value: &FacetValue, needle: &str) -> bool {
    value
        .as_text()
        .map(|text| text.to_lowercase().contains(needle))
        .unwrap_or(false)
}

/// JSON truthiness: null, false, zero and empty containers are false
fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v(value: Value) -> FacetValue {
        FacetValue::from_json(value)
    }

    #[test]
    fn unknown_names_are_unknown_for_every_shape() {
        let shapes = vec![
            v(json!({"Healthy": true})),
            v(json!([1, 2])),
            v(json!("error everywhere")),
            v(json!(5)),
            FacetValue::error("Error: connection refused"),
        ];
        for shape in &shapes {
            assert_eq!(classify("datacenters_list", shape), Verdict::Unknown);
            assert_eq!(classify("operator_usage", shape), Verdict::Unknown);
            assert_eq!(classify("", shape), Verdict::Unknown);
        }
    }

    #[test]
    fn raft_peers_needs_a_non_empty_list() {
        assert_eq!(classify("raft_peers", &v(json!([]))), Verdict::Failed);
        assert_eq!(classify("raft_peers", &v(json!(["10.0.0.1:8300"]))), Verdict::Good);
        assert_eq!(
            classify("raft_peers", &FacetValue::error("Error: timeout")),
            Verdict::Failed
        );
    }

    #[test]
    fn license_report_reads_valid_flag() {
        assert_eq!(classify("license_report", &v(json!({"Valid": true}))), Verdict::Good);
        assert_eq!(classify("license_report", &v(json!({"Valid": false}))), Verdict::Failed);
        assert_eq!(classify("license_report", &v(json!({}))), Verdict::Unknown);
        assert_eq!(classify("license_report", &v(json!("Valid"))), Verdict::Unknown);
    }

    #[test]
    fn cpu_percent_threshold_is_ninety() {
        assert_eq!(classify("cpu_percent", &v(json!(89.9))), Verdict::Good);
        assert_eq!(classify("cpu_percent", &v(json!(90))), Verdict::Failed);
        assert_eq!(classify("cpu_percent", &v(json!("n/a"))), Verdict::Unknown);
    }

    #[test]
    fn autopilot_health_and_state_use_healthy_flag() {
        for name in ["autopilot_health", "autopilot_state"] {
            assert_eq!(classify(name, &v(json!({"Healthy": true}))), Verdict::Healthy);
            assert_eq!(classify(name, &v(json!({"Healthy": false}))), Verdict::Unhealthy);
            assert_eq!(classify(name, &v(json!({"Healthy": "yes"}))), Verdict::Unknown);
            assert_eq!(classify(name, &FacetValue::error("Error: 500")), Verdict::Unknown);
        }
    }

    #[test]
    fn leader_accepts_address_or_ha_markers() {
        assert_eq!(classify("leader", &v(json!("10.0.0.1:8300"))), Verdict::Good);
        assert_eq!(classify("leader", &v(json!(""))), Verdict::Failed);
        assert_eq!(classify("leader", &v(json!({"ha_enabled": false}))), Verdict::Good);
        assert_eq!(classify("leader", &v(json!({"ha_enabled": true, "is_self": true}))), Verdict::Good);
        assert_eq!(
            classify("leader", &v(json!({"ha_enabled": true, "leader_address": "https://v1:8200"}))),
            Verdict::Good
        );
        assert_eq!(
            classify("leader", &v(json!({"ha_enabled": true, "leader_address": ""}))),
            Verdict::Failed
        );
        assert_eq!(
            classify("leader", &FacetValue::error("Error: connection refused")),
            Verdict::Failed
        );
    }

    #[test]
    fn ha_status_looks_for_an_active_node() {
        let top = v(json!({"nodes": [{"hostname": "a", "active_node": true}]}));
        let nested = v(json!({"data": {"nodes": [{"active_node": false}, {"active_node": true}]}}));
        let none = v(json!({"nodes": [{"active_node": false}]}));
        assert_eq!(classify("ha_status", &top), Verdict::Good);
        assert_eq!(classify("ha_status", &nested), Verdict::Good);
        assert_eq!(classify("ha_status", &none), Verdict::Failed);
        assert_eq!(classify("ha_status", &v(json!({}))), Verdict::Failed);
    }

    #[test]
    fn system_health_and_seal_status() {
        let active = v(json!({"initialized": true, "sealed": false, "standby": false}));
        let sealed = v(json!({"initialized": true, "sealed": true, "standby": false}));
        let standby = v(json!({"initialized": true, "sealed": false, "standby": true}));
        assert_eq!(classify("system_health", &active), Verdict::Good);
        assert_eq!(classify("system_health", &sealed), Verdict::Failed);
        assert_eq!(classify("system_health", &standby), Verdict::Unknown);

        assert_eq!(classify("seal_status", &v(json!({"sealed": false}))), Verdict::Good);
        assert_eq!(classify("seal_status", &v(json!({"sealed": true}))), Verdict::Failed);
        assert_eq!(classify("seal_status", &v(json!({"type": "shamir"}))), Verdict::Unknown);
    }

    #[test]
    fn license_needs_known_keys() {
        assert_eq!(classify("license", &v(json!({"autoloaded": {}}))), Verdict::Good);
        assert_eq!(classify("license", &v(json!({"expiration_time": "2030"}))), Verdict::Good);
        assert_eq!(classify("license", &v(json!({"other": 1}))), Verdict::Unknown);
    }

    #[test]
    fn replication_first_supported_mode_wins() {
        let unsupported = v(json!({
            "dr": {"mode": "unsupported"},
            "performance": {"mode": "unsupported"},
            "summary": null
        }));
        let primary = v(json!({"dr": {"mode": "unsupported"}, "performance": {"mode": "primary"}}));
        assert_eq!(classify("replication_status", &unsupported), Verdict::Unknown);
        assert_eq!(classify("replication_status", &primary), Verdict::Good);
        assert_eq!(classify("replication_status", &v(json!({"dr": {}}))), Verdict::Unknown);
    }

    #[test]
    fn autopilot_messages() {
        assert_eq!(classify("autopilot", &v(json!({"healthy": true}))), Verdict::Good);
        assert_eq!(
            classify(
                "autopilot",
                &v(json!("Autopilot not enabled or not available (OSS or insufficient permissions)."))
            ),
            Verdict::Unknown
        );
        assert_eq!(
            classify("autopilot", &FacetValue::error("Error: 400 (Autopilot endpoint failed)")),
            Verdict::Failed
        );
        assert_eq!(classify("autopilot", &v(json!(12))), Verdict::Unknown);
    }

    #[test]
    fn lease_count_quota_messages() {
        assert_eq!(
            classify("lease_count_quota", &v(json!("No global lease count quota set."))),
            Verdict::Unknown
        );
        assert_eq!(classify("lease_count_quota", &v(json!({"max_leases": 100}))), Verdict::Good);
        assert_eq!(
            classify("lease_count_quota", &FacetValue::error("Error: 403 permission denied")),
            Verdict::Failed
        );
        assert_eq!(classify("lease_count_quota", &v(json!({}))), Verdict::Unknown);
    }

    #[test]
    fn token_lookup_self_checks_id_then_text() {
        assert_eq!(
            classify("token_lookup_self", &v(json!({"data": {"id": "hvs.123"}}))),
            Verdict::Good
        );
        assert_eq!(
            classify(
                "token_lookup_self",
                &FacetValue::error("Permission denied or invalid token. Please check your Vault token.")
            ),
            Verdict::Failed
        );
        assert_eq!(
            classify("token_lookup_self", &v(json!({"errors": ["invalid token"]}))),
            Verdict::Failed
        );
        assert_eq!(classify("token_lookup_self", &v(json!({"data": {}}))), Verdict::Unknown);
    }

    #[test]
    fn list_facets_fail_when_empty_or_missing() {
        for name in ["members", "catalog_nodes", "jobs"] {
            assert_eq!(classify(name, &v(json!([{"ID": "x"}]))), Verdict::Good);
            assert_eq!(classify(name, &v(json!([]))), Verdict::Failed);
            assert_eq!(classify(name, &FacetValue::error("Error: 403")), Verdict::Failed);
        }
    }

    #[test]
    fn acl_bootstrap_and_plugins() {
        assert_eq!(classify("acl_bootstrap", &v(json!({"ID": "abc"}))), Verdict::Good);
        assert_eq!(classify("acl_bootstrap", &v(json!("ACL not available"))), Verdict::Unknown);
        assert_eq!(classify("acl_bootstrap", &FacetValue::error("Error: 500")), Verdict::Failed);
        assert_eq!(classify("acl_bootstrap", &v(json!({"ID": ""}))), Verdict::Unknown);

        assert_eq!(classify("plugins", &v(json!("Plugins not available"))), Verdict::Unknown);
        assert_eq!(classify("plugins", &v(json!({"csi": []}))), Verdict::Good);
        assert_eq!(classify("plugins", &v(json!([{"ID": "ebs"}]))), Verdict::Unknown);
    }

    #[test]
    fn memory_and_disk_use_percent_field() {
        for name in ["memory", "disk"] {
            assert_eq!(classify(name, &v(json!({"percent": 45.0}))), Verdict::Good);
            assert_eq!(classify(name, &v(json!({"percent": 95}))), Verdict::Failed);
            assert_eq!(classify(name, &v(json!({"total": 10}))), Verdict::Good);
            assert_eq!(classify(name, &v(json!({"percent": "high"}))), Verdict::Unknown);
            assert_eq!(classify(name, &v(json!(12))), Verdict::Unknown);
        }
    }

    #[test]
    fn os_upgrade_and_snapshot_strings() {
        assert_eq!(classify("os", &v(json!("Linux 6.1 Debian 12"))), Verdict::Good);
        assert_eq!(classify("os", &FacetValue::error("Error: unknown")), Verdict::Unknown);
        assert_eq!(
            classify("upgrade_precheck", &v(json!("No upgrade blockers found"))),
            Verdict::Good
        );
        assert_eq!(classify("upgrade_precheck", &v(json!("blocked"))), Verdict::Unknown);
        assert_eq!(
            classify("snapshot_validation", &v(json!("Snapshot validation not implemented"))),
            Verdict::Unknown
        );
        assert_eq!(classify("snapshot_validation", &v(json!("Snapshot is VALID"))), Verdict::Good);
    }

    #[test]
    fn error_facet_always_fails() {
        assert_eq!(classify("error", &v(json!({}))), Verdict::Failed);
        assert_eq!(classify("error", &FacetValue::error("boom")), Verdict::Failed);
    }

    #[test]
    fn verdict_presentation() {
        assert_eq!(Verdict::Healthy.to_string(), "Healthy");
        assert_eq!(Verdict::Unhealthy.css_class(), "state-unhealthy");
        assert!(Verdict::Good.is_ok());
        assert!(Verdict::Unhealthy.is_failure());
        assert!(!Verdict::Unknown.is_ok() && !Verdict::Unknown.is_failure());
    }
}
