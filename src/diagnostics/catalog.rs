//! Declarative facet tables for each cluster service.
//!
//! Each entry names a facet, the admin API endpoint(s) it is read from and
//! how the raw outcome is turned into a [`FacetValue`].

use super::facet::FacetValue;
use super::Service;
use crate::http::ProbeError;
use serde_json::Value;

/// Where a facet's data comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// A single GET
    Get(&'static str),
    /// Try each path in turn until one yields a non-empty value
    Fallback(&'static [&'static str]),
    /// GET every path and merge the results under the given keys
    Merge(&'static [(&'static str, &'static str)]),
}

/// Post-processing applied to a probe outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extract {
    /// Use the decoded body as-is
    Raw,
    /// Unwrap Vault's `data` envelope when present
    Data,
    /// Vault token self-lookup with a friendlier permission message
    TokenLookup,
    /// Vault raft autopilot state, which reports errors in-band
    RaftAutopilot,
    /// Vault global lease count quota, where `{"errors": []}` means unset
    LeaseCountQuota,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacetSpec {
    pub name: &'static str,
    pub endpoint: Endpoint,
    pub extract: Extract,
    /// Informational text shown instead of an empty answer
    pub empty_note: Option<&'static str>,
}

const fn facet(name: &'static str, endpoint: Endpoint, extract: Extract) -> FacetSpec {
    FacetSpec {
        name,
        endpoint,
        extract,
        empty_note: None,
    }
}

const fn noted(
    name: &'static str,
    endpoint: Endpoint,
    extract: Extract,
    note: &'static str,
) -> FacetSpec {
    FacetSpec {
        name,
        endpoint,
        extract,
        empty_note: Some(note),
    }
}

pub const PERMISSION_DENIED_NOTE: &str =
    "Permission denied or invalid token. Please check your Vault token.";
pub const NO_LEASE_QUOTA_NOTE: &str = "No global lease count quota set.";
pub const AUTOPILOT_UNAVAILABLE_NOTE: &str =
    "Autopilot not enabled or not available (OSS or insufficient permissions).";

pub const VAULT_FACETS: &[FacetSpec] = &[
    noted(
        "ha_status",
        Endpoint::Get("/v1/sys/ha-status"),
        Extract::Raw,
        "No HA status information returned.",
    ),
    noted(
        "system_health",
        Endpoint::Get("/v1/sys/health?standbyok=true&perfstandbyok=true&sealedcode=200&uninitcode=200"),
        Extract::Raw,
        "No health information returned.",
    ),
    facet(
        "token_lookup_self",
        Endpoint::Get("/v1/auth/token/lookup-self"),
        Extract::TokenLookup,
    ),
    facet("seal_status", Endpoint::Get("/v1/sys/seal-status"), Extract::Raw),
    facet("leader", Endpoint::Get("/v1/sys/leader"), Extract::Raw),
    noted(
        "license",
        Endpoint::Fallback(&["/v1/sys/license/status", "/v1/sys/license"]),
        Extract::Data,
        "No license information returned (Vault OSS or insufficient permissions).",
    ),
    facet(
        "replication_status",
        Endpoint::Merge(&[
            ("dr", "/v1/sys/replication/dr/status"),
            ("performance", "/v1/sys/replication/performance/status"),
            ("summary", "/v1/sys/replication/status"),
        ]),
        Extract::Data,
    ),
    facet(
        "config",
        Endpoint::Get("/v1/sys/config/state/sanitized"),
        Extract::Data,
    ),
    noted(
        "autopilot",
        Endpoint::Get("/v1/sys/storage/raft/autopilot/state"),
        Extract::RaftAutopilot,
        AUTOPILOT_UNAVAILABLE_NOTE,
    ),
    facet(
        "rate_limit_quotas",
        Endpoint::Get("/v1/sys/quotas/config"),
        Extract::Data,
    ),
    facet(
        "lease_count_quota",
        Endpoint::Get("/v1/sys/quotas/lease-count/global-lease-count-quota"),
        Extract::LeaseCountQuota,
    ),
];

pub const CONSUL_FACETS: &[FacetSpec] = &[
    facet("members", Endpoint::Get("/v1/agent/members"), Extract::Raw),
    facet("raft_peers", Endpoint::Get("/v1/status/peers"), Extract::Raw),
    facet("leader", Endpoint::Get("/v1/status/leader"), Extract::Raw),
    facet("catalog_nodes", Endpoint::Get("/v1/catalog/nodes"), Extract::Raw),
    facet(
        "autopilot_configuration",
        Endpoint::Get("/v1/operator/autopilot/configuration"),
        Extract::Raw,
    ),
    facet(
        "autopilot_health",
        Endpoint::Get("/v1/operator/autopilot/health"),
        Extract::Raw,
    ),
    facet(
        "autopilot_state",
        Endpoint::Get("/v1/operator/autopilot/state"),
        Extract::Raw,
    ),
    facet(
        "datacenters_list",
        Endpoint::Get("/v1/catalog/datacenters"),
        Extract::Raw,
    ),
    facet("license_report", Endpoint::Get("/v1/operator/license"), Extract::Raw),
    facet("operator_usage", Endpoint::Get("/v1/operator/usage"), Extract::Raw),
];

pub const NOMAD_FACETS: &[FacetSpec] = &[
    facet(
        "autopilot_configuration",
        Endpoint::Get("/v1/operator/autopilot/configuration"),
        Extract::Raw,
    ),
    facet(
        "autopilot_health",
        Endpoint::Get("/v1/operator/autopilot/health"),
        Extract::Raw,
    ),
    facet(
        "raft_configuration",
        Endpoint::Get("/v1/operator/raft/configuration"),
        Extract::Raw,
    ),
    facet("license_info", Endpoint::Get("/v1/operator/license"), Extract::Raw),
    facet("leader", Endpoint::Get("/v1/status/leader"), Extract::Raw),
    facet("list_peers", Endpoint::Get("/v1/status/peers"), Extract::Raw),
    facet(
        "scheduler",
        Endpoint::Get("/v1/operator/scheduler/configuration"),
        Extract::Raw,
    ),
    facet("jobs", Endpoint::Get("/v1/jobs"), Extract::Raw),
    noted(
        "plugins",
        Endpoint::Get("/v1/plugins?type=csi"),
        Extract::Raw,
        "Plugins not available (no CSI plugins registered).",
    ),
];

/// Facet table for a remote service; the host service has none
pub fn facets_for(service: Service) -> &'static [FacetSpec] {
    match service {
        Service::Vault => VAULT_FACETS,
        Service::Consul => CONSUL_FACETS,
        Service::Nomad => NOMAD_FACETS,
        Service::Host => &[],
    }
}

impl Extract {
    /// Turn a probe outcome into the facet value stored in the result
    pub fn finish(&self, outcome: Result<Value, ProbeError>) -> FacetValue {
        match (self, outcome) {
            (Extract::Raw, Ok(value)) => FacetValue::from_json(value),
            (Extract::Data, Ok(value)) => FacetValue::from_json(unwrap_data(value)),
            (Extract::TokenLookup, Ok(value)) => FacetValue::from_json(value),
            (Extract::TokenLookup, Err(e)) if e.is_permission_denied() => {
                FacetValue::error(PERMISSION_DENIED_NOTE)
            }
            (Extract::RaftAutopilot, Ok(Value::Object(map))) => {
                if let Some(errors) = map.get("errors") {
                    FacetValue::error(format!(
                        "Error: {errors} (This endpoint is only available for Raft/Integrated Storage)"
                    ))
                } else {
                    FacetValue::Structured(map)
                }
            }
            (Extract::RaftAutopilot, Ok(_)) => FacetValue::text_scalar(AUTOPILOT_UNAVAILABLE_NOTE),
            (Extract::RaftAutopilot, Err(e)) => FacetValue::error(format!(
                "Error: {e} (Autopilot endpoint failed or not available)"
            )),
            (Extract::LeaseCountQuota, Ok(value)) if is_empty_errors(&value) => {
                FacetValue::text_scalar(NO_LEASE_QUOTA_NOTE)
            }
            (Extract::LeaseCountQuota, Ok(value)) => FacetValue::from_json(value),
            (Extract::LeaseCountQuota, Err(e))
                if e.status_body_json().is_some_and(|body| is_empty_errors(&body)) =>
            {
                FacetValue::text_scalar(NO_LEASE_QUOTA_NOTE)
            }
            (_, Err(e)) => FacetValue::error(format!("Error: {e}")),
        }
    }
}

/// Vault wraps most answers as `{"data": {...}}`
pub fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn is_empty_errors(value: &Value) -> bool {
    value
        .get("errors")
        .and_then(Value::as_array)
        .is_some_and(|errors| errors.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn facet_names_are_unique_per_service() {
        for service in [Service::Vault, Service::Consul, Service::Nomad] {
            let mut names: Vec<_> = facets_for(service).iter().map(|f| f.name).collect();
            let total = names.len();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), total, "duplicate facet in {service:?}");
        }
    }

    #[test]
    fn consul_table_keeps_probe_order() {
        let names: Vec<_> = CONSUL_FACETS.iter().map(|f| f.name).collect();
        assert_eq!(&names[..4], &["members", "raft_peers", "leader", "catalog_nodes"]);
    }

    #[test]
    fn data_envelope_is_unwrapped() {
        assert_eq!(unwrap_data(json!({"data": {"a": 1}, "lease_id": ""})), json!({"a": 1}));
        assert_eq!(unwrap_data(json!({"a": 1})), json!({"a": 1}));
        assert_eq!(
            Extract::Data.finish(Ok(json!({"data": {"rate": 10}}))),
            FacetValue::from_json(json!({"rate": 10}))
        );
    }

    #[test]
    fn failures_become_error_text() {
        let err = ProbeError::Status { code: 500, body: "boom".into() };
        assert_eq!(Extract::Raw.finish(Err(err)), FacetValue::error("Error: 500 boom"));
    }

    #[test]
    fn token_lookup_permission_message() {
        let denied = ProbeError::Status { code: 403, body: "{\"errors\":[\"permission denied\"]}".into() };
        assert_eq!(
            Extract::TokenLookup.finish(Err(denied)),
            FacetValue::error(PERMISSION_DENIED_NOTE)
        );
        let other = ProbeError::Decode("eof".into());
        assert_eq!(
            Extract::TokenLookup.finish(Err(other)),
            FacetValue::error("Error: could not decode response: eof")
        );
    }

    #[test]
    fn raft_autopilot_outcomes() {
        let with_errors = Extract::RaftAutopilot.finish(Ok(json!({"errors": ["raft not in use"]})));
        assert!(matches!(with_errors, FacetValue::ErrorText(ref t)
            if t.starts_with("Error: [\"raft not in use\"]") && t.contains("Raft/Integrated Storage")));

        assert_eq!(
            Extract::RaftAutopilot.finish(Ok(Value::Null)),
            FacetValue::text_scalar(AUTOPILOT_UNAVAILABLE_NOTE)
        );

        let healthy = Extract::RaftAutopilot.finish(Ok(json!({"healthy": true})));
        assert_eq!(healthy, FacetValue::from_json(json!({"healthy": true})));

        let failed = Extract::RaftAutopilot.finish(Err(ProbeError::Status { code: 400, body: "x".into() }));
        assert_eq!(
            failed,
            FacetValue::error("Error: 400 x (Autopilot endpoint failed or not available)")
        );
    }

    #[test]
    fn lease_quota_unset_is_informational() {
        assert_eq!(
            Extract::LeaseCountQuota.finish(Ok(json!({"errors": []}))),
            FacetValue::text_scalar(NO_LEASE_QUOTA_NOTE)
        );
        assert_eq!(
            Extract::LeaseCountQuota.finish(Err(ProbeError::Status { code: 404, body: "{\"errors\":[]}".into() })),
            FacetValue::text_scalar(NO_LEASE_QUOTA_NOTE)
        );
        assert_eq!(
            Extract::LeaseCountQuota.finish(Ok(json!({"data": {"max_leases": 10}}))),
            FacetValue::from_json(json!({"data": {"max_leases": 10}}))
        );
    }
}
