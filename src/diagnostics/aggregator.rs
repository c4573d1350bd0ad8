use super::catalog::{facets_for, Endpoint, Extract, FacetSpec};
use super::facet::{DiagnosticsResult, FacetValue};
use super::host::collect_host_facets;
use super::Service;
use crate::config::DoctorConfig;
use crate::http::{HttpProbe, Probe, ProbeError};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info_span, warn, Instrument};

enum Source {
    Api(Arc<dyn Probe>),
    Unavailable(ProbeError),
    Host,
}

/// Runs every facet probe of one service and collects the outcomes
pub struct ServiceDiagnostics {
    service: Service,
    source: Source,
}

impl ServiceDiagnostics {
    /// Build the HTTP probe for `service` from the resolved configuration
    pub fn new(service: Service, config: &DoctorConfig) -> Self {
        let source = match (service.endpoint(config), service.token_header()) {
            (Some(endpoint), Some(header)) => {
                match HttpProbe::new(endpoint, header, config.probe.timeout()) {
                    Ok(probe) => Source::Api(Arc::new(probe)),
                    Err(e) => {
                        warn!("{} probe unavailable: {}", service.display_name(), e);
                        Source::Unavailable(e)
                    }
                }
            }
            _ => Source::Host,
        };
        Self { service, source }
    }

    pub fn with_probe(service: Service, probe: Arc<dyn Probe>) -> Self {
        Self {
            service,
            source: Source::Api(probe),
        }
    }

    pub fn service(&self) -> Service {
        self.service
    }

    /// Probe every facet in table order. Never fails: each probe failure is
    /// recorded as error text, and empty answers are dropped.
    pub async fn aggregate(&self) -> DiagnosticsResult {
        let span = info_span!("aggregate", service = self.service.slug());
        async {
            let result = match &self.source {
                Source::Api(probe) => self.probe_all(probe.as_ref()).await,
                Source::Unavailable(e) => {
                    let mut result = DiagnosticsResult::new();
                    result.insert(
                        "error",
                        FacetValue::error(format!(
                            "{} connection or authentication failed: {}",
                            self.service.display_name(),
                            e
                        )),
                    );
                    result
                }
                Source::Host => match tokio::task::spawn_blocking(collect_host_facets).await {
                    Ok(result) => result,
                    Err(e) => {
                        let mut result = DiagnosticsResult::new();
                        result.insert("error", FacetValue::error(format!("Error: {e}")));
                        result
                    }
                },
            };
            debug!(facets = result.len(), "aggregation finished");
            result
        }
        .instrument(span)
        .await
    }

    async fn probe_all(&self, probe: &dyn Probe) -> DiagnosticsResult {
        let mut result = DiagnosticsResult::new();
        for spec in facets_for(self.service) {
            let value = probe_facet(probe, spec).await;
            debug!(
                facet = spec.name,
                failed = matches!(value, FacetValue::ErrorText(_)),
                "probe finished"
            );
            result.insert(spec.name, value);
        }
        result.without_empty()
    }
}

/// Evaluate one table entry against a probe
pub async fn probe_facet(probe: &dyn Probe, spec: &FacetSpec) -> FacetValue {
    let value = match spec.endpoint {
        Endpoint::Get(path) => spec.extract.finish(probe.fetch(path).await),
        Endpoint::Fallback(paths) => {
            let mut last = FacetValue::Scalar(Value::Null);
            for path in paths {
                last = spec.extract.finish(probe.fetch(path).await);
                if !last.is_empty() && !matches!(last, FacetValue::ErrorText(_)) {
                    break;
                }
            }
            last
        }
        Endpoint::Merge(parts) => merge_parts(probe, parts, spec.extract).await,
    };

    match spec.empty_note {
        Some(note) if value.is_empty() => FacetValue::text_scalar(note),
        _ => value,
    }
}

async fn merge_parts(
    probe: &dyn Probe,
    parts: &[(&'static str, &'static str)],
    extract: Extract,
) -> FacetValue {
    let mut merged = Map::new();
    let mut first_error = None;
    let mut failures = 0;

    for (key, path) in parts {
        let part = extract.finish(probe.fetch(path).await);
        if let FacetValue::ErrorText(text) = &part {
            failures += 1;
            first_error.get_or_insert_with(|| text.clone());
        }
        merged.insert((*key).to_string(), part.to_json());
    }

    match first_error {
        Some(text) if failures == parts.len() => FacetValue::ErrorText(text),
        _ => FacetValue::Structured(merged),
    }
}
