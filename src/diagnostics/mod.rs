pub mod aggregator;
pub mod catalog;
pub mod classify;
pub mod facet;
pub mod host;

use crate::config::{DoctorConfig, ServiceEndpoint};
use crate::report::Section;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, info};

// Re-export types for public API
pub use aggregator::ServiceDiagnostics;
pub use classify::{classify, Verdict};
pub use facet::{DiagnosticsResult, FacetValue};

/// A system the doctor can examine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Service {
    Vault,
    Consul,
    Nomad,
    /// The machine running the doctor
    Host,
}

impl Service {
    /// The three cluster services covered by the combined report
    pub const CLUSTER: [Service; 3] = [Service::Vault, Service::Consul, Service::Nomad];

    pub fn display_name(&self) -> &'static str {
        match self {
            Service::Vault => "Vault",
            Service::Consul => "Consul",
            Service::Nomad => "Nomad",
            Service::Host => "General",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Service::Vault => "vault",
            Service::Consul => "consul",
            Service::Nomad => "nomad",
            Service::Host => "general",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        [Service::Vault, Service::Consul, Service::Nomad, Service::Host]
            .into_iter()
            .find(|service| service.slug() == slug)
    }

    pub fn token_header(&self) -> Option<&'static str> {
        match self {
            Service::Vault => Some("X-Vault-Token"),
            Service::Consul => Some("X-Consul-Token"),
            Service::Nomad => Some("X-Nomad-Token"),
            Service::Host => None,
        }
    }

    pub fn endpoint<'a>(&self, config: &'a DoctorConfig) -> Option<&'a ServiceEndpoint> {
        match self {
            Service::Vault => Some(&config.vault),
            Service::Consul => Some(&config.consul),
            Service::Nomad => Some(&config.nomad),
            Service::Host => None,
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Run each aggregator in its own task, one after another.
///
/// A panicking aggregator only costs its own section.
pub async fn run_sections(runs: Vec<ServiceDiagnostics>) -> Vec<Section> {
    let mut sections = Vec::with_capacity(runs.len());
    for diagnostics in runs {
        let service = diagnostics.service();
        info!("Running {} diagnostics", service);
        let handle = tokio::spawn(async move { diagnostics.aggregate().await });
        let outcome = handle.await.map_err(|e| {
            error!("{} diagnostics aborted: {}", service, e);
            format!("{service} diagnostics failed: {e}")
        });
        sections.push(Section::new(service.display_name(), outcome));
    }
    sections
}

pub async fn collect_sections(services: &[Service], config: &DoctorConfig) -> Vec<Section> {
    let runs = services
        .iter()
        .map(|service| ServiceDiagnostics::new(*service, config))
        .collect();
    run_sections(runs).await
}
