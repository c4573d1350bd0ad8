// HashiCorp Doctor Library - cluster diagnostics for Vault, Consul and Nomad
// This exposes the core components for testing and integration

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod http;
pub mod report;
pub mod shutdown;
pub mod telemetry;
pub mod web;

// Re-export key types for easy access
pub use config::{ConnectionOverrides, DoctorConfig, ServiceEndpoint};
pub use diagnostics::{
    classify, collect_sections, DiagnosticsResult, FacetValue, Service, ServiceDiagnostics, Verdict,
};
pub use http::{HttpProbe, Probe, ProbeError};
pub use report::{render, render_report, Report, ReportFormat, ReportMeta, ReportSink, Section};
pub use telemetry::{generate_correlation_id, init_telemetry};
