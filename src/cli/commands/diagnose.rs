use super::Command;
use crate::cli::OutputArgs;
use crate::config::DoctorConfig;
use crate::diagnostics::{collect_sections, Service};
use crate::report::{render, render_report, ConsoleSink, ReportFormat, ReportMeta, Section, REPORT_TITLE};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Runs one or more service aggregators and renders the report
pub struct DiagnoseCommand {
    services: Vec<Service>,
    outputs: Vec<(ReportFormat, PathBuf)>,
    config: DoctorConfig,
}

impl DiagnoseCommand {
    pub fn single(service: Service, output: OutputArgs, config: DoctorConfig) -> Self {
        Self::new(vec![service], output, config)
    }

    /// Combined Vault, Consul and Nomad report, optionally followed by the host section
    pub fn doctor(output: OutputArgs, include_host: bool, config: DoctorConfig) -> Self {
        let mut services = Service::CLUSTER.to_vec();
        if include_host {
            services.push(Service::Host);
        }
        Self::new(services, output, config)
    }

    fn new(services: Vec<Service>, output: OutputArgs, config: DoctorConfig) -> Self {
        let outputs = [
            (ReportFormat::Html, output.html),
            (ReportFormat::Text, output.txt),
            (ReportFormat::Pdf, output.pdf),
            (ReportFormat::Json, output.json),
        ]
        .into_iter()
        .filter_map(|(format, path)| path.map(|p| (format, p)))
        .collect();

        Self {
            services,
            outputs,
            config,
        }
    }

    fn title(&self) -> String {
        match self.services.as_slice() {
            [service] => format!("{} Diagnostics Report", service.display_name()),
            _ => REPORT_TITLE.to_string(),
        }
    }

    /// File name used when an output path is a directory
    pub fn default_file_name(&self, format: ReportFormat) -> String {
        match self.services.as_slice() {
            [service] => format!("{}_diagnostics_report.{}", service.slug(), format.extension()),
            _ => format!("hcp_doctor_report.{}", format.extension()),
        }
    }

    async fn write_reports(&self, sections: &[Section]) -> Result<()> {
        if self.outputs.is_empty() {
            return Ok(());
        }
        let meta = ReportMeta::new(self.title());

        for (format, requested) in &self.outputs {
            let path = resolve_output_path(requested, &self.default_file_name(*format));
            let report = render_report(sections, *format, &meta)
                .with_context(|| format!("Failed to render {} report", format.extension()))?;

            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            tokio::fs::write(&path, &report.body)
                .await
                .with_context(|| format!("Failed to write report to {}", path.display()))?;

            info!("Wrote {} report to {}", format.extension(), path.display());
            println!("Report written to {}", path.display());
        }
        Ok(())
    }
}

impl Command for DiagnoseCommand {
    async fn execute(&self) -> Result<()> {
        let sections = collect_sections(&self.services, &self.config).await;

        let stdout = std::io::stdout();
        render(&sections, ConsoleSink::new(stdout.lock())).context("Failed to print report")?;

        self.write_reports(&sections).await
    }
}

/// A directory (existing, or spelled with a trailing separator) receives the default file name
pub fn resolve_output_path(requested: &Path, default_name: &str) -> PathBuf {
    let spelled_as_dir = requested
        .to_str()
        .is_some_and(|s| s.ends_with('/') || s.ends_with(std::path::MAIN_SEPARATOR));
    if requested.is_dir() || spelled_as_dir {
        requested.join(default_name)
    } else {
        requested.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn directories_get_default_file_names() {
        let dir = TempDir::new().unwrap();
        let resolved = resolve_output_path(dir.path(), "hcp_doctor_report.html");
        assert_eq!(resolved, dir.path().join("hcp_doctor_report.html"));

        let file = dir.path().join("custom.html");
        assert_eq!(resolve_output_path(&file, "hcp_doctor_report.html"), file);

        let pending = PathBuf::from("reports/");
        assert_eq!(
            resolve_output_path(&pending, "vault_diagnostics_report.pdf"),
            PathBuf::from("reports/vault_diagnostics_report.pdf")
        );
    }

    #[test]
    fn default_names_follow_scope() {
        let config = DoctorConfig::default();
        let vault = DiagnoseCommand::single(Service::Vault, OutputArgs::default(), config.clone());
        assert_eq!(vault.default_file_name(ReportFormat::Html), "vault_diagnostics_report.html");
        assert_eq!(vault.title(), "Vault Diagnostics Report");

        let doctor = DiagnoseCommand::doctor(OutputArgs::default(), true, config);
        assert_eq!(doctor.default_file_name(ReportFormat::Pdf), "hcp_doctor_report.pdf");
        assert_eq!(doctor.title(), REPORT_TITLE);
        assert_eq!(doctor.services.last(), Some(&Service::Host));
    }

    #[tokio::test]
    async fn reports_land_in_requested_directory() {
        let dir = TempDir::new().unwrap();
        let mut config = DoctorConfig::default();
        config.nomad.address = "http://127.0.0.1:1".to_string();
        config.probe.timeout_seconds = 1;
        let output = OutputArgs {
            txt: Some(dir.path().to_path_buf()),
            ..OutputArgs::default()
        };

        let command = DiagnoseCommand::single(Service::Nomad, output, config);
        command.execute().await.unwrap();

        let written = std::fs::read_to_string(dir.path().join("nomad_diagnostics_report.txt")).unwrap();
        assert!(written.starts_with("Nomad Diagnostics Report"));
        assert!(written.contains("LEADER - Failed"));
    }
}
