use super::Command;
use crate::config::DoctorConfig;
use anyhow::Result;

/// Serves the web UI until interrupted
pub struct WebCommand {
    config: DoctorConfig,
}

impl WebCommand {
    pub fn new(mut config: DoctorConfig, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            config.web.host = host;
        }
        if let Some(port) = port {
            config.web.port = port;
        }
        Self { config }
    }
}

impl Command for WebCommand {
    async fn execute(&self) -> Result<()> {
        crate::web::serve(self.config.clone()).await
    }
}
