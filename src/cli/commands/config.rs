use super::Command;
use crate::config::DoctorConfig;
use anyhow::Result;
use std::path::PathBuf;

/// Shows the resolved configuration, or saves it as a starting config file
pub struct ConfigCommand {
    config: DoctorConfig,
    output: Option<PathBuf>,
}

impl ConfigCommand {
    pub fn new(config: DoctorConfig, output: Option<PathBuf>) -> Self {
        Self { config, output }
    }
}

impl Command for ConfigCommand {
    async fn execute(&self) -> Result<()> {
        let redacted = self.config.redacted();
        match &self.output {
            Some(path) => {
                redacted.save_to_file(path)?;
                println!("Configuration written to {}", path.display());
            }
            None => print!("{}", redacted.to_toml()?),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn written_config_never_contains_tokens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hashi-doctor.toml");
        let mut config = DoctorConfig::default();
        config.vault.token = Some("s.secret".to_string());

        ConfigCommand::new(config, Some(path.clone())).execute().await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("s.secret"));
        assert!(written.contains("<redacted>"));
        assert!(written.contains("http://127.0.0.1:8200"));
    }
}
