use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "hashi-doctor.toml";

/// Main configuration structure for HashiCorp Doctor
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DoctorConfig {
    /// Vault connection
    pub vault: ServiceEndpoint,
    /// Consul connection
    pub consul: ServiceEndpoint,
    /// Nomad connection
    pub nomad: ServiceEndpoint,
    /// Per-request probe settings
    pub probe: ProbeConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
    /// Web UI bind settings
    pub web: WebConfig,
}

/// Resolved connection parameters for one backend
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServiceEndpoint {
    /// Base address, e.g. `https://vault.internal:8200`
    pub address: String,
    /// ACL token sent with every request
    pub token: Option<String>,
    /// Disable TLS certificate verification
    pub skip_verify: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProbeConfig {
    /// Upper bound for a single HTTP request
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Default log filter when RUST_LOG is unset
    pub log_level: String,
    /// Emit JSON log lines instead of compact text
    pub json_logs: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

/// Connection values given on the command line; they win over everything else
#[derive(Debug, Clone, Default)]
pub struct ConnectionOverrides {
    pub vault_addr: Option<String>,
    pub vault_token: Option<String>,
    pub consul_addr: Option<String>,
    pub consul_token: Option<String>,
    pub nomad_addr: Option<String>,
    pub nomad_token: Option<String>,
}

pub const VAULT_DEFAULT_PORT: u16 = 8200;
pub const CONSUL_DEFAULT_PORT: u16 = 8500;
pub const NOMAD_DEFAULT_PORT: u16 = 4646;

impl Default for DoctorConfig {
    fn default() -> Self {
        Self {
            vault: ServiceEndpoint::local(VAULT_DEFAULT_PORT),
            consul: ServiceEndpoint::local(CONSUL_DEFAULT_PORT),
            nomad: ServiceEndpoint::local(NOMAD_DEFAULT_PORT),
            probe: ProbeConfig { timeout_seconds: 5 },
            observability: ObservabilityConfig {
                log_level: "warn".to_string(),
                json_logs: false,
            },
            web: WebConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
            },
        }
    }
}

impl ServiceEndpoint {
    fn local(port: u16) -> Self {
        Self {
            address: format!("http://127.0.0.1:{port}"),
            token: None,
            skip_verify: false,
        }
    }
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.max(1))
    }
}

impl DoctorConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (`--config` path or hashi-doctor.toml)
    /// 3. Environment variables prefixed with HASHI_DOCTOR_ (`__` separates sections)
    /// 4. The standard VAULT_*, CONSUL_HTTP_* and NOMAD_* variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Config::try_from(&DoctorConfig::default())?;
        let mut builder = Config::builder().add_source(defaults);

        match path {
            Some(path) => {
                builder = builder.add_source(File::from(path).required(true));
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                builder = builder.add_source(File::with_name(DEFAULT_CONFIG_FILE));
            }
            None => {}
        }

        builder = builder.add_source(
            Environment::with_prefix("HASHI_DOCTOR")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut doctor_config: DoctorConfig = builder
            .build()
            .context("Failed to read configuration sources")?
            .try_deserialize()
            .context("Invalid configuration")?;

        doctor_config.apply_env_overrides(|key| std::env::var(key).ok());
        doctor_config.normalize();
        Ok(doctor_config)
    }

    /// Apply the environment variables the HashiCorp CLIs themselves read
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("VAULT_ADDR") {
            self.vault.address = addr;
        }
        if let Some(token) = lookup("VAULT_TOKEN") {
            self.vault.token = Some(token);
        }
        if let Some(flag) = lookup("VAULT_SKIP_VERIFY") {
            self.vault.skip_verify = is_enabled(&flag);
        }

        if let Some(addr) = lookup("CONSUL_HTTP_ADDR") {
            self.consul.address = addr;
        }
        if let Some(token) = lookup("CONSUL_HTTP_TOKEN") {
            self.consul.token = Some(token);
        }
        if let Some(flag) = lookup("CONSUL_HTTP_SSL_VERIFY") {
            self.consul.skip_verify = is_disabled(&flag);
        }

        if let Some(addr) = lookup("NOMAD_ADDR") {
            self.nomad.address = addr;
        }
        if let Some(token) = lookup("NOMAD_TOKEN") {
            self.nomad.token = Some(token);
        }
        if let Some(flag) = lookup("NOMAD_SKIP_VERIFY") {
            self.nomad.skip_verify = is_enabled(&flag);
        }
    }

    pub fn apply_overrides(&mut self, overrides: &ConnectionOverrides) {
        if let Some(addr) = &overrides.vault_addr {
            self.vault.address = addr.clone();
        }
        if let Some(token) = &overrides.vault_token {
            self.vault.token = Some(token.clone());
        }
        if let Some(addr) = &overrides.consul_addr {
            self.consul.address = addr.clone();
        }
        if let Some(token) = &overrides.consul_token {
            self.consul.token = Some(token.clone());
        }
        if let Some(addr) = &overrides.nomad_addr {
            self.nomad.address = addr.clone();
        }
        if let Some(token) = &overrides.nomad_token {
            self.nomad.token = Some(token.clone());
        }
        self.normalize();
    }

    /// Bring every address into `scheme://host:port` form
    pub fn normalize(&mut self) {
        self.vault.address = normalize_address(&self.vault.address, VAULT_DEFAULT_PORT);
        self.consul.address = normalize_address(&self.consul.address, CONSUL_DEFAULT_PORT);
        self.nomad.address = normalize_address(&self.nomad.address, NOMAD_DEFAULT_PORT);
        for endpoint in [&mut self.vault, &mut self.consul, &mut self.nomad] {
            if endpoint.token.as_deref().is_some_and(|t| t.trim().is_empty()) {
                endpoint.token = None;
            }
        }
    }

    /// Copy of the configuration with tokens masked, safe to print
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for endpoint in [&mut copy.vault, &mut copy.consul, &mut copy.nomad] {
            if endpoint.token.is_some() {
                endpoint.token = Some("<redacted>".to_string());
            }
        }
        copy
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = self.to_toml()?;
        std::fs::write(path.as_ref(), toml_content)
            .with_context(|| format!("Failed to write {}", path.as_ref().display()))?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Accepts `host`, `host:port` or a full URL and returns `scheme://host:port`
pub fn normalize_address(raw: &str, default_port: u16) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    let (scheme, rest) = match trimmed.split_once("://") {
        Some((scheme, rest)) => (scheme.to_ascii_lowercase(), rest),
        None => ("http".to_string(), trimmed),
    };

    let (authority, path) = match rest.find('/') {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };
    let has_port = if authority.starts_with('[') {
        authority.contains("]:")
    } else {
        authority.contains(':')
    };

    if has_port || authority.is_empty() {
        format!("{scheme}://{authority}{path}")
    } else {
        format!("{scheme}://{authority}:{default_port}{path}")
    }
}

fn is_enabled(flag: &str) -> bool {
    matches!(flag.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

fn is_disabled(flag: &str) -> bool {
    matches!(flag.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no")
}
