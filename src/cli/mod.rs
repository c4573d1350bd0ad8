use crate::config::ConnectionOverrides;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "hashi-doctor")]
#[command(version)]
#[command(about = "Health diagnostics for HashiCorp Vault, Consul and Nomad clusters")]
#[command(long_about = "hashi-doctor queries the admin APIs of Vault, Consul and Nomad, classifies \
                       every answer as Good, Failed, Healthy, Unhealthy or Unknown, and renders the \
                       result to the console or as HTML, text, PDF and JSON reports.")]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Configuration file (defaults to ./hashi-doctor.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection flags shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Vault address (overrides VAULT_ADDR)
    #[arg(long, global = true, value_name = "ADDR")]
    pub vault_addr: Option<String>,
    /// Vault token (overrides VAULT_TOKEN)
    #[arg(long, global = true, value_name = "TOKEN")]
    pub vault_token: Option<String>,
    /// Consul address as http(s)://host:port or host:port (overrides CONSUL_HTTP_ADDR)
    #[arg(long, global = true, value_name = "ADDR")]
    pub consul_addr: Option<String>,
    /// Consul token (overrides CONSUL_HTTP_TOKEN)
    #[arg(long, global = true, value_name = "TOKEN")]
    pub consul_token: Option<String>,
    /// Nomad address (overrides NOMAD_ADDR)
    #[arg(long, global = true, value_name = "ADDR")]
    pub nomad_addr: Option<String>,
    /// Nomad token (overrides NOMAD_TOKEN)
    #[arg(long, global = true, value_name = "TOKEN")]
    pub nomad_token: Option<String>,
}

impl ConnectionArgs {
    pub fn overrides(&self) -> ConnectionOverrides {
        ConnectionOverrides {
            vault_addr: self.vault_addr.clone(),
            vault_token: self.vault_token.clone(),
            consul_addr: self.consul_addr.clone(),
            consul_token: self.consul_token.clone(),
            nomad_addr: self.nomad_addr.clone(),
            nomad_token: self.nomad_token.clone(),
        }
    }
}

/// Report files to write besides the console output
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Write an HTML report to this file or directory
    #[arg(long, value_name = "PATH")]
    pub html: Option<PathBuf>,
    /// Write a plain text report to this file or directory
    #[arg(long, value_name = "PATH")]
    pub txt: Option<PathBuf>,
    /// Write a PDF report to this file or directory
    #[arg(long, value_name = "PATH")]
    pub pdf: Option<PathBuf>,
    /// Write a JSON report to this file or directory
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run Vault diagnostics
    Vault {
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Run Consul diagnostics
    Consul {
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Run Nomad diagnostics
    Nomad {
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Check CPU, memory, disk and OS of this machine
    General {
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Run Vault, Consul and Nomad diagnostics as one combined report
    Doctor {
        #[command(flatten)]
        output: OutputArgs,
        /// Append the General (host) section
        #[arg(long)]
        include_host: bool,
    },
    /// Start the web UI
    Web {
        /// Address to bind (default: 127.0.0.1)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (default: 5000)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the effective configuration with tokens redacted
    Config {
        /// Write the configuration to this file instead of stdout
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}
