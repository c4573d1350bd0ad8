use anyhow::Result;
use clap::Parser;
use hashi_doctor::cli::commands::{Command, ConfigCommand, DiagnoseCommand, WebCommand};
use hashi_doctor::cli::{Cli, Commands};
use hashi_doctor::config::DoctorConfig;
use hashi_doctor::diagnostics::Service;
use hashi_doctor::telemetry::init_telemetry;

fn main() -> Result<()> {
    let cli = Cli::parse();

    DoctorConfig::load_env_file()?;
    let mut config = DoctorConfig::load(cli.config.as_deref())?;
    config.apply_overrides(&cli.connection.overrides());

    init_telemetry(&config.observability)?;

    tokio::runtime::Runtime::new()?.block_on(async {
        match cli.command {
            Commands::Vault { output } => {
                DiagnoseCommand::single(Service::Vault, output, config).execute().await
            }
            Commands::Consul { output } => {
                DiagnoseCommand::single(Service::Consul, output, config).execute().await
            }
            Commands::Nomad { output } => {
                DiagnoseCommand::single(Service::Nomad, output, config).execute().await
            }
            Commands::General { output } => {
                DiagnoseCommand::single(Service::Host, output, config).execute().await
            }
            Commands::Doctor {
                output,
                include_host,
            } => DiagnoseCommand::doctor(output, include_host, config).execute().await,
            Commands::Web { host, port } => WebCommand::new(config, host, port).execute().await,
            Commands::Config { output } => ConfigCommand::new(config, output).execute().await,
        }
    })
}
