//! Puppet Reconfigure CLI
//!
//! Switches a Puppet agent to new server endpoints, rolling back on failure.

use clap::Parser;
use puppet_reconfigure::cli::{
    args::{Cli, Commands},
    commands::{probe, reconfigure, show},
};
use puppet_reconfigure::models::config::{self, AppConfig};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    let config = load_config(&cli)?;

    let success = match cli.command {
        Commands::Reconfigure(args) => reconfigure::reconfigure(&args, &config).await?,

        Commands::Probe {
            server,
            ca_server,
            port,
        } => probe::probe(&server, ca_server.as_deref(), port, &config).await?,

        Commands::Show { section } => {
            show::show(&section, &config).await?;
            true
        }
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Initialize the logging system.
///
/// Logs go to stderr; stdout is reserved for command output.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default_filter = if verbose {
        "puppet_reconfigure=debug"
    } else {
        "puppet_reconfigure=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(filter)
        .init();
}

/// Load configuration from `--config` or the default location.
fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    match &cli.config {
        Some(path) => {
            let config = config::read_config(path)?;
            Ok(config.with_env_overrides())
        }
        None => Ok(config::load_config()),
    }
}
