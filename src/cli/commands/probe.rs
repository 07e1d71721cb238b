//! Probe command implementation.

use crate::models::config::AppConfig;
use crate::preflight;
use crate::services::TcpProber;
use crate::Result;
use colored::Colorize;

/// Check the endpoints and print a line per endpoint. Returns whether all passed.
pub async fn probe(
    server: &str,
    ca_server: Option<&str>,
    port: u16,
    config: &AppConfig,
) -> Result<bool> {
    println!("{}", "Running connection checks...".bold());
    println!();

    let prober = TcpProber::new(config.probe.timeout());
    let results = preflight::check_endpoints(&prober, server, ca_server, port).await;
    preflight::print_results(&results);

    println!();

    Ok(preflight::all_passed(&results))
}
