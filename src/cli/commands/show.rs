//! Show command implementation.

use crate::core::backup::backup_path_for;
use crate::models::config::AppConfig;
use crate::models::request::{CA_SERVER_SETTING, SERVER_SETTING, SSLDIR_SETTING};
use crate::services::{ConfigStore, Services};
use crate::Result;
use colored::Colorize;
use std::path::PathBuf;

/// Print the current endpoint settings of `section`.
pub async fn show(section: &str, config: &AppConfig) -> Result<()> {
    let services = Services::from_config(config);
    let store = &services.store;

    println!("{}", format!("Puppet settings [{}]", section).bold().cyan());
    println!("  {} {}", "Executable:".bold(), store.bin().display());
    println!();

    let server = store.get(SERVER_SETTING, section)?;
    let ca_server = store.get(CA_SERVER_SETTING, section)?;
    let ssl_dir = PathBuf::from(store.config(SSLDIR_SETTING)?);

    println!("  {:<12} {}", "server:".bold(), server);
    println!("  {:<12} {}", "ca_server:".bold(), ca_server);
    println!("  {:<12} {}", "ssldir:".bold(), ssl_dir.display());

    let backup = backup_path_for(&ssl_dir);
    if backup.exists() {
        println!();
        println!(
            "{} previous state directory kept at {}",
            "[INFO]".yellow(),
            backup.display()
        );
    }

    Ok(())
}
