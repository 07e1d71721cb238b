//! Command line argument definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Puppet Reconfigure - Point a Puppet agent at new servers, with rollback
#[derive(Parser, Debug)]
#[command(name = "puppet-reconfigure")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: <config dir>/puppet_reconfigure/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Switch the agent to new server endpoints, rolling back on failure
    Reconfigure(ReconfigureArgs),

    /// Check that the server endpoints accept connections
    Probe {
        /// Primary server
        #[arg(long)]
        server: String,

        /// CA server
        #[arg(long)]
        ca_server: Option<String>,

        /// Port to connect to
        #[arg(short, long, default_value_t = 8140)]
        port: u16,
    },

    /// Show the current endpoint settings
    Show {
        /// Configuration section to read
        #[arg(short, long, default_value = "main")]
        section: String,
    },
}

#[derive(Args, Debug)]
pub struct ReconfigureArgs {
    /// Read the JSON request from a file instead of stdin
    #[arg(short, long, value_name = "FILE", conflicts_with = "server")]
    pub input: Option<PathBuf>,

    /// New primary server (builds the request from flags)
    #[arg(long)]
    pub server: Option<String>,

    /// New CA server
    #[arg(long, requires = "server")]
    pub ca_server: Option<String>,

    /// Port used to verify the endpoints
    #[arg(short, long, requires = "server")]
    pub port: Option<u16>,

    /// Configuration section holding the settings
    #[arg(short, long, default_value = "main")]
    pub section: String,

    /// Probe the endpoints before changing anything
    #[arg(long, requires = "server")]
    pub verify_connection: bool,

    /// Indent the JSON output
    #[arg(long)]
    pub pretty: bool,
}
