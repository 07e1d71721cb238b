//! Puppet Reconfigure Library
//!
//! Points a Puppet agent at new server endpoints, verifies them, and restores
//! the previous settings and SSL state if the new configuration fails to apply.

pub mod cli;
pub mod core;
pub mod error;
pub mod models;
pub mod preflight;
pub mod services;
pub mod utils;

pub use error::{Error, Result};
