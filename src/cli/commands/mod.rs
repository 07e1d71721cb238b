//! CLI command implementations.

pub mod probe;
pub mod reconfigure;
pub mod show;
