//! Puppet configuration tool and agent runner.
//!
//! Every operation shells out to the `puppet` executable; there is no batching
//! and no retry at this level.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Acknowledgement of a write to the configuration store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingAck {
    pub setting: String,
    pub section: String,
    /// Value written, or the tool's output for deletes.
    pub value: String,
}

/// Key/value configuration store with named sections.
pub trait ConfigStore: Send + Sync {
    /// Read the effective value of `setting` in `section`.
    fn get(&self, setting: &str, section: &str) -> Result<String>;

    /// Write `value` for `setting` into `section`.
    fn set(&self, setting: &str, section: &str, value: &str) -> Result<SettingAck>;

    /// Remove the override of `setting` in `section`.
    fn delete(&self, setting: &str, section: &str) -> Result<SettingAck>;

    /// Read a global setting, without a section.
    fn config(&self, setting: &str) -> Result<String>;
}

/// Puts freshly written configuration into effect.
pub trait Activator: Send + Sync {
    fn activate(&self) -> Result<()>;
}

/// Locate the puppet executable.
///
/// An explicit path wins; otherwise the standard agent install location is used
/// when present, falling back to `puppet` on the `PATH`.
pub fn resolve_puppet_bin(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    match installed_puppet_bin() {
        Some(path) if path.exists() => path,
        _ => PathBuf::from("puppet"),
    }
}

#[cfg(windows)]
fn installed_puppet_bin() -> Option<PathBuf> {
    std::env::var_os("ProgramFiles").map(|dir| {
        PathBuf::from(dir)
            .join("Puppet Labs")
            .join("Puppet")
            .join("bin")
            .join("puppet.bat")
    })
}

#[cfg(not(windows))]
fn installed_puppet_bin() -> Option<PathBuf> {
    Some(PathBuf::from("/opt/puppetlabs/bin/puppet"))
}

/// Arguments for `puppet config <action>`.
fn config_args<'a>(action: &'a str, section: Option<&'a str>, rest: &[&'a str]) -> Vec<&'a str> {
    let mut args = vec!["config", action];
    if let Some(section) = section {
        args.push("--section");
        args.push(section);
    }
    args.extend_from_slice(rest);
    args
}

/// Run `bin` with `args`, mapping a missing executable to [`Error::ToolNotFound`].
fn run_tool(bin: &Path, args: &[&str]) -> Result<Output> {
    tracing::debug!("Running {} {}", bin.display(), args.join(" "));

    Command::new(bin).args(args).output().map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            Error::ToolNotFound(bin.display().to_string())
        } else {
            Error::Io(e)
        }
    })
}

/// Configuration store backed by `puppet config`.
#[derive(Debug, Clone)]
pub struct PuppetConfig {
    bin: PathBuf,
}

impl PuppetConfig {
    pub fn new(bin: impl Into<PathBuf>) -> Self {
        Self { bin: bin.into() }
    }

    /// Path of the executable in use.
    pub fn bin(&self) -> &Path {
        &self.bin
    }

    /// Run a config subcommand and return trimmed stdout.
    fn run(&self, args: &[&str]) -> Result<String> {
        let output = run_tool(&self.bin, args)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let command = format!("puppet {}", args.join(" "));
            tracing::error!("{} exited with {}: {}", command, output.status, stderr);
            return Err(Error::ConfigTool { command, stderr });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl ConfigStore for PuppetConfig {
    fn get(&self, setting: &str, section: &str) -> Result<String> {
        self.run(&config_args("print", Some(section), &[setting]))
    }

    fn set(&self, setting: &str, section: &str, value: &str) -> Result<SettingAck> {
        self.run(&config_args("set", Some(section), &[setting, value]))?;
        Ok(SettingAck {
            setting: setting.to_string(),
            section: section.to_string(),
            value: value.to_string(),
        })
    }

    fn delete(&self, setting: &str, section: &str) -> Result<SettingAck> {
        let stdout = self.run(&config_args("delete", Some(section), &[setting]))?;
        Ok(SettingAck {
            setting: setting.to_string(),
            section: section.to_string(),
            value: stdout,
        })
    }

    fn config(&self, setting: &str) -> Result<String> {
        self.run(&config_args("print", None, &[setting]))
    }
}

/// Activator that runs the puppet agent once.
#[derive(Debug, Clone)]
pub struct PuppetAgent {
    bin: PathBuf,
    args: Vec<String>,
    success_codes: Vec<i32>,
}

impl PuppetAgent {
    pub fn new(bin: impl Into<PathBuf>, args: Vec<String>, success_codes: Vec<i32>) -> Self {
        Self {
            bin: bin.into(),
            args,
            success_codes,
        }
    }
}

impl Activator for PuppetAgent {
    fn activate(&self) -> Result<()> {
        let args: Vec<&str> = self.args.iter().map(String::as_str).collect();
        tracing::info!("Running puppet {}", args.join(" "));

        let output = run_tool(&self.bin, &args)?;
        let code = output.status.code();

        if code.is_some_and(|c| self.success_codes.contains(&c)) {
            tracing::info!("Agent run finished with exit code {:?}", code);
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let stderr = if stderr.is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        } else {
            stderr
        };
        tracing::error!("Agent run failed with exit code {:?}", code);
        Err(Error::ActivationFailed { code, stderr })
    }
}
