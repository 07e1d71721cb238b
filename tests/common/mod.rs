//! In-memory collaborators for workflow tests.

#![allow(dead_code)]

use async_trait::async_trait;
use puppet_reconfigure::services::{Activator, ConfigStore, Prober, SettingAck};
use puppet_reconfigure::{Error, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Configuration store held in memory. Every call is logged as
/// `"<op> <setting>[ <value>]"` and can be made to fail.
#[derive(Default)]
pub struct FakeStore {
    values: Mutex<HashMap<(String, String), String>>,
    globals: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<String>>,
    failures: Mutex<Vec<String>>,
}

impl FakeStore {
    pub fn new(section: &str, server: &str, ssl_dir: &Path) -> Self {
        let store = Self::default();
        store.put(section, "server", server);
        store
            .globals
            .lock()
            .unwrap()
            .insert("ssldir".to_string(), ssl_dir.display().to_string());
        store
    }

    pub fn put(&self, section: &str, setting: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert((section.to_string(), setting.to_string()), value.to_string());
    }

    pub fn value(&self, section: &str, setting: &str) -> String {
        self.values
            .lock()
            .unwrap()
            .get(&(section.to_string(), setting.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    pub fn has_override(&self, section: &str, setting: &str) -> bool {
        self.values
            .lock()
            .unwrap()
            .contains_key(&(section.to_string(), setting.to_string()))
    }

    /// Make the call logged as `call` fail.
    pub fn fail_on(&self, call: &str) {
        self.failures.lock().unwrap().push(call.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with("set ") || c.starts_with("delete "))
            .collect()
    }

    fn log(&self, call: String) -> Result<()> {
        let fail = self.failures.lock().unwrap().contains(&call);
        self.calls.lock().unwrap().push(call.clone());
        if fail {
            return Err(Error::ConfigTool {
                command: format!("puppet config {}", call),
                stderr: "Error: injected failure".to_string(),
            });
        }
        Ok(())
    }
}

impl ConfigStore for FakeStore {
    fn get(&self, setting: &str, section: &str) -> Result<String> {
        self.log(format!("get {}", setting))?;
        Ok(self.value(section, setting))
    }

    fn set(&self, setting: &str, section: &str, value: &str) -> Result<SettingAck> {
        self.log(format!("set {} {}", setting, value))?;
        self.put(section, setting, value);
        Ok(SettingAck {
            setting: setting.to_string(),
            section: section.to_string(),
            value: value.to_string(),
        })
    }

    fn delete(&self, setting: &str, section: &str) -> Result<SettingAck> {
        self.log(format!("delete {}", setting))?;
        self.values
            .lock()
            .unwrap()
            .remove(&(section.to_string(), setting.to_string()));
        Ok(SettingAck {
            setting: setting.to_string(),
            section: section.to_string(),
            value: String::new(),
        })
    }

    fn config(&self, setting: &str) -> Result<String> {
        self.log(format!("config {}", setting))?;
        Ok(self
            .globals
            .lock()
            .unwrap()
            .get(setting)
            .cloned()
            .unwrap_or_default())
    }
}

/// Prober that times out for a fixed set of hosts.
#[derive(Default)]
pub struct FakeProber {
    unreachable: Vec<String>,
    probed: Mutex<Vec<String>>,
}

impl FakeProber {
    pub fn reachable() -> Self {
        Self::default()
    }

    pub fn timing_out(hosts: &[&str]) -> Self {
        Self {
            unreachable: hosts.iter().map(|h| h.to_string()).collect(),
            probed: Mutex::new(Vec::new()),
        }
    }

    pub fn probed(&self) -> Vec<String> {
        self.probed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Prober for FakeProber {
    async fn probe(&self, host: &str, port: u16) -> Result<()> {
        self.probed.lock().unwrap().push(format!("{}:{}", host, port));
        if self.unreachable.iter().any(|h| h == host) {
            return Err(Error::ProbeTimeout {
                host: host.to_string(),
                port,
                timeout: Duration::from_secs(5),
            });
        }
        Ok(())
    }
}

/// Activator with a fixed outcome and an optional side effect run first.
pub struct FakeActivator {
    failure: Option<String>,
    hook: Option<Box<dyn Fn() + Send + Sync>>,
    runs: AtomicUsize,
}

impl FakeActivator {
    pub fn succeeding() -> Self {
        Self {
            failure: None,
            hook: None,
            runs: AtomicUsize::new(0),
        }
    }

    pub fn failing(stderr: &str) -> Self {
        Self {
            failure: Some(stderr.to_string()),
            ..Self::succeeding()
        }
    }

    /// Run `hook` during activation, then succeed.
    pub fn succeeding_after(hook: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            hook: Some(Box::new(hook)),
            ..Self::succeeding()
        }
    }

    /// Run `hook` during activation, then fail.
    pub fn failing_after(stderr: &str, hook: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            hook: Some(Box::new(hook)),
            ..Self::failing(stderr)
        }
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

impl Activator for FakeActivator {
    fn activate(&self) -> Result<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        if let Some(hook) = &self.hook {
            hook();
        }
        match &self.failure {
            Some(stderr) => Err(Error::ActivationFailed {
                code: Some(1),
                stderr: stderr.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Lay out a small SSL directory under `root`.
pub fn make_ssl_dir(root: &Path) -> std::path::PathBuf {
    let ssl = root.join("ssl");
    std::fs::create_dir_all(ssl.join("certs")).unwrap();
    std::fs::create_dir_all(ssl.join("private_keys")).unwrap();
    std::fs::write(ssl.join("certs/ca.pem"), "-----BEGIN CERTIFICATE-----").unwrap();
    std::fs::write(ssl.join("certs/agent.example.com.pem"), "agent cert").unwrap();
    std::fs::write(ssl.join("private_keys/agent.example.com.pem"), "agent key").unwrap();
    ssl
}
