//! Preflight checks module.
//!
//! Probes every requested endpoint and reports each one, instead of stopping at
//! the first failure like the workflow does.

use crate::services::Prober;
use colored::Colorize;

/// Result of a preflight check.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub success: bool,
    pub message: String,
    pub hint: Option<String>,
}

impl CheckResult {
    pub fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            success: true,
            message: message.to_string(),
            hint: None,
        }
    }

    pub fn fail(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            success: false,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }
}

/// Probe the server and, if given, the CA server.
pub async fn check_endpoints(
    prober: &dyn Prober,
    server: &str,
    ca_server: Option<&str>,
    port: u16,
) -> Vec<CheckResult> {
    let mut results = Vec::new();

    results.push(check_endpoint(prober, "server", server, port).await);

    if let Some(ca_server) = ca_server {
        results.push(check_endpoint(prober, "ca_server", ca_server, port).await);
    }

    results
}

async fn check_endpoint(prober: &dyn Prober, name: &str, host: &str, port: u16) -> CheckResult {
    match prober.probe(host, port).await {
        Ok(()) => CheckResult::ok(name, &format!("{}:{} reachable", host, port)),
        Err(e) if e.is_timeout() => CheckResult::fail(
            name,
            &format!("{}:{} timed out", host, port),
            "Check firewall rules between this agent and the server",
        ),
        Err(e) => CheckResult::fail(
            name,
            &e.to_string(),
            "Check the hostname resolves and the puppetserver service is running",
        ),
    }
}

/// Print preflight check results.
pub fn print_results(results: &[CheckResult]) {
    for result in results {
        if result.success {
            println!(
                "{} {}: {}",
                "[OK]".green(),
                result.name.bold(),
                result.message
            );
        } else {
            println!(
                "{} {}: {}",
                "[FAIL]".red(),
                result.name.bold(),
                result.message
            );
            if let Some(ref hint) = result.hint {
                println!("  {} {}", "->".yellow(), hint);
            }
        }
    }
}

/// Check if all preflight checks passed.
pub fn all_passed(results: &[CheckResult]) -> bool {
    results.iter().all(|r| r.success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::TcpProber;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_check_endpoints_reports_each() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let prober = TcpProber::default();
        let results = check_endpoints(&prober, "127.0.0.1", Some("127.0.0.1"), port).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[1].name, "ca_server");
        assert!(all_passed(&results));
    }

    #[test]
    fn test_all_passed() {
        let results = vec![
            CheckResult::ok("server", "reachable"),
            CheckResult::fail("ca_server", "timed out", "check firewall"),
        ];
        assert!(!all_passed(&results));
        assert!(all_passed(&results[..1]));
    }
}
