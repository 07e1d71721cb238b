//! TCP reachability probe.

use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Default connect deadline.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Checks that an endpoint accepts connections.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Single connection attempt to `host:port`.
    async fn probe(&self, host: &str, port: u16) -> Result<()>;
}

/// Prober that opens and immediately closes a TCP connection.
#[derive(Debug, Clone)]
pub struct TcpProber {
    timeout: Duration,
}

impl TcpProber {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TcpProber {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TIMEOUT)
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, host: &str, port: u16) -> Result<()> {
        tracing::debug!("Probing {}:{} (timeout {:?})", host, port, self.timeout);

        // Name resolution happens inside connect and counts against the deadline.
        match timeout(self.timeout, TcpStream::connect((host, port))).await {
            Ok(Ok(stream)) => {
                drop(stream);
                tracing::debug!("{}:{} is reachable", host, port);
                Ok(())
            }
            Ok(Err(e)) => Err(Error::ProbeFailed {
                host: host.to_string(),
                port,
                reason: e.to_string(),
            }),
            Err(_) => Err(Error::ProbeTimeout {
                host: host.to_string(),
                port,
                timeout: self.timeout,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::{TcpListener, TcpSocket};

    #[tokio::test]
    async fn test_probe_listening_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let prober = TcpProber::default();
        assert!(prober.probe("127.0.0.1", port).await.is_ok());
    }

    #[tokio::test]
    async fn test_probe_closed_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = TcpProber::default().probe("127.0.0.1", port).await;
        assert!(matches!(result, Err(Error::ProbeFailed { .. })));
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_probe_full_backlog_times_out() {
        // A listener that never accepts, with its backlog already taken,
        // drops further SYNs so the connect hangs.
        let socket = TcpSocket::new_v4().unwrap();
        socket.bind("127.0.0.1:0".parse().unwrap()).unwrap();
        let listener = socket.listen(0).unwrap();
        let port = listener.local_addr().unwrap().port();
        let _queued = TcpStream::connect(("127.0.0.1", port)).await.unwrap();

        let result = TcpProber::new(Duration::from_millis(300))
            .probe("127.0.0.1", port)
            .await;

        match result {
            Err(Error::ProbeTimeout { host, port: p, timeout }) => {
                assert_eq!(host, "127.0.0.1");
                assert_eq!(p, port);
                assert_eq!(timeout, Duration::from_millis(300));
            }
            other => panic!("expected a timeout, got {:?}", other),
        }
    }
}
