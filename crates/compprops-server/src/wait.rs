//! Wait for the database's TCP endpoint before connecting.

use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{Instant, sleep, timeout};

/// Exponential backoff between connection attempts.
#[derive(Debug, Clone)]
pub struct Backoff {
    pub initial: Duration,
    pub max: Duration,
    pub multiplier: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(100),
            max: Duration::from_secs(2),
            multiplier: 2,
        }
    }
}

impl Backoff {
    fn next(&self, current: Duration) -> Duration {
        current.saturating_mul(self.multiplier).min(self.max)
    }
}

/// Poll `host:port` until it accepts a TCP connection or `budget` is spent.
///
/// Returns the number of attempts made.
pub async fn wait_for_tcp(
    host: &str,
    port: u16,
    budget: Duration,
    backoff: &Backoff,
) -> anyhow::Result<u32> {
    let deadline = Instant::now() + budget;
    let mut delay = backoff.initial;
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        let remaining = deadline.saturating_duration_since(Instant::now());
        let last_err = match timeout(remaining, TcpStream::connect((host, port))).await {
            Ok(Ok(_)) => return Ok(attempts),
            Ok(Err(e)) => e.to_string(),
            Err(_) => "connect timed out".to_string(),
        };
        tracing::debug!(host, port, attempts, error = %last_err, "database not reachable yet");

        if Instant::now() + delay >= deadline {
            anyhow::bail!(
                "{host}:{port} not reachable after {budget:?} ({attempts} attempts): {last_err}"
            );
        }
        sleep(delay).await;
        delay = backoff.next(delay);
    }
}
