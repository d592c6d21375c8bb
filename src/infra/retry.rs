//! Backoff for requests that race with document edits

use std::future::Future;
use std::time::Duration;

use crate::error::LspError;

/// Doubling delays between attempts, capped at `ceiling`
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    pub attempts: u32,
    pub first_delay: Duration,
    pub ceiling: Duration,
}

impl Backoff {
    /// Outline requests are cheap to repeat and go stale quickly
    pub const OUTLINE: Backoff = Backoff {
        attempts: 4,
        first_delay: Duration::from_millis(50),
        ceiling: Duration::from_secs(1),
    };

    /// Waits before the second, third, ... attempt
    fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        std::iter::successors(Some(self.first_delay), |d| d.checked_mul(2))
            .map(|d| d.min(self.ceiling))
            .take(self.attempts.saturating_sub(1) as usize)
    }
}

/// Run `op`, repeating it while it fails with a retryable error
pub async fn with_backoff<F, T, Fut>(backoff: &Backoff, mut op: F) -> Result<T, LspError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LspError>>,
{
    let mut delays = backoff.delays();
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() => match delays.next() {
                Some(delay) => {
                    tracing::debug!("Attempt {} failed ({}), retrying in {:?}", attempt, e, delay);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => return Err(e),
            },
            Err(e) => return Err(e),
        }
    }
}
