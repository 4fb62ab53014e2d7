use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Errors that may succeed when the same call is repeated
pub trait Transient {
    fn is_transient(&self) -> bool;
}

/// Bounded retry with exponential backoff for external fetches
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
        }
    }
}

/// Run `operation` until it succeeds, fails permanently, or runs out of attempts
///
/// The delay doubles after every transient failure. The last error is returned.
pub async fn with_retry<T, E, F, Fut>(policy: &RetryPolicy, label: &str, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Transient + Display,
{
    let attempts = policy.max_attempts.max(1);
    let mut delay = policy.initial_backoff;
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts && e.is_transient() => {
                tracing::warn!("{} failed ({}), retry {}/{} in {:?}", label, e, attempt, attempts - 1, delay);
                tokio::time::sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
