use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::debug;

/// Bounded retry with exponential backoff and no jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    /// `attempts` below 1 is raised to 1.
    pub fn new(attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    /// A single attempt, no waiting.
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Waits between consecutive attempts: `attempts - 1` values starting at
    /// `base_delay`, doubling, capped at `max_delay`.
    pub fn delays(&self) -> Backoff {
        Backoff {
            next: self.base_delay.min(self.max_delay),
            max: self.max_delay,
            remaining: self.attempts - 1,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(50), Duration::from_millis(250))
    }
}

/// Iterator over backoff delays.
#[derive(Debug, Clone)]
pub struct Backoff {
    next: Duration,
    max: Duration,
    remaining: u32,
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let current = self.next;
        self.next = current.saturating_mul(2).min(self.max);
        Some(current)
    }
}

/// Call `attempt` up to `policy.attempts()` times.
///
/// Any error counts as a failed attempt. Between failures the task sleeps for
/// the next backoff delay; there is no sleep after the final failure. When
/// every attempt fails, the last error is returned unchanged.
pub async fn request<T, E, F, Fut>(policy: &RetryPolicy, mut attempt: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut delays = policy.delays();
    let mut number = 1u32;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(err) => match delays.next() {
                Some(delay) => {
                    debug!(
                        attempt = number,
                        of = policy.attempts(),
                        ?delay,
                        error = %err,
                        "attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    number += 1;
                }
                None => {
                    debug!(attempts = number, error = %err, "all attempts failed");
                    return Err(err);
                }
            },
        }
    }
}
