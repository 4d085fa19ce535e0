//! Startup backoff for connecting to a database that may still be booting.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Exponential backoff schedule.
///
/// Yields one delay per retry: `initial`, doubled each time, capped at `max`.
/// Defaults to 5 retries starting at 200ms with a 5s cap.
#[derive(Debug, Clone)]
pub struct Backoff {
    pub retries: u32,
    pub initial: Duration,
    pub max: Duration,
    pub jitter: bool,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            retries: 5,
            initial: Duration::from_millis(200),
            max: Duration::from_secs(5),
            jitter: true,
        }
    }
}

impl Backoff {
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn initial(mut self, initial: Duration) -> Self {
        self.initial = initial;
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    /// Wait before retry number `retry` (0-based).
    fn delay(&self, retry: u32) -> Duration {
        let base = self
            .initial
            .saturating_mul(2u32.saturating_pow(retry))
            .min(self.max);
        if self.jitter { jittered(base) } else { base }
    }
}

/// Somewhere between half and all of `delay`.
fn jittered(delay: Duration) -> Duration {
    use std::collections::hash_map::RandomState;
    use std::hash::BuildHasher;

    let percent = 50 + RandomState::new().hash_one(std::time::Instant::now()) % 51;
    delay * percent as u32 / 100
}

/// Run `operation` until it succeeds or `backoff.retries` retries are spent.
///
/// Returns the last error together with the number of attempts made.
pub async fn retry_with_backoff<F, Fut, T, E>(
    mut operation: F,
    backoff: &Backoff,
) -> Result<T, (u32, E)>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut retry = 0;
    loop {
        match operation().await {
            Ok(value) => {
                if retry > 0 {
                    debug!(retries = retry, "Succeeded after retrying");
                }
                return Ok(value);
            }
            Err(e) if retry >= backoff.retries => {
                warn!(attempts = retry + 1, error = %e, "Giving up");
                return Err((retry + 1, e));
            }
            Err(e) => {
                let wait = backoff.delay(retry);
                retry += 1;
                debug!(retry, wait_ms = wait.as_millis() as u64, error = %e, "Attempt failed, retrying");
                tokio::time::sleep(wait).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn quick() -> Backoff {
        Backoff::default()
            .initial(Duration::from_millis(2))
            .without_jitter()
    }

    #[tokio::test]
    async fn test_succeeds_once_the_database_is_up() {
        let calls = &AtomicU32::new(0);

        let result = retry_with_backoff(
            move || async move {
                match calls.fetch_add(1, Ordering::SeqCst) {
                    0 | 1 => Err("connection refused"),
                    _ => Ok("connected"),
                }
            },
            &quick(),
        )
        .await;

        assert_eq!(result.unwrap(), "connected");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_reports_attempts_when_giving_up() {
        let calls = &AtomicU32::new(0);

        let result = retry_with_backoff(
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>("connection refused")
            },
            &quick().retries(2),
        )
        .await;

        assert_eq!(result.unwrap_err(), (3, "connection refused"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_delay_doubles_up_to_the_cap() {
        let backoff = Backoff::default().without_jitter();
        assert_eq!(backoff.delay(0), Duration::from_millis(200));
        assert_eq!(backoff.delay(1), Duration::from_millis(400));
        assert_eq!(backoff.delay(10), Duration::from_secs(5));
    }

    #[test]
    fn test_jitter_stays_within_half_and_full_delay() {
        let backoff = Backoff::default();
        for _ in 0..20 {
            let wait = backoff.delay(2);
            assert!(wait >= Duration::from_millis(400) && wait <= Duration::from_millis(800));
        }
    }
}
