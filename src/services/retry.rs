use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use lazy_static::lazy_static;
use log::{error, warn};
use rand::Rng;
use regex::Regex;

lazy_static! {
    static ref RATE_LIMIT_PATTERN: Regex =
        Regex::new(r"(?i)429|resource[ _]exhausted|quota|rate[ -]?limit")
            .expect("rate limit pattern is valid");
}

/// True when an upstream error message looks like throttling rather than a real failure.
pub fn is_rate_limit(message: &str) -> bool {
    RATE_LIMIT_PATTERN.is_match(message)
}

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub base: f64,
    pub max_delay: Duration,
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 1,
            initial_delay: Duration::from_secs(3),
            base: 2.0,
            max_delay: Duration::from_secs(32),
            max_jitter: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// `min(initial * base^attempt, max_delay)`, before jitter.
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let factor = self.base.max(1.0).powi(attempt as i32);
        let scaled = self.initial_delay.as_secs_f64() * factor;
        Duration::from_secs_f64(scaled.min(self.max_delay.as_secs_f64()))
    }

    fn jitter(&self) -> Duration {
        let millis = self.max_jitter.as_millis() as u64;
        if millis == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..millis))
    }
}

/// Runs `call`, retrying rate-limited failures with exponential backoff.
///
/// Errors that are not rate limits come back untouched on the first
/// occurrence. Once `max_retries` retries have been spent on rate limits the
/// `fallback` value is returned instead of an error. Successive delays never
/// shrink, even when jitter would make a capped delay smaller than the last.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    fallback: T,
    mut call: F,
) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut previous = Duration::ZERO;
    let mut attempt: u32 = 0;

    loop {
        let err = match call().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let message = err.to_string();
        if !is_rate_limit(&message) {
            error!("Upstream call failed: {}", message);
            return Err(err);
        }

        if attempt >= policy.max_retries {
            error!(
                "Rate limit persisted after {} retries, giving up: {}",
                policy.max_retries, message
            );
            return Ok(fallback);
        }

        let delay = (policy.base_delay(attempt) + policy.jitter()).max(previous);
        warn!(
            "Rate limited, retry {}/{} in {:.1}s",
            attempt + 1,
            policy.max_retries,
            delay.as_secs_f64()
        );
        sleeper.sleep(delay).await;
        previous = delay;
        attempt += 1;
    }
}
