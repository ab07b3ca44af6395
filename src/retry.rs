//! Retry utilities with exponential backoff
//!
//! The completion client makes exactly one attempt per `send` call, so retry
//! policy lives here, wrapped around the call by whoever owns the deadline.
//! Backoff is exponential with jitter, and [`is_retryable_error`] encodes
//! which failures are worth a second attempt: transport trouble and
//! rate-limit/server-side HTTP statuses are, everything else is not.
//!
//! # Examples
//!
//! ```rust,no_run
//! use clova_agent::retry::{RetryConfig, retry_with_backoff_conditional};
//! use clova_agent::{CompletionClient, Message};
//! use std::time::Duration;
//!
//! # async fn example() -> clova_agent::Result<()> {
//! let client = CompletionClient::from_env()?;
//! let request = client.build_request(vec![Message::user("Hello")], None);
//!
//! let config = RetryConfig::default()
//!     .with_max_attempts(3)
//!     .with_initial_delay(Duration::from_secs(1));
//!
//! let response = retry_with_backoff_conditional(config, || client.send(&request)).await?;
//! # Ok(())
//! # }
//! ```

use crate::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,

    /// Delay before the first retry
    pub initial_delay: Duration,

    /// Upper bound on the delay between retries
    pub max_delay: Duration,

    /// Multiplier applied to the delay after each attempt
    pub backoff_multiplier: f64,

    /// Random jitter applied around the computed delay (0.0 to 1.0)
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Set the jitter factor, clamped to 0.0..=1.0
    pub fn with_jitter_factor(mut self, jitter: f64) -> Self {
        self.jitter_factor = jitter.clamp(0.0, 1.0);
        self
    }

    /// Delay for a given attempt with exponential backoff and jitter
    fn calculate_delay(&self, attempt: u32) -> Duration {
        let base_delay_ms = self.initial_delay.as_millis() as f64;
        let exponential_delay = base_delay_ms * self.backoff_multiplier.powi(attempt as i32);
        let capped_delay = exponential_delay.min(self.max_delay.as_millis() as f64);

        // Jitter is centered on the capped delay
        let jitter_range = capped_delay * self.jitter_factor;
        let jitter = rand::random::<f64>() * jitter_range;
        let final_delay = capped_delay + jitter - (jitter_range / 2.0);

        Duration::from_millis(final_delay.max(0.0) as u64)
    }
}

/// Decide whether a failure is worth another attempt.
///
/// Transport failures (connection refused, timeout, broken stream) are
/// transient by nature. Upstream HTTP failures are retryable only for 429
/// and the 5xx class; a 4xx means the request itself is bad and will fail
/// again. Envelope-level API errors, configuration errors, serialization
/// errors, and everything tool-related never benefit from a retry.
pub fn is_retryable_error(error: &Error) -> bool {
    match error {
        Error::Transport(_) => true,
        Error::UpstreamHttp { status, .. } => *status == 429 || (500..=599).contains(status),
        _ => false,
    }
}

/// Retry an async operation with exponential backoff.
///
/// Every failure triggers another attempt until the budget is spent; the
/// last error is returned when all attempts fail. Prefer
/// [`retry_with_backoff_conditional`] when the operation can fail in ways a
/// retry cannot fix.
pub async fn retry_with_backoff<F, Fut, T>(config: RetryConfig, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_error = None;

    for attempt in 0..config.max_attempts {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(err) => {
                last_error = Some(err);

                // No sleep after the final attempt
                if attempt < config.max_attempts - 1 {
                    sleep(config.calculate_delay(attempt)).await;
                }
            }
        }
    }

    Err(last_error.unwrap_or_else(|| Error::config("retry was configured with zero attempts")))
}

/// Retry an async operation, but only while failures are retryable.
///
/// A non-retryable error (see [`is_retryable_error`]) is returned
/// immediately without consuming the remaining budget.
pub async fn retry_with_backoff_conditional<F, Fut, T>(
    config: RetryConfig,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_error = None;

    for attempt in 0..config.max_attempts {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(err) => {
                if !is_retryable_error(&err) {
                    return Err(err);
                }

                last_error = Some(err);

                if attempt < config.max_attempts - 1 {
                    sleep(config.calculate_delay(attempt)).await;
                }
            }
        }
    }

    Err(last_error.unwrap_or_else(|| Error::config("retry was configured with zero attempts")))
}
