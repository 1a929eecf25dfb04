//! Retry logic with fixed or exponential backoff and optional jitter.
//!
//! Only transient failures (5xx, timeouts, network errors) are retried.
//! Permanent errors (4xx, API errors, local failures) are returned at once.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::warn;

use crate::error::{Error, Result};

/// Default retry configuration.
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_BASE_DELAY_MS: u64 = 1000;
const DEFAULT_MAX_DELAY_MS: u64 = 30_000;

/// How the delay grows between attempts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Backoff {
    /// Same delay every time.
    #[default]
    Fixed,
    /// Delay doubles on every attempt.
    Exponential,
}

/// Retry policy configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts after the first try
    pub max_retries: u32,
    /// Delay before the first retry (milliseconds)
    pub base_delay_ms: u64,
    /// Maximum delay between retries (milliseconds)
    pub max_delay_ms: u64,
    /// Jitter factor to add randomness (0.0 - 1.0)
    pub jitter_factor: f64,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            jitter_factor: 0.0,
            backoff: Backoff::Fixed,
        }
    }
}

impl RetryPolicy {
    /// Fixed delay between a bounded number of retries.
    #[must_use]
    pub fn fixed(max_retries: u32, delay_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay_ms: delay_ms,
            max_delay_ms: delay_ms.max(DEFAULT_MAX_DELAY_MS),
            ..Self::default()
        }
    }

    /// Doubling delay, capped at `max_delay_ms`.
    #[must_use]
    pub fn exponential(max_retries: u32, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay_ms,
            max_delay_ms,
            jitter_factor: 0.0,
            backoff: Backoff::Exponential,
        }
    }

    /// Never retry.
    #[must_use]
    pub fn none() -> Self {
        Self::fixed(0, 0)
    }

    /// Set jitter factor.
    #[must_use]
    pub const fn with_jitter(mut self, jitter_factor: f64) -> Self {
        self.jitter_factor = jitter_factor;
        self
    }

    /// Delay before retry number `attempt` (0-indexed).
    ///
    /// Fixed: `base_delay`. Exponential: `min(base_delay * 2^attempt, max_delay)`.
    /// Jitter adds up to `jitter_factor` of the delay on top.
    #[must_use]
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let delay = match self.backoff {
            Backoff::Fixed => self.base_delay_ms,
            Backoff::Exponential => self
                .base_delay_ms
                .saturating_mul(2_u64.saturating_pow(attempt))
                .min(self.max_delay_ms),
        };

        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let jitter_ms = if self.jitter_factor > 0.0 && delay > 0 {
            let jitter_range = (delay as f64) * self.jitter_factor;
            rand::thread_rng().gen_range(0.0..jitter_range).floor() as u64
        } else {
            0
        };

        Duration::from_millis(delay.saturating_add(jitter_ms))
    }

    #[must_use]
    pub const fn should_retry(&self, error: &Error) -> bool {
        error.is_transient()
    }

    /// Create a retry state for tracking attempts.
    #[must_use]
    pub fn state(&self) -> RetryState {
        RetryState::new(self.clone())
    }
}

/// Retry state for tracking retry attempts.
#[derive(Debug, Clone)]
pub struct RetryState {
    policy: RetryPolicy,
    attempt: u32,
}

impl RetryState {
    #[must_use]
    pub const fn new(policy: RetryPolicy) -> Self {
        Self { policy, attempt: 0 }
    }

    /// Retries used so far.
    #[must_use]
    pub const fn current_attempt(&self) -> u32 {
        self.attempt
    }

    #[must_use]
    pub const fn can_retry(&self) -> bool {
        self.attempt < self.policy.max_retries
    }

    /// Record a retry attempt and get the delay before it.
    ///
    /// Returns None if no more retries are available.
    pub fn next_retry(&mut self) -> Option<Duration> {
        if !self.can_retry() {
            return None;
        }

        let delay = self.policy.calculate_delay(self.attempt);
        self.attempt = self.attempt.saturating_add(1);
        Some(delay)
    }

    /// Delay before retrying `error`, or None if it must not be retried.
    pub fn should_retry_with_delay(&mut self, error: &Error) -> Option<Duration> {
        if self.policy.should_retry(error) {
            self.next_retry()
        } else {
            None
        }
    }
}

/// Run `operation` until it succeeds, fails permanently, or retries run out.
///
/// # Errors
///
/// Returns the last error of the operation.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, label: &str, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut state = policy.state();
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => match state.should_retry_with_delay(&error) {
                Some(delay) => {
                    warn!(
                        label,
                        attempt = state.current_attempt(),
                        max_retries = policy.max_retries,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %error,
                        "Retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                None => return Err(error),
            },
        }
    }
}
