//! Retry Mechanism Module
//!
//! Exponential backoff for fallible async operations. Delays grow by a fixed
//! multiplier and carry no jitter, so a schedule is fully determined by the
//! policy: 1000ms, 2000ms, 4000ms for the defaults.

use std::time::Duration;
use tokio::time::sleep;

use crate::cancel::CancelHandle;
use crate::error::EnhanceError;

/// Retry policy configuration
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Factor applied to the delay after each retry
    pub backoff_multiplier: f64,
    /// Custom retry condition function
    pub retry_condition: Option<fn(&EnhanceError) -> bool>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(1000),
            backoff_multiplier: 2.0,
            retry_condition: None,
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::default().with_max_retries(0)
    }

    /// Set maximum retries after the first attempt
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set initial delay
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set backoff multiplier
    pub const fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Set custom retry condition, replacing the default classification
    pub fn with_retry_condition(mut self, condition: fn(&EnhanceError) -> bool) -> Self {
        self.retry_condition = Some(condition);
        self
    }

    /// Check if an error should be retried
    pub fn should_retry(&self, error: &EnhanceError) -> bool {
        match self.retry_condition {
            Some(condition) => condition(error),
            None => error.is_retryable(),
        }
    }

    /// Delay before retry number `retry` (zero-based).
    pub fn calculate_delay(&self, retry: u32) -> Duration {
        let factor = self.backoff_multiplier.max(0.0).powi(retry as i32);
        let millis = self.initial_delay.as_millis() as f64 * factor;
        Duration::from_millis(millis.min(u64::MAX as f64) as u64)
    }
}

/// A retry about to happen, as reported to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryAttempt {
    /// One-based retry number (the first retry is attempt 1).
    pub attempt: u32,
    /// Retries still available after this one.
    pub remaining: u32,
    /// Delay applied before this retry.
    pub delay: Duration,
}

/// Retry executor that handles the actual retry logic
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub const fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute a function with retry logic
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T, EnhanceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, EnhanceError>>,
    {
        self.run(operation, |_, _| {}, None).await
    }

    /// Execute, reporting every retry to `observer` before its delay starts.
    pub async fn execute_with_observer<F, Fut, T, O>(
        &self,
        operation: F,
        observer: O,
    ) -> Result<T, EnhanceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, EnhanceError>>,
        O: FnMut(&EnhanceError, &RetryAttempt),
    {
        self.run(operation, observer, None).await
    }

    /// Execute until success, exhaustion, or cancellation of `cancel`.
    ///
    /// Cancellation interrupts both a running attempt and a pending delay and
    /// yields [`EnhanceError::Cancelled`].
    pub async fn execute_cancellable<F, Fut, T>(
        &self,
        operation: F,
        cancel: &CancelHandle,
    ) -> Result<T, EnhanceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, EnhanceError>>,
    {
        self.run(operation, |_, _| {}, Some(cancel)).await
    }

    async fn run<F, Fut, T, O>(
        &self,
        mut operation: F,
        mut observer: O,
        cancel: Option<&CancelHandle>,
    ) -> Result<T, EnhanceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, EnhanceError>>,
        O: FnMut(&EnhanceError, &RetryAttempt),
    {
        let mut retries_left = self.policy.max_retries;
        let mut retried = 0u32;

        loop {
            let outcome = match cancel {
                Some(cancel) => {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => Err(EnhanceError::Cancelled),
                        result = operation() => result,
                    }
                }
                None => operation().await,
            };

            let error = match outcome {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if retries_left == 0 || !self.policy.should_retry(&error) {
                if retried > 0 {
                    tracing::debug!(target: "devprompt::retry", retried, err = %error, "giving up");
                }
                return Err(error);
            }

            let delay = self.policy.calculate_delay(retried);
            retried += 1;
            retries_left -= 1;
            let attempt = RetryAttempt {
                attempt: retried,
                remaining: retries_left,
                delay,
            };
            tracing::warn!(
                target: "devprompt::retry",
                attempt = attempt.attempt,
                remaining = attempt.remaining,
                delay_ms = delay.as_millis() as u64,
                err = %error,
                "retrying after transient failure"
            );
            observer(&error, &attempt);

            match cancel {
                Some(cancel) => {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(EnhanceError::Cancelled),
                        _ = sleep(delay) => {}
                    }
                }
                None => sleep(delay).await,
            }
        }
    }
}

/// Retry `operation` with exponential backoff.
///
/// `max_retries` counts retries beyond the first attempt, so the operation
/// runs at most `max_retries + 1` times.
pub async fn retry_with_backoff<F, Fut, T>(
    operation: F,
    max_retries: u32,
    initial_delay: Duration,
    multiplier: f64,
) -> Result<T, EnhanceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, EnhanceError>>,
{
    let policy = RetryPolicy::new()
        .with_max_retries(max_retries)
        .with_initial_delay(initial_delay)
        .with_backoff_multiplier(multiplier);
    RetryExecutor::new(policy).execute(operation).await
}
