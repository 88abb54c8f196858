//! Retry decisions shared by the async and blocking clients.
//!
//! [`RetryState`] consumes one [`AttemptOutcome`] per attempt and answers with
//! a [`RetryDecision`]. It never sleeps itself: the caller performs the wait
//! with whatever primitive its execution mode provides.

use std::time::Duration;

use crate::DoclingError;

/// Exponential backoff configuration for one logical call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryPolicy {
    max_retries: usize,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: usize, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    /// Total number of attempts one call may make.
    pub fn attempt_budget(&self) -> usize {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry number `retry` (0 = wait before the second attempt).
    ///
    /// `base_delay * 2^retry`, with the exponent capped at 16.
    pub fn delay_for_retry(&self, retry: usize) -> Duration {
        let exp = retry.min(16) as u32;
        let multiplier = 1u32 << exp;
        self.base_delay.saturating_mul(multiplier)
    }
}

/// Classified result of a single request attempt.
#[derive(Debug)]
pub enum AttemptOutcome<T> {
    Success(T),
    /// Worth retrying: 429, 5xx, timeouts, connection faults.
    TransientFailure(DoclingError),
    /// Never retried.
    PermanentFailure(DoclingError),
}

impl<T> AttemptOutcome<T> {
    /// Classifies an attempt result with [`DoclingError::is_retryable`].
    pub fn from_result(result: crate::Result<T>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(err) if err.is_retryable() => Self::TransientFailure(err),
            Err(err) => Self::PermanentFailure(err),
        }
    }
}

/// What the caller should do after recording an attempt.
#[derive(Debug)]
pub enum RetryDecision<T> {
    /// Return this value to the caller.
    Done(T),
    /// Surface this error to the caller.
    Fail(DoclingError),
    /// Wait this long, then issue the next attempt.
    RetryAfter(Duration),
}

/// Per-call retry bookkeeping.
#[derive(Debug)]
pub struct RetryState {
    policy: RetryPolicy,
    attempts: usize,
}

impl RetryState {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            attempts: 0,
        }
    }

    /// Number of attempts recorded so far.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Records the outcome of the attempt that was just made.
    pub fn record<T>(&mut self, outcome: AttemptOutcome<T>) -> RetryDecision<T> {
        self.attempts += 1;
        match outcome {
            AttemptOutcome::Success(value) => RetryDecision::Done(value),
            AttemptOutcome::PermanentFailure(err) => RetryDecision::Fail(err),
            AttemptOutcome::TransientFailure(err) => {
                if self.attempts < self.policy.attempt_budget() {
                    let delay = self.policy.delay_for_retry(self.attempts - 1);
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        attempt = self.attempts,
                        delay_ms = crate::request::duration_millis(delay),
                        error = %err,
                        "transient failure, retrying"
                    );
                    RetryDecision::RetryAfter(delay)
                } else {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(attempts = self.attempts, error = %err, "retry budget exhausted");
                    RetryDecision::Fail(err)
                }
            }
        }
    }
}
