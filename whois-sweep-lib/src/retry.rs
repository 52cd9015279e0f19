//! Bounded retry with deterministic exponential backoff.
//!
//! A domain is probed until the response classifies as available or taken,
//! or until the attempt ceiling is reached. Rate-limited, empty and failed
//! fetches are retried after `2^attempt` backoff units; there is no jitter
//! because domains are probed one at a time.

use crate::classify::Classifier;
use crate::error::SweepError;
use crate::types::{ErrorReason, Resolution, SweepConfig, Verdict};
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Why an attempt didn't produce a final answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transient {
    RateLimited,
    Empty,
    /// The fetch collaborator itself failed (spawn error, timeout)
    FetchFailure,
}

impl fmt::Display for Transient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transient::RateLimited => f.write_str("rate limited"),
            Transient::Empty => f.write_str("empty response"),
            Transient::FetchFailure => f.write_str("fetch failed"),
        }
    }
}

/// Decision returned by the retry policy for a transient attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Stop and report this error
    GiveUp(ErrorReason),
    /// Probe again after the given delay
    RetryAfter(Duration),
}

/// Progress notice emitted before each backoff sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    /// The attempt that just failed (1-based)
    pub attempt: u32,
    pub max_attempts: u32,
    pub delay: Duration,
    pub cause: Transient,
}

/// Attempt ceiling and backoff unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first)
    pub max_attempts: u32,
    /// Attempt `n` waits `2^n` of these
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_unit: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_unit,
        }
    }

    pub fn from_config(config: &SweepConfig) -> Self {
        Self::new(config.max_attempts, config.backoff_unit)
    }

    /// Delay after failed attempt `attempt`: `backoff_unit * 2^attempt`.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.backoff_unit.saturating_mul(factor)
    }

    /// Decide what follows a transient outcome on `attempt` (1-based).
    pub fn decide(&self, attempt: u32, cause: Transient) -> RetryDecision {
        if attempt >= self.max_attempts {
            let reason = match cause {
                Transient::FetchFailure => ErrorReason::FetchFailure,
                Transient::RateLimited | Transient::Empty => ErrorReason::RetriesExceeded,
            };
            return RetryDecision::GiveUp(reason);
        }
        RetryDecision::RetryAfter(self.backoff_for(attempt))
    }
}

/// Drives probe → classify → retry for one domain.
#[derive(Debug, Clone, Default)]
pub struct RetryScheduler {
    classifier: Classifier,
    policy: RetryPolicy,
}

impl RetryScheduler {
    pub fn new(classifier: Classifier, policy: RetryPolicy) -> Self {
        Self { classifier, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Resolve `domain` to a terminal verdict.
    ///
    /// `probe` is called once per attempt. An `Err` from the probe counts as a
    /// failed fetch and is retried like an empty response. `on_backoff` sees
    /// every backoff before the sleep starts. The returned verdict is always
    /// terminal.
    pub async fn resolve<F, Fut, N>(&self, domain: &str, mut probe: F, mut on_backoff: N) -> Resolution
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<String, SweepError>>,
        N: FnMut(&Backoff),
    {
        let mut attempt = 1u32;

        loop {
            let cause = match probe().await {
                Ok(raw) => match self.classifier.classify(&raw) {
                    Verdict::RateLimited => Transient::RateLimited,
                    Verdict::Empty => Transient::Empty,
                    verdict => {
                        tracing::debug!(domain, attempt, verdict = %verdict, "Domain resolved");
                        return Resolution {
                            verdict,
                            attempts: attempt,
                        };
                    }
                },
                Err(e) => {
                    tracing::debug!(domain, attempt, error = %e, "Probe failed");
                    Transient::FetchFailure
                }
            };

            match self.policy.decide(attempt, cause) {
                RetryDecision::GiveUp(reason) => {
                    tracing::info!(
                        domain,
                        attempts = attempt,
                        reason = %reason,
                        "Giving up after all attempts"
                    );
                    return Resolution {
                        verdict: Verdict::Error { reason },
                        attempts: attempt,
                    };
                }
                RetryDecision::RetryAfter(delay) => {
                    let notice = Backoff {
                        attempt,
                        max_attempts: self.policy.max_attempts,
                        delay,
                        cause,
                    };
                    tracing::info!(
                        domain,
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        cause = %cause,
                        "Transient response, backing off"
                    );
                    on_backoff(&notice);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
