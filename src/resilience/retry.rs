use std::fmt::Display;
use std::future::Future;

use thiserror::Error;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::provider::ProviderEnvironment;
use crate::config::settings::RetryConfig;

/// Outcome of a single attempt, classified by whoever made the call.
#[derive(Debug)]
pub enum Attempt<T, E> {
    Success(T),
    Retriable(E),
    Terminal(E),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Retriable,
    Terminal,
}

impl<T, E> Attempt<T, E> {
    /// Lift a plain result, letting `classify` decide what a failure means.
    pub fn from_result<C>(result: Result<T, E>, classify: C) -> Self
    where
        C: FnOnce(&E) -> Disposition,
    {
        match result {
            Ok(value) => Attempt::Success(value),
            Err(e) => match classify(&e) {
                Disposition::Retriable => Attempt::Retriable(e),
                Disposition::Terminal => Attempt::Terminal(e),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backoff {
    Fixed(Duration),
    /// doubles on every retry until `max`
    Exponential { base: Duration, max: Duration },
}

impl Backoff {
    /// Delay before retry number `retry`, counted from zero.
    pub fn delay(&self, retry: u32) -> Duration {
        match self {
            Backoff::Fixed(delay) => *delay,
            Backoff::Exponential { base, max } => {
                let factor = 2u32.checked_pow(retry).unwrap_or(u32::MAX);
                base.checked_mul(factor).unwrap_or(*max).min(*max)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetryPolicyError {
    #[error("retry policy requires at least one attempt")]
    ZeroAttempts,
}

#[derive(Debug, Error)]
pub enum RetryError<E> {
    #[error("attempt {attempt} failed with a terminal error: {cause}")]
    Terminal { attempt: u32, cause: E },
    #[error("all {attempts} attempts failed, last error: {cause}")]
    Exhausted { attempts: u32, cause: E },
    #[error("cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },
}

impl<E> RetryError<E> {
    /// Number of times the operation was started.
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Terminal { attempt, .. } => *attempt,
            RetryError::Exhausted { attempts, .. } | RetryError::Cancelled { attempts } => {
                *attempts
            }
        }
    }

    pub fn into_cause(self) -> Option<E> {
        match self {
            RetryError::Terminal { cause, .. } | RetryError::Exhausted { cause, .. } => Some(cause),
            RetryError::Cancelled { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Backoff,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Backoff) -> Result<Self, RetryPolicyError> {
        if max_attempts == 0 {
            return Err(RetryPolicyError::ZeroAttempts);
        }
        Ok(Self {
            max_attempts,
            backoff,
        })
    }

    /// Single attempt, nothing to wait for.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            backoff: Backoff::Fixed(Duration::ZERO),
        }
    }

    pub fn from_config(config: &RetryConfig) -> Result<Self, RetryPolicyError> {
        let base = Duration::from_millis(config.base_delay_ms);
        let max = Duration::from_millis(config.max_delay_ms.max(config.base_delay_ms));
        let backoff = if base == max {
            Backoff::Fixed(base)
        } else {
            Backoff::Exponential { base, max }
        };
        Self::new(config.attempts, backoff)
    }

    /// Sandbox runs never wait on backoff timers.
    pub fn for_environment(environment: ProviderEnvironment, configured: &RetryPolicy) -> Self {
        if environment.is_test() {
            Self::no_retry()
        } else {
            configured.clone()
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    /// Total time spent sleeping if every attempt fails.
    pub fn max_delay_budget(&self) -> Duration {
        (0..self.max_attempts.saturating_sub(1))
            .map(|retry| self.backoff.delay(retry))
            .sum()
    }

    /// Run `operation` until it succeeds, fails terminally or runs out of attempts.
    /// Attempts are strictly sequential; `cancel` interrupts both the attempt and the backoff.
    pub async fn execute<F, Fut, T, E>(
        &self,
        mut operation: F,
        cancel: &CancellationToken,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Attempt<T, E>>,
        E: Display,
    {
        let mut remaining = self.max_attempts;
        let mut attempt: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(RetryError::Cancelled { attempts: attempt });
            }
            attempt += 1;
            remaining -= 1;

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RetryError::Cancelled { attempts: attempt }),
                outcome = operation() => outcome,
            };

            match outcome {
                Attempt::Success(value) => {
                    debug!("attempt {attempt}/{} succeeded", self.max_attempts);
                    return Ok(value);
                }
                Attempt::Terminal(cause) => {
                    info!("attempt {attempt}/{} failed, not retriable: {cause}", self.max_attempts);
                    return Err(RetryError::Terminal { attempt, cause });
                }
                Attempt::Retriable(cause) if remaining == 0 => {
                    info!("all {attempt} attempts failed: {cause}");
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        cause,
                    });
                }
                Attempt::Retriable(cause) => {
                    let delay = self.backoff.delay(attempt - 1);
                    info!(
                        "attempt {attempt}/{} failed: {cause}, retrying in {} ms",
                        self.max_attempts,
                        delay.as_millis()
                    );
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(RetryError::Cancelled { attempts: attempt }),
                        _ = sleep(delay) => {}
                    }
                }
            }
        }
    }
}
