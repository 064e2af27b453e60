//! Retry execution for transient downstream failures.
//!
//! # Responsibilities
//! - Re-invoke a failing operation up to `max_attempts` times
//! - Retry only errors classified as transient; abort otherwise
//! - Sleep a jittered exponential backoff between attempts
//!
//! # Design Decisions
//! - The last error is returned unchanged after exhaustion
//! - Permanent errors abort after the first attempt, no delay
//! - Classification lives in [`WorkflowError`], not here

use std::future::Future;

use crate::config::schema::RetryConfig;
use crate::resilience::backoff::backoff_delay;
use crate::workflow::error::WorkflowError;

/// Executes operations under an immutable retry policy.
#[derive(Debug, Clone)]
pub struct RetryManager {
    policy: RetryConfig,
}

impl RetryManager {
    pub fn new(policy: RetryConfig) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryConfig {
        &self.policy
    }

    /// Run `op`, retrying transient failures until the policy is exhausted.
    pub async fn execute<T, F, Fut>(&self, dependency: &str, mut op: F) -> Result<T, WorkflowError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, WorkflowError>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1u32;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if !err.is_transient() || attempt >= max_attempts {
                        return Err(err);
                    }

                    let delay = backoff_delay(
                        attempt + 1,
                        self.policy.base_delay_ms,
                        self.policy.max_delay_ms,
                        self.policy.backoff_multiplier,
                    );
                    tracing::debug!(
                        dependency,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying after transient error"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
