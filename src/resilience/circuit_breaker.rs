//! Circuit breaker for dependency protection.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: dependency assumed down, calls fail fast
//! - Half-Open: testing if the dependency recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive failures >= threshold within monitoring period
//! Open → Half-Open: lazily, on the next call after the recovery timeout
//! Half-Open → Closed: probe call succeeds
//! Half-Open → Open: probe call fails
//! ```
//!
//! # Design Decisions
//! - Per-dependency breaker (never global); instances come from the registry
//! - Fail fast in Open state without constructing the call
//! - Exactly one in-flight probe in Half-Open; concurrent callers are
//!   rejected as still-open while the probe is outstanding
//! - Transport errors and server-class (5xx) responses count toward the
//!   trip threshold; a client-class response still proves the dependency
//!   is reachable

use serde::Serialize;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

use crate::config::schema::CircuitBreakerConfig;
use crate::observability::metrics;
use crate::workflow::error::WorkflowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "CLOSED",
            CircuitState::Open => "OPEN",
            CircuitState::HalfOpen => "HALF_OPEN",
        }
    }
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    consecutive_failures: u32,
    window_started_at: Option<Instant>,
    tripped_at: Option<Instant>,
    probe_in_flight: bool,
}

/// Point-in-time view of a breaker, for the health endpoint and logs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakerSnapshot {
    pub state: CircuitState,
    pub consecutive_failures: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_for_ms: Option<u64>,
}

/// Guard that stops calling a failing dependency for a cooldown period.
///
/// Shared across every concurrent saga targeting the same dependency; all
/// transitions happen under one mutex so failure counting cannot race.
#[derive(Debug)]
pub struct CircuitBreaker {
    dependency: String,
    failure_threshold: u32,
    recovery_timeout: Duration,
    monitoring_period: Duration,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    pub fn new(dependency: &str, config: &CircuitBreakerConfig) -> Self {
        Self {
            dependency: dependency.to_string(),
            failure_threshold: config.failure_threshold.max(1),
            recovery_timeout: Duration::from_secs(config.recovery_timeout_secs),
            monitoring_period: Duration::from_secs(config.monitoring_period_secs),
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                window_started_at: None,
                tripped_at: None,
                probe_in_flight: false,
            }),
        }
    }

    /// Run `op` if the breaker admits the call.
    ///
    /// Fails fast with [`WorkflowError::CircuitOpen`] without polling `op`
    /// when the circuit is open or a half-open probe is already in flight.
    pub async fn execute<T, F, Fut>(&self, op: F) -> Result<T, WorkflowError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, WorkflowError>>,
    {
        let permit = self.try_acquire()?;
        match op().await {
            Ok(value) => {
                permit.success();
                Ok(value)
            }
            Err(err) => {
                // Client-class responses prove the dependency is reachable.
                if err.indicates_unhealthy_dependency() {
                    permit.failure();
                } else {
                    permit.success();
                }
                Err(err)
            }
        }
    }

    pub fn dependency(&self) -> &str {
        &self.dependency
    }

    pub fn state(&self) -> CircuitState {
        self.locked().state
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let inner = self.locked();
        let open_for_ms = match inner.state {
            CircuitState::Closed => None,
            _ => inner
                .tripped_at
                .map(|t| t.elapsed().as_millis() as u64),
        };
        BreakerSnapshot {
            state: inner.state,
            consecutive_failures: inner.consecutive_failures,
            open_for_ms,
        }
    }

    fn locked(&self) -> MutexGuard<'_, BreakerInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn try_acquire(&self) -> Result<CallPermit<'_>, WorkflowError> {
        let mut inner = self.locked();
        match inner.state {
            CircuitState::Closed => Ok(CallPermit::new(self, false)),
            CircuitState::Open => {
                let cooled_down = inner
                    .tripped_at
                    .map(|t| t.elapsed() >= self.recovery_timeout)
                    .unwrap_or(true);
                if cooled_down && !inner.probe_in_flight {
                    inner.state = CircuitState::HalfOpen;
                    inner.probe_in_flight = true;
                    drop(inner);
                    self.transitioned(CircuitState::HalfOpen);
                    Ok(CallPermit::new(self, true))
                } else {
                    Err(self.rejection())
                }
            }
            CircuitState::HalfOpen => {
                if inner.probe_in_flight {
                    Err(self.rejection())
                } else {
                    inner.probe_in_flight = true;
                    Ok(CallPermit::new(self, true))
                }
            }
        }
    }

    fn record_success(&self, probe: bool) {
        let mut inner = self.locked();

        if !probe && inner.state != CircuitState::Closed {
            // A call admitted while closed settled after another one tripped
            // the breaker; only a successful probe may close it again.
            return;
        }

        let was = inner.state;
        inner.state = CircuitState::Closed;
        inner.consecutive_failures = 0;
        inner.window_started_at = None;
        inner.tripped_at = None;
        if probe {
            inner.probe_in_flight = false;
        }
        drop(inner);
        if was != CircuitState::Closed {
            self.transitioned(CircuitState::Closed);
        }
    }

    fn record_failure(&self, probe: bool) {
        let mut inner = self.locked();
        let now = Instant::now();

        if probe {
            inner.state = CircuitState::Open;
            inner.tripped_at = Some(now);
            inner.probe_in_flight = false;
            drop(inner);
            self.transitioned(CircuitState::Open);
            return;
        }

        if inner.state != CircuitState::Closed {
            // A call admitted earlier settled after another one tripped the
            // breaker; the trip already happened, nothing more to count.
            return;
        }

        // Failures are counted within the monitoring period; a stale window
        // restarts the count.
        match inner.window_started_at {
            Some(start) if now - start <= self.monitoring_period => {}
            _ => {
                inner.window_started_at = Some(now);
                inner.consecutive_failures = 0;
            }
        }
        inner.consecutive_failures += 1;

        if inner.consecutive_failures >= self.failure_threshold {
            inner.state = CircuitState::Open;
            inner.tripped_at = Some(now);
            drop(inner);
            self.transitioned(CircuitState::Open);
        }
    }

    fn abandon_probe(&self) {
        let mut inner = self.locked();
        // The probe future was dropped before settling; free the slot so the
        // next caller can probe instead of deadlocking the half-open state.
        inner.probe_in_flight = false;
    }

    fn rejection(&self) -> WorkflowError {
        WorkflowError::CircuitOpen {
            dependency: self.dependency.clone(),
        }
    }

    fn transitioned(&self, to: CircuitState) {
        metrics::record_breaker_transition(&self.dependency, to.as_str());
        match to {
            CircuitState::Open => tracing::warn!(
                dependency = %self.dependency,
                "circuit breaker opened, failing fast"
            ),
            CircuitState::HalfOpen => tracing::info!(
                dependency = %self.dependency,
                "circuit breaker half-open, admitting probe"
            ),
            CircuitState::Closed => tracing::info!(
                dependency = %self.dependency,
                "circuit breaker closed"
            ),
        }
    }
}

/// Admission token for one call; settles exactly once.
struct CallPermit<'a> {
    breaker: &'a CircuitBreaker,
    probe: bool,
    settled: bool,
}

impl<'a> CallPermit<'a> {
    fn new(breaker: &'a CircuitBreaker, probe: bool) -> Self {
        Self {
            breaker,
            probe,
            settled: false,
        }
    }

    fn success(mut self) {
        self.settled = true;
        self.breaker.record_success(self.probe);
    }

    fn failure(mut self) {
        self.settled = true;
        self.breaker.record_failure(self.probe);
    }
}

impl Drop for CallPermit<'_> {
    fn drop(&mut self) {
        if !self.settled && self.probe {
            self.breaker.abandon_probe();
        }
    }
}
