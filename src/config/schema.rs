//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! orchestrator. All types derive Serde traits for deserialization from
//! config files, and every field has a default so a minimal (or absent)
//! config file still yields a runnable service.

use serde::{Deserialize, Serialize};

/// Root configuration for the workflow orchestrator.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Base URLs of the five downstream dependencies.
    pub dependencies: DependenciesConfig,

    /// Circuit breaker settings, shared by all dependency breakers.
    pub circuit_breaker: CircuitBreakerConfig,

    /// Retry policy applied to every outbound call.
    pub retries: RetryConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Completion-notification settings.
    pub notifier: NotifierConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// One downstream dependency.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DependencyConfig {
    /// Base URL the dependency's logical name resolves to.
    pub base_url: String,
}

impl Default for DependencyConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/".to_string(),
        }
    }
}

/// The five downstream dependencies, each independently addressable.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DependenciesConfig {
    pub user: DependencyConfig,
    pub submission: DependencyConfig,
    pub feedback: DependencyConfig,
    pub gamification: DependencyConfig,
    pub analytics: DependencyConfig,
}

impl Default for DependenciesConfig {
    fn default() -> Self {
        let at = |port: u16| DependencyConfig {
            base_url: format!("http://localhost:{port}/"),
        };
        Self {
            user: at(3001),
            submission: at(3002),
            feedback: at(3003),
            gamification: at(3004),
            analytics: at(3005),
        }
    }
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the circuit opens.
    pub failure_threshold: u32,

    /// Cooldown before an open circuit admits a probe, in seconds.
    pub recovery_timeout_secs: u64,

    /// Window within which consecutive failures are counted, in seconds.
    pub monitoring_period_secs: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout_secs: 30,
            monitoring_period_secs: 60,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,

    /// Multiplier applied per attempt.
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
            backoff_multiplier: 2.0,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Inbound request timeout in seconds.
    pub request_secs: u64,

    /// Fixed per-call timeout for each outbound dependency call, in seconds.
    pub dependency_call_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            dependency_call_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Completion-notification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NotifierConfig {
    /// Webhook to push WorkflowCompleted events to. When unset, completions
    /// are only logged.
    pub webhook_url: Option<String>,

    /// Webhook delivery timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_secs: 5,
        }
    }
}
