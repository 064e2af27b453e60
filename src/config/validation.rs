//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (thresholds >= 1, delays ordered)
//! - Check that addresses and URLs actually parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: OrchestratorConfig -> Result<(), Vec<_>>
//! - Runs before the config is accepted into the system

use url::Url;

use crate::config::schema::OrchestratorConfig;

/// One failed semantic check.
#[derive(Debug)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a deserialized configuration.
pub fn validate_config(config: &OrchestratorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut fail = |field: &str, message: String| {
        errors.push(ValidationError {
            field: field.to_string(),
            message,
        })
    };

    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        fail(
            "listener.bind_address",
            format!("'{}' is not a valid socket address", config.listener.bind_address),
        );
    }

    let dependencies = [
        ("dependencies.user", &config.dependencies.user),
        ("dependencies.submission", &config.dependencies.submission),
        ("dependencies.feedback", &config.dependencies.feedback),
        ("dependencies.gamification", &config.dependencies.gamification),
        ("dependencies.analytics", &config.dependencies.analytics),
    ];
    for (field, dependency) in dependencies {
        if Url::parse(&dependency.base_url).is_err() {
            fail(field, format!("'{}' is not a valid URL", dependency.base_url));
        }
    }

    if config.circuit_breaker.failure_threshold == 0 {
        fail("circuit_breaker.failure_threshold", "must be at least 1".to_string());
    }
    if config.retries.max_attempts == 0 {
        fail("retries.max_attempts", "must be at least 1".to_string());
    }
    if config.retries.backoff_multiplier < 1.0 {
        fail("retries.backoff_multiplier", "must be at least 1.0".to_string());
    }
    if config.retries.base_delay_ms > config.retries.max_delay_ms {
        fail(
            "retries.base_delay_ms",
            format!(
                "base delay {}ms exceeds max delay {}ms",
                config.retries.base_delay_ms, config.retries.max_delay_ms
            ),
        );
    }
    if config.timeouts.request_secs == 0 || config.timeouts.dependency_call_secs == 0 {
        fail("timeouts", "timeouts must be at least 1 second".to_string());
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<std::net::SocketAddr>().is_err()
    {
        fail(
            "observability.metrics_address",
            format!("'{}' is not a valid socket address", config.observability.metrics_address),
        );
    }

    if let Some(url) = &config.notifier.webhook_url {
        if Url::parse(url).is_err() {
            fail("notifier.webhook_url", format!("'{url}' is not a valid URL"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
