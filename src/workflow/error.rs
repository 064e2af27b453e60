//! Workflow error taxonomy.
//!
//! # Responsibilities
//! - Classify downstream failures as transient or permanent
//! - Carry the dependency name for breaker accounting and logging
//! - Distinguish circuit-open fast rejections from real call failures
//!
//! # Design Decisions
//! - Classification happens once, at the call boundary; the retry layer
//!   only inspects the variant
//! - HTTP 502/503/504 are transient (gateway-class); other non-2xx are
//!   permanent
//! - Breaker health is a wider net than retryability: every 5xx counts
//!   toward the trip threshold, but only 502/503/504 are retried
//! - Transport errors are matched against a fixed signature set

use thiserror::Error;

/// Message fragments that identify a transient transport failure.
const TRANSIENT_SIGNATURES: &[&str] = &[
    "timed out",
    "timeout",
    "etimedout",
    "connection reset",
    "econnreset",
    "connection refused",
    "econnrefused",
    "dns error",
    "name resolution",
    "eai_again",
];

/// Errors surfaced by the workflow core.
#[derive(Debug, Clone, Error)]
pub enum WorkflowError {
    /// Missing required input or unknown user. Fatal at stage 1.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The dependency's breaker rejected the call without attempting it.
    #[error("circuit open for dependency '{dependency}'")]
    CircuitOpen { dependency: String },

    /// Retryable failure; surfaces only after retry exhaustion.
    #[error("transient error from '{dependency}': {message}")]
    Transient { dependency: String, message: String },

    /// Non-retryable downstream error; surfaces immediately.
    #[error("permanent error from '{dependency}': {message}")]
    Permanent {
        dependency: String,
        status: Option<u16>,
        message: String,
    },

    /// Completion-notification failure; always absorbed by the caller.
    #[error("notification delivery failed: {0}")]
    Notification(String),
}

impl WorkflowError {
    /// Classify a downstream failure by HTTP status or message signature.
    pub fn from_dependency_failure(dependency: &str, message: &str, status: Option<u16>) -> Self {
        let transient = match status {
            Some(502) | Some(503) | Some(504) => true,
            Some(_) => false,
            None => is_transient_signature(message),
        };
        if transient {
            Self::Transient {
                dependency: dependency.to_string(),
                message: message.to_string(),
            }
        } else {
            Self::Permanent {
                dependency: dependency.to_string(),
                status,
                message: message.to_string(),
            }
        }
    }

    /// True if the retry layer may attempt this operation again.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    /// True if the breaker should count this failure toward its trip
    /// threshold: transport failures and any server-class (5xx) response.
    /// Client-class responses prove the dependency is reachable.
    pub fn indicates_unhealthy_dependency(&self) -> bool {
        match self {
            Self::Transient { .. } => true,
            Self::Permanent {
                status: Some(status),
                ..
            } => (500..=599).contains(status),
            _ => false,
        }
    }
}

/// Match a raw error message against the fixed transient signature set.
pub fn is_transient_signature(message: &str) -> bool {
    let lowered = message.to_ascii_lowercase();
    TRANSIENT_SIGNATURES.iter().any(|s| lowered.contains(s))
}
