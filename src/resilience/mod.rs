//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to a dependency:
//!     → circuit_breaker.rs (admit, fail fast, or probe)
//!     → retry.rs (re-attempt transient failures the breaker permitted)
//!     → backoff.rs (jittered delay between attempts)
//!     → registry.rs (one breaker per dependency name, shared by all sagas)
//! ```
//!
//! # Design Decisions
//! - The breaker wraps the retry loop: one admission covers every attempt,
//!   and the breaker records a single outcome after exhaustion
//! - Breakers are fully independent between dependencies; a tripped
//!   feedback breaker never affects gamification calls

pub mod backoff;
pub mod circuit_breaker;
pub mod registry;
pub mod retry;

pub use circuit_breaker::{BreakerSnapshot, CircuitBreaker, CircuitState};
pub use registry::BreakerRegistry;
pub use retry::RetryManager;
