//! Shared breaker registry.
//!
//! One registry instance is created at startup and injected into every
//! ServiceClient; breaker state is never held in a process-wide global.
//! Each dependency name maps to exactly one breaker for the process
//! lifetime, shared by all concurrent sagas.

use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::schema::CircuitBreakerConfig;
use crate::resilience::circuit_breaker::{BreakerSnapshot, CircuitBreaker};

#[derive(Debug)]
pub struct BreakerRegistry {
    config: CircuitBreakerConfig,
    breakers: DashMap<String, Arc<CircuitBreaker>>,
}

impl BreakerRegistry {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            breakers: DashMap::new(),
        }
    }

    /// Get the breaker for a dependency, creating it on first use.
    pub fn get(&self, dependency: &str) -> Arc<CircuitBreaker> {
        if let Some(existing) = self.breakers.get(dependency) {
            return existing.value().clone();
        }
        self.breakers
            .entry(dependency.to_string())
            .or_insert_with(|| Arc::new(CircuitBreaker::new(dependency, &self.config)))
            .value()
            .clone()
    }

    /// Per-dependency state view for the health endpoint.
    pub fn snapshot(&self) -> BTreeMap<String, BreakerSnapshot> {
        self.breakers
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().snapshot()))
            .collect()
    }
}
