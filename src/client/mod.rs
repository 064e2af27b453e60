//! Outbound call boundary for downstream dependencies.
//!
//! # Responsibilities
//! - Resolve a dependency's breaker and retry policy
//! - Enforce the fixed per-call timeout
//! - Attach correlation metadata to every outbound request
//! - Shape transport/status failures into the workflow error taxonomy
//!
//! # Design Decisions
//! - The breaker wraps the retry loop: the breaker decides whether any
//!   attempt is allowed, retries govern recovery within that admission
//! - JSON in/out with `serde_json::Value` at the boundary; downstream
//!   payload shapes belong to the downstream owners
//! - Every dependency owns an independent breaker from the shared registry

use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

use crate::config::schema::OrchestratorConfig;
use crate::observability::metrics;
use crate::resilience::{BreakerRegistry, CircuitBreaker, RetryManager};
use crate::workflow::error::WorkflowError;

/// Header carrying the saga correlation ID to every dependency.
pub const X_CORRELATION_ID: &str = "x-correlation-id";

pub const DEP_USER: &str = "user";
pub const DEP_SUBMISSION: &str = "submission";
pub const DEP_FEEDBACK: &str = "feedback";
pub const DEP_GAMIFICATION: &str = "gamification";
pub const DEP_ANALYTICS: &str = "analytics";

/// Client for one named downstream dependency.
pub struct ServiceClient {
    dependency: String,
    base_url: Url,
    http: reqwest::Client,
    breaker: Arc<CircuitBreaker>,
    retry: RetryManager,
    call_timeout: Duration,
}

impl ServiceClient {
    pub fn new(
        dependency: &str,
        base_url: Url,
        http: reqwest::Client,
        registry: &BreakerRegistry,
        retry: RetryManager,
        call_timeout: Duration,
    ) -> Self {
        Self {
            dependency: dependency.to_string(),
            base_url,
            http,
            breaker: registry.get(dependency),
            retry,
            call_timeout,
        }
    }

    pub fn dependency(&self) -> &str {
        &self.dependency
    }

    pub async fn get_json(&self, path: &str, correlation_id: &str) -> Result<Value, WorkflowError> {
        self.call(Method::GET, path, None, correlation_id).await
    }

    pub async fn post_json(
        &self,
        path: &str,
        body: Value,
        correlation_id: &str,
    ) -> Result<Value, WorkflowError> {
        self.call(Method::POST, path, Some(body), correlation_id).await
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        correlation_id: &str,
    ) -> Result<Value, WorkflowError> {
        let url = self.base_url.join(path).map_err(|e| WorkflowError::Permanent {
            dependency: self.dependency.clone(),
            status: None,
            message: format!("invalid path '{path}': {e}"),
        })?;

        let start = Instant::now();
        let result = self
            .breaker
            .execute(|| {
                self.retry.execute(&self.dependency, || {
                    self.attempt(method.clone(), url.clone(), body.clone(), correlation_id)
                })
            })
            .await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(WorkflowError::CircuitOpen { .. }) => "circuit_open",
            Err(WorkflowError::Transient { .. }) => "transient",
            _ => "permanent",
        };
        metrics::record_dependency_call(&self.dependency, outcome, start);
        result
    }

    /// One timed attempt; classification happens here so the retry layer
    /// only ever inspects the error variant.
    async fn attempt(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
        correlation_id: &str,
    ) -> Result<Value, WorkflowError> {
        let mut request = self
            .http
            .request(method, url)
            .header(X_CORRELATION_ID, correlation_id);
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = match tokio::time::timeout(self.call_timeout, request.send()).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                return Err(WorkflowError::from_dependency_failure(
                    &self.dependency,
                    &transport_message(&e),
                    None,
                ))
            }
            Err(_) => {
                return Err(WorkflowError::from_dependency_failure(
                    &self.dependency,
                    "request timed out",
                    None,
                ))
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            return Err(WorkflowError::from_dependency_failure(
                &self.dependency,
                &format!("HTTP {}: {}", status.as_u16(), snippet.trim()),
                Some(status.as_u16()),
            ));
        }

        let bytes = response.bytes().await.map_err(|e| {
            WorkflowError::from_dependency_failure(&self.dependency, &transport_message(&e), None)
        })?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| WorkflowError::Permanent {
            dependency: self.dependency.clone(),
            status: None,
            message: format!("invalid JSON payload: {e}"),
        })
    }
}

/// Keep transport failures matchable against the transient signature set.
fn transport_message(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        format!("connection refused: {e}")
    } else {
        e.to_string()
    }
}

/// One client per downstream dependency of the saga.
pub struct ServiceClients {
    pub user: ServiceClient,
    pub submission: ServiceClient,
    pub feedback: ServiceClient,
    pub gamification: ServiceClient,
    pub analytics: ServiceClient,
}

impl ServiceClients {
    pub fn from_config(
        config: &OrchestratorConfig,
        registry: &BreakerRegistry,
        http: reqwest::Client,
    ) -> Result<Self, url::ParseError> {
        let call_timeout = Duration::from_secs(config.timeouts.dependency_call_secs);
        let client = |name: &str, base_url: &str| -> Result<ServiceClient, url::ParseError> {
            Ok(ServiceClient::new(
                name,
                parse_base_url(base_url)?,
                http.clone(),
                registry,
                RetryManager::new(config.retries.clone()),
                call_timeout,
            ))
        };
        Ok(Self {
            user: client(DEP_USER, &config.dependencies.user.base_url)?,
            submission: client(DEP_SUBMISSION, &config.dependencies.submission.base_url)?,
            feedback: client(DEP_FEEDBACK, &config.dependencies.feedback.base_url)?,
            gamification: client(DEP_GAMIFICATION, &config.dependencies.gamification.base_url)?,
            analytics: client(DEP_ANALYTICS, &config.dependencies.analytics.base_url)?,
        })
    }
}

/// `Url::join` drops the last path segment unless the base ends in '/'.
fn parse_base_url(base_url: &str) -> Result<Url, url::ParseError> {
    if base_url.ends_with('/') {
        Url::parse(base_url)
    } else {
        Url::parse(&format!("{base_url}/"))
    }
}
