//! Typed completion fan-out.
//!
//! The orchestrator publishes one `WorkflowCompleted` event per saga
//! through an injected notifier, replacing string-keyed event-emitter
//! fan-out with explicit message passing. Delivery is best-effort: the
//! orchestrator logs and absorbs every notifier failure.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use url::Url;

use crate::workflow::error::WorkflowError;
use crate::workflow::types::WorkflowResult;

/// Completion event pushed to subscribers after a saga settles.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowCompleted {
    pub submission_id: String,
    pub user_id: String,
    pub success: bool,
    pub result: WorkflowResult,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, event: &WorkflowCompleted) -> Result<(), WorkflowError>;
}

/// Default notifier: completions are only logged.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn publish(&self, event: &WorkflowCompleted) -> Result<(), WorkflowError> {
        tracing::info!(
            submission_id = %event.submission_id,
            user_id = %event.user_id,
            success = event.success,
            "workflow completed"
        );
        Ok(())
    }
}

/// Pushes completion events to a configured webhook.
pub struct WebhookNotifier {
    http: reqwest::Client,
    url: Url,
    timeout: Duration,
}

impl WebhookNotifier {
    pub fn new(url: Url, http: reqwest::Client, timeout: Duration) -> Self {
        Self { http, url, timeout }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn publish(&self, event: &WorkflowCompleted) -> Result<(), WorkflowError> {
        let send = self.http.post(self.url.clone()).json(event).send();
        let response = tokio::time::timeout(self.timeout, send)
            .await
            .map_err(|_| WorkflowError::Notification("webhook delivery timed out".to_string()))?
            .map_err(|e| WorkflowError::Notification(e.to_string()))?;

        if !response.status().is_success() {
            return Err(WorkflowError::Notification(format!(
                "webhook returned HTTP {}",
                response.status().as_u16()
            )));
        }
        Ok(())
    }
}
