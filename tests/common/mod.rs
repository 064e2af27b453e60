//! Shared mock dependencies and wiring for integration tests.

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use axum::{http::StatusCode, Json, Router};
use serde_json::{json, Value};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use workflow_orchestrator::client::ServiceClients;
use workflow_orchestrator::config::OrchestratorConfig;
use workflow_orchestrator::resilience::BreakerRegistry;
use workflow_orchestrator::workflow::{
    Notifier, WorkflowCompleted, WorkflowError, WorkflowOrchestrator, WorkflowRequest,
};

/// A mock downstream dependency bound to an ephemeral port.
pub struct MockDependency {
    pub addr: SocketAddr,
    hits: Arc<AtomicU32>,
}

impl MockDependency {
    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Number of requests this dependency has received.
    pub fn hits(&self) -> u32 {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Start a programmable mock dependency.
pub async fn start_dependency<F, Fut>(f: F) -> MockDependency
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, Value)> + Send + 'static,
{
    let hits = Arc::new(AtomicU32::new(0));
    let handler_hits = hits.clone();
    let f = Arc::new(f);

    let app = Router::new().fallback(move || {
        let f = f.clone();
        let hits = handler_hits.clone();
        async move {
            hits.fetch_add(1, Ordering::SeqCst);
            let (status, body) = f().await;
            (StatusCode::from_u16(status).unwrap_or(StatusCode::OK), Json(body))
        }
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockDependency { addr, hits }
}

/// Mock dependency that always answers 200 with a fixed body.
pub async fn start_ok_dependency(body: Value) -> MockDependency {
    start_dependency(move || {
        let body = body.clone();
        async move { (200, body) }
    })
    .await
}

/// Five healthy dependencies with representative payloads.
pub async fn start_healthy_dependencies() -> [MockDependency; 5] {
    [
        start_ok_dependency(json!({"id": "u1", "name": "Test User"})).await,
        start_ok_dependency(json!({"id": "sub-1", "status": "registered"})).await,
        start_ok_dependency(json!({"score": 87, "summary": "solid"})).await,
        start_ok_dependency(json!({"points": 25, "level": 3})).await,
        start_ok_dependency(json!({"recorded": true})).await,
    ]
}

/// Config pointing at the given mocks, with test-friendly retry delays.
pub fn pipeline_config(
    user: &MockDependency,
    submission: &MockDependency,
    feedback: &MockDependency,
    gamification: &MockDependency,
    analytics: &MockDependency,
) -> OrchestratorConfig {
    let mut config = OrchestratorConfig::default();
    config.dependencies.user.base_url = user.base_url();
    config.dependencies.submission.base_url = submission.base_url();
    config.dependencies.feedback.base_url = feedback.base_url();
    config.dependencies.gamification.base_url = gamification.base_url();
    config.dependencies.analytics.base_url = analytics.base_url();
    config.retries.max_attempts = 1;
    config.retries.base_delay_ms = 10;
    config.retries.max_delay_ms = 50;
    config.timeouts.dependency_call_secs = 5;
    config
}

pub struct Pipeline {
    pub orchestrator: Arc<WorkflowOrchestrator>,
    pub breakers: Arc<BreakerRegistry>,
}

pub fn build_pipeline(config: &OrchestratorConfig, notifier: Arc<dyn Notifier>) -> Pipeline {
    let breakers = Arc::new(BreakerRegistry::new(config.circuit_breaker.clone()));
    let clients = ServiceClients::from_config(config, &breakers, reqwest::Client::new()).unwrap();
    Pipeline {
        orchestrator: Arc::new(WorkflowOrchestrator::new(clients, notifier)),
        breakers,
    }
}

/// Notifier that forwards completion events to a test channel.
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<WorkflowCompleted>,
}

impl ChannelNotifier {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<WorkflowCompleted>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

#[async_trait::async_trait]
impl Notifier for ChannelNotifier {
    async fn publish(&self, event: &WorkflowCompleted) -> Result<(), WorkflowError> {
        self.tx
            .send(event.clone())
            .map_err(|_| WorkflowError::Notification("test channel closed".to_string()))
    }
}

/// A valid inline-code request for the given submission ID.
pub fn code_request(submission_id: &str) -> WorkflowRequest {
    serde_json::from_value(json!({
        "submissionId": submission_id,
        "userId": "u1",
        "submissionType": "assignment",
        "codeContent": "console.log(1)",
    }))
    .unwrap()
}

/// A request missing both repositoryUrl and codeContent.
pub fn sourceless_request(submission_id: &str) -> WorkflowRequest {
    serde_json::from_value(json!({
        "submissionId": submission_id,
        "userId": "u1",
        "submissionType": "assignment",
    }))
    .unwrap()
}
