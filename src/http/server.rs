//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (timeout, request ID, tracing)
//! - Bind the server to a listener and serve until shutdown
//!
//! # Design Decisions
//! - The inbound endpoint acknowledges with 202 and runs the saga on a
//!   detached task; the HTTP layer never blocks on a saga
//! - The WorkflowResult reaches callers via the notifier push or the
//!   synchronous retry endpoint, never via the 202 response

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::OrchestratorConfig;
use crate::http::handlers;
use crate::resilience::BreakerRegistry;
use crate::workflow::WorkflowOrchestrator;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<WorkflowOrchestrator>,
    pub breakers: Arc<BreakerRegistry>,
}

/// HTTP server for the workflow orchestrator.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(
        config: &OrchestratorConfig,
        orchestrator: Arc<WorkflowOrchestrator>,
        breakers: Arc<BreakerRegistry>,
    ) -> Self {
        let state = AppState {
            orchestrator,
            breakers,
        };
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &OrchestratorConfig, state: AppState) -> Router {
        Router::new()
            .route("/api/submissions", post(handlers::submit))
            .route(
                "/api/submissions/{submission_id}/retry",
                post(handlers::retry),
            )
            .route("/health", get(handlers::health))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
