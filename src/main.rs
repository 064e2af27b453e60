//! Workflow orchestrator service entry point.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use workflow_orchestrator::client::ServiceClients;
use workflow_orchestrator::config::{load_config, OrchestratorConfig};
use workflow_orchestrator::lifecycle::signals;
use workflow_orchestrator::observability::metrics;
use workflow_orchestrator::resilience::BreakerRegistry;
use workflow_orchestrator::workflow::{LogNotifier, Notifier, WebhookNotifier, WorkflowOrchestrator};
use workflow_orchestrator::{HttpServer, Shutdown};

const DEFAULT_CONFIG_PATH: &str = "orchestrator.toml";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => load_config(Path::new(&path))?,
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            if default.exists() {
                load_config(default)?
            } else {
                OrchestratorConfig::default()
            }
        }
    };

    // Initialize tracing subscriber; RUST_LOG wins over the config level.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.observability.log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        bind_address = %config.listener.bind_address,
        failure_threshold = config.circuit_breaker.failure_threshold,
        max_attempts = config.retries.max_attempts,
        dependency_call_timeout_secs = config.timeouts.dependency_call_secs,
        "configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "failed to parse metrics address"
            ),
        }
    }

    let http = reqwest::Client::new();
    let breakers = Arc::new(BreakerRegistry::new(config.circuit_breaker.clone()));
    let clients = ServiceClients::from_config(&config, &breakers, http.clone())?;

    let notifier: Arc<dyn Notifier> = match &config.notifier.webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(
            url.parse()?,
            http,
            Duration::from_secs(config.notifier.timeout_secs),
        )),
        None => Arc::new(LogNotifier),
    };
    let orchestrator = Arc::new(WorkflowOrchestrator::new(clients, notifier));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "listening for submissions");

    let shutdown = Arc::new(Shutdown::new());
    signals::spawn_signal_listener(shutdown.clone());

    let server = HttpServer::new(&config, orchestrator, breakers);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("shutdown complete");
    Ok(())
}
