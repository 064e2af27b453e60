//! OS signal handling.

use std::sync::Arc;

use crate::lifecycle::Shutdown;

/// Spawn a task that triggers graceful shutdown on Ctrl+C.
pub fn spawn_signal_listener(shutdown: Arc<Shutdown>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received");
            shutdown.trigger();
        }
    });
}
