//! Signal handling for graceful shutdown.

use tokio::signal::unix::{SignalKind, signal};

/// Creates a future that completes when a shutdown signal is received.
///
/// Listens for SIGTERM and SIGINT (Ctrl+C). If the handlers cannot be
/// installed the server falls back to `ctrl_c`.
pub async fn shutdown_signal() {
    let (mut sigterm, mut sigint) =
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(term), Ok(int)) => (term, int),
            (Err(e), _) | (_, Err(e)) => {
                tracing::error!(error = %e, "failed to install signal handlers");
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %e, "failed to listen for ctrl-c");
                }
                return;
            }
        };

    tokio::select! {
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
        _ = sigint.recv() => {
            tracing::info!("Received SIGINT, initiating graceful shutdown");
        }
    }
}
