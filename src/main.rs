use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod client;
mod config;
mod http;
mod messages;
mod round;
#[cfg(test)]
mod test_utils;

use crate::client::WriterDrain;
use crate::config::ServerConfig;
use crate::http::AppState;
use crate::messages::CoordinatorMessage;
use crate::round::{Hub, TokioScheduler, hub_task};

/// Upper bound on waiting for writers to flush `serverShutdown` and close
const SHUTDOWN_DRAIN: Duration = Duration::from_millis(500);

/// Entry point: one hub task owns the round, axum serves WebSockets and health
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("beatpad_server=debug,info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = ServerConfig::from_env()?;
    let listener = TcpListener::bind(config.bind_addr()).await?;
    info!("BeatPad server listening on port {}", config.port);
    info!(
        "Connect from client using: ws://localhost:{} (or wss://your-domain in production)",
        config.port
    );

    let (hub_tx, hub_rx) = mpsc::unbounded_channel::<CoordinatorMessage>();

    let hub = Hub::new(TokioScheduler::new(hub_tx.clone()), config.timing);
    let hub_handle = tokio::spawn(hub_task(hub, hub_rx));

    let writers = WriterDrain::new();
    let app = http::router(AppState {
        hub_tx: hub_tx.clone(),
        writers: writers.guard(),
    });

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(hub_tx))
    .await?;

    hub_handle.await?;
    if !writers.wait(SHUTDOWN_DRAIN).await {
        warn!("Some clients were still being written to at exit");
    }
    info!("Server closed");
    Ok(())
}

/// Waits for Ctrl-C, then has the hub notify and disconnect every client.
async fn shutdown_signal(hub_tx: mpsc::UnboundedSender<CoordinatorMessage>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }

    info!("Shutting down server...");

    let (done_tx, done_rx) = oneshot::channel();
    if hub_tx
        .send(CoordinatorMessage::Shutdown { done_tx })
        .is_ok()
    {
        let _ = done_rx.await;
    }
}
