use crate::client::{WriterGuard, handle_client};
use crate::messages::CoordinatorMessage;
use axum::{
    Json, Router,
    extract::{ConnectInfo, State, ws::WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use std::net::SocketAddr;
use tokio::sync::{mpsc, oneshot};
use tracing::error;

pub const BANNER: &str = "BeatPad WebSocket Server";

#[derive(Clone)]
pub struct AppState {
    pub hub_tx: mpsc::UnboundedSender<CoordinatorMessage>,
    pub writers: WriterGuard,
}

/// `/health` reports the client count; every other path upgrades to a
/// WebSocket when asked to and answers with a banner otherwise.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .fallback(ws_or_banner)
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Response {
    let (reply_tx, reply_rx) = oneshot::channel();
    if state
        .hub_tx
        .send(CoordinatorMessage::Health { reply_tx })
        .is_err()
    {
        error!("Health check failed: round hub is gone");
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    match reply_rx.await {
        Ok(status) => Json(status).into_response(),
        Err(_) => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}

async fn ws_or_banner(
    ws: Option<WebSocketUpgrade>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
) -> Response {
    match ws {
        Some(ws) => ws.on_upgrade(move |socket| {
            handle_client(socket, addr, state.hub_tx, state.writers)
        }),
        None => BANNER.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::WriterDrain;
    use crate::config::RoundTiming;
    use crate::messages::ClientToServer;
    use crate::round::{Hub, hub_task};
    use crate::test_utils::{ManualScheduler, test_connection};

    fn state(hub_tx: mpsc::UnboundedSender<CoordinatorMessage>) -> State<AppState> {
        State(AppState {
            hub_tx,
            writers: WriterDrain::new().guard(),
        })
    }

    #[tokio::test]
    async fn health_reports_status_and_count() {
        let (hub_tx, hub_rx) = mpsc::unbounded_channel();
        tokio::spawn(hub_task(
            Hub::new(ManualScheduler::default(), RoundTiming::default()),
            hub_rx,
        ));

        let (a, _rx_a) = test_connection();
        let connection_id = a.id();
        hub_tx
            .send(CoordinatorMessage::Connected { connection: a })
            .unwrap();
        hub_tx
            .send(CoordinatorMessage::ClientAction {
                connection_id,
                action: ClientToServer::Join {
                    user_id: "u1".into(),
                    username: "Ana".into(),
                },
            })
            .unwrap();

        let response = health(state(hub_tx)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({"status": "ok", "clients": 1}));
    }

    #[tokio::test]
    async fn health_without_hub_is_unavailable() {
        let (hub_tx, hub_rx) = mpsc::unbounded_channel();
        drop(hub_rx);

        let response = health(state(hub_tx)).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
