// Live result feed.
//
// Each WebSocket connection gets its own broadcast receiver; events
// published while the socket is open are pushed as JSON. Subscribers that
// fall behind the channel capacity skip the lagged events rather than
// stalling the pipeline; history is available from /api/answers/recent.

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::models::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ws/results", get(ws_results))
        .with_state(state)
}

async fn ws_results(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| stream_results(socket, state))
}

async fn stream_results(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.broadcaster.subscribe();
    debug!("live feed subscriber connected");

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(event) => {
                    let payload = match serde_json::to_string(&event) {
                        Ok(payload) => payload,
                        Err(e) => {
                            warn!(error = %e, "failed to encode result event");
                            continue;
                        }
                    };
                    if sender.send(Message::Text(payload.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "live feed subscriber lagged, events skipped");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {} // pings and client chatter are ignored
            },
        }
    }

    debug!("live feed subscriber disconnected");
}
