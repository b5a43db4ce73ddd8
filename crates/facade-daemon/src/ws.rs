//! WebSocket handler for swap and theme updates

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use facade_core::{ActiveModelSummary, SwapEvent, SwapSnapshot, ThemeName};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::session::SessionEvent;
use crate::state::AppState;

/// WebSocket message types
#[derive(Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
enum WsMessage {
    /// Sent once on connect
    State(SwapSnapshot),
    Loading { asset: String, token: u64 },
    Ready(ActiveModelSummary),
    Failed { asset: String, token: u64, kind: String, message: String },
    Retired { asset: String, generation: u64 },
    ThemeChanged { theme: ThemeName },
    Pong,
}

impl From<SessionEvent> for WsMessage {
    fn from(event: SessionEvent) -> Self {
        match event {
            SessionEvent::Swap(SwapEvent::Loading { asset, token }) => WsMessage::Loading { asset, token },
            SessionEvent::Swap(SwapEvent::Ready(summary)) => WsMessage::Ready(summary),
            SessionEvent::Swap(SwapEvent::Failed {
                asset,
                token,
                kind,
                message,
            }) => WsMessage::Failed {
                asset,
                token,
                kind,
                message,
            },
            SessionEvent::Swap(SwapEvent::Retired { asset, generation }) => WsMessage::Retired { asset, generation },
            SessionEvent::ThemeChanged(theme) => WsMessage::ThemeChanged { theme },
        }
    }
}

/// WebSocket upgrade handler
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn send(sender: &mut futures_util::stream::SplitSink<WebSocket, Message>, msg: &WsMessage) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => sender.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            warn!(error = %e, "Failed to encode WebSocket message");
            true
        }
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    // Subscribe before the snapshot so no transition falls in between
    let mut events = state.session.subscribe();

    info!("WebSocket client connected");

    let snapshot = WsMessage::State(state.session.snapshot().await);
    if !send(&mut sender, &snapshot).await {
        return;
    }

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        if !send(&mut sender, &WsMessage::from(event)).await {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!(skipped = n, "Session event channel lagged");
                        // Resynchronize the client with a fresh snapshot
                        let snapshot = WsMessage::State(state.session.snapshot().await);
                        if !send(&mut sender, &snapshot).await {
                            break;
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Text(text))) => {
                        // Handle ping/pong for keepalive
                        if text.as_str() == "ping" && !send(&mut sender, &WsMessage::Pong).await {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        warn!(error = %e, "WebSocket error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    info!("WebSocket client disconnected");
}
