use super::dispatch::handle_frame;
use crate::{ai::ProviderRegistry, storage::DocumentStore};
use axum::{
    extract::{
        State,
        ws::{Message, WebSocketUpgrade},
    },
    response::{IntoResponse, Json, Response},
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use serde_json::{Value, json};
use std::{fmt::Display, path::PathBuf, sync::Arc};
use tracing::{debug, error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DocumentStore>,
    pub providers: Arc<ProviderRegistry>,
    pub upload_dir: PathBuf,
}

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| async move {
        info!("WebSocket connected");
        let (outgoing, incoming) = socket.split();
        serve_connection(incoming, outgoing, state).await;
    })
}

/// Answers every frame on one connection until the peer closes it.
///
/// Frames are handled one at a time in arrival order, so replies go out in
/// the same order as the requests that produced them. A bad frame only
/// produces an error reply; the loop keeps reading.
pub async fn serve_connection<S, K, E>(mut incoming: S, mut outgoing: K, state: AppState)
where
    S: Stream<Item = Result<Message, E>> + Unpin,
    K: Sink<Message> + Unpin,
    K::Error: Display,
    E: Display,
{
    while let Some(frame) = incoming.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Binary(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                warn!("WebSocket receive error: {}", e);
                break;
            }
        };

        let reply = handle_frame(&state, &text).await;
        let body = match serde_json::to_string(&reply) {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to encode reply: {}", e);
                continue;
            }
        };

        if let Err(e) = outgoing.send(Message::Text(body)).await {
            debug!("Failed to send reply: {}", e);
            break;
        }
    }

    info!("WebSocket disconnected");
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(health_report(&state))
}

fn health_report(state: &AppState) -> Value {
    json!({
        "status": "healthy",
        "providers": state.providers.listing(),
        "persistent": state.store.is_persistent(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })
}
