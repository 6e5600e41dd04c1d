//! Scrawl WebSocket Relay Server
//!
//! Relays whiteboard state between clients in the same room: canvas
//! snapshots, chat messages, and presence. The server is the source of
//! truth for who is in which room and hands the latest snapshot to late
//! joiners; it holds no state across restarts.
//!
//! ## Protocol
//!
//! Messages are JSON, multiplexed by event name (see
//! `scrawl_core::protocol`):
//! ```json
//! { "type": "user-joined", "roomId": "r1", "userId": "...", "userName": "ada", "host": true, "presenter": true }
//! { "type": "drawing", "snapshotBlob": "<base64-encoded-png>" }
//! { "type": "messageResponse", "text": "hello" }
//! ```

mod state;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use scrawl_core::protocol::{ClientEvent, ServerEvent};
use state::{Fanout, JoinInfo, RelayState};
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::broadcast;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use uuid::Uuid;

const DEFAULT_PORT: u16 = 5000;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scrawl_server=info,tower_http=info".into()),
        )
        .init();

    let state = Arc::new(RelayState::new());

    let app = Router::new()
        .route("/", get(index))
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Scrawl relay server listening on {}", addr);
    info!("WebSocket endpoint: ws://localhost:{}/ws", port);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

/// Index page
async fn index() -> &'static str {
    "Scrawl Relay Server - Connect via WebSocket at /ws"
}

/// Health check
async fn health() -> &'static str {
    "ok"
}

/// WebSocket upgrade handler
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<RelayState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Serialize and send one event to this connection's sink.
async fn send_event(
    sender: &mut SplitSink<WebSocket, Message>,
    event: &ServerEvent,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(event).unwrap();
    sender.send(Message::Text(json.into())).await
}

/// Handle a WebSocket connection for its whole lifetime. The room
/// subscription lives inside this task, so every exit path tears it down;
/// a transport-level close runs the same leave side effects as an explicit
/// leave.
async fn handle_socket(socket: WebSocket, state: Arc<RelayState>) {
    let connection_id = Uuid::new_v4().to_string();
    info!("new connection: {}", connection_id);

    let (mut sender, mut receiver) = socket.split();
    let mut room_rx: Option<broadcast::Receiver<Fanout>> = None;

    loop {
        tokio::select! {
            // Inbound events from this client.
            frame = receiver.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientEvent>(&text) {
                            Ok(ClientEvent::UserJoined { room_id, user_id: _, user_name, host, presenter }) => {
                                let outcome = state.join(&connection_id, JoinInfo {
                                    room_id,
                                    username: user_name,
                                    host,
                                    presenter,
                                });
                                room_rx = Some(outcome.rx);

                                if send_event(&mut sender, &outcome.welcome).await.is_err() {
                                    break;
                                }
                                // Catch the joiner up to the current canvas.
                                if let Some(snapshot) = outcome.snapshot {
                                    if send_event(&mut sender, &snapshot).await.is_err() {
                                        break;
                                    }
                                }
                            }
                            Ok(ClientEvent::Drawing { snapshot_blob }) => {
                                state.submit_snapshot(&connection_id, snapshot_blob);
                            }
                            Ok(ClientEvent::Chat { text }) => {
                                state.submit_chat(&connection_id, text);
                            }
                            Err(e) => {
                                warn!("invalid message from {}: {}", connection_id, e);
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        break;
                    }
                    Some(Ok(_)) => {} // Ignore ping/pong and binary frames
                    Some(Err(e)) => {
                        warn!("websocket error for {}: {}", connection_id, e);
                        break;
                    }
                }
            }

            // Broadcasts from the joined room, if any.
            fanout = async {
                match &mut room_rx {
                    Some(rx) => rx.recv().await.ok(),
                    // No room joined yet, wait for inbound traffic.
                    None => std::future::pending::<Option<Fanout>>().await,
                }
            } => {
                if let Some((exclude, event)) = fanout {
                    if exclude.as_deref() != Some(connection_id.as_str()) {
                        if send_event(&mut sender, &event).await.is_err() {
                            break;
                        }
                    }
                }
            }
        }
    }

    // Disconnect runs the same path as an explicit leave.
    state.leave(&connection_id);
    info!("connection closed: {}", connection_id);
}
