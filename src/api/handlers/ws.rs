use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;

use crate::AppState;

pub async fn handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let mut viewer = state.hub.register();

    loop {
        tokio::select! {
            // Forward block updates to the viewer
            msg = viewer.outbox.recv() => {
                match msg {
                    Some(text) => {
                        if socket.send(Message::Text(text.to_string())).await.is_err() {
                            break;
                        }
                    }
                    // Hub pruned this viewer
                    None => break,
                }
            }
            // Inbound frames only signal liveness
            client_msg = socket.recv() => {
                match client_msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
        }
    }

    state.hub.unregister(viewer.id);
}
